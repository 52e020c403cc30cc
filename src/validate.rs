// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{BudgetItemDraft, Category, TransactionDraft, TxType};
use rust_decimal::Decimal;

pub const MSG_DESCRIPTION: &str = "Description is required";
pub const MSG_AMOUNT: &str = "Amount must be greater than 0";
pub const MSG_TYPE: &str = "Transaction type is required";
pub const MSG_CATEGORY: &str = "Category is required";
pub const MSG_DATE: &str = "Date is required";
pub const MSG_PLANNED_AMOUNT: &str = "Planned amount must be greater than 0";
pub const MSG_PERIOD: &str = "Budget period is required";
pub const MSG_CATEGORY_NAME: &str = "Category name is required";

/// Missing, empty, or whitespace only.
fn blank(s: &Option<String>) -> bool {
    s.as_deref().is_none_or(|v| v.trim().is_empty())
}

fn not_positive(d: Option<Decimal>) -> bool {
    d.is_none_or(|v| v <= Decimal::ZERO)
}

/// Every rule the draft breaks, in form order. Empty means valid.
pub fn validate_transaction(draft: &TransactionDraft) -> Vec<String> {
    let mut errors = Vec::new();
    if blank(&draft.description) {
        errors.push(MSG_DESCRIPTION.to_string());
    }
    if not_positive(draft.amount) {
        errors.push(MSG_AMOUNT.to_string());
    }
    if draft.r#type.is_none() {
        errors.push(MSG_TYPE.to_string());
    }
    if blank(&draft.category) {
        errors.push(MSG_CATEGORY.to_string());
    }
    if draft.date.is_none() {
        errors.push(MSG_DATE.to_string());
    }
    errors
}

pub fn validate_budget_item(draft: &BudgetItemDraft) -> Vec<String> {
    let mut errors = Vec::new();
    if blank(&draft.category) {
        errors.push(MSG_CATEGORY.to_string());
    }
    if draft.r#type.is_none() {
        errors.push(MSG_TYPE.to_string());
    }
    if not_positive(draft.planned_amount) {
        errors.push(MSG_PLANNED_AMOUNT.to_string());
    }
    if draft.period.is_none() {
        errors.push(MSG_PERIOD.to_string());
    }
    errors
}

pub fn validate_category(name: &str, ty: TxType, existing: &[Category]) -> Vec<String> {
    let name = name.trim();
    if name.is_empty() {
        return vec![MSG_CATEGORY_NAME.to_string()];
    }
    if existing.iter().any(|c| c.name == name && c.r#type == ty) {
        return vec![format!("Category '{}' ({}) already exists", name, ty)];
    }
    Vec::new()
}
