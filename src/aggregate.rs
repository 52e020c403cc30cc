// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Budget vs actual arithmetic.
//!
//! Every function here is a pure fold over the slices it is given. Budget items
//! are summed as stored, whatever their `period`; see DESIGN.md.

use crate::models::{
    BudgetItem, CashflowSummary, Category, CategoryReport, HealthStatus, Transaction,
    TransactionStats, TxType,
};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};

pub fn total(transactions: &[Transaction], ty: TxType) -> Decimal {
    transactions
        .iter()
        .filter(|t| t.r#type == ty)
        .map(|t| t.amount)
        .sum()
}

pub fn budget_total(budget_items: &[BudgetItem], ty: TxType) -> Decimal {
    budget_items
        .iter()
        .filter(|b| b.r#type == ty)
        .map(|b| b.planned_amount)
        .sum()
}

pub fn summary(
    transactions: &[Transaction],
    budget_items: &[BudgetItem],
    period: &str,
) -> CashflowSummary {
    let total_income = total(transactions, TxType::Income);
    let total_expense = total(transactions, TxType::Expense);
    let budgeted_income = budget_total(budget_items, TxType::Income);
    let budgeted_expense = budget_total(budget_items, TxType::Expense);

    CashflowSummary {
        total_income,
        total_expense,
        net_cashflow: total_income - total_expense,
        budgeted_income,
        budgeted_expense,
        budget_variance_income: total_income - budgeted_income,
        budget_variance_expense: total_expense - budgeted_expense,
        period: period.to_string(),
    }
}

/// `variance / budgeted * 100`, or zero when nothing was budgeted.
fn variance_percent(variance: Decimal, budgeted: Decimal) -> Decimal {
    if budgeted > Decimal::ZERO {
        variance / budgeted * Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    }
}

/// One report per `(category, type)` seen in either input, sorted by name
/// ignoring case.
///
/// Records are keyed by their literal category string, so a category that has
/// since been renamed or deleted still gets its own row.
pub fn category_reports(
    transactions: &[Transaction],
    budget_items: &[BudgetItem],
) -> Vec<CategoryReport> {
    let mut index: HashMap<(String, TxType), usize> = HashMap::new();
    let mut reports: Vec<CategoryReport> = Vec::new();

    for b in budget_items {
        let i = report_slot(&mut index, &mut reports, &b.category, b.r#type);
        reports[i].budgeted += b.planned_amount;
    }
    for t in transactions {
        let i = report_slot(&mut index, &mut reports, &t.category, t.r#type);
        reports[i].actual += t.amount;
    }

    for r in reports.iter_mut() {
        r.variance = r.actual - r.budgeted;
        r.variance_percent = variance_percent(r.variance, r.budgeted);
    }
    reports.sort_by_cached_key(|r| r.category_name.to_lowercase());
    reports
}

fn report_slot(
    index: &mut HashMap<(String, TxType), usize>,
    reports: &mut Vec<CategoryReport>,
    name: &str,
    ty: TxType,
) -> usize {
    *index.entry((name.to_string(), ty)).or_insert_with(|| {
        reports.push(CategoryReport {
            category_name: name.to_string(),
            budgeted: Decimal::ZERO,
            actual: Decimal::ZERO,
            variance: Decimal::ZERO,
            variance_percent: Decimal::ZERO,
            r#type: ty,
        });
        reports.len() - 1
    })
}

/// Classify a variance. Income over plan is good; expense under plan is good.
pub fn health_status(variance_percent: Decimal, ty: TxType) -> HealthStatus {
    let ten = Decimal::TEN;
    match ty {
        TxType::Income => {
            if variance_percent >= ten {
                HealthStatus::Excellent
            } else if variance_percent >= Decimal::ZERO {
                HealthStatus::Good
            } else if variance_percent >= -ten {
                HealthStatus::Warning
            } else {
                HealthStatus::Danger
            }
        }
        TxType::Expense => {
            if variance_percent <= -ten {
                HealthStatus::Excellent
            } else if variance_percent <= Decimal::ZERO {
                HealthStatus::Good
            } else if variance_percent <= ten {
                HealthStatus::Warning
            } else {
                HealthStatus::Danger
            }
        }
    }
}

/// Actual as a percentage of budgeted. Zero budget yields 0, not infinity.
pub fn utilization(actual: Decimal, budgeted: Decimal) -> Decimal {
    if budgeted.is_zero() {
        return Decimal::ZERO;
    }
    actual / budgeted * Decimal::ONE_HUNDRED
}

impl CategoryReport {
    pub fn health(&self) -> HealthStatus {
        health_status(self.variance_percent, self.r#type)
    }

    pub fn utilization(&self) -> Decimal {
        utilization(self.actual, self.budgeted)
    }
}

pub fn average_monthly(transactions: &[Transaction], ty: TxType, months: u32) -> Decimal {
    if months == 0 {
        return Decimal::ZERO;
    }
    total(transactions, ty) / Decimal::from(months)
}

pub fn projection(
    current_cashflow: Decimal,
    avg_monthly_income: Decimal,
    avg_monthly_expense: Decimal,
    months: u32,
) -> Decimal {
    current_cashflow + (avg_monthly_income - avg_monthly_expense) * Decimal::from(months)
}

pub fn group_by_category(transactions: &[Transaction]) -> BTreeMap<String, Vec<Transaction>> {
    let mut grouped: BTreeMap<String, Vec<Transaction>> = BTreeMap::new();
    for t in transactions {
        grouped.entry(t.category.clone()).or_default().push(t.clone());
    }
    grouped
}

pub fn transaction_stats(transactions: &[Transaction]) -> TransactionStats {
    let total_income = total(transactions, TxType::Income);
    let total_expense = total(transactions, TxType::Expense);
    let income_count = transactions
        .iter()
        .filter(|t| t.r#type == TxType::Income)
        .count();
    TransactionStats {
        total_income,
        total_expense,
        net: total_income - total_expense,
        income_count,
        expense_count: transactions.len() - income_count,
        count: transactions.len(),
    }
}

/// Newest first by date; ties keep their input order.
pub fn recent(transactions: &[Transaction], limit: usize) -> Vec<Transaction> {
    let mut sorted = transactions.to_vec();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));
    sorted.truncate(limit);
    sorted
}

/// Reports whose category name and type match no known category.
pub fn orphan_reports<'a>(
    reports: &'a [CategoryReport],
    categories: &[Category],
) -> Vec<&'a CategoryReport> {
    reports
        .iter()
        .filter(|r| {
            !categories
                .iter()
                .any(|c| c.name == r.category_name && c.r#type == r.r#type)
        })
        .collect()
}
