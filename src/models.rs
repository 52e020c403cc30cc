// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Direction of a cash movement. Amounts are always positive; this carries the sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxType {
    Income,
    Expense,
}

impl TxType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxType::Income => "income",
            TxType::Expense => "expense",
        }
    }
}

impl fmt::Display for TxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TxType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(TxType::Income),
            "expense" => Ok(TxType::Expense),
            other => Err(format!("Invalid type '{}', expected income|expense", other)),
        }
    }
}

/// Cadence a budget item is planned for. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    Monthly,
    Quarterly,
    Yearly,
}

impl BudgetPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetPeriod::Monthly => "monthly",
            BudgetPeriod::Quarterly => "quarterly",
            BudgetPeriod::Yearly => "yearly",
        }
    }
}

impl fmt::Display for BudgetPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BudgetPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "monthly" => Ok(BudgetPeriod::Monthly),
            "quarterly" => Ok(BudgetPeriod::Quarterly),
            "yearly" => Ok(BudgetPeriod::Yearly),
            other => Err(format!(
                "Invalid period '{}', expected monthly|quarterly|yearly",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub date: NaiveDate,
    pub description: String,
    pub amount: Decimal,
    pub r#type: TxType,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A planned amount for a category (one RKA line).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetItem {
    pub id: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_category: Option<String>,
    pub r#type: TxType,
    pub planned_amount: Decimal,
    pub period: BudgetPeriod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubCategory {
    pub id: String,
    pub name: String,
    pub color: String,
    pub parent_category_id: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub r#type: TxType,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default)]
    pub sub_categories: Vec<SubCategory>,
    pub is_active: bool,
}

impl Category {
    /// Whether this category should be offered when entering a new record of `ty`.
    pub fn offered_for(&self, ty: TxType) -> bool {
        self.is_active && self.r#type == ty
    }

    pub fn sub_category(&self, name: &str) -> Option<&SubCategory> {
        self.sub_categories.iter().find(|s| s.name == name)
    }
}

/// The partial record a form produces before validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionDraft {
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
    pub amount: Option<Decimal>,
    pub r#type: Option<TxType>,
    pub category: Option<String>,
    pub sub_category: Option<String>,
    pub reference: Option<String>,
    pub attachment: Option<String>,
}

impl From<&Transaction> for TransactionDraft {
    fn from(t: &Transaction) -> Self {
        TransactionDraft {
            date: Some(t.date),
            description: Some(t.description.clone()),
            amount: Some(t.amount),
            r#type: Some(t.r#type),
            category: Some(t.category.clone()),
            sub_category: t.sub_category.clone(),
            reference: t.reference.clone(),
            attachment: t.attachment.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BudgetItemDraft {
    pub category: Option<String>,
    pub sub_category: Option<String>,
    pub r#type: Option<TxType>,
    pub planned_amount: Option<Decimal>,
    pub period: Option<BudgetPeriod>,
    pub description: Option<String>,
}

impl From<&BudgetItem> for BudgetItemDraft {
    fn from(b: &BudgetItem) -> Self {
        BudgetItemDraft {
            category: Some(b.category.clone()),
            sub_category: b.sub_category.clone(),
            r#type: Some(b.r#type),
            planned_amount: Some(b.planned_amount),
            period: Some(b.period),
            description: b.description.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashflowSummary {
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub net_cashflow: Decimal,
    pub budgeted_income: Decimal,
    pub budgeted_expense: Decimal,
    pub budget_variance_income: Decimal,
    pub budget_variance_expense: Decimal,
    pub period: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryReport {
    pub category_name: String,
    pub budgeted: Decimal,
    pub actual: Decimal,
    pub variance: Decimal,
    pub variance_percent: Decimal,
    pub r#type: TxType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Excellent,
    Good,
    Warning,
    Danger,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Excellent => "excellent",
            HealthStatus::Good => "good",
            HealthStatus::Warning => "warning",
            HealthStatus::Danger => "danger",
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One calendar-month bucket of the trend series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub period: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub income: Decimal,
    pub expense: Decimal,
    pub budget: Decimal,
    pub actual: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionStats {
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub net: Decimal,
    pub income_count: usize,
    pub expense_count: usize,
    pub count: usize,
}

/// Everything the report view shows for one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportData {
    pub period: String,
    pub categories: Vec<CategoryReport>,
    pub summary: CashflowSummary,
    pub trends: Vec<TrendPoint>,
}
