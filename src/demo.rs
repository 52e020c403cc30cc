// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Sample organization books (FY2024) used by `init --demo`.
//!
//! Stored in the same blob format the record store writes.

use crate::errors::Result;
use crate::models::{BudgetItem, Category, Transaction};

const CATEGORIES: &str = include_str!("demo/categories.json");
const BUDGET_ITEMS: &str = include_str!("demo/budget_items.json");
const TRANSACTIONS: &str = include_str!("demo/transactions.json");

pub struct Dataset {
    pub categories: Vec<Category>,
    pub budget_items: Vec<BudgetItem>,
    pub transactions: Vec<Transaction>,
}

pub fn dataset() -> Result<Dataset> {
    Ok(Dataset {
        categories: serde_json::from_str(CATEGORIES)?,
        budget_items: serde_json::from_str(BUDGET_ITEMS)?,
        transactions: serde_json::from_str(TRANSACTIONS)?,
    })
}
