// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Record collections and the helpers that change them.
//!
//! Each collection is loaded whole and saved whole after every mutation. The
//! [`Workbook`] owns the working set for one command and carries the store
//! handle explicitly; nothing here reaches for global state.

use crate::db;
use crate::errors::{Error, Result};
use crate::models::{
    BudgetItem, BudgetItemDraft, Category, SubCategory, Transaction, TransactionDraft, TxType,
};
use crate::validate::{validate_budget_item, validate_category, validate_transaction};
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use tracing::{debug, info};

pub const KEY_TRANSACTIONS: &str = "transactions";
pub const KEY_BUDGET_ITEMS: &str = "budgetItems";
pub const KEY_CATEGORIES: &str = "categories";

/// Whole-collection persistence. Loads never fail; they fall back to empty.
pub trait RecordStore {
    fn load_transactions(&self) -> Vec<Transaction>;
    fn save_transactions(&self, items: &[Transaction]) -> Result<()>;
    fn load_budget_items(&self) -> Vec<BudgetItem>;
    fn save_budget_items(&self, items: &[BudgetItem]) -> Result<()>;
    fn load_categories(&self) -> Vec<Category>;
    fn save_categories(&self, items: &[Category]) -> Result<()>;
}

pub struct SqliteStore<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        SqliteStore { conn }
    }
}

impl RecordStore for SqliteStore<'_> {
    fn load_transactions(&self) -> Vec<Transaction> {
        db::get(self.conn, KEY_TRANSACTIONS, Vec::new())
    }

    fn save_transactions(&self, items: &[Transaction]) -> Result<()> {
        db::set(self.conn, KEY_TRANSACTIONS, items)
    }

    fn load_budget_items(&self) -> Vec<BudgetItem> {
        db::get(self.conn, KEY_BUDGET_ITEMS, Vec::new())
    }

    fn save_budget_items(&self, items: &[BudgetItem]) -> Result<()> {
        db::set(self.conn, KEY_BUDGET_ITEMS, items)
    }

    fn load_categories(&self) -> Vec<Category> {
        db::get(self.conn, KEY_CATEGORIES, Vec::new())
    }

    fn save_categories(&self, items: &[Category]) -> Result<()> {
        db::set(self.conn, KEY_CATEGORIES, items)
    }
}

fn transaction_from_draft(
    draft: &TransactionDraft,
    id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
) -> Result<Transaction> {
    let errors = validate_transaction(draft);
    let (true, Some(date), Some(description), Some(amount), Some(ty), Some(category)) = (
        errors.is_empty(),
        draft.date,
        draft.description.clone(),
        draft.amount,
        draft.r#type,
        draft.category.clone(),
    ) else {
        return Err(Error::Validation(errors));
    };
    Ok(Transaction {
        id,
        date,
        description,
        amount,
        r#type: ty,
        category,
        sub_category: draft.sub_category.clone(),
        reference: draft.reference.clone(),
        attachment: draft.attachment.clone(),
        created_at,
        updated_at,
    })
}

fn budget_item_from_draft(
    draft: &BudgetItemDraft,
    id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
) -> Result<BudgetItem> {
    let errors = validate_budget_item(draft);
    let (true, Some(category), Some(ty), Some(planned_amount), Some(period)) = (
        errors.is_empty(),
        draft.category.clone(),
        draft.r#type,
        draft.planned_amount,
        draft.period,
    ) else {
        return Err(Error::Validation(errors));
    };
    Ok(BudgetItem {
        id,
        category,
        sub_category: draft.sub_category.clone(),
        r#type: ty,
        planned_amount,
        period,
        description: draft.description.clone(),
        created_at,
        updated_at,
    })
}

pub struct Workbook<S: RecordStore> {
    store: S,
    transactions: Vec<Transaction>,
    budget_items: Vec<BudgetItem>,
    categories: Vec<Category>,
}

impl<S: RecordStore> Workbook<S> {
    pub fn load(store: S) -> Self {
        let transactions = store.load_transactions();
        let budget_items = store.load_budget_items();
        let categories = store.load_categories();
        debug!(
            transactions = transactions.len(),
            budget_items = budget_items.len(),
            categories = categories.len(),
            "workbook loaded"
        );
        Workbook {
            store,
            transactions,
            budget_items,
            categories,
        }
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn budget_items(&self) -> &[BudgetItem] {
        &self.budget_items
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn transaction(&self, id: &str) -> Result<&Transaction> {
        self.transactions
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| Error::not_found("Transaction", id))
    }

    pub fn budget_item(&self, id: &str) -> Result<&BudgetItem> {
        self.budget_items
            .iter()
            .find(|b| b.id == id)
            .ok_or_else(|| Error::not_found("Budget item", id))
    }

    // Saved first, swapped in after: a failed save leaves the working set unchanged.

    fn commit_transactions(&mut self, next: Vec<Transaction>) -> Result<()> {
        self.store.save_transactions(&next)?;
        self.transactions = next;
        Ok(())
    }

    fn commit_budget_items(&mut self, next: Vec<BudgetItem>) -> Result<()> {
        self.store.save_budget_items(&next)?;
        self.budget_items = next;
        Ok(())
    }

    fn commit_categories(&mut self, next: Vec<Category>) -> Result<()> {
        self.store.save_categories(&next)?;
        self.categories = next;
        Ok(())
    }

    fn transaction_index(&self, id: &str) -> Result<usize> {
        self.transactions
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| Error::not_found("Transaction", id))
    }

    fn budget_item_index(&self, id: &str) -> Result<usize> {
        self.budget_items
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| Error::not_found("Budget item", id))
    }

    fn category_index(&self, id: &str) -> Result<usize> {
        self.categories
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| Error::not_found("Category", id))
    }

    /// New transactions go to the front, newest entry first.
    pub fn add_transaction(
        &mut self,
        draft: &TransactionDraft,
        id: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<&Transaction> {
        let t = transaction_from_draft(draft, id.into(), now, now)?;
        let mut next = Vec::with_capacity(self.transactions.len() + 1);
        next.push(t);
        next.extend_from_slice(&self.transactions);
        self.commit_transactions(next)?;
        let t = &self.transactions[0];
        info!(id = %t.id, amount = %t.amount, kind = %t.r#type, "transaction added");
        Ok(t)
    }

    /// Full replace. `id` and `created_at` survive, `updated_at` becomes `now`.
    pub fn edit_transaction(
        &mut self,
        id: &str,
        draft: &TransactionDraft,
        now: DateTime<Utc>,
    ) -> Result<&Transaction> {
        let idx = self.transaction_index(id)?;
        let created_at = self.transactions[idx].created_at;
        let t = transaction_from_draft(draft, id.to_string(), created_at, now)?;
        let mut next = self.transactions.clone();
        next[idx] = t;
        self.commit_transactions(next)?;
        info!(id, "transaction updated");
        Ok(&self.transactions[idx])
    }

    pub fn delete_transaction(&mut self, id: &str) -> Result<Transaction> {
        let idx = self.transaction_index(id)?;
        let mut next = self.transactions.clone();
        let removed = next.remove(idx);
        self.commit_transactions(next)?;
        info!(id, "transaction deleted");
        Ok(removed)
    }

    pub fn add_budget_item(
        &mut self,
        draft: &BudgetItemDraft,
        id: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<&BudgetItem> {
        let b = budget_item_from_draft(draft, id.into(), now, now)?;
        let mut next = self.budget_items.clone();
        next.push(b);
        self.commit_budget_items(next)?;
        let b = &self.budget_items[self.budget_items.len() - 1];
        info!(id = %b.id, planned = %b.planned_amount, "budget item added");
        Ok(b)
    }

    pub fn edit_budget_item(
        &mut self,
        id: &str,
        draft: &BudgetItemDraft,
        now: DateTime<Utc>,
    ) -> Result<&BudgetItem> {
        let idx = self.budget_item_index(id)?;
        let created_at = self.budget_items[idx].created_at;
        let b = budget_item_from_draft(draft, id.to_string(), created_at, now)?;
        let mut next = self.budget_items.clone();
        next[idx] = b;
        self.commit_budget_items(next)?;
        info!(id, "budget item updated");
        Ok(&self.budget_items[idx])
    }

    pub fn delete_budget_item(&mut self, id: &str) -> Result<BudgetItem> {
        let idx = self.budget_item_index(id)?;
        let mut next = self.budget_items.clone();
        let removed = next.remove(idx);
        self.commit_budget_items(next)?;
        info!(id, "budget item deleted");
        Ok(removed)
    }

    /// Resolve a category by id, or by name (narrowed by `ty` when given).
    pub fn category_id(&self, key: &str, ty: Option<TxType>) -> Result<String> {
        if let Some(c) = self.categories.iter().find(|c| c.id == key) {
            return Ok(c.id.clone());
        }
        let matches: Vec<&Category> = self
            .categories
            .iter()
            .filter(|c| c.name == key && ty.is_none_or(|t| c.r#type == t))
            .collect();
        match matches.as_slice() {
            [] => Err(Error::not_found("Category", key)),
            [one] => Ok(one.id.clone()),
            _ => Err(Error::Validation(vec![format!(
                "Category '{}' exists for both income and expense; pass a type",
                key
            )])),
        }
    }

    pub fn add_category(
        &mut self,
        id: impl Into<String>,
        name: &str,
        ty: TxType,
        color: &str,
    ) -> Result<&Category> {
        let errors = validate_category(name, ty, &self.categories);
        if !errors.is_empty() {
            return Err(Error::Validation(errors));
        }
        let mut next = self.categories.clone();
        next.push(Category {
            id: id.into(),
            name: name.trim().to_string(),
            r#type: ty,
            color: color.to_string(),
            icon: None,
            sub_categories: Vec::new(),
            is_active: true,
        });
        self.commit_categories(next)?;
        let c = &self.categories[self.categories.len() - 1];
        info!(id = %c.id, name = %c.name, "category added");
        Ok(c)
    }

    pub fn add_sub_category(
        &mut self,
        category_id: &str,
        id: impl Into<String>,
        name: &str,
        color: &str,
    ) -> Result<&SubCategory> {
        let idx = self.category_index(category_id)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::Validation(vec![
                "Sub-category name is required".to_string(),
            ]));
        }
        let parent = &self.categories[idx];
        if parent.sub_category(name).is_some() {
            return Err(Error::Validation(vec![format!(
                "Sub-category '{}' already exists under '{}'",
                name, parent.name
            )]));
        }
        let sub = SubCategory {
            id: id.into(),
            name: name.to_string(),
            color: color.to_string(),
            parent_category_id: parent.id.clone(),
            is_active: true,
        };
        let mut next = self.categories.clone();
        next[idx].sub_categories.push(sub);
        self.commit_categories(next)?;
        let subs = &self.categories[idx].sub_categories;
        Ok(&subs[subs.len() - 1])
    }

    /// Soft-disable or re-enable. Records already tagged are unaffected.
    pub fn set_category_active(&mut self, id: &str, active: bool) -> Result<&Category> {
        let idx = self.category_index(id)?;
        let mut next = self.categories.clone();
        next[idx].is_active = active;
        self.commit_categories(next)?;
        info!(id, active, "category toggled");
        Ok(&self.categories[idx])
    }

    /// Removes the category only; records naming it become orphans.
    pub fn delete_category(&mut self, id: &str) -> Result<Category> {
        let idx = self.category_index(id)?;
        let mut next = self.categories.clone();
        let removed = next.remove(idx);
        self.commit_categories(next)?;
        info!(id, name = %removed.name, "category deleted");
        Ok(removed)
    }

    /// Replace every collection at once. Used when seeding.
    ///
    /// Collections are written in order; on a failed write the working set
    /// keeps only the collections that were stored before it.
    pub fn replace_all(
        &mut self,
        categories: Vec<Category>,
        budget_items: Vec<BudgetItem>,
        transactions: Vec<Transaction>,
    ) -> Result<()> {
        self.commit_categories(categories)?;
        self.commit_budget_items(budget_items)?;
        self.commit_transactions(transactions)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BudgetPeriod;
    use chrono::{NaiveDate, TimeZone};
    use rust_decimal::Decimal;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        db::init_schema(&conn).unwrap();
        conn
    }

    fn at(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, h, 0, 0).unwrap()
    }

    fn draft(desc: &str, amount: i64) -> TransactionDraft {
        TransactionDraft {
            date: NaiveDate::from_ymd_opt(2024, 1, 15),
            description: Some(desc.into()),
            amount: Some(Decimal::from(amount)),
            r#type: Some(TxType::Income),
            category: Some("Pendapatan Operasional".into()),
            ..Default::default()
        }
    }

    #[test]
    fn add_prepends_and_persists() {
        let conn = conn();
        let mut wb = Workbook::load(SqliteStore::new(&conn));
        wb.add_transaction(&draft("first", 10), "t1", at(1)).unwrap();
        wb.add_transaction(&draft("second", 20), "t2", at(2)).unwrap();
        assert_eq!(wb.transactions()[0].id, "t2");

        let reloaded = Workbook::load(SqliteStore::new(&conn));
        let ids: Vec<_> = reloaded.transactions().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["t2", "t1"]);
        assert_eq!(reloaded.transactions()[1].created_at, at(1));
    }

    #[test]
    fn invalid_draft_leaves_collection_untouched() {
        let conn = conn();
        let mut wb = Workbook::load(SqliteStore::new(&conn));
        let err = wb
            .add_transaction(&TransactionDraft::default(), "t1", at(1))
            .unwrap_err();
        assert_eq!(err.messages().map(|m| m.len()), Some(5));
        assert!(wb.transactions().is_empty());
        assert!(Workbook::load(SqliteStore::new(&conn)).transactions().is_empty());
    }

    #[test]
    fn edit_keeps_identity_and_creation_time() {
        let conn = conn();
        let mut wb = Workbook::load(SqliteStore::new(&conn));
        wb.add_transaction(&draft("first", 10), "t1", at(1)).unwrap();
        let edited = wb
            .edit_transaction("t1", &draft("renamed", 11), at(5))
            .unwrap()
            .clone();
        assert_eq!(edited.id, "t1");
        assert_eq!(edited.description, "renamed");
        assert_eq!(edited.created_at, at(1));
        assert_eq!(edited.updated_at, at(5));

        let mut bad = draft("renamed", 11);
        bad.amount = Some(Decimal::from(-1));
        assert!(matches!(
            wb.edit_transaction("t1", &bad, at(6)),
            Err(Error::Validation(_))
        ));
        assert_eq!(wb.transaction("t1").unwrap().amount, Decimal::from(11));
        assert!(matches!(
            wb.edit_transaction("nope", &draft("x", 1), at(6)),
            Err(Error::NotFound { .. })
        ));
    }

    #[test]
    fn delete_removes_by_id() {
        let conn = conn();
        let mut wb = Workbook::load(SqliteStore::new(&conn));
        wb.add_transaction(&draft("first", 10), "t1", at(1)).unwrap();
        wb.add_transaction(&draft("second", 20), "t2", at(2)).unwrap();
        let gone = wb.delete_transaction("t1").unwrap();
        assert_eq!(gone.description, "first");
        assert!(wb.delete_transaction("t1").is_err());
        assert_eq!(Workbook::load(SqliteStore::new(&conn)).transactions().len(), 1);
    }

    #[test]
    fn budget_item_lifecycle() {
        let conn = conn();
        let mut wb = Workbook::load(SqliteStore::new(&conn));
        let d = BudgetItemDraft {
            category: Some("Biaya Operasional".into()),
            r#type: Some(TxType::Expense),
            planned_amount: Some(Decimal::from(80)),
            period: Some(BudgetPeriod::Monthly),
            ..Default::default()
        };
        wb.add_budget_item(&d, "b1", at(1)).unwrap();
        let mut d2 = d.clone();
        d2.period = Some(BudgetPeriod::Yearly);
        let b = wb.edit_budget_item("b1", &d2, at(3)).unwrap();
        assert_eq!(b.period, BudgetPeriod::Yearly);
        assert_eq!(b.created_at, at(1));
        wb.delete_budget_item("b1").unwrap();
        assert!(wb.budget_items().is_empty());
    }

    #[test]
    fn categories_resolve_and_toggle() {
        let conn = conn();
        let mut wb = Workbook::load(SqliteStore::new(&conn));
        wb.add_category("c1", "Lain-lain", TxType::Income, "#3b82f6")
            .unwrap();
        wb.add_category("c2", "Lain-lain", TxType::Expense, "#ef4444")
            .unwrap();
        assert!(wb.add_category("c3", "Lain-lain", TxType::Expense, "#000").is_err());

        assert!(matches!(
            wb.category_id("Lain-lain", None),
            Err(Error::Validation(_))
        ));
        assert_eq!(wb.category_id("Lain-lain", Some(TxType::Expense)).unwrap(), "c2");
        assert_eq!(wb.category_id("c1", None).unwrap(), "c1");

        wb.add_sub_category("c2", "s1", "Bank Fee", "#111").unwrap();
        assert!(wb.add_sub_category("c2", "s2", "Bank Fee", "#111").is_err());

        let c = wb.set_category_active("c2", false).unwrap();
        assert!(!c.offered_for(TxType::Expense));

        let reloaded = Workbook::load(SqliteStore::new(&conn));
        let c2 = &reloaded.categories()[1];
        assert!(!c2.is_active);
        assert_eq!(c2.sub_categories[0].parent_category_id, "c2");
    }

    /// Accepts loads, refuses every write.
    struct ReadOnlyStore;

    impl RecordStore for ReadOnlyStore {
        fn load_transactions(&self) -> Vec<Transaction> {
            Vec::new()
        }
        fn save_transactions(&self, _: &[Transaction]) -> Result<()> {
            Err(Error::Config("disk full".into()))
        }
        fn load_budget_items(&self) -> Vec<BudgetItem> {
            Vec::new()
        }
        fn save_budget_items(&self, _: &[BudgetItem]) -> Result<()> {
            Err(Error::Config("disk full".into()))
        }
        fn load_categories(&self) -> Vec<Category> {
            Vec::new()
        }
        fn save_categories(&self, _: &[Category]) -> Result<()> {
            Err(Error::Config("disk full".into()))
        }
    }

    #[test]
    fn failed_save_leaves_working_set_unchanged() {
        let mut wb = Workbook::load(ReadOnlyStore);

        let err = wb.add_transaction(&draft("first", 10), "t1", at(1)).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(wb.transactions().is_empty());

        let plan = BudgetItemDraft {
            category: Some("Biaya Operasional".into()),
            r#type: Some(TxType::Expense),
            planned_amount: Some(Decimal::from(80)),
            period: Some(BudgetPeriod::Monthly),
            ..Default::default()
        };
        assert!(wb.add_budget_item(&plan, "b1", at(1)).is_err());
        assert!(wb.budget_items().is_empty());

        assert!(wb.add_category("c1", "Gaji", TxType::Expense, "#000").is_err());
        assert!(wb.categories().is_empty());

        let seed = vec![Category {
            id: "c1".into(),
            name: "Gaji".into(),
            r#type: TxType::Expense,
            color: "#000".into(),
            icon: None,
            sub_categories: Vec::new(),
            is_active: true,
        }];
        assert!(wb.replace_all(seed, Vec::new(), Vec::new()).is_err());
        assert!(wb.categories().is_empty());
    }

    #[test]
    fn failed_save_keeps_edits_and_deletes_out() {
        let conn = conn();
        let mut wb = Workbook::load(SqliteStore::new(&conn));
        wb.add_transaction(&draft("first", 10), "t1", at(1)).unwrap();
        wb.add_category("c1", "Gaji", TxType::Expense, "#000").unwrap();
        conn.execute_batch("DROP TABLE kv_store").unwrap();

        assert!(wb.edit_transaction("t1", &draft("renamed", 11), at(2)).is_err());
        assert_eq!(wb.transaction("t1").unwrap().description, "first");
        assert!(wb.delete_transaction("t1").is_err());
        assert_eq!(wb.transactions().len(), 1);

        assert!(wb.set_category_active("c1", false).is_err());
        assert!(wb.categories()[0].is_active);
        assert!(wb.add_sub_category("c1", "s1", "Staf", "#111").is_err());
        assert!(wb.categories()[0].sub_categories.is_empty());
        assert!(wb.delete_category("c1").is_err());
        assert_eq!(wb.categories().len(), 1);
    }
}
