// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Narrowing a transaction list down to what a view asked for.

use crate::models::{Transaction, TxType};
use chrono::NaiveDate;
use rust_decimal::Decimal;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TypeFilter {
    #[default]
    All,
    Only(TxType),
}

impl TypeFilter {
    fn admits(&self, ty: TxType) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Only(t) => *t == ty,
        }
    }
}

/// All fields are optional; an absent field places no constraint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterOptions {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub r#type: TypeFilter,
    pub category: Option<String>,
    pub min_amount: Option<Decimal>,
    pub max_amount: Option<Decimal>,
    pub search: Option<String>,
}

impl FilterOptions {
    pub fn is_empty(&self) -> bool {
        self.date_range().is_none()
            && self.r#type == TypeFilter::All
            && non_blank(&self.category).is_none()
            && self.min_amount.is_none()
            && self.max_amount.is_none()
            && non_blank(&self.search).is_none()
    }

    /// The date range only counts when both ends are set.
    fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.date_from, self.date_to) {
            (Some(from), Some(to)) => Some((from, to)),
            _ => None,
        }
    }
}

fn non_blank(s: &Option<String>) -> Option<&str> {
    s.as_deref().filter(|v| !v.is_empty())
}

pub fn filter_by_date_range(
    transactions: &[Transaction],
    from: NaiveDate,
    to: NaiveDate,
) -> Vec<Transaction> {
    transactions
        .iter()
        .filter(|t| t.date >= from && t.date <= to)
        .cloned()
        .collect()
}

/// Keep the transactions matching every predicate in `filters`, in input order.
pub fn apply_filters(transactions: &[Transaction], filters: &FilterOptions) -> Vec<Transaction> {
    let range = filters.date_range();
    let category = non_blank(&filters.category);
    let needle = non_blank(&filters.search).map(str::to_lowercase);

    transactions
        .iter()
        .filter(|t| match range {
            Some((from, to)) => t.date >= from && t.date <= to,
            None => true,
        })
        .filter(|t| filters.r#type.admits(t.r#type))
        .filter(|t| category.is_none_or(|c| t.category == c))
        .filter(|t| filters.min_amount.is_none_or(|min| t.amount >= min))
        .filter(|t| filters.max_amount.is_none_or(|max| t.amount <= max))
        .filter(|t| needle.as_deref().is_none_or(|n| matches_search(t, n)))
        .cloned()
        .collect()
}

fn matches_search(t: &Transaction, needle: &str) -> bool {
    let hit = |s: &str| s.to_lowercase().contains(needle);
    hit(&t.description)
        || hit(&t.category)
        || t.sub_category.as_deref().is_some_and(hit)
        || t.reference.as_deref().is_some_and(hit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn tx(id: &str, date: &str, ty: TxType, category: &str, amount: i64) -> Transaction {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Transaction {
            id: id.into(),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            description: format!("{} entry", category),
            amount: Decimal::from(amount),
            r#type: ty,
            category: category.into(),
            sub_category: None,
            reference: None,
            attachment: None,
            created_at: ts,
            updated_at: ts,
        }
    }

    fn sample() -> Vec<Transaction> {
        let mut rent = tx("t3", "2024-02-05", TxType::Expense, "Operasional", 15);
        rent.sub_category = Some("Sewa Kantor".into());
        rent.reference = Some("RENT-001".into());
        vec![
            tx("t1", "2023-12-31", TxType::Income, "Penjualan", 100),
            tx("t2", "2024-01-15", TxType::Income, "Jasa", 45),
            rent,
            tx("t4", "2024-03-01", TxType::Expense, "Marketing", 22),
        ]
    }

    fn ids(v: &[Transaction]) -> Vec<&str> {
        v.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn empty_filter_is_identity() {
        let all = sample();
        let f = FilterOptions::default();
        assert!(f.is_empty());
        assert_eq!(apply_filters(&all, &f), all);
    }

    #[test]
    fn lone_date_bound_is_ignored() {
        let all = sample();
        let f = FilterOptions {
            date_from: NaiveDate::from_ymd_opt(2024, 1, 1),
            ..Default::default()
        };
        assert!(f.is_empty());
        assert_eq!(apply_filters(&all, &f).len(), 4);

        let f = FilterOptions {
            date_to: NaiveDate::from_ymd_opt(2023, 1, 1),
            ..Default::default()
        };
        assert_eq!(apply_filters(&all, &f).len(), 4);
    }

    #[test]
    fn date_range_is_inclusive() {
        let f = FilterOptions {
            date_from: NaiveDate::from_ymd_opt(2024, 1, 15),
            date_to: NaiveDate::from_ymd_opt(2024, 3, 1),
            ..Default::default()
        };
        assert_eq!(ids(&apply_filters(&sample(), &f)), vec!["t2", "t3", "t4"]);
    }

    #[test]
    fn predicates_combine_with_and() {
        let f = FilterOptions {
            r#type: TypeFilter::Only(TxType::Expense),
            min_amount: Some(Decimal::from(20)),
            ..Default::default()
        };
        assert_eq!(ids(&apply_filters(&sample(), &f)), vec!["t4"]);

        let f = FilterOptions {
            r#type: TypeFilter::Only(TxType::Income),
            max_amount: Some(Decimal::from(45)),
            ..Default::default()
        };
        assert_eq!(ids(&apply_filters(&sample(), &f)), vec!["t2"]);
    }

    #[test]
    fn category_matches_exactly() {
        let f = FilterOptions {
            category: Some("Jasa".into()),
            ..Default::default()
        };
        assert_eq!(ids(&apply_filters(&sample(), &f)), vec!["t2"]);

        let f = FilterOptions {
            category: Some("jasa".into()),
            ..Default::default()
        };
        assert!(apply_filters(&sample(), &f).is_empty());

        let f = FilterOptions {
            category: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(apply_filters(&sample(), &f).len(), 4);
    }

    #[test]
    fn search_looks_at_sub_category_and_reference() {
        let by_sub = FilterOptions {
            search: Some("sewa".into()),
            ..Default::default()
        };
        assert_eq!(ids(&apply_filters(&sample(), &by_sub)), vec!["t3"]);

        let by_ref = FilterOptions {
            search: Some("rent-0".into()),
            ..Default::default()
        };
        assert_eq!(ids(&apply_filters(&sample(), &by_ref)), vec!["t3"]);

        let by_desc = FilterOptions {
            search: Some("MARKETING ENTRY".into()),
            ..Default::default()
        };
        assert_eq!(ids(&apply_filters(&sample(), &by_desc)), vec!["t4"]);
    }
}
