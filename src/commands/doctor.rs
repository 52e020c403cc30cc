// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::aggregate::{category_reports, orphan_reports};
use crate::models::{Category, TxType};
use crate::store::{RecordStore, SqliteStore, Workbook};
use crate::utils::pretty_table;
use anyhow::Result;
use rusqlite::Connection;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub issue: &'static str,
    pub detail: String,
}

fn finding(issue: &'static str, detail: String) -> Finding {
    Finding { issue, detail }
}

fn lookup<'a>(categories: &'a [Category], name: &str, ty: TxType) -> Option<&'a Category> {
    categories.iter().find(|c| c.name == name && c.r#type == ty)
}

pub fn findings<S: RecordStore>(wb: &Workbook<S>) -> Vec<Finding> {
    let categories = wb.categories();
    let mut out = Vec::new();

    // 1) Buckets with no matching category, or one that only exists under the other type
    let reports = category_reports(wb.transactions(), wb.budget_items());
    for r in orphan_reports(&reports, categories) {
        let wrong_type = categories.iter().any(|c| c.name == r.category_name);
        let issue = if wrong_type { "type_mismatch" } else { "orphan_category" };
        out.push(finding(issue, format!("{} '{}'", r.r#type, r.category_name)));
    }

    // 2) Sub-categories their parent does not list
    for t in wb.transactions() {
        let (Some(sub), Some(parent)) = (
            t.sub_category.as_deref(),
            lookup(categories, &t.category, t.r#type),
        ) else {
            continue;
        };
        if parent.sub_category(sub).is_none() {
            out.push(finding(
                "unknown_sub_category",
                format!("'{}' under '{}' (transaction {})", sub, t.category, t.id),
            ));
        }
    }

    // 3) Plans against categories no longer offered
    for b in wb.budget_items() {
        if lookup(categories, &b.category, b.r#type).is_some_and(|c| !c.is_active) {
            out.push(finding(
                "inactive_category",
                format!("budget item {} plans '{}'", b.id, b.category),
            ));
        }
    }
    out
}

pub fn handle(conn: &Connection) -> Result<()> {
    let wb = Workbook::load(SqliteStore::new(conn));
    let rows: Vec<Vec<String>> = findings(&wb)
        .into_iter()
        .map(|f| vec![f.issue.to_string(), f.detail])
        .collect();
    if rows.is_empty() {
        println!("doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
