// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::aggregate::budget_total;
use crate::commands::transactions::{parse_type, parse_type_filter};
use crate::filter::TypeFilter;
use crate::models::{BudgetItem, BudgetItemDraft, BudgetPeriod, TxType};
use crate::store::{SqliteStore, Workbook};
use crate::utils::{fmt_money, maybe_print_json, new_id, parse_decimal, pretty_table, required};
use anyhow::{Result, anyhow};
use chrono::Utc;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("edit", sub)) => edit(conn, sub)?,
        Some(("rm", sub)) => remove(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn draft_from_matches(sub: &clap::ArgMatches, base: BudgetItemDraft) -> Result<BudgetItemDraft> {
    let mut d = base;
    if let Some(s) = sub.get_one::<String>("category") {
        d.category = Some(s.trim().to_string());
    }
    if let Some(s) = sub.get_one::<String>("type") {
        d.r#type = Some(parse_type(s)?);
    }
    if let Some(s) = sub.get_one::<String>("amount") {
        d.planned_amount = Some(parse_decimal(s)?);
    }
    if let Some(s) = sub.get_one::<String>("period") {
        d.period = Some(s.parse::<BudgetPeriod>().map_err(|e| anyhow!(e))?);
    }
    if let Some(s) = sub.get_one::<String>("sub") {
        d.sub_category = Some(s.trim().to_string()).filter(|v| !v.is_empty());
    }
    if let Some(s) = sub.get_one::<String>("description") {
        d.description = Some(s.trim().to_string()).filter(|v| !v.is_empty());
    }
    Ok(d)
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let draft = draft_from_matches(sub, BudgetItemDraft::default())?;
    let mut wb = Workbook::load(SqliteStore::new(conn));
    let b = wb.add_budget_item(&draft, new_id(), Utc::now())?;
    println!(
        "Planned {} {} {} for '{}' ({})",
        b.period, b.r#type, b.planned_amount, b.category, b.id
    );
    Ok(())
}

fn edit(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = required(sub, "id")?;
    let mut wb = Workbook::load(SqliteStore::new(conn));
    let current = BudgetItemDraft::from(wb.budget_item(id)?);
    let draft = draft_from_matches(sub, current)?;
    let b = wb.edit_budget_item(id, &draft, Utc::now())?;
    println!("Updated budget item {}", b.id);
    Ok(())
}

fn remove(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = required(sub, "id")?;
    let mut wb = Workbook::load(SqliteStore::new(conn));
    let b = wb.delete_budget_item(id)?;
    println!("Deleted budget item {} ('{}')", b.id, b.category);
    Ok(())
}

pub fn query_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<BudgetItem>> {
    let ty = parse_type_filter(sub.get_one::<String>("type"))?;
    let wb = Workbook::load(SqliteStore::new(conn));
    Ok(wb
        .budget_items()
        .iter()
        .filter(|b| match ty {
            TypeFilter::All => true,
            TypeFilter::Only(t) => b.r#type == t,
        })
        .cloned()
        .collect())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = query_rows(conn, sub)?;
    if maybe_print_json(json_flag, jsonl_flag, &data)? {
        return Ok(());
    }
    let ccy = crate::config::load(conn)?.currency;
    let rows: Vec<Vec<String>> = data
        .iter()
        .map(|b| {
            vec![
                b.category.clone(),
                b.sub_category.clone().unwrap_or_default(),
                b.r#type.to_string(),
                fmt_money(&b.planned_amount, &ccy),
                b.period.to_string(),
                b.description.clone().unwrap_or_default(),
                b.id.clone(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["Category", "Sub", "Type", "Planned", "Period", "Description", "ID"],
            rows
        )
    );
    // Summed as stored, whatever the period.
    println!(
        "Planned income: {}  Planned expense: {}",
        fmt_money(&budget_total(&data, TxType::Income), &ccy),
        fmt_money(&budget_total(&data, TxType::Expense), &ccy)
    );
    Ok(())
}
