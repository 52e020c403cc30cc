// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::filter::{FilterOptions, TypeFilter, apply_filters};
use crate::models::{Transaction, TransactionDraft, TxType};
use crate::store::{SqliteStore, Workbook};
use crate::utils::{
    fmt_money, maybe_print_json, new_id, parse_date, parse_decimal, pretty_table, required,
};
use anyhow::{Result, anyhow};
use chrono::Utc;
use rusqlite::Connection;
use tracing::{debug, warn};

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

pub fn parse_type(s: &str) -> Result<TxType> {
    s.parse::<TxType>().map_err(|e| anyhow!(e))
}

pub fn parse_type_filter(s: Option<&String>) -> Result<TypeFilter> {
    match s.map(|v| v.trim().to_lowercase()) {
        None => Ok(TypeFilter::All),
        Some(v) if v.is_empty() || v == "all" => Ok(TypeFilter::All),
        Some(v) => Ok(TypeFilter::Only(parse_type(&v)?)),
    }
}

/// Build the view filter from the shared `--from/--to/--type/...` flags.
pub fn filter_from_matches(sub: &clap::ArgMatches) -> Result<FilterOptions> {
    let date_from = sub.get_one::<String>("from").map(|s| parse_date(s)).transpose()?;
    let date_to = sub.get_one::<String>("to").map(|s| parse_date(s)).transpose()?;
    if date_from.is_some() != date_to.is_some() {
        warn!("date range needs both --from and --to; ignoring it");
    }
    Ok(FilterOptions {
        date_from,
        date_to,
        r#type: parse_type_filter(sub.get_one::<String>("type"))?,
        category: sub.get_one::<String>("category").cloned(),
        min_amount: sub.get_one::<String>("min").map(|s| parse_decimal(s)).transpose()?,
        max_amount: sub.get_one::<String>("max").map(|s| parse_decimal(s)).transpose()?,
        search: sub.get_one::<String>("search").cloned(),
    })
}

/// Overlay whichever fields were given on the command line onto `base`.
fn draft_from_matches(sub: &clap::ArgMatches, base: TransactionDraft) -> Result<TransactionDraft> {
    let mut d = base;
    if let Some(s) = sub.get_one::<String>("date") {
        d.date = Some(parse_date(s)?);
    }
    if let Some(s) = sub.get_one::<String>("description") {
        d.description = Some(s.trim().to_string());
    }
    if let Some(s) = sub.get_one::<String>("amount") {
        d.amount = Some(parse_decimal(s)?);
    }
    if let Some(s) = sub.get_one::<String>("type") {
        d.r#type = Some(parse_type(s)?);
    }
    if let Some(s) = sub.get_one::<String>("category") {
        d.category = Some(s.trim().to_string());
    }
    if let Some(s) = sub.get_one::<String>("sub") {
        d.sub_category = Some(s.trim().to_string()).filter(|v| !v.is_empty());
    }
    if let Some(s) = sub.get_one::<String>("reference") {
        d.reference = Some(s.trim().to_string()).filter(|v| !v.is_empty());
    }
    if let Some(s) = sub.get_one::<String>("attachment") {
        d.attachment = Some(s.trim().to_string()).filter(|v| !v.is_empty());
    }
    Ok(d)
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let draft = draft_from_matches(sub, TransactionDraft::default())?;
    let mut wb = Workbook::load(SqliteStore::new(conn));
    warn_on_unoffered_category(&wb, &draft);
    let t = wb.add_transaction(&draft, new_id(), Utc::now())?;
    println!(
        "Recorded {} {} on {} in '{}' ({})",
        t.r#type, t.amount, t.date, t.category, t.id
    );
    Ok(())
}

fn warn_on_unoffered_category(wb: &Workbook<SqliteStore<'_>>, draft: &TransactionDraft) {
    let (Some(name), Some(ty)) = (draft.category.as_deref(), draft.r#type) else {
        return;
    };
    if !wb
        .categories()
        .iter()
        .any(|c| c.name == name && c.offered_for(ty))
    {
        warn!(category = name, kind = %ty, "no active category with this name and type");
    }
}

fn edit(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = required(sub, "id")?;
    let mut wb = Workbook::load(SqliteStore::new(conn));
    let current = TransactionDraft::from(wb.transaction(id)?);
    let draft = draft_from_matches(sub, current)?;
    let t = wb.edit_transaction(id, &draft, Utc::now())?;
    println!("Updated transaction {}", t.id);
    Ok(())
}

fn remove(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = required(sub, "id")?;
    let mut wb = Workbook::load(SqliteStore::new(conn));
    let t = wb.delete_transaction(id)?;
    println!("Deleted transaction {} ('{}')", t.id, t.description);
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = query_rows(conn, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let ccy = crate::config::load(conn)?.currency;
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|t| {
                vec![
                    t.date.to_string(),
                    t.r#type.to_string(),
                    t.category.clone(),
                    t.sub_category.clone().unwrap_or_default(),
                    t.description.clone(),
                    fmt_money(&t.amount, &ccy),
                    t.reference.clone().unwrap_or_default(),
                    t.id.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Date", "Type", "Category", "Sub", "Description", "Amount", "Ref", "ID"],
                rows,
            )
        );
    }
    Ok(())
}

pub fn query_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<Transaction>> {
    let filters = filter_from_matches(sub)?;
    if !filters.is_empty() {
        debug!(?filters, "filtering transactions");
    }
    let wb = Workbook::load(SqliteStore::new(conn));
    let mut data = apply_filters(wb.transactions(), &filters);
    if let Some(limit) = sub.get_one::<usize>("limit") {
        data.truncate(*limit);
    }
    Ok(data)
}
