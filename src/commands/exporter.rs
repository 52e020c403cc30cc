// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::aggregate::category_reports;
use crate::store::{SqliteStore, Workbook};
use crate::utils::required;
use anyhow::{Result, bail};
use rusqlite::Connection;
use serde_json::json;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Csv,
    Json,
}

fn parse_format(s: &str) -> Result<Format> {
    match s.trim().to_lowercase().as_str() {
        "csv" => Ok(Format::Csv),
        "json" => Ok(Format::Json),
        other => bail!("Unknown format: {} (use csv|json)", other),
    }
}

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => export_transactions(conn, sub),
        Some(("categories", sub)) => export_categories(conn, sub),
        Some(("report", sub)) => export_report(conn, sub),
        _ => Ok(()),
    }
}

fn export_transactions(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = parse_format(required(sub, "format")?)?;
    let out = required(sub, "out")?;
    let wb = Workbook::load(SqliteStore::new(conn));
    let mut txs = wb.transactions().to_vec();
    txs.sort_by(|a, b| a.date.cmp(&b.date));

    match fmt {
        Format::Csv => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record([
                "date",
                "type",
                "category",
                "sub_category",
                "description",
                "amount",
                "reference",
                "id",
            ])?;
            for t in &txs {
                wtr.write_record([
                    t.date.to_string(),
                    t.r#type.to_string(),
                    t.category.clone(),
                    t.sub_category.clone().unwrap_or_default(),
                    t.description.clone(),
                    t.amount.to_string(),
                    t.reference.clone().unwrap_or_default(),
                    t.id.clone(),
                ])?;
            }
            wtr.flush()?;
        }
        Format::Json => {
            let items: Vec<_> = txs
                .iter()
                .map(|t| {
                    json!({
                        "date": t.date.to_string(),
                        "type": t.r#type.as_str(),
                        "category": t.category,
                        "subCategory": t.sub_category,
                        "description": t.description,
                        "amount": t.amount.to_string(),
                        "reference": t.reference,
                        "id": t.id,
                    })
                })
                .collect();
            std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
        }
    }
    info!(rows = txs.len(), path = %out, "transactions exported");
    println!("Exported {} transactions to {}", txs.len(), out);
    Ok(())
}

fn export_categories(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = parse_format(required(sub, "format")?)?;
    let out = required(sub, "out")?;
    let wb = Workbook::load(SqliteStore::new(conn));
    let categories = wb.categories();

    match fmt {
        Format::Csv => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record(["id", "name", "type", "color", "active", "sub_categories"])?;
            for c in categories {
                let subs: Vec<&str> = c.sub_categories.iter().map(|s| s.name.as_str()).collect();
                wtr.write_record([
                    c.id.clone(),
                    c.name.clone(),
                    c.r#type.to_string(),
                    c.color.clone(),
                    c.is_active.to_string(),
                    subs.join(";"),
                ])?;
            }
            wtr.flush()?;
        }
        Format::Json => {
            std::fs::write(out, serde_json::to_string_pretty(categories)?)?;
        }
    }
    info!(rows = categories.len(), path = %out, "categories exported");
    println!("Exported {} categories to {}", categories.len(), out);
    Ok(())
}

fn export_report(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = parse_format(required(sub, "format")?)?;
    let out = required(sub, "out")?;
    let wb = Workbook::load(SqliteStore::new(conn));
    let reports = category_reports(wb.transactions(), wb.budget_items());

    match fmt {
        Format::Csv => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record([
                "category",
                "type",
                "budgeted",
                "actual",
                "variance",
                "variance_percent",
                "health",
            ])?;
            for r in &reports {
                wtr.write_record([
                    r.category_name.clone(),
                    r.r#type.to_string(),
                    r.budgeted.to_string(),
                    r.actual.to_string(),
                    r.variance.to_string(),
                    r.variance_percent.round_dp(2).to_string(),
                    r.health().to_string(),
                ])?;
            }
            wtr.flush()?;
        }
        Format::Json => {
            std::fs::write(out, serde_json::to_string_pretty(&reports)?)?;
        }
    }
    info!(rows = reports.len(), path = %out, "category report exported");
    println!("Exported {} report rows to {}", reports.len(), out);
    Ok(())
}
