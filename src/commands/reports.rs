// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::aggregate::{
    average_monthly, category_reports, group_by_category, projection, recent, summary, total,
    transaction_stats,
};
use crate::commands::transactions::filter_from_matches;
use crate::filter::{apply_filters, filter_by_date_range};
use crate::models::{
    CashflowSummary, CategoryReport, HealthStatus, ReportData, Transaction, TransactionStats,
    TrendPoint, TxType,
};
use crate::store::{SqliteStore, Workbook};
use crate::trends::{TrendAverages, month_bounds, month_label, report_data, trends};
use crate::utils::{fmt_money, fmt_percent, maybe_print_json, pretty_table};
use anyhow::Result;
use chrono::{Local, NaiveDate};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let ccy = crate::config::load(conn)?.currency;
    let today = Local::now().date_naive();
    match m.subcommand() {
        Some(("summary", sub)) => print_summary(conn, sub, &ccy, today)?,
        Some(("categories", sub)) => print_categories(conn, sub, &ccy)?,
        Some(("trends", sub)) => print_trends(conn, sub, &ccy, today)?,
        Some(("stats", sub)) => print_stats(conn, sub, &ccy)?,
        Some(("recent", sub)) => print_recent(conn, sub, &ccy)?,
        Some(("forecast", sub)) => print_forecast(conn, sub, &ccy, today)?,
        Some(("full", sub)) => {
            let data = full_report(conn, sub, today)?;
            println!("{}", serde_json::to_string_pretty(&data)?);
        }
        _ => {}
    }
    Ok(())
}

pub fn cashflow_summary(
    conn: &Connection,
    sub: &clap::ArgMatches,
    today: NaiveDate,
) -> Result<CashflowSummary> {
    let filters = filter_from_matches(sub)?;
    let wb = Workbook::load(SqliteStore::new(conn));
    let txs = apply_filters(wb.transactions(), &filters);
    let label = sub
        .get_one::<String>("period")
        .cloned()
        .unwrap_or_else(|| month_label(today));
    Ok(summary(&txs, wb.budget_items(), &label))
}

fn print_summary(
    conn: &Connection,
    sub: &clap::ArgMatches,
    ccy: &str,
    today: NaiveDate,
) -> Result<()> {
    let s = cashflow_summary(conn, sub, today)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &s)? {
        return Ok(());
    }
    let rows = vec![
        vec![
            "Income".to_string(),
            fmt_money(&s.total_income, ccy),
            fmt_money(&s.budgeted_income, ccy),
            fmt_money(&s.budget_variance_income, ccy),
        ],
        vec![
            "Expense".to_string(),
            fmt_money(&s.total_expense, ccy),
            fmt_money(&s.budgeted_expense, ccy),
            fmt_money(&s.budget_variance_expense, ccy),
        ],
        vec![
            "Net".to_string(),
            fmt_money(&s.net_cashflow, ccy),
            fmt_money(&(s.budgeted_income - s.budgeted_expense), ccy),
            String::new(),
        ],
    ];
    println!("Period: {}", s.period);
    println!(
        "{}",
        pretty_table(&["", "Actual", "Budget", "Variance"], rows)
    );
    Ok(())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRow {
    #[serde(flatten)]
    pub report: CategoryReport,
    pub utilization: Decimal,
    pub health: HealthStatus,
}

pub fn category_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<CategoryRow>> {
    let filters = filter_from_matches(sub)?;
    let wb = Workbook::load(SqliteStore::new(conn));
    let txs = apply_filters(wb.transactions(), &filters);
    Ok(category_reports(&txs, wb.budget_items())
        .into_iter()
        .map(|report| CategoryRow {
            utilization: report.utilization(),
            health: report.health(),
            report,
        })
        .collect())
}

fn print_categories(conn: &Connection, sub: &clap::ArgMatches, ccy: &str) -> Result<()> {
    let data = category_rows(conn, sub)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        return Ok(());
    }
    let rows = data
        .iter()
        .map(|r| {
            vec![
                r.report.category_name.clone(),
                r.report.r#type.to_string(),
                fmt_money(&r.report.budgeted, ccy),
                fmt_money(&r.report.actual, ccy),
                fmt_money(&r.report.variance, ccy),
                fmt_percent(&r.report.variance_percent),
                fmt_percent(&r.utilization),
                r.health.to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["Category", "Type", "Budget", "Actual", "Variance", "Var %", "Used", "Health"],
            rows
        )
    );
    Ok(())
}

pub fn trend_points(
    conn: &Connection,
    sub: &clap::ArgMatches,
    today: NaiveDate,
) -> Result<Vec<TrendPoint>> {
    let months = match sub.get_one::<u16>("months") {
        Some(m) => usize::from(*m),
        None => crate::config::load(conn)?.trend_months,
    };
    let wb = Workbook::load(SqliteStore::new(conn));
    Ok(trends(wb.transactions(), wb.budget_items(), months, today)?)
}

fn print_trends(
    conn: &Connection,
    sub: &clap::ArgMatches,
    ccy: &str,
    today: NaiveDate,
) -> Result<()> {
    let points = trend_points(conn, sub, today)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &points)? {
        return Ok(());
    }
    let rows = points
        .iter()
        .map(|p| {
            vec![
                p.period.clone(),
                fmt_money(&p.income, ccy),
                fmt_money(&p.expense, ccy),
                fmt_money(&p.actual, ccy),
                fmt_money(&p.budget, ccy),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Month", "Income", "Expense", "Net", "Budget (net)"], rows)
    );
    let avg = TrendAverages::from_points(&points);
    println!(
        "Average per month: income {}, expense {}, net {}",
        fmt_money(&avg.income, ccy),
        fmt_money(&avg.expense, ccy),
        fmt_money(&avg.actual, ccy)
    );
    Ok(())
}

fn filtered(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<Transaction>> {
    let filters = filter_from_matches(sub)?;
    let wb = Workbook::load(SqliteStore::new(conn));
    Ok(apply_filters(wb.transactions(), &filters))
}

pub fn stats(conn: &Connection, sub: &clap::ArgMatches) -> Result<TransactionStats> {
    Ok(transaction_stats(&filtered(conn, sub)?))
}

fn print_stats(conn: &Connection, sub: &clap::ArgMatches, ccy: &str) -> Result<()> {
    let txs = filtered(conn, sub)?;
    let s = transaction_stats(&txs);
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &s)? {
        return Ok(());
    }
    let rows = vec![
        vec![
            "Income".to_string(),
            s.income_count.to_string(),
            fmt_money(&s.total_income, ccy),
        ],
        vec![
            "Expense".to_string(),
            s.expense_count.to_string(),
            fmt_money(&s.total_expense, ccy),
        ],
        vec!["Net".to_string(), s.count.to_string(), fmt_money(&s.net, ccy)],
    ];
    println!("{}", pretty_table(&["", "Count", "Total"], rows));

    let by_category = group_by_category(&txs)
        .into_iter()
        .map(|(name, group)| {
            let g = transaction_stats(&group);
            vec![name, g.count.to_string(), fmt_money(&g.net, ccy)]
        })
        .collect();
    println!("{}", pretty_table(&["Category", "Count", "Net"], by_category));
    Ok(())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Forecast {
    pub months_observed: u32,
    pub average_income: Decimal,
    pub average_expense: Decimal,
    pub current_cashflow: Decimal,
    pub months_ahead: u32,
    pub projected_cashflow: Decimal,
}

/// Monthly averages over the last `--months` calendar months (current one
/// included), projected `--ahead` months past today's net position.
pub fn forecast(conn: &Connection, sub: &clap::ArgMatches, today: NaiveDate) -> Result<Forecast> {
    let observed = sub.get_one::<u32>("months").copied().unwrap_or(3);
    let ahead = sub.get_one::<u32>("ahead").copied().unwrap_or(3);
    let wb = Workbook::load(SqliteStore::new(conn));
    let all = wb.transactions();

    let recent_txs = match observed.checked_sub(1).and_then(|b| month_bounds(today, b)) {
        Some((start, _)) => filter_by_date_range(all, start, today),
        None => Vec::new(),
    };
    let average_income = average_monthly(&recent_txs, TxType::Income, observed);
    let average_expense = average_monthly(&recent_txs, TxType::Expense, observed);
    let current_cashflow = total(all, TxType::Income) - total(all, TxType::Expense);
    Ok(Forecast {
        months_observed: observed,
        average_income,
        average_expense,
        current_cashflow,
        months_ahead: ahead,
        projected_cashflow: projection(current_cashflow, average_income, average_expense, ahead),
    })
}

fn print_forecast(
    conn: &Connection,
    sub: &clap::ArgMatches,
    ccy: &str,
    today: NaiveDate,
) -> Result<()> {
    let f = forecast(conn, sub, today)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &f)? {
        return Ok(());
    }
    let rows = vec![
        vec![
            format!("Average income ({} mo)", f.months_observed),
            fmt_money(&f.average_income, ccy),
        ],
        vec![
            format!("Average expense ({} mo)", f.months_observed),
            fmt_money(&f.average_expense, ccy),
        ],
        vec!["Net to date".to_string(), fmt_money(&f.current_cashflow, ccy)],
        vec![
            format!("Projected in {} mo", f.months_ahead),
            fmt_money(&f.projected_cashflow, ccy),
        ],
    ];
    println!("{}", pretty_table(&["", "Amount"], rows));
    Ok(())
}

pub fn recent_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<Transaction>> {
    let limit = sub.get_one::<usize>("limit").copied().unwrap_or(8);
    let wb = Workbook::load(SqliteStore::new(conn));
    Ok(recent(wb.transactions(), limit))
}

fn print_recent(conn: &Connection, sub: &clap::ArgMatches, ccy: &str) -> Result<()> {
    let data = recent_rows(conn, sub)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        return Ok(());
    }
    let rows = data
        .iter()
        .map(|t| {
            let signed = match t.r#type {
                TxType::Income => t.amount,
                TxType::Expense => -t.amount,
            };
            vec![
                t.date.to_string(),
                t.description.clone(),
                t.category.clone(),
                fmt_money(&signed, ccy),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Date", "Description", "Category", "Amount"], rows)
    );
    Ok(())
}

/// Everything at once, for feeding another renderer. Always JSON.
pub fn full_report(
    conn: &Connection,
    sub: &clap::ArgMatches,
    today: NaiveDate,
) -> Result<ReportData> {
    let filters = filter_from_matches(sub)?;
    let months = match sub.get_one::<u16>("months") {
        Some(m) => usize::from(*m),
        None => crate::config::load(conn)?.trend_months,
    };
    let label = sub
        .get_one::<String>("period")
        .cloned()
        .unwrap_or_else(|| month_label(today));
    let wb = Workbook::load(SqliteStore::new(conn));
    let txs = apply_filters(wb.transactions(), &filters);
    Ok(report_data(&txs, wb.budget_items(), &label, months, today)?)
}
