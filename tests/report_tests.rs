// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use kasboard::models::HealthStatus;
use kasboard::store::{SqliteStore, Workbook};
use kasboard::{cli, commands::reports, config, db, demo};
use rusqlite::Connection;
use rust_decimal::Decimal;

fn demo_conn() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    let d = demo::dataset().unwrap();
    let mut wb = Workbook::load(SqliteStore::new(&conn));
    wb.replace_all(d.categories, d.budget_items, d.transactions)
        .unwrap();
    conn
}

fn report_matches(args: &[&str]) -> clap::ArgMatches {
    let mut argv = vec!["kasboard", "report"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    match matches.subcommand() {
        Some(("report", report_m)) => match report_m.subcommand() {
            Some((_, sub)) => sub.clone(),
            None => panic!("no report view"),
        },
        _ => panic!("no report subcommand"),
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 2, 20).unwrap()
}

fn m(n: i64) -> Decimal {
    Decimal::from(n) * Decimal::from(1_000_000)
}

#[test]
fn summary_over_the_sample_books() {
    let conn = demo_conn();
    let sub = report_matches(&["summary", "--period", "FY2024"]);
    let s = reports::cashflow_summary(&conn, &sub, today()).unwrap();
    assert_eq!(s.period, "FY2024");
    assert_eq!(s.total_income, "366.8".parse::<Decimal>().unwrap() * m(1));
    assert_eq!(s.total_expense, "218.2".parse::<Decimal>().unwrap() * m(1));
    assert_eq!(s.net_cashflow, "148.6".parse::<Decimal>().unwrap() * m(1));
    assert_eq!(s.budgeted_income, m(202));
    assert_eq!(s.budgeted_expense, m(131));
}

#[test]
fn summary_label_defaults_to_current_month_and_respects_filters() {
    let conn = demo_conn();
    let sub = report_matches(&["summary", "--from", "2024-02-01", "--to", "2024-02-29"]);
    let s = reports::cashflow_summary(&conn, &sub, today()).unwrap();
    assert_eq!(s.period, "Feb 2024");
    assert_eq!(s.total_income, m(195));
    assert_eq!(s.total_expense, m(96));
    // Budget totals do not follow the transaction filter.
    assert_eq!(s.budgeted_income, m(202));
}

#[test]
fn category_rows_sorted_with_health() {
    let conn = demo_conn();
    let sub = report_matches(&["categories"]);
    let rows = reports::category_rows(&conn, &sub).unwrap();
    let names: Vec<&str> = rows.iter().map(|r| r.report.category_name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "Biaya Administrasi",
            "Biaya Marketing",
            "Biaya Operasional",
            "Pendapatan Lain-lain",
            "Pendapatan Operasional",
        ]
    );

    let admin = &rows[0];
    assert_eq!(admin.report.actual, Decimal::ZERO);
    assert_eq!(admin.report.variance, -m(3));
    assert_eq!(admin.report.variance_percent, Decimal::from(-100));
    assert_eq!(admin.health, HealthStatus::Excellent);
    assert_eq!(admin.utilization, Decimal::ZERO);

    let marketing = &rows[1];
    assert_eq!(marketing.report.actual, m(40));
    assert_eq!(marketing.report.variance, m(15));
    assert_eq!(marketing.report.variance_percent, Decimal::from(60));
    assert_eq!(marketing.health, HealthStatus::Danger);
    assert_eq!(marketing.utilization, Decimal::from(160));

    let other_income = &rows[3];
    assert_eq!(other_income.report.variance, "-0.2".parse::<Decimal>().unwrap() * m(1));
    assert_eq!(other_income.health, HealthStatus::Warning);
}

#[test]
fn trends_use_configured_window() {
    let conn = demo_conn();
    config::set_setting(&conn, config::KEY_TREND_MONTHS, "3").unwrap();
    let sub = report_matches(&["trends"]);
    let points = reports::trend_points(&conn, &sub, today()).unwrap();
    let labels: Vec<&str> = points.iter().map(|p| p.period.as_str()).collect();
    assert_eq!(labels, vec!["Dec 2023", "Jan 2024", "Feb 2024"]);

    assert_eq!(points[0].income, Decimal::ZERO);
    assert_eq!(points[1].income, "171.8".parse::<Decimal>().unwrap() * m(1));
    assert_eq!(points[1].expense, "122.2".parse::<Decimal>().unwrap() * m(1));
    assert_eq!(points[2].actual, m(99));
    for p in &points {
        assert_eq!(p.budget, m(71));
    }

    let sub = report_matches(&["trends", "--months", "1"]);
    assert_eq!(reports::trend_points(&conn, &sub, today()).unwrap().len(), 1);
}

#[test]
fn stats_count_by_type() {
    let conn = demo_conn();
    let sub = report_matches(&["stats", "--category", "Biaya Operasional"]);
    let s = reports::stats(&conn, &sub).unwrap();
    assert_eq!(s.count, 4);
    assert_eq!(s.expense_count, 4);
    assert_eq!(s.income_count, 0);
    assert_eq!(s.net, -("178.2".parse::<Decimal>().unwrap() * m(1)));
}

#[test]
fn full_report_bundles_views() {
    let conn = demo_conn();
    let sub = report_matches(&["full", "--months", "2", "--type", "income"]);
    let r = reports::full_report(&conn, &sub, today()).unwrap();
    assert_eq!(r.period, "Feb 2024");
    assert_eq!(r.summary.total_expense, Decimal::ZERO);
    assert_eq!(r.trends.len(), 2);
    // Expense buckets still appear from the budget side.
    assert_eq!(r.categories.len(), 5);
}

#[test]
fn forecast_projects_from_recent_averages() {
    let conn = demo_conn();
    let sub = report_matches(&["forecast", "--months", "2", "--ahead", "3"]);
    let f = reports::forecast(&conn, &sub, today()).unwrap();
    assert_eq!(f.average_income, "183.4".parse::<Decimal>().unwrap() * m(1));
    assert_eq!(f.average_expense, "109.1".parse::<Decimal>().unwrap() * m(1));
    assert_eq!(f.current_cashflow, "148.6".parse::<Decimal>().unwrap() * m(1));
    assert_eq!(f.projected_cashflow, "371.5".parse::<Decimal>().unwrap() * m(1));

    // A window that only covers March sees nothing.
    let march = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
    let sub = report_matches(&["forecast", "--months", "1"]);
    let f = reports::forecast(&conn, &sub, march).unwrap();
    assert_eq!(f.average_income, Decimal::ZERO);
    assert_eq!(f.projected_cashflow, f.current_cashflow);
}

#[test]
fn recent_defaults_to_eight_newest() {
    let conn = demo_conn();
    let rows = reports::recent_rows(&conn, &report_matches(&["recent"])).unwrap();
    assert_eq!(rows.len(), 8);
    assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(2024, 2, 20).unwrap());
    assert!(rows.windows(2).all(|w| w[0].date >= w[1].date));

    let rows = reports::recent_rows(&conn, &report_matches(&["recent", "--limit", "2"])).unwrap();
    assert_eq!(rows.len(), 2);
}

#[test]
fn trends_reject_windows_past_the_cap() {
    let conn = demo_conn();
    assert!(config::set_setting(&conn, config::KEY_TREND_MONTHS, "500").is_err());
    let sub = report_matches(&["trends", "--months", "120"]);
    assert_eq!(reports::trend_points(&conn, &sub, today()).unwrap().len(), 120);
}
