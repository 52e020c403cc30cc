// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use kasboard::store::{SqliteStore, Workbook};
use kasboard::{cli, commands, db, demo};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let conn = db::open_or_init()?;

    match matches.subcommand() {
        Some(("init", sub)) => {
            if sub.get_flag("demo") {
                let d = demo::dataset()?;
                let mut wb = Workbook::load(SqliteStore::new(&conn));
                wb.replace_all(d.categories, d.budget_items, d.transactions)?;
                info!("sample dataset loaded");
                println!(
                    "Loaded sample books: {} categories, {} budget items, {} transactions",
                    wb.categories().len(),
                    wb.budget_items().len(),
                    wb.transactions().len()
                );
            }
            println!("Database initialized at {}", db::db_path()?.display());
        }
        Some(("tx", sub)) => commands::transactions::handle(&conn, sub)?,
        Some(("budget", sub)) => commands::budgets::handle(&conn, sub)?,
        Some(("category", sub)) => commands::categories::handle(&conn, sub)?,
        Some(("report", sub)) => commands::reports::handle(&conn, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&conn, sub)?,
        Some(("doctor", _)) => commands::doctor::handle(&conn)?,
        Some(("config", sub)) => commands::settings::handle(&conn, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
