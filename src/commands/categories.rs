// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::transactions::{parse_type, parse_type_filter};
use crate::filter::TypeFilter;
use crate::models::{Category, TxType};
use crate::store::{SqliteStore, Workbook};
use crate::utils::{maybe_print_json, new_id, pretty_table, required};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let mut wb = Workbook::load(SqliteStore::new(conn));
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = required(sub, "name")?;
            let ty = parse_type(required(sub, "type")?)?;
            let color = required(sub, "color")?;
            let c = wb.add_category(new_id(), name, ty, color)?;
            println!("Added {} category '{}'", c.r#type, c.name);
        }
        Some(("list", sub)) => list(&wb, sub)?,
        Some(("rm", sub)) => {
            let id = target(&wb, sub)?;
            let c = wb.delete_category(&id)?;
            println!("Removed category '{}'; existing records keep the name", c.name);
        }
        Some(("sub", sub)) => {
            let id = target(&wb, sub)?;
            let name = required(sub, "sub")?;
            let color = required(sub, "color")?;
            let s = wb.add_sub_category(&id, new_id(), name, color)?;
            println!("Added sub-category '{}'", s.name);
        }
        Some(("enable", sub)) => {
            let id = target(&wb, sub)?;
            let c = wb.set_category_active(&id, true)?;
            println!("Category '{}' is active", c.name);
        }
        Some(("disable", sub)) => {
            let id = target(&wb, sub)?;
            let c = wb.set_category_active(&id, false)?;
            println!("Category '{}' is inactive", c.name);
        }
        _ => {}
    }
    Ok(())
}

fn target(wb: &Workbook<SqliteStore<'_>>, sub: &clap::ArgMatches) -> Result<String> {
    let name = required(sub, "name")?;
    let ty: Option<TxType> = sub
        .get_one::<String>("type")
        .map(|s| parse_type(s))
        .transpose()?;
    Ok(wb.category_id(name, ty)?)
}

pub fn query_rows(wb: &Workbook<SqliteStore<'_>>, sub: &clap::ArgMatches) -> Result<Vec<Category>> {
    let ty = parse_type_filter(sub.get_one::<String>("type"))?;
    Ok(wb
        .categories()
        .iter()
        .filter(|c| match ty {
            TypeFilter::All => true,
            TypeFilter::Only(t) => c.r#type == t,
        })
        .cloned()
        .collect())
}

fn list(wb: &Workbook<SqliteStore<'_>>, sub: &clap::ArgMatches) -> Result<()> {
    let data = query_rows(wb, sub)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        return Ok(());
    }
    let rows = data
        .iter()
        .map(|c| {
            let subs: Vec<String> = c
                .sub_categories
                .iter()
                .map(|s| {
                    if s.is_active {
                        s.name.clone()
                    } else {
                        format!("{} (inactive)", s.name)
                    }
                })
                .collect();
            vec![
                c.name.clone(),
                c.r#type.to_string(),
                if c.is_active { "yes" } else { "no" }.to_string(),
                c.color.clone(),
                subs.join(", "),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Category", "Type", "Active", "Color", "Sub-categories"], rows)
    );
    Ok(())
}
