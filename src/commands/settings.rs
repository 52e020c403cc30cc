// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::{self, KNOWN_KEYS};
use crate::utils::{pretty_table, required};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("get", sub)) => match sub.get_one::<String>("key") {
            Some(key) => println!("{}", value_of(conn, key)?),
            None => {
                let mut rows = Vec::new();
                for key in KNOWN_KEYS {
                    rows.push(vec![key.to_string(), value_of(conn, key)?]);
                }
                println!("{}", pretty_table(&["Key", "Value"], rows));
            }
        },
        Some(("set", sub)) => {
            let key = required(sub, "key")?;
            let value = required(sub, "value")?;
            config::set_setting(conn, key, value)?;
            println!("{} = {}", key, value.trim());
        }
        _ => {}
    }
    Ok(())
}

/// Stored value, or the effective default when unset.
pub fn value_of(conn: &Connection, key: &str) -> Result<String> {
    let settings = config::load(conn)?;
    Ok(match key {
        config::KEY_CURRENCY => settings.currency,
        config::KEY_TREND_MONTHS => settings.trend_months.to_string(),
        other => anyhow::bail!(
            "unknown setting '{}' (known: {})",
            other,
            KNOWN_KEYS.join(", ")
        ),
    })
}
