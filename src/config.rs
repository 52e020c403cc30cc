// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Runtime settings kept in the `settings` table.

use crate::errors::{Error, Result};
use crate::trends::MAX_WINDOW;
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;

pub const KEY_CURRENCY: &str = "currency";
pub const KEY_TREND_MONTHS: &str = "trend_months";
pub const KNOWN_KEYS: &[&str] = &[KEY_CURRENCY, KEY_TREND_MONTHS];

pub const DEFAULT_CURRENCY: &str = "IDR";
pub const DEFAULT_TREND_MONTHS: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settings {
    pub currency: String,
    pub trend_months: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            currency: DEFAULT_CURRENCY.to_string(),
            trend_months: DEFAULT_TREND_MONTHS,
        }
    }
}

pub fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let v: Option<String> = conn
        .query_row(
            "SELECT value FROM settings WHERE key=?1",
            params![key],
            |r| r.get(0),
        )
        .optional()?;
    Ok(v)
}

pub fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<()> {
    let value = value.trim();
    match key {
        KEY_CURRENCY => {
            if value.is_empty() {
                return Err(Error::Config("currency must not be empty".into()));
            }
        }
        KEY_TREND_MONTHS => {
            parse_trend_months(value)?;
        }
        other => {
            return Err(Error::Config(format!(
                "unknown setting '{}' (known: {})",
                other,
                KNOWN_KEYS.join(", ")
            )));
        }
    }
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, value],
    )?;
    Ok(())
}

fn parse_trend_months(value: &str) -> Result<usize> {
    match value.parse::<usize>() {
        Ok(m) if m <= MAX_WINDOW => Ok(m),
        _ => Err(Error::Config(format!(
            "trend_months must be a whole number from 0 to {}, got '{}'",
            MAX_WINDOW, value
        ))),
    }
}

pub fn load(conn: &Connection) -> Result<Settings> {
    let mut s = Settings::default();
    if let Some(c) = get_setting(conn, KEY_CURRENCY)? {
        s.currency = c;
    }
    if let Some(m) = get_setting(conn, KEY_TREND_MONTHS)? {
        s.trend_months = parse_trend_months(&m)?;
    }
    Ok(s)
}
