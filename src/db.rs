// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::errors;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};

static APP: Lazy<(&str, &str, &str)> = Lazy::new(|| ("com.alphavelocity", "Kasboard", "kasboard"));

pub const DB_ENV: &str = "KASBOARD_DB";

pub fn db_path() -> Result<PathBuf> {
    if let Some(p) = std::env::var_os(DB_ENV) {
        return Ok(PathBuf::from(p));
    }
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("kasboard.sqlite"))
}

pub fn open_or_init() -> Result<Connection> {
    let path = db_path()?;
    let conn =
        Connection::open(&path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&conn)?;
    debug!(path = %path.display(), "database ready");
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> errors::Result<()> {
    conn.execute_batch(
        r#"
    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    -- one JSON blob per collection, always read and written whole
    CREATE TABLE IF NOT EXISTS kv_store(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL,
        updated_at TEXT NOT NULL DEFAULT (datetime('now'))
    );
    "#,
    )?;
    Ok(())
}

/// Read the blob stored under `key`, or `default` when it is absent or unreadable.
pub fn get<T: DeserializeOwned>(conn: &Connection, key: &str, default: T) -> T {
    let raw: Option<String> = match conn
        .query_row("SELECT value FROM kv_store WHERE key=?1", params![key], |r| {
            r.get(0)
        })
        .optional()
    {
        Ok(v) => v,
        Err(e) => {
            warn!(key, error = %e, "read failed, using default");
            return default;
        }
    };
    let Some(raw) = raw else {
        return default;
    };
    match serde_json::from_str(&raw) {
        Ok(v) => v,
        Err(e) => {
            warn!(key, error = %e, "stored value is corrupt, using default");
            default
        }
    }
}

pub fn set<T: Serialize + ?Sized>(conn: &Connection, key: &str, value: &T) -> errors::Result<()> {
    let json = serde_json::to_string(value)?;
    conn.execute(
        "INSERT INTO kv_store(key, value, updated_at) VALUES (?1, ?2, datetime('now'))
         ON CONFLICT(key) DO UPDATE SET value=excluded.value, updated_at=excluded.updated_at",
        params![key, json],
    )?;
    debug!(key, bytes = json.len(), "stored");
    Ok(())
}
