// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    #[error("Trend window of {window} months is out of range (max {max})")]
    TrendWindow { window: usize, max: usize },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Rusqlite(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Error::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// The rule messages when this is a validation failure.
    pub fn messages(&self) -> Option<&[String]> {
        match self {
            Error::Validation(m) => Some(m),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
