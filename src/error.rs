// Copyright 2023 Daniel Harrison. All Rights Reserved.

//! Errors surfaced while synthesizing and loading datasets.

/// Every failure is fatal to a run; there is no retry policy.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The target rejected a table's DDL.
    #[error("schema error on {table}: {message}")]
    Schema {
        /// The table being reset.
        table: String,
        /// The driver's message.
        message: String,
    },
    /// The target rejected a batch, e.g. on a constraint violation.
    #[error("insert error on {table} batch {batch}: {message}")]
    Insert {
        /// The table being loaded.
        table: String,
        /// The index of the failing batch.
        batch: usize,
        /// The driver's message.
        message: String,
    },
    /// The target could not be reached.
    #[error("connect error: {0}")]
    Connect(String),
    /// Invalid configuration or reference data.
    #[error("config error: {0}")]
    Config(String),
    /// A nested value could not be converted to or from JSON.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    /// A value could not be converted between its semantic and engine
    /// representations.
    #[error("decode error: {0}")]
    Decode(String),
    /// No table with the given name exists in the dataset.
    #[error("unknown table: {0}")]
    UnknownTable(String),
}

impl Error {
    pub(crate) fn schema(table: &str, err: impl std::fmt::Display) -> Self {
        Error::Schema {
            table: table.to_owned(),
            message: err.to_string(),
        }
    }

    pub(crate) fn insert(table: &str, batch: usize, err: impl std::fmt::Display) -> Self {
        Error::Insert {
            table: table.to_owned(),
            batch,
            message: err.to_string(),
        }
    }
}
