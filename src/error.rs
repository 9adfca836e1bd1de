use std::path::PathBuf;
use thiserror::Error;

/// Failures at the loading edge (files, CLI arguments).
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("column '{column}' not found (available: {})", available.join(", "))]
    UnknownColumn {
        column: String,
        available: Vec<String>,
    },

    #[error("unsupported input format '{0}' (expected .csv or .json)")]
    UnsupportedFormat(String),

    #[error("no rows in {}", .0.display())]
    EmptyInput(PathBuf),

    #[error("invalid color '{0}' (expected #RRGGBB or #RGB)")]
    InvalidColor(String),
}
