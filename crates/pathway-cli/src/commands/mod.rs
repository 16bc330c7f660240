//! Subcommand implementations.

use std::path::Path;

use anyhow::Result;
use pathway_core::catalog::Catalog;
use pathway_core::parser::parse_catalog;
use thiserror::Error;

pub mod generate;
pub mod init;
pub mod score;
pub mod tables;
pub mod validate;

/// Failures that map to a dedicated exit code.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The caller's input was rejected.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Scoring failed for a reason the caller cannot fix. Details are logged.
    #[error("internal error: the record could not be scored")]
    Internal,
}

impl CommandError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CommandError::InvalidInput(_) => 2,
            CommandError::Internal => 1,
        }
    }
}

/// Load the catalog file at `path`, or the built-in tables.
pub fn load_catalog(path: Option<&Path>) -> Result<Catalog> {
    match path {
        Some(path) => parse_catalog(path),
        None => Ok(Catalog::standard()),
    }
}
