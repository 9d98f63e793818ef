//! CLI support for matchtree
//!
//! Provides programmatic access to the `matchtree` commands so they can be
//! embedded in other tools and exercised from tests.

mod check;
mod docs;
mod explain;

pub use check::{CheckOptions, CheckResult, execute_check};
pub use docs::{DocCategory, get_doc_category, get_docs_overview};
pub use explain::{Explanation, explain};

use std::io;

use thiserror::Error;

use crate::ParseError;

/// Errors that can occur during CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Invalid filter: {0}")]
    Parse(#[from] ParseError),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("No input provided. Use --input or pipe JSON to stdin.")]
    NoInput,

    #[error("Input must be a document or an array of documents, got {0}")]
    InputNotDocument(&'static str),

    #[error("Unknown category: '{0}'\nRun 'matchtree docs' to see available categories.")]
    UnknownCategory(String),
}
