//! Evaluate a filter against JSON documents

use tracing::{debug, warn};

use super::CliError;
use crate::{
    MatchDetails, MatchExpression, Parser,
    convert::{json_to_value, value_to_json},
    value::Value,
};

/// Options for the check command
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// The filter document, as JSON text
    pub filter: String,
    /// JSON input: one document or an array of documents
    pub input: Option<String>,
    /// Pretty-print the output
    pub pretty: bool,
    /// Only validate the filter, don't evaluate it
    pub syntax_only: bool,
}

/// Result of a check operation
#[derive(Debug)]
pub enum CheckResult {
    /// The filter parsed successfully
    SyntaxValid,
    /// The input documents that satisfy the filter, in input order
    Matches {
        matched: Vec<serde_json::Value>,
        /// Documents evaluated; skipped non-document entries are not counted
        examined: usize,
    },
}

pub(crate) fn parse_filter_text(filter: &str) -> Result<Box<MatchExpression>, CliError> {
    let json: serde_json::Value = serde_json::from_str(filter)?;
    Ok(Parser::new().parse_json(json)?)
}

/// Execute a matchtree check operation
pub fn execute_check(options: &CheckOptions) -> Result<CheckResult, CliError> {
    let filter = parse_filter_text(&options.filter)?;

    if options.syntax_only {
        return Ok(CheckResult::SyntaxValid);
    }

    let json_str = options.input.as_ref().ok_or(CliError::NoInput)?;
    let input: serde_json::Value = serde_json::from_str(json_str)?;

    let documents = match json_to_value(input) {
        Value::Object(doc) => vec![Value::Object(doc)],
        Value::Array(items) => items,
        other => return Err(CliError::InputNotDocument(other.type_name())),
    };

    let mut examined = 0;
    let mut matched = Vec::new();
    for (i, value) in documents.into_iter().enumerate() {
        let doc = match value {
            Value::Object(doc) => doc,
            other => {
                warn!(index = i, kind = other.type_name(), "skipping non-document input");
                continue;
            }
        };
        examined += 1;

        let mut details = MatchDetails::new();
        details.request_elem_match_key();
        if filter.matches(&doc, Some(&mut details)) {
            debug!(index = i, %details, "document matched");
            matched.push(value_to_json(Value::Object(doc)));
        }
    }

    Ok(CheckResult::Matches { matched, examined })
}
