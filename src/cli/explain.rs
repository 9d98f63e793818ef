//! Show how a filter is understood

use super::{CliError, check::parse_filter_text};
use crate::{output::to_json, output::to_json_pretty, value::Value};

/// The canonical form of a filter and its tree rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Explanation {
    pub canonical: String,
    pub tree: String,
}

pub fn explain(filter: &str, pretty: bool) -> Result<Explanation, CliError> {
    let expr = parse_filter_text(filter)?;
    let serialized = Value::Object(expr.serialize_to_document());
    let canonical = if pretty {
        to_json_pretty(&serialized)
    } else {
        to_json(&serialized)
    };

    Ok(Explanation {
        canonical,
        tree: expr.to_debug_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explain_flattens_field_operators() {
        let explanation = explain(r#"{"x": {"$gt": 1, "$lt": 5}}"#, false).unwrap();
        assert_eq!(
            explanation.canonical,
            r#"{"$and":[{"x":{"$gt":1}},{"x":{"$lt":5}}]}"#
        );
        assert_eq!(explanation.tree, "$and\n    x $gt 1\n    x $lt 5\n");
    }
}
