//! Filter documents to match expression trees.
//!
//! Accepted syntax:
//!
//! - `{field: value}`: equality, `{field: {$op: value, ...}}`: one node per
//!   operator, all added to the enclosing conjunction.
//! - `$and` / `$or` / `$nor`: arrays of filter documents (empty arrays are
//!   accepted). `$not` at the top level takes a filter document.
//! - Field operators: `$eq`, `$ne`, `$lt`, `$lte`, `$gt`, `$gte`,
//!   `$regex` (+ `$options`), `$size`, `$elemMatch`, `$not`.
//!
//! A filter with a single top-level predicate parses to that predicate;
//! anything else is wrapped in `$and`.

use thiserror::Error;
use tracing::debug;

use crate::{
    convert::json_to_value,
    matcher::{
        ComparisonMatchExpression, ComparisonOp, ElemMatchObjectMatchExpression,
        ElemMatchValueMatchExpression, MatchError, MatchExpression, RegexMatchExpression,
        SizeMatchExpression,
    },
    value::{Document, Value},
};

pub const DEFAULT_MAX_DEPTH: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unknown operator: {0}")]
    UnknownOperator(String),

    #[error("{operator}: {reason}")]
    BadValue { operator: String, reason: String },

    #[error("{context} must be a document, got {found}")]
    NotADocument {
        context: String,
        found: &'static str,
    },

    #[error("filter is nested deeper than {0} levels")]
    DepthLimitExceeded(usize),

    #[error(transparent)]
    Construction(#[from] MatchError),
}

fn bad_value(operator: &str, reason: &str) -> ParseError {
    ParseError::BadValue {
        operator: operator.to_string(),
        reason: reason.to_string(),
    }
}

type ListConstructor = fn(Vec<Box<MatchExpression>>) -> Box<MatchExpression>;

/// Builds match expression trees from filter documents.
///
/// # Examples
///
/// ```
/// use matchtree::Parser;
/// use serde_json::json;
///
/// let filter = Parser::new()
///     .parse_json(json!({"tags": {"$size": 2}}))
///     .unwrap();
/// assert_eq!(filter.to_string(), r#"{"tags":{"$size":2}}"#);
/// ```
#[derive(Debug, Clone)]
pub struct Parser {
    max_depth: usize,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    pub fn new() -> Self {
        Parser {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Reject filters nested deeper than `max_depth` documents
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn parse(&self, filter: &Document) -> Result<Box<MatchExpression>, ParseError> {
        match self.parse_document(filter, 0) {
            Ok(expr) => {
                debug!(kind = ?expr.match_type(), children = expr.num_children(), "parsed filter");
                Ok(expr)
            }
            Err(err) => {
                debug!(error = %err, "rejected filter");
                Err(err)
            }
        }
    }

    pub fn parse_json(
        &self,
        filter: serde_json::Value,
    ) -> Result<Box<MatchExpression>, ParseError> {
        match json_to_value(filter) {
            Value::Object(doc) => self.parse(&doc),
            other => Err(ParseError::NotADocument {
                context: "filter".to_string(),
                found: other.type_name(),
            }),
        }
    }

    fn descend(&self, depth: usize) -> Result<usize, ParseError> {
        if depth >= self.max_depth {
            return Err(ParseError::DepthLimitExceeded(self.max_depth));
        }
        Ok(depth + 1)
    }

    fn parse_document(
        &self,
        doc: &Document,
        depth: usize,
    ) -> Result<Box<MatchExpression>, ParseError> {
        let mut children = Vec::new();

        for (name, value) in doc.iter() {
            match name {
                "$and" => children.push(self.parse_list(name, value, MatchExpression::and, depth)?),
                "$or" => children.push(self.parse_list(name, value, MatchExpression::or, depth)?),
                "$nor" => children.push(self.parse_list(name, value, MatchExpression::nor, depth)?),
                "$not" => {
                    let Value::Object(inner) = value else {
                        return Err(ParseError::NotADocument {
                            context: "$not".to_string(),
                            found: value.type_name(),
                        });
                    };
                    let depth = self.descend(depth)?;
                    children.push(MatchExpression::not(self.parse_document(inner, depth)?));
                }
                op if op.starts_with('$') => {
                    return Err(ParseError::UnknownOperator(op.to_string()));
                }
                path => self.parse_field(path, value, &mut children, depth)?,
            }
        }

        if children.len() == 1
            && let Some(only) = children.pop()
        {
            return Ok(only);
        }
        Ok(MatchExpression::and(children))
    }

    fn parse_list(
        &self,
        name: &str,
        value: &Value,
        build: ListConstructor,
        depth: usize,
    ) -> Result<Box<MatchExpression>, ParseError> {
        let Value::Array(items) = value else {
            return Err(bad_value(name, "needs an array"));
        };
        let depth = self.descend(depth)?;

        let mut children = Vec::with_capacity(items.len());
        for item in items {
            let Value::Object(doc) = item else {
                return Err(bad_value(name, "entries must be documents"));
            };
            children.push(self.parse_document(doc, depth)?);
        }
        Ok(build(children))
    }

    /// `{path: value}` or `{path: {$op: value, ...}}`
    fn parse_field(
        &self,
        path: &str,
        value: &Value,
        out: &mut Vec<Box<MatchExpression>>,
        depth: usize,
    ) -> Result<(), ParseError> {
        if let Value::Object(operators) = value
            && let Some((first, _)) = operators.first()
            && first.starts_with('$')
        {
            return self.parse_operators(path, operators, out, depth);
        }
        out.push(Box::new(
            ComparisonMatchExpression::new(path, ComparisonOp::Eq, value.clone()).into(),
        ));
        Ok(())
    }

    fn parse_operators(
        &self,
        path: &str,
        operators: &Document,
        out: &mut Vec<Box<MatchExpression>>,
        depth: usize,
    ) -> Result<(), ParseError> {
        let depth = self.descend(depth)?;
        for (op, arg) in operators.iter() {
            if let Some(expr) = self.parse_operator(path, op, arg, operators, depth)? {
                out.push(expr);
            }
        }
        Ok(())
    }

    fn parse_operator(
        &self,
        path: &str,
        op: &str,
        arg: &Value,
        operators: &Document,
        depth: usize,
    ) -> Result<Option<Box<MatchExpression>>, ParseError> {
        if let Some(cmp) = ComparisonOp::from_operator(op) {
            let leaf = ComparisonMatchExpression::new(path, cmp, arg.clone());
            return Ok(Some(Box::new(leaf.into())));
        }

        let expr: Box<MatchExpression> = match op {
            "$ne" => {
                let eq = ComparisonMatchExpression::new(path, ComparisonOp::Eq, arg.clone());
                MatchExpression::not(Box::new(eq.into()))
            }
            "$regex" => {
                let Value::String(pattern) = arg else {
                    return Err(bad_value(op, "needs a string"));
                };
                let flags = match operators.get("$options") {
                    None => "",
                    Some(Value::String(flags)) => flags.as_str(),
                    Some(_) => return Err(bad_value("$options", "needs a string")),
                };
                Box::new(RegexMatchExpression::new(path, pattern, flags)?.into())
            }
            "$options" => {
                if !operators.contains_key("$regex") {
                    return Err(bad_value(op, "needs a $regex"));
                }
                return Ok(None);
            }
            "$size" => Box::new(SizeMatchExpression::new(path, parse_size(arg)?)?.into()),
            "$elemMatch" => self.parse_elem_match(path, arg, depth)?,
            "$not" => {
                let Value::Object(inner) = arg else {
                    return Err(bad_value(op, "needs a document"));
                };
                if inner.is_empty() {
                    return Err(bad_value(op, "cannot be empty"));
                }
                let mut subs = Vec::new();
                self.parse_operators(path, inner, &mut subs, depth)?;
                let negated = if subs.len() == 1 {
                    subs.remove(0)
                } else {
                    MatchExpression::and(subs)
                };
                MatchExpression::not(negated)
            }
            _ => return Err(ParseError::UnknownOperator(op.to_string())),
        };
        Ok(Some(expr))
    }

    fn parse_elem_match(
        &self,
        path: &str,
        arg: &Value,
        depth: usize,
    ) -> Result<Box<MatchExpression>, ParseError> {
        let Value::Object(inner) = arg else {
            return Err(bad_value("$elemMatch", "needs a document"));
        };

        if is_value_form(inner) {
            let mut subs = Vec::new();
            self.parse_operators("", inner, &mut subs, depth)?;
            let mut em = ElemMatchValueMatchExpression::new(path)?;
            for sub in subs {
                em.add(sub);
            }
            return Ok(Box::new(em.into()));
        }

        let depth = self.descend(depth)?;
        let sub = self.parse_document(inner, depth)?;
        Ok(Box::new(ElemMatchObjectMatchExpression::new(path, sub)?.into()))
    }
}

/// `{$gt: 1}` applies to the element itself; `{a: 1}` and `{$or: [...]}`
/// are filters over embedded documents. A leading `$not` takes the form of
/// its argument: `{$not: {$gt: 1}}` is a value predicate, `{$not: {a: 1}}`
/// a filter.
fn is_value_form(inner: &Document) -> bool {
    match inner.first() {
        Some(("$not", Value::Object(negated))) => is_value_form(negated),
        Some((name, _)) => name.starts_with('$') && !matches!(name, "$and" | "$or" | "$nor"),
        None => false,
    }
}

/// Whole numbers give the size; a fractional size can never equal an
/// element count and becomes the never-matching `-1`.
fn parse_size(arg: &Value) -> Result<i32, ParseError> {
    match arg {
        Value::Integer(n) if *n < 0 => Err(bad_value("$size", "may not be negative")),
        Value::Integer(n) => i32::try_from(*n).map_err(|_| bad_value("$size", "is too large")),
        Value::Float(f) if *f < 0.0 => Err(bad_value("$size", "may not be negative")),
        Value::Float(f) if f.fract() != 0.0 || !f.is_finite() => Ok(-1),
        Value::Float(f) if *f > f64::from(i32::MAX) => Err(bad_value("$size", "is too large")),
        Value::Float(f) => Ok(*f as i32),
        _ => Err(bad_value("$size", "needs a number")),
    }
}

/// Parse `filter` with the default [`Parser`] settings.
pub fn parse_filter(filter: &Document) -> Result<Box<MatchExpression>, ParseError> {
    Parser::new().parse(filter)
}
