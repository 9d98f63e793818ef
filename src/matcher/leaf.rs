//! Leaf predicates on a single field: comparisons and regular expressions.
//!
//! Leaves expand an array found at the end of their path, so
//! `{tags: {$eq: "x"}}` matches `{tags: ["x", "y"]}`, and record which
//! array element satisfied them when an elemMatchKey was requested.

use std::cmp::Ordering;

use regex::{Regex, RegexBuilder};

use crate::{
    matcher::{
        details::MatchDetails,
        expression::{MatchError, MatchType},
    },
    path::ElementPath,
    value::{Document, Value},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOp {
    Eq,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl ComparisonOp {
    pub fn operator(self) -> &'static str {
        match self {
            ComparisonOp::Eq => "$eq",
            ComparisonOp::Lt => "$lt",
            ComparisonOp::Lte => "$lte",
            ComparisonOp::Gt => "$gt",
            ComparisonOp::Gte => "$gte",
        }
    }

    pub fn from_operator(name: &str) -> Option<Self> {
        match name {
            "$eq" => Some(ComparisonOp::Eq),
            "$lt" => Some(ComparisonOp::Lt),
            "$lte" => Some(ComparisonOp::Lte),
            "$gt" => Some(ComparisonOp::Gt),
            "$gte" => Some(ComparisonOp::Gte),
            _ => None,
        }
    }

    pub fn match_type(self) -> MatchType {
        match self {
            ComparisonOp::Eq => MatchType::Eq,
            ComparisonOp::Lt => MatchType::Lt,
            ComparisonOp::Lte => MatchType::Lte,
            ComparisonOp::Gt => MatchType::Gt,
            ComparisonOp::Gte => MatchType::Gte,
        }
    }

    fn accepts(self, ordering: Ordering) -> bool {
        match self {
            ComparisonOp::Eq => ordering == Ordering::Equal,
            ComparisonOp::Lt => ordering == Ordering::Less,
            ComparisonOp::Lte => ordering != Ordering::Greater,
            ComparisonOp::Gt => ordering == Ordering::Greater,
            ComparisonOp::Gte => ordering != Ordering::Less,
        }
    }
}

/// `{path: {$op: value}}`.
///
/// Ordering comparisons only hold between values of the same kind (numbers
/// with numbers, strings with strings, ...). A missing field behaves like
/// `null`, so `{a: {$eq: null}}` matches documents without `a`.
#[derive(Debug, Clone)]
pub struct ComparisonMatchExpression {
    path: ElementPath,
    op: ComparisonOp,
    rhs: Value,
}

impl ComparisonMatchExpression {
    pub fn new(path: &str, op: ComparisonOp, rhs: impl Into<Value>) -> Self {
        ComparisonMatchExpression {
            path: ElementPath::new(path),
            op,
            rhs: rhs.into(),
        }
    }

    pub fn path(&self) -> &str {
        self.path.dotted()
    }

    pub fn op(&self) -> ComparisonOp {
        self.op
    }

    pub fn rhs(&self) -> &Value {
        &self.rhs
    }

    pub fn matches_single_element(&self, e: &Value) -> bool {
        match self.op {
            ComparisonOp::Eq => e.equivalent_to(&self.rhs),
            op => e.partial_compare(&self.rhs).is_some_and(|ord| op.accepts(ord)),
        }
    }

    fn matches_missing(&self) -> bool {
        self.rhs == Value::Null && self.op.accepts(Ordering::Equal)
    }

    pub(crate) fn matches(&self, doc: &Document, details: Option<&mut MatchDetails>) -> bool {
        matches_path(&self.path, doc, details, self.matches_missing(), |e| {
            self.matches_single_element(e)
        })
    }

    pub fn shallow_clone(&self) -> Self {
        self.clone()
    }

    pub fn equivalent(&self, other: &Self) -> bool {
        self.path() == other.path() && self.op == other.op && self.rhs.equivalent_to(&other.rhs)
    }

    /// `$op: value`, without the path
    pub(crate) fn serialize_operator(&self, out: &mut Document) {
        out.append(self.op.operator(), self.rhs.clone());
    }

    pub(crate) fn serialize(&self, out: &mut Document) {
        let mut operator = Document::new();
        self.serialize_operator(&mut operator);
        out.append(self.path(), operator);
    }
}

/// `{path: {$regex: pattern, $options: flags}}`, matching string values only.
#[derive(Debug, Clone)]
pub struct RegexMatchExpression {
    path: ElementPath,
    pattern: String,
    flags: String,
    regex: Regex,
}

impl RegexMatchExpression {
    /// Compile `pattern` with `flags` drawn from `i`, `m`, `s` and `x`.
    pub fn new(path: &str, pattern: &str, flags: &str) -> Result<Self, MatchError> {
        let mut builder = RegexBuilder::new(pattern);
        for flag in flags.chars() {
            match flag {
                'i' => {
                    builder.case_insensitive(true);
                }
                'm' => {
                    builder.multi_line(true);
                }
                's' => {
                    builder.dot_matches_new_line(true);
                }
                'x' => {
                    builder.ignore_whitespace(true);
                }
                other => return Err(MatchError::InvalidRegexFlag(other)),
            }
        }
        let regex = builder.build().map_err(|e| MatchError::InvalidRegex {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;

        Ok(RegexMatchExpression {
            path: ElementPath::new(path),
            pattern: pattern.to_string(),
            flags: flags.to_string(),
            regex,
        })
    }

    pub fn path(&self) -> &str {
        self.path.dotted()
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn flags(&self) -> &str {
        &self.flags
    }

    pub fn matches_single_element(&self, e: &Value) -> bool {
        match e {
            Value::String(s) => self.regex.is_match(s),
            _ => false,
        }
    }

    pub(crate) fn matches(&self, doc: &Document, details: Option<&mut MatchDetails>) -> bool {
        matches_path(&self.path, doc, details, false, |e| {
            self.matches_single_element(e)
        })
    }

    pub fn shallow_clone(&self) -> Self {
        self.clone()
    }

    pub fn equivalent(&self, other: &Self) -> bool {
        self.path() == other.path() && self.pattern == other.pattern && self.flags == other.flags
    }

    pub(crate) fn serialize_operator(&self, out: &mut Document) {
        out.append("$regex", self.pattern.as_str());
        if !self.flags.is_empty() {
            out.append("$options", self.flags.as_str());
        }
    }

    pub(crate) fn serialize(&self, out: &mut Document) {
        let mut operator = Document::new();
        self.serialize_operator(&mut operator);
        out.append(self.path(), operator);
    }
}

/// Try `predicate` on every element the path reaches. `if_missing` decides
/// the result when the path reaches nothing at all.
fn matches_path(
    path: &ElementPath,
    doc: &Document,
    mut details: Option<&mut MatchDetails>,
    if_missing: bool,
    predicate: impl Fn(&Value) -> bool,
) -> bool {
    let candidates = path.resolve(doc);
    if candidates.is_empty() {
        return if_missing;
    }
    for candidate in candidates {
        if !predicate(candidate.value) {
            continue;
        }
        if let Some(offset) = candidate.array_offset
            && let Some(details) = details.as_deref_mut()
        {
            details.set_elem_match_key(offset.to_string());
        }
        return true;
    }
    false
}
