//! Array operators: `$elemMatch` (object and value forms) and `$size`.
//!
//! All three resolve their path without expanding a trailing array, then
//! test each array found there as a whole. Values that are not arrays never
//! match.

use tracing::trace;

use crate::{
    matcher::{
        details::MatchDetails,
        expression::{MatchError, MatchExpression, MatchNode},
    },
    path::ElementPath,
    value::{Document, Value},
};

/// Path holder shared by the array operators.
///
/// The path can be set once and must not be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArrayMatchingPath {
    path: Option<ElementPath>,
}

impl ArrayMatchingPath {
    pub fn set_path(&mut self, path: &str) -> Result<(), MatchError> {
        if let Some(existing) = &self.path {
            return Err(MatchError::PathAlreadySet(existing.dotted().to_string()));
        }
        if path.is_empty() {
            return Err(MatchError::EmptyPath);
        }
        self.path = Some(ElementPath::new(path).traverse_leaf_array(false));
        Ok(())
    }

    pub fn path(&self) -> &str {
        self.path.as_ref().map_or("", ElementPath::dotted)
    }

    fn element_path(&self) -> Option<&ElementPath> {
        self.path.as_ref()
    }
}

/// Shared evaluation for operators that test a whole array.
pub trait ArrayMatching {
    fn array_path(&self) -> &ArrayMatchingPath;

    /// The operator-specific test of one array.
    fn matches_array(&self, array: &[Value], details: Option<&mut MatchDetails>) -> bool;

    fn path(&self) -> &str {
        self.array_path().path()
    }

    /// Test every array reachable through the path, stopping at the first
    /// hit. When the hit came from inside an outer array its position is
    /// recorded as the elemMatchKey; otherwise the operator records its own.
    fn matches(&self, doc: &Document, mut details: Option<&mut MatchDetails>) -> bool {
        let Some(path) = self.array_path().element_path() else {
            return false;
        };
        for candidate in path.resolve(doc) {
            let Value::Array(items) = candidate.value else {
                continue;
            };
            let am_root = candidate.array_offset.is_none();
            let inner = if am_root { details.as_deref_mut() } else { None };
            if !self.matches_array(items, inner) {
                continue;
            }
            if let Some(offset) = candidate.array_offset
                && let Some(details) = details.as_deref_mut()
                && details.need_record()
            {
                details.set_elem_match_key(offset.to_string());
            }
            return true;
        }
        false
    }

    fn matches_single_element(&self, e: &Value) -> bool {
        e.as_array()
            .is_some_and(|items| self.matches_array(items, None))
    }
}

const VACANT_ELEM_MATCH: &str = "$elemMatch has no sub-expression; it was released";

/// `{path: {$elemMatch: {...}}}` where the sub-expression is a full filter
/// applied to each embedded document of the array.
#[derive(Debug)]
pub struct ElemMatchObjectMatchExpression {
    base: ArrayMatchingPath,
    sub: Option<Box<MatchExpression>>,
}

impl ElemMatchObjectMatchExpression {
    pub fn new(path: &str, sub: Box<MatchExpression>) -> Result<Self, MatchError> {
        let mut base = ArrayMatchingPath::default();
        base.set_path(path)?;
        Ok(ElemMatchObjectMatchExpression {
            base,
            sub: Some(sub),
        })
    }

    /// # Panics
    ///
    /// If the sub-expression was released.
    pub fn sub(&self) -> &MatchExpression {
        self.sub.as_deref().expect(VACANT_ELEM_MATCH)
    }

    pub fn num_children(&self) -> usize {
        usize::from(self.sub.is_some())
    }

    pub fn get_child(&self, i: usize) -> &MatchExpression {
        assert_eq!(i, 0, "$elemMatch has a single sub-expression");
        self.sub()
    }

    pub fn get_child_mut(&mut self, i: usize) -> &mut MatchExpression {
        assert_eq!(i, 0, "$elemMatch has a single sub-expression");
        self.sub.as_deref_mut().expect(VACANT_ELEM_MATCH)
    }

    pub fn release_children(&mut self) -> Vec<Box<MatchExpression>> {
        trace!(path = self.path(), "releasing $elemMatch sub-expression");
        self.sub.take().into_iter().collect()
    }

    /// # Panics
    ///
    /// If `children` holds more than one expression.
    pub fn reset_children(&mut self, children: Vec<Box<MatchExpression>>) {
        assert!(
            children.len() <= 1,
            "$elemMatch takes at most one sub-expression, got {}",
            children.len()
        );
        self.sub = children.into_iter().next();
    }

    pub fn shallow_clone(&self) -> Self {
        ElemMatchObjectMatchExpression {
            base: self.base.clone(),
            sub: Some(self.sub().shallow_clone()),
        }
    }

    pub fn equivalent(&self, other: &Self) -> bool {
        self.path() == other.path()
            && match (&self.sub, &other.sub) {
                (Some(a), Some(b)) => a.equivalent(b),
                (None, None) => true,
                _ => false,
            }
    }

    pub(crate) fn serialize(&self, out: &mut Document) {
        let mut operator = Document::new();
        operator.append("$elemMatch", self.sub().serialize_to_document());
        out.append(self.path(), operator);
    }
}

impl ArrayMatching for ElemMatchObjectMatchExpression {
    fn array_path(&self) -> &ArrayMatchingPath {
        &self.base
    }

    /// Any embedded document satisfying the sub-expression; scalars and
    /// nested arrays are skipped.
    fn matches_array(&self, array: &[Value], mut details: Option<&mut MatchDetails>) -> bool {
        let sub = self.sub();
        for (i, element) in array.iter().enumerate() {
            let Some(doc) = element.as_document() else {
                continue;
            };
            if sub.matches(doc, None) {
                if let Some(details) = details.as_deref_mut() {
                    details.set_elem_match_key(i.to_string());
                }
                return true;
            }
        }
        false
    }
}

/// `{path: {$elemMatch: {$gt: 1, $lt: 5}}}`: one array element must satisfy
/// every sub-expression at once. With no sub-expressions any non-empty array
/// matches.
#[derive(Debug)]
pub struct ElemMatchValueMatchExpression {
    base: ArrayMatchingPath,
    subs: Vec<Box<MatchExpression>>,
}

impl ElemMatchValueMatchExpression {
    pub fn new(path: &str) -> Result<Self, MatchError> {
        let mut base = ArrayMatchingPath::default();
        base.set_path(path)?;
        Ok(ElemMatchValueMatchExpression {
            base,
            subs: Vec::new(),
        })
    }

    pub fn with_sub(path: &str, sub: Box<MatchExpression>) -> Result<Self, MatchError> {
        let mut em = Self::new(path)?;
        em.add(sub);
        Ok(em)
    }

    pub fn add(&mut self, sub: Box<MatchExpression>) {
        self.subs.push(sub);
    }

    pub fn subs(&self) -> &[Box<MatchExpression>] {
        &self.subs
    }

    pub fn num_children(&self) -> usize {
        self.subs.len()
    }

    pub fn get_child(&self, i: usize) -> &MatchExpression {
        &self.subs[i]
    }

    pub fn get_child_mut(&mut self, i: usize) -> &mut MatchExpression {
        &mut self.subs[i]
    }

    pub fn release_children(&mut self) -> Vec<Box<MatchExpression>> {
        trace!(
            path = self.path(),
            count = self.subs.len(),
            "releasing $elemMatch sub-expressions"
        );
        std::mem::take(&mut self.subs)
    }

    /// Same as [`release_children`](Self::release_children)
    pub fn release(&mut self) -> Vec<Box<MatchExpression>> {
        self.release_children()
    }

    pub fn reset_children(&mut self, children: Vec<Box<MatchExpression>>) {
        trace!(
            path = self.path(),
            adopted = children.len(),
            "resetting $elemMatch sub-expressions"
        );
        self.subs = children;
    }

    pub fn shallow_clone(&self) -> Self {
        ElemMatchValueMatchExpression {
            base: self.base.clone(),
            subs: self.subs.iter().map(|s| s.shallow_clone()).collect(),
        }
    }

    pub fn equivalent(&self, other: &Self) -> bool {
        self.path() == other.path()
            && self.subs.len() == other.subs.len()
            && self
                .subs
                .iter()
                .zip(&other.subs)
                .all(|(a, b)| a.equivalent(b))
    }

    fn element_matches_all(&self, element: &Value) -> bool {
        self.subs.iter().all(|sub| sub.matches_single_element(element))
    }

    pub(crate) fn serialize(&self, out: &mut Document) {
        let mut predicates = Document::new();
        for sub in &self.subs {
            serialize_element_predicate(sub, &mut predicates);
        }
        let mut operator = Document::new();
        operator.append("$elemMatch", predicates);
        out.append(self.path(), operator);
    }
}

impl ArrayMatching for ElemMatchValueMatchExpression {
    fn array_path(&self) -> &ArrayMatchingPath {
        &self.base
    }

    fn matches_array(&self, array: &[Value], mut details: Option<&mut MatchDetails>) -> bool {
        for (i, element) in array.iter().enumerate() {
            if self.element_matches_all(element) {
                if let Some(details) = details.as_deref_mut() {
                    details.set_elem_match_key(i.to_string());
                }
                return true;
            }
        }
        false
    }
}

/// Write a value-form predicate as bare operators, e.g. `$gt: 1`.
fn serialize_element_predicate(expr: &MatchExpression, out: &mut Document) {
    match expr.node() {
        MatchNode::Comparison(leaf) => leaf.serialize_operator(out),
        MatchNode::Regex(leaf) => leaf.serialize_operator(out),
        MatchNode::And(list) => {
            for child in list.children() {
                serialize_element_predicate(child, out);
            }
        }
        MatchNode::Not(not) => {
            let mut negated = Document::new();
            serialize_element_predicate(not.child(), &mut negated);
            out.append("$not", negated);
        }
        _ => out.append_all(expr.serialize_to_document()),
    }
}

/// `{path: {$size: n}}`: the array has exactly `n` elements. A negative size
/// never matches.
#[derive(Debug, Clone)]
pub struct SizeMatchExpression {
    base: ArrayMatchingPath,
    size: i32,
}

impl SizeMatchExpression {
    pub fn new(path: &str, size: i32) -> Result<Self, MatchError> {
        let mut base = ArrayMatchingPath::default();
        base.set_path(path)?;
        Ok(SizeMatchExpression { base, size })
    }

    pub fn size(&self) -> i32 {
        self.size
    }

    pub fn release_children(&mut self) -> Vec<Box<MatchExpression>> {
        Vec::new()
    }

    /// # Panics
    ///
    /// If `children` is not empty.
    pub fn reset_children(&mut self, children: Vec<Box<MatchExpression>>) {
        assert!(
            children.is_empty(),
            "$size takes no children, got {}",
            children.len()
        );
    }

    pub fn shallow_clone(&self) -> Self {
        self.clone()
    }

    pub fn equivalent(&self, other: &Self) -> bool {
        self.path() == other.path() && self.size == other.size
    }

    pub(crate) fn serialize(&self, out: &mut Document) {
        let mut operator = Document::new();
        operator.append("$size", self.size);
        out.append(self.path(), operator);
    }
}

impl ArrayMatching for SizeMatchExpression {
    fn array_path(&self) -> &ArrayMatchingPath {
        &self.base
    }

    fn matches_array(&self, array: &[Value], _details: Option<&mut MatchDetails>) -> bool {
        usize::try_from(self.size).is_ok_and(|size| array.len() == size)
    }
}
