//! Logical combinators: `$and`, `$or`, `$nor` and `$not`.

use tracing::trace;

use crate::{
    matcher::{details::MatchDetails, expression::MatchExpression},
    value::{Document, Value},
};

/// Ordered, exclusively owned children shared by `$and`, `$or` and `$nor`.
///
/// Which combinator a list implements is decided by the [`MatchNode`]
/// variant wrapping it; the list itself only knows how to hold, clone,
/// compare and evaluate its children.
///
/// [`MatchNode`]: crate::matcher::MatchNode
#[derive(Debug, Default)]
pub struct ListOfMatchExpression {
    expressions: Vec<Box<MatchExpression>>,
}

impl ListOfMatchExpression {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_children(expressions: Vec<Box<MatchExpression>>) -> Self {
        ListOfMatchExpression { expressions }
    }

    /// Append `e` as the last child. The list takes ownership.
    pub fn add(&mut self, e: Box<MatchExpression>) {
        self.expressions.push(e);
    }

    pub fn num_children(&self) -> usize {
        self.expressions.len()
    }

    /// # Panics
    ///
    /// If `i >= num_children()`.
    pub fn get_child(&self, i: usize) -> &MatchExpression {
        &self.expressions[i]
    }

    pub fn get_child_mut(&mut self, i: usize) -> &mut MatchExpression {
        &mut self.expressions[i]
    }

    pub fn children(&self) -> &[Box<MatchExpression>] {
        &self.expressions
    }

    /// Hand every child to the caller and leave the list empty.
    pub fn release_children(&mut self) -> Vec<Box<MatchExpression>> {
        trace!(count = self.expressions.len(), "releasing list children");
        std::mem::take(&mut self.expressions)
    }

    /// Drop the current children and adopt `expressions`.
    pub fn reset_children(&mut self, expressions: Vec<Box<MatchExpression>>) {
        trace!(
            dropped = self.expressions.len(),
            adopted = expressions.len(),
            "resetting list children"
        );
        self.expressions = expressions;
    }

    pub fn shallow_clone(&self) -> Self {
        ListOfMatchExpression {
            expressions: self.expressions.iter().map(|e| e.shallow_clone()).collect(),
        }
    }

    /// Same length and pairwise equivalent children, in order
    pub fn equivalent(&self, other: &Self) -> bool {
        self.expressions.len() == other.expressions.len()
            && self
                .expressions
                .iter()
                .zip(&other.expressions)
                .all(|(a, b)| a.equivalent(b))
    }

    // ========================================
    // $and
    // ========================================

    /// True when every child matches; an empty list matches everything.
    /// Details are passed down and cleared again if the conjunction fails.
    pub(crate) fn and_matches(
        &self,
        doc: &Document,
        mut details: Option<&mut MatchDetails>,
    ) -> bool {
        for child in &self.expressions {
            if !child.matches(doc, details.as_deref_mut()) {
                if let Some(details) = details.as_deref_mut() {
                    details.reset_output();
                }
                return false;
            }
        }
        true
    }

    pub(crate) fn and_matches_single_element(&self, e: &Value) -> bool {
        self.expressions.iter().all(|child| child.matches_single_element(e))
    }

    // ========================================
    // $or
    // ========================================

    /// True as soon as one child matches; an empty list matches nothing.
    pub(crate) fn or_matches(&self, doc: &Document) -> bool {
        self.expressions.iter().any(|child| child.matches(doc, None))
    }

    pub(crate) fn or_matches_single_element(&self, e: &Value) -> bool {
        self.expressions.iter().any(|child| child.matches_single_element(e))
    }

    // ========================================
    // $nor
    // ========================================

    /// False as soon as one child matches; an empty list matches everything.
    pub(crate) fn nor_matches(&self, doc: &Document) -> bool {
        !self.or_matches(doc)
    }

    pub(crate) fn nor_matches_single_element(&self, e: &Value) -> bool {
        !self.or_matches_single_element(e)
    }

    /// `{name: [child, ...]}`, one serialized document per child
    pub(crate) fn serialize(&self, name: &str, out: &mut Document) {
        let children: Vec<Value> = self
            .expressions
            .iter()
            .map(|child| Value::Object(child.serialize_to_document()))
            .collect();
        out.append(name, Value::Array(children));
    }
}

const VACANT_NOT: &str = "$not has no child; it was released and never replaced";

/// Negation of exactly one child.
///
/// The child can be taken out with [`release_child`](Self::release_child)
/// while a planner rewrites it. A vacant node must be given a child again
/// before it is evaluated, cloned or serialized. Two vacant nodes are
/// equivalent.
#[derive(Debug)]
pub struct NotMatchExpression {
    exp: Option<Box<MatchExpression>>,
}

impl NotMatchExpression {
    pub fn new(exp: Box<MatchExpression>) -> Self {
        NotMatchExpression { exp: Some(exp) }
    }

    /// # Panics
    ///
    /// If the node is vacant.
    pub fn child(&self) -> &MatchExpression {
        self.exp.as_deref().expect(VACANT_NOT)
    }

    pub fn num_children(&self) -> usize {
        usize::from(self.exp.is_some())
    }

    pub fn get_child(&self, i: usize) -> &MatchExpression {
        assert_eq!(i, 0, "$not has a single child");
        self.child()
    }

    pub fn get_child_mut(&mut self, i: usize) -> &mut MatchExpression {
        assert_eq!(i, 0, "$not has a single child");
        self.exp.as_deref_mut().expect(VACANT_NOT)
    }

    pub fn release_child(&mut self) -> Option<Box<MatchExpression>> {
        trace!(vacant = self.exp.is_none(), "releasing $not child");
        self.exp.take()
    }

    pub fn reset_child(&mut self, exp: Box<MatchExpression>) {
        self.exp = Some(exp);
    }

    pub fn release_children(&mut self) -> Vec<Box<MatchExpression>> {
        self.release_child().into_iter().collect()
    }

    /// # Panics
    ///
    /// If `children` holds more than one expression.
    pub fn reset_children(&mut self, children: Vec<Box<MatchExpression>>) {
        assert!(
            children.len() <= 1,
            "$not takes at most one child, got {}",
            children.len()
        );
        trace!(adopted = children.len(), "resetting $not child");
        self.exp = children.into_iter().next();
    }

    pub fn shallow_clone(&self) -> Self {
        NotMatchExpression::new(self.child().shallow_clone())
    }

    pub fn equivalent(&self, other: &Self) -> bool {
        match (&self.exp, &other.exp) {
            (Some(a), Some(b)) => a.equivalent(b),
            (None, None) => true,
            _ => false,
        }
    }

    pub(crate) fn matches(&self, doc: &Document) -> bool {
        !self.child().matches(doc, None)
    }

    pub(crate) fn matches_single_element(&self, e: &Value) -> bool {
        !self.child().matches_single_element(e)
    }

    pub(crate) fn serialize(&self, out: &mut Document) {
        out.append("$not", self.child().serialize_to_document());
    }
}
