use std::fmt;

use thiserror::Error;

use crate::{
    matcher::{
        array::{
            ArrayMatching, ElemMatchObjectMatchExpression, ElemMatchValueMatchExpression,
            SizeMatchExpression,
        },
        details::MatchDetails,
        leaf::{ComparisonMatchExpression, RegexMatchExpression},
        tag::TagData,
        tree::{ListOfMatchExpression, NotMatchExpression},
    },
    output::to_json,
    value::{Document, Value},
};

/// The kind of a match expression. Fixed when the node is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchType {
    // Logical
    And,
    Or,
    Nor,
    Not,

    // Array
    ElemMatchObject,
    ElemMatchValue,
    Size,

    // Leaf
    Eq,
    Lt,
    Lte,
    Gt,
    Gte,
    Regex,
}

impl MatchType {
    pub fn is_logical(self) -> bool {
        matches!(self, MatchType::And | MatchType::Or | MatchType::Nor | MatchType::Not)
    }

    pub fn is_array(self) -> bool {
        matches!(
            self,
            MatchType::ElemMatchObject | MatchType::ElemMatchValue | MatchType::Size
        )
    }

    pub fn is_leaf(self) -> bool {
        !self.is_logical() && !self.is_array()
    }
}

/// Errors raised while building a node from user-supplied filter input.
///
/// These are recoverable: the node is not built and the caller reports a
/// bad filter. Structural misuse of an already built tree panics instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    #[error("path must not be empty")]
    EmptyPath,

    #[error("path is already set to '{0}'")]
    PathAlreadySet(String),

    #[error("invalid regular expression /{pattern}/: {reason}")]
    InvalidRegex { pattern: String, reason: String },

    #[error("invalid regex flag '{0}'; supported flags are i, m, s and x")]
    InvalidRegexFlag(char),
}

/// The variant-specific part of a match expression.
#[derive(Debug)]
pub enum MatchNode {
    And(ListOfMatchExpression),
    Or(ListOfMatchExpression),
    Nor(ListOfMatchExpression),
    Not(NotMatchExpression),
    ElemMatchObject(ElemMatchObjectMatchExpression),
    ElemMatchValue(ElemMatchValueMatchExpression),
    Size(SizeMatchExpression),
    Comparison(ComparisonMatchExpression),
    Regex(RegexMatchExpression),
}

/// A node of a match expression tree.
///
/// Every node owns its children exclusively and may carry one planner tag.
/// Evaluation takes `&self`, so a finished tree can be shared between
/// threads; rewrites (`reset_children`, `release_children`, `set_tag`) take
/// `&mut self` and therefore cannot overlap with evaluation.
///
/// # Examples
///
/// ```
/// use matchtree::{Document, MatchExpression, SizeMatchExpression, Value};
///
/// let size = SizeMatchExpression::new("tags", 0).unwrap();
/// let filter = MatchExpression::not(Box::new(size.into()));
///
/// let mut doc = Document::new();
/// doc.append("tags", Value::Array(vec![Value::from("x")]));
/// assert!(filter.matches_document(&doc));
/// ```
#[derive(Debug)]
pub struct MatchExpression {
    node: MatchNode,
    tag: Option<Box<dyn TagData>>,
}

const NO_CHILDREN: &str = "expression has no children";

impl MatchExpression {
    pub fn new(node: MatchNode) -> Self {
        MatchExpression { node, tag: None }
    }

    /// Build an `$and` over `children`, in order
    pub fn and(children: Vec<Box<MatchExpression>>) -> Box<Self> {
        Box::new(Self::new(MatchNode::And(ListOfMatchExpression::with_children(children))))
    }

    /// Build an `$or` over `children`, in order
    pub fn or(children: Vec<Box<MatchExpression>>) -> Box<Self> {
        Box::new(Self::new(MatchNode::Or(ListOfMatchExpression::with_children(children))))
    }

    /// Build a `$nor` over `children`, in order
    pub fn nor(children: Vec<Box<MatchExpression>>) -> Box<Self> {
        Box::new(Self::new(MatchNode::Nor(ListOfMatchExpression::with_children(children))))
    }

    pub fn not(child: Box<MatchExpression>) -> Box<Self> {
        Box::new(Self::new(MatchNode::Not(NotMatchExpression::new(child))))
    }

    pub fn match_type(&self) -> MatchType {
        match &self.node {
            MatchNode::And(_) => MatchType::And,
            MatchNode::Or(_) => MatchType::Or,
            MatchNode::Nor(_) => MatchType::Nor,
            MatchNode::Not(_) => MatchType::Not,
            MatchNode::ElemMatchObject(_) => MatchType::ElemMatchObject,
            MatchNode::ElemMatchValue(_) => MatchType::ElemMatchValue,
            MatchNode::Size(_) => MatchType::Size,
            MatchNode::Comparison(leaf) => leaf.op().match_type(),
            MatchNode::Regex(_) => MatchType::Regex,
        }
    }

    pub fn node(&self) -> &MatchNode {
        &self.node
    }

    pub fn node_mut(&mut self) -> &mut MatchNode {
        &mut self.node
    }

    /// The field path this node tests, for array operators and leaves
    pub fn path(&self) -> Option<&str> {
        match &self.node {
            MatchNode::ElemMatchObject(em) => Some(em.path()),
            MatchNode::ElemMatchValue(em) => Some(em.path()),
            MatchNode::Size(size) => Some(size.path()),
            MatchNode::Comparison(leaf) => Some(leaf.path()),
            MatchNode::Regex(leaf) => Some(leaf.path()),
            _ => None,
        }
    }

    // ========================================
    // Tags
    // ========================================

    pub fn tag(&self) -> Option<&dyn TagData> {
        self.tag.as_deref()
    }

    /// Attach `tag`, replacing (and dropping) any previous one
    pub fn set_tag(&mut self, tag: Box<dyn TagData>) {
        self.tag = Some(tag);
    }

    pub fn take_tag(&mut self) -> Option<Box<dyn TagData>> {
        self.tag.take()
    }

    // ========================================
    // Children
    // ========================================

    pub fn num_children(&self) -> usize {
        match &self.node {
            MatchNode::And(list) | MatchNode::Or(list) | MatchNode::Nor(list) => {
                list.num_children()
            }
            MatchNode::Not(not) => not.num_children(),
            MatchNode::ElemMatchObject(em) => em.num_children(),
            MatchNode::ElemMatchValue(em) => em.num_children(),
            MatchNode::Size(_) | MatchNode::Comparison(_) | MatchNode::Regex(_) => 0,
        }
    }

    /// Child at position `i`.
    ///
    /// # Panics
    ///
    /// If `i` is out of range.
    pub fn get_child(&self, i: usize) -> &MatchExpression {
        match &self.node {
            MatchNode::And(list) | MatchNode::Or(list) | MatchNode::Nor(list) => list.get_child(i),
            MatchNode::Not(not) => not.get_child(i),
            MatchNode::ElemMatchObject(em) => em.get_child(i),
            MatchNode::ElemMatchValue(em) => em.get_child(i),
            MatchNode::Size(_) | MatchNode::Comparison(_) | MatchNode::Regex(_) => {
                panic!("{:?} {} (index {})", self.match_type(), NO_CHILDREN, i)
            }
        }
    }

    pub fn get_child_mut(&mut self, i: usize) -> &mut MatchExpression {
        let kind = self.match_type();
        match &mut self.node {
            MatchNode::And(list) | MatchNode::Or(list) | MatchNode::Nor(list) => {
                list.get_child_mut(i)
            }
            MatchNode::Not(not) => not.get_child_mut(i),
            MatchNode::ElemMatchObject(em) => em.get_child_mut(i),
            MatchNode::ElemMatchValue(em) => em.get_child_mut(i),
            MatchNode::Size(_) | MatchNode::Comparison(_) | MatchNode::Regex(_) => {
                panic!("{:?} {} (index {})", kind, NO_CHILDREN, i)
            }
        }
    }

    /// Borrow every child, in order
    pub fn children(&self) -> Vec<&MatchExpression> {
        (0..self.num_children()).map(|i| self.get_child(i)).collect()
    }

    /// Move all children out, leaving this node without any.
    pub fn release_children(&mut self) -> Vec<Box<MatchExpression>> {
        match &mut self.node {
            MatchNode::And(list) | MatchNode::Or(list) | MatchNode::Nor(list) => {
                list.release_children()
            }
            MatchNode::Not(not) => not.release_children(),
            MatchNode::ElemMatchObject(em) => em.release_children(),
            MatchNode::ElemMatchValue(em) => em.release_children(),
            MatchNode::Size(size) => size.release_children(),
            MatchNode::Comparison(_) | MatchNode::Regex(_) => Vec::new(),
        }
    }

    /// Drop the current children and install `children` in their place.
    ///
    /// # Panics
    ///
    /// If `children` does not fit the node kind: more than one child for
    /// `$not` or `$elemMatch` on objects, any child for `$size` or a leaf.
    pub fn reset_children(&mut self, children: Vec<Box<MatchExpression>>) {
        let kind = self.match_type();
        match &mut self.node {
            MatchNode::And(list) | MatchNode::Or(list) | MatchNode::Nor(list) => {
                list.reset_children(children)
            }
            MatchNode::Not(not) => not.reset_children(children),
            MatchNode::ElemMatchObject(em) => em.reset_children(children),
            MatchNode::ElemMatchValue(em) => em.reset_children(children),
            MatchNode::Size(size) => size.reset_children(children),
            MatchNode::Comparison(_) | MatchNode::Regex(_) => assert!(
                children.is_empty(),
                "{:?} {}, got {}",
                kind,
                NO_CHILDREN,
                children.len()
            ),
        }
    }

    // ========================================
    // Cloning and comparison
    // ========================================

    /// Copy this node and its whole subtree, tags included.
    ///
    /// Despite the name nothing is shared with the original: every
    /// descendant is cloned.
    pub fn shallow_clone(&self) -> Box<MatchExpression> {
        let node = match &self.node {
            MatchNode::And(list) => MatchNode::And(list.shallow_clone()),
            MatchNode::Or(list) => MatchNode::Or(list.shallow_clone()),
            MatchNode::Nor(list) => MatchNode::Nor(list.shallow_clone()),
            MatchNode::Not(not) => MatchNode::Not(not.shallow_clone()),
            MatchNode::ElemMatchObject(em) => MatchNode::ElemMatchObject(em.shallow_clone()),
            MatchNode::ElemMatchValue(em) => MatchNode::ElemMatchValue(em.shallow_clone()),
            MatchNode::Size(size) => MatchNode::Size(size.shallow_clone()),
            MatchNode::Comparison(leaf) => MatchNode::Comparison(leaf.shallow_clone()),
            MatchNode::Regex(leaf) => MatchNode::Regex(leaf.shallow_clone()),
        };
        let mut clone = MatchExpression::new(node);
        if let Some(tag) = &self.tag {
            clone.set_tag(tag.clone_tag());
        }
        Box::new(clone)
    }

    /// Structural equivalence. Tags are ignored; children are compared
    /// pairwise in order, so `$and: [a, b]` is not equivalent to
    /// `$and: [b, a]`.
    pub fn equivalent(&self, other: &MatchExpression) -> bool {
        if self.match_type() != other.match_type() {
            return false;
        }
        match (&self.node, &other.node) {
            (MatchNode::And(a), MatchNode::And(b))
            | (MatchNode::Or(a), MatchNode::Or(b))
            | (MatchNode::Nor(a), MatchNode::Nor(b)) => a.equivalent(b),
            (MatchNode::Not(a), MatchNode::Not(b)) => a.equivalent(b),
            (MatchNode::ElemMatchObject(a), MatchNode::ElemMatchObject(b)) => a.equivalent(b),
            (MatchNode::ElemMatchValue(a), MatchNode::ElemMatchValue(b)) => a.equivalent(b),
            (MatchNode::Size(a), MatchNode::Size(b)) => a.equivalent(b),
            (MatchNode::Comparison(a), MatchNode::Comparison(b)) => a.equivalent(b),
            (MatchNode::Regex(a), MatchNode::Regex(b)) => a.equivalent(b),
            _ => false,
        }
    }

    // ========================================
    // Evaluation
    // ========================================

    /// Whether `doc` satisfies this expression. Never fails: absent fields
    /// and type mismatches are simply non-matches.
    pub fn matches(&self, doc: &Document, details: Option<&mut MatchDetails>) -> bool {
        match &self.node {
            MatchNode::And(list) => list.and_matches(doc, details),
            MatchNode::Or(list) => list.or_matches(doc),
            MatchNode::Nor(list) => list.nor_matches(doc),
            MatchNode::Not(not) => not.matches(doc),
            MatchNode::ElemMatchObject(em) => em.matches(doc, details),
            MatchNode::ElemMatchValue(em) => em.matches(doc, details),
            MatchNode::Size(size) => size.matches(doc, details),
            MatchNode::Comparison(leaf) => leaf.matches(doc, details),
            MatchNode::Regex(leaf) => leaf.matches(doc, details),
        }
    }

    pub fn matches_document(&self, doc: &Document) -> bool {
        self.matches(doc, None)
    }

    /// Whether a single element (typically one array member) satisfies this
    /// expression, ignoring any field path.
    pub fn matches_single_element(&self, e: &Value) -> bool {
        match &self.node {
            MatchNode::And(list) => list.and_matches_single_element(e),
            MatchNode::Or(list) => list.or_matches_single_element(e),
            MatchNode::Nor(list) => list.nor_matches_single_element(e),
            MatchNode::Not(not) => not.matches_single_element(e),
            MatchNode::ElemMatchObject(em) => em.matches_single_element(e),
            MatchNode::ElemMatchValue(em) => em.matches_single_element(e),
            MatchNode::Size(size) => size.matches_single_element(e),
            MatchNode::Comparison(leaf) => leaf.matches_single_element(e),
            MatchNode::Regex(leaf) => leaf.matches_single_element(e),
        }
    }

    // ========================================
    // Serialization
    // ========================================

    /// Append the canonical filter form of this expression to `out`.
    pub fn serialize(&self, out: &mut Document) {
        match &self.node {
            MatchNode::And(list) => list.serialize("$and", out),
            MatchNode::Or(list) => list.serialize("$or", out),
            MatchNode::Nor(list) => list.serialize("$nor", out),
            MatchNode::Not(not) => not.serialize(out),
            MatchNode::ElemMatchObject(em) => em.serialize(out),
            MatchNode::ElemMatchValue(em) => em.serialize(out),
            MatchNode::Size(size) => size.serialize(out),
            MatchNode::Comparison(leaf) => leaf.serialize(out),
            MatchNode::Regex(leaf) => leaf.serialize(out),
        }
    }

    pub fn serialize_to_document(&self) -> Document {
        let mut out = Document::new();
        self.serialize(&mut out);
        out
    }

    /// Append an indented, one-node-per-line rendering of the subtree.
    pub fn debug_string(&self, out: &mut String, level: usize) {
        debug_add_space(out, level);
        let header = match &self.node {
            MatchNode::And(_) => "$and".to_string(),
            MatchNode::Or(_) => "$or".to_string(),
            MatchNode::Nor(_) => "$nor".to_string(),
            MatchNode::Not(_) => "$not".to_string(),
            MatchNode::ElemMatchObject(em) => format!("{} $elemMatch (obj)", em.path()),
            MatchNode::ElemMatchValue(em) => format!("{} $elemMatch (value)", em.path()),
            MatchNode::Size(size) => format!("{} $size : {}", size.path(), size.size()),
            MatchNode::Comparison(leaf) => debug_leaf(
                leaf.path(),
                format!("{} {}", leaf.op().operator(), to_json(leaf.rhs())),
            ),
            MatchNode::Regex(leaf) => debug_leaf(
                leaf.path(),
                format!("regex /{}/{}", leaf.pattern(), leaf.flags()),
            ),
        };
        out.push_str(&header);
        match &self.tag {
            Some(tag) => tag.debug_string(out),
            None => out.push('\n'),
        }
        for child in self.children() {
            child.debug_string(out, level + 1);
        }
    }

    pub fn to_debug_string(&self) -> String {
        let mut out = String::new();
        self.debug_string(&mut out, 0);
        out
    }
}

fn debug_add_space(out: &mut String, level: usize) {
    out.push_str(&"    ".repeat(level));
}

// Leaves under a value-form $elemMatch have no path
fn debug_leaf(path: &str, predicate: String) -> String {
    if path.is_empty() {
        predicate
    } else {
        format!("{path} {predicate}")
    }
}

impl Clone for MatchExpression {
    fn clone(&self) -> Self {
        *self.shallow_clone()
    }
}

/// Renders the canonical serialized form as compact JSON.
impl fmt::Display for MatchExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", to_json(&Value::Object(self.serialize_to_document())))
    }
}

impl From<NotMatchExpression> for MatchExpression {
    fn from(e: NotMatchExpression) -> Self {
        MatchExpression::new(MatchNode::Not(e))
    }
}

impl From<ElemMatchObjectMatchExpression> for MatchExpression {
    fn from(e: ElemMatchObjectMatchExpression) -> Self {
        MatchExpression::new(MatchNode::ElemMatchObject(e))
    }
}

impl From<ElemMatchValueMatchExpression> for MatchExpression {
    fn from(e: ElemMatchValueMatchExpression) -> Self {
        MatchExpression::new(MatchNode::ElemMatchValue(e))
    }
}

impl From<SizeMatchExpression> for MatchExpression {
    fn from(e: SizeMatchExpression) -> Self {
        MatchExpression::new(MatchNode::Size(e))
    }
}

impl From<ComparisonMatchExpression> for MatchExpression {
    fn from(e: ComparisonMatchExpression) -> Self {
        MatchExpression::new(MatchNode::Comparison(e))
    }
}

impl From<RegexMatchExpression> for MatchExpression {
    fn from(e: RegexMatchExpression) -> Self {
        MatchExpression::new(MatchNode::Regex(e))
    }
}
