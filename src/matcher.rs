//! Match expression trees.
//!
//! A filter such as `{$or: [{a: {$size: 2}}, {b: {$elemMatch: {$gt: 3}}}]}`
//! is represented as a tree of [`MatchExpression`] nodes:
//!
//! ```text
//! $or
//!     a $size : 2
//!     b $elemMatch (value)
//!         $gt 3
//! ```
//!
//! # Node families
//!
//! - **Logical** ([`tree`]): `$and`, `$or` and `$nor` over an ordered list
//!   of children, `$not` over exactly one.
//! - **Array** ([`array`]): `$elemMatch` in its object and value forms and
//!   `$size`. These test a whole array found at a field path.
//! - **Leaf** ([`leaf`]): comparisons and regular expressions on one field.
//!
//! # Ownership
//!
//! Parents own their children through `Box`, and the tree is acyclic by
//! construction. A planner can move children out with
//! [`MatchExpression::release_children`] and install replacements with
//! [`MatchExpression::reset_children`] without copying subtrees.
//!
//! # Evaluation
//!
//! [`MatchExpression::matches`] tests a whole document,
//! [`MatchExpression::matches_single_element`] tests one value such as an
//! array member. Both are pure and take `&self`. The optional
//! [`MatchDetails`] collects the array position responsible for a match.

pub mod array;
pub mod details;
pub mod expression;
pub mod leaf;
pub mod tag;
pub mod tree;

pub use array::{
    ArrayMatching, ArrayMatchingPath, ElemMatchObjectMatchExpression,
    ElemMatchValueMatchExpression, SizeMatchExpression,
};
pub use details::MatchDetails;
pub use expression::{MatchError, MatchExpression, MatchNode, MatchType};
pub use leaf::{ComparisonMatchExpression, ComparisonOp, RegexMatchExpression};
pub use tag::TagData;
pub use tree::{ListOfMatchExpression, NotMatchExpression};
