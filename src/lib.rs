pub mod convert;
pub mod matcher;
pub mod output;
pub mod parser;
pub mod path;
pub mod value;

#[cfg(feature = "cli")]
pub mod cli;

pub use matcher::{
    ArrayMatching, ComparisonMatchExpression, ComparisonOp, ElemMatchObjectMatchExpression,
    ElemMatchValueMatchExpression, ListOfMatchExpression, MatchDetails, MatchError,
    MatchExpression, MatchNode, MatchType, NotMatchExpression, RegexMatchExpression,
    SizeMatchExpression, TagData,
};
pub use output::{to_json, to_json_pretty};
pub use parser::{ParseError, Parser, parse_filter};
pub use value::{Document, Value, ValueType};
