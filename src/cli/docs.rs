//! Documentation content for the matchtree CLI

use super::CliError;

/// Available documentation categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocCategory {
    Syntax,
    Logical,
    Arrays,
    Comparison,
    Paths,
}

impl DocCategory {
    /// Parse category name from string
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "syntax" | "filters" => Some(Self::Syntax),
            "logical" | "logic" | "combinators" => Some(Self::Logical),
            "arrays" | "array" => Some(Self::Arrays),
            "comparison" | "compare" | "leaves" => Some(Self::Comparison),
            "paths" | "path" | "dotted_paths" => Some(Self::Paths),
            _ => None,
        }
    }
}

/// Get the docs overview (category listing)
pub fn get_docs_overview() -> &'static str {
    r#"MATCHTREE DOCUMENTATION

matchtree evaluates document filters written as JSON. A filter is parsed into
a tree of match expressions ($and, $or, $nor, $not, $elemMatch, $size and
field comparisons) and tested against each input document.

DOCUMENTATION CATEGORIES

  syntax            Shape of a filter document and how it becomes a tree
  logical           $and, $or, $nor and $not
  arrays            $elemMatch (object and value forms) and $size
  comparison        $eq, $ne, $lt, $lte, $gt, $gte and $regex
  paths             Dotted paths through embedded documents and arrays

QUICK REFERENCE

  {"a": 1}                          a equals 1
  {"a": {"$gt": 1, "$lt": 5}}       both bounds hold
  {"$or": [{"a": 1}, {"b": 2}]}     either branch holds
  {"tags": {"$size": 2}}            tags has exactly two elements
  {"xs": {"$elemMatch": {"$gt": 2, "$lt": 5}}}
                                    one element of xs is in (2, 5)

Run 'matchtree doc <category>' for detailed documentation.
Run 'matchtree explain <FILTER>' to see how a filter is parsed.
"#
}

/// Get documentation for a specific category
pub fn get_doc_category(name: &str) -> Result<&'static str, CliError> {
    match DocCategory::from_name(name) {
        Some(DocCategory::Syntax) => Ok(SYNTAX_DOC),
        Some(DocCategory::Logical) => Ok(LOGICAL_DOC),
        Some(DocCategory::Arrays) => Ok(ARRAYS_DOC),
        Some(DocCategory::Comparison) => Ok(COMPARISON_DOC),
        Some(DocCategory::Paths) => Ok(PATHS_DOC),
        None => Err(CliError::UnknownCategory(name.to_string())),
    }
}

const SYNTAX_DOC: &str = r#"SYNTAX - Filter Documents

A filter is a JSON object. Every top-level field adds one predicate, and all
predicates must hold:

  {"status": "active", "qty": {"$gte": 10}}

FIELD PREDICATES
  {"<path>": <value>}
    Equality. Objects and arrays compare field by field, in order.

  {"<path>": {"<$op>": <value>, ...}}
    One predicate per operator. {"x": {"$gt": 1, "$lt": 5}} is the same as
    {"$and": [{"x": {"$gt": 1}}, {"x": {"$lt": 5}}]}.

TREE SHAPE
  A filter with exactly one predicate becomes that predicate. Anything else
  becomes an $and over the predicates, in field order. The empty filter {}
  is an empty $and and matches every document.

  Use 'matchtree explain' to print the canonical form and the tree:

    $ matchtree explain '{"a": 1, "b": {"$size": 0}}'
    {"$and":[{"a":{"$eq":1}},{"b":{"$size":0}}]}
    $and
        a $eq 1
        b $size : 0

ERRORS
  Unknown operators, values of the wrong type (e.g. "$size": "two") and
  filters nested more than 100 levels deep are rejected before evaluation.
"#;

const LOGICAL_DOC: &str = r#"LOGICAL - Combining Predicates

$and: [<filter>, ...]
  Every filter matches. Evaluated left to right, stopping at the first
  failure. An empty $and matches everything.

$or: [<filter>, ...]
  At least one filter matches. Stops at the first success. An empty $or
  matches nothing.

$nor: [<filter>, ...]
  No filter matches. Stops at the first success. An empty $nor matches
  everything.

$not: <filter>
  Negates a whole filter:
    {"$not": {"tags": {"$size": 0}}}

  Or, inside a field, negates that field's operators:
    {"qty": {"$not": {"$gt": 5}}}

  Note that negation also matches documents where the field is missing.

$ne: <value>
  Shorthand for {"$not": {"$eq": <value>}} on one field.
"#;

const ARRAYS_DOC: &str = r#"ARRAYS - Operators on Whole Arrays

Array operators look at the array stored at a path as a whole. Values that
are not arrays never match.

$size: <n>
  The array has exactly n elements.
    {"tags": {"$size": 2}}
  Negative sizes are rejected. A fractional size never matches.

$elemMatch (object form): {<filter>}
  At least one element is an embedded document matching the filter.
  Elements that are not documents are skipped.
    {"items": {"$elemMatch": {"sku": "a1", "qty": {"$gte": 2}}}}

$elemMatch (value form): {<$op>: <value>, ...}
  At least one element satisfies every operator at once.
    {"scores": {"$elemMatch": {"$gt": 2, "$lt": 5}}}
  matches [1, 3, 9] (3 is in range) but not [1, 9], even though 9 > 2 and
  1 < 5 hold for different elements.

  The form is chosen by the first key: an operator other than $and, $or or
  $nor selects the value form.

MATCH KEYS
  With '--log-level debug', 'matchtree check' logs which array position made
  each document match (the elemMatchKey).
"#;

const COMPARISON_DOC: &str = r#"COMPARISON - Field Predicates

$eq, $lt, $lte, $gt, $gte: <value>
  Compare the field with a value of the same kind: numbers with numbers
  (integers and floats mix exactly), strings with strings, booleans with
  booleans. Values of different kinds never compare.

    {"price": {"$lt": 9.99}}
    {"name": {"$gte": "m"}}

  A missing field behaves like null:
    {"deleted": null}        matches documents without "deleted"

$ne: <value>
  Not equal, including documents where the field is missing.

$regex: <pattern>, $options: <flags>
  The field is a string matching the pattern. Flags:
    i   case insensitive
    m   ^ and $ match at line boundaries
    s   . matches newlines
    x   ignore whitespace in the pattern

    {"email": {"$regex": "@example\\.com$", "$options": "i"}}

ARRAYS
  Field predicates look inside arrays: {"tags": "red"} matches
  {"tags": ["red", "blue"]}, and {"tags": ["red", "blue"]} matches the
  whole array.
"#;

const PATHS_DOC: &str = r#"PATHS - Dotted Field Paths

A path names a field, with dots stepping into embedded documents:

  {"address.city": "Oslo"}

THROUGH ARRAYS
  When a step reaches an array, the rest of the path is tried inside every
  element that is a document:

  {"items.qty": 2} matches {"items": [{"qty": 1}, {"qty": 2}]}

  A numeric step selects a position:

  {"items.0.qty": 1} matches the same document.

AT THE END OF A PATH
  Field predicates see each element of a final array, then the array
  itself. Array operators ($size, $elemMatch) only see the array.
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_aliases() {
        assert_eq!(DocCategory::from_name("Logic"), Some(DocCategory::Logical));
        assert_eq!(DocCategory::from_name("dotted-paths"), Some(DocCategory::Paths));
        assert_eq!(DocCategory::from_name("nope"), None);
    }

    #[test]
    fn test_unknown_category() {
        assert!(matches!(
            get_doc_category("nope"),
            Err(CliError::UnknownCategory(name)) if name == "nope"
        ));
    }
}
