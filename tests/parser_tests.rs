use matchtree::{
    Document, MatchError, MatchExpression, MatchNode, MatchType, ParseError, Parser,
    convert::json_to_document, parse_filter,
};
use serde_json::json;

fn doc(v: serde_json::Value) -> Document {
    json_to_document(v).unwrap()
}

fn parse(v: serde_json::Value) -> Box<MatchExpression> {
    Parser::new().parse_json(v).unwrap()
}

fn parse_err(v: serde_json::Value) -> ParseError {
    Parser::new().parse_json(v).unwrap_err()
}

fn bad_value(operator: &str, reason: &str) -> ParseError {
    ParseError::BadValue {
        operator: operator.to_string(),
        reason: reason.to_string(),
    }
}

fn assert_round_trips(filter: serde_json::Value) {
    let first = parse(filter.clone());
    let serialized = first.serialize_to_document();
    let second = parse_filter(&serialized).unwrap();
    assert!(
        second.equivalent(&first),
        "{} did not round-trip: {} vs {}",
        filter,
        first,
        second
    );
}

// ========================================
// Tree shape
// ========================================

#[test]
fn test_single_predicate_is_not_wrapped() {
    let e = parse(json!({"a": 1}));
    assert_eq!(e.match_type(), MatchType::Eq);
}

#[test]
fn test_several_predicates_become_and() {
    let e = parse(json!({"a": 1, "b": {"$size": 2}}));
    assert_eq!(e.match_type(), MatchType::And);
    assert_eq!(e.num_children(), 2);
    assert_eq!(e.get_child(1).match_type(), MatchType::Size);
}

#[test]
fn test_empty_filter_is_empty_and() {
    let e = parse(json!({}));
    assert_eq!(e.match_type(), MatchType::And);
    assert_eq!(e.num_children(), 0);
    assert!(e.matches_document(&doc(json!({"anything": true}))));
}

#[test]
fn test_field_operators_are_flattened() {
    let e = parse(json!({"x": {"$gt": 1, "$lt": 5}}));
    assert_eq!(e.match_type(), MatchType::And);
    assert_eq!(e.get_child(0).match_type(), MatchType::Gt);
    assert_eq!(e.get_child(1).match_type(), MatchType::Lt);
    assert!(e.matches_document(&doc(json!({"x": 3}))));
    assert!(!e.matches_document(&doc(json!({"x": 5}))));
}

#[test]
fn test_object_value_without_operators_is_equality() {
    let e = parse(json!({"a": {"b": 1}}));
    assert_eq!(e.match_type(), MatchType::Eq);
    assert!(e.matches_document(&doc(json!({"a": {"b": 1}}))));
    assert!(!e.matches_document(&doc(json!({"a": {"b": 1, "c": 2}}))));
}

#[test]
fn test_logical_operators() {
    let e = parse(json!({"$or": [{"a": 1}, {"$nor": [{"b": 1}]}]}));
    assert_eq!(e.match_type(), MatchType::Or);
    assert_eq!(e.get_child(1).match_type(), MatchType::Nor);
    assert!(e.matches_document(&doc(json!({"a": 0, "b": 0}))));
    assert!(!e.matches_document(&doc(json!({"a": 0, "b": 1}))));
}

#[test]
fn test_empty_logical_arrays_are_accepted() {
    assert_eq!(parse(json!({"$and": []})).num_children(), 0);
    assert!(!parse(json!({"$or": []})).matches_document(&doc(json!({}))));
    assert!(parse(json!({"$nor": []})).matches_document(&doc(json!({}))));
}

#[test]
fn test_top_level_not() {
    let e = parse(json!({"$not": {"tags": {"$size": 0}}}));
    assert_eq!(e.match_type(), MatchType::Not);
    assert_eq!(e.get_child(0).match_type(), MatchType::Size);
}

#[test]
fn test_ne_is_negated_equality() {
    let e = parse(json!({"a": {"$ne": 1}}));
    assert_eq!(e.match_type(), MatchType::Not);
    assert_eq!(e.get_child(0).match_type(), MatchType::Eq);
    assert!(e.matches_document(&doc(json!({"a": 2}))));
    assert!(e.matches_document(&doc(json!({}))));
    assert!(!e.matches_document(&doc(json!({"a": [1, 2]}))));
}

#[test]
fn test_field_not() {
    let single = parse(json!({"qty": {"$not": {"$gt": 5}}}));
    assert_eq!(single.match_type(), MatchType::Not);
    assert_eq!(single.get_child(0).match_type(), MatchType::Gt);

    let range = parse(json!({"qty": {"$not": {"$gt": 1, "$lt": 5}}}));
    assert_eq!(range.get_child(0).match_type(), MatchType::And);
    assert!(range.matches_document(&doc(json!({"qty": 7}))));
    assert!(!range.matches_document(&doc(json!({"qty": 3}))));
}

#[test]
fn test_regex_with_options() {
    let e = parse(json!({"name": {"$regex": "^al", "$options": "i"}}));
    assert_eq!(e.match_type(), MatchType::Regex);
    assert!(e.matches_document(&doc(json!({"name": "Alice"}))));
}

#[test]
fn test_elem_match_forms() {
    let value_form = parse(json!({"xs": {"$elemMatch": {"$gt": 2, "$lt": 5}}}));
    assert_eq!(value_form.match_type(), MatchType::ElemMatchValue);
    assert_eq!(value_form.num_children(), 2);
    assert_eq!(value_form.get_child(0).path(), Some(""));

    let object_form = parse(json!({"xs": {"$elemMatch": {"a": 1}}}));
    assert_eq!(object_form.match_type(), MatchType::ElemMatchObject);

    let logical_object_form = parse(json!({"xs": {"$elemMatch": {"$or": [{"a": 1}]}}}));
    assert_eq!(logical_object_form.match_type(), MatchType::ElemMatchObject);
    assert_eq!(logical_object_form.get_child(0).match_type(), MatchType::Or);
}

#[test]
fn test_elem_match_value_with_not() {
    let e = parse(json!({"xs": {"$elemMatch": {"$not": {"$gt": 5}}}}));
    assert!(e.matches_document(&doc(json!({"xs": [9, 3]}))));
    assert!(!e.matches_document(&doc(json!({"xs": [9, 6]}))));
}

#[test]
fn test_elem_match_object_with_negated_filter() {
    let e = parse(json!({"xs": {"$elemMatch": {"$not": {"a": 1}}}}));
    assert_eq!(e.match_type(), MatchType::ElemMatchObject);
    assert_eq!(e.get_child(0).match_type(), MatchType::Not);
    assert!(e.matches_document(&doc(json!({"xs": [{"a": 1}, {"a": 2}]}))));
    assert!(!e.matches_document(&doc(json!({"xs": [{"a": 1}, 5]}))));

    let ne = parse(json!({"xs": {"$elemMatch": {"a": {"$ne": 1}}}}));
    assert_eq!(ne.to_string(), r#"{"xs":{"$elemMatch":{"$not":{"a":{"$eq":1}}}}}"#);
    let reparsed = parse_filter(&ne.serialize_to_document()).unwrap();
    assert_eq!(reparsed.match_type(), MatchType::ElemMatchObject);
    assert!(reparsed.equivalent(&ne));
}

#[test]
fn test_size_accepts_whole_floats() {
    let e = parse(json!({"tags": {"$size": 2.0}}));
    let MatchNode::Size(size) = e.node() else {
        panic!("expected $size");
    };
    assert_eq!(size.size(), 2);
}

#[test]
fn test_fractional_size_never_matches() {
    let e = parse(json!({"tags": {"$size": 1.5}}));
    let MatchNode::Size(size) = e.node() else {
        panic!("expected $size");
    };
    assert_eq!(size.size(), -1);
    assert!(!e.matches_document(&doc(json!({"tags": [1]}))));
    assert!(!e.matches_document(&doc(json!({"tags": []}))));
}

// ========================================
// Errors
// ========================================

#[test]
fn test_unknown_operators() {
    assert_eq!(
        parse_err(json!({"$where": "x"})),
        ParseError::UnknownOperator("$where".to_string())
    );
    assert_eq!(
        parse_err(json!({"a": {"$in": [1]}})),
        ParseError::UnknownOperator("$in".to_string())
    );
}

#[test]
fn test_logical_operator_values() {
    assert_eq!(parse_err(json!({"$and": {"a": 1}})), bad_value("$and", "needs an array"));
    assert_eq!(
        parse_err(json!({"$or": [1]})),
        bad_value("$or", "entries must be documents")
    );
    assert!(matches!(
        parse_err(json!({"$not": 1})),
        ParseError::NotADocument { found: "integer", .. }
    ));
}

#[test]
fn test_size_values() {
    assert_eq!(
        parse_err(json!({"a": {"$size": "two"}})),
        bad_value("$size", "needs a number")
    );
    assert_eq!(
        parse_err(json!({"a": {"$size": -1}})),
        bad_value("$size", "may not be negative")
    );
    assert_eq!(
        parse_err(json!({"a": {"$size": 4294967296i64}})),
        bad_value("$size", "is too large")
    );
}

#[test]
fn test_regex_values() {
    assert_eq!(
        parse_err(json!({"a": {"$options": "i"}})),
        bad_value("$options", "needs a $regex")
    );
    assert_eq!(
        parse_err(json!({"a": {"$regex": 1}})),
        bad_value("$regex", "needs a string")
    );
    assert!(matches!(
        parse_err(json!({"a": {"$regex": "("}})),
        ParseError::Construction(MatchError::InvalidRegex { .. })
    ));
    assert_eq!(
        parse_err(json!({"a": {"$regex": "a", "$options": "z"}})),
        ParseError::Construction(MatchError::InvalidRegexFlag('z'))
    );
}

#[test]
fn test_empty_path_for_array_operator() {
    assert_eq!(
        parse_err(json!({"": {"$size": 1}})),
        ParseError::Construction(MatchError::EmptyPath)
    );
}

#[test]
fn test_not_values() {
    assert_eq!(
        parse_err(json!({"a": {"$not": {}}})),
        bad_value("$not", "cannot be empty")
    );
    assert_eq!(
        parse_err(json!({"a": {"$not": 5}})),
        bad_value("$not", "needs a document")
    );
}

#[test]
fn test_filter_must_be_document() {
    assert_eq!(
        parse_err(json!([{"a": 1}])),
        ParseError::NotADocument {
            context: "filter".to_string(),
            found: "array",
        }
    );
}

#[test]
fn test_depth_limit() {
    let nested = json!({"$and": [{"$and": [{"$and": [{"a": 1}]}]}]});
    assert_eq!(
        Parser::new().with_max_depth(2).parse_json(nested.clone()).unwrap_err(),
        ParseError::DepthLimitExceeded(2)
    );
    assert!(Parser::new().with_max_depth(3).parse_json(nested).is_ok());
}

#[test]
fn test_error_messages() {
    assert_eq!(
        bad_value("$size", "needs a number").to_string(),
        "$size: needs a number"
    );
    assert_eq!(
        ParseError::Construction(MatchError::EmptyPath).to_string(),
        "path must not be empty"
    );
}

// ========================================
// Serialization
// ========================================

#[test]
fn test_canonical_forms() {
    assert_eq!(
        parse(json!({"$or": [{"a": 1}, {"b": {"$size": 2}}]})).to_string(),
        r#"{"$or":[{"a":{"$eq":1}},{"b":{"$size":2}}]}"#
    );
    assert_eq!(
        parse(json!({"a": {"$ne": 1.0}})).to_string(),
        r#"{"$not":{"a":{"$eq":1.0}}}"#
    );
    assert_eq!(
        parse(json!({"xs": {"$elemMatch": {"$gt": 2, "$not": {"$lt": 0}}}})).to_string(),
        r#"{"xs":{"$elemMatch":{"$gt":2,"$not":{"$lt":0}}}}"#
    );
    assert_eq!(
        parse(json!({"items": {"$elemMatch": {"sku": "a"}}})).to_string(),
        r#"{"items":{"$elemMatch":{"sku":{"$eq":"a"}}}}"#
    );
    assert_eq!(parse(json!({})).to_string(), r#"{"$and":[]}"#);
}

#[test]
fn test_serialize_appends_to_existing_document() {
    let mut out = Document::new();
    out.append("note", "first");
    parse(json!({"a": {"$size": 1}})).serialize(&mut out);
    assert_eq!(out.keys().collect::<Vec<_>>(), vec!["note", "a"]);
}

#[test]
fn test_round_trips() {
    assert_round_trips(json!({"$and": []}));
    assert_round_trips(json!({"$or": [{"a": 1}, {"b": {"$size": 2}}]}));
    assert_round_trips(json!({"$nor": [{"a": {"$gt": 1}}]}));
    assert_round_trips(json!({"$not": {"tags": {"$size": 0}}}));
    assert_round_trips(json!({"a": {"$ne": 1}}));
    assert_round_trips(json!({"a": {"$not": {"$gt": 1, "$lt": 5}}}));
    assert_round_trips(json!({"x": {"$gt": 1, "$lt": 5}, "y": "z"}));
    assert_round_trips(json!({"xs": {"$elemMatch": {"$gt": 2, "$lt": 5}}}));
    assert_round_trips(json!({"xs": {"$elemMatch": {"$not": {"$gt": 5}}}}));
    assert_round_trips(json!({"items": {"$elemMatch": {"sku": "a", "qty": {"$gte": 2}}}}));
    assert_round_trips(json!({"x": {"$elemMatch": {"a": {"$ne": 1}}}}));
    assert_round_trips(json!({"x": {"$elemMatch": {"$not": {"$or": [{"a": 1}, {"b": 2}]}}}}));
    assert_round_trips(json!({"name": {"$regex": "^a", "$options": "i"}}));
    assert_round_trips(json!({"doc": {"nested": [1, {"k": null}]}}));
}
