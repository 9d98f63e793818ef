//! End-to-end behaviour of small trees built by hand and by the parser.

use matchtree::{
    ComparisonMatchExpression, ComparisonOp, Document, ElemMatchValueMatchExpression,
    MatchExpression, SizeMatchExpression, convert::json_to_document, parse_filter,
};
use serde_json::json;

fn doc(v: serde_json::Value) -> Document {
    json_to_document(v).unwrap()
}

/// `$and: [scores $elemMatch {$gt: 90}, $not: {tags $size 0}]`
fn scores_and_tags() -> Box<MatchExpression> {
    let mut scores = ElemMatchValueMatchExpression::new("scores").unwrap();
    scores.add(Box::new(
        ComparisonMatchExpression::new("", ComparisonOp::Gt, 90).into(),
    ));
    let no_tags = SizeMatchExpression::new("tags", 0).unwrap();

    MatchExpression::and(vec![
        Box::new(scores.into()),
        MatchExpression::not(Box::new(no_tags.into())),
    ])
}

#[test]
fn test_high_score_without_tags_is_rejected() {
    let tree = scores_and_tags();
    assert!(!tree.matches_document(&doc(json!({"scores": [50, 95], "tags": []}))));
}

#[test]
fn test_high_score_with_tags_is_accepted() {
    let tree = scores_and_tags();
    assert!(tree.matches_document(&doc(json!({"scores": [95], "tags": ["x"]}))));
}

#[test]
fn test_low_scores_are_rejected() {
    let tree = scores_and_tags();
    assert!(!tree.matches_document(&doc(json!({"scores": [50, 90], "tags": ["x"]}))));
}

#[test]
fn test_hand_built_tree_matches_parsed_tree() {
    let parsed = parse_filter(&doc(json!({
        "scores": {"$elemMatch": {"$gt": 90}},
        "$not": {"tags": {"$size": 0}}
    })))
    .unwrap();
    assert!(parsed.equivalent(&scores_and_tags()));
    assert_eq!(
        parsed.to_debug_string(),
        "$and\n    scores $elemMatch (value)\n        $gt 90\n    $not\n        tags $size : 0\n"
    );
}

#[test]
fn test_clone_survives_planner_rewrite() {
    let original = scores_and_tags();
    let mut plan = original.shallow_clone();

    // Swap the conjunction's children, as a planner reordering would
    let mut children = plan.release_children();
    children.reverse();
    plan.reset_children(children);

    let d = doc(json!({"scores": [95], "tags": ["x"]}));
    assert!(plan.matches_document(&d));
    assert!(original.matches_document(&d));
    assert!(!plan.equivalent(&original));
    assert_eq!(original.get_child(0).path(), Some("scores"));
}

#[test]
fn test_inventory_filter() {
    let filter = parse_filter(&doc(json!({
        "$or": [
            {"items": {"$elemMatch": {"sku": "a1", "qty": {"$gte": 2}}}},
            {"items": {"$size": 0}, "status": {"$regex": "^back", "$options": "i"}}
        ]
    })))
    .unwrap();

    let cases = [
        (json!({"items": [{"sku": "a1", "qty": 3}], "status": "open"}), true),
        (json!({"items": [{"sku": "a1", "qty": 1}], "status": "open"}), false),
        (json!({"items": [], "status": "Backorder"}), true),
        (json!({"items": [], "status": "open"}), false),
        (json!({"status": "backorder"}), false),
    ];
    for (input, expected) in cases {
        assert_eq!(filter.matches_document(&doc(input.clone())), expected, "{}", input);
    }
}
