use detached_merge::{MergeError, equal_by_key, key_of};
use detached_model::{Entity, PrimaryKey};
use detached_types::Value;
use pretty_assertions::assert_eq;

fn single() -> PrimaryKey {
    PrimaryKey::new(["id"])
}

fn compound() -> PrimaryKey {
    PrimaryKey::new(["order_id", "line_no"])
}

// ── equal_by_key ─────────────────────────────────────────────────

#[test]
fn equal_keys_match_regardless_of_other_values() {
    let a = Entity::new("Line").with("id", 10).with("qty", 2);
    let b = Entity::new("Line").with("id", 10).with("qty", 5);
    assert!(equal_by_key(&single(), Some(&a), Some(&b)).unwrap());
}

#[test]
fn different_keys_do_not_match() {
    let a = Entity::new("Line").with("id", 10);
    let b = Entity::new("Line").with("id", 11);
    assert!(!equal_by_key(&single(), Some(&a), Some(&b)).unwrap());
}

#[test]
fn missing_side_never_matches() {
    let a = Entity::new("Line").with("id", 10);
    assert!(!equal_by_key(&single(), Some(&a), None).unwrap());
    assert!(!equal_by_key(&single(), None, Some(&a)).unwrap());
    assert!(!equal_by_key(&single(), None, None).unwrap());
}

#[test]
fn compound_key_needs_every_part_equal() {
    let a = Entity::new("Line").with("order_id", 1).with("line_no", 1);
    let b = Entity::new("Line").with("order_id", 1).with("line_no", 2);
    let c = Entity::new("Line").with("order_id", 1).with("line_no", 1);
    assert!(!equal_by_key(&compound(), Some(&a), Some(&b)).unwrap());
    assert!(equal_by_key(&compound(), Some(&a), Some(&c)).unwrap());
}

#[test]
fn explicit_null_keys_compare_equal() {
    let a = Entity::new("Line").with("id", Value::Null);
    let b = Entity::new("Line").with("id", Value::Null);
    assert!(equal_by_key(&single(), Some(&a), Some(&b)).unwrap());
}

#[test]
fn unset_key_property_is_an_error() {
    let a = Entity::new("Line").with("qty", 1);
    let b = Entity::new("Line").with("id", 1);
    let err = equal_by_key(&single(), Some(&a), Some(&b)).unwrap_err();
    assert!(matches!(
        err,
        MergeError::MissingKeyProperty { ref entity_type, ref property }
            if entity_type == "Line" && property == "id"
    ));
}

// ── key_of ───────────────────────────────────────────────────────

#[test]
fn key_of_follows_key_order() {
    let line = Entity::new("Line").with("line_no", 3).with("order_id", 1);
    let token = key_of(&compound(), &line).unwrap();
    assert_eq!(token.values(), &[Value::Integer(1), Value::Integer(3)]);
    assert_eq!(token.to_string(), "(1, 3)");
}

#[test]
fn equal_instances_produce_equal_tokens() {
    let a = Entity::new("Line").with("id", "A-1").with("qty", 1);
    let b = Entity::new("Line").with("id", "A-1").with("qty", 9);
    assert_eq!(key_of(&single(), &a).unwrap(), key_of(&single(), &b).unwrap());
}
