use detached_model::{Entity, ModelError, NavigationValue};
use detached_types::Value;
use pretty_assertions::assert_eq;

fn line(id: i64, qty: i64) -> Entity {
    Entity::new("OrderLine").with("id", id).with("qty", qty)
}

// ── Scalar properties ────────────────────────────────────────────

#[test]
fn unset_property_reads_null() {
    let e = Entity::new("Order");
    assert_eq!(e.get("missing"), &Value::Null);
    assert!(!e.has("missing"));
}

#[test]
fn set_returns_previous_value() {
    let mut e = Entity::new("Order").with("note", "a");
    let prev = e.set("note", "b");
    assert_eq!(prev, Value::from("a"));
    assert_eq!(e.get("note"), &Value::from("b"));
}

#[test]
fn set_on_fresh_property_returns_null() {
    let mut e = Entity::new("Order");
    assert!(e.set("note", 1).is_null());
}

#[test]
fn every_instance_gets_its_own_entry() {
    let a = Entity::new("Order");
    let b = Entity::new("Order");
    assert_ne!(a.entry_id(), b.entry_id());
}

#[test]
fn clone_keeps_the_entry() {
    let a = Entity::new("Order");
    assert_eq!(a.clone().entry_id(), a.entry_id());
}

// ── Navigations ──────────────────────────────────────────────────

#[test]
fn unset_navigations_read_empty() {
    let e = Entity::new("Order");
    assert!(e.reference("category").unwrap().is_none());
    assert!(e.collection("lines").unwrap().is_empty());
}

#[test]
fn collection_roundtrip() {
    let e = Entity::new("Order").with_collection("lines", vec![line(1, 2), line(2, 3)]);
    let lines = e.collection("lines").unwrap();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[1].get("qty"), &Value::Integer(3));
}

#[test]
fn reference_roundtrip() {
    let cat = Entity::new("Category").with("id", 7);
    let e = Entity::new("Order").with_reference("category", Some(cat.clone()));
    assert_eq!(e.reference("category").unwrap(), Some(&cat));
}

#[test]
fn reading_collection_as_reference_is_a_mismatch() {
    let e = Entity::new("Order").with_collection("lines", vec![]);
    let err = e.reference("lines").unwrap_err();
    assert!(matches!(
        err,
        ModelError::CardinalityMismatch { expected: "reference", .. }
    ));
}

#[test]
fn reading_reference_as_collection_is_a_mismatch() {
    let mut e = Entity::new("Order").with_reference("category", None);
    assert!(e.collection("category").is_err());
    assert!(e.collection_mut("category").is_err());
}

#[test]
fn take_collection_leaves_navigation_unset() {
    let mut e = Entity::new("Order").with_collection("lines", vec![line(1, 1)]);
    let taken = e.take_collection("lines").unwrap();
    assert_eq!(taken.len(), 1);
    assert!(e.navigation("lines").is_none());
}

#[test]
fn failed_take_keeps_value() {
    let mut e = Entity::new("Order").with_collection("lines", vec![line(1, 1)]);
    assert!(e.take_reference("lines").is_err());
    assert_eq!(e.collection("lines").unwrap().len(), 1);
}

#[test]
fn reference_mut_edits_in_place() {
    let mut e = Entity::new("Order").with_reference("shipping", Some(Entity::new("Address")));
    e.reference_mut("shipping").unwrap().unwrap().set("city", "Oslo");
    let city = e.reference("shipping").unwrap().unwrap().get("city");
    assert_eq!(city, &Value::from("Oslo"));
}

#[test]
fn collection_mut_edits_in_place() {
    let mut e = Entity::new("Order").with_collection("lines", vec![line(1, 1)]);
    e.collection_mut("lines").unwrap()[0].set("qty", 9);
    assert_eq!(e.collection("lines").unwrap()[0].get("qty"), &Value::Integer(9));
}

// ── Serde ────────────────────────────────────────────────────────

#[test]
fn serde_roundtrip_keeps_graph() {
    let e = Entity::new("Order")
        .with("id", 1)
        .with_collection("lines", vec![line(10, 2)])
        .with_reference("category", None);
    let json = serde_json::to_string(&e).unwrap();
    let back: Entity = serde_json::from_str(&json).unwrap();
    assert_eq!(back, e);
    assert!(matches!(
        back.navigation("category"),
        Some(NavigationValue::Reference(None))
    ));
}
