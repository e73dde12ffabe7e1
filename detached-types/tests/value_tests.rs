use chrono::{TimeZone, Utc};
use detached_types::{EntityState, Error, Value, ValueKind};
use proptest::prelude::*;
use serde_json::json;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

fn hash_of(v: &Value) -> u64 {
    let mut h = DefaultHasher::new();
    v.hash(&mut h);
    h.finish()
}

// ── Equality ──────────────────────────────────────────────────────

#[test]
fn same_variant_same_payload_is_equal() {
    assert_eq!(Value::from(5), Value::Integer(5));
    assert_eq!(Value::from("a"), Value::Text("a".into()));
    assert_eq!(Value::Null, Value::Null);
}

#[test]
fn different_variants_are_never_equal() {
    assert_ne!(Value::Integer(1), Value::Float(1.0));
    assert_ne!(Value::Text("1".into()), Value::Integer(1));
    assert_ne!(Value::Null, Value::Bool(false));
}

#[test]
fn nan_equals_itself() {
    assert_eq!(Value::Float(f64::NAN), Value::Float(f64::NAN));
}

#[test]
fn signed_zeros_are_equal_and_hash_alike() {
    assert_eq!(Value::Float(0.0), Value::Float(-0.0));
    assert_eq!(hash_of(&Value::Float(0.0)), hash_of(&Value::Float(-0.0)));
}

#[test]
fn differently_encoded_nans_hash_alike() {
    let quiet = f64::from_bits(f64::NAN.to_bits() | 1);
    assert_eq!(Value::Float(quiet), Value::Float(f64::NAN));
    assert_eq!(hash_of(&Value::Float(quiet)), hash_of(&Value::Float(f64::NAN)));
}

#[test]
fn option_none_is_null() {
    let v: Value = Option::<i64>::None.into();
    assert!(v.is_null());
    let v: Value = Some("x").into();
    assert_eq!(v.as_text(), Some("x"));
}

#[test]
fn timestamps_compare_by_instant() {
    let t = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
    assert_eq!(Value::from(t), Value::Timestamp(t));
    assert_eq!(Value::from(t).as_timestamp(), Some(t));
}

// ── JSON conversion ──────────────────────────────────────────────

#[test]
fn json_scalars_convert() {
    assert_eq!(Value::try_from(&json!(null)).unwrap(), Value::Null);
    assert_eq!(Value::try_from(&json!(true)).unwrap(), Value::Bool(true));
    assert_eq!(Value::try_from(&json!(42)).unwrap(), Value::Integer(42));
    assert_eq!(Value::try_from(&json!(1.5)).unwrap(), Value::Float(1.5));
    assert_eq!(Value::try_from(&json!("hi")).unwrap(), Value::Text("hi".into()));
}

#[test]
fn json_containers_are_rejected() {
    assert!(Value::try_from(&json!([1, 2])).is_err());
    assert!(Value::try_from(&json!({"a": 1})).is_err());
}

#[test]
fn to_json_inverts_scalar_conversion() {
    for j in [json!(null), json!(false), json!(7), json!(2.25), json!("s")] {
        let v = Value::try_from(&j).unwrap();
        assert_eq!(v.to_json(), j);
    }
}

#[test]
fn typed_decoding_restores_uuids_and_timestamps() {
    let id = uuid::Uuid::now_v7();
    let at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap() + chrono::Duration::nanoseconds(1_500);
    for v in [Value::Uuid(id), Value::Timestamp(at), Value::Bytes(vec![0, 7, 255])] {
        let kind = match v {
            Value::Uuid(_) => ValueKind::Uuid,
            Value::Timestamp(_) => ValueKind::Timestamp,
            _ => ValueKind::Bytes,
        };
        assert_eq!(Value::from_json_as(&v.to_json(), kind).unwrap(), v);
    }
}

#[test]
fn untyped_decoding_keeps_strings() {
    let id = uuid::Uuid::now_v7();
    let v = Value::from_json_as(&json!(id.to_string()), ValueKind::Any).unwrap();
    assert_eq!(v, Value::Text(id.to_string()));
}

#[test]
fn typed_decoding_accepts_null_and_integral_floats() {
    assert_eq!(Value::from_json_as(&json!(null), ValueKind::Uuid).unwrap(), Value::Null);
    assert_eq!(Value::from_json_as(&json!(2), ValueKind::Float).unwrap(), Value::Float(2.0));
}

#[test]
fn typed_decoding_rejects_mismatches() {
    assert!(matches!(
        Value::from_json_as(&json!("nope"), ValueKind::Uuid),
        Err(Error::InvalidUuid(_))
    ));
    assert!(matches!(
        Value::from_json_as(&json!("yesterday"), ValueKind::Timestamp),
        Err(Error::InvalidValue(_))
    ));
    assert!(Value::from_json_as(&json!(1.5), ValueKind::Integer).is_err());
    assert!(Value::from_json_as(&json!("1"), ValueKind::Integer).is_err());
    assert!(Value::from_json_as(&json!([256]), ValueKind::Bytes).is_err());
}

#[test]
fn value_kind_serializes_snake_case() {
    assert_eq!(serde_json::to_string(&ValueKind::Timestamp).unwrap(), "\"timestamp\"");
    assert_eq!(ValueKind::default(), ValueKind::Any);
}

// ── EntityState ──────────────────────────────────────────────────

#[test]
fn entity_state_default_is_detached() {
    assert_eq!(EntityState::default(), EntityState::Detached);
    assert!(!EntityState::Detached.is_tracked());
    assert!(EntityState::Deleted.is_tracked());
}

#[test]
fn entity_state_serializes_snake_case() {
    assert_eq!(serde_json::to_string(&EntityState::Modified).unwrap(), "\"modified\"");
    assert_eq!(EntityState::Added.to_string(), "added");
}

proptest! {
    /// Equal values always hash equally, so they can be used in key tokens.
    #[test]
    fn equal_values_hash_equally(x in any::<f64>(), n in any::<i64>(), s in "[a-z]{0,12}") {
        for v in [Value::Float(x), Value::Integer(n), Value::Text(s.clone())] {
            let copy = v.clone();
            prop_assert_eq!(&v, &copy);
            prop_assert_eq!(hash_of(&v), hash_of(&copy));
        }
    }

    #[test]
    fn integer_equality_matches_i64(a in any::<i64>(), b in any::<i64>()) {
        prop_assert_eq!(Value::Integer(a) == Value::Integer(b), a == b);
    }
}
