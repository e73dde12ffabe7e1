use detached_model::{
    Cardinality, EntityType, ModelError, NavigationDef, PrimaryKey, PropertyDef,
    RelationshipKind,
};
use detached_types::ValueKind;
use pretty_assertions::assert_eq;

// ── PropertyDef constructors ─────────────────────────────────────

#[test]
fn scalar_is_overwritable() {
    let p = PropertyDef::scalar("qty");
    assert_eq!(p.name, "qty");
    assert!(p.is_overwritable());
}

#[test]
fn key_is_not_overwritable() {
    let p = PropertyDef::key("id");
    assert!(p.is_key);
    assert!(!p.is_overwritable());
}

#[test]
fn foreign_key_is_not_overwritable() {
    assert!(!PropertyDef::foreign_key("order_id").is_overwritable());
}

#[test]
fn shadow_is_not_overwritable() {
    assert!(!PropertyDef::shadow("row_version").is_overwritable());
}

#[test]
fn exempt_is_not_overwritable() {
    assert!(!PropertyDef::exempt("computed").is_overwritable());
}

// ── NavigationDef constructors ───────────────────────────────────

#[test]
fn navigation_shorthands() {
    let n = NavigationDef::owned_collection("lines", "OrderLine");
    assert_eq!(n.kind, RelationshipKind::Owned);
    assert_eq!(n.cardinality, Cardinality::Collection);
    assert!(n.is_collection());

    let n = NavigationDef::associated_reference("category", "Category");
    assert!(n.kind.is_associated());
    assert!(!n.is_collection());
}

#[test]
fn other_kind_is_neither_owned_nor_associated() {
    let k = RelationshipKind::Other;
    assert!(!k.is_owned());
    assert!(!k.is_associated());
}

// ── Builder ──────────────────────────────────────────────────────

#[test]
fn builder_collects_members_in_order() {
    let ty = EntityType::builder("Order")
        .key("id")
        .property("note")
        .foreign_key("customer_id")
        .owns_many("lines", "OrderLine")
        .references_one("category", "Category")
        .build()
        .unwrap();

    let names: Vec<_> = ty.properties.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["id", "note", "customer_id"]);
    assert_eq!(ty.navigations.len(), 2);
    assert_eq!(ty.primary_key, PrimaryKey::new(["id"]));
}

#[test]
fn compound_keys_keep_declaration_order() {
    let ty = EntityType::builder("Membership")
        .key("user_id")
        .key("role_id")
        .build()
        .unwrap();
    assert_eq!(ty.primary_key.properties(), ["user_id", "role_id"]);
}

#[test]
fn overwritable_properties_skip_keys_and_audit() {
    let ty = EntityType::builder("Order")
        .key("id")
        .property("note")
        .foreign_key("customer_id")
        .shadow("row_version")
        .exempt("total")
        .created_by("created_by")
        .modified_at("updated_at")
        .build()
        .unwrap();

    let names: Vec<_> = ty.overwritable_properties().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["note"]);
    assert_eq!(ty.audit.created_by.as_deref(), Some("created_by"));
    assert_eq!(ty.audit.modified_at.as_deref(), Some("updated_at"));
    assert!(ty.audit.created_at.is_none());
}

#[test]
fn audit_columns_stay_exempt_when_flag_is_missing() {
    let mut ty = EntityType::builder("Order")
        .key("id")
        .modified_by("editor")
        .build()
        .unwrap();
    ty.properties[1].overwrite_exempt = false;
    assert!(!ty.is_overwritable(&ty.properties[1]));
}

#[test]
fn missing_primary_key_is_rejected() {
    let err = EntityType::builder("Order").property("note").build().unwrap_err();
    assert!(matches!(err, ModelError::EmptyPrimaryKey(name) if name == "Order"));
}

#[test]
fn duplicate_members_are_rejected() {
    let err = EntityType::builder("Order")
        .key("id")
        .property("lines")
        .owns_many("lines", "OrderLine")
        .build()
        .unwrap_err();
    assert!(matches!(err, ModelError::DuplicateMember { member, .. } if member == "lines"));
}

#[test]
fn undeclared_key_property_is_rejected() {
    let ty = EntityType {
        name: "Order".into(),
        properties: vec![PropertyDef::scalar("note")],
        navigations: vec![],
        primary_key: PrimaryKey::new(["id"]),
        audit: Default::default(),
    };
    assert!(matches!(
        ty.validate(),
        Err(ModelError::UndeclaredKeyProperty { property, .. }) if property == "id"
    ));
}

#[test]
fn lookup_by_name() {
    let ty = EntityType::builder("Order")
        .key("id")
        .owns_one("shipping", "Address")
        .build()
        .unwrap();
    assert!(ty.property("id").unwrap().is_key);
    assert!(ty.navigation("shipping").unwrap().kind.is_owned());
    assert!(ty.property("shipping").is_none());
}

// ── Serialization ────────────────────────────────────────────────

#[test]
fn descriptor_deserializes_with_defaults() {
    let ty: EntityType = serde_json::from_str(
        r#"{
            "name": "Category",
            "properties": [{"name": "id", "is_key": true}, {"name": "title"}],
            "primary_key": ["id"]
        }"#,
    )
    .unwrap();
    assert!(ty.validate().is_ok());
    assert!(ty.navigations.is_empty());
    assert!(ty.audit.is_empty());
    assert!(ty.property("title").unwrap().is_overwritable());
}

#[test]
fn relationship_kind_serializes_snake_case() {
    let json = serde_json::to_string(&RelationshipKind::Associated).unwrap();
    assert_eq!(json, "\"associated\"");
}

// ── Property kinds ───────────────────────────────────────────────

#[test]
fn of_kind_types_the_last_declared_property() {
    let ty = EntityType::builder("Order")
        .key("id")
        .of_kind(ValueKind::Uuid)
        .property("note")
        .created_at("created_at")
        .created_by("created_by")
        .build()
        .unwrap();

    assert_eq!(ty.property("id").unwrap().kind, ValueKind::Uuid);
    assert_eq!(ty.property("note").unwrap().kind, ValueKind::Any);
    assert_eq!(ty.property("created_at").unwrap().kind, ValueKind::Timestamp);
    assert_eq!(ty.property("created_by").unwrap().kind, ValueKind::Text);
}

#[test]
fn missing_kind_deserializes_as_any() {
    let p: PropertyDef = serde_json::from_str(r#"{"name": "qty"}"#).unwrap();
    assert_eq!(p.kind, ValueKind::Any);
    let p: PropertyDef = serde_json::from_str(r#"{"name": "id", "kind": "uuid", "is_key": true}"#).unwrap();
    assert_eq!(p, PropertyDef::key("id").of_kind(ValueKind::Uuid));
}
