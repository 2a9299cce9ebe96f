//! Tests for post-construction property validation.

use intake::{
    Constraint, Creator, CreatorParameter, DeserializeError, Describe, Deserializer, Feature, FeatureSet,
    InvalidValue, PropertyDescriptor, SlotType, TypeDescriptor, Violations,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};

#[derive(Debug, Deserialize)]
struct Holder {
    #[serde(default)]
    value: String,
    note: Option<String>,
    count: i64,
}

impl Describe for Holder {
    const NAME: &'static str = "Holder";

    fn describe() -> TypeDescriptor {
        TypeDescriptor::validated(Self::NAME)
            .property(PropertyDescriptor::new("value", SlotType::String).lateinit())
            .property(
                PropertyDescriptor::new("note", SlotType::String)
                    .nullable()
                    .constraint(Constraint::size(0, 5)),
            )
            .property(PropertyDescriptor::new("count", SlotType::Integer).default_value(0))
    }
}

fn violations_of<T: std::fmt::Debug>(result: Result<T, DeserializeError>) -> Violations {
    match result {
        Err(DeserializeError::Violations(violations)) => violations,
        other => panic!("expected violations, got {:?}", other),
    }
}

#[test]
fn test_properties_assigned() {
    let deserializer = Deserializer::new();
    let holder: Holder = deserializer
        .from_value(&json!({"value": "v", "note": "hi", "count": 2}))
        .unwrap();

    assert_eq!(holder.value, "v");
    assert_eq!(holder.note.as_deref(), Some("hi"));
    assert_eq!(holder.count, 2);
}

#[test]
fn test_omitted_properties_keep_defaults() {
    let deserializer = Deserializer::new();
    let holder: Holder = deserializer.from_value(&json!({"value": "v"})).unwrap();

    assert_eq!(holder.note, None);
    assert_eq!(holder.count, 0);
}

#[test]
fn test_unset_lateinit_is_not_null() {
    let deserializer = Deserializer::new();
    let violations = violations_of(deserializer.from_value::<Holder>(&json!({})));

    assert_eq!(violations.len(), 1);
    let violation = violations.first();
    assert_eq!(violation.kind, "NotNull");
    assert_eq!(violation.path.to_string(), "value");
    assert_eq!(violation.invalid_value, InvalidValue::Absent);
}

#[test]
fn test_unset_lateinit_skipped_when_disabled() {
    let deserializer = Deserializer::new().disable(Feature::ValidateUnsetLateinitLikeProperties);
    let holder: Holder = deserializer.from_value(&json!({})).unwrap();
    assert_eq!(holder.value, "");
}

#[test]
fn test_lateinit_flag_leaves_explicit_null_alone() {
    let payload = json!({"value": null});

    for enabled in [true, false] {
        let features = FeatureSet::default().with(Feature::ValidateUnsetLateinitLikeProperties, enabled);
        let deserializer = Deserializer::new().with_features(features);

        let violations = violations_of(deserializer.from_value::<Holder>(&payload));
        assert_eq!(violations.len(), 1);
        assert!(violations.contains("NotNull", "value"));
        assert_eq!(violations.first().invalid_value, InvalidValue::Value(Value::Null));
    }
}

#[test]
fn test_null_for_non_null_property() {
    let deserializer = Deserializer::new();
    let violations = violations_of(deserializer.from_value::<Holder>(&json!({"value": "v", "count": null})));

    assert_eq!(violations.len(), 1);
    assert!(violations.contains("NotNull", "count"));
}

#[test]
fn test_null_for_nullable_property() {
    let deserializer = Deserializer::new();
    let holder: Holder = deserializer
        .from_value(&json!({"value": "v", "note": null}))
        .unwrap();
    assert_eq!(holder.note, None);
}

#[test]
fn test_property_constraints() {
    let deserializer = Deserializer::new();
    let violations = violations_of(deserializer.from_value::<Holder>(&json!({"value": "v", "note": "too long"})));

    assert_eq!(violations.len(), 1);
    let violation = violations.first();
    assert_eq!(violation.kind, "Size");
    assert_eq!(violation.path.to_string(), "note");
    assert_eq!(violation.invalid_value, InvalidValue::Value(json!("too long")));
}

#[test]
fn test_properties_reported_in_declaration_order() {
    let deserializer = Deserializer::new();
    let violations = violations_of(deserializer.from_value::<Holder>(&json!({
        "count": null,
        "note": "too long"
    })));

    let paths: Vec<String> = violations.iter().map(|v| v.path.to_string()).collect();
    assert_eq!(paths, vec!["value", "note", "count"]);
}

#[test]
fn test_implicit_non_null_disabled_for_properties() {
    let deserializer = Deserializer::new();
    deserializer.registry().resolve_type::<Holder>().unwrap();
    let features = FeatureSet::default().disable(Feature::ValidateImplicitNonNullProperties);

    let value = deserializer
        .materialize_with("Holder", &json!({"value": "v", "count": null}), features)
        .unwrap();
    assert_eq!(value["count"], Value::Null);
}

#[derive(Debug, Deserialize)]
struct Labeled {
    id: i64,
    label: Option<String>,
    #[serde(default)]
    owner: String,
}

impl Describe for Labeled {
    const NAME: &'static str = "Labeled";

    fn describe() -> TypeDescriptor {
        TypeDescriptor::validated(Self::NAME)
            .creator(Creator::constructor().param(CreatorParameter::new("id", SlotType::Integer)))
            .property(
                PropertyDescriptor::new("label", SlotType::String)
                    .nullable()
                    .constraint(Constraint::not_blank()),
            )
            .property(PropertyDescriptor::new("owner", SlotType::String).lateinit())
    }
}

#[test]
fn test_creator_then_properties() {
    let deserializer = Deserializer::new();
    let labeled: Labeled = deserializer
        .from_value(&json!({"id": 1, "label": "first", "owner": "ops"}))
        .unwrap();

    assert_eq!(labeled.id, 1);
    assert_eq!(labeled.label.as_deref(), Some("first"));
    assert_eq!(labeled.owner, "ops");
}

#[test]
fn test_properties_validated_when_creator_aborted() {
    let deserializer = Deserializer::new();
    let violations = violations_of(deserializer.from_value::<Labeled>(&json!({"label": " "})));

    let found: Vec<(String, String)> = violations
        .iter()
        .map(|v| (v.path.to_string(), v.kind.clone()))
        .collect();
    assert_eq!(
        found,
        vec![
            ("id".to_string(), "Required".to_string()),
            ("label".to_string(), "NotBlank".to_string()),
            ("owner".to_string(), "NotNull".to_string()),
        ]
    );
}

#[test]
fn test_absent_nullable_property_runs_constraints() {
    // NotBlank rejects null, so an omitted nullable property with NotBlank fails.
    let deserializer = Deserializer::new();
    let violations = violations_of(deserializer.from_value::<Labeled>(&json!({"id": 1, "owner": "ops"})));

    assert_eq!(violations.len(), 1);
    assert!(violations.contains("NotBlank", "label"));
}

#[test]
fn test_factory_assigned_lateinit_counts_as_set() {
    let deserializer = Deserializer::new();
    deserializer
        .register(
            TypeDescriptor::validated("Stamped")
                .creator(
                    Creator::factory(|args| {
                        let mut fields: Map<String, Value> = args.clone().into_fields();
                        fields.insert("stamp".to_string(), json!("factory"));
                        Ok(fields)
                    })
                    .param(CreatorParameter::new("id", SlotType::Integer)),
                )
                .property(PropertyDescriptor::new("stamp", SlotType::String).lateinit()),
        )
        .unwrap();

    let value = deserializer.materialize("Stamped", &json!({"id": 7})).unwrap();
    assert_eq!(value, json!({"id": 7, "stamp": "factory"}));

    let value = deserializer
        .materialize("Stamped", &json!({"id": 7, "stamp": "payload"}))
        .unwrap();
    assert_eq!(value["stamp"], "payload");
}
