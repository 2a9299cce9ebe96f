//! Tests for feature flag configuration and call-level behavior.

use intake::{
    Constraint, Creator, CreatorParameter, DeserializeError, Describe, Deserializer, Feature, FeatureError,
    FeatureSet, PropertyDescriptor, RegistryError, SlotType, TypeDescriptor,
};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
struct Account {
    name: String,
    #[serde(default)]
    owner: String,
}

impl Describe for Account {
    const NAME: &'static str = "Account";

    fn describe() -> TypeDescriptor {
        TypeDescriptor::validated(Self::NAME)
            .creator(
                Creator::constructor()
                    .param(CreatorParameter::new("name", SlotType::String).constraint(Constraint::size(3, 12))),
            )
            .property(PropertyDescriptor::new("owner", SlotType::String).lateinit())
    }
}

#[test]
fn test_feature_names_round_trip_through_from_str() {
    for feature in Feature::ALL {
        assert_eq!(feature.name().parse::<Feature>().unwrap(), feature);
        assert_eq!(feature.to_string(), feature.name());
    }

    assert_eq!(
        "validateEverything".parse::<Feature>().unwrap_err(),
        FeatureError::Unknown("validateEverything".to_string())
    );
}

#[test]
fn test_features_from_json_config() {
    let config = json!({
        "validateWholeObjectAfterConstruction": true,
        "validateUnsetLateinitLikeProperties": false
    });
    let features = FeatureSet::default().apply_json(&config).unwrap();

    assert!(features.is_enabled(Feature::ValidateWholeObjectAfterConstruction));
    assert!(features.is_enabled(Feature::ValidateImplicitNonNullProperties));
    assert!(!features.is_enabled(Feature::ValidateUnsetLateinitLikeProperties));

    let deserializer = Deserializer::new().with_features(features);
    let account: Account = deserializer.from_value(&json!({"name": "ops"})).unwrap();
    assert_eq!(account.name, "ops");
    assert_eq!(account.owner, "");
}

#[test]
fn test_invalid_json_config() {
    let defaults = FeatureSet::default();
    assert_eq!(defaults.apply_json(&json!([])).unwrap_err(), FeatureError::NotAnObject);
    assert_eq!(
        defaults
            .apply_json(&json!({"failOnUnknownProperties": "yes"}))
            .unwrap_err(),
        FeatureError::NotBoolean("failOnUnknownProperties".to_string())
    );
}

#[test]
fn test_unknown_properties_ignored_by_default() {
    let deserializer = Deserializer::new();
    let account: Account = deserializer
        .from_value(&json!({"name": "ops", "owner": "me", "extra": 1}))
        .unwrap();
    assert_eq!(account.owner, "me");
}

#[test]
fn test_unknown_properties_fatal_when_enabled() {
    let deserializer = Deserializer::new().enable(Feature::FailOnUnknownProperties);
    let err = deserializer
        .from_value::<Account>(&json!({"name": "ops", "owner": "me", "extra": 1}))
        .unwrap_err();

    match err {
        DeserializeError::UnknownProperty { path } => assert_eq!(path.to_string(), "extra"),
        other => panic!("expected unknown property, got {:?}", other),
    }
}

#[test]
fn test_idempotent_reports() {
    let deserializer = Deserializer::new();
    let payload = json!({"name": "x"});

    let first = deserializer
        .from_value::<Account>(&payload)
        .unwrap_err()
        .into_violations()
        .unwrap();
    let second = deserializer
        .from_value::<Account>(&payload)
        .unwrap_err()
        .into_violations()
        .unwrap();

    assert_eq!(first.len(), 2);
    assert_eq!(first.clone().into_vec(), second.clone().into_vec());
    assert!(first.is_equivalent(&second));
}

#[test]
fn test_call_site_override_is_scoped_to_the_call() {
    let deserializer = Deserializer::new();
    let lenient = deserializer
        .features()
        .disable(Feature::ValidateUnsetLateinitLikeProperties);

    assert!(deserializer
        .from_value_with::<Account>(&json!({"name": "ops"}), lenient)
        .is_ok());
    assert!(deserializer.from_value::<Account>(&json!({"name": "ops"})).is_err());
    assert_eq!(deserializer.features(), FeatureSet::default());
}

#[derive(Debug, Deserialize)]
struct Person {
    first_name: String,
    home_town: Option<String>,
}

impl Describe for Person {
    const NAME: &'static str = "Person";

    fn describe() -> TypeDescriptor {
        TypeDescriptor::validated(Self::NAME)
            .creator(
                Creator::constructor().param(
                    CreatorParameter::new("first_name", SlotType::String)
                        .json_name("firstName")
                        .constraint(Constraint::not_blank()),
                ),
            )
            .property(
                PropertyDescriptor::new("home_town", SlotType::String)
                    .json_name("homeTown")
                    .nullable()
                    .constraint(Constraint::size(2, 40)),
            )
    }
}

#[test]
fn test_payload_keys_read_by_json_name() {
    let deserializer = Deserializer::new().enable(Feature::FailOnUnknownProperties);
    let person: Person = deserializer
        .from_value(&json!({"firstName": "Ada", "homeTown": "London"}))
        .unwrap();

    assert_eq!(person.first_name, "Ada");
    assert_eq!(person.home_town.as_deref(), Some("London"));

    let err = deserializer
        .from_value::<Person>(&json!({"first_name": "Ada"}))
        .unwrap_err();
    assert!(matches!(err, DeserializeError::UnknownProperty { ref path } if path.to_string() == "first_name"));
}

#[test]
fn test_violation_paths_use_json_names_by_default() {
    let deserializer = Deserializer::new();
    let violations = deserializer
        .from_value::<Person>(&json!({"firstName": " ", "homeTown": "X"}))
        .unwrap_err()
        .into_violations()
        .unwrap();

    assert_eq!(violations.len(), 2);
    assert!(violations.contains("NotBlank", "firstName"));
    assert!(violations.contains("Size", "homeTown"));

    let missing = deserializer
        .from_value::<Person>(&json!({}))
        .unwrap_err()
        .into_violations()
        .unwrap();
    assert!(missing.contains("Required", "firstName"));
}

#[test]
fn test_violation_paths_use_member_names_when_enabled() {
    let deserializer = Deserializer::new().enable(Feature::ReportMemberPathsInViolations);
    let violations = deserializer
        .from_value::<Person>(&json!({"firstName": " ", "homeTown": "X"}))
        .unwrap_err()
        .into_violations()
        .unwrap();

    assert_eq!(violations.len(), 2);
    assert!(violations.contains("NotBlank", "first_name"));
    assert!(violations.contains("Size", "home_town"));
    assert!(violations.at("firstName").is_empty());
}

#[test]
fn test_colliding_json_names_rejected() {
    let deserializer = Deserializer::new();
    let err = deserializer
        .register(
            TypeDescriptor::validated("Clash")
                .property(PropertyDescriptor::new("a", SlotType::String).json_name("key"))
                .property(PropertyDescriptor::new("b", SlotType::String).json_name("key")),
        )
        .unwrap_err();

    assert!(matches!(
        err,
        RegistryError::DuplicateSlot { ref slot, .. } if slot == "key"
    ));
}
