//! Tests for concurrent deserialization calls sharing one registry and engine.

use intake::{
    Constraint, Creator, CreatorParameter, Describe, Deserializer, SlotType, TypeDescriptor, TypeRegistry,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

static DESCRIBE_CALLS: AtomicUsize = AtomicUsize::new(0);

#[derive(Debug, Deserialize)]
struct User {
    name: String,
    age: i64,
}

impl Describe for User {
    const NAME: &'static str = "User";

    fn describe() -> TypeDescriptor {
        DESCRIBE_CALLS.fetch_add(1, Ordering::SeqCst);
        TypeDescriptor::validated(Self::NAME).creator(
            Creator::constructor()
                .param(CreatorParameter::new("name", SlotType::String).constraint(Constraint::pattern("[A-Za-z0-9]+")))
                .param(CreatorParameter::new("age", SlotType::Integer).constraint(Constraint::min(0))),
        )
    }
}

#[test]
fn test_concurrent_calls() {
    let deserializer = Arc::new(Deserializer::new());

    let handles: Vec<_> = (0..10)
        .map(|i| {
            let deserializer = Arc::clone(&deserializer);
            thread::spawn(move || {
                let user: User = deserializer
                    .from_value(&json!({"name": format!("User{}", i), "age": 20 + i}))
                    .unwrap();
                assert_eq!(user.age, 20 + i);

                let err = deserializer
                    .from_value::<User>(&json!({"name": "bad name", "age": -i - 1}))
                    .unwrap_err();
                let violations = err.violations().unwrap();
                assert_eq!(violations.len(), 2);
                assert!(violations.contains("Pattern", "name"));
                assert!(violations.contains("Min", "age"));
                user.name
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().unwrap(), format!("User{}", i));
    }
}

#[test]
fn test_descriptor_computed_once_under_contention() {
    let registry = TypeRegistry::new();
    let deserializer = Arc::new(Deserializer::new().with_registry(registry.clone()));
    let before = DESCRIBE_CALLS.load(Ordering::SeqCst);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let deserializer = Arc::clone(&deserializer);
            thread::spawn(move || {
                deserializer.registry().resolve_type::<User>().unwrap();
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    // Other tests resolve User in their own registries, so only a lower bound
    // on the global counter is stable; the shared registry holds one entry.
    assert!(DESCRIBE_CALLS.load(Ordering::SeqCst) > before);
    assert_eq!(registry.len(), 1);
    assert!(registry.is_validated("User"));
}

#[test]
fn test_batch_keeps_input_order() {
    let deserializer = Deserializer::new();
    deserializer.registry().resolve_type::<User>().unwrap();

    let payloads: Vec<Value> = (0..50)
        .map(|i| {
            if i % 5 == 0 {
                json!({"name": format!("U{}", i)})
            } else {
                json!({"name": format!("U{}", i), "age": i})
            }
        })
        .collect();

    let results = deserializer.materialize_batch("User", &payloads);
    assert_eq!(results.len(), 50);

    for (i, result) in results.iter().enumerate() {
        if i % 5 == 0 {
            let violations = result.as_ref().unwrap_err().violations().unwrap();
            assert_eq!(violations.len(), 1);
            assert!(violations.contains("Required", "age"));
        } else {
            let value = result.as_ref().unwrap();
            assert_eq!(value["age"], json!(i));
        }
    }
}

#[test]
fn test_deserializer_clones_share_registry() {
    let deserializer = Deserializer::new();
    let clone = deserializer.clone();

    deserializer.registry().resolve_type::<User>().unwrap();
    assert!(clone.registry().get("User").is_some());
}
