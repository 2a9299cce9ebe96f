//! Registry of type descriptors.
//!
//! This module provides the [`TypeRegistry`] that stores descriptors by type name
//! and answers whether a type is opted into validated deserialization. Types that
//! implement [`Describe`] are resolved lazily: their descriptor is computed on
//! first use and cached for the registry's lifetime.

use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::descriptor::{Describe, TypeDescriptor, TypeRef};

/// Type alias for the descriptor storage map.
type DescriptorMap = Arc<RwLock<HashMap<String, Arc<TypeDescriptor>>>>;

/// A thread-safe registry of type descriptors.
///
/// # Thread Safety
///
/// The registry uses `Arc<RwLock<...>>`:
/// - Any number of threads can resolve concurrently (read access)
/// - Registration and first-time resolution are serialized (write access)
///
/// Each descriptor is computed at most once per registry, even when several
/// threads resolve the same type at the same time.
///
/// # Example
///
/// ```rust
/// use intake::{TypeDescriptor, TypeRegistry};
///
/// let registry = TypeRegistry::new();
/// registry.register(TypeDescriptor::validated("Pair")).unwrap();
///
/// assert!(registry.is_validated("Pair"));
/// assert!(!registry.is_validated("Unknown"));
///
/// // Duplicate registration fails
/// assert!(registry.register(TypeDescriptor::new("Pair")).is_err());
/// ```
pub struct TypeRegistry {
    descriptors: DescriptorMap,
}

impl TypeRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self {
            descriptors: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Registers a descriptor under its type name.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::DuplicateName` if the name is already registered and
    /// `RegistryError::DuplicateSlot` or `RegistryError::InvalidDescriptor` if the
    /// descriptor is malformed.
    pub fn register(&self, descriptor: TypeDescriptor) -> Result<Arc<TypeDescriptor>, RegistryError> {
        check_descriptor(&descriptor)?;

        let mut descriptors = self.descriptors.write();
        if descriptors.contains_key(descriptor.name()) {
            return Err(RegistryError::DuplicateName(descriptor.name().to_string()));
        }

        let descriptor = Arc::new(descriptor);
        descriptors.insert(descriptor.name().to_string(), Arc::clone(&descriptor));
        tracing::debug!(type_name = descriptor.name(), "registered type descriptor");
        Ok(descriptor)
    }

    /// Retrieves a registered descriptor by name.
    pub fn get(&self, name: &str) -> Option<Arc<TypeDescriptor>> {
        self.descriptors.read().get(name).cloned()
    }

    /// Returns true if `name` is registered and opted into validated deserialization.
    pub fn is_validated(&self, name: &str) -> bool {
        self.get(name).is_some_and(|desc| desc.is_validated())
    }

    /// Returns the number of registered descriptors.
    pub fn len(&self) -> usize {
        self.descriptors.read().len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.descriptors.read().is_empty()
    }

    /// Resolves a type reference, computing and caching its descriptor on first use.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::NotFound` for a named reference that was never
    /// registered, or the registration error of a malformed computed descriptor.
    pub fn resolve(&self, type_ref: &TypeRef) -> Result<Arc<TypeDescriptor>, RegistryError> {
        if let Some(desc) = self.get(type_ref.name()) {
            return Ok(desc);
        }

        let provider = type_ref
            .provider()
            .ok_or_else(|| RegistryError::NotFound(type_ref.name().to_string()))?;

        let mut descriptors = self.descriptors.write();
        // Another thread may have won the race while the read lock was released.
        if let Some(desc) = descriptors.get(type_ref.name()) {
            return Ok(Arc::clone(desc));
        }

        let descriptor = provider();
        if descriptor.name() != type_ref.name() {
            return Err(RegistryError::InvalidDescriptor {
                type_name: type_ref.name().to_string(),
                reason: format!("describe() returned a descriptor named '{}'", descriptor.name()),
            });
        }
        check_descriptor(&descriptor)?;

        let descriptor = Arc::new(descriptor);
        descriptors.insert(type_ref.name().to_string(), Arc::clone(&descriptor));
        tracing::trace!(type_name = type_ref.name(), "computed type descriptor");
        Ok(descriptor)
    }

    /// Resolves the descriptor of a [`Describe`] type.
    pub fn resolve_type<T: Describe>(&self) -> Result<Arc<TypeDescriptor>, RegistryError> {
        self.resolve(&TypeRef::of::<T>())
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for TypeRegistry {
    fn clone(&self) -> Self {
        Self {
            descriptors: Arc::clone(&self.descriptors),
        }
    }
}

fn check_descriptor(descriptor: &TypeDescriptor) -> Result<(), RegistryError> {
    for names in [
        descriptor.slot_names().collect::<Vec<_>>(),
        descriptor.payload_keys().collect::<Vec<_>>(),
    ] {
        let mut seen = HashSet::new();
        if let Some(slot) = names.into_iter().find(|name| !seen.insert(*name)) {
            return Err(RegistryError::DuplicateSlot {
                type_name: descriptor.name().to_string(),
                slot: slot.to_string(),
            });
        }
    }

    for property in descriptor.properties() {
        if property.is_lateinit_like() && property.spec().default().is_some() {
            return Err(RegistryError::InvalidDescriptor {
                type_name: descriptor.name().to_string(),
                reason: format!("lateinit property '{}' cannot have a default", property.name()),
            });
        }
    }

    Ok(())
}

/// Errors that can occur during registry operations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Attempted to register a type with a name that already exists.
    #[error("type '{0}' already registered")]
    DuplicateName(String),

    /// A named type reference could not be resolved.
    #[error("type '{0}' not found")]
    NotFound(String),

    /// Two slots of one type share a name.
    #[error("type '{type_name}' declares slot '{slot}' more than once")]
    DuplicateSlot { type_name: String, slot: String },

    /// The descriptor is inconsistent.
    #[error("invalid descriptor for '{type_name}': {reason}")]
    InvalidDescriptor { type_name: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{Creator, CreatorParameter, PropertyDescriptor, SlotType};
    use std::sync::atomic::{AtomicUsize, Ordering};

    static DESCRIBE_CALLS: AtomicUsize = AtomicUsize::new(0);

    struct Counted;

    impl Describe for Counted {
        const NAME: &'static str = "Counted";

        fn describe() -> TypeDescriptor {
            DESCRIBE_CALLS.fetch_add(1, Ordering::SeqCst);
            TypeDescriptor::validated(Self::NAME)
        }
    }

    struct Misnamed;

    impl Describe for Misnamed {
        const NAME: &'static str = "Misnamed";

        fn describe() -> TypeDescriptor {
            TypeDescriptor::new("Other")
        }
    }

    #[test]
    fn test_register_and_get() {
        let registry = TypeRegistry::new();
        registry.register(TypeDescriptor::validated("Pair")).unwrap();

        assert!(registry.get("Pair").is_some());
        assert!(registry.get("Missing").is_none());
        assert!(registry.is_validated("Pair"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_duplicate_name() {
        let registry = TypeRegistry::new();
        registry.register(TypeDescriptor::new("Pair")).unwrap();

        let err = registry.register(TypeDescriptor::new("Pair")).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateName(name) if name == "Pair"));
    }

    #[test]
    fn test_duplicate_slot() {
        let registry = TypeRegistry::new();
        let desc = TypeDescriptor::new("Pair")
            .creator(Creator::constructor().param(CreatorParameter::new("left", SlotType::String)))
            .property(PropertyDescriptor::new("left", SlotType::String));

        let err = registry.register(desc).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateSlot { slot, .. } if slot == "left"));
    }

    #[test]
    fn test_lateinit_with_default_is_rejected() {
        let registry = TypeRegistry::new();
        let desc = TypeDescriptor::new("Holder").property(
            PropertyDescriptor::new("value", SlotType::String)
                .lateinit()
                .default_value("x"),
        );

        assert!(matches!(
            registry.register(desc),
            Err(RegistryError::InvalidDescriptor { .. })
        ));
    }

    #[test]
    fn test_resolve_named_missing() {
        let registry = TypeRegistry::new();
        let err = registry.resolve(&TypeRef::named("Ghost")).unwrap_err();
        assert!(matches!(err, RegistryError::NotFound(name) if name == "Ghost"));
    }

    #[test]
    fn test_resolve_computes_once() {
        let registry = TypeRegistry::new();
        let before = DESCRIBE_CALLS.load(Ordering::SeqCst);

        let first = registry.resolve_type::<Counted>().unwrap();
        let second = registry.resolve_type::<Counted>().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(DESCRIBE_CALLS.load(Ordering::SeqCst) - before, 1);
        assert!(registry.is_validated("Counted"));
    }

    #[test]
    fn test_resolve_rejects_misnamed_descriptor() {
        let registry = TypeRegistry::new();
        assert!(matches!(
            registry.resolve_type::<Misnamed>(),
            Err(RegistryError::InvalidDescriptor { .. })
        ));
    }

    #[test]
    fn test_clone_shares_storage() {
        let registry = TypeRegistry::new();
        let clone = registry.clone();
        registry.register(TypeDescriptor::new("Pair")).unwrap();

        assert!(clone.get("Pair").is_some());
    }
}
