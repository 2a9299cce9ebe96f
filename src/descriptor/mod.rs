//! Static type descriptors.
//!
//! Each deserializable type declares a [`TypeDescriptor`]: its optional creator
//! and parameters, its settable properties, per-slot constraints and nullability,
//! and whole-object constraints. Types implement [`Describe`] to hand their table
//! to the registry.
//!
//! # Example
//!
//! ```rust
//! use intake::{Constraint, Creator, CreatorParameter, Describe, SlotType, TypeDescriptor};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Pair {
//!     left: String,
//!     right: i64,
//! }
//!
//! impl Describe for Pair {
//!     const NAME: &'static str = "Pair";
//!
//!     fn describe() -> TypeDescriptor {
//!         TypeDescriptor::validated(Self::NAME).creator(
//!             Creator::constructor()
//!                 .param(CreatorParameter::new("left", SlotType::String).constraint(Constraint::not_blank()))
//!                 .param(CreatorParameter::new("right", SlotType::Integer)),
//!         )
//!     }
//! }
//! ```

mod creator;
mod nullability;
mod property;
mod slot;
mod type_descriptor;

pub use creator::{Creator, CreatorArgs, CreatorError, CreatorKind, CreatorParameter};
pub use nullability::Nullability;
pub use property::PropertyDescriptor;
pub use slot::{Coercion, SlotSpec, SlotType, TypeRef};
pub use type_descriptor::TypeDescriptor;

/// Declares the descriptor of a type.
pub trait Describe {
    /// The registry key of the type.
    const NAME: &'static str;

    /// Builds the type's descriptor. Called at most once per registry.
    fn describe() -> TypeDescriptor;
}
