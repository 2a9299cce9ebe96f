//! Static nullability of a slot.
//!
//! Nullability is declared once per slot in its descriptor, so inspecting it is a
//! pure function of the declaration, independent of any payload value.

/// How a slot treats the absence of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Nullability {
    /// The slot may hold null (an `Option` field).
    Nullable,
    /// The slot holds a value once constructed (a plain field).
    #[default]
    NonNull,
    /// A non-null slot with no default that stays unset until first assignment.
    /// Unset is a distinct state from an explicit null.
    Lateinit,
}

impl Nullability {
    /// Returns true if the slot carries a not-null obligation without any explicit
    /// `NotNull` constraint.
    pub fn is_implicitly_non_null(self) -> bool {
        matches!(self, Nullability::NonNull | Nullability::Lateinit)
    }

    /// Returns true only for the uninitialized-until-assigned storage idiom.
    pub fn is_lateinit_like(self) -> bool {
        matches!(self, Nullability::Lateinit)
    }
}
