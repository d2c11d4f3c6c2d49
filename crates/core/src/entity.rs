//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Reference data (companies, materials, reports) is addressed by identity;
/// replacing the whole document keeps the identity stable.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
