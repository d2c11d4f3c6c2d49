//! Value object trait: equality by value, not identity.
//!
//! Value objects have **no identity**; two value objects with the same values
//! are equal. Allocations and locations are value objects: an allocation is
//! fully described by its location and its counters.

/// Marker trait for value objects.
///
/// ## Value Object vs Entity
///
/// - **Value Object**: no identity (`Location { name: "KP Rw" }` equals any
///   other location with the same name)
/// - **Entity**: has identity (a `Company` keeps its id when renamed)
///
/// Value objects should be treated as immutable: to "modify" one, build a new
/// value. Aggregates swap whole value objects in and out of their state.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq)]
/// struct Location {
///     name: String,
/// }
///
/// impl ValueObject for Location {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
