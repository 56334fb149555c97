//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Child records owned by an aggregate (e.g. quotation lines) implement this
/// directly; aggregate roots get it via [`crate::AggregateRoot`].
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
