//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Stores key their records by `Entity::id`, so the identifier must be cheap to clone
/// and usable as a map key.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
