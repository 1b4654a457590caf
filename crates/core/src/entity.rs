//! Entity trait: catalog records addressed by a stable identifier.

/// Entity marker + minimal interface.
///
/// Products and categories are entities: two rows with the same id are the
/// same record even if their attributes differ between reads.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + Ord + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> Self::Id;
}
