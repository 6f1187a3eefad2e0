pub mod diff_mask;
pub mod dirty_array;
pub mod dirty_flags;
pub mod dirty_struct;
pub mod error;

/// Shared surface of every level of the dirty-tracking tree
pub trait DirtyCollection {
    /// Clears every bit after the outbound frame for this tick was produced
    fn apply_changes(&mut self);

    /// Clears every bit when unsent local changes are being discarded
    fn reject_changes(&mut self);

    /// Fraction of tracked bits currently set, in `[0, 1]`
    fn dirtiness_ratio(&self) -> f32;
}
