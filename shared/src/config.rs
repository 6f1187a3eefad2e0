use std::default::Default;

/// Ratio at or above which a struct is re-sent whole instead of as a bitmap diff
pub const DEFAULT_STRUCT_REWRITE_THRESHOLD: f32 = 0.9;
/// Ratio at or above which an array is re-sent whole instead of element by element
pub const DEFAULT_ARRAY_REPLACE_THRESHOLD: f32 = 0.9;

/// Contains Config properties which govern how partial frames are encoded.
///
/// Only the encoder consults these values; every decision is written into the
/// frame as a mode byte, so two peers with different configs still agree on
/// what a frame means.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SyncConfig {
    /// Dirtiness ratio of a struct at which the bitmap diff is abandoned in
    /// favour of a full rewrite of that struct
    pub struct_rewrite_threshold: f32,
    /// Dirtiness ratio of an array/list at which its element diff is
    /// abandoned in favour of re-sending the whole collection
    pub array_replace_threshold: f32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            struct_rewrite_threshold: DEFAULT_STRUCT_REWRITE_THRESHOLD,
            array_replace_threshold: DEFAULT_ARRAY_REPLACE_THRESHOLD,
        }
    }
}
