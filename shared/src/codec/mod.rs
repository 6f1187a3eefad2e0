//! # Codec
//! Type-directed encoding of state values.
//!
//! Full frames (`[type id][fields...]`) stand alone. Partial frames
//! (`[type id][struct diff]`) are driven by a `DirtyFlags` tree and only mean
//! something to a reader holding the previous state. Reading a partial frame
//! repopulates the reader's own dirty tree with exactly what was transmitted.

mod full;
mod partial;

pub mod error;

pub use partial::{ArrayDiffMode, StructDiffMode};

use crate::{config::SyncConfig, schema::registry::SchemaRegistry};

pub struct Codec<'r> {
    registry: &'r SchemaRegistry,
    config: SyncConfig,
}

impl<'r> Codec<'r> {
    pub fn new(registry: &'r SchemaRegistry) -> Self {
        Self::with_config(registry, SyncConfig::default())
    }

    pub fn with_config(registry: &'r SchemaRegistry, config: SyncConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &'r SchemaRegistry {
        self.registry
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }
}
