//! # Deltasync Shared
//! Dirty tracking, schema registry, delta codec and path mutation for
//! replicating structured state from a server to its clients.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

pub use deltasync_serde::{
    ByteCounter, ByteReader, ByteWrite, ByteWriter, ConstByteLength, Serde, SerdeErr,
};

mod codec;
mod config;
mod container;
mod dirty;
mod mutation;
mod schema;
mod types;

pub use codec::{error::CodecError, ArrayDiffMode, Codec, StructDiffMode};
pub use config::{SyncConfig, DEFAULT_ARRAY_REPLACE_THRESHOLD, DEFAULT_STRUCT_REWRITE_THRESHOLD};
pub use container::{
    error::{ManagerError, StateError},
    ChangeObserver, ChangeRecord, ContainerManager, DestroyObserver, FrameKind, OutboundFrame,
    StateContainer, TickOutput,
};
pub use dirty::{
    diff_mask::DiffMask, dirty_array::DirtyArray, dirty_flags::DirtyFlags,
    dirty_struct::DirtyStruct, error::DiffMaskError, DirtyCollection,
};
pub use mutation::{error::MutationError, FieldPath, PathMutator};
pub use schema::{
    decl::{ElementKind, FieldDecl, FieldType, SyncAttr, TypeDecl},
    error::{SchemaError, ValueError},
    leaf::{Color, LeafKind, LeafValue, Vec2, Vec2Int, Vec3},
    registry::SchemaRegistry,
    sync_type::SyncType,
    type_schema::{FieldCategory, FieldDescriptor, TypeSchema},
    value::{StructValue, Value},
};
pub use types::{ContainerId, HostType, SyncTypeId};
