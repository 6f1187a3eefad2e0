use thiserror::Error;

use crate::{
    codec::error::CodecError, mutation::error::MutationError, schema::error::SchemaError,
    types::ContainerId,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    /// Changes were requested from a container with nothing dirty
    #[error("Container {id} has no changes to sync")]
    NothingToSync { id: ContainerId },

    /// A dirty element bit points past the end of its collection
    #[error("Dirty bit at {path} has no matching element")]
    StaleChange { path: String },

    #[error("Container holds {expected}, cannot take a {found}")]
    WrongType {
        expected: &'static str,
        found: &'static str,
    },

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Mutation(#[from] MutationError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ManagerError {
    #[error("Container {id} not found")]
    ContainerNotFound { id: ContainerId },

    #[error("Container {id} already exists")]
    ContainerAlreadyExists { id: ContainerId },

    /// The operation belongs to the other side of the connection
    #[error("{operation} is not available on a {host} host")]
    WrongHost {
        operation: &'static str,
        host: &'static str,
    },

    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Codec(#[from] CodecError),
}
