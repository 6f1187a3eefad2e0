use thiserror::Error;

/// Errors raised while declaring types or building their schemas.
///
/// These describe a broken protocol definition; they should surface at startup
/// (see `SchemaRegistry::try_lock`) rather than be handled per call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// The type was declared without a sync type id
    #[error("{type_name} is not a sync type. Declare it with `TypeDecl::sync_type(id)` before building its schema")]
    NotSyncType { type_name: &'static str },

    /// A field marked partial is neither an array nor a list
    #[error("Field {field_name} of {type_name} can't be partial, only array and list fields can")]
    InvalidPartialField {
        type_name: &'static str,
        field_name: &'static str,
    },

    /// Two sync types share the same one-byte id
    #[error("Sync type id {id} is used by both {first} and {second}")]
    DuplicateTypeId {
        id: u8,
        first: &'static str,
        second: &'static str,
    },

    /// Two synchronized fields of one type share a wire name
    #[error("Wire name {field_name} is used twice in {type_name}")]
    DuplicateFieldName {
        type_name: &'static str,
        field_name: &'static str,
    },

    /// The same type name was registered twice
    #[error("Type {type_name} is already registered")]
    DuplicateType { type_name: &'static str },

    /// Lookup of a type that was never registered
    #[error("Type {type_name} is not registered with the SchemaRegistry")]
    UnknownType { type_name: String },

    /// Registration attempted after `lock()`
    #[error("SchemaRegistry is already locked and cannot be modified")]
    RegistryLocked,

    /// A schema cache lock was poisoned by a panicking thread
    #[error("SchemaRegistry cache lock is poisoned")]
    LockPoisoned,
}

/// Errors raised when converting between dynamic values and typed Rust values
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("Expected a {expected} value, found {found}")]
    WrongKind {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Struct value of {type_name} has no field at slot {slot}")]
    MissingField { type_name: &'static str, slot: usize },

    #[error("Expected a struct value of {expected}, found {found}")]
    WrongType {
        expected: &'static str,
        found: &'static str,
    },
}
