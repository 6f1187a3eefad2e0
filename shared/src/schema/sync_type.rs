use super::{decl::TypeDecl, error::ValueError, value::StructValue};

/// A Rust type whose instances replicate through a `StructValue`.
///
/// `declaration` must list the fields in the same order `to_value` fills the
/// slots and `from_value` reads them back.
pub trait SyncType: Sized {
    fn declaration() -> TypeDecl;

    fn to_value(&self) -> StructValue;

    fn from_value(value: StructValue) -> Result<Self, ValueError>;
}
