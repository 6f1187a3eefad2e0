use crate::schema::value::Value;

/// One observable change: the path that changed and its new value.
/// Paths use the mutation syntax, so a record can be replayed with
/// `StateContainer::apply_path`.
#[derive(Clone, Debug, PartialEq)]
pub struct ChangeRecord {
    pub path: String,
    pub value: Value,
}

impl ChangeRecord {
    pub fn new(path: impl Into<String>, value: Value) -> Self {
        Self {
            path: path.into(),
            value,
        }
    }
}
