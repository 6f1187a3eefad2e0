use crate::schema::{type_schema::TypeSchema, value::StructValue};

use super::{dirty_struct::DirtyStruct, DirtyCollection};

/// Root of the dirty-tracking tree of one state container
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirtyFlags {
    root: DirtyStruct,
    is_dirty: bool,
}

impl DirtyFlags {
    pub fn new(schema: &TypeSchema, value: &StructValue) -> Self {
        Self {
            root: DirtyStruct::new(schema, value),
            is_dirty: false,
        }
    }

    /// Whether anything changed since the last flush
    pub fn is_dirty(&self) -> bool {
        self.is_dirty
    }

    pub fn set_dirty(&mut self) {
        self.is_dirty = true;
    }

    pub fn root(&self) -> &DirtyStruct {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut DirtyStruct {
        &mut self.root
    }

    /// Unions `other` into this tree, keeping changes from both
    pub fn merge(&mut self, other: &DirtyFlags) {
        self.root.merge(&other.root);
        self.is_dirty |= other.is_dirty;
    }

    /// Clears everything and resizes nested trackers to `value`
    pub fn reinit(&mut self, schema: &TypeSchema, value: &StructValue) {
        self.apply_changes();
        self.root.init(schema, value);
    }
}

impl DirtyCollection for DirtyFlags {
    fn apply_changes(&mut self) {
        self.root.apply_changes();
        self.is_dirty = false;
    }

    fn reject_changes(&mut self) {
        self.root.reject_changes();
        self.is_dirty = false;
    }

    fn dirtiness_ratio(&self) -> f32 {
        self.root.dirtiness_ratio()
    }
}
