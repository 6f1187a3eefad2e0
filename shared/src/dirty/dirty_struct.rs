use crate::schema::{
    type_schema::{FieldCategory, FieldDescriptor, TypeSchema},
    value::StructValue,
};

use super::{diff_mask::DiffMask, dirty_array::DirtyArray, DirtyCollection};

/// Dirty state of one struct: a bit per synchronized field, plus a nested
/// `DirtyArray` for every partial-capable field.
///
/// Invariant: a nested tracker only holds set bits while its field bit is set.
/// Callers marking an element must also mark the owning field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirtyStruct {
    fields: DiffMask,
    arrays: Vec<DirtyArray>,
    lists: Vec<DirtyArray>,
    all_dirty: bool,
}

impl DirtyStruct {
    pub fn new(schema: &TypeSchema, value: &StructValue) -> Self {
        let mut output = Self {
            fields: DiffMask::new(schema.field_count()),
            arrays: (0..schema.array_count()).map(|_| DirtyArray::new(0)).collect(),
            lists: (0..schema.list_count()).map(|_| DirtyArray::new(0)).collect(),
            all_dirty: false,
        };
        output.init(schema, value);
        output
    }

    /// Sizes every nested tracker to the current length of its collection
    pub fn init(&mut self, schema: &TypeSchema, value: &StructValue) {
        for field in schema.fields().iter().filter(|field| field.is_partial()) {
            let length = value
                .field(field.slot)
                .map_or(0, |field_value| field_value.element_count());
            if let Some(partial) = self.partial_mut(field) {
                partial.init(length);
            }
        }
    }

    pub fn set_dirty(&mut self, field_index: usize) {
        self.fields.set_bit(field_index, true);
    }

    pub fn is_field_dirty(&self, field_index: usize) -> bool {
        self.fields.bit(field_index).unwrap_or(false)
    }

    pub fn fields(&self) -> &DiffMask {
        &self.fields
    }

    pub fn field_count(&self) -> usize {
        self.fields.bit_count()
    }

    pub fn array(&self, array_index: usize) -> Option<&DirtyArray> {
        self.arrays.get(array_index)
    }

    pub fn list(&self, list_index: usize) -> Option<&DirtyArray> {
        self.lists.get(list_index)
    }

    /// Nested tracker of a partial-capable field
    pub fn partial(&self, field: &FieldDescriptor) -> Option<&DirtyArray> {
        match field.category {
            FieldCategory::Array => field.array_index.and_then(|index| self.arrays.get(index)),
            FieldCategory::List => field.list_index.and_then(|index| self.lists.get(index)),
            FieldCategory::Scalar => None,
        }
    }

    pub fn partial_mut(&mut self, field: &FieldDescriptor) -> Option<&mut DirtyArray> {
        match field.category {
            FieldCategory::Array => field
                .array_index
                .and_then(|index| self.arrays.get_mut(index)),
            FieldCategory::List => field.list_index.and_then(|index| self.lists.get_mut(index)),
            FieldCategory::Scalar => None,
        }
    }

    /// Marks the whole struct as rewritten: every field bit set, every nested
    /// collection fully replaced. Used when a full rewrite is decoded.
    pub fn set_dirty_all(&mut self) {
        self.all_dirty = true;
        self.fields.set_all();
        for partial in self.arrays.iter_mut().chain(self.lists.iter_mut()) {
            partial.mark_full();
        }
    }

    pub fn is_all_dirty(&self) -> bool {
        self.all_dirty
    }

    pub fn is_clear(&self) -> bool {
        self.fields.is_clear()
    }

    /// Unions `other` into this tree. Both must track the same type.
    pub fn merge(&mut self, other: &DirtyStruct) {
        self.all_dirty |= other.all_dirty;
        self.fields.or(&other.fields);
        let arrays = self.arrays.iter_mut().zip(&other.arrays);
        let lists = self.lists.iter_mut().zip(&other.lists);
        for (partial, other_partial) in arrays.chain(lists) {
            partial.merge(other_partial);
        }
    }

    fn clear(&mut self) {
        self.all_dirty = false;
        self.fields.clear();
    }
}

impl DirtyCollection for DirtyStruct {
    fn apply_changes(&mut self) {
        self.clear();
        for partial in self.arrays.iter_mut().chain(self.lists.iter_mut()) {
            partial.apply_changes();
        }
    }

    fn reject_changes(&mut self) {
        self.clear();
        for partial in self.arrays.iter_mut().chain(self.lists.iter_mut()) {
            partial.reject_changes();
        }
    }

    fn dirtiness_ratio(&self) -> f32 {
        if self.all_dirty {
            return 1.0;
        }
        self.fields.ratio()
    }
}
