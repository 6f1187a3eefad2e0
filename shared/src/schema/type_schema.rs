use std::collections::HashMap;

use super::{
    decl::{ElementKind, FieldType, TypeDecl},
    error::SchemaError,
};

/// How a synchronized field is tracked and encoded
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldCategory {
    /// Tracked by a single bit, always sent whole
    Scalar,
    /// Partial-capable nullable array
    Array,
    /// Partial-capable list
    List,
}

/// One synchronized field of a schema
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Wire name, also the path segment addressing the field
    pub name: &'static str,
    /// Dense position among synchronized fields; the dirty bit and wire order
    pub index: usize,
    /// Position among all declared fields; where the value lives in a `StructValue`
    pub slot: usize,
    pub category: FieldCategory,
    pub ty: FieldType,
    pub array_index: Option<usize>,
    pub list_index: Option<usize>,
}

impl FieldDescriptor {
    pub fn is_partial(&self) -> bool {
        self.category != FieldCategory::Scalar
    }

    pub fn element_kind(&self) -> Option<&ElementKind> {
        self.ty.element_kind()
    }
}

/// Ordered description of which fields of a type participate in replication.
/// Built once per type and immutable afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeSchema {
    type_name: &'static str,
    type_id: u8,
    slot_count: usize,
    fields: Vec<FieldDescriptor>,
    name_index: HashMap<&'static str, usize>,
    array_count: usize,
    list_count: usize,
}

impl TypeSchema {
    pub fn build(decl: &TypeDecl) -> Result<Self, SchemaError> {
        let Some(type_id) = decl.sync_id else {
            return Err(SchemaError::NotSyncType {
                type_name: decl.name,
            });
        };

        let mut fields = Vec::new();
        let mut name_index = HashMap::new();
        let mut array_count = 0;
        let mut list_count = 0;

        for (slot, field_decl) in decl.fields.iter().enumerate() {
            let Some(sync) = field_decl.sync else {
                continue;
            };

            let mut category = FieldCategory::Scalar;
            let mut array_index = None;
            let mut list_index = None;

            if sync.partial {
                match field_decl.ty {
                    FieldType::Array(_) => {
                        category = FieldCategory::Array;
                        array_index = Some(array_count);
                        array_count += 1;
                    }
                    FieldType::List(_) => {
                        category = FieldCategory::List;
                        list_index = Some(list_count);
                        list_count += 1;
                    }
                    FieldType::Leaf(_) | FieldType::Struct(_) => {
                        return Err(SchemaError::InvalidPartialField {
                            type_name: decl.name,
                            field_name: field_decl.name,
                        });
                    }
                }
            }

            let index = fields.len();
            if name_index.insert(sync.name, index).is_some() {
                return Err(SchemaError::DuplicateFieldName {
                    type_name: decl.name,
                    field_name: sync.name,
                });
            }

            fields.push(FieldDescriptor {
                name: sync.name,
                index,
                slot,
                category,
                ty: field_decl.ty,
                array_index,
                list_index,
            });
        }

        Ok(Self {
            type_name: decl.name,
            type_id,
            slot_count: decl.fields.len(),
            fields,
            name_index,
            array_count,
            list_count,
        })
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn type_id(&self) -> u8 {
        self.type_id
    }

    /// Number of declared fields, synchronized or not
    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn array_count(&self) -> usize {
        self.array_count
    }

    pub fn list_count(&self) -> usize {
        self.list_count
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, index: usize) -> Option<&FieldDescriptor> {
        self.fields.get(index)
    }

    pub fn field_by_name(&self, name: &str) -> Option<&FieldDescriptor> {
        self.name_index
            .get(name)
            .and_then(|index| self.fields.get(*index))
    }
}
