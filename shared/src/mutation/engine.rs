use log::debug;

use crate::{
    dirty::{dirty_array::DirtyArray, dirty_flags::DirtyFlags, dirty_struct::DirtyStruct},
    schema::{
        decl::{ElementKind, FieldType},
        error::SchemaError,
        registry::SchemaRegistry,
        type_schema::{FieldDescriptor, TypeSchema},
        value::{StructValue, Value},
    },
};

use super::{error::MutationError, path::FieldPath};

/// Resolves paths against values of registered types
pub struct PathMutator<'r> {
    registry: &'r SchemaRegistry,
}

impl<'r> PathMutator<'r> {
    pub fn new(registry: &'r SchemaRegistry) -> Self {
        Self { registry }
    }

    /// Writes `value` at `path` inside `root`. Returns whether anything
    /// changed: writing a value equal to the current one is a no-op and
    /// leaves every dirty bit untouched.
    ///
    /// - `Size` replaces a scalar field
    /// - `Color` replaces a whole collection and marks it fully replaced
    /// - `Color/3` writes one element and marks its element bit
    /// - `Inner/X` writes inside a nested struct, which is then sent whole
    pub fn apply_path(
        &self,
        root: &mut StructValue,
        dirty: &mut DirtyFlags,
        path: &str,
        value: Value,
    ) -> Result<bool, MutationError> {
        let path = FieldPath::parse(path)?;
        let schema = self.registry.schema_for(root.type_name())?;

        let changed =
            self.apply_to_struct(&schema, root, Some(dirty.root_mut()), path.segments(), value)?;
        if changed {
            dirty.set_dirty();
            debug!("PathMutator: {} changed at {}", root.type_name(), path);
        }
        Ok(changed)
    }

    fn apply_to_struct(
        &self,
        schema: &TypeSchema,
        target: &mut StructValue,
        mut dirty: Option<&mut DirtyStruct>,
        segments: &[&str],
        value: Value,
    ) -> Result<bool, MutationError> {
        let Some((segment, rest)) = segments.split_first() else {
            return Err(MutationError::EmptyPath);
        };
        let field = schema
            .field_by_name(segment)
            .ok_or_else(|| MutationError::UnknownField {
                field: segment.to_string(),
                type_name: schema.type_name(),
            })?;
        let current = target
            .field_mut(field.slot)
            .ok_or_else(|| MutationError::TypeMismatch {
                field: field.name.to_string(),
                expected: field.ty.name(),
                found: "nothing",
            })?;

        let changed = if rest.is_empty() {
            self.replace_field(field, current, dirty.as_deref_mut(), value)?
        } else {
            match &field.ty {
                FieldType::Leaf(_) => {
                    return Err(MutationError::TrailingSegments {
                        field: field.name.to_string(),
                    })
                }
                FieldType::Struct(type_name) => {
                    let nested_schema = self.registry.schema_for(type_name)?;
                    match current {
                        // nested structs are scalar fields: the owning bit covers them
                        Value::Struct(nested) => {
                            self.apply_to_struct(&nested_schema, nested, None, rest, value)?
                        }
                        other => {
                            return Err(MutationError::TypeMismatch {
                                field: field.name.to_string(),
                                expected: field.ty.name(),
                                found: other.kind_name(),
                            })
                        }
                    }
                }
                FieldType::Array(element) | FieldType::List(element) => {
                    let tracker = match dirty.as_deref_mut() {
                        Some(dirty) if field.is_partial() => dirty.partial_mut(field),
                        _ => None,
                    };
                    self.apply_to_elements(field, element, current, tracker, rest, value)?
                }
            }
        };

        if changed {
            if let Some(dirty) = dirty {
                dirty.set_dirty(field.index);
            }
        }
        Ok(changed)
    }

    /// Last segment names the field itself: replace it wholesale
    fn replace_field(
        &self,
        field: &FieldDescriptor,
        current: &mut Value,
        dirty: Option<&mut DirtyStruct>,
        value: Value,
    ) -> Result<bool, MutationError> {
        self.check_value(field.name, &field.ty, &value)?;
        if *current == value {
            return Ok(false);
        }

        if let Some(tracker) = dirty.and_then(|dirty| dirty.partial_mut(field)) {
            tracker.init(value.element_count());
            tracker.mark_full();
        }
        *current = value;
        Ok(true)
    }

    /// Checks a whole value against its declaration, nested structs included
    pub fn validate(&self, value: &StructValue) -> Result<(), MutationError> {
        self.check_struct(value.type_name(), value.type_name(), value)
    }

    /// Checks `value` against `ty` all the way down: nested structs must
    /// carry every declared field, each of the declared kind
    fn check_value(&self, path: &str, ty: &FieldType, value: &Value) -> Result<(), MutationError> {
        if !value.conforms_to(ty) {
            return Err(MutationError::TypeMismatch {
                field: path.to_string(),
                expected: ty.name(),
                found: value.kind_name(),
            });
        }
        match (ty, value) {
            (FieldType::Struct(type_name), Value::Struct(inner)) => {
                self.check_struct(path, type_name, inner)
            }
            (FieldType::Array(ElementKind::Struct(type_name)), _)
            | (FieldType::List(ElementKind::Struct(type_name)), _) => {
                for (index, item) in value.elements().unwrap_or_default().iter().enumerate() {
                    if let Value::Struct(inner) = item {
                        self.check_struct(&format!("{}/{}", path, index), type_name, inner)?;
                    }
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn check_struct(
        &self,
        path: &str,
        type_name: &str,
        value: &StructValue,
    ) -> Result<(), MutationError> {
        let decl = self
            .registry
            .decl(type_name)
            .ok_or_else(|| SchemaError::UnknownType {
                type_name: type_name.to_string(),
            })?;
        if value.fields().len() != decl.fields.len() {
            return Err(MutationError::TypeMismatch {
                field: path.to_string(),
                expected: decl.name,
                found: "incomplete struct",
            });
        }
        for (field, slot) in decl.fields.iter().zip(value.fields()) {
            self.check_value(&format!("{}/{}", path, field.name), &field.ty, slot)?;
        }
        Ok(())
    }

    fn apply_to_elements(
        &self,
        field: &FieldDescriptor,
        element: &ElementKind,
        current: &mut Value,
        tracker: Option<&mut DirtyArray>,
        segments: &[&str],
        value: Value,
    ) -> Result<bool, MutationError> {
        if let ElementKind::Struct(_) = element {
            return Err(MutationError::Unsupported {
                field: field.name.to_string(),
            });
        }
        let Some((segment, rest)) = segments.split_first() else {
            return Err(MutationError::EmptyPath);
        };
        if !rest.is_empty() {
            return Err(MutationError::TrailingSegments {
                field: format!("{}/{}", field.name, segment),
            });
        }

        let index: i64 = segment
            .parse()
            .map_err(|_| MutationError::InvalidPathSegment {
                segment: segment.to_string(),
            })?;
        let len = current.element_count();
        let position = usize::try_from(index)
            .ok()
            .filter(|position| *position < len)
            .ok_or(MutationError::IndexOutOfBounds { index, len })?;

        if !value.conforms_to_element(element) {
            return Err(MutationError::TypeMismatch {
                field: format!("{}/{}", field.name, segment),
                expected: element.name(),
                found: value.kind_name(),
            });
        }

        let Some(items) = current.elements_mut() else {
            return Err(MutationError::IndexOutOfBounds { index, len });
        };
        if items[position] == value {
            return Ok(false);
        }

        if let Some(tracker) = tracker {
            tracker.try_set_dirty(position)?;
        }
        items[position] = value;
        Ok(true)
    }
}
