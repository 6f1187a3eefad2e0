use deltasync_serde::{ByteReader, ByteWrite, ByteWriter, Serde};

use crate::schema::{
    decl::{ElementKind, FieldType},
    leaf::LeafValue,
    type_schema::TypeSchema,
    value::{StructValue, Value},
};

use super::{error::CodecError, Codec};

const NULL_LENGTH: i32 = -1;

impl<'r> Codec<'r> {
    /// Writes a full frame: the type id, then every synchronized field
    pub fn serialize(
        &self,
        value: &StructValue,
        writer: &mut dyn ByteWrite,
    ) -> Result<(), CodecError> {
        let schema = self.registry.schema_for(value.type_name())?;
        schema.type_id().ser(writer);
        self.write_struct(&schema, value, writer)
    }

    /// Reads a full frame into a fresh value of whichever type its id names.
    /// Unsynchronized fields come back at their defaults.
    pub fn deserialize(&self, reader: &mut ByteReader) -> Result<StructValue, CodecError> {
        let id = u8::de(reader)?;
        let type_name = self
            .registry
            .type_name_for_id(id)?
            .ok_or(CodecError::UnknownTypeId { id })?;
        let schema = self.registry.schema_for(type_name)?;
        let mut value = self.registry.default_value(type_name)?;
        self.read_struct_into(&schema, &mut value, reader)?;
        Ok(value)
    }

    pub fn to_full_frame(&self, value: &StructValue) -> Result<Vec<u8>, CodecError> {
        let mut writer = ByteWriter::new();
        self.serialize(value, &mut writer)?;
        Ok(writer.to_bytes())
    }

    /// Decodes a complete full frame, rejecting trailing bytes
    pub fn from_full_frame(&self, bytes: &[u8]) -> Result<StructValue, CodecError> {
        let mut reader = ByteReader::new(bytes);
        let value = self.deserialize(&mut reader)?;
        if !reader.is_empty() {
            return Err(CodecError::TrailingBytes {
                remaining: reader.remaining(),
            });
        }
        Ok(value)
    }

    /// Size of the full frame for `value`, without building it
    pub fn full_frame_len(&self, value: &StructValue) -> Result<usize, CodecError> {
        let mut counter = ByteWriter::counter();
        self.serialize(value, &mut counter)?;
        Ok(counter.bytes_needed())
    }

    // Writing

    pub(crate) fn write_struct(
        &self,
        schema: &TypeSchema,
        value: &StructValue,
        writer: &mut dyn ByteWrite,
    ) -> Result<(), CodecError> {
        if value.type_name() != schema.type_name() {
            return Err(CodecError::ValueMismatch {
                field: schema.type_name(),
                expected: schema.type_name(),
                found: value.type_name(),
            });
        }
        for field in schema.fields() {
            let field_value = value.field(field.slot).ok_or(CodecError::ValueMismatch {
                field: field.name,
                expected: field.ty.name(),
                found: "nothing",
            })?;
            self.write_field(field.name, &field.ty, field_value, writer)?;
        }
        Ok(())
    }

    pub(crate) fn write_field(
        &self,
        field: &'static str,
        ty: &FieldType,
        value: &Value,
        writer: &mut dyn ByteWrite,
    ) -> Result<(), CodecError> {
        match (ty, value) {
            (FieldType::Leaf(kind), Value::Leaf(leaf)) if leaf.kind() == *kind => {
                leaf.ser(writer);
                Ok(())
            }
            (FieldType::Struct(type_name), Value::Struct(inner)) => {
                let schema = self.registry.schema_for(type_name)?;
                self.write_struct(&schema, inner, writer)
            }
            (FieldType::Array(element), Value::Array(items)) => {
                self.write_collection(field, element, items.as_deref(), writer)
            }
            (FieldType::List(element), Value::List(items)) => {
                self.write_collection(field, element, Some(items.as_slice()), writer)
            }
            _ => Err(CodecError::ValueMismatch {
                field,
                expected: ty.name(),
                found: value.kind_name(),
            }),
        }
    }

    fn write_collection(
        &self,
        field: &'static str,
        element: &ElementKind,
        items: Option<&[Value]>,
        writer: &mut dyn ByteWrite,
    ) -> Result<(), CodecError> {
        let Some(items) = items else {
            NULL_LENGTH.ser(writer);
            return Ok(());
        };
        let length = i32::try_from(items.len()).map_err(|_| CodecError::LengthOverflow {
            field,
            length: items.len(),
        })?;
        length.ser(writer);
        for item in items {
            self.write_element(field, element, item, writer)?;
        }
        Ok(())
    }

    pub(crate) fn write_element(
        &self,
        field: &'static str,
        element: &ElementKind,
        value: &Value,
        writer: &mut dyn ByteWrite,
    ) -> Result<(), CodecError> {
        match element {
            ElementKind::Leaf(kind) => {
                self.write_field(field, &FieldType::Leaf(*kind), value, writer)
            }
            ElementKind::Struct(type_name) => {
                self.write_field(field, &FieldType::Struct(*type_name), value, writer)
            }
        }
    }

    // Reading

    pub(crate) fn read_struct_into(
        &self,
        schema: &TypeSchema,
        value: &mut StructValue,
        reader: &mut ByteReader,
    ) -> Result<(), CodecError> {
        for field in schema.fields() {
            let field_value = self.read_field(field.name, &field.ty, reader)?;
            value
                .set_field(field.slot, field_value)
                .map_err(|_| CodecError::ValueMismatch {
                    field: field.name,
                    expected: field.ty.name(),
                    found: "nothing",
                })?;
        }
        Ok(())
    }

    pub(crate) fn read_field(
        &self,
        field: &'static str,
        ty: &FieldType,
        reader: &mut ByteReader,
    ) -> Result<Value, CodecError> {
        match ty {
            FieldType::Leaf(kind) => Ok(Value::Leaf(LeafValue::de(*kind, reader)?)),
            FieldType::Struct(type_name) => {
                let schema = self.registry.schema_for(type_name)?;
                let mut inner = self.registry.default_value(type_name)?;
                self.read_struct_into(&schema, &mut inner, reader)?;
                Ok(Value::Struct(inner))
            }
            FieldType::Array(element) => {
                let length = i32::de(reader)?;
                if length == NULL_LENGTH {
                    return Ok(Value::Array(None));
                }
                Ok(Value::Array(Some(
                    self.read_elements(field, element, length, reader)?,
                )))
            }
            FieldType::List(element) => {
                let length = i32::de(reader)?;
                Ok(Value::List(self.read_elements(field, element, length, reader)?))
            }
        }
    }

    fn read_elements(
        &self,
        field: &'static str,
        element: &ElementKind,
        length: i32,
        reader: &mut ByteReader,
    ) -> Result<Vec<Value>, CodecError> {
        let length = usize::try_from(length)
            .map_err(|_| CodecError::NegativeLength { field, length })?;
        // never trust the prefix for the allocation size
        let mut items = Vec::with_capacity(length.min(reader.remaining()));
        for _ in 0..length {
            items.push(self.read_element(field, element, reader)?);
        }
        Ok(items)
    }

    pub(crate) fn read_element(
        &self,
        field: &'static str,
        element: &ElementKind,
        reader: &mut ByteReader,
    ) -> Result<Value, CodecError> {
        match element {
            ElementKind::Leaf(kind) => self.read_field(field, &FieldType::Leaf(*kind), reader),
            ElementKind::Struct(type_name) => {
                self.read_field(field, &FieldType::Struct(*type_name), reader)
            }
        }
    }
}
