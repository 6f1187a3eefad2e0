use log::debug;

use deltasync_serde::{ByteReader, ByteWrite, ByteWriter, Serde};

use crate::{
    dirty::{
        diff_mask::DiffMask, dirty_array::DirtyArray, dirty_flags::DirtyFlags,
        dirty_struct::DirtyStruct, DirtyCollection,
    },
    schema::{
        type_schema::{FieldDescriptor, TypeSchema},
        value::{StructValue, Value},
    },
};

use super::{error::CodecError, Codec};

/// How a struct diff encodes its fields
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum StructDiffMode {
    /// Every synchronized field follows, as in a full frame
    FullRewrite = 0,
    /// A field bitmap follows, then only the fields it marks
    BitmapDiff = 1,
}

/// How an array diff encodes a partial-capable collection
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum ArrayDiffMode {
    /// An element bitmap sized to the receiver's length, then the marked elements
    ElementDiff = 0,
    /// The whole collection follows with its length prefix
    FullyReplaced = 1,
}

impl StructDiffMode {
    fn de(reader: &mut ByteReader) -> Result<Self, CodecError> {
        match u8::de(reader)? {
            0 => Ok(Self::FullRewrite),
            1 => Ok(Self::BitmapDiff),
            byte => Err(CodecError::InvalidMode {
                context: "struct diff",
                byte,
            }),
        }
    }
}

impl ArrayDiffMode {
    fn de(reader: &mut ByteReader) -> Result<Self, CodecError> {
        match u8::de(reader)? {
            0 => Ok(Self::ElementDiff),
            1 => Ok(Self::FullyReplaced),
            byte => Err(CodecError::InvalidMode {
                context: "array diff",
                byte,
            }),
        }
    }
}

impl<'r> Codec<'r> {
    /// Writes a partial frame describing what `dirty` marks in `value`
    pub fn partial_serialize(
        &self,
        value: &StructValue,
        dirty: &DirtyFlags,
        writer: &mut dyn ByteWrite,
    ) -> Result<(), CodecError> {
        let schema = self.registry.schema_for(value.type_name())?;
        schema.type_id().ser(writer);
        self.write_struct_diff(&schema, value, dirty.root(), writer)
    }

    /// Applies a partial frame to `value` in place and records in `dirty`
    /// exactly what the frame carried. Callers normally clear `dirty` first.
    ///
    /// On error `value` and `dirty` may be half updated; `apply_partial_frame`
    /// is the all-or-nothing variant.
    pub fn partial_deserialize(
        &self,
        value: &mut StructValue,
        dirty: &mut DirtyFlags,
        reader: &mut ByteReader,
    ) -> Result<(), CodecError> {
        let schema = self.registry.schema_for(value.type_name())?;
        let found = u8::de(reader)?;
        if found != schema.type_id() {
            return Err(CodecError::TypeIdMismatch {
                expected: schema.type_id(),
                found,
            });
        }
        self.read_struct_diff(&schema, value, dirty.root_mut(), reader)?;
        dirty.set_dirty();
        Ok(())
    }

    pub fn to_partial_frame(
        &self,
        value: &StructValue,
        dirty: &DirtyFlags,
    ) -> Result<Vec<u8>, CodecError> {
        let mut writer = ByteWriter::new();
        self.partial_serialize(value, dirty, &mut writer)?;
        Ok(writer.to_bytes())
    }

    pub fn partial_frame_len(
        &self,
        value: &StructValue,
        dirty: &DirtyFlags,
    ) -> Result<usize, CodecError> {
        let mut counter = ByteWriter::counter();
        self.partial_serialize(value, dirty, &mut counter)?;
        Ok(counter.bytes_needed())
    }

    /// Decodes a complete partial frame. Nothing is modified unless the whole
    /// frame decodes without trailing bytes.
    pub fn apply_partial_frame(
        &self,
        value: &mut StructValue,
        dirty: &mut DirtyFlags,
        bytes: &[u8],
    ) -> Result<(), CodecError> {
        let mut next_value = value.clone();
        let mut next_dirty = dirty.clone();
        let mut reader = ByteReader::new(bytes);

        self.partial_deserialize(&mut next_value, &mut next_dirty, &mut reader)?;
        if !reader.is_empty() {
            return Err(CodecError::TrailingBytes {
                remaining: reader.remaining(),
            });
        }

        *value = next_value;
        *dirty = next_dirty;
        Ok(())
    }

    // Writing

    fn write_struct_diff(
        &self,
        schema: &TypeSchema,
        value: &StructValue,
        dirty: &DirtyStruct,
        writer: &mut dyn ByteWrite,
    ) -> Result<(), CodecError> {
        if dirty.field_count() != schema.field_count() {
            return Err(CodecError::DirtyShapeMismatch {
                type_name: schema.type_name(),
            });
        }

        let ratio = dirty.dirtiness_ratio();
        if ratio >= self.config.struct_rewrite_threshold {
            debug!(
                "Codec: {} is {:.2} dirty, writing full rewrite",
                schema.type_name(),
                ratio
            );
            (StructDiffMode::FullRewrite as u8).ser(writer);
            return self.write_struct(schema, value, writer);
        }

        (StructDiffMode::BitmapDiff as u8).ser(writer);
        writer.write_bytes(dirty.fields().to_bytes());

        for index in dirty.fields().ones() {
            let field = schema
                .field(index)
                .ok_or(CodecError::DirtyShapeMismatch {
                    type_name: schema.type_name(),
                })?;
            let field_value = value.field(field.slot).ok_or(CodecError::ValueMismatch {
                field: field.name,
                expected: field.ty.name(),
                found: "nothing",
            })?;

            if field.is_partial() {
                let tracker = dirty
                    .partial(field)
                    .ok_or(CodecError::DirtyShapeMismatch {
                        type_name: schema.type_name(),
                    })?;
                self.write_array_diff(field, field_value, tracker, writer)?;
            } else {
                self.write_field(field.name, &field.ty, field_value, writer)?;
            }
        }
        Ok(())
    }

    fn write_array_diff(
        &self,
        field: &FieldDescriptor,
        value: &Value,
        tracker: &DirtyArray,
        writer: &mut dyn ByteWrite,
    ) -> Result<(), CodecError> {
        let items = match value.elements() {
            // a tracker sized for another length cannot describe this value
            Some(items) if items.len() == tracker.len() => Some(items),
            _ => None,
        };
        let replace = tracker.is_fully_replaced()
            || tracker.dirtiness_ratio() >= self.config.array_replace_threshold;

        let (Some(items), false) = (items, replace) else {
            (ArrayDiffMode::FullyReplaced as u8).ser(writer);
            return self.write_field(field.name, &field.ty, value, writer);
        };

        let Some(element) = field.element_kind() else {
            return Err(CodecError::ValueMismatch {
                field: field.name,
                expected: field.ty.name(),
                found: value.kind_name(),
            });
        };

        (ArrayDiffMode::ElementDiff as u8).ser(writer);
        writer.write_bytes(tracker.elements().to_bytes());
        for index in tracker.elements().ones() {
            self.write_element(field.name, element, &items[index], writer)?;
        }
        Ok(())
    }

    // Reading

    fn read_struct_diff(
        &self,
        schema: &TypeSchema,
        value: &mut StructValue,
        dirty: &mut DirtyStruct,
        reader: &mut ByteReader,
    ) -> Result<(), CodecError> {
        if dirty.field_count() != schema.field_count() {
            return Err(CodecError::DirtyShapeMismatch {
                type_name: schema.type_name(),
            });
        }

        match StructDiffMode::de(reader)? {
            StructDiffMode::FullRewrite => {
                self.read_struct_into(schema, value, reader)?;
                dirty.init(schema, value);
                dirty.set_dirty_all();
            }
            StructDiffMode::BitmapDiff => {
                let field_count = schema.field_count();
                let bytes = reader.read_bytes(DiffMask::byte_count_for(field_count))?;
                let received = DiffMask::from_bytes(field_count, bytes)?;

                for index in received.ones() {
                    let Some(field) = schema.field(index) else {
                        continue;
                    };
                    if field.is_partial() {
                        let slot_value =
                            value
                                .field_mut(field.slot)
                                .ok_or(CodecError::ValueMismatch {
                                    field: field.name,
                                    expected: field.ty.name(),
                                    found: "nothing",
                                })?;
                        let tracker =
                            dirty
                                .partial_mut(field)
                                .ok_or(CodecError::DirtyShapeMismatch {
                                    type_name: schema.type_name(),
                                })?;
                        self.read_array_diff(field, slot_value, tracker, reader)?;
                    } else {
                        let field_value = self.read_field(field.name, &field.ty, reader)?;
                        value.set_field(field.slot, field_value).map_err(|_| {
                            CodecError::ValueMismatch {
                                field: field.name,
                                expected: field.ty.name(),
                                found: "nothing",
                            }
                        })?;
                    }
                    dirty.set_dirty(index);
                }
            }
        }
        Ok(())
    }

    fn read_array_diff(
        &self,
        field: &FieldDescriptor,
        value: &mut Value,
        tracker: &mut DirtyArray,
        reader: &mut ByteReader,
    ) -> Result<(), CodecError> {
        match ArrayDiffMode::de(reader)? {
            ArrayDiffMode::FullyReplaced => {
                let replacement = self.read_field(field.name, &field.ty, reader)?;
                tracker.init(replacement.element_count());
                tracker.mark_full();
                *value = replacement;
            }
            ArrayDiffMode::ElementDiff => {
                let Some(element) = field.element_kind() else {
                    return Err(CodecError::ValueMismatch {
                        field: field.name,
                        expected: field.ty.name(),
                        found: value.kind_name(),
                    });
                };
                // the bitmap is sized by the length the receiver already holds
                let length = value.element_count();
                let bytes = reader.read_bytes(DiffMask::byte_count_for(length))?;
                let received = DiffMask::from_bytes(length, bytes)?;

                if let Some(items) = value.elements_mut() {
                    for index in received.ones() {
                        items[index] = self.read_element(field.name, element, reader)?;
                    }
                }

                if tracker.len() != length {
                    tracker.init(length);
                }
                tracker.set_elements(received);
            }
        }
        Ok(())
    }
}
