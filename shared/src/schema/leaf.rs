use deltasync_serde::{ByteReader, ByteWrite, ConstByteLength, Serde, SerdeErr};

/// Integer 2D vector, used for grid sizes and coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Vec2Int {
    pub x: i32,
    pub y: i32,
}

impl Vec2Int {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Linear RGBA color with float channels
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const RED: Color = Color::new(1.0, 0.0, 0.0, 1.0);
    pub const GREEN: Color = Color::new(0.0, 1.0, 0.0, 1.0);
    pub const BLUE: Color = Color::new(0.0, 0.0, 1.0, 1.0);
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

macro_rules! impl_serde_composite {
    ($ty:ident, $component:ty, [$($field:ident),+]) => {
        impl Serde for $ty {
            fn ser(&self, writer: &mut dyn ByteWrite) {
                $(self.$field.ser(writer);)+
            }

            fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
                Ok(Self {
                    $($field: <$component>::de(reader)?,)+
                })
            }

            fn byte_length(&self) -> usize {
                <Self as ConstByteLength>::const_byte_length()
            }
        }

        impl ConstByteLength for $ty {
            fn const_byte_length() -> usize {
                let fields: &[&str] = &[$(stringify!($field)),+];
                fields.len() * <$component as ConstByteLength>::const_byte_length()
            }
        }
    };
}

impl_serde_composite!(Vec2Int, i32, [x, y]);
impl_serde_composite!(Vec2, f32, [x, y]);
impl_serde_composite!(Vec3, f32, [x, y, z]);
impl_serde_composite!(Color, f32, [r, g, b, a]);

/// The closed set of primitive kinds a schema field or array element may have
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LeafKind {
    Bool,
    U8,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
    Vec2Int,
    Vec2,
    Vec3,
    Color,
}

impl LeafKind {
    pub fn name(self) -> &'static str {
        match self {
            LeafKind::Bool => "Bool",
            LeafKind::U8 => "U8",
            LeafKind::I32 => "I32",
            LeafKind::U32 => "U32",
            LeafKind::I64 => "I64",
            LeafKind::U64 => "U64",
            LeafKind::F32 => "F32",
            LeafKind::F64 => "F64",
            LeafKind::Vec2Int => "Vec2Int",
            LeafKind::Vec2 => "Vec2",
            LeafKind::Vec3 => "Vec3",
            LeafKind::Color => "Color",
        }
    }

    /// Encoded size in bytes; every leaf kind is fixed-width
    pub fn byte_length(self) -> usize {
        match self {
            LeafKind::Bool => bool::const_byte_length(),
            LeafKind::U8 => u8::const_byte_length(),
            LeafKind::I32 => i32::const_byte_length(),
            LeafKind::U32 => u32::const_byte_length(),
            LeafKind::I64 => i64::const_byte_length(),
            LeafKind::U64 => u64::const_byte_length(),
            LeafKind::F32 => f32::const_byte_length(),
            LeafKind::F64 => f64::const_byte_length(),
            LeafKind::Vec2Int => Vec2Int::const_byte_length(),
            LeafKind::Vec2 => Vec2::const_byte_length(),
            LeafKind::Vec3 => Vec3::const_byte_length(),
            LeafKind::Color => Color::const_byte_length(),
        }
    }

    pub fn default_value(self) -> LeafValue {
        match self {
            LeafKind::Bool => LeafValue::Bool(false),
            LeafKind::U8 => LeafValue::U8(0),
            LeafKind::I32 => LeafValue::I32(0),
            LeafKind::U32 => LeafValue::U32(0),
            LeafKind::I64 => LeafValue::I64(0),
            LeafKind::U64 => LeafValue::U64(0),
            LeafKind::F32 => LeafValue::F32(0.0),
            LeafKind::F64 => LeafValue::F64(0.0),
            LeafKind::Vec2Int => LeafValue::Vec2Int(Vec2Int::default()),
            LeafKind::Vec2 => LeafValue::Vec2(Vec2::default()),
            LeafKind::Vec3 => LeafValue::Vec3(Vec3::default()),
            LeafKind::Color => LeafValue::Color(Color::default()),
        }
    }
}

/// A primitive value, tagged with its kind
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LeafValue {
    Bool(bool),
    U8(u8),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
    Vec2Int(Vec2Int),
    Vec2(Vec2),
    Vec3(Vec3),
    Color(Color),
}

impl LeafValue {
    pub fn kind(&self) -> LeafKind {
        match self {
            LeafValue::Bool(_) => LeafKind::Bool,
            LeafValue::U8(_) => LeafKind::U8,
            LeafValue::I32(_) => LeafKind::I32,
            LeafValue::U32(_) => LeafKind::U32,
            LeafValue::I64(_) => LeafKind::I64,
            LeafValue::U64(_) => LeafKind::U64,
            LeafValue::F32(_) => LeafKind::F32,
            LeafValue::F64(_) => LeafKind::F64,
            LeafValue::Vec2Int(_) => LeafKind::Vec2Int,
            LeafValue::Vec2(_) => LeafKind::Vec2,
            LeafValue::Vec3(_) => LeafKind::Vec3,
            LeafValue::Color(_) => LeafKind::Color,
        }
    }

    pub fn ser(&self, writer: &mut dyn ByteWrite) {
        match self {
            LeafValue::Bool(inner) => inner.ser(writer),
            LeafValue::U8(inner) => inner.ser(writer),
            LeafValue::I32(inner) => inner.ser(writer),
            LeafValue::U32(inner) => inner.ser(writer),
            LeafValue::I64(inner) => inner.ser(writer),
            LeafValue::U64(inner) => inner.ser(writer),
            LeafValue::F32(inner) => inner.ser(writer),
            LeafValue::F64(inner) => inner.ser(writer),
            LeafValue::Vec2Int(inner) => inner.ser(writer),
            LeafValue::Vec2(inner) => inner.ser(writer),
            LeafValue::Vec3(inner) => inner.ser(writer),
            LeafValue::Color(inner) => inner.ser(writer),
        }
    }

    /// Reads a value of the given kind; the kind itself is never on the wire
    pub fn de(kind: LeafKind, reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Ok(match kind {
            LeafKind::Bool => LeafValue::Bool(bool::de(reader)?),
            LeafKind::U8 => LeafValue::U8(u8::de(reader)?),
            LeafKind::I32 => LeafValue::I32(i32::de(reader)?),
            LeafKind::U32 => LeafValue::U32(u32::de(reader)?),
            LeafKind::I64 => LeafValue::I64(i64::de(reader)?),
            LeafKind::U64 => LeafValue::U64(u64::de(reader)?),
            LeafKind::F32 => LeafValue::F32(f32::de(reader)?),
            LeafKind::F64 => LeafValue::F64(f64::de(reader)?),
            LeafKind::Vec2Int => LeafValue::Vec2Int(Vec2Int::de(reader)?),
            LeafKind::Vec2 => LeafValue::Vec2(Vec2::de(reader)?),
            LeafKind::Vec3 => LeafValue::Vec3(Vec3::de(reader)?),
            LeafKind::Color => LeafValue::Color(Color::de(reader)?),
        })
    }
}
