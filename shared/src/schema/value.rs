use super::{
    decl::{ElementKind, FieldType},
    error::ValueError,
    leaf::{Color, LeafValue, Vec2, Vec2Int, Vec3},
};

/// A dynamically-typed state value, shaped by a schema
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Leaf(LeafValue),
    Struct(StructValue),
    /// `None` is a null array
    Array(Option<Vec<Value>>),
    List(Vec<Value>),
}

impl Value {
    pub fn array<T: Into<Value>>(items: impl IntoIterator<Item = T>) -> Self {
        Value::Array(Some(items.into_iter().map(Into::into).collect()))
    }

    pub fn null_array() -> Self {
        Value::Array(None)
    }

    pub fn list<T: Into<Value>>(items: impl IntoIterator<Item = T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Leaf(leaf) => leaf.kind().name(),
            Value::Struct(value) => value.type_name(),
            Value::Array(_) => "Array",
            Value::List(_) => "List",
        }
    }

    pub fn as_struct(&self) -> Option<&StructValue> {
        match self {
            Value::Struct(value) => Some(value),
            _ => None,
        }
    }

    /// Elements of a non-null array or of a list
    pub fn elements(&self) -> Option<&[Value]> {
        match self {
            Value::Array(Some(items)) | Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn elements_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Value::Array(Some(items)) | Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Number of elements; null arrays and non-collections count as empty
    pub fn element_count(&self) -> usize {
        self.elements().map_or(0, <[Value]>::len)
    }

    /// Whether this value has the shape `ty` describes. Nested structs are
    /// matched by type name only.
    pub fn conforms_to(&self, ty: &FieldType) -> bool {
        match (ty, self) {
            (FieldType::Leaf(kind), Value::Leaf(leaf)) => leaf.kind() == *kind,
            (FieldType::Struct(type_name), Value::Struct(value)) => value.type_name() == *type_name,
            (FieldType::Array(element), Value::Array(items)) => items
                .iter()
                .flatten()
                .all(|item| item.conforms_to_element(element)),
            (FieldType::List(element), Value::List(items)) => {
                items.iter().all(|item| item.conforms_to_element(element))
            }
            _ => false,
        }
    }

    pub fn conforms_to_element(&self, element: &ElementKind) -> bool {
        match (element, self) {
            (ElementKind::Leaf(kind), Value::Leaf(leaf)) => leaf.kind() == *kind,
            (ElementKind::Struct(type_name), Value::Struct(value)) => {
                value.type_name() == *type_name
            }
            _ => false,
        }
    }

    /// Converts every element of a collection into `T`
    pub fn try_into_vec<T>(self) -> Result<Vec<T>, ValueError>
    where
        T: TryFrom<Value, Error = ValueError>,
    {
        match self {
            Value::Array(Some(items)) | Value::List(items) => {
                items.into_iter().map(T::try_from).collect()
            }
            Value::Array(None) => Ok(Vec::new()),
            other => Err(ValueError::WrongKind {
                expected: "Array",
                found: other.kind_name(),
            }),
        }
    }
}

/// A struct value: its declared type name and one slot per declared field,
/// synchronized or not, in declaration order
#[derive(Clone, Debug, PartialEq)]
pub struct StructValue {
    type_name: &'static str,
    fields: Vec<Value>,
}

impl StructValue {
    pub fn new(type_name: &'static str, fields: Vec<Value>) -> Self {
        Self { type_name, fields }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn fields(&self) -> &[Value] {
        &self.fields
    }

    pub fn field(&self, slot: usize) -> Option<&Value> {
        self.fields.get(slot)
    }

    pub fn field_mut(&mut self, slot: usize) -> Option<&mut Value> {
        self.fields.get_mut(slot)
    }

    /// Replaces the value at `slot`, returning the previous one
    pub fn set_field(&mut self, slot: usize, value: Value) -> Result<Value, ValueError> {
        let type_name = self.type_name;
        let current = self
            .fields
            .get_mut(slot)
            .ok_or(ValueError::MissingField { type_name, slot })?;
        Ok(std::mem::replace(current, value))
    }

    /// Moves the value out of `slot` and converts it, for typed readers
    pub fn take_field<T>(&mut self, slot: usize) -> Result<T, ValueError>
    where
        T: TryFrom<Value, Error = ValueError>,
    {
        let value = self.set_field(slot, Value::Array(None))?;
        T::try_from(value)
    }

    pub fn expect_type(&self, type_name: &'static str) -> Result<(), ValueError> {
        if self.type_name != type_name {
            return Err(ValueError::WrongType {
                expected: type_name,
                found: self.type_name,
            });
        }
        Ok(())
    }
}

impl From<StructValue> for Value {
    fn from(value: StructValue) -> Self {
        Value::Struct(value)
    }
}

impl From<LeafValue> for Value {
    fn from(value: LeafValue) -> Self {
        Value::Leaf(value)
    }
}

impl TryFrom<Value> for StructValue {
    type Error = ValueError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Struct(inner) => Ok(inner),
            other => Err(ValueError::WrongKind {
                expected: "Struct",
                found: other.kind_name(),
            }),
        }
    }
}

macro_rules! impl_leaf_conversions {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Leaf(LeafValue::$variant(value))
                }
            }

            impl TryFrom<Value> for $ty {
                type Error = ValueError;

                fn try_from(value: Value) -> Result<Self, Self::Error> {
                    match value {
                        Value::Leaf(LeafValue::$variant(inner)) => Ok(inner),
                        other => Err(ValueError::WrongKind {
                            expected: stringify!($variant),
                            found: other.kind_name(),
                        }),
                    }
                }
            }
        )*
    };
}

impl_leaf_conversions!(
    bool => Bool,
    u8 => U8,
    i32 => I32,
    u32 => U32,
    i64 => I64,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    Vec2Int => Vec2Int,
    Vec2 => Vec2,
    Vec3 => Vec3,
    Color => Color,
);
