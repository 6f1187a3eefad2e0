use super::leaf::LeafKind;

/// What an array or list holds
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Leaf(LeafKind),
    /// A nested struct, named by its declared type name
    Struct(&'static str),
}

impl ElementKind {
    pub fn name(&self) -> &'static str {
        match self {
            ElementKind::Leaf(kind) => kind.name(),
            ElementKind::Struct(type_name) => type_name,
        }
    }
}

/// Declared type of a field, as written in source
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldType {
    Leaf(LeafKind),
    Struct(&'static str),
    /// A nullable, array-like collection
    Array(ElementKind),
    /// A growable, never-null collection
    List(ElementKind),
}

impl FieldType {
    pub fn name(&self) -> &'static str {
        match self {
            FieldType::Leaf(kind) => kind.name(),
            FieldType::Struct(type_name) => type_name,
            FieldType::Array(_) => "Array",
            FieldType::List(_) => "List",
        }
    }

    pub fn element_kind(&self) -> Option<&ElementKind> {
        match self {
            FieldType::Array(element) | FieldType::List(element) => Some(element),
            FieldType::Leaf(_) | FieldType::Struct(_) => None,
        }
    }
}

/// Marks a field as synchronized under a wire name
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SyncAttr {
    pub name: &'static str,
    pub partial: bool,
}

/// One field of a declared type. Fields without a `SyncAttr` are carried by
/// values but never replicated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDecl {
    pub name: &'static str,
    pub ty: FieldType,
    pub sync: Option<SyncAttr>,
}

impl FieldDecl {
    /// Declares a local-only field
    pub fn new(name: &'static str, ty: FieldType) -> Self {
        Self {
            name,
            ty,
            sync: None,
        }
    }

    /// Synchronizes the field as a whole under `wire_name`
    pub fn sync(mut self, wire_name: &'static str) -> Self {
        self.sync = Some(SyncAttr {
            name: wire_name,
            partial: false,
        });
        self
    }

    /// Synchronizes the field element by element under `wire_name`
    pub fn sync_partial(mut self, wire_name: &'static str) -> Self {
        self.sync = Some(SyncAttr {
            name: wire_name,
            partial: true,
        });
        self
    }
}

/// Source-level description of a state type: its name, its optional sync type
/// id (the "synchronizable state type" marker) and its fields in declaration
/// order. Declaration order is the wire order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeDecl {
    pub name: &'static str,
    pub sync_id: Option<u8>,
    pub fields: Vec<FieldDecl>,
}

impl TypeDecl {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            sync_id: None,
            fields: Vec::new(),
        }
    }

    pub fn sync_type(mut self, id: u8) -> Self {
        self.sync_id = Some(id);
        self
    }

    pub fn field(mut self, field: FieldDecl) -> Self {
        self.fields.push(field);
        self
    }
}
