use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use log::info;

use super::{
    decl::{ElementKind, FieldType, TypeDecl},
    error::SchemaError,
    sync_type::SyncType,
    type_schema::TypeSchema,
    value::{StructValue, Value},
};

/// Holds every declared state type and lazily builds, then caches, their
/// schemas. Construct one at startup and share it by reference (or `Arc`)
/// with every codec, container and mutation call.
#[derive(Default)]
pub struct SchemaRegistry {
    decls: HashMap<&'static str, TypeDecl>,
    schemas: RwLock<HashMap<&'static str, Arc<TypeSchema>>>,
    type_ids: RwLock<Option<HashMap<u8, &'static str>>>,
    locked: bool,
}

impl SchemaRegistry {
    pub fn builder() -> Self {
        Self::default()
    }

    pub fn add_type(&mut self, decl: TypeDecl) -> &mut Self {
        if let Err(error) = self.try_add_type(decl) {
            panic!("{}", error);
        }
        self
    }

    pub fn register<T: SyncType>(&mut self) -> &mut Self {
        self.add_type(T::declaration())
    }

    // Non-panicking builder methods

    pub fn try_add_type(&mut self, decl: TypeDecl) -> Result<&mut Self, SchemaError> {
        self.try_check_lock()?;
        if self.decls.contains_key(decl.name) {
            return Err(SchemaError::DuplicateType {
                type_name: decl.name,
            });
        }
        self.decls.insert(decl.name, decl);
        Ok(self)
    }

    pub fn try_register<T: SyncType>(&mut self) -> Result<&mut Self, SchemaError> {
        self.try_add_type(T::declaration())
    }

    /// Builds every sync type's schema and the type id table up front, so a
    /// broken declaration aborts startup instead of a later frame.
    pub fn try_lock(&mut self) -> Result<(), SchemaError> {
        self.try_check_lock()?;

        let mut sync_types: Vec<&'static str> = self
            .decls
            .values()
            .filter(|decl| decl.sync_id.is_some())
            .map(|decl| decl.name)
            .collect();
        sync_types.sort_unstable();

        for type_name in sync_types {
            let schema = self.schema_for(type_name)?;
            for field in schema.fields() {
                let nested = match &field.ty {
                    FieldType::Struct(nested) => Some(*nested),
                    FieldType::Array(ElementKind::Struct(nested))
                    | FieldType::List(ElementKind::Struct(nested)) => Some(*nested),
                    _ => None,
                };
                if let Some(nested) = nested {
                    self.schema_for(nested)?;
                }
            }
        }
        self.type_id_table()?;

        self.locked = true;
        Ok(())
    }

    pub fn lock(&mut self) {
        if let Err(error) = self.try_lock() {
            panic!("{}", error);
        }
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Returns Err if the registry is locked
    pub fn try_check_lock(&self) -> Result<(), SchemaError> {
        if self.locked {
            Err(SchemaError::RegistryLocked)
        } else {
            Ok(())
        }
    }

    pub fn build(&mut self) -> Self {
        std::mem::take(self)
    }

    pub fn decl(&self, type_name: &str) -> Option<&TypeDecl> {
        self.decls.get(type_name)
    }

    /// Schema of the named type, built on first request and cached after
    pub fn schema_for(&self, type_name: &str) -> Result<Arc<TypeSchema>, SchemaError> {
        {
            let schemas = self
                .schemas
                .read()
                .map_err(|_| SchemaError::LockPoisoned)?;
            if let Some(schema) = schemas.get(type_name) {
                return Ok(schema.clone());
            }
        }

        let decl = self
            .decls
            .get(type_name)
            .ok_or_else(|| SchemaError::UnknownType {
                type_name: type_name.to_string(),
            })?;

        // building under the write lock keeps one schema object per type
        let mut schemas = self
            .schemas
            .write()
            .map_err(|_| SchemaError::LockPoisoned)?;
        if let Some(schema) = schemas.get(type_name) {
            return Ok(schema.clone());
        }
        let schema = Arc::new(TypeSchema::build(decl)?);
        info!(
            "SchemaRegistry: built schema for {} (id {}, {} synced field(s))",
            schema.type_name(),
            schema.type_id(),
            schema.field_count()
        );
        schemas.insert(decl.name, schema.clone());
        Ok(schema)
    }

    /// Resolves a wire type id to its type name, or `None` if no sync type uses it
    pub fn type_name_for_id(&self, id: u8) -> Result<Option<&'static str>, SchemaError> {
        {
            let type_ids = self
                .type_ids
                .read()
                .map_err(|_| SchemaError::LockPoisoned)?;
            if let Some(table) = type_ids.as_ref() {
                return Ok(table.get(&id).copied());
            }
        }
        let table = self.type_id_table()?;
        Ok(table.get(&id).copied())
    }

    fn type_id_table(&self) -> Result<HashMap<u8, &'static str>, SchemaError> {
        let mut type_ids = self
            .type_ids
            .write()
            .map_err(|_| SchemaError::LockPoisoned)?;
        if let Some(table) = type_ids.as_ref() {
            return Ok(table.clone());
        }

        let mut decls: Vec<&TypeDecl> = self.decls.values().collect();
        decls.sort_unstable_by_key(|decl| decl.name);

        let mut table: HashMap<u8, &'static str> = HashMap::new();
        for decl in decls {
            let Some(id) = decl.sync_id else {
                continue;
            };
            if let Some(first) = table.insert(id, decl.name) {
                return Err(SchemaError::DuplicateTypeId {
                    id,
                    first,
                    second: decl.name,
                });
            }
        }

        info!("SchemaRegistry: type id table built with {} type(s)", table.len());
        *type_ids = Some(table.clone());
        Ok(table)
    }

    /// A value of the named type with every declared field at its default:
    /// zeroed leaves, null arrays, empty lists and recursively defaulted structs
    pub fn default_value(&self, type_name: &str) -> Result<StructValue, SchemaError> {
        let decl = self
            .decls
            .get(type_name)
            .ok_or_else(|| SchemaError::UnknownType {
                type_name: type_name.to_string(),
            })?;

        let mut fields = Vec::with_capacity(decl.fields.len());
        for field in &decl.fields {
            fields.push(self.default_field(&field.ty)?);
        }
        Ok(StructValue::new(decl.name, fields))
    }

    fn default_field(&self, ty: &FieldType) -> Result<Value, SchemaError> {
        Ok(match ty {
            FieldType::Leaf(kind) => Value::Leaf(kind.default_value()),
            FieldType::Struct(type_name) => Value::Struct(self.default_value(type_name)?),
            FieldType::Array(_) => Value::Array(None),
            FieldType::List(_) => Value::List(Vec::new()),
        })
    }
}
