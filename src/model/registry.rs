//! Process-wide table of registered resource types. Populated at startup, read-only afterwards.

use crate::error::RegistryError;
use crate::model::{FieldDescriptor, Resource};
use crate::sql::Dialect;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

#[derive(Debug)]
pub struct ResourceSchema {
    pub name: String,
    pub fields: Vec<FieldDescriptor>,
}

/// Shared, immutable handle to one registered type.
#[derive(Clone, Debug)]
pub struct TypeHandle(Arc<ResourceSchema>);

impl TypeHandle {
    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.0.fields
    }

    pub fn schema(&self) -> &ResourceSchema {
        &self.0
    }
}

pub struct Registry {
    dialect: Dialect,
    types: HashMap<String, TypeHandle>,
}

impl Registry {
    pub fn new(dialect: Dialect) -> Self {
        Registry {
            dialect,
            types: HashMap::new(),
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn register(
        &mut self,
        type_name: &str,
        fields: Vec<FieldDescriptor>,
    ) -> Result<TypeHandle, RegistryError> {
        let invalid = |reason: String| RegistryError::InvalidDescriptor {
            type_name: type_name.to_string(),
            reason,
        };
        if type_name.is_empty() {
            return Err(invalid("type name is empty".into()));
        }
        if self.types.contains_key(type_name) {
            return Err(RegistryError::DuplicateType(type_name.to_string()));
        }
        if fields.is_empty() {
            return Err(invalid("no fields".into()));
        }
        let mut seen = HashSet::new();
        for f in &fields {
            if f.name.is_empty() {
                return Err(invalid("field name is empty".into()));
            }
            if !seen.insert(f.name.as_str()) {
                return Err(invalid(format!("field '{}' repeats", f.name)));
            }
            if !self.dialect.supports(f.kind) {
                return Err(invalid(format!(
                    "field '{}' has kind {} which {} cannot store",
                    f.name, f.kind, self.dialect
                )));
            }
        }
        let handle = TypeHandle(Arc::new(ResourceSchema {
            name: type_name.to_string(),
            fields,
        }));
        self.types.insert(type_name.to_string(), handle.clone());
        tracing::debug!(type_name, "registered resource type");
        Ok(handle)
    }

    pub fn register_resource<R: Resource>(&mut self) -> Result<TypeHandle, RegistryError> {
        self.register(R::NAME, R::fields())
    }

    pub fn get(&self, type_name: &str) -> Option<TypeHandle> {
        self.types.get(type_name).cloned()
    }

    pub fn handles(&self) -> impl Iterator<Item = &TypeHandle> {
        self.types.values()
    }
}
