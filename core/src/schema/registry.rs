use super::{Entity, EntityRef, SchemaDescriptor};
use crate::error::SchemaError;
use dashmap::DashMap;
use std::any::TypeId;
use std::sync::{Arc, OnceLock};
use tracing::debug;

static GLOBAL: OnceLock<Arc<SchemaRegistry>> = OnceLock::new();

/// Process-wide cache of validated schemas, populated on first use and never invalidated.
#[derive(Default)]
pub struct SchemaRegistry {
    schemas: DashMap<TypeId, Arc<SchemaDescriptor>>,
}

impl SchemaRegistry {
    pub fn new() -> Self { Self::default() }

    pub fn global() -> Arc<SchemaRegistry> { GLOBAL.get_or_init(|| Arc::new(SchemaRegistry::new())).clone() }

    pub fn schema<T: Entity>(&self) -> Result<Arc<SchemaDescriptor>, SchemaError> { self.get(&EntityRef::of::<T>()) }

    pub fn get(&self, entity: &EntityRef) -> Result<Arc<SchemaDescriptor>, SchemaError> {
        if let Some(schema) = self.schemas.get(&entity.type_id()) {
            return Ok(Arc::clone(schema.value()));
        }
        // Built outside the shard lock. Racing builders produce equal descriptors, so the last insert wins harmlessly.
        let schema = Arc::new(entity.build()?);
        debug!("SchemaRegistry: built {} ({} fields, {} relations)", schema.table(), schema.fields().count(), schema.relations().count());
        self.schemas.insert(entity.type_id(), Arc::clone(&schema));
        Ok(schema)
    }

    /// Builds and validates `T` and every entity reachable through its relations.
    /// Call at startup so schema defects fail fast instead of on the first request.
    pub fn register<T: Entity>(&self) -> Result<Arc<SchemaDescriptor>, SchemaError> {
        let root = self.schema::<T>()?;
        let mut pending: Vec<EntityRef> = root.relations().map(|r| r.target).collect();
        let mut seen = vec![EntityRef::of::<T>()];
        while let Some(entity) = pending.pop() {
            if seen.contains(&entity) {
                continue;
            }
            let schema = self.get(&entity)?;
            pending.extend(schema.relations().map(|r| r.target));
            seen.push(entity);
        }
        Ok(root)
    }

    pub fn contains<T: Entity>(&self) -> bool { self.schemas.contains_key(&TypeId::of::<T>()) }

    pub fn len(&self) -> usize { self.schemas.len() }

    pub fn is_empty(&self) -> bool { self.schemas.is_empty() }
}
