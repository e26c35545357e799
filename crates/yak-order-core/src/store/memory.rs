use std::collections::HashMap;
use std::sync::RwLock;

use super::{Catalog, EntitySource, OrderStore};
use crate::error::{OrderError, Result};
use crate::types::{CollectionFilter, EntityId, EntityKind, GroupKey, OrderableEntity};

/// In-process backend over a [`Catalog`] guarded by a `RwLock`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    catalog: RwLock<Catalog>,
}

impl MemoryStore {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog: RwLock::new(catalog),
        }
    }

    /// Copy of the current catalog.
    pub fn snapshot(&self) -> Result<Catalog> {
        let catalog = self
            .catalog
            .read()
            .map_err(|_| OrderError::LockPoisoned("read"))?;
        Ok(catalog.clone())
    }

    /// Mutate the catalog in place (entity setup, reparenting, deletes).
    pub fn update<T>(&self, f: impl FnOnce(&mut Catalog) -> Result<T>) -> Result<T> {
        let mut catalog = self
            .catalog
            .write()
            .map_err(|_| OrderError::LockPoisoned("write"))?;
        f(&mut catalog)
    }

    fn read<T>(&self, f: impl FnOnce(&Catalog) -> T) -> Result<T> {
        let catalog = self
            .catalog
            .read()
            .map_err(|_| OrderError::LockPoisoned("read"))?;
        Ok(f(&catalog))
    }
}

impl OrderStore for MemoryStore {
    fn manual_order(&self, kind: EntityKind, id: EntityId) -> Result<Option<i64>> {
        self.read(|c| c.manual_order(kind, id))
    }

    fn manual_orders(&self, kind: EntityKind, ids: &[EntityId]) -> Result<HashMap<EntityId, i64>> {
        self.read(|c| {
            ids.iter()
                .filter_map(|&id| c.manual_order(kind, id).map(|v| (id, v)))
                .collect()
        })
    }

    fn persist_order(&self, kind: EntityKind, id: EntityId, value: i64) -> Result<()> {
        self.update(|c| c.set_manual_order(kind, id, value))
    }
}

impl EntitySource for MemoryStore {
    fn has_collection(&self, group: &GroupKey) -> Result<bool> {
        self.read(|c| c.has_collection(group))
    }

    fn candidates(&self, filter: &CollectionFilter) -> Result<Vec<OrderableEntity>> {
        self.read(|c| c.candidates(filter))
    }

    fn entity(&self, kind: EntityKind, id: EntityId) -> Result<Option<OrderableEntity>> {
        self.read(|c| c.entity(kind, id))
    }
}
