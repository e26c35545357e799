//! Collaborator contracts for the ordering core, plus the bundled backends.
//!
//! [`EntitySource`] is the query layer and [`OrderStore`] the manual-order
//! record store. A backend is free to implement both, as [`MemoryStore`] and
//! [`FileStore`] do over a shared [`Catalog`].

pub mod catalog;
pub mod file;
pub mod memory;

pub use catalog::{Catalog, Post, PostTypeDef, TaxonomyDef, Term};
pub use file::FileStore;
pub use memory::MemoryStore;

use crate::error::Result;
use crate::types::{CollectionFilter, EntityId, EntityKind, GroupKey, OrderableEntity};
use std::collections::HashMap;

/// Manual-order record store.
///
/// `manual_order` must distinguish "no record" (`None`) from an explicit
/// `Some(0)`.
pub trait OrderStore {
    fn manual_order(&self, kind: EntityKind, id: EntityId) -> Result<Option<i64>>;

    /// Bulk read. Ids without a record are absent from the map.
    fn manual_orders(&self, kind: EntityKind, ids: &[EntityId]) -> Result<HashMap<EntityId, i64>> {
        let mut out = HashMap::with_capacity(ids.len());
        for &id in ids {
            if let Some(v) = self.manual_order(kind, id)? {
                out.insert(id, v);
            }
        }
        Ok(out)
    }

    fn persist_order(&self, kind: EntityKind, id: EntityId, value: i64) -> Result<()>;
}

/// Query layer over the host's entities.
pub trait EntitySource {
    /// Whether the taxonomy or post type named by `group` is known.
    fn has_collection(&self, group: &GroupKey) -> Result<bool>;

    /// Raw, unordered candidates for `filter`.
    fn candidates(&self, filter: &CollectionFilter) -> Result<Vec<OrderableEntity>>;

    fn entity(&self, kind: EntityKind, id: EntityId) -> Result<Option<OrderableEntity>>;
}
