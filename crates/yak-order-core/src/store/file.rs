use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use super::{Catalog, EntitySource, OrderStore};
use crate::error::{OrderError, Result};
use crate::types::{CollectionFilter, EntityId, EntityKind, GroupKey, OrderableEntity};

/// Backend over `.yak/catalog.yaml` under a project root.
///
/// Every call re-reads the file. `persist_order` is a load-modify-save of a
/// single record, so a renumber is not atomic across ids.
///
/// All stores opened on the same root in this process share one write lock,
/// held across each load-modify-save.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

static ROOT_LOCKS: OnceLock<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>> = OnceLock::new();

fn root_lock(root: &Path) -> Arc<Mutex<()>> {
    let key = std::fs::canonicalize(root).unwrap_or_else(|_| root.to_path_buf());
    let mut locks = ROOT_LOCKS
        .get_or_init(|| Mutex::new(HashMap::new()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    locks.entry(key).or_default().clone()
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let write_lock = root_lock(&root);
        Self { root, write_lock }
    }

    pub fn load(&self) -> Result<Catalog> {
        Catalog::load(&self.root)
    }
}

impl OrderStore for FileStore {
    fn manual_order(&self, kind: EntityKind, id: EntityId) -> Result<Option<i64>> {
        Ok(self.load()?.manual_order(kind, id))
    }

    fn manual_orders(&self, kind: EntityKind, ids: &[EntityId]) -> Result<HashMap<EntityId, i64>> {
        let catalog = self.load()?;
        Ok(ids
            .iter()
            .filter_map(|&id| catalog.manual_order(kind, id).map(|v| (id, v)))
            .collect())
    }

    fn persist_order(&self, kind: EntityKind, id: EntityId, value: i64) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| OrderError::LockPoisoned("catalog write"))?;
        let mut catalog = self.load()?;
        catalog.set_manual_order(kind, id, value)?;
        catalog.save(&self.root)
    }
}

impl EntitySource for FileStore {
    fn has_collection(&self, group: &GroupKey) -> Result<bool> {
        Ok(self.load()?.has_collection(group))
    }

    fn candidates(&self, filter: &CollectionFilter) -> Result<Vec<OrderableEntity>> {
        Ok(self.load()?.candidates(filter))
    }

    fn entity(&self, kind: EntityKind, id: EntityId) -> Result<Option<OrderableEntity>> {
        Ok(self.load()?.entity(kind, id))
    }
}
