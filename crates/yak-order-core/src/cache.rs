use crate::compare::SecondaryOrder;
use crate::error::{OrderError, Result};
use crate::resolver::RankedEntity;
use crate::types::{CollectionFilter, EntityId, GroupKey};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

/// Receives invalidation signals from the writer. Best-effort: the writer
/// logs failures and carries on.
pub trait CacheInvalidator: Send + Sync {
    fn invalidate(&self, ids: &[EntityId], group: &GroupKey) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    filter: CollectionFilter,
    by: SecondaryOrder,
}

/// Resolved read results keyed by filter and tie-breaker.
///
/// Every invalidation bumps a generation counter. A result computed while
/// the generation moved is returned but not stored. Empty results are never
/// stored.
#[derive(Debug, Default)]
pub struct ReadCache {
    entries: RwLock<HashMap<CacheKey, Vec<RankedEntity>>>,
    generation: AtomicU64,
}

impl ReadCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn get(&self, filter: &CollectionFilter, by: SecondaryOrder) -> Option<Vec<RankedEntity>> {
        let key = CacheKey {
            filter: filter.clone(),
            by,
        };
        self.entries.read().ok()?.get(&key).cloned()
    }

    fn insert_if_current(
        &self,
        filter: &CollectionFilter,
        by: SecondaryOrder,
        started_at: u64,
        resolved: &[RankedEntity],
    ) {
        if resolved.is_empty() {
            return;
        }
        let Ok(mut entries) = self.entries.write() else {
            return;
        };
        // Invalidation bumps the generation under this lock.
        if self.generation.load(Ordering::Acquire) != started_at {
            return;
        }
        let key = CacheKey {
            filter: filter.clone(),
            by,
        };
        entries.insert(key, resolved.to_vec());
    }

    /// Cached value for `filter` under `by`, or compute and return it.
    ///
    /// `compute` must read its inputs after this call starts; any
    /// invalidation that lands meanwhile keeps its result out of the cache.
    pub fn get_or_try_insert_with(
        &self,
        filter: &CollectionFilter,
        by: SecondaryOrder,
        compute: impl FnOnce() -> Result<Vec<RankedEntity>>,
    ) -> Result<Vec<RankedEntity>> {
        let started_at = self.generation.load(Ordering::Acquire);
        if let Some(hit) = self.get(filter, by) {
            return Ok(hit);
        }
        let resolved = compute()?;
        self.insert_if_current(filter, by, started_at, &resolved);
        Ok(resolved)
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry. Returns how many were removed.
    pub fn clear(&self) -> Result<usize> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| OrderError::LockPoisoned("cache write"))?;
        self.generation.fetch_add(1, Ordering::AcqRel);
        let n = entries.len();
        entries.clear();
        Ok(n)
    }
}

impl CacheInvalidator for ReadCache {
    fn invalidate(&self, ids: &[EntityId], group: &GroupKey) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| OrderError::LockPoisoned("cache write"))?;
        self.generation.fetch_add(1, Ordering::AcqRel);
        entries.retain(|key, resolved| {
            if key.filter.covers(group) {
                return false;
            }
            let same_kind = key.filter.kind() == group.kind();
            !(same_kind && resolved.iter().any(|r| ids.contains(&r.entity.id)))
        });
        Ok(())
    }
}
