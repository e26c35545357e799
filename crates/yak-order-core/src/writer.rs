//! Renumbering of sibling groups.
//!
//! A renumber takes the caller's requested sequence for one group, drops ids
//! that no longer belong to that group, and writes evenly spaced ranks
//! (`start`, `start + step`, ...) to the survivors. Writes are per id and not
//! rolled back: the outcome reports exactly which ids were persisted.

use std::collections::HashSet;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::cache::CacheInvalidator;
use crate::error::{OrderError, Result};
use crate::observer::{OrderObserver, OrderUpdated};
use crate::store::{EntitySource, OrderStore};
use crate::types::{EntityId, EntityKind, GroupKey, OrderableEntity};

// ---------------------------------------------------------------------------
// RankSpacing
// ---------------------------------------------------------------------------

pub const DEFAULT_RANK_START: i64 = 10;
pub const DEFAULT_RANK_STEP: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankSpacing {
    pub start: i64,
    pub step: i64,
}

impl Default for RankSpacing {
    fn default() -> Self {
        Self {
            start: DEFAULT_RANK_START,
            step: DEFAULT_RANK_STEP,
        }
    }
}

impl RankSpacing {
    pub fn new(start: i64, step: i64) -> Result<Self> {
        let spacing = Self { start, step };
        spacing.validate()?;
        Ok(spacing)
    }

    pub fn validate(&self) -> Result<()> {
        if self.step < 1 {
            return Err(OrderError::InvalidSpacing(format!(
                "step must be at least 1, got {}",
                self.step
            )));
        }
        Ok(())
    }

    /// The first `n` ranks. Fails if the last one would overflow.
    pub fn ranks(&self, n: usize) -> Result<Vec<i64>> {
        self.validate()?;
        let mut out = Vec::with_capacity(n);
        let mut next = Some(self.start);
        for _ in 0..n {
            let rank = next.ok_or_else(|| {
                OrderError::InvalidSpacing(format!(
                    "{n} ranks from {} by {} overflow",
                    self.start, self.step
                ))
            })?;
            out.push(rank);
            next = rank.checked_add(self.step);
        }
        Ok(out)
    }
}

// ---------------------------------------------------------------------------
// RenumberOutcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankAssignment {
    pub id: EntityId,
    pub rank: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenumberOutcome {
    pub group: GroupKey,
    /// Requested ids after de-duplication.
    pub requested_ids: Vec<EntityId>,
    /// Ranks actually written, in requested order.
    pub assignments: Vec<RankAssignment>,
    /// Missing entities or entities outside the group.
    pub skipped_ids: Vec<EntityId>,
    /// Members whose write failed.
    pub failed_ids: Vec<EntityId>,
}

impl RenumberOutcome {
    pub fn persisted_count(&self) -> usize {
        self.assignments.len()
    }

    pub fn persisted_ids(&self) -> Vec<EntityId> {
        self.assignments.iter().map(|a| a.id).collect()
    }

    /// Some member's write failed. Skipped ids do not count.
    pub fn has_failures(&self) -> bool {
        !self.failed_ids.is_empty()
    }
}

/// De-duplicate preserving first occurrence.
pub fn dedup_ids(ids: &[EntityId]) -> Vec<EntityId> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

// ---------------------------------------------------------------------------
// OrderWriter
// ---------------------------------------------------------------------------

/// Writes manual orders through injected collaborators.
pub struct OrderWriter<'a> {
    store: &'a dyn OrderStore,
    source: &'a dyn EntitySource,
    cache: Option<&'a dyn CacheInvalidator>,
    observers: Vec<&'a dyn OrderObserver>,
    spacing: RankSpacing,
}

impl<'a> OrderWriter<'a> {
    pub fn new(store: &'a dyn OrderStore, source: &'a dyn EntitySource) -> Self {
        Self {
            store,
            source,
            cache: None,
            observers: Vec::new(),
            spacing: RankSpacing::default(),
        }
    }

    pub fn with_cache(mut self, cache: &'a dyn CacheInvalidator) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_observer(mut self, observer: &'a dyn OrderObserver) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn with_spacing(mut self, spacing: RankSpacing) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn spacing(&self) -> RankSpacing {
        self.spacing
    }

    /// Renumber `group` so its members follow `requested`.
    ///
    /// Fails with `InvalidGroup` when the group's collection is unknown and
    /// with `EmptyOrder` when no requested id belongs to the group. Per-id
    /// write failures are reported in the outcome, not as an error.
    pub fn renumber(
        &self,
        group: &GroupKey,
        requested: &[EntityId],
        actor: Option<u64>,
    ) -> Result<RenumberOutcome> {
        self.spacing.validate()?;

        if !self.source.has_collection(group)? {
            return Err(OrderError::InvalidGroup(format!(
                "unknown {} collection '{}'",
                group.kind(),
                group.collection()
            )));
        }

        let requested_ids = dedup_ids(requested);
        if requested_ids.is_empty() {
            return Err(OrderError::EmptyOrder);
        }

        let kind = group.kind();
        let mut members = Vec::with_capacity(requested_ids.len());
        let mut skipped_ids = Vec::new();
        for &id in &requested_ids {
            match self.source.entity(kind, id)? {
                Some(e) if e.group == *group => members.push(id),
                Some(e) => {
                    tracing::debug!(id, group = %group, actual = %e.group, "skipping id outside group");
                    skipped_ids.push(id);
                }
                None => {
                    tracing::debug!(id, group = %group, "skipping missing id");
                    skipped_ids.push(id);
                }
            }
        }
        if members.is_empty() {
            return Err(OrderError::EmptyOrder);
        }

        let ranks = self.spacing.ranks(members.len())?;
        let mut assignments = Vec::with_capacity(members.len());
        let mut failed_ids = Vec::new();
        for &id in &members {
            // A failed write does not consume a rank.
            let rank = ranks[assignments.len()];
            match self.store.persist_order(kind, id, rank) {
                Ok(()) => assignments.push(RankAssignment { id, rank }),
                Err(e) => {
                    tracing::warn!(id, rank, group = %group, "failed to persist rank: {e}");
                    failed_ids.push(id);
                }
            }
        }

        if let Some(cache) = self.cache {
            if let Err(e) = cache.invalidate(&members, group) {
                tracing::warn!(group = %group, "cache invalidation failed: {e}");
            }
        }

        let outcome = RenumberOutcome {
            group: group.clone(),
            requested_ids,
            assignments,
            skipped_ids,
            failed_ids,
        };

        tracing::info!(
            group = %group,
            persisted = outcome.persisted_count(),
            skipped = outcome.skipped_ids.len(),
            failed = outcome.failed_ids.len(),
            "renumbered group"
        );

        if !outcome.assignments.is_empty() {
            let event = OrderUpdated {
                group: group.clone(),
                requested_ids: outcome.requested_ids.clone(),
                persisted_ids: outcome.persisted_ids(),
                actor,
                at: Utc::now(),
            };
            for observer in &self.observers {
                observer.order_updated(&event);
            }
        }

        Ok(outcome)
    }

    /// Set one entity's manual order directly (the numeric edit field).
    pub fn set_single(&self, kind: EntityKind, id: EntityId, value: i64) -> Result<OrderableEntity> {
        let entity = self
            .source
            .entity(kind, id)?
            .ok_or(OrderError::EntityNotFound { kind, id })?;
        self.store.persist_order(kind, id, value)?;

        if let Some(cache) = self.cache {
            if let Err(e) = cache.invalidate(&[id], &entity.group) {
                tracing::warn!(group = %entity.group, "cache invalidation failed: {e}");
            }
        }
        tracing::info!(%kind, id, value, "set manual order");
        Ok(entity)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
