use crate::types::{EntityId, GroupKey};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Published after a renumber persisted at least one rank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderUpdated {
    pub group: GroupKey,
    /// Caller's sequence after de-duplication.
    pub requested_ids: Vec<EntityId>,
    pub persisted_ids: Vec<EntityId>,
    pub actor: Option<u64>,
    pub at: DateTime<Utc>,
}

/// Fire-and-forget hook for order updates. Implementations must not block.
pub trait OrderObserver: Send + Sync {
    fn order_updated(&self, event: &OrderUpdated);
}

/// Adapts a closure into an [`OrderObserver`].
pub struct FnObserver<F>(pub F);

impl<F> OrderObserver for FnObserver<F>
where
    F: Fn(&OrderUpdated) + Send + Sync,
{
    fn order_updated(&self, event: &OrderUpdated) {
        (self.0)(event)
    }
}

/// Records every update through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl OrderObserver for LogObserver {
    fn order_updated(&self, event: &OrderUpdated) {
        tracing::info!(
            group = %event.group,
            persisted = event.persisted_ids.len(),
            requested = event.requested_ids.len(),
            actor = ?event.actor,
            "order updated"
        );
    }
}
