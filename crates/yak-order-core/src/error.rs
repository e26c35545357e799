use crate::types::{EntityId, EntityKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("not initialized: run 'yak-order init'")]
    NotInitialized,

    #[error("order list is empty: nothing to reorder")]
    EmptyOrder,

    #[error("invalid group: {0}")]
    InvalidGroup(String),

    #[error("invalid rank spacing: {0}")]
    InvalidSpacing(String),

    #[error("invalid key '{0}': must be lowercase alphanumeric with hyphens or underscores")]
    InvalidKey(String),

    #[error("{kind} not found: {id}")]
    EntityNotFound { kind: EntityKind, id: EntityId },

    #[error("collection already exists: {0}")]
    CollectionExists(String),

    #[error("store lock poisoned ({0})")]
    LockPoisoned(&'static str),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, OrderError>;
