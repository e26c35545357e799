pub mod config;
pub mod events;
pub mod posts;
pub mod terms;

use axum::http::HeaderMap;
use axum::Json;
use yak_order_core::autosort::{read_ordered, OrderedRead, ReadRequest};
use yak_order_core::config::Settings;
use yak_order_core::error::OrderError;
use yak_order_core::observer::LogObserver;
use yak_order_core::store::{Catalog, FileStore};
use yak_order_core::types::{EntityId, EntityKind, GroupKey};
use yak_order_core::writer::{OrderWriter, RenumberOutcome};

use crate::error::AppError;
use crate::state::AppState;

/// Optional header naming the user behind a write.
pub const ACTOR_HEADER: &str = "x-yak-actor";

pub(crate) fn actor_from(headers: &HeaderMap) -> Result<Option<u64>, AppError> {
    let Some(raw) = headers.get(ACTOR_HEADER) else {
        return Ok(None);
    };
    raw.to_str()
        .ok()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map(Some)
        .ok_or_else(|| AppError::bad_request(format!("{ACTOR_HEADER} must be a numeric user id")))
}

/// Serve a gated read. Resolved results go through the shared cache.
pub(crate) async fn read_collection(
    app: &AppState,
    request: ReadRequest,
) -> Result<Json<OrderedRead>, AppError> {
    let root = app.root.clone();
    let cache = app.cache.clone();
    let read = tokio::task::spawn_blocking(move || {
        let settings = Settings::load(&root)?;
        let catalog = Catalog::load(&root)?;
        let known = match request.filter.kind() {
            EntityKind::Term => catalog.taxonomy(request.filter.collection()).is_some(),
            EntityKind::Post => catalog.post_type(request.filter.collection()).is_some(),
        };
        if !known {
            return Err(OrderError::InvalidGroup(format!(
                "unknown {} collection '{}'",
                request.filter.kind(),
                request.filter.collection()
            )));
        }
        let store = FileStore::new(root);
        read_ordered(&store, &store, &settings, &request, Some(cache.as_ref()))
    })
    .await
    .map_err(AppError::join)??;
    Ok(Json(read))
}

/// Renumber `group` through the file store and broadcast the update.
pub(crate) async fn renumber_group(
    app: &AppState,
    group: GroupKey,
    order: Vec<EntityId>,
    actor: Option<u64>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let cache = app.cache.clone();
    let broadcaster = app.broadcaster();
    let write_lock = app.write_lock.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        let _guard = write_lock
            .lock()
            .map_err(|_| OrderError::LockPoisoned("write"))?;
        let settings = Settings::load(&root)?;
        settings.ensure_enabled(&group)?;
        let store = FileStore::new(root.clone());
        let log = LogObserver;
        OrderWriter::new(&store, &store)
            .with_cache(cache.as_ref())
            .with_observer(&broadcaster)
            .with_observer(&log)
            .with_spacing(settings.spacing()?)
            .renumber(&group, &order, actor)
    })
    .await
    .map_err(AppError::join)??;
    Ok(Json(outcome_json(&outcome)))
}

pub(crate) fn outcome_json(outcome: &RenumberOutcome) -> serde_json::Value {
    serde_json::json!({
        "group": outcome.group,
        "saved": outcome.persisted_count(),
        "requested": outcome.requested_ids.len(),
        "skipped": outcome.skipped_ids.len(),
        "failed": outcome.failed_ids.len(),
        "assignments": outcome.assignments,
    })
}
