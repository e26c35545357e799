use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;
use yak_order_core::autosort::{OrderedRead, ReadContext, ReadRequest};
use yak_order_core::config::Settings;
use yak_order_core::eligibility::{eligible_parents, ParentChoice};
use yak_order_core::error::OrderError;
use yak_order_core::store::{Catalog, EntitySource, FileStore, MemoryStore};
use yak_order_core::types::{CollectionFilter, EntityId, EntityKind, GroupKey, ROOT_PARENT};
use yak_order_core::writer::OrderWriter;

use super::{actor_from, read_collection, renumber_group};
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct TermQuery {
    /// Restrict to one sibling group; all terms of the taxonomy when absent.
    pub parent: Option<EntityId>,
    #[serde(default)]
    pub context: ReadContext,
    #[serde(default)]
    pub ignore_order: bool,
    pub orderby: Option<String>,
}

/// GET /api/taxonomies/{taxonomy}/terms: terms, resolved when autosort applies.
pub async fn list_terms(
    State(app): State<AppState>,
    Path(taxonomy): Path<String>,
    Query(query): Query<TermQuery>,
) -> Result<Json<OrderedRead>, AppError> {
    let filter = match query.parent {
        Some(parent) => CollectionFilter::ByParent { taxonomy, parent },
        None => CollectionFilter::ByTaxonomy { taxonomy },
    };
    let request = ReadRequest {
        filter,
        context: query.context,
        ignore_order: query.ignore_order,
        orderby: query.orderby,
    };
    read_collection(&app, request).await
}

/// GET /api/taxonomies/{taxonomy}/parents: sibling groups worth reordering.
pub async fn list_parents(
    State(app): State<AppState>,
    Path(taxonomy): Path<String>,
) -> Result<Json<Vec<ParentChoice>>, AppError> {
    let root = app.root.clone();
    let choices = tokio::task::spawn_blocking(move || {
        let settings = Settings::load(&root)?;
        settings.ensure_enabled(&GroupKey::term(taxonomy.as_str(), ROOT_PARENT))?;
        let catalog = Catalog::load(&root)?;
        if catalog.taxonomy(&taxonomy).is_none() {
            return Err(OrderError::InvalidGroup(format!(
                "unknown term collection '{taxonomy}'"
            )));
        }
        let store = MemoryStore::new(catalog);
        eligible_parents(&store, &store, &taxonomy, settings.secondary_orderby)
    })
    .await
    .map_err(AppError::join)??;
    Ok(Json(choices))
}

#[derive(Debug, Deserialize)]
pub struct ReorderTermsBody {
    #[serde(default)]
    pub parent: EntityId,
    pub order: Vec<EntityId>,
}

/// PUT /api/taxonomies/{taxonomy}/order: renumber one sibling group.
pub async fn reorder_terms(
    State(app): State<AppState>,
    Path(taxonomy): Path<String>,
    headers: HeaderMap,
    Json(body): Json<ReorderTermsBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let actor = actor_from(&headers)?;
    let group = GroupKey::term(taxonomy, body.parent);
    renumber_group(&app, group, body.order, actor).await
}

#[derive(Debug, Deserialize)]
pub struct SetOrderBody {
    pub value: i64,
}

/// PUT /api/terms/{id}/order: set one term's manual order directly.
pub async fn set_term_order(
    State(app): State<AppState>,
    Path(id): Path<EntityId>,
    Json(body): Json<SetOrderBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let result = tokio::task::spawn_blocking(move || {
        set_single(&app, EntityKind::Term, id, body.value)
    })
    .await
    .map_err(AppError::join)??;
    Ok(Json(result))
}

pub(crate) fn set_single(
    app: &AppState,
    kind: EntityKind,
    id: EntityId,
    value: i64,
) -> Result<serde_json::Value, OrderError> {
    let _guard = app
        .write_lock
        .lock()
        .map_err(|_| OrderError::LockPoisoned("write"))?;
    let settings = Settings::load(&app.root)?;
    let store = FileStore::new(&app.root);
    let entity = store
        .entity(kind, id)?
        .ok_or(OrderError::EntityNotFound { kind, id })?;
    settings.ensure_enabled(&entity.group)?;
    let entity = OrderWriter::new(&store, &store)
        .with_cache(app.cache.as_ref())
        .set_single(kind, id, value)?;
    Ok(serde_json::json!({
        "id": entity.id,
        "name": entity.name,
        "group": entity.group,
        "manual_order": value,
    }))
}
