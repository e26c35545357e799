use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;
use yak_order_core::autosort::{OrderedRead, ReadContext, ReadRequest};
use yak_order_core::types::{CollectionFilter, EntityId, EntityKind, GroupKey};

use super::terms::{set_single, SetOrderBody};
use super::{actor_from, read_collection, renumber_group};
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct PostQuery {
    #[serde(default)]
    pub context: ReadContext,
    #[serde(default)]
    pub ignore_order: bool,
    pub orderby: Option<String>,
}

/// GET /api/post-types/{post_type}/posts
pub async fn list_posts(
    State(app): State<AppState>,
    Path(post_type): Path<String>,
    Query(query): Query<PostQuery>,
) -> Result<Json<OrderedRead>, AppError> {
    let request = ReadRequest {
        filter: CollectionFilter::ByCollectionType { post_type },
        context: query.context,
        ignore_order: query.ignore_order,
        orderby: query.orderby,
    };
    read_collection(&app, request).await
}

#[derive(Debug, Deserialize)]
pub struct ReorderPostsBody {
    pub order: Vec<EntityId>,
}

/// PUT /api/post-types/{post_type}/order
pub async fn reorder_posts(
    State(app): State<AppState>,
    Path(post_type): Path<String>,
    headers: HeaderMap,
    Json(body): Json<ReorderPostsBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let actor = actor_from(&headers)?;
    renumber_group(&app, GroupKey::post_type(post_type), body.order, actor).await
}

/// PUT /api/posts/{id}/order: set one post's menu order directly.
pub async fn set_post_order(
    State(app): State<AppState>,
    Path(id): Path<EntityId>,
    Json(body): Json<SetOrderBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let result = tokio::task::spawn_blocking(move || {
        set_single(&app, EntityKind::Post, id, body.value)
    })
    .await
    .map_err(AppError::join)??;
    Ok(Json(result))
}
