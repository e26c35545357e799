use axum::extract::State;
use axum::Json;
use yak_order_core::config::Settings;

use crate::error::AppError;
use crate::state::AppState;

/// GET /api/config: current ordering settings.
pub async fn get_config(State(app): State<AppState>) -> Result<Json<Settings>, AppError> {
    let root = app.root.clone();
    let settings = tokio::task::spawn_blocking(move || Settings::load(&root))
        .await
        .map_err(AppError::join)??;
    Ok(Json(settings))
}
