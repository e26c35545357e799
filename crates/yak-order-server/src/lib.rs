pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{get, put};
use axum::Router;
use std::path::PathBuf;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the axum Router for a project root.
/// Used by `serve()` and available for integration testing.
pub fn build_router(root: PathBuf) -> Router {
    router(state::AppState::new(root))
}

/// Build the router over existing state, so callers can subscribe to
/// `event_tx` before requests arrive.
pub fn router(app_state: state::AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Events (SSE)
        .route("/api/events", get(routes::events::sse_events))
        // Config
        .route("/api/config", get(routes::config::get_config))
        // Terms
        .route(
            "/api/taxonomies/{taxonomy}/terms",
            get(routes::terms::list_terms),
        )
        .route(
            "/api/taxonomies/{taxonomy}/parents",
            get(routes::terms::list_parents),
        )
        .route(
            "/api/taxonomies/{taxonomy}/order",
            put(routes::terms::reorder_terms),
        )
        .route("/api/terms/{id}/order", put(routes::terms::set_term_order))
        // Posts
        .route(
            "/api/post-types/{post_type}/posts",
            get(routes::posts::list_posts),
        )
        .route(
            "/api/post-types/{post_type}/order",
            put(routes::posts::reorder_posts),
        )
        .route("/api/posts/{id}/order", put(routes::posts::set_post_order))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

/// Start the ordering server on `port`.
pub async fn serve(root: PathBuf, port: u16, open_browser: bool) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
    serve_on(root, listener, open_browser).await
}

/// Start the ordering server on a pre-bound listener.
///
/// The caller can read the actual port before starting (useful when
/// `port = 0` and the OS picks a free port).
pub async fn serve_on(
    root: PathBuf,
    listener: tokio::net::TcpListener,
    open_browser: bool,
) -> anyhow::Result<()> {
    let actual_port = listener.local_addr()?.port();
    let app = build_router(root);

    tracing::info!("yak-order server listening on http://localhost:{actual_port}");

    if open_browser {
        let url = format!("http://localhost:{actual_port}/api/config");
        if let Err(e) = open::that(&url) {
            tracing::warn!("failed to open browser: {e}");
        }
    }

    axum::serve(listener, app).await?;
    Ok(())
}
