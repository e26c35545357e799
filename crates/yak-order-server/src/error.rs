use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use yak_order_core::error::OrderError;

/// Private sentinel carrying an explicit 400 for malformed transport input
/// (headers, query values) that never reaches the core.
#[derive(Debug)]
struct BadRequestError(String);

impl std::fmt::Display for BadRequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for BadRequestError {}

// ---------------------------------------------------------------------------
// AppError
// ---------------------------------------------------------------------------

/// Unified error type for HTTP responses.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(BadRequestError(msg.into()).into())
    }

    pub(crate) fn join(e: tokio::task::JoinError) -> Self {
        Self(anyhow::anyhow!("task join error: {e}"))
    }
}

fn status_for(e: &OrderError) -> StatusCode {
    match e {
        OrderError::EmptyOrder
        | OrderError::InvalidGroup(_)
        | OrderError::InvalidSpacing(_)
        | OrderError::InvalidKey(_)
        | OrderError::NotInitialized => StatusCode::BAD_REQUEST,
        OrderError::EntityNotFound { .. } => StatusCode::NOT_FOUND,
        OrderError::CollectionExists(_) => StatusCode::CONFLICT,
        OrderError::LockPoisoned(_) | OrderError::Io(_) | OrderError::Yaml(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = if self.0.downcast_ref::<BadRequestError>().is_some() {
            StatusCode::BAD_REQUEST
        } else if let Some(e) = self.0.downcast_ref::<OrderError>() {
            status_for(e)
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        if status.is_server_error() {
            tracing::warn!("request failed: {:#}", self.0);
        }

        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
