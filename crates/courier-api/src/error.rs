use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

use courier_types::error::Error;

/// Maps core failure kinds to HTTP statuses and stable error bodies.
/// Store faults are logged here and never leak detail to the caller.
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            Error::Conflict => (StatusCode::CONFLICT, "already exists".to_string()),
            Error::NotFound => (StatusCode::NOT_FOUND, "not found".to_string()),
            // One body for both: callers must not be able to tell a bad
            // token apart from a missing one, or probe which part failed.
            Error::Unauthenticated | Error::InvalidToken => {
                (StatusCode::UNAUTHORIZED, "authentication required".to_string())
            }
            Error::Forbidden => (StatusCode::FORBIDDEN, "access denied".to_string()),
            Error::Validation(msg) => (StatusCode::BAD_REQUEST, format!("invalid request: {msg}")),
            Error::Store(e) => {
                error!("store failure: {e:#}");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
