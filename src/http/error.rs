//! Mapping of block errors to HTTP responses.
//!
//! Client input errors become 400, missing instances/blocks 404, store
//! outages 503 and store deadlines 504. The body is always
//! `{"message": "..."}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::blocks::error::{BlockError, StoreError};

impl BlockError {
    /// HTTP status reported for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            BlockError::EmptyBody
            | BlockError::MalformedRequest(_)
            | BlockError::MissingField(_)
            | BlockError::InvalidSyntax(_) => StatusCode::BAD_REQUEST,
            BlockError::Store(StoreError::InstanceNotFound(_) | StoreError::BlockNotFound { .. }) => {
                StatusCode::NOT_FOUND
            }
            BlockError::Store(StoreError::InvalidBlock(_)) => StatusCode::BAD_REQUEST,
            BlockError::Store(StoreError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            BlockError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

impl IntoResponse for BlockError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(status = %status, error = %self, "Block operation failed");
        } else {
            tracing::debug!(status = %status, error = %self, "Block request rejected");
        }
        (status, Json(json!({ "message": self.to_string() }))).into_response()
    }
}
