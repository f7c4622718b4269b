//! Error types for the Observer API server.
//!
//! [`ObserverError`] unifies all failure modes into a single enum that
//! can be converted into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use geopolitics_core::simulation::PublishError;
use geopolitics_core::world::MergeError;

/// Errors that can occur in the Observer API layer.
#[derive(Debug, thiserror::Error)]
pub enum ObserverError {
    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// A serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An invalid query parameter was provided.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// The request body is unusable.
    #[error("invalid body: {0}")]
    InvalidBody(String),

    /// The endpoint is disabled in this deployment.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// A raw state merge was rejected; the world is unchanged.
    #[error("merge rejected: {0}")]
    Merge(#[from] MergeError),

    /// The change was applied but could not be broadcast.
    #[error("broadcast failed: {0}")]
    Publish(#[from] PublishError),
}

impl IntoResponse for ObserverError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidQuery(_) | Self::InvalidBody(_) | Self::Merge(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Serialization(_) | Self::Publish(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
