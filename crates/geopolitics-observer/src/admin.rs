//! Raw state merge for trusted deployments.
//!
//! `POST /api/admin/state` takes a JSON object whose keys are a subset of
//! `date`, `speed`, `paused`, `nations`, and `events`, and merges it into
//! the live world. Other keys are ignored. The merge is all-or-nothing: a
//! value of the wrong shape rejects the whole body and the world is
//! untouched. An accepted merge is broadcast like any other change.
//!
//! The route answers `403` unless `observer.admin_api_enabled` is set.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::response::IntoResponse;
use serde_json::Value;
use tracing::info;

use crate::error::ObserverError;
use crate::state::AppState;

/// Merge a raw partial world into the live state.
///
/// # Errors
///
/// - [`ObserverError::Forbidden`] when the endpoint is disabled
/// - [`ObserverError::InvalidBody`] when the body is not a JSON object
/// - [`ObserverError::Merge`] when a key or value is rejected
/// - [`ObserverError::Publish`] when the merged state could not be broadcast
pub async fn merge_state(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<impl IntoResponse, ObserverError> {
    if !state.admin_enabled {
        return Err(ObserverError::Forbidden(String::from(
            "state merge is disabled",
        )));
    }

    let value: Value = serde_json::from_slice(&body)
        .map_err(|e| ObserverError::InvalidBody(format!("not JSON: {e}")))?;
    let Value::Object(patch) = value else {
        return Err(ObserverError::InvalidBody(String::from(
            "expected a JSON object",
        )));
    };

    let (applied, delivered) = state
        .sim
        .mutate(|world| world.merge_raw(&patch).map_err(ObserverError::from))
        .await?;

    info!(keys = ?applied, delivered, "Merged raw state");

    Ok(Json(serde_json::json!({
        "applied": applied,
        "delivered": delivered,
    })))
}
