//! Observer server startup helper for embedding in the engine.
//!
//! Provides [`spawn_observer`] which binds the listener eagerly and then
//! serves the Observer API on a background Tokio task, so the scheduler
//! only starts once the port is known to be ours.
//!
//! # Usage
//!
//! ```rust,ignore
//! use geopolitics_observer::startup::spawn_observer;
//!
//! let handle = spawn_observer(&config.observer, state).await?;
//! // The server is now accepting connections.
//! ```

use std::sync::Arc;

use geopolitics_core::config::ObserverConfig;
use tokio::task::JoinHandle;

use crate::server::{self, ServerConfig, ServerError};
use crate::state::AppState;

/// Errors that can occur when spawning the Observer server.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The server failed to bind or start.
    #[error("server start error: {0}")]
    Server(#[from] ServerError),
}

/// Bind the Observer server and serve it on a background task.
///
/// The returned [`JoinHandle`] completes only if the server exits with an
/// error, which is logged.
///
/// # Errors
///
/// Returns [`StartupError::Server`] if the configured address is invalid or
/// cannot be bound.
pub async fn spawn_observer(
    config: &ObserverConfig,
    state: Arc<AppState>,
) -> Result<JoinHandle<()>, StartupError> {
    let listener = server::bind(&ServerConfig::from(config)).await?;

    let handle = tokio::spawn(async move {
        if let Err(e) = server::serve(listener, state).await {
            tracing::error!(error = %e, "Observer server exited with error");
        }
    });

    tracing::info!(host = %config.host, port = config.port, "Observer server spawned on background task");

    Ok(handle)
}
