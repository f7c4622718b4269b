//! Axum router construction for the Observer API.
//!
//! Assembles all routes (REST + `WebSocket`) into a single [`Router`]
//! with CORS middleware enabled for cross-origin client access.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::admin;
use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router for the Observer server.
///
/// The router includes:
/// - `GET /` -- minimal HTML status page
/// - `GET /ws`, `GET /api/ws` -- `WebSocket` snapshots and control commands
/// - `GET /api/state`, `GET /game-state` -- current world snapshot
/// - `GET /api/nations/playable` -- nation-selection list
/// - `GET /api/alliances` -- static alliances
/// - `GET /api/economy/trade` -- trade impact projection
/// - `GET /api/economy/sanction` -- sanction impact projection
/// - `GET /api/status` -- engine counters
/// - `POST /api/admin/state` -- raw state merge (gated)
///
/// CORS allows any origin; the game client is served from elsewhere.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Status page
        .route("/", get(handlers::index))
        // WebSocket
        .route("/ws", get(ws::ws_observer))
        .route("/api/ws", get(ws::ws_observer))
        // REST API
        .route("/api/state", get(handlers::get_state))
        .route("/game-state", get(handlers::get_state))
        .route("/api/nations/playable", get(handlers::playable_nations))
        .route("/api/alliances", get(handlers::list_alliances))
        .route("/api/economy/trade", get(handlers::trade_impact))
        .route("/api/economy/sanction", get(handlers::sanction_impact))
        .route("/api/status", get(handlers::get_status))
        // Admin
        .route("/api/admin/state", post(admin::merge_state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
