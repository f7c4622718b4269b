//! REST API endpoint handlers for the Observer server.
//!
//! Every read goes through the simulation handle, so it sees a complete
//! snapshot and never a half-applied tick.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML status page |
//! | `GET` | `/api/state` | Current world snapshot (also `/game-state`) |
//! | `GET` | `/api/nations/playable` | Nation-selection list |
//! | `GET` | `/api/alliances` | Static alliances |
//! | `GET` | `/api/economy/trade?a=&b=` | Trade impact projection |
//! | `GET` | `/api/economy/sanction?imposer=&target=` | Sanction impact projection |
//! | `GET` | `/api/status` | Engine counters |

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse};
use geopolitics_types::{Nation, NationId, WorldSnapshot};
use serde::Deserialize;

use crate::error::ObserverError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query parameter structs
// ---------------------------------------------------------------------------

/// Query parameters for `GET /api/economy/trade`.
#[derive(Debug, Deserialize)]
pub struct TradeQuery {
    /// First nation, by name or numeric id.
    pub a: String,
    /// Second nation, by name or numeric id.
    pub b: String,
}

/// Query parameters for `GET /api/economy/sanction`.
#[derive(Debug, Deserialize)]
pub struct SanctionQuery {
    /// Sanctioning nation, by name or numeric id.
    pub imposer: String,
    /// Sanctioned nation, by name or numeric id.
    pub target: String,
}

// ---------------------------------------------------------------------------
// GET / -- minimal HTML status page
// ---------------------------------------------------------------------------

/// Serve a minimal HTML page showing the calendar and API links.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.sim.snapshot().await;
    let date = &snapshot.date;
    let speed = snapshot.speed.as_str();
    let status = if snapshot.paused { "PAUSED" } else { "RUNNING" };
    let nation_count = snapshot.nations.len();
    let event_count = snapshot.events.len();
    let connections = state.hub.connection_count();

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Geopolitics 2025 Observer</title>
    <style>
        body {{
            background: #0d1117;
            color: #c9d1d9;
            font-family: 'Cascadia Code', 'Fira Code', 'Consolas', monospace;
            padding: 2rem;
            max-width: 800px;
            margin: 0 auto;
        }}
        h1 {{ color: #58a6ff; margin-bottom: 0.25rem; }}
        .metric {{
            display: inline-block;
            background: #161b22;
            border: 1px solid #30363d;
            border-radius: 6px;
            padding: 1rem 1.5rem;
            margin: 0.5rem 0.5rem 0.5rem 0;
            min-width: 120px;
        }}
        .metric .label {{ color: #8b949e; font-size: 0.85rem; }}
        .metric .value {{ color: #58a6ff; font-size: 1.5rem; font-weight: bold; }}
        a {{ color: #58a6ff; text-decoration: none; }}
        ul {{ list-style: none; padding: 0; }}
        li {{ padding: 0.3rem 0; }}
        .status {{ color: #3fb950; font-weight: bold; }}
    </style>
</head>
<body>
    <h1>Geopolitics 2025</h1>
    <p>Status: <span class="status">{status}</span></p>

    <div>
        <div class="metric"><div class="label">Date</div><div class="value">{date}</div></div>
        <div class="metric"><div class="label">Speed</div><div class="value">{speed}</div></div>
        <div class="metric"><div class="label">Nations</div><div class="value">{nation_count}</div></div>
        <div class="metric"><div class="label">Events</div><div class="value">{event_count}</div></div>
        <div class="metric"><div class="label">Observers</div><div class="value">{connections}</div></div>
    </div>

    <h2>API Endpoints</h2>
    <ul>
        <li><a href="/api/state">/api/state</a> -- Current world snapshot</li>
        <li><a href="/api/nations/playable">/api/nations/playable</a> -- Playable nations</li>
        <li><a href="/api/alliances">/api/alliances</a> -- Alliances</li>
        <li><a href="/api/status">/api/status</a> -- Engine counters</li>
        <li><code>ws://host:port/ws</code> -- Live snapshots and control commands</li>
    </ul>
</body>
</html>"#
    ))
}

// ---------------------------------------------------------------------------
// Snapshot and catalog queries
// ---------------------------------------------------------------------------

/// Return the current world snapshot.
pub async fn get_state(State(state): State<Arc<AppState>>) -> Json<WorldSnapshot> {
    Json(state.sim.snapshot().await)
}

/// Return the nation-selection list with difficulty tiers.
pub async fn playable_nations(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let nations = state.catalog.playable_nations();
    Json(serde_json::json!({
        "count": nations.len(),
        "nations": nations,
    }))
}

/// Return the static alliances.
pub async fn list_alliances(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let alliances = state.catalog.alliances();
    Json(serde_json::json!({
        "count": alliances.len(),
        "alliances": alliances,
    }))
}

// ---------------------------------------------------------------------------
// Economy projections
// ---------------------------------------------------------------------------

/// Find a live nation by numeric id or case-insensitive name.
fn find_nation(snapshot: &WorldSnapshot, key: &str) -> Result<Nation, ObserverError> {
    let key = key.trim();
    let by_id = key.parse::<u32>().ok().map(NationId);
    snapshot
        .nations
        .iter()
        .find(|n| Some(n.id) == by_id || n.name.eq_ignore_ascii_case(key))
        .cloned()
        .ok_or_else(|| ObserverError::NotFound(format!("nation {key:?}")))
}

fn distinct(a: &Nation, b: &Nation) -> Result<(), ObserverError> {
    if a.id == b.id {
        Err(ObserverError::InvalidQuery(format!(
            "{} cannot be both sides",
            a.name
        )))
    } else {
        Ok(())
    }
}

/// Project the effect of trade between two live nations.
pub async fn trade_impact(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TradeQuery>,
) -> Result<impl IntoResponse, ObserverError> {
    let snapshot = state.sim.snapshot().await;
    let a = find_nation(&snapshot, &query.a)?;
    let b = find_nation(&snapshot, &query.b)?;
    distinct(&a, &b)?;

    let impact = state
        .economy
        .calculate_trade_impact(&a, &b, &mut rand::rng());
    Ok(Json(serde_json::json!({
        "a": a.name,
        "b": b.name,
        "impact": impact,
    })))
}

/// Project the effect of one live nation sanctioning another.
pub async fn sanction_impact(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SanctionQuery>,
) -> Result<impl IntoResponse, ObserverError> {
    let snapshot = state.sim.snapshot().await;
    let imposer = find_nation(&snapshot, &query.imposer)?;
    let target = find_nation(&snapshot, &query.target)?;
    distinct(&imposer, &target)?;

    let impact = state
        .economy
        .apply_sanction(&imposer, &target, &mut rand::rng());
    Ok(Json(serde_json::json!({
        "imposer": imposer.name,
        "target": target.name,
        "impact": impact,
    })))
}

// ---------------------------------------------------------------------------
// GET /api/status -- engine counters
// ---------------------------------------------------------------------------

/// Return the calendar, run state, and engine counters.
pub async fn get_status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let (date, speed, paused) = state
        .sim
        .with_world(|world| (world.clock().display(), world.speed(), world.is_paused()))
        .await;

    Json(serde_json::json!({
        "date": date,
        "speed": speed,
        "paused": paused,
        "connections": state.hub.connection_count(),
        "evicted_connections": state.hub.evicted_count(),
        "engine": state.sim.stats().report(),
    }))
}
