//! Observer API server for the Geopolitics 2025 simulation.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **`WebSocket` endpoint** (`/ws`) that pushes a full world snapshot
//!   after every change and accepts `pause` / `resume` / `set_speed`
//!   commands
//! - **REST endpoints** for the current snapshot, the nation-selection
//!   list, alliances, and trade and sanction projections
//! - **Admin endpoint** for merging a raw partial world (off by default)
//! - **Minimal HTML page** (`GET /`) showing the calendar and links
//!
//! # Architecture
//!
//! The [`BroadcastHub`] is the simulation's snapshot publisher. Every tick
//! and every accepted command is published while the world lock is held, so
//! all observers see snapshots in the same order. Each connection drains
//! its own bounded queue; one that falls behind is evicted instead of
//! slowing anyone else down.
//!
//! [`BroadcastHub`]: hub::BroadcastHub

pub mod admin;
pub mod error;
pub mod handlers;
pub mod hub;
pub mod router;
pub mod server;
pub mod startup;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use hub::BroadcastHub;
pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
pub use startup::{StartupError, spawn_observer};
pub use state::AppState;
