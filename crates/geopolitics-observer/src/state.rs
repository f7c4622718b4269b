//! Shared application state for the Observer API server.
//!
//! [`AppState`] gives handlers the simulation handle (for snapshots,
//! commands, and merges), the broadcast hub (for registering connections),
//! and the read-only catalog the engine bootstrapped from.

use std::sync::Arc;

use geopolitics_core::catalog::Catalog;
use geopolitics_core::economy::EconomyModel;
use geopolitics_core::simulation::Simulation;

use crate::hub::BroadcastHub;

/// State shared by every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The single-writer world handle.
    pub sim: Arc<Simulation>,
    /// Connection registry. Also the simulation's publisher.
    pub hub: Arc<BroadcastHub>,
    /// Static catalog for the playable-nations and alliance queries.
    pub catalog: Arc<Catalog>,
    /// Economy model used for read-only projections.
    pub economy: EconomyModel,
    /// Whether `POST /api/admin/state` is served.
    pub admin_enabled: bool,
}

impl AppState {
    /// Bundle the shared handles.
    pub const fn new(
        sim: Arc<Simulation>,
        hub: Arc<BroadcastHub>,
        catalog: Arc<Catalog>,
        economy: EconomyModel,
        admin_enabled: bool,
    ) -> Self {
        Self {
            sim,
            hub,
            catalog,
            economy,
            admin_enabled,
        }
    }
}
