//! Shared type definitions for the Geopolitics 2025 simulation.
//!
//! This crate is the single source of truth for every type that crosses a
//! crate boundary: the catalog records the engine bootstraps from, the world
//! snapshot pushed to observers, and the control commands observers send
//! back. Types flow downstream to `TypeScript` via `ts-rs` for the dashboard.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe identifier wrappers
//! - [`enums`] -- Speed, event category, difficulty, personality, alliance type
//! - [`structs`] -- Nations, leaders, alliances, events, snapshots
//! - [`commands`] -- Inbound control commands from observers

pub mod commands;
pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use commands::Command;
pub use enums::{AllianceType, Difficulty, EventCategory, GameSpeed, PersonalityType};
pub use ids::{AllianceId, ConnectionId, LeaderId, NationId};
pub use structs::{
    Alliance, GameEvent, Leader, Nation, PlayableNation, SanctionImpact, TradeImpact,
    WorldSnapshot,
};
