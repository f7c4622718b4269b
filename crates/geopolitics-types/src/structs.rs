//! Core entity structs for the Geopolitics 2025 simulation.
//!
//! Catalog records ([`Nation`], [`Leader`], [`Alliance`]) arrive from the
//! catalog store at startup. [`Nation`] is the only one the simulation
//! mutates; leaders and alliances are read-only for the whole run.
//! [`WorldSnapshot`] is the point-in-time copy pushed to every observer.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{AllianceType, Difficulty, EventCategory, GameSpeed, PersonalityType};
use crate::ids::{AllianceId, LeaderId, NationId};

// ---------------------------------------------------------------------------
// Nation
// ---------------------------------------------------------------------------

/// A sovereign nation and its economic and military metrics.
///
/// Created at bootstrap from the catalog and never deleted during a run.
/// Only the scheduler's per-tick update changes `gdp`, `military_power`,
/// and `gdp_growth_rate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Nation {
    /// Catalog key.
    pub id: NationId,
    /// Unique display name.
    pub name: String,
    /// Gross domestic product in billions of dollars. Never below the floor (10).
    pub gdp: f64,
    /// Aggregate military strength, clamped to `[10, 100]`.
    pub military_power: f64,
    /// Population in millions.
    #[serde(default)]
    pub population: f64,
    /// Whether the nation fields nuclear weapons.
    #[serde(default)]
    pub has_nuclear_weapons: bool,
    /// Ground force rating (0-100).
    #[serde(default)]
    pub ground_forces: f64,
    /// Air force rating (0-100).
    #[serde(default)]
    pub air_forces: f64,
    /// Naval force rating (0-100).
    #[serde(default)]
    pub naval_forces: f64,
    /// Number of nuclear warheads.
    #[serde(default)]
    pub nuclear_arsenal: u32,
    /// Fraction of GDP taken as tax.
    #[serde(default = "default_tax_rate")]
    pub tax_rate: f64,
    /// Fraction of GDP spent on research.
    #[serde(default = "default_research_spending")]
    pub research_spending: f64,
    /// Fraction of GDP spent on the military.
    #[serde(default = "default_military_spending")]
    pub military_spending: f64,
    /// Standing in the world (0-100).
    #[serde(default = "default_global_reputation")]
    pub global_reputation: f64,
    /// Annualized growth rate computed on the most recent tick.
    #[serde(default)]
    pub gdp_growth_rate: f64,
}

/// Default tax rate for a nation whose catalog record omits one.
pub const fn default_tax_rate() -> f64 {
    0.25
}

/// Default research spending for a nation whose catalog record omits one.
pub const fn default_research_spending() -> f64 {
    0.05
}

/// Default military spending for a nation whose catalog record omits one.
pub const fn default_military_spending() -> f64 {
    0.10
}

/// Default global reputation for a nation whose catalog record omits one.
pub const fn default_global_reputation() -> f64 {
    50.0
}

// ---------------------------------------------------------------------------
// Leader
// ---------------------------------------------------------------------------

/// The head of government of a nation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Leader {
    /// Catalog key.
    pub id: LeaderId,
    /// The nation this leader governs.
    pub nation_id: NationId,
    /// Full name.
    pub name: String,
    /// Behavioural archetype.
    pub personality_type: PersonalityType,
    /// Willingness to use force (0-1).
    pub aggression_factor: f64,
    /// Willingness to negotiate (0-1).
    pub diplomatic_factor: f64,
    /// Priority given to the economy (0-1).
    pub economic_focus: f64,
    /// Priority given to the military (0-1).
    pub military_focus: f64,
}

// ---------------------------------------------------------------------------
// Alliance
// ---------------------------------------------------------------------------

/// A static bloc of nations. No tick changes membership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Alliance {
    /// Catalog key.
    pub id: AllianceId,
    /// Display name (e.g. "NATO").
    pub name: String,
    /// Purpose of the alliance.
    pub alliance_type: AllianceType,
    /// Member nations.
    pub members: Vec<NationId>,
}

// ---------------------------------------------------------------------------
// Events and snapshots
// ---------------------------------------------------------------------------

/// A narrative event. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GameEvent {
    /// Calendar date the event happened on ("January 2, 2025").
    pub date: String,
    /// Event category.
    #[serde(rename = "type")]
    pub category: EventCategory,
    /// Headline text naming the affected nation.
    pub text: String,
}

/// Point-in-time copy of the whole world, as pushed to observers.
///
/// Never a live reference: every observer receives its own serialized copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct WorldSnapshot {
    /// Current calendar date ("January 1, 2025").
    pub date: String,
    /// Current speed.
    pub speed: GameSpeed,
    /// Whether the scheduler is paused.
    pub paused: bool,
    /// Every nation, in catalog order.
    pub nations: Vec<Nation>,
    /// Recent events, most recent first.
    pub events: Vec<GameEvent>,
}

// ---------------------------------------------------------------------------
// Read-only query payloads
// ---------------------------------------------------------------------------

/// A nation offered on the nation-selection screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PlayableNation {
    /// Catalog key.
    pub id: NationId,
    /// Nation name.
    pub name: String,
    /// Leader name.
    pub leader: String,
    /// Leader archetype.
    pub personality_type: PersonalityType,
    /// GDP in billions at catalog time.
    pub gdp: f64,
    /// Military power at catalog time.
    pub military_power: f64,
    /// Whether the nation has nuclear weapons.
    pub has_nuclear_weapons: bool,
    /// How hard the nation is to play.
    pub difficulty: Difficulty,
    /// One-paragraph briefing.
    pub description: String,
}

/// Projected effect of trade between two nations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TradeImpact {
    /// Trade volume in billions.
    pub trade_volume: f64,
    /// Relative GDP benefit to the first nation.
    pub benefit_a: f64,
    /// Relative GDP benefit to the second nation.
    pub benefit_b: f64,
}

/// Projected effect of one nation sanctioning another.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SanctionImpact {
    /// Absolute size of the sanction in billions.
    pub sanction_impact: f64,
    /// Relative GDP damage to the sanctioned nation.
    pub damage_to_target: f64,
    /// Relative GDP damage to the imposing nation.
    pub damage_to_imposer: f64,
}
