//! Enumeration types for the Geopolitics 2025 simulation.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Game speed
// ---------------------------------------------------------------------------

/// Simulation speed selected by observers.
///
/// The speed controls how often the scheduler ticks (each tick is always
/// exactly one simulated day) and scales the magnitude of per-tick military
/// drift and the chance of a narrative event.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum GameSpeed {
    /// Half speed.
    VerySlow,
    /// Slightly slower than normal.
    Slow,
    /// One tick per base interval.
    #[default]
    Normal,
    /// One and a half times normal.
    Fast,
    /// Double speed.
    VeryFast,
}

impl GameSpeed {
    /// All speeds, slowest first.
    pub const ALL: [Self; 5] = [
        Self::VerySlow,
        Self::Slow,
        Self::Normal,
        Self::Fast,
        Self::VeryFast,
    ];

    /// Scalar applied to tick frequency and per-tick change magnitude.
    pub const fn multiplier(self) -> f64 {
        match self {
            Self::VerySlow => 0.5,
            Self::Slow => 0.8,
            Self::Normal => 1.0,
            Self::Fast => 1.5,
            Self::VeryFast => 2.0,
        }
    }

    /// Wire name of the speed (`"very_slow"`, `"normal"`, ...).
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::VerySlow => "very_slow",
            Self::Slow => "slow",
            Self::Normal => "normal",
            Self::Fast => "fast",
            Self::VeryFast => "very_fast",
        }
    }

    /// Parse a wire name. Returns `None` for anything unrecognised.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|speed| speed.as_str() == name)
    }
}

// ---------------------------------------------------------------------------
// Narrative events
// ---------------------------------------------------------------------------

/// Category of a narrative [`GameEvent`](crate::GameEvent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum EventCategory {
    /// Elections, diplomatic incidents, unrest.
    Political,
    /// Markets, central banks, investment.
    Economic,
    /// Exercises, weapons programmes, budgets.
    Military,
    /// Natural disasters.
    Disaster,
}

impl EventCategory {
    /// All categories, in table order.
    pub const ALL: [Self; 4] = [
        Self::Political,
        Self::Economic,
        Self::Military,
        Self::Disaster,
    ];
}

// ---------------------------------------------------------------------------
// Catalog classification
// ---------------------------------------------------------------------------

/// Difficulty of playing as a given nation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum Difficulty {
    /// A superpower with a large economy and top-tier military.
    Easy,
    /// Everything in between.
    Medium,
    /// A weak military or a small economy.
    Hard,
}

/// Broad behavioural archetype of a leader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum PersonalityType {
    /// Prefers force and confrontation.
    Aggressive,
    /// Prefers negotiation and coalitions.
    Diplomatic,
    /// Switches sides when it pays.
    Opportunistic,
}

impl PersonalityType {
    /// Lowercase catalog name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Aggressive => "aggressive",
            Self::Diplomatic => "diplomatic",
            Self::Opportunistic => "opportunistic",
        }
    }

    /// Parse a catalog name (case-insensitive).
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "aggressive" => Some(Self::Aggressive),
            "diplomatic" => Some(Self::Diplomatic),
            "opportunistic" => Some(Self::Opportunistic),
            _ => None,
        }
    }
}

/// Purpose of an alliance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum AllianceType {
    /// Mutual defence pact.
    Military,
    /// Trade bloc or customs union.
    Economic,
    /// Joint research programme.
    Research,
}

impl AllianceType {
    /// Parse a catalog name (case-insensitive).
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "military" => Some(Self::Military),
            "economic" => Some(Self::Economic),
            "research" => Some(Self::Research),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speed_multipliers_are_ordered() {
        let multipliers: Vec<f64> = GameSpeed::ALL.iter().map(|s| s.multiplier()).collect();
        assert!(
            multipliers
                .iter()
                .zip(multipliers.iter().skip(1))
                .all(|(slower, faster)| slower < faster)
        );
        assert!((GameSpeed::Normal.multiplier() - 1.0).abs() < f64::EPSILON);
        assert!((GameSpeed::Fast.multiplier() - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn speed_wire_names_match_serde() {
        for speed in GameSpeed::ALL {
            let json = serde_json::to_string(&speed).unwrap_or_default();
            assert_eq!(json, format!("\"{}\"", speed.as_str()));
            assert_eq!(GameSpeed::parse(speed.as_str()), Some(speed));
        }
        assert_eq!(GameSpeed::parse("ludicrous"), None);
    }

    #[test]
    fn event_category_serializes_lowercase() {
        let json = serde_json::to_string(&EventCategory::Disaster).unwrap_or_default();
        assert_eq!(json, "\"disaster\"");
    }

    #[test]
    fn personality_parse_is_case_insensitive() {
        assert_eq!(
            PersonalityType::parse("Aggressive"),
            Some(PersonalityType::Aggressive)
        );
        assert_eq!(PersonalityType::parse("pacifist"), None);
        assert_eq!(AllianceType::parse("ECONOMIC"), Some(AllianceType::Economic));
    }
}
