//! The mutable world model shared by the scheduler and command processing.
//!
//! [`WorldState`] is owned by the [`Simulation`](crate::simulation::Simulation)
//! handle and only ever mutated while its lock is held. Everything that
//! leaves the lock is a [`WorldSnapshot`] copy.

use geopolitics_types::{Alliance, GameSpeed, Nation, NationId, WorldSnapshot};
use serde_json::{Map, Value};

use crate::catalog::Catalog;
use crate::clock::{self, ClockError, GameClock};
use crate::config::{ConfigError, SimulationConfig};
use crate::diplomacy::{RelationMatrix, SanctionRegistry};
use crate::economy::EconomicContext;
use crate::events::EventLog;

/// Top-level snapshot keys a raw merge may overwrite.
pub const MERGEABLE_KEYS: [&str; 5] = ["date", "speed", "paused", "nations", "events"];

/// Errors from a raw state merge. The world is untouched on every error.
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    /// The current snapshot could not be serialized.
    #[error("failed to serialize current snapshot: {source}")]
    Serialize {
        /// The underlying serialization error.
        source: serde_json::Error,
    },

    /// The merged document is not a valid snapshot.
    #[error("merged state is not a valid snapshot: {source}")]
    Shape {
        /// The underlying deserialization error.
        source: serde_json::Error,
    },

    /// The merged `date` is not a calendar date.
    #[error("merged state has an invalid date: {source}")]
    Date {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },
}

/// The live world: calendar, speed, run state, nations, and recent events.
#[derive(Debug, Clone)]
pub struct WorldState {
    clock: GameClock,
    speed: GameSpeed,
    paused: bool,
    nations: Vec<Nation>,
    alliances: Vec<Alliance>,
    sanctions: SanctionRegistry,
    events: EventLog,
}

impl WorldState {
    /// Build the starting world from already-loaded nations.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the configured start date does
    /// not parse.
    pub fn new(
        nations: Vec<Nation>,
        alliances: Vec<Alliance>,
        sanctions: SanctionRegistry,
        config: &SimulationConfig,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            clock: GameClock::new(config.world.start_date()?),
            speed: config.world.initial_speed,
            paused: config.world.start_paused,
            nations,
            alliances,
            sanctions,
            events: EventLog::new(config.events.log_capacity),
        })
    }

    /// Build the starting world from a catalog and a relation matrix.
    ///
    /// Sanctions are derived once from the relations and stay fixed.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the configured start date does
    /// not parse.
    pub fn bootstrap(
        catalog: &Catalog,
        relations: &RelationMatrix,
        config: &SimulationConfig,
    ) -> Result<Self, ConfigError> {
        let sanctions =
            SanctionRegistry::from_relations(relations, config.diplomacy.sanction_threshold);
        Self::new(
            catalog.nations(),
            catalog.alliances().to_vec(),
            sanctions,
            config,
        )
    }

    /// Point-in-time copy for observers.
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            date: self.clock.display(),
            speed: self.speed,
            paused: self.paused,
            nations: self.nations.clone(),
            events: self.events.to_vec(),
        }
    }

    /// The calendar.
    pub const fn clock(&self) -> &GameClock {
        &self.clock
    }

    /// Current speed.
    pub const fn speed(&self) -> GameSpeed {
        self.speed
    }

    /// Whether the scheduler is paused.
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Nations in catalog order.
    pub fn nations(&self) -> &[Nation] {
        &self.nations
    }

    /// Look up a nation by id.
    pub fn nation(&self, id: NationId) -> Option<&Nation> {
        self.nations.iter().find(|n| n.id == id)
    }

    /// Look up a nation by case-insensitive name.
    pub fn nation_by_name(&self, name: &str) -> Option<&Nation> {
        self.nations
            .iter()
            .find(|n| n.name.eq_ignore_ascii_case(name.trim()))
    }

    /// Static alliances.
    pub fn alliances(&self) -> &[Alliance] {
        &self.alliances
    }

    /// Active sanctions.
    pub const fn sanctions(&self) -> &SanctionRegistry {
        &self.sanctions
    }

    /// Recent events.
    pub const fn events(&self) -> &EventLog {
        &self.events
    }

    /// The read-only view the economy model needs.
    pub fn economic_context(&self) -> EconomicContext<'_> {
        EconomicContext {
            nations: &self.nations,
            sanctions: &self.sanctions,
        }
    }

    /// Pause or resume.
    pub const fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Change the speed.
    pub const fn set_speed(&mut self, speed: GameSpeed) {
        self.speed = speed;
    }

    pub(crate) const fn set_clock(&mut self, clock: GameClock) {
        self.clock = clock;
    }

    pub(crate) fn nations_mut(&mut self) -> &mut [Nation] {
        &mut self.nations
    }

    pub(crate) const fn events_mut(&mut self) -> &mut EventLog {
        &mut self.events
    }

    /// Overwrite top-level snapshot keys with caller-supplied values.
    ///
    /// Keys outside [`MERGEABLE_KEYS`] are ignored. The merged document must
    /// still be a valid snapshot; metric bounds are not re-applied. The event
    /// log stays bounded by its capacity. Alliances and sanctions are not
    /// part of the snapshot and are never touched.
    ///
    /// Returns the keys that were applied.
    ///
    /// # Errors
    ///
    /// Returns a [`MergeError`] and leaves the world unchanged if the merged
    /// document is not a valid snapshot.
    pub fn merge_raw(&mut self, patch: &Map<String, Value>) -> Result<Vec<String>, MergeError> {
        let current = serde_json::to_value(self.snapshot())
            .map_err(|source| MergeError::Serialize { source })?;
        let mut document = match current {
            Value::Object(map) => map,
            _ => Map::new(),
        };

        let mut applied = Vec::new();
        for key in MERGEABLE_KEYS {
            if let Some(value) = patch.get(key) {
                document.insert(key.to_owned(), value.clone());
                applied.push(key.to_owned());
            }
        }

        let merged: WorldSnapshot = serde_json::from_value(Value::Object(document))
            .map_err(|source| MergeError::Shape { source })?;
        let date = clock::parse_date(&merged.date)?;

        self.clock = GameClock::new(date);
        self.speed = merged.speed;
        self.paused = merged.paused;
        self.nations = merged.nations;
        self.events = EventLog::from_recent(merged.events, self.events.capacity());

        Ok(applied)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use geopolitics_types::{EventCategory, GameEvent};
    use serde_json::json;

    use super::*;
    use crate::roster;

    fn world() -> WorldState {
        let config = SimulationConfig::default();
        WorldState::bootstrap(&roster::catalog().unwrap(), &roster::relations(), &config).unwrap()
    }

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn initial_world_matches_the_opening_scenario() {
        let snapshot = world().snapshot();
        assert_eq!(snapshot.date, "January 1, 2025");
        assert!(snapshot.paused);
        assert_eq!(snapshot.speed, GameSpeed::Normal);
        assert_eq!(snapshot.nations.len(), 10);
        assert!(snapshot.events.is_empty());
    }

    #[test]
    fn bootstrap_derives_sanctions_from_relations() {
        let world = world();
        let russia = world.nation_by_name("russia").unwrap().id;
        let ukraine = world.nation_by_name("Ukraine").unwrap().id;
        assert!(world.sanctions().is_sanctioning(russia, ukraine));
        assert!(world.sanctions().is_sanctioning(ukraine, russia));
        assert_eq!(world.alliances().len(), 4);
    }

    #[test]
    fn merge_overwrites_only_named_keys() {
        let mut world = world();
        let applied = world
            .merge_raw(&object(json!({
                "date": "2026-03-04",
                "paused": false,
                "unknown": 1
            })))
            .unwrap();

        assert_eq!(applied, vec!["date", "paused"]);
        assert_eq!(world.clock().display(), "March 4, 2026");
        assert!(!world.is_paused());
        assert_eq!(world.speed(), GameSpeed::Normal);
        assert_eq!(world.nations().len(), 10);
    }

    #[test]
    fn merge_with_invalid_shape_changes_nothing() {
        let mut world = world();
        let before = world.snapshot();

        let result = world.merge_raw(&object(json!({"paused": false, "speed": "warp"})));
        assert!(matches!(result, Err(MergeError::Shape { .. })));
        assert_eq!(world.snapshot(), before);

        let result = world.merge_raw(&object(json!({"date": "not a date"})));
        assert!(matches!(result, Err(MergeError::Date { .. })));
        assert_eq!(world.snapshot(), before);
    }

    #[test]
    fn merged_events_stay_bounded() {
        let mut world = world();
        let events: Vec<GameEvent> = (0..30)
            .map(|i| GameEvent {
                date: "January 1, 2025".to_owned(),
                category: EventCategory::Economic,
                text: format!("event {i}"),
            })
            .collect();
        world
            .merge_raw(&object(json!({ "events": events })))
            .unwrap();
        assert_eq!(world.events().len(), 20);
        assert_eq!(world.events().latest().unwrap().text, "event 0");
    }

    #[test]
    fn merged_nations_bypass_metric_bounds() {
        let mut world = world();
        let mut nations = world.snapshot().nations;
        if let Some(first) = nations.first_mut() {
            first.military_power = 500.0;
        }
        world
            .merge_raw(&object(json!({ "nations": nations })))
            .unwrap();
        assert!((world.nations().first().unwrap().military_power - 500.0).abs() < f64::EPSILON);
    }
}
