//! Bilateral relations and the sanctions they imply.
//!
//! Relations are read once at bootstrap from the cache collaborator (or the
//! built-in defaults) and never change during a run. A nation sanctions
//! every nation it rates strictly below the configured threshold; everyone
//! else it trades with.

use std::collections::{BTreeMap, BTreeSet};

use geopolitics_types::{Nation, NationId};

/// Relation value assumed for any pair with no recorded value.
pub const NEUTRAL_RELATION: u8 = 50;

/// Highest possible relation value.
pub const MAX_RELATION: u8 = 100;

/// Directed relation values between nations (0 = hostile, 100 = allied).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationMatrix {
    values: BTreeMap<(NationId, NationId), u8>,
}

impl RelationMatrix {
    /// Create an empty matrix where every pair is neutral.
    pub const fn new() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }

    /// Record how `from` regards `to`. Values above 100 are clamped.
    pub fn set(&mut self, from: NationId, to: NationId, value: u8) {
        if from != to {
            self.values.insert((from, to), value.min(MAX_RELATION));
        }
    }

    /// Record the same value in both directions.
    pub fn set_mutual(&mut self, a: NationId, b: NationId, value: u8) {
        self.set(a, b, value);
        self.set(b, a, value);
    }

    /// How `from` regards `to`.
    pub fn get(&self, from: NationId, to: NationId) -> u8 {
        self.values
            .get(&(from, to))
            .copied()
            .unwrap_or(NEUTRAL_RELATION)
    }

    /// Number of explicitly recorded directed pairs.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no pair has been recorded.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over `((from, to), value)` for every recorded pair.
    pub fn iter(&self) -> impl Iterator<Item = ((NationId, NationId), u8)> + '_ {
        self.values.iter().map(|(pair, value)| (*pair, *value))
    }
}

/// The static set of active sanctions, as `(imposer, target)` pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SanctionRegistry {
    pairs: BTreeSet<(NationId, NationId)>,
}

impl SanctionRegistry {
    /// Create a registry with no sanctions.
    pub const fn new() -> Self {
        Self {
            pairs: BTreeSet::new(),
        }
    }

    /// Derive sanctions from relations: `from` sanctions `to` when
    /// `relation(from, to) < threshold`.
    pub fn from_relations(relations: &RelationMatrix, threshold: u8) -> Self {
        let pairs = relations
            .iter()
            .filter(|(_, value)| *value < threshold)
            .map(|(pair, _)| pair)
            .collect();
        Self { pairs }
    }

    /// Record that `imposer` sanctions `target`. Self-sanctions are ignored.
    pub fn impose(&mut self, imposer: NationId, target: NationId) {
        if imposer != target {
            self.pairs.insert((imposer, target));
        }
    }

    /// Whether `imposer` sanctions `target`.
    pub fn is_sanctioning(&self, imposer: NationId, target: NationId) -> bool {
        self.pairs.contains(&(imposer, target))
    }

    /// Every nation currently sanctioning `target`.
    pub fn sanctions_against(&self, target: NationId) -> impl Iterator<Item = NationId> + '_ {
        self.pairs
            .iter()
            .filter(move |(_, t)| *t == target)
            .map(|(imposer, _)| *imposer)
    }

    /// Number of nations sanctioning `target`.
    pub fn count_against(&self, target: NationId) -> usize {
        self.sanctions_against(target).count()
    }

    /// Total number of sanction pairs.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether there are no sanctions at all.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Every other nation that is not sanctioning `nation`.
pub fn trade_partners<'a>(
    nation: &Nation,
    nations: &'a [Nation],
    sanctions: &'a SanctionRegistry,
) -> impl Iterator<Item = &'a Nation> + use<'a> {
    let id = nation.id;
    nations
        .iter()
        .filter(move |other| other.id != id && !sanctions.is_sanctioning(other.id, id))
}

/// Cache key fragment for a nation name (`"United States"` -> `"united_states"`).
pub fn slug(name: &str) -> String {
    name.to_lowercase().replace(' ', "_")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn nation(id: u32) -> Nation {
        Nation {
            id: NationId(id),
            name: format!("Nation {id}"),
            gdp: 1000.0,
            military_power: 50.0,
            population: 10.0,
            has_nuclear_weapons: false,
            ground_forces: 50.0,
            air_forces: 50.0,
            naval_forces: 50.0,
            nuclear_arsenal: 0,
            tax_rate: 0.25,
            research_spending: 0.05,
            military_spending: 0.10,
            global_reputation: 50.0,
            gdp_growth_rate: 0.0,
        }
    }

    #[test]
    fn unknown_pairs_are_neutral() {
        let matrix = RelationMatrix::new();
        assert_eq!(matrix.get(NationId(1), NationId(2)), NEUTRAL_RELATION);
        assert!(matrix.is_empty());
    }

    #[test]
    fn self_relations_are_not_recorded() {
        let mut matrix = RelationMatrix::new();
        matrix.set(NationId(1), NationId(1), 0);
        assert!(matrix.is_empty());
    }

    #[test]
    fn values_clamp_to_one_hundred() {
        let mut matrix = RelationMatrix::new();
        matrix.set(NationId(1), NationId(2), 250);
        assert_eq!(matrix.get(NationId(1), NationId(2)), MAX_RELATION);
    }

    #[test]
    fn low_relations_become_sanctions() {
        let mut matrix = RelationMatrix::new();
        matrix.set_mutual(NationId(1), NationId(2), 10);
        matrix.set_mutual(NationId(1), NationId(3), 20);
        matrix.set(NationId(4), NationId(1), 14);

        let registry = SanctionRegistry::from_relations(&matrix, 15);
        assert!(registry.is_sanctioning(NationId(1), NationId(2)));
        assert!(registry.is_sanctioning(NationId(2), NationId(1)));
        assert!(!registry.is_sanctioning(NationId(1), NationId(3)));
        assert!(registry.is_sanctioning(NationId(4), NationId(1)));
        assert!(!registry.is_sanctioning(NationId(1), NationId(4)));
        assert_eq!(registry.count_against(NationId(1)), 2);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn trade_partners_exclude_self_and_sanctioners() {
        let nations = vec![nation(1), nation(2), nation(3), nation(4)];
        let mut registry = SanctionRegistry::new();
        registry.impose(NationId(3), NationId(1));
        // Nation 1 sanctioning nation 4 does not stop 4 trading with 1.
        registry.impose(NationId(1), NationId(4));

        let first = nations.first().unwrap();
        let partners: Vec<NationId> = trade_partners(first, &nations, &registry)
            .map(|n| n.id)
            .collect();
        assert_eq!(partners, vec![NationId(2), NationId(4)]);
    }

    #[test]
    fn slug_matches_cache_keys() {
        assert_eq!(slug("United States"), "united_states");
        assert_eq!(slug("North Korea"), "north_korea");
    }
}
