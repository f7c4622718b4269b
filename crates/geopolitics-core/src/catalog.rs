//! The static catalog of nations, leaders, and alliances.
//!
//! Loaded once at startup, from the catalog database or the built-in
//! [`roster`](crate::roster), and validated before the world is built.
//! It also answers the read-only "playable nations" query.

use std::collections::BTreeSet;

use geopolitics_types::{Alliance, Difficulty, Leader, Nation, NationId, PlayableNation};

/// Military power at or above which a nation can be `easy`.
const EASY_MILITARY: f64 = 90.0;
/// GDP at or above which a nation can be `easy`.
const EASY_GDP: f64 = 20_000.0;
/// Military power below which a nation is `hard`.
const HARD_MILITARY: f64 = 60.0;
/// GDP below which a nation is `hard`.
const HARD_GDP: f64 = 3_000.0;

/// Errors that make a catalog unusable.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// No nations at all.
    #[error("catalog contains no nations")]
    Empty,

    /// Two nations share a name.
    #[error("duplicate nation name {name:?}")]
    DuplicateName {
        /// The repeated name.
        name: String,
    },

    /// Two nations share an id.
    #[error("duplicate nation id {id}")]
    DuplicateId {
        /// The repeated id.
        id: NationId,
    },

    /// A leader is attached to a different nation than its record says.
    #[error("leader {leader:?} belongs to nation {expected}, not {actual}")]
    LeaderMismatch {
        /// The leader's name.
        leader: String,
        /// The nation id the leader record names.
        expected: NationId,
        /// The nation the leader was paired with.
        actual: NationId,
    },

    /// An alliance lists a nation that is not in the catalog.
    #[error("alliance {alliance:?} lists unknown nation {member}")]
    UnknownMember {
        /// The alliance name.
        alliance: String,
        /// The missing member.
        member: NationId,
    },
}

/// A nation paired with its leader.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    /// The nation's starting record.
    pub nation: Nation,
    /// Its head of government.
    pub leader: Leader,
}

/// Validated catalog contents.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
    alliances: Vec<Alliance>,
}

impl Catalog {
    /// Validate and wrap catalog records.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] for an empty catalog, duplicate names or
    /// ids, a leader paired with the wrong nation, or an alliance member
    /// that does not exist.
    pub fn new(entries: Vec<CatalogEntry>, alliances: Vec<Alliance>) -> Result<Self, CatalogError> {
        if entries.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut names = BTreeSet::new();
        let mut ids = BTreeSet::new();
        for entry in &entries {
            if !names.insert(entry.nation.name.to_lowercase()) {
                return Err(CatalogError::DuplicateName {
                    name: entry.nation.name.clone(),
                });
            }
            if !ids.insert(entry.nation.id) {
                return Err(CatalogError::DuplicateId {
                    id: entry.nation.id,
                });
            }
            if entry.leader.nation_id != entry.nation.id {
                return Err(CatalogError::LeaderMismatch {
                    leader: entry.leader.name.clone(),
                    expected: entry.leader.nation_id,
                    actual: entry.nation.id,
                });
            }
        }

        for alliance in &alliances {
            if let Some(member) = alliance.members.iter().find(|m| !ids.contains(*m)) {
                return Err(CatalogError::UnknownMember {
                    alliance: alliance.name.clone(),
                    member: *member,
                });
            }
        }

        Ok(Self { entries, alliances })
    }

    /// Nation/leader pairs in catalog order.
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Starting nation records in catalog order.
    pub fn nations(&self) -> Vec<Nation> {
        self.entries.iter().map(|e| e.nation.clone()).collect()
    }

    /// Static alliances.
    pub fn alliances(&self) -> &[Alliance] {
        &self.alliances
    }

    /// Number of nations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false for a validated catalog.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The nation-selection list with difficulty and briefing.
    pub fn playable_nations(&self) -> Vec<PlayableNation> {
        self.entries
            .iter()
            .map(|CatalogEntry { nation, leader }| PlayableNation {
                id: nation.id,
                name: nation.name.clone(),
                leader: leader.name.clone(),
                personality_type: leader.personality_type,
                gdp: nation.gdp,
                military_power: nation.military_power,
                has_nuclear_weapons: nation.has_nuclear_weapons,
                difficulty: classify_difficulty(nation.military_power, nation.gdp),
                description: describe(nation, leader),
            })
            .collect()
    }
}

/// `easy` for a top-tier military with a large economy, `hard` for a weak
/// military or a small economy, `medium` otherwise.
pub fn classify_difficulty(military_power: f64, gdp: f64) -> Difficulty {
    if military_power >= EASY_MILITARY && gdp >= EASY_GDP {
        Difficulty::Easy
    } else if military_power < HARD_MILITARY || gdp < HARD_GDP {
        Difficulty::Hard
    } else {
        Difficulty::Medium
    }
}

/// One-paragraph briefing for the nation-selection screen.
pub fn describe(nation: &Nation, leader: &Leader) -> String {
    let nuclear = if nation.has_nuclear_weapons {
        " and a nuclear arsenal"
    } else {
        ""
    };
    format!(
        "Lead {} as {}, a {} leader. GDP of ${:.0} billion, a population of {:.0} million, \
         military power {:.0}{nuclear}.",
        nation.name,
        leader.name,
        leader.personality_type.as_str(),
        nation.gdp,
        nation.population,
        nation.military_power,
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use geopolitics_types::{AllianceId, AllianceType, LeaderId, PersonalityType};

    use super::*;
    use crate::roster;

    #[test]
    fn difficulty_tiers() {
        assert_eq!(classify_difficulty(100.0, 25_000.0), Difficulty::Easy);
        assert_eq!(classify_difficulty(90.0, 20_000.0), Difficulty::Easy);
        assert_eq!(classify_difficulty(89.9, 25_000.0), Difficulty::Medium);
        assert_eq!(classify_difficulty(85.0, 18_000.0), Difficulty::Medium);
        assert_eq!(classify_difficulty(59.0, 25_000.0), Difficulty::Hard);
        assert_eq!(classify_difficulty(95.0, 2_999.0), Difficulty::Hard);
    }

    #[test]
    fn built_in_roster_is_classified() {
        let catalog = roster::catalog().unwrap();
        let playable = catalog.playable_nations();
        let tier = |name: &str| {
            playable
                .iter()
                .find(|p| p.name == name)
                .map(|p| p.difficulty)
                .unwrap()
        };
        assert_eq!(tier("United States"), Difficulty::Easy);
        assert_eq!(tier("China"), Difficulty::Medium);
        assert_eq!(tier("Russia"), Difficulty::Medium);
        assert_eq!(tier("Germany"), Difficulty::Hard);
        assert_eq!(tier("North Korea"), Difficulty::Hard);
    }

    #[test]
    fn description_names_nation_and_leader() {
        let catalog = roster::catalog().unwrap();
        let us = catalog.playable_nations().into_iter().next().unwrap();
        assert!(us.description.contains("United States"));
        assert!(us.description.contains(&us.leader));
        assert!(us.description.contains("nuclear"));
    }

    fn entry(id: u32, name: &str) -> CatalogEntry {
        let mut nation = roster::catalog().unwrap().entries().first().unwrap().nation.clone();
        nation.id = NationId(id);
        nation.name = name.to_owned();
        CatalogEntry {
            nation,
            leader: Leader {
                id: LeaderId(id),
                nation_id: NationId(id),
                name: format!("Leader {id}"),
                personality_type: PersonalityType::Diplomatic,
                aggression_factor: 0.5,
                diplomatic_factor: 0.5,
                economic_focus: 0.5,
                military_focus: 0.5,
            },
        }
    }

    #[test]
    fn rejects_invalid_catalogs() {
        assert!(matches!(Catalog::new(Vec::new(), Vec::new()), Err(CatalogError::Empty)));

        let dup_name = vec![entry(1, "Atlantis"), entry(2, "atlantis")];
        assert!(matches!(
            Catalog::new(dup_name, Vec::new()),
            Err(CatalogError::DuplicateName { .. })
        ));

        let dup_id = vec![entry(1, "Atlantis"), entry(1, "Lemuria")];
        assert!(matches!(
            Catalog::new(dup_id, Vec::new()),
            Err(CatalogError::DuplicateId { .. })
        ));

        let mut wrong_leader = entry(1, "Atlantis");
        wrong_leader.leader.nation_id = NationId(9);
        assert!(matches!(
            Catalog::new(vec![wrong_leader], Vec::new()),
            Err(CatalogError::LeaderMismatch { .. })
        ));

        let ghost = Alliance {
            id: AllianceId(1),
            name: "Ghost Pact".to_owned(),
            alliance_type: AllianceType::Military,
            members: vec![NationId(1), NationId(7)],
        };
        assert!(matches!(
            Catalog::new(vec![entry(1, "Atlantis")], vec![ghost]),
            Err(CatalogError::UnknownMember { member: NationId(7), .. })
        ));
    }
}
