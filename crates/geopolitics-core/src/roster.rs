//! Built-in starting roster for the Geopolitics 2025 simulation.
//!
//! Ten nations with their leaders, four alliances, and the default relation
//! matrix. Used when no catalog database or cache is configured, and by
//! tests that need a realistic world.

use geopolitics_types::{
    Alliance, AllianceId, AllianceType, Leader, LeaderId, Nation, NationId, PersonalityType,
    structs,
};

use crate::catalog::{Catalog, CatalogEntry, CatalogError};
use crate::diplomacy::RelationMatrix;

const UNITED_STATES: NationId = NationId(1);
const CHINA: NationId = NationId(2);
const RUSSIA: NationId = NationId(3);
const INDIA: NationId = NationId(4);
const FRANCE: NationId = NationId(5);
const GERMANY: NationId = NationId(6);
const UNITED_KINGDOM: NationId = NationId(7);
const POLAND: NationId = NationId(8);
const UKRAINE: NationId = NationId(9);
const NORTH_KOREA: NationId = NationId(10);

/// Military, economic, and population figures for one roster nation.
struct Profile {
    id: NationId,
    name: &'static str,
    gdp: f64,
    military_power: f64,
    population: f64,
    nuclear_arsenal: u32,
    /// Ground, air, naval.
    forces: (f64, f64, f64),
    reputation: f64,
}

/// A roster leader.
struct Head {
    name: &'static str,
    personality: PersonalityType,
    /// Aggression, diplomacy, economic focus, military focus.
    factors: (f64, f64, f64, f64),
}

const ROSTER: [(Profile, Head); 10] = [
    (
        Profile {
            id: UNITED_STATES,
            name: "United States",
            gdp: 25_000.0,
            military_power: 100.0,
            population: 330.0,
            nuclear_arsenal: 5_500,
            forces: (90.0, 100.0, 100.0),
            reputation: 75.0,
        },
        Head {
            name: "Donald Trump",
            personality: PersonalityType::Aggressive,
            factors: (0.8, 0.3, 0.7, 0.8),
        },
    ),
    (
        Profile {
            id: CHINA,
            name: "China",
            gdp: 18_000.0,
            military_power: 85.0,
            population: 1_400.0,
            nuclear_arsenal: 350,
            forces: (95.0, 80.0, 70.0),
            reputation: 60.0,
        },
        Head {
            name: "Li Qiang",
            personality: PersonalityType::Diplomatic,
            factors: (0.5, 0.7, 0.9, 0.6),
        },
    ),
    (
        Profile {
            id: RUSSIA,
            name: "Russia",
            gdp: 4_000.0,
            military_power: 70.0,
            population: 145.0,
            nuclear_arsenal: 6_000,
            forces: (85.0, 75.0, 65.0),
            reputation: 40.0,
        },
        Head {
            name: "Vladimir Putin",
            personality: PersonalityType::Opportunistic,
            factors: (0.9, 0.4, 0.5, 0.9),
        },
    ),
    (
        Profile {
            id: INDIA,
            name: "India",
            gdp: 3_500.0,
            military_power: 65.0,
            population: 1_380.0,
            nuclear_arsenal: 160,
            forces: (80.0, 60.0, 55.0),
            reputation: 65.0,
        },
        Head {
            name: "Narendra Modi",
            personality: PersonalityType::Diplomatic,
            factors: (0.4, 0.7, 0.8, 0.6),
        },
    ),
    (
        Profile {
            id: FRANCE,
            name: "France",
            gdp: 2_800.0,
            military_power: 60.0,
            population: 67.0,
            nuclear_arsenal: 290,
            forces: (65.0, 70.0, 75.0),
            reputation: 70.0,
        },
        Head {
            name: "Emmanuel Macron",
            personality: PersonalityType::Diplomatic,
            factors: (0.3, 0.8, 0.7, 0.5),
        },
    ),
    (
        Profile {
            id: GERMANY,
            name: "Germany",
            gdp: 4_000.0,
            military_power: 55.0,
            population: 83.0,
            nuclear_arsenal: 0,
            forces: (60.0, 65.0, 50.0),
            reputation: 75.0,
        },
        Head {
            name: "Friedrich Merz",
            personality: PersonalityType::Diplomatic,
            factors: (0.2, 0.9, 0.9, 0.4),
        },
    ),
    (
        Profile {
            id: UNITED_KINGDOM,
            name: "United Kingdom",
            gdp: 3_200.0,
            military_power: 65.0,
            population: 67.0,
            nuclear_arsenal: 225,
            forces: (60.0, 75.0, 80.0),
            reputation: 70.0,
        },
        Head {
            name: "Keir Starmer",
            personality: PersonalityType::Diplomatic,
            factors: (0.3, 0.8, 0.7, 0.6),
        },
    ),
    (
        Profile {
            id: POLAND,
            name: "Poland",
            gdp: 700.0,
            military_power: 30.0,
            population: 38.0,
            nuclear_arsenal: 0,
            forces: (40.0, 30.0, 20.0),
            reputation: 60.0,
        },
        Head {
            name: "Sławomir Mentzen",
            personality: PersonalityType::Opportunistic,
            factors: (0.6, 0.5, 0.9, 0.7),
        },
    ),
    (
        Profile {
            id: UKRAINE,
            name: "Ukraine",
            gdp: 200.0,
            military_power: 25.0,
            population: 44.0,
            nuclear_arsenal: 0,
            forces: (35.0, 20.0, 10.0),
            reputation: 65.0,
        },
        Head {
            name: "Volodymyr Zelenskyy",
            personality: PersonalityType::Opportunistic,
            factors: (0.6, 0.7, 0.5, 0.9),
        },
    ),
    (
        Profile {
            id: NORTH_KOREA,
            name: "North Korea",
            gdp: 40.0,
            military_power: 20.0,
            population: 25.0,
            nuclear_arsenal: 30,
            forces: (30.0, 15.0, 10.0),
            reputation: 20.0,
        },
        Head {
            name: "Kim Jong-un",
            personality: PersonalityType::Aggressive,
            factors: (0.9, 0.2, 0.3, 0.9),
        },
    ),
];

/// Bilateral relations that differ from neutral, applied in both directions.
const RELATIONS: [(NationId, NationId, u8); 5] = [
    (UNITED_STATES, RUSSIA, 20),
    (UNITED_STATES, CHINA, 30),
    (RUSSIA, UKRAINE, 10),
    (UNITED_STATES, UNITED_KINGDOM, 90),
    (RUSSIA, CHINA, 75),
];

fn entry((profile, head): &(Profile, Head)) -> CatalogEntry {
    let (ground_forces, air_forces, naval_forces) = profile.forces;
    let (aggression_factor, diplomatic_factor, economic_focus, military_focus) = head.factors;
    CatalogEntry {
        nation: Nation {
            id: profile.id,
            name: profile.name.to_owned(),
            gdp: profile.gdp,
            military_power: profile.military_power,
            population: profile.population,
            has_nuclear_weapons: profile.nuclear_arsenal > 0,
            ground_forces,
            air_forces,
            naval_forces,
            nuclear_arsenal: profile.nuclear_arsenal,
            tax_rate: structs::default_tax_rate(),
            research_spending: structs::default_research_spending(),
            military_spending: structs::default_military_spending(),
            global_reputation: profile.reputation,
            gdp_growth_rate: 0.0,
        },
        leader: Leader {
            id: LeaderId(profile.id.into_inner()),
            nation_id: profile.id,
            name: head.name.to_owned(),
            personality_type: head.personality,
            aggression_factor,
            diplomatic_factor,
            economic_focus,
            military_focus,
        },
    }
}

fn alliance(id: u32, name: &str, alliance_type: AllianceType, members: &[NationId]) -> Alliance {
    Alliance {
        id: AllianceId(id),
        name: name.to_owned(),
        alliance_type,
        members: members.to_vec(),
    }
}

/// The four starting alliances.
pub fn alliances() -> Vec<Alliance> {
    vec![
        alliance(
            1,
            "NATO",
            AllianceType::Military,
            &[UNITED_STATES, UNITED_KINGDOM, FRANCE, GERMANY, POLAND],
        ),
        alliance(
            2,
            "European Union",
            AllianceType::Economic,
            &[FRANCE, GERMANY, POLAND],
        ),
        alliance(
            3,
            "Shanghai Cooperation Organization",
            AllianceType::Economic,
            &[CHINA, RUSSIA],
        ),
        alliance(4, "BRICS", AllianceType::Economic, &[RUSSIA, CHINA, INDIA]),
    ]
}

/// The built-in catalog.
///
/// # Errors
///
/// Returns [`CatalogError`] only if the built-in data is inconsistent.
pub fn catalog() -> Result<Catalog, CatalogError> {
    Catalog::new(ROSTER.iter().map(entry).collect(), alliances())
}

/// The default relation matrix: neutral everywhere except a handful of
/// well-known rivalries and partnerships.
pub fn relations() -> RelationMatrix {
    let mut matrix = RelationMatrix::new();
    for (a, b, value) in RELATIONS {
        matrix.set_mutual(a, b, value);
    }
    matrix
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::diplomacy::{NEUTRAL_RELATION, SanctionRegistry};

    #[test]
    fn roster_is_a_valid_catalog() {
        let catalog = catalog().unwrap();
        assert_eq!(catalog.len(), 10);
        assert_eq!(catalog.alliances().len(), 4);
        let names: Vec<String> = catalog.nations().into_iter().map(|n| n.name).collect();
        assert_eq!(names.first().unwrap(), "United States");
        assert_eq!(names.last().unwrap(), "North Korea");
    }

    #[test]
    fn nuclear_flag_follows_the_arsenal() {
        let catalog = catalog().unwrap();
        let nuclear: Vec<String> = catalog
            .nations()
            .into_iter()
            .filter(|n| n.has_nuclear_weapons)
            .map(|n| n.name)
            .collect();
        assert_eq!(nuclear.len(), 7);
        assert!(!nuclear.contains(&"Germany".to_owned()));
    }

    #[test]
    fn relations_are_symmetric_and_default_neutral() {
        let matrix = relations();
        assert_eq!(matrix.get(RUSSIA, UKRAINE), 10);
        assert_eq!(matrix.get(UKRAINE, RUSSIA), 10);
        assert_eq!(matrix.get(UNITED_KINGDOM, UNITED_STATES), 90);
        assert_eq!(matrix.get(INDIA, POLAND), NEUTRAL_RELATION);
    }

    #[test]
    fn only_the_worst_rivalry_sanctions_by_default() {
        let sanctions = SanctionRegistry::from_relations(&relations(), 15);
        assert_eq!(sanctions.len(), 2);
        assert!(sanctions.is_sanctioning(RUSSIA, UKRAINE));
        assert!(sanctions.is_sanctioning(UKRAINE, RUSSIA));
    }
}
