//! Catalog reads from `PostgreSQL`.
//!
//! The catalog lives in four tables:
//!
//! | Table | Columns used |
//! |-------|--------------|
//! | `nations` | `id`, `name`, `gdp`, `military_power`, `population`, `has_nuclear_weapons`, force ratings, `nuclear_arsenal`, spending fractions, `global_reputation`, `leader_id` |
//! | `leaders` | `id`, `name`, `personality_type`, focus factors |
//! | `alliances` | `id`, `name`, `alliance_type` |
//! | `alliance_members` | `alliance_id`, `nation_id` |
//!
//! Nullable metric columns fall back to the same defaults a nation record
//! gets when deserialized. Every nation must have a leader.

use std::collections::BTreeMap;

use geopolitics_core::catalog::{Catalog, CatalogEntry};
use geopolitics_types::structs::{
    default_global_reputation, default_military_spending, default_research_spending,
    default_tax_rate,
};
use geopolitics_types::{
    Alliance, AllianceId, AllianceType, Leader, LeaderId, Nation, NationId, PersonalityType,
};
use sqlx::PgPool;

use crate::error::DbError;

const NATIONS_SQL: &str = "\
SELECT n.id, n.name, n.gdp, n.military_power, n.population, n.has_nuclear_weapons, \
       n.ground_forces, n.air_forces, n.naval_forces, n.nuclear_arsenal, \
       n.tax_rate, n.research_spending, n.military_spending, n.global_reputation, \
       l.id AS leader_id, l.name AS leader_name, l.personality_type, \
       l.aggression_factor, l.diplomatic_factor, l.economic_focus, l.military_focus \
FROM nations n \
LEFT JOIN leaders l ON l.id = n.leader_id \
ORDER BY n.id";

const ALLIANCES_SQL: &str = "SELECT id, name, alliance_type FROM alliances ORDER BY id";

const MEMBERS_SQL: &str =
    "SELECT alliance_id, nation_id FROM alliance_members ORDER BY alliance_id, nation_id";

/// Neutral value for a leader focus factor the catalog leaves empty.
const DEFAULT_FACTOR: f64 = 0.5;

/// A nation joined with its leader.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct NationRow {
    /// Nation key.
    pub id: i32,
    /// Unique name.
    pub name: String,
    /// GDP in billions.
    pub gdp: f64,
    /// Military power.
    pub military_power: f64,
    /// Population in millions.
    pub population: Option<f64>,
    /// Nuclear status.
    pub has_nuclear_weapons: Option<bool>,
    /// Ground force rating.
    pub ground_forces: Option<f64>,
    /// Air force rating.
    pub air_forces: Option<f64>,
    /// Naval force rating.
    pub naval_forces: Option<f64>,
    /// Warhead count.
    pub nuclear_arsenal: Option<i32>,
    /// Tax fraction.
    pub tax_rate: Option<f64>,
    /// Research spending fraction.
    pub research_spending: Option<f64>,
    /// Military spending fraction.
    pub military_spending: Option<f64>,
    /// Reputation (0-100).
    pub global_reputation: Option<f64>,
    /// Leader key, absent when the nation has no leader.
    pub leader_id: Option<i32>,
    /// Leader name.
    pub leader_name: Option<String>,
    /// Leader archetype as stored (`aggressive`, ...).
    pub personality_type: Option<String>,
    /// Leader aggression (0-1).
    pub aggression_factor: Option<f64>,
    /// Leader diplomacy (0-1).
    pub diplomatic_factor: Option<f64>,
    /// Leader economic focus (0-1).
    pub economic_focus: Option<f64>,
    /// Leader military focus (0-1).
    pub military_focus: Option<f64>,
}

/// An alliance header.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AllianceRow {
    /// Alliance key.
    pub id: i32,
    /// Display name.
    pub name: String,
    /// Purpose as stored (`military`, `economic`, `research`).
    pub alliance_type: String,
}

/// One alliance membership.
#[derive(Debug, Clone, Copy, sqlx::FromRow)]
pub struct AllianceMemberRow {
    /// Alliance key.
    pub alliance_id: i32,
    /// Member nation key.
    pub nation_id: i32,
}

fn key(value: i32, what: &str) -> Result<u32, DbError> {
    u32::try_from(value)
        .map_err(|_err| DbError::InvalidRecord(format!("{what} {value} is negative")))
}

impl NationRow {
    /// Convert the joined row into a catalog entry.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::InvalidRecord`] for a negative key, a missing
    /// leader, or an unknown personality type.
    pub fn into_entry(self) -> Result<CatalogEntry, DbError> {
        let nation_id = NationId(key(self.id, "nation")?);

        let (Some(leader_id), Some(leader_name)) = (self.leader_id, self.leader_name) else {
            return Err(DbError::InvalidRecord(format!(
                "nation {:?} has no leader",
                self.name
            )));
        };
        let personality = self.personality_type.unwrap_or_default();
        let personality_type = PersonalityType::parse(&personality).ok_or_else(|| {
            DbError::InvalidRecord(format!(
                "leader {leader_name:?} has unknown personality {personality:?}"
            ))
        })?;
        let nuclear_arsenal = self
            .nuclear_arsenal
            .map_or(Ok(0), |count| key(count, "nuclear arsenal"))?;

        let leader = Leader {
            id: LeaderId(key(leader_id, "leader")?),
            nation_id,
            name: leader_name,
            personality_type,
            aggression_factor: self.aggression_factor.unwrap_or(DEFAULT_FACTOR),
            diplomatic_factor: self.diplomatic_factor.unwrap_or(DEFAULT_FACTOR),
            economic_focus: self.economic_focus.unwrap_or(DEFAULT_FACTOR),
            military_focus: self.military_focus.unwrap_or(DEFAULT_FACTOR),
        };

        let nation = Nation {
            id: nation_id,
            name: self.name,
            gdp: self.gdp,
            military_power: self.military_power,
            population: self.population.unwrap_or_default(),
            has_nuclear_weapons: self.has_nuclear_weapons.unwrap_or_default(),
            ground_forces: self.ground_forces.unwrap_or_default(),
            air_forces: self.air_forces.unwrap_or_default(),
            naval_forces: self.naval_forces.unwrap_or_default(),
            nuclear_arsenal,
            tax_rate: self.tax_rate.unwrap_or_else(default_tax_rate),
            research_spending: self
                .research_spending
                .unwrap_or_else(default_research_spending),
            military_spending: self
                .military_spending
                .unwrap_or_else(default_military_spending),
            global_reputation: self
                .global_reputation
                .unwrap_or_else(default_global_reputation),
            gdp_growth_rate: 0.0,
        };

        Ok(CatalogEntry { nation, leader })
    }
}

/// Assemble alliances from their headers and membership rows.
///
/// # Errors
///
/// Returns [`DbError::InvalidRecord`] for a negative key or an unknown
/// alliance type.
pub fn assemble_alliances(
    headers: Vec<AllianceRow>,
    members: &[AllianceMemberRow],
) -> Result<Vec<Alliance>, DbError> {
    let mut by_alliance: BTreeMap<i32, Vec<NationId>> = BTreeMap::new();
    for member in members {
        by_alliance
            .entry(member.alliance_id)
            .or_default()
            .push(NationId(key(member.nation_id, "member nation")?));
    }

    headers
        .into_iter()
        .map(|row| {
            let alliance_type = AllianceType::parse(&row.alliance_type).ok_or_else(|| {
                DbError::InvalidRecord(format!(
                    "alliance {:?} has unknown type {:?}",
                    row.name, row.alliance_type
                ))
            })?;
            Ok(Alliance {
                id: AllianceId(key(row.id, "alliance")?),
                members: by_alliance.remove(&row.id).unwrap_or_default(),
                name: row.name,
                alliance_type,
            })
        })
        .collect()
}

/// Read-only access to the catalog tables.
#[derive(Debug, Clone)]
pub struct CatalogStore {
    pool: PgPool,
}

impl CatalogStore {
    /// Wrap a connection pool.
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Load and validate the whole catalog.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if a query fails,
    /// [`DbError::InvalidRecord`] if a row cannot be converted, or
    /// [`DbError::Catalog`] if the records are inconsistent.
    pub async fn load(&self) -> Result<Catalog, DbError> {
        let nation_rows: Vec<NationRow> = sqlx::query_as(NATIONS_SQL).fetch_all(&self.pool).await?;
        let alliance_rows: Vec<AllianceRow> =
            sqlx::query_as(ALLIANCES_SQL).fetch_all(&self.pool).await?;
        let member_rows: Vec<AllianceMemberRow> =
            sqlx::query_as(MEMBERS_SQL).fetch_all(&self.pool).await?;

        let entries = nation_rows
            .into_iter()
            .map(NationRow::into_entry)
            .collect::<Result<Vec<_>, _>>()?;
        let alliances = assemble_alliances(alliance_rows, &member_rows)?;

        tracing::info!(
            nations = entries.len(),
            alliances = alliances.len(),
            "Loaded catalog from PostgreSQL"
        );

        Ok(Catalog::new(entries, alliances)?)
    }
}
