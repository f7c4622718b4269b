//! `Dragonfly` (Redis-compatible) relation reader.
//!
//! The cache holds one JSON document per nation, keyed by the nation's
//! slug:
//!
//! | Pattern | Type | Description |
//! |---------|------|-------------|
//! | `nation:{slug}` | JSON | `{"relations": {"<other slug>": 0-100, ...}, ...}` |
//!
//! Only `relations` is read. A missing key leaves that nation neutral
//! toward everyone; a document that does not parse is skipped with a
//! warning. Slugs that match no catalog nation are ignored.

use std::collections::BTreeMap;

use fred::prelude::*;
use geopolitics_core::diplomacy::{RelationMatrix, slug};
use geopolitics_types::{Nation, NationId};
use serde::Deserialize;

use crate::error::DbError;

/// The part of a cached nation document the engine reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CachedNation {
    /// How this nation regards others, keyed by slug.
    #[serde(default)]
    pub relations: BTreeMap<String, u8>,
}

/// Cache key for a nation.
pub fn nation_key(name: &str) -> String {
    format!("nation:{}", slug(name))
}

/// Build a relation matrix from raw cached documents.
///
/// `documents` maps each nation's id to its raw JSON, for the nations that
/// had one.
pub fn parse_relations(
    nations: &[Nation],
    documents: &BTreeMap<NationId, String>,
) -> RelationMatrix {
    let ids: BTreeMap<String, NationId> =
        nations.iter().map(|n| (slug(&n.name), n.id)).collect();
    let mut matrix = RelationMatrix::new();

    for (from, raw) in documents {
        let cached: CachedNation = match serde_json::from_str(raw) {
            Ok(cached) => cached,
            Err(e) => {
                tracing::warn!(nation = %from, error = %e, "Skipping unreadable cached relations");
                continue;
            }
        };
        for (other, value) in cached.relations {
            let Some(to) = ids.get(&other) else {
                tracing::debug!(nation = %from, other = %other, "Ignoring relation to unknown nation");
                continue;
            };
            matrix.set(*from, *to, value);
        }
    }

    matrix
}

/// Connection handle to a `Dragonfly` (Redis-compatible) instance.
#[derive(Clone)]
pub struct RelationCache {
    client: Client,
}

impl RelationCache {
    /// Connect to `Dragonfly` at the given URL.
    ///
    /// The URL should follow the Redis URL scheme:
    /// `redis://host:port` or `redis://host:port/db`
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Config`] if the URL cannot be parsed.
    /// Returns [`DbError::Dragonfly`] if the connection fails.
    pub async fn connect(url: &str) -> Result<Self, DbError> {
        let config = Config::from_url(url)
            .map_err(|e| DbError::Config(format!("Invalid Dragonfly URL: {e}")))?;

        let client = Builder::from_config(config).build()?;
        client.init().await?;

        tracing::info!("Connected to Dragonfly");
        Ok(Self { client })
    }

    /// Read the relation matrix for `nations`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Dragonfly`] if a read fails.
    pub async fn load_relations(&self, nations: &[Nation]) -> Result<RelationMatrix, DbError> {
        let mut documents = BTreeMap::new();
        for nation in nations {
            let key = nation_key(&nation.name);
            let value: Option<String> = self.client.get(key.as_str()).await?;
            let Some(raw) = value else {
                tracing::debug!(key = %key, "No cached relations");
                continue;
            };
            documents.insert(nation.id, raw);
        }

        let matrix = parse_relations(nations, &documents);
        tracing::info!(
            documents = documents.len(),
            pairs = matrix.len(),
            "Loaded relations from Dragonfly"
        );
        Ok(matrix)
    }

    /// Disconnect from `Dragonfly`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Dragonfly`] if the quit command fails.
    pub async fn close(&self) -> Result<(), DbError> {
        self.client.quit().await?;
        Ok(())
    }
}

impl std::fmt::Debug for RelationCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelationCache").finish_non_exhaustive()
    }
}
