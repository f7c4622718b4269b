//! Startup data: the catalog and the relation matrix.
//!
//! Each comes from its collaborator when one is configured and from the
//! built-in roster otherwise. A configured catalog database that cannot be
//! read stops startup. A configured cache that cannot be read only costs
//! the cached relations; the built-in ones are used instead.

use std::collections::BTreeMap;

use geopolitics_core::catalog::Catalog;
use geopolitics_core::config::InfrastructureConfig;
use geopolitics_core::diplomacy::RelationMatrix;
use geopolitics_core::roster;
use geopolitics_db::{CatalogStore, PostgresConfig, PostgresPool, RelationCache};
use geopolitics_types::NationId;
use tracing::{info, warn};

use crate::error::EngineError;

/// Catalog loads need only a couple of connections.
const CATALOG_POOL_SIZE: u32 = 2;

/// Load the catalog from `PostgreSQL`, or the built-in roster.
pub async fn load_catalog(infra: &InfrastructureConfig) -> Result<Catalog, EngineError> {
    if !infra.has_postgres() {
        let catalog = roster::catalog()?;
        info!(nations = catalog.len(), "Using built-in catalog");
        return Ok(catalog);
    }

    let config = PostgresConfig::new(&infra.postgres_url).with_max_connections(CATALOG_POOL_SIZE);
    let pool = PostgresPool::connect(&config).await?;
    let loaded = CatalogStore::new(pool.pool().clone()).load().await;
    pool.close().await;
    Ok(loaded?)
}

/// Load relations from `Dragonfly`, or the built-in defaults.
pub async fn load_relations(infra: &InfrastructureConfig, catalog: &Catalog) -> RelationMatrix {
    if infra.has_dragonfly() {
        match read_cache(&infra.dragonfly_url, catalog).await {
            Ok(relations) => return relations,
            Err(e) => warn!(error = %e, "Relation cache unavailable, using built-in relations"),
        }
    }
    default_relations(catalog)
}

async fn read_cache(url: &str, catalog: &Catalog) -> Result<RelationMatrix, EngineError> {
    let cache = RelationCache::connect(url).await?;
    let relations = cache.load_relations(&catalog.nations()).await?;
    if let Err(e) = cache.close().await {
        warn!(error = %e, "Failed to close relation cache");
    }
    Ok(relations)
}

/// The built-in relations, matched to `catalog` by nation name.
///
/// Pairs naming a nation the catalog does not have are dropped.
pub fn default_relations(catalog: &Catalog) -> RelationMatrix {
    let Ok(builtin) = roster::catalog() else {
        return RelationMatrix::new();
    };
    let names: BTreeMap<NationId, String> = builtin
        .entries()
        .iter()
        .map(|entry| (entry.nation.id, entry.nation.name.to_lowercase()))
        .collect();
    let ids: BTreeMap<String, NationId> = catalog
        .entries()
        .iter()
        .map(|entry| (entry.nation.name.to_lowercase(), entry.nation.id))
        .collect();
    let resolve = |id: NationId| names.get(&id).and_then(|name| ids.get(name)).copied();

    let mut matrix = RelationMatrix::new();
    for ((from, to), value) in roster::relations().iter() {
        if let (Some(from), Some(to)) = (resolve(from), resolve(to)) {
            matrix.set(from, to, value);
        }
    }
    matrix
}
