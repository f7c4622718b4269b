//! Data layer for the Geopolitics 2025 simulation (`PostgreSQL` + `Dragonfly`).
//!
//! Both stores are read once at startup and never written by the engine.
//!
//! ```text
//! Engine bootstrap
//!     |
//!     +-- nations, leaders, alliances --> PostgreSQL (CatalogStore)
//!     |
//!     +-- pairwise relations ----------> Dragonfly (RelationCache)
//! ```
//!
//! Either store may be absent, in which case the engine falls back to the
//! built-in roster in `geopolitics_core::roster`.
//!
//! # Modules
//!
//! - [`postgres`] -- `PostgreSQL` connection pool and configuration
//! - [`catalog_store`] -- Catalog queries and row conversion
//! - [`dragonfly`] -- `Dragonfly` (Redis-compatible) relation reader
//! - [`error`] -- Shared error types

pub mod catalog_store;
pub mod dragonfly;
pub mod error;
pub mod postgres;

// Re-export primary types for convenience.
pub use catalog_store::{AllianceMemberRow, AllianceRow, CatalogStore, NationRow};
pub use dragonfly::RelationCache;
pub use error::DbError;
pub use postgres::{PostgresConfig, PostgresPool};
