//! Error types for the data layer.
//!
//! All errors are propagated via [`DbError`] which wraps the underlying
//! [`sqlx`] and [`fred`] errors with additional context about which
//! operation failed.

use geopolitics_core::catalog::CatalogError;

/// Errors that can occur in the data layer.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// A `PostgreSQL` operation failed.
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),

    /// A `Dragonfly`/Redis operation failed.
    #[error("Dragonfly error: {0}")]
    Dragonfly(#[from] fred::error::Error),

    /// A serialization or deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored record cannot be turned into a domain value.
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// The loaded records do not form a usable catalog.
    #[error("Invalid catalog: {0}")]
    Catalog(#[from] CatalogError),

    /// A configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}
