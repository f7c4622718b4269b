//! Error types for the engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during engine startup.

/// Top-level error for the engine binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: geopolitics_core::config::ConfigError,
    },

    /// The catalog records are inconsistent.
    #[error("catalog error: {source}")]
    Catalog {
        /// The underlying catalog error.
        #[from]
        source: geopolitics_core::catalog::CatalogError,
    },

    /// A configured collaborator could not be read.
    #[error("database error: {source}")]
    Db {
        /// The underlying data-layer error.
        #[from]
        source: geopolitics_db::DbError,
    },

    /// Observer API server failed to start.
    #[error("observer error: {source}")]
    Observer {
        /// The underlying startup error.
        #[from]
        source: geopolitics_observer::StartupError,
    },
}
