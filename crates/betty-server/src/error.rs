//! Error types for the server binary.
//!
//! [`AppError`] is the top-level error type that wraps every failure mode
//! during startup and serving.

/// Top-level error for the server binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: betty_core::ConfigError,
    },

    /// The curriculum seed could not be loaded.
    #[error("seed error: {source}")]
    Seed {
        /// The underlying seed error.
        #[from]
        source: betty_core::SeedError,
    },

    /// Connecting to or migrating the database failed.
    #[error("database error: {source}")]
    Database {
        /// The underlying database error.
        #[from]
        source: betty_db::DbError,
    },

    /// The HTTP server failed to start or crashed.
    #[error("server error: {source}")]
    Server {
        /// The underlying server error.
        #[from]
        source: betty_api::ServerError,
    },
}
