//! Betty quest map server.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `betty-config.yaml` (or the path given as
//!    the first argument), falling back to defaults
//! 2. Initialize structured logging (tracing)
//! 3. Build the curriculum store: in-memory with an optional YAML seed,
//!    or `PostgreSQL` with migrations
//! 4. Serve the REST API until `Ctrl-C`
//! 5. Close the database pool, if any

mod error;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use betty_api::{AppState, ServerConfig};
use betty_core::config::{LoggingConfig, StorageConfig};
use betty_core::{
    BettyConfig, CurriculumSeed, CurriculumStore, MemoryStore, QuestMapService, StorageBackend,
};
use betty_db::{PgCurriculumStore, PostgresConfig, PostgresPool};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::AppError;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "betty-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, storage setup or the HTTP server
/// fails.
#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config_path = std::env::args_os()
        .nth(1)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    let (config, from_file) = load_config(&config_path)?;

    init_tracing(&config.logging);
    info!(
        config = %config_path.display(),
        from_file,
        backend = ?config.storage.backend,
        port = config.server.port,
        "betty-server starting"
    );

    let storage = build_store(&config.storage).await?;
    let state = Arc::new(AppState::new(QuestMapService::new(storage.store)));

    let served = betty_api::start_server(&ServerConfig::from(&config.server), state).await;

    if let Some(pool) = storage.pool {
        pool.close().await;
    }
    served?;
    Ok(())
}

/// Read the config file if it exists. Environment overrides apply either way.
fn load_config(path: &Path) -> Result<(BettyConfig, bool), AppError> {
    if path.exists() {
        Ok((BettyConfig::from_file(path)?, true))
    } else {
        let mut config = BettyConfig::default();
        config.apply_env_overrides();
        Ok((config, false))
    }
}

/// Install the global subscriber. `RUST_LOG` wins over `logging.level`.
fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}

/// The configured store, plus the pool behind it when it is `PostgreSQL`.
struct Storage {
    store: Arc<dyn CurriculumStore>,
    pool: Option<PostgresPool>,
}

async fn build_store(storage: &StorageConfig) -> Result<Storage, AppError> {
    match storage.backend {
        StorageBackend::Memory => {
            let store = MemoryStore::new();
            if let Some(seed_path) = &storage.seed_path {
                let seed = CurriculumSeed::from_file(seed_path)?;
                let summary = seed.load_into(&store).await?;
                info!(
                    seed = %seed_path.display(),
                    curricula = summary.curricula,
                    quests = summary.quests,
                    edges = summary.edges,
                    dangling_edges = summary.dangling_edges,
                    completions = summary.completions,
                    "Curriculum seed loaded"
                );
            } else {
                info!("No seed configured, starting with an empty memory store");
            }
            Ok(Storage {
                store: Arc::new(store),
                pool: None,
            })
        }
        StorageBackend::Postgres => {
            let pool = PostgresPool::connect(&PostgresConfig::from(storage)).await?;
            pool.ping().await?;
            if storage.run_migrations {
                pool.run_migrations().await?;
            }
            Ok(Storage {
                store: Arc::new(PgCurriculumStore::new(pool.clone())),
                pool: Some(pool),
            })
        }
    }
}
