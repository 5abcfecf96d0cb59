//! Configuration, data-source ports and the quest map service for Betty.
//!
//! # Modules
//!
//! - [`config`] -- Typed `betty-config.yaml` with environment overrides.
//! - [`store`] -- The [`CurriculumStore`] port and [`StoreError`].
//! - [`memory`] -- [`MemoryStore`], an in-process store for tests and demos.
//! - [`seed`] -- YAML curriculum seeds for the memory store.
//! - [`service`] -- [`QuestMapService`], which fetches store data and runs
//!   the resolver from `betty-quests`.

pub mod config;
pub mod memory;
pub mod seed;
pub mod service;
pub mod store;

// Re-export primary types for convenience.
pub use config::{BettyConfig, ConfigError, StorageBackend};
pub use memory::MemoryStore;
pub use seed::{CurriculumSeed, SeedError, SeedSummary};
pub use service::{CurriculumQuests, QuestMapService, ServiceError, UserQuestMap};
pub use store::{CurriculumStore, StoreError};
