//! `PostgreSQL` data layer for the Betty quest map.
//!
//! ```text
//! QuestMapService
//!     |
//!     +-- CurriculumStore (port, betty-core)
//!             |
//!             +-- PgCurriculumStore --> QuestStore --> PostgresPool
//! ```
//!
//! # Modules
//!
//! - [`postgres`] -- Connection pool, configuration and migrations
//! - [`quest_store`] -- Queries over curricula, quests, edges and completions
//! - [`pg_store`] -- The [`CurriculumStore`](betty_core::CurriculumStore)
//!   implementation
//! - [`error`] -- Shared error types

pub mod error;
pub mod pg_store;
pub mod postgres;
pub mod quest_store;

// Re-export primary types for convenience.
pub use error::DbError;
pub use pg_store::PgCurriculumStore;
pub use postgres::{PostgresConfig, PostgresPool};
pub use quest_store::{CurriculumRow, QuestRow, QuestStore};
