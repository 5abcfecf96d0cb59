//! Shared type definitions for the Betty quest map.
//!
//! This crate is the single source of truth for the types exchanged
//! between the resolver, the data layer and the HTTP API. Types flow
//! downstream to `TypeScript` via `ts-rs` for the quest map UI.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for quests, curricula and users
//! - [`enums`] -- Quest category, publication status and quest status
//! - [`structs`] -- Entity records and the resolved quest map view

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{ParseEnumError, PublicationStatus, QuestCategory, QuestStatus};
pub use ids::{CurriculumId, QuestId, UserId};
pub use structs::{
    Blocker, Completion, Curriculum, PrerequisiteEdge, Quest, QuestBlockers, QuestMapStats,
    QuestMapView, QuestNode,
};
