//! Quest availability resolution for the Betty quest map.
//!
//! A curriculum is a small directed graph: quests are nodes and each
//! prerequisite edge says "this quest requires that one". For a given user
//! every quest is either completed, available or locked, and this crate
//! computes that labelling.
//!
//! # Modules
//!
//! - [`resolver`] -- The fixed-point resolver ([`resolve`]).
//! - [`topological`] -- An equivalent in-degree based resolver for large
//!   graphs ([`resolve_topological`]).
//! - [`graph`] -- [`QuestGraph`] lookups, blockers and data-quality
//!   diagnostics.
//! - [`map`] -- [`QuestMap`], the resolved projection with stats and the UI
//!   view.
//! - [`scope`] -- Filtering raw store output down to resolver input.
//!
//! Everything here is synchronous and free of I/O.

pub mod graph;
pub mod map;
pub mod resolver;
pub mod scope;
pub mod topological;

// Re-export primary types at crate root.
pub use graph::{GraphDiagnostic, QuestGraph};
pub use map::QuestMap;
pub use resolver::{prerequisites_by_quest, resolve, resolve_ids};
pub use scope::{edges_into, published_only};
pub use topological::resolve_topological;
