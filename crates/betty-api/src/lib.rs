//! REST API for the Betty quest map.
//!
//! A thin Axum layer over [`QuestMapService`](betty_core::QuestMapService):
//! handlers parse path IDs, call the service and serialize the result.
//! The resolver runs on every request; nothing is cached.
//!
//! # Modules
//!
//! - [`router`] -- Route table and middleware
//! - [`handlers`] -- Endpoint handlers
//! - [`server`] -- TCP binding and graceful shutdown
//! - [`state`] -- Shared [`AppState`]
//! - [`error`] -- [`ApiError`] and its JSON response mapping

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;

// Re-export primary types for convenience.
pub use error::ApiError;
pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
pub use state::AppState;
