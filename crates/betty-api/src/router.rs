//! Axum router construction.
//!
//! Assembles all routes into a single [`Router`] with CORS enabled for the
//! browser client and request tracing.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router.
///
/// See [`handlers`] for the endpoint table. CORS allows any origin.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/curricula", get(handlers::list_curricula))
        .route(
            "/api/curricula/{curriculum_id}/quests",
            get(handlers::curriculum_quests),
        )
        .route(
            "/api/curricula/{curriculum_id}/diagnostics",
            get(handlers::diagnostics),
        )
        .route(
            "/api/curricula/{curriculum_id}/users/{user_id}/quest-map",
            get(handlers::quest_map),
        )
        .route(
            "/api/curricula/{curriculum_id}/users/{user_id}/quests/{quest_id}/blockers",
            get(handlers::quest_blockers),
        )
        .route(
            "/api/curricula/{curriculum_id}/users/{user_id}/quests/{quest_id}/complete",
            post(handlers::complete_quest),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
