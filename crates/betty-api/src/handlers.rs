//! REST API endpoint handlers.
//!
//! Every handler goes through [`QuestMapService`](betty_core::QuestMapService),
//! which re-reads the store and re-resolves on each request.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/health` | Liveness probe |
//! | `GET` | `/api/curricula` | List curricula |
//! | `GET` | `/api/curricula/:cid/quests` | Published quests and edges |
//! | `GET` | `/api/curricula/:cid/users/:uid/quest-map` | Resolved quest map |
//! | `GET` | `/api/curricula/:cid/users/:uid/quests/:qid/blockers` | Unfinished prerequisites |
//! | `POST` | `/api/curricula/:cid/users/:uid/quests/:qid/complete` | Submit a quest |
//! | `GET` | `/api/curricula/:cid/diagnostics` | Graph data-quality report |

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use betty_types::{CurriculumId, QuestId, UserId};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// GET /health
// ---------------------------------------------------------------------------

/// Liveness probe.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ---------------------------------------------------------------------------
// GET /api/curricula
// ---------------------------------------------------------------------------

/// List all curricula.
pub async fn list_curricula(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let curricula = state.service.list_curricula().await?;

    Ok(Json(serde_json::json!({
        "count": curricula.len(),
        "curricula": curricula,
    })))
}

// ---------------------------------------------------------------------------
// GET /api/curricula/:cid/quests
// ---------------------------------------------------------------------------

/// Published quests of a curriculum with the edges between them.
pub async fn curriculum_quests(
    State(state): State<Arc<AppState>>,
    Path(curriculum_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let curriculum_id = CurriculumId::from(parse_uuid(&curriculum_id)?);
    let data = state.service.curriculum(curriculum_id).await?;

    Ok(Json(serde_json::json!({
        "curriculum": data.curriculum,
        "count": data.quests.len(),
        "quests": data.quests,
        "edges": data.edges,
    })))
}

// ---------------------------------------------------------------------------
// GET /api/curricula/:cid/users/:uid/quest-map
// ---------------------------------------------------------------------------

/// The user's quest map: every published quest with its status.
pub async fn quest_map(
    State(state): State<Arc<AppState>>,
    Path((curriculum_id, user_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let curriculum_id = CurriculumId::from(parse_uuid(&curriculum_id)?);
    let user_id = UserId::from(parse_uuid(&user_id)?);

    let resolved = state.service.quest_map(curriculum_id, user_id).await?;
    Ok(Json(resolved.view()))
}

// ---------------------------------------------------------------------------
// GET /api/curricula/:cid/users/:uid/quests/:qid/blockers
// ---------------------------------------------------------------------------

/// Prerequisites the user still has to finish before a quest unlocks.
///
/// Blockers missing from the curriculum are reported too; they keep the
/// quest locked for good.
pub async fn quest_blockers(
    State(state): State<Arc<AppState>>,
    Path((curriculum_id, user_id, quest_id)): Path<(String, String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let curriculum_id = CurriculumId::from(parse_uuid(&curriculum_id)?);
    let user_id = UserId::from(parse_uuid(&user_id)?);
    let quest_id = QuestId::from(parse_uuid(&quest_id)?);

    let report = state
        .service
        .blockers(curriculum_id, user_id, quest_id)
        .await?;
    Ok(Json(report))
}

// ---------------------------------------------------------------------------
// POST /api/curricula/:cid/users/:uid/quests/:qid/complete
// ---------------------------------------------------------------------------

/// Mark a quest as completed and return the refreshed quest map.
///
/// Locked quests are refused with `409 Conflict`. Completing a quest twice
/// is harmless.
pub async fn complete_quest(
    State(state): State<Arc<AppState>>,
    Path((curriculum_id, user_id, quest_id)): Path<(String, String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let curriculum_id = CurriculumId::from(parse_uuid(&curriculum_id)?);
    let user_id = UserId::from(parse_uuid(&user_id)?);
    let quest_id = QuestId::from(parse_uuid(&quest_id)?);

    let resolved = state
        .service
        .complete_quest(curriculum_id, user_id, quest_id)
        .await?;
    Ok(Json(resolved.view()))
}

// ---------------------------------------------------------------------------
// GET /api/curricula/:cid/diagnostics
// ---------------------------------------------------------------------------

/// Dangling prerequisites, self-references and cycles in a curriculum.
pub async fn diagnostics(
    State(state): State<Arc<AppState>>,
    Path(curriculum_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let curriculum_id = CurriculumId::from(parse_uuid(&curriculum_id)?);
    let diagnostics = state.service.diagnostics(curriculum_id).await?;

    Ok(Json(serde_json::json!({
        "curriculum_id": curriculum_id,
        "count": diagnostics.len(),
        "diagnostics": diagnostics,
    })))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_uuid(s: &str) -> Result<Uuid, ApiError> {
    s.parse::<Uuid>()
        .map_err(|e| ApiError::InvalidUuid(format!("{s}: {e}")))
}
