//! Core entity and view structs for the Betty quest map.
//!
//! Entities ([`Curriculum`], [`Quest`], [`PrerequisiteEdge`], [`Completion`])
//! mirror the stored records. View types ([`QuestNode`], [`QuestMapStats`],
//! [`QuestMapView`]) are what the UI receives after resolution.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{PublicationStatus, QuestCategory, QuestStatus};
use crate::ids::{CurriculumId, QuestId, UserId};

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// A named collection of quests and their prerequisite edges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Curriculum {
    /// Unique identifier.
    pub id: CurriculumId,
    /// Display name.
    pub name: String,
    /// Free-form description shown on the curriculum overview.
    pub description: String,
    /// When the curriculum was created.
    pub created_at: DateTime<Utc>,
}

/// A unit of learning content with an XP reward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Quest {
    /// Unique identifier.
    pub id: QuestId,
    /// The curriculum this quest belongs to.
    pub curriculum_id: CurriculumId,
    /// Display title.
    pub title: String,
    /// Subject tag.
    pub category: QuestCategory,
    /// XP awarded on completion.
    pub xp: u32,
    /// Whether learners can see the quest.
    pub status: PublicationStatus,
}

impl Quest {
    /// Create a published quest with a fresh ID.
    pub fn published(
        curriculum_id: CurriculumId,
        title: &str,
        category: QuestCategory,
        xp: u32,
    ) -> Self {
        Self {
            id: QuestId::new(),
            curriculum_id,
            title: title.to_owned(),
            category,
            xp,
            status: PublicationStatus::Published,
        }
    }

    /// Return the quest with its publication status replaced.
    #[must_use]
    pub const fn with_status(mut self, status: PublicationStatus) -> Self {
        self.status = status;
        self
    }

    /// Whether the quest is visible to learners.
    pub fn is_published(&self) -> bool {
        self.status == PublicationStatus::Published
    }
}

/// Directed prerequisite: `to_id` requires `from_id` to be completed first.
///
/// Several edges into the same quest combine with AND semantics. Either
/// endpoint may reference a quest that does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PrerequisiteEdge {
    /// The prerequisite quest.
    pub from_id: QuestId,
    /// The dependent quest.
    pub to_id: QuestId,
}

impl PrerequisiteEdge {
    /// Create an edge meaning "`to` requires `from`".
    pub const fn new(from_id: QuestId, to_id: QuestId) -> Self {
        Self { from_id, to_id }
    }
}

/// Record of a user finishing a quest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Completion {
    /// The user who completed the quest.
    pub user_id: UserId,
    /// The completed quest.
    pub quest_id: QuestId,
    /// When the completion was recorded.
    pub completed_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// A quest as rendered on a user's map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct QuestNode {
    /// Quest identifier.
    pub id: QuestId,
    /// Display title.
    pub title: String,
    /// Subject tag.
    pub category: QuestCategory,
    /// XP awarded on completion.
    pub xp: u32,
    /// Resolved status for the viewing user.
    pub status: QuestStatus,
    /// Whether the UI should let the user open the quest.
    pub navigable: bool,
}

/// A prerequisite that still stands between a user and a quest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Blocker {
    /// The prerequisite quest.
    pub id: QuestId,
    /// Its title, when the quest is on the map.
    pub title: Option<String>,
    /// `false` for a prerequisite missing from the curriculum, which can
    /// never be completed.
    pub exists: bool,
}

/// Why a quest has the status it has.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct QuestBlockers {
    /// The quest being explained.
    pub quest_id: QuestId,
    /// Its resolved status for the user.
    pub status: QuestStatus,
    /// Prerequisites not yet completed.
    pub blockers: Vec<Blocker>,
}

/// Aggregate counts over a resolved quest map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct QuestMapStats {
    /// Number of quests on the map.
    pub total: u32,
    /// Quests the user has completed.
    pub completed: u32,
    /// Quests the user can start now.
    pub available: u32,
    /// Quests still blocked by prerequisites.
    pub locked: u32,
    /// XP earned from completed quests.
    pub xp_earned: u64,
    /// XP on offer from currently available quests.
    pub xp_available: u64,
}

/// Everything the UI needs to draw one user's quest map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct QuestMapView {
    /// The curriculum being shown.
    pub curriculum_id: CurriculumId,
    /// The viewing user.
    pub user_id: UserId,
    /// Quest nodes in curriculum order.
    pub nodes: Vec<QuestNode>,
    /// Prerequisite edges drawn between nodes.
    pub edges: Vec<PrerequisiteEdge>,
    /// Summary counts.
    pub stats: QuestMapStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn published_constructor_sets_status() {
        let quest = Quest::published(CurriculumId::new(), "Hello HTML", QuestCategory::Frontend, 50);
        assert!(quest.is_published());
        assert_eq!(quest.xp, 50);

        let draft = quest.with_status(PublicationStatus::Draft);
        assert!(!draft.is_published());
    }

    #[test]
    fn edge_json_uses_id_suffixes() {
        let edge = PrerequisiteEdge::new(QuestId::new(), QuestId::new());
        let json = serde_json::to_value(edge).ok();
        let json = json.unwrap_or_default();
        assert!(json.get("from_id").is_some());
        assert!(json.get("to_id").is_some());
    }
}
