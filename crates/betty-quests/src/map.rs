//! Owned projection of one resolution, ready for the UI.

use std::collections::{BTreeMap, BTreeSet};

use betty_types::{
    CurriculumId, PrerequisiteEdge, Quest, QuestId, QuestMapStats, QuestMapView, QuestNode,
    QuestStatus, UserId,
};

use crate::resolver::resolve;

/// Resolved statuses for one user on one curriculum.
///
/// A `QuestMap` is never updated in place. When quests, edges or
/// completions change, resolve again.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestMap {
    statuses: BTreeMap<QuestId, QuestStatus>,
}

impl QuestMap {
    /// Run the resolver and wrap its output.
    pub fn resolve(
        quests: &[Quest],
        edges: &[PrerequisiteEdge],
        completed: &BTreeSet<QuestId>,
    ) -> Self {
        Self {
            statuses: resolve(quests, edges, completed),
        }
    }

    /// Status of a quest, or `None` if it is not on the map.
    pub fn status(&self, id: QuestId) -> Option<QuestStatus> {
        self.statuses.get(&id).copied()
    }

    /// Whether the user may open the quest.
    pub fn is_navigable(&self, id: QuestId) -> bool {
        self.status(id).is_some_and(QuestStatus::is_navigable)
    }

    /// Borrow the full status map.
    pub const fn statuses(&self) -> &BTreeMap<QuestId, QuestStatus> {
        &self.statuses
    }

    /// Number of quests on the map.
    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    /// Whether the map has no quests.
    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }

    /// IDs of all quests with the given status.
    pub fn ids_with(&self, status: QuestStatus) -> Vec<QuestId> {
        self.statuses
            .iter()
            .filter(|(_, s)| **s == status)
            .map(|(id, _)| *id)
            .collect()
    }

    /// Aggregate counts and XP totals.
    ///
    /// `quests` supplies XP values; quests missing from it count as 0 XP.
    pub fn stats(&self, quests: &[Quest]) -> QuestMapStats {
        let xp_by_id: BTreeMap<QuestId, u32> =
            quests.iter().map(|quest| (quest.id, quest.xp)).collect();

        let mut stats = QuestMapStats {
            total: saturating_u32(self.statuses.len()),
            ..QuestMapStats::default()
        };

        for (id, status) in &self.statuses {
            let xp = u64::from(xp_by_id.get(id).copied().unwrap_or(0));
            match status {
                QuestStatus::Completed => {
                    stats.completed = stats.completed.saturating_add(1);
                    stats.xp_earned = stats.xp_earned.saturating_add(xp);
                }
                QuestStatus::Available => {
                    stats.available = stats.available.saturating_add(1);
                    stats.xp_available = stats.xp_available.saturating_add(xp);
                }
                QuestStatus::Locked => {
                    stats.locked = stats.locked.saturating_add(1);
                }
            }
        }

        stats
    }

    /// Build the view sent to the UI.
    ///
    /// Nodes keep the order of `quests`; quests not on the map and repeated
    /// IDs are skipped.
    pub fn to_view(
        &self,
        curriculum_id: CurriculumId,
        user_id: UserId,
        quests: &[Quest],
        edges: &[PrerequisiteEdge],
    ) -> QuestMapView {
        let mut seen = BTreeSet::new();
        let nodes = quests
            .iter()
            .filter(|quest| seen.insert(quest.id))
            .filter_map(|quest| {
                self.status(quest.id).map(|status| QuestNode {
                    id: quest.id,
                    title: quest.title.clone(),
                    category: quest.category,
                    xp: quest.xp,
                    status,
                    navigable: status.is_navigable(),
                })
            })
            .collect();

        QuestMapView {
            curriculum_id,
            user_id,
            nodes,
            edges: edges.to_vec(),
            stats: self.stats(quests),
        }
    }
}

fn saturating_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}
