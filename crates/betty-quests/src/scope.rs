//! Helpers that prepare resolver input from raw store output.
//!
//! The stores return every quest of a curriculum (drafts included) and
//! sometimes every edge in the system. These functions narrow both down
//! without changing resolution semantics.

use std::collections::BTreeSet;

use betty_types::{PrerequisiteEdge, Quest, QuestId};

/// Keep only quests that learners can see.
pub fn published_only(quests: Vec<Quest>) -> Vec<Quest> {
    quests.into_iter().filter(Quest::is_published).collect()
}

/// Keep only edges that point into one of `quests`.
///
/// The prerequisite end is deliberately not checked: an edge from an
/// unknown (or draft) quest must survive so its dependent stays locked.
pub fn edges_into(quests: &[Quest], edges: Vec<PrerequisiteEdge>) -> Vec<PrerequisiteEdge> {
    let on_map: BTreeSet<QuestId> = quests.iter().map(|quest| quest.id).collect();
    edges
        .into_iter()
        .filter(|edge| on_map.contains(&edge.to_id))
        .collect()
}
