//! Linear-time variant of the availability resolver.
//!
//! [`resolve_topological`] produces exactly the same labels as
//! [`resolve_ids`](crate::resolver::resolve_ids) but runs in
//! `O(quests + edges)` instead of repeating full passes. It follows the
//! shape of Kahn's algorithm: every quest starts with an in-degree equal to
//! its number of distinct prerequisites, and each completed quest releases
//! one unit of in-degree on each of its dependents. A quest whose in-degree
//! reaches zero is unblocked.
//!
//! Only completions release dependents. An `Available` quest satisfies
//! nobody, so unlike a full topological sort the release never cascades
//! past one hop.

use std::collections::{BTreeMap, BTreeSet};

use betty_types::{PrerequisiteEdge, QuestId, QuestStatus};

use crate::resolver::prerequisites_by_quest;

/// Resolve statuses for a set of quest IDs using in-degree counting.
pub fn resolve_topological<I>(
    quest_ids: I,
    edges: &[PrerequisiteEdge],
    completed: &BTreeSet<QuestId>,
) -> BTreeMap<QuestId, QuestStatus>
where
    I: IntoIterator<Item = QuestId>,
{
    let ids: BTreeSet<QuestId> = quest_ids.into_iter().collect();
    let prerequisites = prerequisites_by_quest(edges);

    let mut in_degree: BTreeMap<QuestId, usize> = ids
        .iter()
        .map(|id| (*id, prerequisites.get(id).map_or(0, BTreeSet::len)))
        .collect();

    let mut dependents: BTreeMap<QuestId, Vec<QuestId>> = BTreeMap::new();
    for (to_id, from_ids) in &prerequisites {
        if !ids.contains(to_id) {
            continue;
        }
        for from_id in from_ids {
            dependents.entry(*from_id).or_default().push(*to_id);
        }
    }

    // Only completions on the map release anything. A completed ID that is
    // not a quest here behaves like a dangling prerequisite.
    for done in ids.iter().filter(|id| completed.contains(*id)) {
        let Some(children) = dependents.get(done) else {
            continue;
        };
        for child in children {
            if let Some(degree) = in_degree.get_mut(child) {
                *degree = degree.saturating_sub(1);
            }
        }
    }

    ids.into_iter()
        .map(|id| {
            let status = if completed.contains(&id) {
                QuestStatus::Completed
            } else if in_degree.get(&id) == Some(&0) {
                QuestStatus::Available
            } else {
                QuestStatus::Locked
            };
            (id, status)
        })
        .collect()
}
