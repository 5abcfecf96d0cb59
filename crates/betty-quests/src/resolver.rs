//! Quest availability resolution.
//!
//! Given the quests on a map, the prerequisite edges between them and the
//! set of quests a user has completed, [`resolve`] labels every quest
//! [`Completed`](QuestStatus::Completed), [`Available`](QuestStatus::Available)
//! or [`Locked`](QuestStatus::Locked).
//!
//! # Algorithm
//!
//! Labels are assigned by repeated full passes until a pass adds nothing:
//!
//! 1. Quests in the completion set (and on the map) are `Completed`.
//! 2. An unlabelled quest becomes `Available` when it has no prerequisites
//!    or every prerequisite is already labelled `Completed`.
//! 3. Whatever is still unlabelled at the fixed point is `Locked`.
//!
//! A prerequisite that is not on the map never gets a label, so its
//! dependents stay locked. Cycles need no special handling: members without
//! a completed entry point simply never become satisfiable.
//!
//! The function is pure. It allocates only local state and may be called
//! concurrently for any number of users.

use std::collections::{BTreeMap, BTreeSet};

use betty_types::{PrerequisiteEdge, Quest, QuestId, QuestStatus};

/// Resolve the status of every quest in `quests`.
///
/// Callers pass only quests eligible for display (see
/// [`published_only`](crate::scope::published_only)); this function does
/// not look at publication status.
pub fn resolve(
    quests: &[Quest],
    edges: &[PrerequisiteEdge],
    completed: &BTreeSet<QuestId>,
) -> BTreeMap<QuestId, QuestStatus> {
    resolve_ids(quests.iter().map(|quest| quest.id), edges, completed)
}

/// Resolve statuses for a bare set of quest IDs.
///
/// Same semantics as [`resolve`]. Duplicate IDs are collapsed.
pub fn resolve_ids<I>(
    quest_ids: I,
    edges: &[PrerequisiteEdge],
    completed: &BTreeSet<QuestId>,
) -> BTreeMap<QuestId, QuestStatus>
where
    I: IntoIterator<Item = QuestId>,
{
    let ids: BTreeSet<QuestId> = quest_ids.into_iter().collect();
    let prerequisites = prerequisites_by_quest(edges);

    let mut statuses: BTreeMap<QuestId, QuestStatus> = ids
        .iter()
        .filter(|id| completed.contains(*id))
        .map(|id| (*id, QuestStatus::Completed))
        .collect();

    loop {
        let mut labelled_this_pass = false;

        for id in &ids {
            if statuses.contains_key(id) {
                continue;
            }
            let satisfied = prerequisites.get(id).is_none_or(|prereqs| {
                prereqs
                    .iter()
                    .all(|prereq| statuses.get(prereq) == Some(&QuestStatus::Completed))
            });
            if satisfied {
                statuses.insert(*id, QuestStatus::Available);
                labelled_this_pass = true;
            }
        }

        if !labelled_this_pass {
            break;
        }
    }

    for id in ids {
        statuses.entry(id).or_insert(QuestStatus::Locked);
    }

    statuses
}

/// Group edges by their dependent quest.
///
/// The result maps each `to_id` to the distinct `from_id`s it requires.
pub fn prerequisites_by_quest(
    edges: &[PrerequisiteEdge],
) -> BTreeMap<QuestId, BTreeSet<QuestId>> {
    let mut index: BTreeMap<QuestId, BTreeSet<QuestId>> = BTreeMap::new();
    for edge in edges {
        index.entry(edge.to_id).or_default().insert(edge.from_id);
    }
    index
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<QuestId> {
        (0..n).map(|_| QuestId::new()).collect()
    }

    fn set(items: &[QuestId]) -> BTreeSet<QuestId> {
        items.iter().copied().collect()
    }

    fn edge(from: QuestId, to: QuestId) -> PrerequisiteEdge {
        PrerequisiteEdge::new(from, to)
    }

    #[test]
    fn no_edges_everything_available_or_completed() {
        let q = ids(4);
        let statuses = resolve_ids(q.clone(), &[], &set(&q[..2]));

        assert_eq!(statuses[&q[0]], QuestStatus::Completed);
        assert_eq!(statuses[&q[1]], QuestStatus::Completed);
        assert_eq!(statuses[&q[2]], QuestStatus::Available);
        assert_eq!(statuses[&q[3]], QuestStatus::Available);
    }

    #[test]
    fn chain_with_root_completed() {
        let q = ids(3);
        let edges = [edge(q[0], q[1]), edge(q[1], q[2])];
        let statuses = resolve_ids(q.clone(), &edges, &set(&q[..1]));

        assert_eq!(statuses[&q[0]], QuestStatus::Completed);
        assert_eq!(statuses[&q[1]], QuestStatus::Available);
        assert_eq!(statuses[&q[2]], QuestStatus::Locked);
    }

    #[test]
    fn chain_with_two_completed_unlocks_third() {
        let q = ids(3);
        let edges = [edge(q[0], q[1]), edge(q[1], q[2])];
        let statuses = resolve_ids(q.clone(), &edges, &set(&q[..2]));

        assert_eq!(statuses[&q[2]], QuestStatus::Available);
    }

    #[test]
    fn diamond_requires_every_parent() {
        let [a, b, c, d] = [QuestId::new(), QuestId::new(), QuestId::new(), QuestId::new()];
        let edges = [edge(a, b), edge(a, c), edge(b, d), edge(c, d)];
        let statuses = resolve_ids([a, b, c, d], &edges, &set(&[a, b]));

        assert_eq!(statuses[&c], QuestStatus::Available);
        assert_eq!(statuses[&d], QuestStatus::Locked);
    }

    #[test]
    fn dangling_prerequisite_locks_dependents_transitively() {
        let [x, y, ghost] = [QuestId::new(), QuestId::new(), QuestId::new()];
        let edges = [edge(ghost, x), edge(x, y)];

        // Even claiming the ghost as completed does not help: it is not on
        // the map, so it never receives a label.
        let statuses = resolve_ids([x, y], &edges, &set(&[ghost]));

        assert_eq!(statuses[&x], QuestStatus::Locked);
        assert_eq!(statuses[&y], QuestStatus::Locked);
        assert!(!statuses.contains_key(&ghost));
    }

    #[test]
    fn two_cycle_without_entry_point_is_locked() {
        let [a, b] = [QuestId::new(), QuestId::new()];
        let edges = [edge(a, b), edge(b, a)];
        let statuses = resolve_ids([a, b], &edges, &BTreeSet::new());

        assert_eq!(statuses[&a], QuestStatus::Locked);
        assert_eq!(statuses[&b], QuestStatus::Locked);
    }

    #[test]
    fn completed_cycle_member_opens_the_other() {
        let [a, b] = [QuestId::new(), QuestId::new()];
        let edges = [edge(a, b), edge(b, a)];
        let statuses = resolve_ids([a, b], &edges, &set(&[a]));

        assert_eq!(statuses[&a], QuestStatus::Completed);
        assert_eq!(statuses[&b], QuestStatus::Available);
    }

    #[test]
    fn completed_wins_over_unsatisfied_prerequisites() {
        let [a, b] = [QuestId::new(), QuestId::new()];
        let statuses = resolve_ids([a, b], &[edge(a, b)], &set(&[b]));

        assert_eq!(statuses[&a], QuestStatus::Available);
        assert_eq!(statuses[&b], QuestStatus::Completed);
    }

    #[test]
    fn single_root_with_three_deep_chain() {
        let q = ids(4);
        let edges = [edge(q[0], q[1]), edge(q[1], q[2]), edge(q[2], q[3])];
        let statuses = resolve_ids(q.clone(), &edges, &set(&q[..2]));

        let expected: BTreeMap<QuestId, QuestStatus> = [
            (q[0], QuestStatus::Completed),
            (q[1], QuestStatus::Completed),
            (q[2], QuestStatus::Available),
            (q[3], QuestStatus::Locked),
        ]
        .into_iter()
        .collect();
        assert_eq!(statuses, expected);
    }

    #[test]
    fn completions_off_the_map_are_ignored() {
        let [a, stranger] = [QuestId::new(), QuestId::new()];
        let statuses = resolve_ids([a], &[], &set(&[stranger]));

        assert_eq!(statuses.len(), 1);
        assert_eq!(statuses[&a], QuestStatus::Available);
    }

    #[test]
    fn duplicate_edges_behave_like_one() {
        let [a, b] = [QuestId::new(), QuestId::new()];
        let once = resolve_ids([a, b], &[edge(a, b)], &set(&[a]));
        let twice = resolve_ids([a, b], &[edge(a, b), edge(a, b)], &set(&[a]));

        assert_eq!(once, twice);
    }

    #[test]
    fn resolving_twice_gives_identical_maps() {
        let q = ids(5);
        let edges = [edge(q[0], q[1]), edge(q[1], q[2]), edge(q[3], q[4])];
        let done = set(&q[..1]);

        assert_eq!(resolve_ids(q.clone(), &edges, &done), resolve_ids(q, &edges, &done));
    }

    #[test]
    fn prerequisite_index_deduplicates() {
        let [a, b] = [QuestId::new(), QuestId::new()];
        let index = prerequisites_by_quest(&[edge(a, b), edge(a, b)]);

        assert_eq!(index.len(), 1);
        assert_eq!(index[&b].len(), 1);
    }
}
