//! Prerequisite graph over the quests of one curriculum.
//!
//! [`QuestGraph`] indexes quests and edges for lookups the UI and authors
//! need: prerequisites and dependents of a quest, what still blocks a
//! quest for a user, and data-quality diagnostics.
//!
//! Diagnostics are informational only. A dangling prerequisite or a cycle
//! is reported by [`QuestGraph::validate`] but resolution still treats it
//! the usual way (the affected quests stay locked).

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use betty_types::{PrerequisiteEdge, Quest, QuestId};
use serde::Serialize;

use crate::map::QuestMap;
use crate::resolver::prerequisites_by_quest;

/// A data-quality problem in a curriculum's prerequisite graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GraphDiagnostic {
    /// An edge requires a quest that is not part of the curriculum.
    DanglingPrerequisite {
        /// The quest that can never be unlocked.
        quest_id: QuestId,
        /// The prerequisite that does not exist.
        missing_id: QuestId,
    },
    /// A quest lists itself as a prerequisite.
    SelfPrerequisite {
        /// The offending quest.
        quest_id: QuestId,
    },
    /// Some quests sit on (or behind) a prerequisite cycle.
    Cycle {
        /// Quests a topological walk could not reach.
        unresolved: Vec<QuestId>,
    },
}

impl core::fmt::Display for GraphDiagnostic {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::DanglingPrerequisite {
                quest_id,
                missing_id,
            } => write!(
                f,
                "quest {quest_id} requires {missing_id}, which is not in the curriculum"
            ),
            Self::SelfPrerequisite { quest_id } => {
                write!(f, "quest {quest_id} lists itself as a prerequisite")
            }
            Self::Cycle { unresolved } => write!(
                f,
                "prerequisite cycle detected; {} quest(s) cannot be ordered",
                unresolved.len()
            ),
        }
    }
}

/// Indexed quests and prerequisite edges of one curriculum.
#[derive(Debug, Clone)]
pub struct QuestGraph {
    quests: BTreeMap<QuestId, Quest>,
    order: Vec<QuestId>,
    edges: Vec<PrerequisiteEdge>,
    prerequisites: BTreeMap<QuestId, BTreeSet<QuestId>>,
    dependents: BTreeMap<QuestId, BTreeSet<QuestId>>,
}

impl QuestGraph {
    /// Build a graph from quests and edges.
    ///
    /// Duplicate quest IDs are collapsed (last wins, first position kept).
    pub fn new(quests: Vec<Quest>, edges: Vec<PrerequisiteEdge>) -> Self {
        let mut map = BTreeMap::new();
        let mut order = Vec::with_capacity(quests.len());
        for quest in quests {
            if map.insert(quest.id, quest.clone()).is_none() {
                order.push(quest.id);
            }
        }

        let prerequisites = prerequisites_by_quest(&edges);
        let mut dependents: BTreeMap<QuestId, BTreeSet<QuestId>> = BTreeMap::new();
        for edge in &edges {
            dependents.entry(edge.from_id).or_default().insert(edge.to_id);
        }

        Self {
            quests: map,
            order,
            edges,
            prerequisites,
            dependents,
        }
    }

    /// Look up a quest by ID.
    pub fn get(&self, id: QuestId) -> Option<&Quest> {
        self.quests.get(&id)
    }

    /// Whether the quest is part of the graph.
    pub fn contains(&self, id: QuestId) -> bool {
        self.quests.contains_key(&id)
    }

    /// Number of quests.
    pub fn len(&self) -> usize {
        self.quests.len()
    }

    /// Whether the graph has no quests.
    pub fn is_empty(&self) -> bool {
        self.quests.is_empty()
    }

    /// Quests in insertion order.
    pub fn quests(&self) -> impl Iterator<Item = &Quest> {
        self.order.iter().filter_map(|id| self.quests.get(id))
    }

    /// All edges as given.
    pub fn edges(&self) -> &[PrerequisiteEdge] {
        &self.edges
    }

    /// Distinct prerequisites of a quest, including ones that do not exist.
    pub fn prerequisites_of(&self, id: QuestId) -> Vec<QuestId> {
        self.prerequisites
            .get(&id)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Quests that directly require `id`.
    pub fn dependents_of(&self, id: QuestId) -> Vec<QuestId> {
        self.dependents
            .get(&id)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Quests with no prerequisites at all.
    pub fn roots(&self) -> Vec<&Quest> {
        self.quests()
            .filter(|quest| !self.prerequisites.contains_key(&quest.id))
            .collect()
    }

    /// Edges whose prerequisite is not in the graph.
    pub fn dangling_edges(&self) -> Vec<PrerequisiteEdge> {
        self.edges
            .iter()
            .filter(|edge| !self.quests.contains_key(&edge.from_id))
            .copied()
            .collect()
    }

    /// Prerequisites of `id` that do not count as satisfied for a user
    /// with the given completions.
    ///
    /// A prerequisite is satisfied only if it is in the graph and in
    /// `completed`, matching how the resolver decides availability.
    pub fn blockers(&self, id: QuestId, completed: &BTreeSet<QuestId>) -> Vec<QuestId> {
        self.prerequisites
            .get(&id)
            .map(|set| {
                set.iter()
                    .filter(|prereq| {
                        !(self.quests.contains_key(*prereq) && completed.contains(*prereq))
                    })
                    .copied()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Resolve every quest in the graph for a user.
    pub fn resolve(&self, completed: &BTreeSet<QuestId>) -> QuestMap {
        let quests: Vec<Quest> = self.quests().cloned().collect();
        QuestMap::resolve(&quests, &self.edges, completed)
    }

    /// Report dangling prerequisites, self-references and cycles.
    ///
    /// An empty list means the graph is clean.
    pub fn validate(&self) -> Vec<GraphDiagnostic> {
        let mut diagnostics = Vec::new();

        for (quest_id, prereqs) in &self.prerequisites {
            if !self.quests.contains_key(quest_id) {
                continue;
            }
            for prereq in prereqs {
                if prereq == quest_id {
                    diagnostics.push(GraphDiagnostic::SelfPrerequisite {
                        quest_id: *quest_id,
                    });
                } else if !self.quests.contains_key(prereq) {
                    diagnostics.push(GraphDiagnostic::DanglingPrerequisite {
                        quest_id: *quest_id,
                        missing_id: *prereq,
                    });
                }
            }
        }

        // Kahn's algorithm over edges whose endpoints both exist. Anything
        // left unvisited is on a cycle or downstream of one.
        let mut in_degree: BTreeMap<QuestId, usize> =
            self.quests.keys().map(|id| (*id, 0)).collect();
        for (quest_id, prereqs) in &self.prerequisites {
            let Some(degree) = in_degree.get_mut(quest_id) else {
                continue;
            };
            let known = prereqs
                .iter()
                .filter(|prereq| self.quests.contains_key(*prereq))
                .count();
            *degree = degree.saturating_add(known);
        }

        let mut queue: VecDeque<QuestId> = in_degree
            .iter()
            .filter(|(_, degree)| **degree == 0)
            .map(|(id, _)| *id)
            .collect();

        let mut visited = BTreeSet::new();
        while let Some(node) = queue.pop_front() {
            visited.insert(node);
            let Some(children) = self.dependents.get(&node) else {
                continue;
            };
            for child in children {
                if let Some(degree) = in_degree.get_mut(child) {
                    *degree = degree.saturating_sub(1);
                    if *degree == 0 {
                        queue.push_back(*child);
                    }
                }
            }
        }

        if visited.len() != self.quests.len() {
            let unresolved = self
                .order
                .iter()
                .filter(|id| !visited.contains(*id))
                .copied()
                .collect();
            diagnostics.push(GraphDiagnostic::Cycle { unresolved });
        }

        diagnostics
    }
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use betty_types::{CurriculumId, QuestCategory, QuestStatus};

    use super::*;

    fn quests(n: usize) -> Vec<Quest> {
        let curriculum = CurriculumId::new();
        (0..n)
            .map(|i| {
                Quest::published(
                    curriculum,
                    &format!("Quest {i}"),
                    QuestCategory::Fundamentals,
                    10,
                )
            })
            .collect()
    }

    #[test]
    fn clean_chain_has_no_diagnostics() {
        let q = quests(3);
        let edges = vec![
            PrerequisiteEdge::new(q[0].id, q[1].id),
            PrerequisiteEdge::new(q[1].id, q[2].id),
        ];
        let graph = QuestGraph::new(q, edges);

        assert!(graph.validate().is_empty());
        assert_eq!(graph.roots().len(), 1);
    }

    #[test]
    fn dangling_prerequisite_is_reported_not_fixed() {
        let q = quests(1);
        let ghost = QuestId::new();
        let graph = QuestGraph::new(q.clone(), vec![PrerequisiteEdge::new(ghost, q[0].id)]);

        assert_eq!(
            graph.validate(),
            vec![GraphDiagnostic::DanglingPrerequisite {
                quest_id: q[0].id,
                missing_id: ghost,
            }]
        );
        assert_eq!(graph.dangling_edges().len(), 1);
        assert_eq!(graph.blockers(q[0].id, &BTreeSet::new()), vec![ghost]);

        let completed: BTreeSet<QuestId> = [ghost].into_iter().collect();
        assert_eq!(graph.blockers(q[0].id, &completed), vec![ghost]);
        assert_eq!(graph.resolve(&completed).status(q[0].id), Some(QuestStatus::Locked));
    }

    #[test]
    fn cycle_members_are_listed() {
        let q = quests(3);
        let edges = vec![
            PrerequisiteEdge::new(q[0].id, q[1].id),
            PrerequisiteEdge::new(q[1].id, q[0].id),
            PrerequisiteEdge::new(q[1].id, q[2].id),
        ];
        let graph = QuestGraph::new(q.clone(), edges);

        let diagnostics = graph.validate();
        assert_eq!(
            diagnostics,
            vec![GraphDiagnostic::Cycle {
                unresolved: vec![q[0].id, q[1].id, q[2].id],
            }]
        );
        assert!(diagnostics[0].to_string().contains("3 quest(s)"));
    }

    #[test]
    fn self_prerequisite_is_reported() {
        let q = quests(1);
        let graph = QuestGraph::new(q.clone(), vec![PrerequisiteEdge::new(q[0].id, q[0].id)]);

        let diagnostics = graph.validate();
        assert!(diagnostics.contains(&GraphDiagnostic::SelfPrerequisite { quest_id: q[0].id }));
    }

    #[test]
    fn blockers_shrink_as_prerequisites_complete() {
        let q = quests(3);
        let edges = vec![
            PrerequisiteEdge::new(q[0].id, q[2].id),
            PrerequisiteEdge::new(q[1].id, q[2].id),
        ];
        let graph = QuestGraph::new(q.clone(), edges);

        assert_eq!(graph.blockers(q[2].id, &BTreeSet::new()).len(), 2);

        let completed: BTreeSet<QuestId> = [q[0].id].into_iter().collect();
        assert_eq!(graph.blockers(q[2].id, &completed), vec![q[1].id]);
        assert_eq!(graph.dependents_of(q[0].id), vec![q[2].id]);
        assert_eq!(graph.prerequisites_of(q[2].id).len(), 2);
    }

    #[test]
    fn duplicate_quests_keep_first_position() {
        let q = quests(2);
        let mut renamed = q[0].clone();
        renamed.title = String::from("Renamed");
        let graph = QuestGraph::new(vec![q[0].clone(), q[1].clone(), renamed], Vec::new());

        let titles: Vec<&str> = graph.quests().map(|quest| quest.title.as_str()).collect();
        assert_eq!(titles, ["Renamed", "Quest 1"]);
    }
}
