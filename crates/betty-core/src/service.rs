//! Quest map service: fetch, scope, resolve.
//!
//! [`QuestMapService`] is the only place where store I/O meets the pure
//! resolver. Every call re-reads the store and resolves from scratch, so a
//! new completion is reflected by the very next request.

use std::collections::BTreeSet;
use std::sync::Arc;

use betty_quests::{GraphDiagnostic, QuestGraph, QuestMap, edges_into, published_only};
use betty_types::{
    Blocker, Completion, Curriculum, CurriculumId, PrerequisiteEdge, Quest, QuestBlockers,
    QuestId, QuestMapView, QuestStatus, UserId,
};
use chrono::Utc;
use tracing::{debug, info};

use crate::store::{CurriculumStore, StoreError};

/// Errors returned by [`QuestMapService`].
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The store failed or an entity was missing.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The quest cannot be submitted yet.
    #[error("quest {quest_id} is locked by {} unfinished prerequisite(s)", blockers.len())]
    QuestLocked {
        /// The quest that was submitted.
        quest_id: QuestId,
        /// Prerequisites still in the way.
        blockers: Vec<QuestId>,
    },
}

/// Published quests and scoped edges of one curriculum.
#[derive(Debug, Clone)]
pub struct CurriculumQuests {
    /// The curriculum record.
    pub curriculum: Curriculum,
    /// Published quests in display order.
    pub quests: Vec<Quest>,
    /// Edges pointing into `quests`.
    pub edges: Vec<PrerequisiteEdge>,
}

impl CurriculumQuests {
    /// Index the quests and edges as a graph.
    pub fn graph(&self) -> QuestGraph {
        QuestGraph::new(self.quests.clone(), self.edges.clone())
    }
}

/// One user's resolved quest map together with its inputs.
#[derive(Debug, Clone)]
pub struct UserQuestMap {
    /// Quests and edges the map was resolved from.
    pub curriculum: CurriculumQuests,
    /// The viewing user.
    pub user_id: UserId,
    /// The user's completions (across all curricula).
    pub completed: BTreeSet<QuestId>,
    /// Resolved statuses.
    pub map: QuestMap,
}

impl UserQuestMap {
    /// Status of one quest, if it is on the map.
    pub fn status(&self, quest_id: QuestId) -> Option<QuestStatus> {
        self.map.status(quest_id)
    }

    /// Prerequisites that keep a quest from being available.
    pub fn blockers(&self, quest_id: QuestId) -> Vec<QuestId> {
        self.curriculum.graph().blockers(quest_id, &self.completed)
    }

    /// Status and unfinished prerequisites of one quest, or `None` if it
    /// is not on the map.
    pub fn explain(&self, quest_id: QuestId) -> Option<QuestBlockers> {
        let status = self.status(quest_id)?;
        let graph = self.curriculum.graph();
        let blockers = graph
            .blockers(quest_id, &self.completed)
            .into_iter()
            .map(|id| {
                let quest = graph.get(id);
                Blocker {
                    id,
                    title: quest.map(|q| q.title.clone()),
                    exists: quest.is_some(),
                }
            })
            .collect();

        Some(QuestBlockers {
            quest_id,
            status,
            blockers,
        })
    }

    /// Build the UI view.
    pub fn view(&self) -> QuestMapView {
        self.map.to_view(
            self.curriculum.curriculum.id,
            self.user_id,
            &self.curriculum.quests,
            &self.curriculum.edges,
        )
    }
}

/// Application service over a [`CurriculumStore`].
#[derive(Clone)]
pub struct QuestMapService {
    store: Arc<dyn CurriculumStore>,
}

impl core::fmt::Debug for QuestMapService {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("QuestMapService").finish_non_exhaustive()
    }
}

impl QuestMapService {
    /// Create a service over the given store.
    pub fn new(store: Arc<dyn CurriculumStore>) -> Self {
        Self { store }
    }

    /// All curricula.
    pub async fn list_curricula(&self) -> Result<Vec<Curriculum>, ServiceError> {
        Ok(self.store.list_curricula().await?)
    }

    /// Published quests and scoped edges of a curriculum.
    pub async fn curriculum(&self, id: CurriculumId) -> Result<CurriculumQuests, ServiceError> {
        let curriculum = self
            .store
            .get_curriculum(id)
            .await?
            .ok_or_else(|| StoreError::not_found("curriculum", id))?;

        let quests = published_only(self.store.quests_for_curriculum(id).await?);
        let edges = edges_into(&quests, self.store.edges_for_curriculum(id).await?);

        Ok(CurriculumQuests {
            curriculum,
            quests,
            edges,
        })
    }

    /// Resolve the quest map of `user` on a curriculum.
    pub async fn quest_map(
        &self,
        curriculum_id: CurriculumId,
        user_id: UserId,
    ) -> Result<UserQuestMap, ServiceError> {
        let curriculum = self.curriculum(curriculum_id).await?;
        let completed = self.store.completed_quests(user_id).await?;
        let map = QuestMap::resolve(&curriculum.quests, &curriculum.edges, &completed);

        let stats = map.stats(&curriculum.quests);
        debug!(
            %curriculum_id,
            %user_id,
            total = stats.total,
            completed = stats.completed,
            available = stats.available,
            locked = stats.locked,
            "Resolved quest map"
        );

        Ok(UserQuestMap {
            curriculum,
            user_id,
            completed,
            map,
        })
    }

    /// Status of one quest for a user and the prerequisites blocking it.
    pub async fn blockers(
        &self,
        curriculum_id: CurriculumId,
        user_id: UserId,
        quest_id: QuestId,
    ) -> Result<QuestBlockers, ServiceError> {
        let resolved = self.quest_map(curriculum_id, user_id).await?;
        resolved
            .explain(quest_id)
            .ok_or_else(|| StoreError::not_found("quest", quest_id).into())
    }

    /// Record that `user` finished a quest and return the updated map.
    ///
    /// Completing an already completed quest changes nothing. Locked quests
    /// are refused with [`ServiceError::QuestLocked`].
    pub async fn complete_quest(
        &self,
        curriculum_id: CurriculumId,
        user_id: UserId,
        quest_id: QuestId,
    ) -> Result<UserQuestMap, ServiceError> {
        let resolved = self.quest_map(curriculum_id, user_id).await?;

        match resolved.status(quest_id) {
            None => Err(StoreError::not_found("quest", quest_id).into()),
            Some(QuestStatus::Completed) => {
                debug!(%quest_id, %user_id, "Quest already completed");
                Ok(resolved)
            }
            Some(QuestStatus::Locked) => Err(ServiceError::QuestLocked {
                quest_id,
                blockers: resolved.blockers(quest_id),
            }),
            Some(QuestStatus::Available) => {
                let completion = Completion {
                    user_id,
                    quest_id,
                    completed_at: Utc::now(),
                };
                self.store.record_completion(&completion).await?;
                info!(%curriculum_id, %user_id, %quest_id, "Quest completed");
                self.quest_map(curriculum_id, user_id).await
            }
        }
    }

    /// Data-quality diagnostics for a curriculum's published graph.
    pub async fn diagnostics(
        &self,
        curriculum_id: CurriculumId,
    ) -> Result<Vec<GraphDiagnostic>, ServiceError> {
        let curriculum = self.curriculum(curriculum_id).await?;
        Ok(curriculum.graph().validate())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::panic)]
mod tests {
    use betty_types::{PublicationStatus, QuestCategory};

    use super::*;
    use crate::memory::MemoryStore;
    use crate::store::MockCurriculumStore;

    struct Fixture {
        service: QuestMapService,
        curriculum_id: CurriculumId,
        quests: Vec<Quest>,
    }

    /// Chain q0 -> q1 -> q2 -> q3, where q3 is still a draft.
    async fn fixture() -> Fixture {
        let store = MemoryStore::new();
        let curriculum = Curriculum {
            id: CurriculumId::new(),
            name: String::from("Backend Path"),
            description: String::new(),
            created_at: Utc::now(),
        };
        let curriculum_id = curriculum.id;
        store.insert_curriculum(curriculum).await;

        let quests = vec![
            Quest::published(curriculum_id, "HTTP", QuestCategory::Backend, 100),
            Quest::published(curriculum_id, "REST", QuestCategory::Backend, 150),
            Quest::published(curriculum_id, "Auth", QuestCategory::Backend, 200),
            Quest::published(curriculum_id, "GraphQL", QuestCategory::Backend, 300)
                .with_status(PublicationStatus::Draft),
        ];
        for quest in &quests {
            store.insert_quest(quest.clone()).await.unwrap();
        }
        store
            .insert_edge(PrerequisiteEdge::new(quests[0].id, quests[1].id))
            .await;
        store
            .insert_edge(PrerequisiteEdge::new(quests[1].id, quests[2].id))
            .await;
        store
            .insert_edge(PrerequisiteEdge::new(quests[2].id, quests[3].id))
            .await;

        Fixture {
            service: QuestMapService::new(Arc::new(store)),
            curriculum_id,
            quests,
        }
    }

    #[tokio::test]
    async fn drafts_are_left_off_the_map() {
        let f = fixture().await;
        let resolved = f.service.quest_map(f.curriculum_id, UserId::new()).await.unwrap();

        assert_eq!(resolved.map.len(), 3);
        assert_eq!(resolved.status(f.quests[3].id), None);
        assert_eq!(resolved.curriculum.edges.len(), 2);
    }

    #[tokio::test]
    async fn completing_available_quest_unlocks_next() {
        let f = fixture().await;
        let user = UserId::new();

        let resolved = f
            .service
            .complete_quest(f.curriculum_id, user, f.quests[0].id)
            .await
            .unwrap();

        assert_eq!(resolved.status(f.quests[0].id), Some(QuestStatus::Completed));
        assert_eq!(resolved.status(f.quests[1].id), Some(QuestStatus::Available));
        assert_eq!(resolved.status(f.quests[2].id), Some(QuestStatus::Locked));
        assert_eq!(resolved.view().stats.xp_earned, 100);
    }

    #[tokio::test]
    async fn completing_locked_quest_is_refused() {
        let f = fixture().await;
        let err = f
            .service
            .complete_quest(f.curriculum_id, UserId::new(), f.quests[2].id)
            .await
            .unwrap_err();

        match err {
            ServiceError::QuestLocked { quest_id, blockers } => {
                assert_eq!(quest_id, f.quests[2].id);
                assert_eq!(blockers, vec![f.quests[1].id]);
            }
            other => panic!("expected QuestLocked, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn completing_twice_is_idempotent() {
        let f = fixture().await;
        let user = UserId::new();
        let first = f
            .service
            .complete_quest(f.curriculum_id, user, f.quests[0].id)
            .await
            .unwrap();
        let second = f
            .service
            .complete_quest(f.curriculum_id, user, f.quests[0].id)
            .await
            .unwrap();

        assert_eq!(first.map, second.map);
    }

    #[tokio::test]
    async fn draft_quest_cannot_be_completed() {
        let f = fixture().await;
        let err = f
            .service
            .complete_quest(f.curriculum_id, UserId::new(), f.quests[3].id)
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Store(ref e) if e.is_not_found()));
    }

    #[tokio::test]
    async fn unknown_curriculum_is_not_found() {
        let f = fixture().await;
        let err = f
            .service
            .quest_map(CurriculumId::new(), UserId::new())
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Store(ref e) if e.is_not_found()));
    }

    #[tokio::test]
    async fn blockers_list_unfinished_prerequisites() {
        let f = fixture().await;
        let report = f
            .service
            .blockers(f.curriculum_id, UserId::new(), f.quests[1].id)
            .await
            .unwrap();

        assert_eq!(report.quest_id, f.quests[1].id);
        assert_eq!(report.status, QuestStatus::Locked);
        assert_eq!(
            report.blockers,
            vec![Blocker {
                id: f.quests[0].id,
                title: Some(String::from("HTTP")),
                exists: true,
            }]
        );
    }

    #[tokio::test]
    async fn blockers_of_draft_quest_are_not_found() {
        let f = fixture().await;
        let err = f
            .service
            .blockers(f.curriculum_id, UserId::new(), f.quests[3].id)
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Store(ref e) if e.is_not_found()));
    }

    #[tokio::test]
    async fn diagnostics_ignore_edges_into_draft_quests() {
        let f = fixture().await;
        // The edge into the draft is scoped away; the chain is clean.
        let diagnostics = f.service.diagnostics(f.curriculum_id).await.unwrap();
        assert!(diagnostics.is_empty());
    }

    #[tokio::test]
    async fn store_failure_is_propagated() {
        let mut store = MockCurriculumStore::new();
        store
            .expect_get_curriculum()
            .returning(|_| Err(StoreError::backend("get_curriculum", "connection reset")));

        let service = QuestMapService::new(Arc::new(store));
        let err = service
            .quest_map(CurriculumId::new(), UserId::new())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ServiceError::Store(StoreError::Backend { operation: "get_curriculum", .. })
        ));
    }

    #[tokio::test]
    async fn completion_write_failure_is_propagated() {
        let curriculum = Curriculum {
            id: CurriculumId::new(),
            name: String::from("Solo"),
            description: String::new(),
            created_at: Utc::now(),
        };
        let quest = Quest::published(curriculum.id, "Only", QuestCategory::Bonus, 5);
        let quest_id = quest.id;

        let mut store = MockCurriculumStore::new();
        let record = curriculum.clone();
        store
            .expect_get_curriculum()
            .returning(move |_| Ok(Some(record.clone())));
        store
            .expect_quests_for_curriculum()
            .returning(move |_| Ok(vec![quest.clone()]));
        store
            .expect_edges_for_curriculum()
            .returning(|_| Ok(Vec::new()));
        store
            .expect_completed_quests()
            .returning(|_| Ok(BTreeSet::new()));
        store
            .expect_record_completion()
            .times(1)
            .returning(|_| Err(StoreError::Conflict(String::from("read-only replica"))));

        let service = QuestMapService::new(Arc::new(store));
        let err = service
            .complete_quest(curriculum.id, UserId::new(), quest_id)
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Store(StoreError::Conflict(_))));
    }
}
