//! In-memory [`CurriculumStore`] used for tests and the `memory` backend.
//!
//! Mirrors the observed behaviour of the production edge source: edges are
//! stored in one flat list and [`CurriculumStore::edges_for_curriculum`]
//! returns all of them regardless of curriculum.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use betty_types::{Completion, Curriculum, CurriculumId, PrerequisiteEdge, Quest, QuestId, UserId};
use tokio::sync::RwLock;

use crate::store::{CurriculumStore, StoreError};

#[derive(Debug, Default)]
struct MemoryData {
    curricula: BTreeMap<CurriculumId, Curriculum>,
    /// Insertion order doubles as display order.
    quests: Vec<Quest>,
    edges: Vec<PrerequisiteEdge>,
    completions: BTreeMap<UserId, BTreeMap<QuestId, Completion>>,
}

/// Curriculum store backed by process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<MemoryData>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a curriculum.
    pub async fn insert_curriculum(&self, curriculum: Curriculum) {
        let mut data = self.data.write().await;
        data.curricula.insert(curriculum.id, curriculum);
    }

    /// Insert a quest, replacing any quest with the same ID in place.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the quest's curriculum does not
    /// exist.
    pub async fn insert_quest(&self, quest: Quest) -> Result<(), StoreError> {
        let mut data = self.data.write().await;
        if !data.curricula.contains_key(&quest.curriculum_id) {
            return Err(StoreError::not_found("curriculum", quest.curriculum_id));
        }
        if let Some(existing) = data.quests.iter_mut().find(|q| q.id == quest.id) {
            *existing = quest;
        } else {
            data.quests.push(quest);
        }
        Ok(())
    }

    /// Add a prerequisite edge. Endpoints are not checked.
    pub async fn insert_edge(&self, edge: PrerequisiteEdge) {
        let mut data = self.data.write().await;
        if !data.edges.contains(&edge) {
            data.edges.push(edge);
        }
    }

    /// All completion records of a user, ordered by quest ID.
    pub async fn completions_for(&self, user: UserId) -> Vec<Completion> {
        let data = self.data.read().await;
        data.completions
            .get(&user)
            .map(|records| records.values().cloned().collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl CurriculumStore for MemoryStore {
    async fn list_curricula(&self) -> Result<Vec<Curriculum>, StoreError> {
        let data = self.data.read().await;
        let mut curricula: Vec<Curriculum> = data.curricula.values().cloned().collect();
        curricula.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(curricula)
    }

    async fn get_curriculum(&self, id: CurriculumId) -> Result<Option<Curriculum>, StoreError> {
        let data = self.data.read().await;
        Ok(data.curricula.get(&id).cloned())
    }

    async fn quests_for_curriculum(&self, id: CurriculumId) -> Result<Vec<Quest>, StoreError> {
        let data = self.data.read().await;
        Ok(data
            .quests
            .iter()
            .filter(|quest| quest.curriculum_id == id)
            .cloned()
            .collect())
    }

    async fn edges_for_curriculum(
        &self,
        _id: CurriculumId,
    ) -> Result<Vec<PrerequisiteEdge>, StoreError> {
        let data = self.data.read().await;
        Ok(data.edges.clone())
    }

    async fn completed_quests(&self, user: UserId) -> Result<BTreeSet<QuestId>, StoreError> {
        let data = self.data.read().await;
        Ok(data
            .completions
            .get(&user)
            .map(|records| records.keys().copied().collect())
            .unwrap_or_default())
    }

    async fn record_completion(&self, completion: &Completion) -> Result<(), StoreError> {
        let mut data = self.data.write().await;
        data.completions
            .entry(completion.user_id)
            .or_default()
            .entry(completion.quest_id)
            .or_insert_with(|| completion.clone());
        Ok(())
    }
}
