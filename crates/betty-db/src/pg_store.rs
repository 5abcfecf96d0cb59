//! [`CurriculumStore`] backed by `PostgreSQL`.

use std::collections::BTreeSet;

use async_trait::async_trait;
use betty_core::{CurriculumStore, StoreError};
use betty_types::{Completion, Curriculum, CurriculumId, PrerequisiteEdge, Quest, QuestId, UserId};

use crate::error::DbError;
use crate::postgres::PostgresPool;
use crate::quest_store::QuestStore;

/// `PostgreSQL` implementation of the curriculum data source.
#[derive(Debug, Clone)]
pub struct PgCurriculumStore {
    pool: PostgresPool,
}

impl PgCurriculumStore {
    /// Wrap a connected pool.
    pub const fn new(pool: PostgresPool) -> Self {
        Self { pool }
    }

    /// Query helper bound to this store's pool.
    pub const fn queries(&self) -> QuestStore<'_> {
        QuestStore::new(self.pool.pool())
    }
}

fn backend(operation: &'static str) -> impl FnOnce(DbError) -> StoreError {
    move |err| {
        tracing::error!(operation, error = %err, "PostgreSQL store operation failed");
        StoreError::backend(operation, err)
    }
}

#[async_trait]
impl CurriculumStore for PgCurriculumStore {
    async fn list_curricula(&self) -> Result<Vec<Curriculum>, StoreError> {
        self.queries()
            .list_curricula()
            .await
            .map_err(backend("list_curricula"))
    }

    async fn get_curriculum(&self, id: CurriculumId) -> Result<Option<Curriculum>, StoreError> {
        self.queries()
            .get_curriculum(id)
            .await
            .map_err(backend("get_curriculum"))
    }

    async fn quests_for_curriculum(&self, id: CurriculumId) -> Result<Vec<Quest>, StoreError> {
        self.queries()
            .quests_for_curriculum(id)
            .await
            .map_err(backend("quests_for_curriculum"))
    }

    async fn edges_for_curriculum(
        &self,
        id: CurriculumId,
    ) -> Result<Vec<PrerequisiteEdge>, StoreError> {
        self.queries()
            .edges_for_curriculum(id)
            .await
            .map_err(backend("edges_for_curriculum"))
    }

    async fn completed_quests(&self, user: UserId) -> Result<BTreeSet<QuestId>, StoreError> {
        self.queries()
            .completed_quests(user)
            .await
            .map_err(backend("completed_quests"))
    }

    async fn record_completion(&self, completion: &Completion) -> Result<(), StoreError> {
        self.queries()
            .record_completion(completion)
            .await
            .map_err(backend("record_completion"))
    }
}
