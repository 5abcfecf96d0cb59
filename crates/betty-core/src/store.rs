//! Data-source port for curricula, quests, edges and completions.
//!
//! The service layer only talks to [`CurriculumStore`]. Implementations
//! live in this crate ([`MemoryStore`](crate::memory::MemoryStore)) and in
//! `betty-db` (`PostgreSQL`).

use std::collections::BTreeSet;

use async_trait::async_trait;
use betty_types::{Completion, Curriculum, CurriculumId, PrerequisiteEdge, Quest, QuestId, UserId};

/// Errors returned by a [`CurriculumStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of entity (e.g. `"curriculum"`).
        entity: &'static str,
        /// The identifier that was looked up.
        id: String,
    },

    /// The backing store failed.
    #[error("store error in {operation}: {message}")]
    Backend {
        /// Name of the failed operation.
        operation: &'static str,
        /// Backend error text.
        message: String,
    },

    /// A write conflicted with existing data.
    #[error("conflict: {0}")]
    Conflict(String),
}

impl StoreError {
    /// Create a [`StoreError::NotFound`].
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Create a [`StoreError::Backend`].
    pub fn backend(operation: &'static str, message: impl ToString) -> Self {
        Self::Backend {
            operation,
            message: message.to_string(),
        }
    }

    /// Whether this is a [`StoreError::NotFound`].
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Read and write access to curriculum data.
///
/// Implementations must be shareable across request handlers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CurriculumStore: Send + Sync {
    /// All curricula, ordered by name.
    async fn list_curricula(&self) -> Result<Vec<Curriculum>, StoreError>;

    /// A single curriculum, if it exists.
    async fn get_curriculum(&self, id: CurriculumId) -> Result<Option<Curriculum>, StoreError>;

    /// Every quest of a curriculum, drafts included, in display order.
    async fn quests_for_curriculum(&self, id: CurriculumId) -> Result<Vec<Quest>, StoreError>;

    /// Prerequisite edges relevant to a curriculum.
    ///
    /// Implementations may return edges of other curricula as well;
    /// callers scope them with [`betty_quests::edges_into`].
    async fn edges_for_curriculum(
        &self,
        id: CurriculumId,
    ) -> Result<Vec<PrerequisiteEdge>, StoreError>;

    /// IDs of every quest the user has completed, across curricula.
    async fn completed_quests(&self, user: UserId) -> Result<BTreeSet<QuestId>, StoreError>;

    /// Persist a completion. Recording the same quest twice is a no-op.
    async fn record_completion(&self, completion: &Completion) -> Result<(), StoreError>;
}
