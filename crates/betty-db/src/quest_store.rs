//! Queries over the `curricula`, `quests`, `quest_prerequisites` and
//! `quest_completions` tables.
//!
//! Category and publication status are stored as their `snake_case` names
//! and parsed back on read. A row that fails to parse surfaces as
//! [`DbError::Decode`] rather than being skipped.

use std::collections::BTreeSet;

use betty_types::{
    Completion, Curriculum, CurriculumId, PrerequisiteEdge, Quest, QuestId, UserId,
};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DbError;

/// Raw row from the `curricula` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CurriculumRow {
    /// Curriculum ID.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl From<CurriculumRow> for Curriculum {
    fn from(row: CurriculumRow) -> Self {
        Self {
            id: CurriculumId::from(row.id),
            name: row.name,
            description: row.description,
            created_at: row.created_at,
        }
    }
}

/// Raw row from the `quests` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct QuestRow {
    /// Quest ID.
    pub id: Uuid,
    /// Owning curriculum.
    pub curriculum_id: Uuid,
    /// Display title.
    pub title: String,
    /// Category name.
    pub category: String,
    /// XP reward.
    pub xp: i64,
    /// Publication status name.
    pub status: String,
}

impl TryFrom<QuestRow> for Quest {
    type Error = DbError;

    fn try_from(row: QuestRow) -> Result<Self, Self::Error> {
        let xp = u32::try_from(row.xp).map_err(|e| {
            DbError::Decode(format!("quest {} has out-of-range xp {}: {e}", row.id, row.xp))
        })?;
        Ok(Self {
            id: QuestId::from(row.id),
            curriculum_id: CurriculumId::from(row.curriculum_id),
            title: row.title,
            category: row
                .category
                .parse()
                .map_err(|e| DbError::Decode(format!("quest {}: {e}", row.id)))?,
            xp,
            status: row
                .status
                .parse()
                .map_err(|e| DbError::Decode(format!("quest {}: {e}", row.id)))?,
        })
    }
}

/// Operations on the quest map tables.
pub struct QuestStore<'a> {
    pool: &'a PgPool,
}

impl<'a> QuestStore<'a> {
    /// Create a store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    // -- Curricula ----------------------------------------------------------

    /// Insert a curriculum, updating name and description if it exists.
    pub async fn insert_curriculum(&self, curriculum: &Curriculum) -> Result<(), DbError> {
        sqlx::query(
            r"INSERT INTO curricula (id, name, description, created_at)
              VALUES ($1, $2, $3, $4)
              ON CONFLICT (id) DO UPDATE
                SET name = EXCLUDED.name, description = EXCLUDED.description",
        )
        .bind(curriculum.id.into_inner())
        .bind(&curriculum.name)
        .bind(&curriculum.description)
        .bind(curriculum.created_at)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// All curricula ordered by name.
    pub async fn list_curricula(&self) -> Result<Vec<Curriculum>, DbError> {
        let rows = sqlx::query_as::<_, CurriculumRow>(
            r"SELECT id, name, description, created_at
              FROM curricula
              ORDER BY name, id",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(Curriculum::from).collect())
    }

    /// A single curriculum.
    pub async fn get_curriculum(&self, id: CurriculumId) -> Result<Option<Curriculum>, DbError> {
        let row = sqlx::query_as::<_, CurriculumRow>(
            r"SELECT id, name, description, created_at
              FROM curricula
              WHERE id = $1",
        )
        .bind(id.into_inner())
        .fetch_optional(self.pool)
        .await?;
        Ok(row.map(Curriculum::from))
    }

    // -- Quests -------------------------------------------------------------

    /// Insert or update a quest. New quests go to the end of the
    /// curriculum's display order.
    pub async fn insert_quest(&self, quest: &Quest) -> Result<(), DbError> {
        sqlx::query(
            r"INSERT INTO quests (id, curriculum_id, title, category, xp, status, sort_order)
              VALUES ($1, $2, $3, $4, $5, $6,
                      (SELECT COALESCE(MAX(sort_order), 0) + 1 FROM quests WHERE curriculum_id = $2))
              ON CONFLICT (id) DO UPDATE
                SET title = EXCLUDED.title,
                    category = EXCLUDED.category,
                    xp = EXCLUDED.xp,
                    status = EXCLUDED.status",
        )
        .bind(quest.id.into_inner())
        .bind(quest.curriculum_id.into_inner())
        .bind(&quest.title)
        .bind(quest.category.as_str())
        .bind(i64::from(quest.xp))
        .bind(quest.status.as_str())
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Every quest of a curriculum, drafts included, in display order.
    pub async fn quests_for_curriculum(&self, id: CurriculumId) -> Result<Vec<Quest>, DbError> {
        let rows = sqlx::query_as::<_, QuestRow>(
            r"SELECT id, curriculum_id, title, category, xp, status
              FROM quests
              WHERE curriculum_id = $1
              ORDER BY sort_order, created_at, id",
        )
        .bind(id.into_inner())
        .fetch_all(self.pool)
        .await?;
        rows.into_iter().map(Quest::try_from).collect()
    }

    // -- Prerequisite edges -------------------------------------------------

    /// Add an edge. Re-adding an existing edge is a no-op.
    pub async fn insert_edge(&self, edge: PrerequisiteEdge) -> Result<(), DbError> {
        sqlx::query(
            r"INSERT INTO quest_prerequisites (from_quest_id, to_quest_id)
              VALUES ($1, $2)
              ON CONFLICT DO NOTHING",
        )
        .bind(edge.from_id.into_inner())
        .bind(edge.to_id.into_inner())
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Edges whose dependent quest belongs to the curriculum.
    pub async fn edges_for_curriculum(
        &self,
        id: CurriculumId,
    ) -> Result<Vec<PrerequisiteEdge>, DbError> {
        let rows: Vec<(Uuid, Uuid)> = sqlx::query_as(
            r"SELECT e.from_quest_id, e.to_quest_id
              FROM quest_prerequisites e
              JOIN quests q ON q.id = e.to_quest_id
              WHERE q.curriculum_id = $1
              ORDER BY e.to_quest_id, e.from_quest_id",
        )
        .bind(id.into_inner())
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(edge_from_row).collect())
    }

    // -- Completions --------------------------------------------------------

    /// Record a completion, keeping the original timestamp on repeats.
    pub async fn record_completion(&self, completion: &Completion) -> Result<(), DbError> {
        let result = sqlx::query(
            r"INSERT INTO quest_completions (user_id, quest_id, completed_at)
              VALUES ($1, $2, $3)
              ON CONFLICT (user_id, quest_id) DO NOTHING",
        )
        .bind(completion.user_id.into_inner())
        .bind(completion.quest_id.into_inner())
        .bind(completion.completed_at)
        .execute(self.pool)
        .await?;

        tracing::debug!(
            user_id = %completion.user_id,
            quest_id = %completion.quest_id,
            inserted = result.rows_affected(),
            "Recorded quest completion"
        );
        Ok(())
    }

    /// IDs of every quest the user has completed.
    pub async fn completed_quests(&self, user: UserId) -> Result<BTreeSet<QuestId>, DbError> {
        let rows: Vec<(Uuid,)> = sqlx::query_as(
            r"SELECT quest_id
              FROM quest_completions
              WHERE user_id = $1",
        )
        .bind(user.into_inner())
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(|(id,)| QuestId::from(id)).collect())
    }
}

fn edge_from_row((from_id, to_id): (Uuid, Uuid)) -> PrerequisiteEdge {
    PrerequisiteEdge::new(QuestId::from(from_id), QuestId::from(to_id))
}
