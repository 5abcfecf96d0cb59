//! Curriculum seed files for the in-memory backend.
//!
//! A seed describes curricula with symbolic quest keys so authors can write
//! edges as `from: html` / `to: css` instead of UUIDs:
//!
//! ```yaml
//! curricula:
//!   - key: web
//!     name: Web Foundations
//!     quests:
//!       - key: html
//!         title: HTML
//!         category: frontend
//!         xp: 100
//!       - key: css
//!         title: CSS
//!         category: frontend
//!         xp: 120
//!     edges:
//!       - { from: html, to: css }
//!     completions:
//!       "0191e3a0-0000-7000-8000-000000000001": [html]
//! ```
//!
//! An edge naming an unknown key becomes a dangling edge with a fresh
//! quest ID, exactly like inconsistent production data would. Unknown keys
//! in completions are skipped with a warning.

use std::collections::BTreeMap;
use std::path::Path;

use betty_types::{
    Completion, Curriculum, CurriculumId, PrerequisiteEdge, PublicationStatus, Quest,
    QuestCategory, QuestId, UserId,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};

use crate::memory::MemoryStore;
use crate::store::{CurriculumStore, StoreError};

/// Errors that can occur when loading a seed.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    /// Failed to read the seed file.
    #[error("failed to read seed file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse seed YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// Two quests in one curriculum share a key.
    #[error("duplicate quest key {key:?} in curriculum {curriculum:?}")]
    DuplicateKey {
        /// Curriculum key.
        curriculum: String,
        /// Repeated quest key.
        key: String,
    },

    /// Writing to the store failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl From<serde_yml::Error> for SeedError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Root of a seed file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CurriculumSeed {
    /// Curricula to create.
    #[serde(default)]
    pub curricula: Vec<CurriculumEntry>,
}

/// One curriculum in a seed.
#[derive(Debug, Clone, Deserialize)]
pub struct CurriculumEntry {
    /// Symbolic key, used only in log output.
    pub key: String,
    /// Fixed ID; a fresh one is generated when absent.
    #[serde(default)]
    pub id: Option<CurriculumId>,
    /// Display name.
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Quests in display order.
    #[serde(default)]
    pub quests: Vec<QuestEntry>,
    /// Prerequisite edges between quest keys.
    #[serde(default)]
    pub edges: Vec<EdgeEntry>,
    /// Completed quest keys per user.
    #[serde(default)]
    pub completions: BTreeMap<UserId, Vec<String>>,
}

/// One quest in a seed.
#[derive(Debug, Clone, Deserialize)]
pub struct QuestEntry {
    /// Key referenced by edges and completions.
    pub key: String,
    /// Fixed ID; a fresh one is generated when absent.
    #[serde(default)]
    pub id: Option<QuestId>,
    /// Display title.
    pub title: String,
    /// Subject tag.
    pub category: QuestCategory,
    /// XP reward.
    #[serde(default)]
    pub xp: u32,
    /// Publication status, `published` when absent.
    #[serde(default = "default_publication")]
    pub status: PublicationStatus,
}

/// An edge between two quest keys.
#[derive(Debug, Clone, Deserialize)]
pub struct EdgeEntry {
    /// Prerequisite quest key.
    pub from: String,
    /// Dependent quest key.
    pub to: String,
}

/// Counts of what a seed created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    /// Curricula inserted.
    pub curricula: usize,
    /// Quests inserted.
    pub quests: usize,
    /// Edges inserted.
    pub edges: usize,
    /// Edges with at least one unknown endpoint.
    pub dangling_edges: usize,
    /// Completions recorded.
    pub completions: usize,
}

impl CurriculumSeed {
    /// Read a seed from a YAML file.
    pub fn from_file(path: &Path) -> Result<Self, SeedError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse a seed from a YAML string.
    pub fn parse(yaml: &str) -> Result<Self, SeedError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Insert everything into `store`.
    pub async fn load_into(&self, store: &MemoryStore) -> Result<SeedSummary, SeedError> {
        let mut summary = SeedSummary::default();

        for entry in &self.curricula {
            let curriculum = Curriculum {
                id: entry.id.unwrap_or_default(),
                name: entry.name.clone(),
                description: entry.description.clone(),
                created_at: Utc::now(),
            };
            let curriculum_id = curriculum.id;
            store.insert_curriculum(curriculum).await;
            summary.curricula = summary.curricula.saturating_add(1);

            let mut keys: BTreeMap<&str, QuestId> = BTreeMap::new();
            for quest_entry in &entry.quests {
                let quest = Quest {
                    id: quest_entry.id.unwrap_or_default(),
                    curriculum_id,
                    title: quest_entry.title.clone(),
                    category: quest_entry.category,
                    xp: quest_entry.xp,
                    status: quest_entry.status,
                };
                if keys.insert(quest_entry.key.as_str(), quest.id).is_some() {
                    return Err(SeedError::DuplicateKey {
                        curriculum: entry.key.clone(),
                        key: quest_entry.key.clone(),
                    });
                }
                store.insert_quest(quest).await?;
                summary.quests = summary.quests.saturating_add(1);
            }

            let mut ghosts: BTreeMap<&str, QuestId> = BTreeMap::new();
            for edge_entry in &entry.edges {
                let from_id = lookup_or_dangling(&keys, &mut ghosts, &entry.key, &edge_entry.from);
                let to_id = lookup_or_dangling(&keys, &mut ghosts, &entry.key, &edge_entry.to);
                if !keys.contains_key(edge_entry.from.as_str())
                    || !keys.contains_key(edge_entry.to.as_str())
                {
                    summary.dangling_edges = summary.dangling_edges.saturating_add(1);
                }
                store.insert_edge(PrerequisiteEdge::new(from_id, to_id)).await;
                summary.edges = summary.edges.saturating_add(1);
            }

            for (user_id, quest_keys) in &entry.completions {
                for key in quest_keys {
                    let Some(quest_id) = keys.get(key.as_str()) else {
                        warn!(curriculum = entry.key, key, "seed completion names unknown quest, skipping");
                        continue;
                    };
                    let completion = Completion {
                        user_id: *user_id,
                        quest_id: *quest_id,
                        completed_at: Utc::now(),
                    };
                    store.record_completion(&completion).await?;
                    summary.completions = summary.completions.saturating_add(1);
                }
            }

            info!(
                curriculum = entry.key,
                %curriculum_id,
                quests = entry.quests.len(),
                edges = entry.edges.len(),
                "Seeded curriculum"
            );
        }

        Ok(summary)
    }
}

/// Resolve an edge endpoint. Every mention of the same unknown key within a
/// curriculum maps to one stand-in ID.
fn lookup_or_dangling<'a>(
    keys: &BTreeMap<&str, QuestId>,
    ghosts: &mut BTreeMap<&'a str, QuestId>,
    curriculum: &str,
    key: &'a str,
) -> QuestId {
    if let Some(id) = keys.get(key) {
        return *id;
    }
    *ghosts.entry(key).or_insert_with(|| {
        warn!(curriculum, key, "seed edge names unknown quest, keeping it as a dangling edge");
        QuestId::new()
    })
}

const fn default_publication() -> PublicationStatus {
    PublicationStatus::Published
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::Arc;

    use betty_quests::GraphDiagnostic;

    use super::*;
    use crate::service::QuestMapService;

    const SEED: &str = r#"
curricula:
  - key: web
    id: "0191e3a0-0000-7000-8000-00000000c001"
    name: Web Foundations
    quests:
      - { key: html, title: HTML, category: frontend, xp: 100 }
      - { key: css, title: CSS, category: frontend, xp: 120 }
      - { key: js, title: JavaScript, category: frontend, xp: 200, status: draft }
    edges:
      - { from: html, to: css }
      - { from: css, to: js }
      - { from: legacy, to: js }
    completions:
      "0191e3a0-0000-7000-8000-000000000001": [html, nope]
"#;

    #[tokio::test]
    async fn seed_populates_store() {
        let store = MemoryStore::new();
        let seed = CurriculumSeed::parse(SEED).unwrap();
        let summary = seed.load_into(&store).await.unwrap();

        assert_eq!(
            summary,
            SeedSummary {
                curricula: 1,
                quests: 3,
                edges: 3,
                dangling_edges: 1,
                completions: 1,
            }
        );

        let curricula = store.list_curricula().await.unwrap();
        assert_eq!(curricula[0].name, "Web Foundations");
        assert_eq!(
            curricula[0].id.to_string(),
            "0191e3a0-0000-7000-8000-00000000c001"
        );

        let quests = store.quests_for_curriculum(curricula[0].id).await.unwrap();
        assert_eq!(quests[2].status, PublicationStatus::Draft);
    }

    #[tokio::test]
    async fn duplicate_keys_are_rejected() {
        let yaml = r"
curricula:
  - key: web
    name: Web
    quests:
      - { key: html, title: HTML, category: frontend }
      - { key: html, title: HTML again, category: frontend }
";
        let store = MemoryStore::new();
        let seed = CurriculumSeed::parse(yaml).unwrap();
        let err = seed.load_into(&store).await.unwrap_err();
        assert!(matches!(err, SeedError::DuplicateKey { .. }));
    }

    #[tokio::test]
    async fn repeated_unknown_key_is_one_missing_quest() {
        let yaml = r"
curricula:
  - key: web
    name: Web
    quests:
      - { key: a, title: A, category: frontend }
      - { key: b, title: B, category: backend }
    edges:
      - { from: legacy, to: a }
      - { from: legacy, to: b }
";
        let store = Arc::new(MemoryStore::new());
        let seed = CurriculumSeed::parse(yaml).unwrap();
        let summary = seed.load_into(&store).await.unwrap();
        assert_eq!(summary.dangling_edges, 2);

        let curriculum_id = store.list_curricula().await.unwrap()[0].id;
        let edges = store.edges_for_curriculum(curriculum_id).await.unwrap();
        assert_eq!(edges.len(), 2);
        assert_eq!(edges[0].from_id, edges[1].from_id);

        let service = QuestMapService::new(store);
        let missing: BTreeSet<QuestId> = service
            .diagnostics(curriculum_id)
            .await
            .unwrap()
            .into_iter()
            .filter_map(|diagnostic| match diagnostic {
                GraphDiagnostic::DanglingPrerequisite { missing_id, .. } => Some(missing_id),
                _ => None,
            })
            .collect();
        assert_eq!(missing.len(), 1);
    }

    #[test]
    fn empty_seed_parses() {
        assert!(CurriculumSeed::parse("").unwrap().curricula.is_empty());
    }

    #[test]
    fn project_demo_seed_parses() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("seeds")
            .join("demo-curriculum.yaml");
        if path.exists() {
            let seed = CurriculumSeed::from_file(&path);
            assert!(seed.is_ok(), "Failed to load demo seed: {seed:?}");
        }
    }
}
