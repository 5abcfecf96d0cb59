//! Enumeration types for the Betty quest map.
//!
//! All enums serialize as `snake_case` strings. The same strings are used
//! as the textual column values in `PostgreSQL`, so each enum also exposes
//! [`as_str`](QuestStatus::as_str) and a [`FromStr`] implementation.

use core::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A string did not name any variant of the target enum.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} value: {value:?}")]
pub struct ParseEnumError {
    /// Name of the enum being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

/// Generates `as_str`, `Display` and `FromStr` for a fieldless enum.
macro_rules! string_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            /// All variants in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// The canonical `snake_case` name of this variant.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(ParseEnumError {
                        kind: $kind,
                        value: other.to_owned(),
                    }),
                }
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Quest category
// ---------------------------------------------------------------------------

/// Subject tag of a quest, used for grouping and styling on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum QuestCategory {
    /// Programming basics and tooling.
    Fundamentals,
    /// Browser-side development.
    Frontend,
    /// Server-side development.
    Backend,
    /// Data modelling and queries.
    Database,
    /// Deployment, CI and hosting.
    Devops,
    /// UI and UX design.
    Design,
    /// Multi-week project work.
    Project,
    /// Optional side quests.
    Bonus,
}

string_enum!(QuestCategory, "quest category", {
    Fundamentals => "fundamentals",
    Frontend => "frontend",
    Backend => "backend",
    Database => "database",
    Devops => "devops",
    Design => "design",
    Project => "project",
    Bonus => "bonus",
});

// ---------------------------------------------------------------------------
// Publication status
// ---------------------------------------------------------------------------

/// Whether a quest is visible to learners.
///
/// Only [`Published`](Self::Published) quests take part in resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum PublicationStatus {
    /// Visible on the quest map.
    Published,
    /// Work in progress, hidden from learners.
    Draft,
}

string_enum!(PublicationStatus, "publication status", {
    Published => "published",
    Draft => "draft",
});

// ---------------------------------------------------------------------------
// Quest status
// ---------------------------------------------------------------------------

/// Per-user availability of a quest on the map.
///
/// `Completed` and `Available` are mutually exclusive; a completed quest is
/// never reported as available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum QuestStatus {
    /// The user has finished this quest.
    Completed,
    /// Every prerequisite is completed (or there are none).
    Available,
    /// At least one prerequisite is not completed, or can never be.
    Locked,
}

string_enum!(QuestStatus, "quest status", {
    Completed => "completed",
    Available => "available",
    Locked => "locked",
});

impl QuestStatus {
    /// Whether the UI lets the user open the quest.
    pub const fn is_navigable(self) -> bool {
        matches!(self, Self::Completed | Self::Available)
    }
}
