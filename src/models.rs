//! Core record types for the prompt library
//!
//! `Prompt` and `Tag` are the two persisted record shapes. Field names
//! serialize in camelCase so collections written by earlier releases
//! load without conversion.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Tag assigned to prompts that carry no explicit tags.
pub const DEFAULT_TAG: &str = "General";

/// Sentinel tag whose membership mirrors a prompt's favorite flag.
pub const FAVORITE_TAG: &str = "Favorite";

/// A saved snippet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prompt {
    /// Unique identifier, epoch milliseconds at creation time.
    pub id: i64,
    /// Display title, unique case-insensitively at save time.
    pub title: String,
    /// The snippet content itself.
    pub text: String,
    /// Tag names in insertion order, no duplicates. May be empty.
    pub tags: Vec<String>,
    /// Kept in step with membership of [`FAVORITE_TAG`] in `tags` by
    /// every save and toggle. Imports may set it from the CSV flag
    /// alone.
    #[serde(default)]
    pub is_favorite: bool,
    /// Epoch milliseconds, immutable once set. Absent on records that
    /// predate timestamps.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
    /// Epoch milliseconds of the last mutating save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
    /// Single category from the pre-tag schema. Retained so old
    /// records keep matching the tag filter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Prompt {
    /// Whether `tags` contains `name` (exact match).
    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.iter().any(|t| t == name)
    }
}

/// A taxonomy entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    /// Unique case-insensitively among all tags.
    pub name: String,
    /// Built-in tags ship with the library and cannot be renamed or
    /// deleted.
    #[serde(default)]
    pub is_default: bool,
    /// True only for the [`FAVORITE_TAG`] sentinel entry.
    #[serde(default)]
    pub is_favorite: bool,
}

impl Tag {
    pub fn custom(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_default: false,
            is_favorite: false,
        }
    }

    /// Protected tags reject rename and delete.
    pub fn is_protected(&self) -> bool {
        self.is_default || self.is_favorite
    }
}

/// Current time as epoch milliseconds, the unit every record timestamp
/// and id uses.
pub(crate) fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}
