//! Legacy-schema migration
//!
//! Two older record shapes exist in the wild: prompts saved before the
//! tag taxonomy, which carry a single `category` and no `tags`, and
//! quick-capture records whose `createdAt` is an ISO-8601 string rather
//! than epoch milliseconds. [`migrate_legacy`] normalizes both into the
//! canonical [`Prompt`] shape and is a no-op on already-canonical
//! records.

use chrono::DateTime;
use serde::Deserialize;
use tracing::debug;

use crate::models::{Prompt, DEFAULT_TAG, FAVORITE_TAG};

/// A prompt as read from storage, before normalization. Every field the
/// schema has grown over time is optional here.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPrompt {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub is_favorite: Option<bool>,
    #[serde(default)]
    pub created_at: Option<RawTimestamp>,
    #[serde(default)]
    pub updated_at: Option<RawTimestamp>,
    #[serde(default)]
    pub category: Option<String>,
}

/// Timestamps were written as epoch milliseconds by the main save path
/// and as ISO-8601 strings by the quick-capture path.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    Millis(i64),
    Iso(String),
}

impl RawTimestamp {
    fn into_millis(self) -> Option<i64> {
        match self {
            RawTimestamp::Millis(ms) => Some(ms),
            RawTimestamp::Iso(text) => DateTime::parse_from_rfc3339(&text)
                .ok()
                .map(|dt| dt.timestamp_millis()),
        }
    }
}

/// Normalize raw records into canonical prompts.
///
/// Records lacking `tags` get `[category]`, falling back to
/// [`DEFAULT_TAG`]. A missing favorite flag defaults to tag membership
/// (false for genuinely legacy records). String timestamps become
/// numeric; unparseable ones are dropped rather than invented.
pub fn migrate_legacy(raw: Vec<RawPrompt>) -> Vec<Prompt> {
    raw.into_iter().map(migrate_one).collect()
}

fn migrate_one(raw: RawPrompt) -> Prompt {
    let tags = match raw.tags {
        Some(tags) => tags,
        None => {
            debug!(id = raw.id, "migrating pre-taxonomy prompt");
            vec![raw
                .category
                .clone()
                .unwrap_or_else(|| DEFAULT_TAG.to_string())]
        }
    };
    let is_favorite = raw
        .is_favorite
        .unwrap_or_else(|| tags.iter().any(|t| t == FAVORITE_TAG));

    Prompt {
        id: raw.id,
        title: raw.title,
        text: raw.text,
        tags,
        is_favorite,
        created_at: raw.created_at.and_then(RawTimestamp::into_millis),
        updated_at: raw.updated_at.and_then(RawTimestamp::into_millis),
        category: raw.category,
    }
}
