//! Filtering and sorting of the prompt collection
//!
//! [`filter_and_sort`] is a pure function over a prompt slice: it never
//! mutates the collection and borrows the rows it returns. Search is a
//! case-insensitive substring match over title, text, and tags; the tag
//! filter understands the Favorite flag and the legacy single-category
//! field. Every sort is stable, so rows that compare equal keep their
//! collection order.

use std::cmp::Ordering;

use serde::de::Deserializer;
use serde::{Deserialize, Serialize};

use crate::models::{Prompt, FAVORITE_TAG};

/// Available sort orders. The serialized names are the selector values
/// earlier releases persisted, so stored settings round-trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortKey {
    #[serde(rename = "title-asc")]
    TitleAsc,
    #[serde(rename = "title-desc")]
    TitleDesc,
    #[serde(rename = "category-asc")]
    CategoryAsc,
    #[serde(rename = "category-desc")]
    CategoryDesc,
    #[serde(rename = "date-newest")]
    DateNewest,
    #[serde(rename = "date-oldest")]
    DateOldest,
    #[serde(rename = "modified-newest")]
    ModifiedNewest,
    #[serde(rename = "modified-oldest")]
    ModifiedOldest,
    #[serde(rename = "favorites")]
    Favorites,
}

/// One query against the collection. Empty search and empty tag filter
/// match everything; no sort key means collection order.
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    pub search: String,
    pub tag_filter: String,
    pub sort: Option<SortKey>,
}

/// The persisted filter/sort selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewSettings {
    #[serde(default)]
    pub tag_filter: String,
    #[serde(default, deserialize_with = "lenient_sort_key")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<SortKey>,
}

impl ViewSettings {
    /// Turn the stored selection into query options, combined with a
    /// live search term.
    pub fn to_query(&self, search: impl Into<String>) -> QueryOptions {
        QueryOptions {
            search: search.into(),
            tag_filter: self.tag_filter.clone(),
            sort: self.sort_by,
        }
    }
}

// Stored settings may hold "" or a selector value from a newer or older
// release. Anything unrecognized falls back to collection order rather
// than failing the whole settings record.
fn lenient_sort_key<'de, D>(deserializer: D) -> Result<Option<SortKey>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| serde_json::from_value(serde_json::Value::String(s)).ok()))
}

/// Apply search, tag filter, and sort, returning borrowed rows in
/// display order.
pub fn filter_and_sort<'a>(prompts: &'a [Prompt], options: &QueryOptions) -> Vec<&'a Prompt> {
    let term = options.search.to_lowercase();
    let mut rows: Vec<&Prompt> = prompts
        .iter()
        .filter(|p| matches_search(p, &term) && matches_tag(p, &options.tag_filter))
        .collect();

    if let Some(key) = options.sort {
        rows.sort_by(|a, b| compare(key, a, b));
    }
    rows
}

fn matches_search(prompt: &Prompt, term: &str) -> bool {
    term.is_empty()
        || prompt.title.to_lowercase().contains(term)
        || prompt.text.to_lowercase().contains(term)
        || prompt.tags.iter().any(|t| t.to_lowercase().contains(term))
}

fn matches_tag(prompt: &Prompt, filter: &str) -> bool {
    filter.is_empty()
        || prompt.has_tag(filter)
        || (filter == FAVORITE_TAG && prompt.is_favorite)
        || prompt.category.as_deref() == Some(filter)
}

fn compare(key: SortKey, a: &Prompt, b: &Prompt) -> Ordering {
    match key {
        SortKey::TitleAsc => title_key(a).cmp(&title_key(b)),
        SortKey::TitleDesc => title_key(b).cmp(&title_key(a)),
        SortKey::CategoryAsc => category_key(a).cmp(&category_key(b)),
        SortKey::CategoryDesc => category_key(b).cmp(&category_key(a)),
        SortKey::DateNewest => created_key(b).cmp(&created_key(a)),
        SortKey::DateOldest => created_key(a).cmp(&created_key(b)),
        SortKey::ModifiedNewest => modified_key(b).cmp(&modified_key(a)),
        SortKey::ModifiedOldest => modified_key(a).cmp(&modified_key(b)),
        SortKey::Favorites => b
            .is_favorite
            .cmp(&a.is_favorite)
            .then_with(|| title_key(a).cmp(&title_key(b))),
    }
}

// Lowercase folding approximates locale-aware ordering without pulling
// in a collation library.
fn title_key(prompt: &Prompt) -> String {
    prompt.title.to_lowercase()
}

// First tag when present, otherwise the legacy category, otherwise
// empty, which sorts before everything.
fn category_key(prompt: &Prompt) -> String {
    prompt
        .tags
        .first()
        .map(String::as_str)
        .filter(|t| !t.is_empty())
        .or_else(|| prompt.category.as_deref().filter(|c| !c.is_empty()))
        .unwrap_or("")
        .to_lowercase()
}

fn created_key(prompt: &Prompt) -> i64 {
    prompt.created_at.unwrap_or(0)
}

fn modified_key(prompt: &Prompt) -> i64 {
    prompt.updated_at.or(prompt.created_at).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompt(id: i64, title: &str, text: &str, tags: &[&str]) -> Prompt {
        Prompt {
            id,
            title: title.to_string(),
            text: text.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            is_favorite: tags.contains(&FAVORITE_TAG),
            created_at: Some(id),
            updated_at: Some(id),
            category: None,
        }
    }

    fn titles(rows: &[&Prompt]) -> Vec<String> {
        rows.iter().map(|p| p.title.clone()).collect()
    }

    #[test]
    fn test_empty_query_passes_through_in_order() {
        let prompts = vec![
            prompt(3, "C", "x", &[]),
            prompt(1, "A", "x", &[]),
            prompt(2, "B", "x", &[]),
        ];

        let rows = filter_and_sort(&prompts, &QueryOptions::default());
        assert_eq!(titles(&rows), vec!["C", "A", "B"]);
    }

    #[test]
    fn test_search_matches_title_text_and_tags() {
        let prompts = vec![
            prompt(1, "Email draft", "hello", &["Writing"]),
            prompt(2, "Other", "an EMAIL body", &[]),
            prompt(3, "Third", "x", &["email-templates"]),
            prompt(4, "Unrelated", "x", &["Coding"]),
        ];

        let options = QueryOptions {
            search: "email".to_string(),
            ..Default::default()
        };
        let rows = filter_and_sort(&prompts, &options);
        assert_eq!(titles(&rows), vec!["Email draft", "Other", "Third"]);
    }

    #[test]
    fn test_tag_filter_matches_favorite_flag_without_tag() {
        // An imported prompt can be flagged favorite without carrying
        // the Favorite tag; the filter must still find it.
        let mut flagged = prompt(1, "Flagged", "x", &["Writing"]);
        flagged.is_favorite = true;
        let prompts = vec![flagged, prompt(2, "Plain", "x", &["Writing"])];

        let options = QueryOptions {
            tag_filter: FAVORITE_TAG.to_string(),
            ..Default::default()
        };
        let rows = filter_and_sort(&prompts, &options);
        assert_eq!(titles(&rows), vec!["Flagged"]);
    }

    #[test]
    fn test_tag_filter_matches_legacy_category() {
        let mut legacy = prompt(1, "Old", "x", &[]);
        legacy.category = Some("Research".to_string());
        let prompts = vec![legacy, prompt(2, "New", "x", &["Research"])];

        let options = QueryOptions {
            tag_filter: "Research".to_string(),
            ..Default::default()
        };
        let rows = filter_and_sort(&prompts, &options);
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_search_and_tag_filter_combine() {
        let prompts = vec![
            prompt(1, "Alpha", "x", &["Coding"]),
            prompt(2, "Alpha two", "x", &["Writing"]),
            prompt(3, "Beta", "x", &["Coding"]),
        ];

        let options = QueryOptions {
            search: "alpha".to_string(),
            tag_filter: "Coding".to_string(),
            ..Default::default()
        };
        let rows = filter_and_sort(&prompts, &options);
        assert_eq!(titles(&rows), vec!["Alpha"]);
    }

    #[test]
    fn test_title_sort_ignores_case() {
        let prompts = vec![
            prompt(1, "banana", "x", &[]),
            prompt(2, "Apple", "x", &[]),
            prompt(3, "cherry", "x", &[]),
        ];

        let options = QueryOptions {
            sort: Some(SortKey::TitleAsc),
            ..Default::default()
        };
        let rows = filter_and_sort(&prompts, &options);
        assert_eq!(titles(&rows), vec!["Apple", "banana", "cherry"]);
    }

    #[test]
    fn test_category_sort_falls_back_to_legacy_field() {
        let mut legacy = prompt(1, "Old", "x", &[]);
        legacy.category = Some("Business".to_string());
        let prompts = vec![
            prompt(2, "W", "x", &["Writing"]),
            legacy,
            prompt(3, "Bare", "x", &[]),
        ];

        let options = QueryOptions {
            sort: Some(SortKey::CategoryAsc),
            ..Default::default()
        };
        let rows = filter_and_sort(&prompts, &options);
        // Empty category first, then Business, then Writing.
        assert_eq!(titles(&rows), vec!["Bare", "Old", "W"]);
    }

    #[test]
    fn test_date_sort_treats_missing_as_zero() {
        let mut undated = prompt(1, "Undated", "x", &[]);
        undated.created_at = None;
        undated.updated_at = None;
        let prompts = vec![prompt(5, "Newer", "x", &[]), undated];

        let options = QueryOptions {
            sort: Some(SortKey::DateOldest),
            ..Default::default()
        };
        let rows = filter_and_sort(&prompts, &options);
        assert_eq!(titles(&rows), vec!["Undated", "Newer"]);
    }

    #[test]
    fn test_modified_sort_falls_back_to_created() {
        let mut never_edited = prompt(10, "Created late", "x", &[]);
        never_edited.updated_at = None;
        let mut edited = prompt(1, "Edited recently", "x", &[]);
        edited.updated_at = Some(20);

        let prompts = vec![never_edited, edited];
        let options = QueryOptions {
            sort: Some(SortKey::ModifiedNewest),
            ..Default::default()
        };
        let rows = filter_and_sort(&prompts, &options);
        assert_eq!(titles(&rows), vec!["Edited recently", "Created late"]);
    }

    #[test]
    fn test_favorites_sort_puts_favorites_first_then_title() {
        let prompts = vec![
            prompt(1, "Zulu", "x", &[]),
            prompt(2, "Mike", "x", &[FAVORITE_TAG]),
            prompt(3, "Alpha", "x", &[]),
            prompt(4, "Bravo", "x", &[FAVORITE_TAG]),
        ];

        let options = QueryOptions {
            sort: Some(SortKey::Favorites),
            ..Default::default()
        };
        let rows = filter_and_sort(&prompts, &options);
        assert_eq!(titles(&rows), vec!["Bravo", "Mike", "Alpha", "Zulu"]);
    }

    #[test]
    fn test_stable_sort_keeps_input_order_on_ties() {
        let mut a = prompt(1, "Same", "x", &[]);
        let mut b = prompt(2, "same", "x", &[]);
        a.created_at = Some(7);
        b.created_at = Some(7);

        let prompts = vec![a, b];
        let options = QueryOptions {
            sort: Some(SortKey::DateNewest),
            ..Default::default()
        };
        let rows = filter_and_sort(&prompts, &options);
        assert_eq!(rows[0].id, 1);
        assert_eq!(rows[1].id, 2);
    }

    #[test]
    fn test_sort_key_serializes_to_selector_values() {
        assert_eq!(
            serde_json::to_string(&SortKey::ModifiedNewest).unwrap(),
            "\"modified-newest\""
        );
        let key: SortKey = serde_json::from_str("\"favorites\"").unwrap();
        assert_eq!(key, SortKey::Favorites);
    }

    #[test]
    fn test_view_settings_tolerate_unknown_sort_value() {
        let settings: ViewSettings =
            serde_json::from_str(r#"{"tagFilter":"Coding","sortBy":""}"#).unwrap();
        assert_eq!(settings.tag_filter, "Coding");
        assert_eq!(settings.sort_by, None);

        let settings: ViewSettings =
            serde_json::from_str(r#"{"tagFilter":"","sortBy":"date-newest"}"#).unwrap();
        assert_eq!(settings.sort_by, Some(SortKey::DateNewest));
    }
}
