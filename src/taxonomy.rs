//! Tag taxonomy and its lifecycle
//!
//! The taxonomy is an ordered list of [`Tag`] entries seeded with the
//! built-in set. Renames and deletes cascade into the prompt
//! collection so no prompt keeps referring to a tag the taxonomy no
//! longer knows.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::LibraryError;
use crate::models::{Prompt, Tag, FAVORITE_TAG};

const BUILTIN_TAGS: [&str; 6] = [
    "General",
    "Writing",
    "Coding",
    "Research",
    "Creative",
    "Business",
];

/// What happens to a prompt whose tag list becomes empty when a tag is
/// deleted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TagDeletePolicy {
    /// Leave the list empty. The prompt simply has no tags.
    #[default]
    LeaveEmpty,
    /// Re-tag the prompt with the named tag instead.
    FallbackTo(String),
}

/// Ordered set of known tags, unique case-insensitively.
#[derive(Debug, Clone)]
pub struct TagTaxonomy {
    tags: Vec<Tag>,
}

impl TagTaxonomy {
    /// The seed taxonomy: the built-in tags plus the Favorite sentinel,
    /// all protected.
    pub fn with_defaults() -> Self {
        let mut tags: Vec<Tag> = BUILTIN_TAGS
            .iter()
            .map(|&name| Tag {
                name: name.to_string(),
                is_default: true,
                is_favorite: false,
            })
            .collect();
        tags.push(Tag {
            name: FAVORITE_TAG.to_string(),
            is_default: true,
            is_favorite: true,
        });
        Self { tags }
    }

    /// Adopt a stored tag list wholesale, replacing the seed set.
    pub fn from_stored(tags: Vec<Tag>) -> Self {
        Self { tags }
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Whether a tag with this name exists, ignoring case.
    pub fn contains(&self, name: &str) -> bool {
        let needle = name.to_lowercase();
        self.tags.iter().any(|t| t.name.to_lowercase() == needle)
    }

    /// Append a user-defined tag.
    pub fn add(&mut self, name: &str) -> Result<(), LibraryError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LibraryError::Validation("tag name is required".to_string()));
        }
        if self.contains(name) {
            return Err(LibraryError::DuplicateTag(name.to_string()));
        }

        debug!(tag = name, "tag added");
        self.tags.push(Tag::custom(name));
        Ok(())
    }

    /// Rename a tag and rewrite it in place inside every prompt that
    /// carries it, preserving its position in each tag list.
    pub fn rename(
        &mut self,
        old: &str,
        new: &str,
        prompts: &mut [Prompt],
    ) -> Result<(), LibraryError> {
        let index = self
            .tags
            .iter()
            .position(|t| t.name == old)
            .ok_or_else(|| LibraryError::TagNotFound(old.to_string()))?;
        if self.tags[index].is_protected() {
            return Err(LibraryError::ProtectedTag(old.to_string()));
        }

        let new = new.trim();
        if new.is_empty() {
            return Err(LibraryError::Validation("tag name is required".to_string()));
        }
        if new == old {
            return Err(LibraryError::Unchanged);
        }
        let lowered = new.to_lowercase();
        if self
            .tags
            .iter()
            .any(|t| t.name != old && t.name.to_lowercase() == lowered)
        {
            return Err(LibraryError::DuplicateTag(new.to_string()));
        }

        self.tags[index].name = new.to_string();
        let mut rewritten = 0;
        for prompt in prompts.iter_mut() {
            if let Some(pos) = prompt.tags.iter().position(|t| t == old) {
                prompt.tags[pos] = new.to_string();
                rewritten += 1;
            }
        }

        info!(from = old, to = new, prompts = rewritten, "tag renamed");
        Ok(())
    }

    /// Remove a tag from the taxonomy and strip it from every prompt.
    ///
    /// Deleting a name the taxonomy does not know is an acknowledged
    /// no-op on the taxonomy side; any prompts still carrying the name
    /// are cleaned up regardless. What happens to a prompt left with no
    /// tags is decided by `policy`.
    pub fn delete(
        &mut self,
        name: &str,
        prompts: &mut [Prompt],
        policy: &TagDeletePolicy,
    ) -> Result<(), LibraryError> {
        if let Some(tag) = self.tags.iter().find(|t| t.name == name) {
            if tag.is_protected() {
                return Err(LibraryError::ProtectedTag(name.to_string()));
            }
        }
        self.tags.retain(|t| t.name != name);

        let mut stripped = 0;
        for prompt in prompts.iter_mut() {
            let before = prompt.tags.len();
            prompt.tags.retain(|t| t != name);
            if prompt.tags.len() != before {
                stripped += 1;
                if prompt.tags.is_empty() {
                    if let TagDeletePolicy::FallbackTo(fallback) = policy {
                        prompt.tags.push(fallback.clone());
                    }
                }
            }
        }

        info!(tag = name, prompts = stripped, "tag deleted");
        Ok(())
    }

    /// Import-time registration: add `name` as a custom tag unless a
    /// case-insensitive match already exists. Returns whether an entry
    /// was added.
    pub(crate) fn register(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.contains(name) {
            return false;
        }
        debug!(tag = name, "tag registered during import");
        self.tags.push(Tag::custom(name));
        true
    }
}

impl Default for TagTaxonomy {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DEFAULT_TAG;

    fn prompt_with_tags(id: i64, tags: &[&str]) -> Prompt {
        Prompt {
            id,
            title: format!("P{id}"),
            text: "body".to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            is_favorite: false,
            created_at: Some(0),
            updated_at: Some(0),
            category: None,
        }
    }

    #[test]
    fn test_seed_contains_builtins_and_favorite() {
        let taxonomy = TagTaxonomy::with_defaults();
        assert_eq!(taxonomy.len(), 7);
        assert!(taxonomy.contains("general"));
        assert!(taxonomy.contains("Favorite"));
        assert!(taxonomy.tags().iter().all(Tag::is_protected));
    }

    #[test]
    fn test_add_rejects_case_insensitive_duplicate() {
        let mut taxonomy = TagTaxonomy::with_defaults();
        taxonomy.add("Ideas").unwrap();

        assert!(matches!(
            taxonomy.add("ideas"),
            Err(LibraryError::DuplicateTag(_))
        ));
        assert!(matches!(
            taxonomy.add("WRITING"),
            Err(LibraryError::DuplicateTag(_))
        ));
        assert!(matches!(
            taxonomy.add("  "),
            Err(LibraryError::Validation(_))
        ));
    }

    #[test]
    fn test_rename_rewrites_prompts_in_place() {
        let mut taxonomy = TagTaxonomy::with_defaults();
        taxonomy.add("Work").unwrap();
        let mut prompts = vec![
            prompt_with_tags(1, &["Work", "Coding"]),
            prompt_with_tags(2, &["Coding", "Work"]),
            prompt_with_tags(3, &["Coding"]),
        ];

        taxonomy.rename("Work", "Job", &mut prompts).unwrap();

        assert!(taxonomy.contains("Job"));
        assert!(!taxonomy.contains("Work"));
        assert_eq!(prompts[0].tags, vec!["Job", "Coding"]);
        assert_eq!(prompts[1].tags, vec!["Coding", "Job"]);
        assert_eq!(prompts[2].tags, vec!["Coding"]);
    }

    #[test]
    fn test_rename_rejections() {
        let mut taxonomy = TagTaxonomy::with_defaults();
        taxonomy.add("Work").unwrap();
        taxonomy.add("Play").unwrap();
        let mut prompts = vec![];

        assert!(matches!(
            taxonomy.rename("General", "Misc", &mut prompts),
            Err(LibraryError::ProtectedTag(_))
        ));
        assert!(matches!(
            taxonomy.rename("Favorite", "Starred", &mut prompts),
            Err(LibraryError::ProtectedTag(_))
        ));
        assert!(matches!(
            taxonomy.rename("Work", "Work", &mut prompts),
            Err(LibraryError::Unchanged)
        ));
        assert!(matches!(
            taxonomy.rename("Work", "play", &mut prompts),
            Err(LibraryError::DuplicateTag(_))
        ));
        assert!(matches!(
            taxonomy.rename("Missing", "X", &mut prompts),
            Err(LibraryError::TagNotFound(_))
        ));
    }

    #[test]
    fn test_delete_strips_tag_and_leaves_empty_list() {
        let mut taxonomy = TagTaxonomy::with_defaults();
        taxonomy.add("Fieldwork").unwrap();
        let mut prompts = vec![prompt_with_tags(1, &["Fieldwork"])];

        taxonomy
            .delete("Fieldwork", &mut prompts, &TagDeletePolicy::LeaveEmpty)
            .unwrap();

        assert!(!taxonomy.contains("Fieldwork"));
        assert!(prompts[0].tags.is_empty());
    }

    #[test]
    fn test_delete_fallback_policy_retags() {
        let mut taxonomy = TagTaxonomy::with_defaults();
        taxonomy.add("Fieldwork").unwrap();
        let mut prompts = vec![
            prompt_with_tags(1, &["Fieldwork"]),
            prompt_with_tags(2, &["Fieldwork", "Coding"]),
        ];

        taxonomy
            .delete(
                "Fieldwork",
                &mut prompts,
                &TagDeletePolicy::FallbackTo(DEFAULT_TAG.to_string()),
            )
            .unwrap();

        assert_eq!(prompts[0].tags, vec![DEFAULT_TAG]);
        // Prompts that keep at least one tag are not re-tagged.
        assert_eq!(prompts[1].tags, vec!["Coding"]);
    }

    #[test]
    fn test_delete_protected_tag_rejected() {
        let mut taxonomy = TagTaxonomy::with_defaults();
        let mut prompts = vec![];

        assert!(matches!(
            taxonomy.delete("Favorite", &mut prompts, &TagDeletePolicy::LeaveEmpty),
            Err(LibraryError::ProtectedTag(_))
        ));
        assert_eq!(taxonomy.len(), 7);
    }

    #[test]
    fn test_delete_unknown_tag_still_cleans_prompts() {
        let mut taxonomy = TagTaxonomy::with_defaults();
        let mut prompts = vec![prompt_with_tags(1, &["Orphan", "Coding"])];

        taxonomy
            .delete("Orphan", &mut prompts, &TagDeletePolicy::LeaveEmpty)
            .unwrap();
        assert_eq!(prompts[0].tags, vec!["Coding"]);
    }

    #[test]
    fn test_register_is_case_insensitive() {
        let mut taxonomy = TagTaxonomy::with_defaults();
        assert!(taxonomy.register("Imported"));
        assert!(!taxonomy.register("imported"));
        assert!(!taxonomy.register("writing"));
        assert!(!taxonomy.register(""));
        assert_eq!(taxonomy.len(), 8);
    }
}
