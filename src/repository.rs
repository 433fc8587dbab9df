//! Prompt collection and its save rules
//!
//! [`PromptRepository`] owns the in-memory prompt collection and every
//! rule that governs it: input validation, the case-insensitive
//! duplicate-title check with its suggested-rename counter, id
//! synthesis, and the favorite/tag synchronization that keeps
//! `is_favorite` aligned with membership of the Favorite tag. It knows
//! nothing about storage; persistence happens one layer up.

use tracing::debug;

use crate::error::LibraryError;
use crate::migrate::{migrate_legacy, RawPrompt};
use crate::models::{now_ms, Prompt, FAVORITE_TAG};

/// Caller-supplied fields for a create or update.
#[derive(Debug, Clone, Default)]
pub struct PromptDraft {
    pub title: String,
    pub text: String,
    pub tags: Vec<String>,
}

impl PromptDraft {
    pub fn new(title: impl Into<String>, text: impl Into<String>, tags: Vec<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            tags,
        }
    }

    /// Trim the text fields, drop blank and repeated tags, and reject
    /// drafts with no title or no text.
    fn normalized(self) -> Result<Self, LibraryError> {
        let title = self.title.trim().to_string();
        let text = self.text.trim().to_string();
        if title.is_empty() || text.is_empty() {
            return Err(LibraryError::Validation(
                "both a title and prompt text are required".to_string(),
            ));
        }

        let mut tags: Vec<String> = Vec::new();
        for tag in self.tags {
            let tag = tag.trim().to_string();
            if !tag.is_empty() && !tags.contains(&tag) {
                tags.push(tag);
            }
        }

        Ok(Self { title, text, tags })
    }
}

/// The in-memory prompt collection, authoritative for the session.
#[derive(Debug, Default)]
pub struct PromptRepository {
    prompts: Vec<Prompt>,
}

impl PromptRepository {
    pub fn new(prompts: Vec<Prompt>) -> Self {
        Self { prompts }
    }

    /// Build the collection from raw stored records, running legacy
    /// migration on the way in.
    pub fn from_raw(raw: Vec<RawPrompt>) -> Self {
        Self::new(migrate_legacy(raw))
    }

    pub fn prompts(&self) -> &[Prompt] {
        &self.prompts
    }

    pub(crate) fn prompts_mut(&mut self) -> &mut Vec<Prompt> {
        &mut self.prompts
    }

    pub fn len(&self) -> usize {
        self.prompts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }

    pub fn get(&self, id: i64) -> Option<&Prompt> {
        self.prompts.iter().find(|p| p.id == id)
    }

    /// Add a new prompt.
    ///
    /// Fails with [`LibraryError::DuplicateTitle`] when another prompt
    /// already uses the title; the error carries the first free
    /// numbered variant so the caller can offer it. Accepting that
    /// suggestion is just a second call with the suggested title.
    pub fn create(&mut self, draft: PromptDraft) -> Result<Prompt, LibraryError> {
        let draft = draft.normalized()?;
        self.check_title(&draft.title, None)?;

        let now = now_ms();
        let prompt = Prompt {
            id: self.fresh_id(now),
            is_favorite: draft.tags.iter().any(|t| t == FAVORITE_TAG),
            title: draft.title,
            text: draft.text,
            tags: draft.tags,
            created_at: Some(now),
            updated_at: Some(now),
            category: None,
        };

        debug!(id = prompt.id, title = %prompt.title, "prompt created");
        self.prompts.push(prompt.clone());
        Ok(prompt)
    }

    /// Replace the fields of an existing prompt. The duplicate check
    /// excludes the prompt being edited, and `created_at` is carried
    /// over.
    pub fn update(&mut self, id: i64, draft: PromptDraft) -> Result<Prompt, LibraryError> {
        let draft = draft.normalized()?;
        let index = self
            .prompts
            .iter()
            .position(|p| p.id == id)
            .ok_or(LibraryError::PromptNotFound(id))?;
        self.check_title(&draft.title, Some(id))?;

        let now = now_ms();
        let prompt = Prompt {
            id,
            is_favorite: draft.tags.iter().any(|t| t == FAVORITE_TAG),
            title: draft.title,
            text: draft.text,
            tags: draft.tags,
            created_at: self.prompts[index].created_at.or(Some(now)),
            updated_at: Some(now),
            category: None,
        };

        debug!(id, title = %prompt.title, "prompt updated");
        self.prompts[index] = prompt.clone();
        Ok(prompt)
    }

    /// Remove a prompt, returning the removed record.
    pub fn delete(&mut self, id: i64) -> Result<Prompt, LibraryError> {
        let index = self
            .prompts
            .iter()
            .position(|p| p.id == id)
            .ok_or(LibraryError::PromptNotFound(id))?;
        let removed = self.prompts.remove(index);
        debug!(id, title = %removed.title, "prompt deleted");
        Ok(removed)
    }

    /// Flip the favorite flag and keep the Favorite tag in step: newly
    /// favorited prompts gain the tag at the end of their list, newly
    /// unfavorited ones lose it. An emptied tag list stays empty.
    pub fn toggle_favorite(&mut self, id: i64) -> Result<Prompt, LibraryError> {
        let prompt = self
            .prompts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(LibraryError::PromptNotFound(id))?;

        prompt.is_favorite = !prompt.is_favorite;
        if prompt.is_favorite {
            if !prompt.tags.iter().any(|t| t == FAVORITE_TAG) {
                prompt.tags.push(FAVORITE_TAG.to_string());
            }
        } else {
            prompt.tags.retain(|t| t != FAVORITE_TAG);
        }
        prompt.updated_at = Some(now_ms());

        debug!(id, favorite = prompt.is_favorite, "favorite toggled");
        Ok(prompt.clone())
    }

    /// First title of the form `"<base> (n)"`, n counting up from 2,
    /// that no other prompt uses case-insensitively.
    pub fn generate_unique_title(&self, base: &str, exclude: Option<i64>) -> String {
        let mut counter = 2;
        loop {
            let candidate = format!("{} ({})", base, counter);
            if self.title_holder(&candidate, exclude).is_none() {
                return candidate;
            }
            counter += 1;
        }
    }

    /// Insert an already-built prompt without the duplicate-title
    /// check. Import rows go through here: the import path never
    /// deduplicates titles against the existing collection.
    pub(crate) fn insert(&mut self, prompt: Prompt) {
        self.prompts.push(prompt);
    }

    /// Smallest id >= `start` not used by any existing prompt.
    pub(crate) fn fresh_id(&self, start: i64) -> i64 {
        let mut id = start;
        while self.prompts.iter().any(|p| p.id == id) {
            id += 1;
        }
        id
    }

    fn check_title(&self, title: &str, exclude: Option<i64>) -> Result<(), LibraryError> {
        match self.title_holder(title, exclude) {
            Some(_) => Err(LibraryError::DuplicateTitle {
                title: title.to_string(),
                suggested: self.generate_unique_title(title, exclude),
            }),
            None => Ok(()),
        }
    }

    fn title_holder(&self, title: &str, exclude: Option<i64>) -> Option<&Prompt> {
        let needle = title.to_lowercase();
        self.prompts
            .iter()
            .filter(|p| exclude != Some(p.id))
            .find(|p| p.title.to_lowercase() == needle)
    }
}
