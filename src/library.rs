//! Library facade
//!
//! [`PromptLibrary`] is the owned session object: constructed once from
//! a storage handle, it loads and migrates both collections, keeps them
//! authoritative in memory, and re-persists a whole collection after
//! every mutation. Operations that touch prompts and tags together
//! (tag rename/delete cascades, CSV import) go to storage as a single
//! write.
//!
//! In-memory state is mutated before the write is acknowledged, so on
//! a storage failure the caller should treat the local change as
//! provisional. There is no cross-session conflict handling; two
//! writers racing on one store will last-write-win.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Context;
use serde_json::Value;
use tracing::info;

use crate::csv::{export_csv, parse_import, ImportReport};
use crate::error::LibraryError;
use crate::models::{now_ms, Prompt, Tag};
use crate::query::{filter_and_sort, QueryOptions, ViewSettings};
use crate::repository::{PromptDraft, PromptRepository};
use crate::storage::{StoragePort, PROMPTS_KEY, SETTINGS_KEY, TAGS_KEY};
use crate::taxonomy::{TagDeletePolicy, TagTaxonomy};

/// The prompt library for one session.
pub struct PromptLibrary {
    store: Arc<dyn StoragePort>,
    repository: PromptRepository,
    taxonomy: TagTaxonomy,
    view: ViewSettings,
    delete_policy: TagDeletePolicy,
}

impl PromptLibrary {
    /// Load the library from storage with the default tag-delete
    /// policy.
    pub async fn open(store: Arc<dyn StoragePort>) -> Result<Self, LibraryError> {
        Self::open_with_policy(store, TagDeletePolicy::default()).await
    }

    /// Load the library from storage.
    ///
    /// Stored prompts run through legacy migration; a store with no
    /// taxonomy record gets the seed set. Malformed prompt or tag
    /// records are an error rather than silently discarded, since the
    /// next persist would overwrite them.
    pub async fn open_with_policy(
        store: Arc<dyn StoragePort>,
        delete_policy: TagDeletePolicy,
    ) -> Result<Self, LibraryError> {
        let mut records = store
            .get(&[PROMPTS_KEY, TAGS_KEY, SETTINGS_KEY])
            .await?;

        let repository = match records.remove(PROMPTS_KEY) {
            Some(value) => PromptRepository::from_raw(
                serde_json::from_value(value).context("malformed prompt collection in storage")?,
            ),
            None => PromptRepository::default(),
        };
        let taxonomy = match records.remove(TAGS_KEY) {
            Some(value) => TagTaxonomy::from_stored(
                serde_json::from_value(value).context("malformed tag list in storage")?,
            ),
            None => TagTaxonomy::with_defaults(),
        };
        // Settings are a convenience record; anything unreadable just
        // resets to defaults.
        let view = records
            .remove(SETTINGS_KEY)
            .and_then(|value| serde_json::from_value(value).ok())
            .unwrap_or_default();

        info!(
            prompts = repository.len(),
            tags = taxonomy.len(),
            "prompt library loaded"
        );

        Ok(Self {
            store,
            repository,
            taxonomy,
            view,
            delete_policy,
        })
    }

    pub fn prompts(&self) -> &[Prompt] {
        self.repository.prompts()
    }

    pub fn prompt(&self, id: i64) -> Option<&Prompt> {
        self.repository.get(id)
    }

    pub fn tags(&self) -> &[Tag] {
        self.taxonomy.tags()
    }

    pub fn taxonomy(&self) -> &TagTaxonomy {
        &self.taxonomy
    }

    pub fn view_settings(&self) -> &ViewSettings {
        &self.view
    }

    /// Run a filter/sort query against the current collection.
    pub fn query(&self, options: &QueryOptions) -> Vec<&Prompt> {
        filter_and_sort(self.repository.prompts(), options)
    }

    /// Query with the persisted filter and sort plus a live search
    /// term, the combination a list view renders after any mutation.
    pub fn query_with_saved_view(&self, search: &str) -> Vec<&Prompt> {
        self.query(&self.view.to_query(search))
    }

    /// Serialize the whole collection as a CSV document.
    pub fn export_csv(&self) -> String {
        export_csv(self.repository.prompts())
    }

    /// Save a new prompt. See [`PromptRepository::create`] for the
    /// duplicate-title contract.
    pub async fn create_prompt(&mut self, draft: PromptDraft) -> Result<Prompt, LibraryError> {
        let prompt = self.repository.create(draft)?;
        self.persist_prompts().await?;
        Ok(prompt)
    }

    /// Save changes to an existing prompt.
    pub async fn update_prompt(
        &mut self,
        id: i64,
        draft: PromptDraft,
    ) -> Result<Prompt, LibraryError> {
        let prompt = self.repository.update(id, draft)?;
        self.persist_prompts().await?;
        Ok(prompt)
    }

    /// Remove a prompt.
    pub async fn delete_prompt(&mut self, id: i64) -> Result<(), LibraryError> {
        self.repository.delete(id)?;
        self.persist_prompts().await
    }

    /// Flip a prompt's favorite flag, keeping the Favorite tag in step.
    pub async fn toggle_favorite(&mut self, id: i64) -> Result<Prompt, LibraryError> {
        let prompt = self.repository.toggle_favorite(id)?;
        self.persist_prompts().await?;
        Ok(prompt)
    }

    /// Add a user-defined tag to the taxonomy.
    pub async fn add_tag(&mut self, name: &str) -> Result<(), LibraryError> {
        self.taxonomy.add(name)?;
        self.persist_tags().await
    }

    /// Rename a tag everywhere: the taxonomy entry and every prompt
    /// that carries it, persisted together.
    pub async fn rename_tag(&mut self, old: &str, new: &str) -> Result<(), LibraryError> {
        self.taxonomy
            .rename(old, new, self.repository.prompts_mut())?;
        self.persist_prompts_and_tags().await
    }

    /// Delete a tag everywhere. Prompts left with no tags follow the
    /// policy this library was opened with.
    pub async fn delete_tag(&mut self, name: &str) -> Result<(), LibraryError> {
        let policy = self.delete_policy.clone();
        self.taxonomy
            .delete(name, self.repository.prompts_mut(), &policy)?;
        self.persist_prompts_and_tags().await
    }

    /// Import a CSV document.
    ///
    /// A document missing the required columns aborts before any
    /// record is created. Valid rows become new prompts with fresh
    /// ids; their tag names are registered in the taxonomy when new.
    /// Imported titles are taken as-is, without the duplicate-title
    /// check the interactive save path runs. One write at the end
    /// persists prompts and taxonomy together.
    pub async fn import_csv(&mut self, text: &str) -> Result<ImportReport, LibraryError> {
        let now = now_ms();
        let (rows, skipped) = parse_import(text, now)?;

        let mut imported = 0usize;
        for row in rows {
            for tag in &row.tags {
                self.taxonomy.register(tag);
            }
            let prompt = Prompt {
                id: self.repository.fresh_id(now + imported as i64),
                title: row.title,
                text: row.text,
                tags: row.tags,
                is_favorite: row.is_favorite,
                created_at: Some(row.created_at),
                updated_at: Some(row.updated_at),
                category: None,
            };
            self.repository.insert(prompt);
            imported += 1;
        }

        self.persist_prompts_and_tags().await?;
        let report = ImportReport { imported, skipped };
        info!(imported, skipped, "CSV import finished");
        Ok(report)
    }

    /// Persist the filter/sort selection.
    pub async fn save_view_settings(&mut self, view: ViewSettings) -> Result<(), LibraryError> {
        self.view = view;
        let value =
            serde_json::to_value(&self.view).context("could not serialize view settings")?;
        self.store
            .set(HashMap::from([(SETTINGS_KEY.to_string(), value)]))
            .await?;
        Ok(())
    }

    async fn persist_prompts(&self) -> Result<(), LibraryError> {
        self.store
            .set(HashMap::from([(
                PROMPTS_KEY.to_string(),
                self.prompts_value()?,
            )]))
            .await?;
        Ok(())
    }

    async fn persist_tags(&self) -> Result<(), LibraryError> {
        self.store
            .set(HashMap::from([(TAGS_KEY.to_string(), self.tags_value()?)]))
            .await?;
        Ok(())
    }

    async fn persist_prompts_and_tags(&self) -> Result<(), LibraryError> {
        self.store
            .set(HashMap::from([
                (PROMPTS_KEY.to_string(), self.prompts_value()?),
                (TAGS_KEY.to_string(), self.tags_value()?),
            ]))
            .await?;
        Ok(())
    }

    fn prompts_value(&self) -> Result<Value, LibraryError> {
        Ok(serde_json::to_value(self.repository.prompts())
            .context("could not serialize prompt collection")?)
    }

    fn tags_value(&self) -> Result<Value, LibraryError> {
        Ok(serde_json::to_value(self.taxonomy.tags())
            .context("could not serialize tag list")?)
    }
}
