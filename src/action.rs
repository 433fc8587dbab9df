//! Operation dispatch
//!
//! UI layers tend to funnel every button into one handler. [`Action`]
//! gives that handler a typed vocabulary: each mutating operation is a
//! variant, and [`PromptLibrary::apply`] is the single dispatcher that
//! executes it.

use crate::csv::ImportReport;
use crate::error::LibraryError;
use crate::library::PromptLibrary;
use crate::models::Prompt;
use crate::repository::PromptDraft;

/// One mutating operation against the library.
#[derive(Debug, Clone)]
pub enum Action {
    /// Create when `id` is `None`, otherwise update that prompt.
    Save { id: Option<i64>, draft: PromptDraft },
    Delete { id: i64 },
    ToggleFavorite { id: i64 },
    AddTag { name: String },
    RenameTag { from: String, to: String },
    DeleteTag { name: String },
    ImportCsv { text: String },
}

/// What an applied action produced.
#[derive(Debug)]
pub enum ActionOutcome {
    /// The prompt as saved or toggled.
    Saved(Prompt),
    /// Id of the removed prompt.
    Deleted(i64),
    /// A taxonomy mutation completed, cascades included.
    TaxonomyChanged,
    /// Import counts.
    Imported(ImportReport),
}

impl PromptLibrary {
    /// Execute one action. Errors are the same ones the named methods
    /// return.
    pub async fn apply(&mut self, action: Action) -> Result<ActionOutcome, LibraryError> {
        match action {
            Action::Save { id: None, draft } => {
                Ok(ActionOutcome::Saved(self.create_prompt(draft).await?))
            }
            Action::Save {
                id: Some(id),
                draft,
            } => Ok(ActionOutcome::Saved(self.update_prompt(id, draft).await?)),
            Action::Delete { id } => {
                self.delete_prompt(id).await?;
                Ok(ActionOutcome::Deleted(id))
            }
            Action::ToggleFavorite { id } => {
                Ok(ActionOutcome::Saved(self.toggle_favorite(id).await?))
            }
            Action::AddTag { name } => {
                self.add_tag(&name).await?;
                Ok(ActionOutcome::TaxonomyChanged)
            }
            Action::RenameTag { from, to } => {
                self.rename_tag(&from, &to).await?;
                Ok(ActionOutcome::TaxonomyChanged)
            }
            Action::DeleteTag { name } => {
                self.delete_tag(&name).await?;
                Ok(ActionOutcome::TaxonomyChanged)
            }
            Action::ImportCsv { text } => {
                Ok(ActionOutcome::Imported(self.import_csv(&text).await?))
            }
        }
    }
}
