//! Error types for library operations
//!
//! Callers are expected to match on these variants: a duplicate title
//! carries the suggested replacement so the caller can offer it, a
//! validation failure means the input must be re-edited, and storage
//! failures wrap whatever the backing adapter reported.

use thiserror::Error;

/// Errors produced by prompt, tag, and import operations.
#[derive(Debug, Error)]
pub enum LibraryError {
    /// Required input was empty after trimming.
    #[error("{0}")]
    Validation(String),

    /// Another prompt already uses this title (case-insensitively).
    ///
    /// `suggested` is the first free numbered variant of the title. The
    /// caller decides whether to retry the save with it or go back and
    /// edit; the engine never overwrites the existing prompt.
    #[error("a prompt titled \"{title}\" already exists (try \"{suggested}\")")]
    DuplicateTitle { title: String, suggested: String },

    /// A tag with this name already exists (case-insensitively).
    #[error("tag \"{0}\" already exists")]
    DuplicateTag(String),

    /// Built-in tags and the Favorite tag cannot be renamed or deleted.
    #[error("tag \"{0}\" is built in and cannot be changed")]
    ProtectedTag(String),

    /// A rename where the new name equals the old one.
    #[error("tag name is unchanged")]
    Unchanged,

    /// No prompt with the given id exists.
    #[error("no prompt with id {0}")]
    PromptNotFound(i64),

    /// No tag with the given name exists.
    #[error("no tag named \"{0}\"")]
    TagNotFound(String),

    /// The CSV document is structurally unusable (missing required
    /// columns). Nothing is imported when this is returned.
    #[error("invalid CSV: {0}")]
    CsvFormat(String),

    /// The storage adapter failed. The in-flight operation is aborted;
    /// in-memory state may already reflect the change and should be
    /// treated as provisional by the caller.
    #[error("storage failure: {0}")]
    Storage(#[from] anyhow::Error),
}
