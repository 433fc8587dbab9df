//! Promptbox - a personal prompt and snippet library engine
//!
//! Promptbox stores short text records, organizes them with a flexible
//! tag taxonomy, answers filter/sort queries over the collection, and
//! bulk-transfers records through a CSV interchange format. It owns the
//! data rules only: rendering, menus, and the concrete persistence
//! engine are collaborators on the other side of small interfaces.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use promptbox::{MemoryStore, PromptDraft, PromptLibrary};
//!
//! # async fn demo() -> Result<(), promptbox::LibraryError> {
//! let store = Arc::new(MemoryStore::new());
//! let mut library = PromptLibrary::open(store).await?;
//!
//! library
//!     .create_prompt(PromptDraft::new(
//!         "Commit message",
//!         "Write a conventional commit message for this diff",
//!         vec!["Coding".to_string()],
//!     ))
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - **Prompts**: create, update, delete, and favorite records, with
//!   case-insensitive title deduplication and suggested renames
//! - **Tags**: a seeded taxonomy with protected built-ins; renames and
//!   deletes cascade through every prompt
//! - **Queries**: substring search, tag filtering, and nine stable
//!   sort orders as a pure function of the collection
//! - **CSV**: quoted-field export and forgiving import with per-row
//!   skip reporting
//! - **Storage**: an async key-value port with in-memory and JSON-file
//!   adapters included
//!
//! # Modules
//!
//! - [`library`]: the session facade owning both collections
//! - [`repository`]: prompt collection rules
//! - [`taxonomy`]: tag lifecycle and cascades
//! - [`query`]: filtering and sorting
//! - [`csv`]: the interchange codec
//! - [`storage`]: the port and its reference adapters
//! - [`migrate`]: legacy record normalization

pub mod action;
pub mod csv;
pub mod error;
pub mod library;
pub mod logging;
pub mod migrate;
pub mod models;
pub mod query;
pub mod repository;
pub mod storage;
pub mod taxonomy;

pub use action::{Action, ActionOutcome};
pub use csv::{csv_template, export_file_name, parse_csv_line, ImportReport, CSV_HEADER};
pub use error::LibraryError;
pub use library::PromptLibrary;
pub use logging::{init_logging, LogConfig, LogFormat};
pub use migrate::{migrate_legacy, RawPrompt};
pub use models::{Prompt, Tag, DEFAULT_TAG, FAVORITE_TAG};
pub use query::{filter_and_sort, QueryOptions, SortKey, ViewSettings};
pub use repository::{PromptDraft, PromptRepository};
pub use storage::{
    FileStore, MemoryStore, StoragePort, PROMPTS_KEY, SETTINGS_KEY, TAGS_KEY,
};
pub use taxonomy::{TagDeletePolicy, TagTaxonomy};
