//! Error types for deck storage and export.
//!
//! The deck model itself (parser, registry, store, router) never fails; only
//! the pieces that touch the filesystem return these.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Reading or writing a deck, draft or export failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The deck id cannot be used as a storage key.
    #[error("Invalid deck id: {0:?}")]
    InvalidDeckId(String),

    /// No deck with this id exists in the registry or drafts.
    #[error("Deck not found: {0}")]
    DeckNotFound(String),

    /// A dropped or imported file exceeds the accepted size.
    #[error("File too large: {path} is {size} bytes (limit {limit})")]
    FileTooLarge { path: PathBuf, size: u64, limit: u64 },

    /// The filesystem watcher could not be set up.
    #[error("Watch error: {0}")]
    Watch(#[from] notify_debouncer_mini::notify::Error),
}
