//! Where decks come from and where drafts go.
//!
//! Canonical decks live in a presentations directory as
//! `<dir>/<deckId>/slides.md`. Edits are saved as drafts, one markdown blob per
//! deck id, and a draft always wins over the canonical file when loading.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::registry::{self, DECK_FILENAME, Registry};
use crate::route::MAX_DECK_ID_LENGTH;

/// Deck id that receives the legacy single-deck draft.
pub const DEFAULT_DECK_ID: &str = "default";
/// File name of the pre-registry single-deck draft.
pub const LEGACY_DRAFT_FILENAME: &str = "legacy.md";

pub trait DeckSource {
    fn registry(&self) -> &Registry;

    /// Markdown for a deck, preferring a saved draft. `None` if unknown.
    fn load_deck(&self, id: &str) -> Option<String>;

    fn save_deck_draft(&mut self, id: &str, markdown: &str) -> Result<()>;

    /// Move the legacy single-deck draft into the default deck's slot.
    /// Returns whether anything was migrated.
    fn migrate_legacy(&mut self) -> Result<bool> {
        Ok(false)
    }

    /// Pick up decks changed outside the process.
    fn reload(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Whether `id` can be used as a single storage key.
pub fn validate_deck_id(id: &str) -> Result<()> {
    let valid = !id.is_empty()
        && id.chars().count() <= MAX_DECK_ID_LENGTH
        && id != "."
        && id != ".."
        && !id.contains(['/', '\\', '\0']);
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidDeckId(id.to_string()))
    }
}

/// Read every `<dir>/<id>/slides.md` into the registry's path mapping.
///
/// Keys use the logical `/presentations/<id>/slides.md` layout whatever the
/// directory is called. Unreadable decks are skipped with a warning.
pub fn discover(dir: &Path) -> Result<BTreeMap<String, String>> {
    let mut files = BTreeMap::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let Some(id) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        let path = entry.path().join(DECK_FILENAME);
        if !path.is_file() {
            continue;
        }
        match fs::read_to_string(&path) {
            Ok(markdown) => {
                files.insert(registry::deck_path(&id), markdown);
            }
            Err(e) => log::warn!("skipping {}: {e}", path.display()),
        }
    }
    Ok(files)
}

#[derive(Debug)]
pub struct FsDeckSource {
    presentations_dir: PathBuf,
    drafts_dir: Option<PathBuf>,
    registry: Registry,
}

impl FsDeckSource {
    /// Scan `presentations_dir`. Drafts are kept in `drafts_dir` when given;
    /// without one, drafts are written back to the deck's own `slides.md`.
    pub fn open(presentations_dir: impl Into<PathBuf>, drafts_dir: Option<PathBuf>) -> Result<Self> {
        let presentations_dir = presentations_dir.into();
        let registry = Registry::new(&discover(&presentations_dir)?);
        Ok(Self {
            presentations_dir,
            drafts_dir,
            registry,
        })
    }

    pub fn presentations_dir(&self) -> &Path {
        &self.presentations_dir
    }

    fn draft_path(&self, id: &str) -> Option<PathBuf> {
        self.drafts_dir.as_ref().map(|dir| dir.join(format!("{id}.md")))
    }

    pub fn has_draft(&self, id: &str) -> bool {
        validate_deck_id(id).is_ok() && self.draft_path(id).is_some_and(|p| p.is_file())
    }

    /// Forget the draft so the canonical deck shows again.
    pub fn discard_draft(&mut self, id: &str) -> Result<bool> {
        validate_deck_id(id)?;
        match self.draft_path(id) {
            Some(path) if path.is_file() => {
                fs::remove_file(path)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

impl DeckSource for FsDeckSource {
    fn registry(&self) -> &Registry {
        &self.registry
    }

    fn load_deck(&self, id: &str) -> Option<String> {
        validate_deck_id(id).ok()?;
        if let Some(path) = self.draft_path(id) {
            match fs::read_to_string(&path) {
                Ok(markdown) => return Some(markdown),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => log::warn!("ignoring unreadable draft {}: {e}", path.display()),
            }
        }
        self.registry.get_deck(id).map(|entry| entry.raw_markdown.clone())
    }

    fn save_deck_draft(&mut self, id: &str, markdown: &str) -> Result<()> {
        validate_deck_id(id)?;
        let (path, in_place) = match self.draft_path(id) {
            Some(path) => (path, false),
            None => (self.presentations_dir.join(id).join(DECK_FILENAME), true),
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, markdown)?;
        log::debug!("saved draft for {id} to {}", path.display());
        // The registry snapshot is what load_deck falls back to
        if in_place {
            self.reload()?;
        }
        Ok(())
    }

    fn migrate_legacy(&mut self) -> Result<bool> {
        let Some(dir) = &self.drafts_dir else {
            return Ok(false);
        };
        let legacy = dir.join(LEGACY_DRAFT_FILENAME);
        if !legacy.is_file() {
            return Ok(false);
        }
        let target = dir.join(format!("{DEFAULT_DECK_ID}.md"));
        if target.exists() {
            log::debug!("legacy draft left in place, {} already exists", target.display());
            return Ok(false);
        }
        fs::rename(&legacy, &target)?;
        log::info!("migrated legacy draft to {}", target.display());
        Ok(true)
    }

    fn reload(&mut self) -> Result<()> {
        self.registry = Registry::new(&discover(&self.presentations_dir)?);
        log::debug!("rescanned {}: {} decks", self.presentations_dir.display(), self.registry.len());
        Ok(())
    }
}

/// Deck source held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryDeckSource {
    registry: Registry,
    drafts: BTreeMap<String, String>,
    legacy: Option<String>,
}

impl MemoryDeckSource {
    pub fn new(files: &BTreeMap<String, String>) -> Self {
        Self {
            registry: Registry::new(files),
            ..Self::default()
        }
    }

    /// A source holding exactly one deck.
    pub fn single(id: &str, markdown: &str) -> Self {
        Self::new(&BTreeMap::from([(registry::deck_path(id), markdown.to_string())]))
    }

    pub fn with_legacy(mut self, markdown: impl Into<String>) -> Self {
        self.legacy = Some(markdown.into());
        self
    }

    pub fn draft(&self, id: &str) -> Option<&str> {
        self.drafts.get(id).map(String::as_str)
    }
}

impl DeckSource for MemoryDeckSource {
    fn registry(&self) -> &Registry {
        &self.registry
    }

    fn load_deck(&self, id: &str) -> Option<String> {
        self.drafts
            .get(id)
            .cloned()
            .or_else(|| self.registry.get_deck(id).map(|e| e.raw_markdown.clone()))
    }

    fn save_deck_draft(&mut self, id: &str, markdown: &str) -> Result<()> {
        validate_deck_id(id)?;
        self.drafts.insert(id.to_string(), markdown.to_string());
        Ok(())
    }

    fn migrate_legacy(&mut self) -> Result<bool> {
        if self.drafts.contains_key(DEFAULT_DECK_ID) {
            return Ok(false);
        }
        match self.legacy.take() {
            Some(markdown) => {
                self.drafts.insert(DEFAULT_DECK_ID.to_string(), markdown);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
