//! Writing a deck's markdown out as a standalone file.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

const FALLBACK_NAME: &str = "presentation";
const MAX_SLUG_LEN: usize = 100;

/// A deck ready to be written out, as captured by the save shortcut.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    pub markdown: String,
    pub title: Option<String>,
    pub deck_id: Option<String>,
}

impl ExportRequest {
    pub fn filename(&self) -> String {
        export_filename(self.title.as_deref(), self.deck_id.as_deref())
    }
}

/// Lowercase ASCII slug: runs of anything but `a-z0-9` become one `-`.
pub fn slugify(title: &str) -> String {
    let lower = title.to_lowercase();
    let mut slug = String::with_capacity(lower.len());
    let mut pending_dash = false;
    for c in lower.chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }
    slug.truncate(MAX_SLUG_LEN);
    if slug.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        slug
    }
}

/// `<slug>.md`, named after the deck id when known, else the title.
pub fn export_filename(title: Option<&str>, deck_id: Option<&str>) -> String {
    let stem = match (deck_id, title) {
        (Some(id), _) => slugify(id),
        (None, Some(title)) => slugify(title),
        (None, None) => FALLBACK_NAME.to_string(),
    };
    format!("{stem}.md")
}

/// Write the request into `dir`. Nothing is written for blank markdown.
pub fn export_markdown(dir: &Path, request: &ExportRequest) -> Result<Option<PathBuf>> {
    if request.markdown.trim().is_empty() {
        return Ok(None);
    }
    fs::create_dir_all(dir)?;
    let path = dir.join(request.filename());
    fs::write(&path, &request.markdown)?;
    log::info!("exported deck to {}", path.display());
    Ok(Some(path))
}
