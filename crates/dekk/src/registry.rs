//! Index of the decks available to the picker.
//!
//! Built once from a `path -> markdown` mapping. Only the frontmatter is
//! scanned for the title and author; slides are counted with the same
//! thematic-break rule the parser uses, without building any slides.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::parser::{frontmatter, normalize_newlines, splitter};

/// Directory segment every deck lives under.
pub const DECKS_SEGMENT: &str = "presentations";
/// File name of a deck inside its directory.
pub const DECK_FILENAME: &str = "slides.md";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckEntry {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub slide_count: usize,
    #[serde(skip)]
    pub raw_markdown: String,
}

/// Extract the deck id from `.../presentations/<id>/slides.md`.
pub fn deck_id_from_path(path: &str) -> Option<&str> {
    let mut segments = path.rsplit('/');
    if segments.next()? != DECK_FILENAME {
        return None;
    }
    let id = segments.next()?;
    if id.is_empty() || segments.next()? != DECKS_SEGMENT {
        return None;
    }
    Some(id)
}

/// Logical registry path for a deck id, the inverse of [`deck_id_from_path`].
pub fn deck_path(id: &str) -> String {
    format!("/{DECKS_SEGMENT}/{id}/{DECK_FILENAME}")
}

fn title_and_author(markdown: &str) -> (Option<String>, Option<String>) {
    let Some((block, _)) = frontmatter::fenced_block(markdown) else {
        return (None, None);
    };
    let mut title = None;
    let mut author = None;
    for line in block.split('\n') {
        match frontmatter::split_pair(line) {
            Some(("title", value)) => title = Some(value.to_string()),
            Some(("author", value)) => author = Some(value.to_string()),
            _ => {}
        }
    }
    (title, author)
}

fn count_slides(markdown: &str) -> usize {
    let (_, body) = frontmatter::extract(markdown);
    splitter::count(body)
}

/// Build sorted deck entries from a `path -> markdown` mapping.
///
/// Paths that do not match the deck layout are skipped. A deck without a
/// (non-empty) frontmatter title is listed under its id.
pub fn build_registry<'a, I>(files: I) -> Vec<DeckEntry>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut entries: Vec<DeckEntry> = files
        .into_iter()
        .filter_map(|(path, raw)| {
            let id = deck_id_from_path(path)?;
            let markdown = normalize_newlines(raw);
            let (title, author) = title_and_author(&markdown);
            Some(DeckEntry {
                id: id.to_string(),
                title: title
                    .filter(|t| !t.is_empty())
                    .unwrap_or_else(|| id.to_string()),
                author: author.filter(|a| !a.is_empty()),
                slide_count: count_slides(&markdown),
                raw_markdown: raw.to_string(),
            })
        })
        .collect();

    entries.sort_by(|a, b| a.id.cmp(&b.id));
    entries.dedup_by(|a, b| a.id == b.id);
    entries
}

/// Immutable snapshot of the available decks, ordered by id.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: Vec<DeckEntry>,
}

impl Registry {
    pub fn new(files: &BTreeMap<String, String>) -> Self {
        let entries = build_registry(files.iter().map(|(p, m)| (p.as_str(), m.as_str())));
        log::debug!("registry built with {} deck(s)", entries.len());
        Self { entries }
    }

    pub fn entries(&self) -> &[DeckEntry] {
        &self.entries
    }

    pub fn get_deck(&self, id: &str) -> Option<&DeckEntry> {
        self.entries
            .binary_search_by(|e| e.id.as_str().cmp(id))
            .ok()
            .map(|i| &self.entries[i])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mock_files() -> BTreeMap<String, String> {
        BTreeMap::from([
            (
                "/presentations/my-talk/slides.md".to_string(),
                "---\ntitle: My Talk\nauthor: Jane\n---\n# Slide 1\n---\n# Slide 2".to_string(),
            ),
            (
                "/presentations/demo/slides.md".to_string(),
                "# Just One Slide".to_string(),
            ),
            ("/presentations/demo/notes.md".to_string(), "# ignored".to_string()),
            ("/elsewhere/other/slides.md".to_string(), "# ignored".to_string()),
        ])
    }

    #[test]
    fn test_entries_sorted_by_id() {
        let registry = Registry::new(&mock_files());
        let ids: Vec<&str> = registry.entries().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["demo", "my-talk"]);
    }

    #[test]
    fn test_title_and_author() {
        let registry = Registry::new(&mock_files());
        let talk = registry.get_deck("my-talk").unwrap();
        assert_eq!(talk.title, "My Talk");
        assert_eq!(talk.author.as_deref(), Some("Jane"));
        assert_eq!(talk.slide_count, 2);
    }

    #[test]
    fn test_title_falls_back_to_id() {
        let registry = Registry::new(&mock_files());
        let demo = registry.get_deck("demo").unwrap();
        assert_eq!(demo.title, "demo");
        assert_eq!(demo.author, None);
        assert_eq!(demo.slide_count, 1);
    }

    #[test]
    fn test_unknown_deck() {
        let registry = Registry::new(&mock_files());
        assert!(registry.get_deck("nope").is_none());
    }

    #[test]
    fn test_empty_input() {
        assert!(build_registry(std::iter::empty()).is_empty());
    }

    #[test]
    fn test_counts_every_separator_style() {
        let files = [(
            "/presentations/mixed/slides.md",
            "---\n\n# A\n***\n# B\n\n___\n\n| x |\n|---|\n| 1 |",
        )];
        let entries = build_registry(files);
        assert_eq!(entries[0].slide_count, 3);
        assert_eq!(entries[0].title, "mixed");
    }

    #[test]
    fn test_count_agrees_with_parser() {
        let md = include_str!("../../../presentations/default/slides.md");
        let entries = build_registry([("/presentations/default/slides.md", md)]);
        assert_eq!(entries[0].slide_count, crate::parser::parse(md).slides.len());
        assert_eq!(entries[0].title, "Welcome to Dekk");
    }

    #[test]
    fn test_deck_id_from_path() {
        assert_eq!(deck_id_from_path("/presentations/a/slides.md"), Some("a"));
        assert_eq!(deck_id_from_path("root/presentations/b/slides.md"), Some("b"));
        assert_eq!(deck_id_from_path("/presentations//slides.md"), None);
        assert_eq!(deck_id_from_path("/presentations/a/b/slides.md"), None);
        assert_eq!(deck_id_from_path("slides.md"), None);
        assert_eq!(deck_id_from_path(&deck_path("round")), Some("round"));
    }

    #[test]
    fn test_registry_is_deterministic() {
        let files = mock_files();
        assert_eq!(Registry::new(&files).entries(), Registry::new(&files).entries());
    }
}
