use std::collections::BTreeMap;

use serde::Serialize;

/// Keys that would reach an object prototype in a JavaScript host. Decks are
/// shared with browser tooling, so these never enter a metadata map.
pub const DENIED_KEYS: [&str; 3] = ["__proto__", "constructor", "prototype"];

pub fn is_denied_key(key: &str) -> bool {
    DENIED_KEYS.contains(&key)
}

/// An open string-keyed metadata map.
///
/// Used both for deck-level frontmatter and for per-slide directives. Keys are
/// kept in sorted order so that two parses of the same input compare equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Metadata(BTreeMap<String, String>);

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a pair unless the key is denied. Returns whether it was stored.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> bool {
        let key = key.into();
        if is_denied_key(&key) {
            log::trace!("dropping denied metadata key {key:?}");
            return false;
        }
        self.0.insert(key, value.into());
        true
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    // Slide directive keys

    pub fn bg(&self) -> Option<&str> {
        self.get("bg")
    }

    pub fn class(&self) -> Option<&str> {
        self.get("class")
    }

    pub fn layout(&self) -> Option<&str> {
        self.get("layout")
    }

    pub fn transition(&self) -> Option<&str> {
        self.get("transition")
    }

    // Deck frontmatter keys

    pub fn title(&self) -> Option<&str> {
        self.get("title")
    }

    pub fn author(&self) -> Option<&str> {
        self.get("author")
    }

    pub fn date(&self) -> Option<&str> {
        self.get("date")
    }

    pub fn aspect_ratio(&self) -> Option<&str> {
        self.get("aspectRatio")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Metadata {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut meta = Metadata::new();
        for (k, v) in iter {
            meta.insert(k, v);
        }
        meta
    }
}
