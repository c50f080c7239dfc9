pub mod directives;
pub mod frontmatter;
pub mod metadata;
pub mod splitter;

use std::borrow::Cow;

use serde::Serialize;

pub use metadata::Metadata;

/// Per-slide directives (`bg`, `class`, `layout`, `transition`, ...).
pub type SlideMetadata = Metadata;

/// Deck frontmatter (`title`, `author`, `date`, `aspectRatio`, ...).
pub type DeckMetadata = Metadata;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideData {
    pub metadata: SlideMetadata,
    /// The trimmed markdown of this slide with leading directives removed.
    pub raw_content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResult {
    pub slides: Vec<SlideData>,
    pub deck_metadata: DeckMetadata,
}

impl ParseResult {
    pub fn title(&self) -> Option<&str> {
        self.deck_metadata.title()
    }
}

/// Parse a deck into slides and deck metadata.
///
/// Total over all input: malformed shapes degrade to plain content, and an
/// empty or whitespace-only body yields no slides.
pub fn parse(markdown: &str) -> ParseResult {
    if markdown.trim().is_empty() {
        return ParseResult::default();
    }

    let markdown = normalize_newlines(markdown);
    let (deck_metadata, body) = frontmatter::extract(&markdown);
    if body.trim().is_empty() {
        return ParseResult {
            slides: Vec::new(),
            deck_metadata,
        };
    }

    let slides = splitter::split(body)
        .iter()
        .map(|chunk| {
            let (metadata, raw_content) = directives::extract(chunk);
            SlideData {
                metadata,
                raw_content,
            }
        })
        .collect();

    ParseResult {
        slides,
        deck_metadata,
    }
}

pub(crate) fn normalize_newlines(text: &str) -> Cow<'_, str> {
    if text.contains("\r\n") {
        Cow::Owned(text.replace("\r\n", "\n"))
    } else {
        Cow::Borrowed(text)
    }
}

/// First markdown heading of a slide, without its `#` marker.
pub fn slide_heading(slide: &SlideData) -> Option<&str> {
    slide.raw_content.lines().find_map(|line| {
        let trimmed = line.trim_start();
        let level = trimmed.chars().take_while(|&c| c == '#').count();
        if (1..=6).contains(&level) {
            let rest = &trimmed[level..];
            if rest.is_empty() || rest.starts_with(' ') {
                return Some(rest.trim());
            }
        }
        None
    })
}
