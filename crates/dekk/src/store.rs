//! The slide store: a reducer over [`SlideState`].
//!
//! [`reduce`] is pure. [`SlideStore`] is the single mutation entry point the
//! rest of the app holds; it applies actions in the order they arrive and
//! bumps a revision counter that views poll for changes.

use crate::parser::{self, DeckMetadata, SlideData};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlideState {
    pub raw_markdown: String,
    pub slides: Vec<SlideData>,
    pub deck_metadata: DeckMetadata,
    /// Always within `0..max(1, slides.len())`.
    pub current_index: usize,
    /// `None` while the picker is showing.
    pub current_deck: Option<String>,
}

impl SlideState {
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    pub fn current_slide(&self) -> Option<&SlideData> {
        self.slides.get(self.current_index)
    }

    pub fn last_index(&self) -> usize {
        self.slides.len().saturating_sub(1)
    }

    pub fn title(&self) -> Option<&str> {
        self.deck_metadata.title()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlideAction {
    /// Replace the markdown in place, keeping the viewer on the same slide when possible.
    SetMarkdown(String),
    /// Switch decks; always starts at the first slide.
    LoadDeck { deck_id: String, markdown: String },
    UnloadDeck,
    NextSlide,
    PrevSlide,
    GoToSlide(usize),
}

fn clamp(index: usize, slides: &[SlideData]) -> usize {
    index.min(slides.len().saturating_sub(1))
}

/// Apply one action. Every returned state has an in-range `current_index`.
pub fn reduce(state: SlideState, action: &SlideAction) -> SlideState {
    match action {
        SlideAction::SetMarkdown(markdown) => {
            let parsed = parser::parse(markdown);
            let current_index = clamp(state.current_index, &parsed.slides);
            SlideState {
                raw_markdown: markdown.clone(),
                slides: parsed.slides,
                deck_metadata: parsed.deck_metadata,
                current_index,
                current_deck: state.current_deck,
            }
        }
        SlideAction::LoadDeck { deck_id, markdown } => {
            let parsed = parser::parse(markdown);
            SlideState {
                raw_markdown: markdown.clone(),
                slides: parsed.slides,
                deck_metadata: parsed.deck_metadata,
                current_index: 0,
                current_deck: Some(deck_id.clone()),
            }
        }
        SlideAction::UnloadDeck => SlideState::default(),
        SlideAction::NextSlide => {
            let current_index = clamp(state.current_index.saturating_add(1), &state.slides);
            SlideState {
                current_index,
                ..state
            }
        }
        SlideAction::PrevSlide => {
            let current_index = clamp(state.current_index.saturating_sub(1), &state.slides);
            SlideState {
                current_index,
                ..state
            }
        }
        SlideAction::GoToSlide(index) => {
            let current_index = clamp(*index, &state.slides);
            SlideState {
                current_index,
                ..state
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct SlideStore {
    state: SlideState,
    revision: u64,
}

impl SlideStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SlideState {
        &self.state
    }

    /// Incremented on every dispatch that changed the state.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn dispatch(&mut self, action: SlideAction) {
        let before = self.state.current_index;
        let next = reduce(std::mem::take(&mut self.state), &action);
        let motion = matches!(
            action,
            SlideAction::NextSlide | SlideAction::PrevSlide | SlideAction::GoToSlide(_)
        );
        if !motion || next.current_index != before {
            self.revision += 1;
        }
        log::trace!("{} -> index {}", action_name(&action), next.current_index);
        self.state = next;
    }
}

fn action_name(action: &SlideAction) -> &'static str {
    match action {
        SlideAction::SetMarkdown(_) => "SET_MARKDOWN",
        SlideAction::LoadDeck { .. } => "LOAD_DECK",
        SlideAction::UnloadDeck => "UNLOAD_DECK",
        SlideAction::NextSlide => "NEXT_SLIDE",
        SlideAction::PrevSlide => "PREV_SLIDE",
        SlideAction::GoToSlide(_) => "GO_TO_SLIDE",
    }
}
