use crate::route::{Location, Route, Router};
use crate::source::DeckSource;
use crate::store::{SlideAction, SlideStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The route's deck id is the one already handled.
    Unchanged,
    Unloaded,
    Loaded(String),
    /// The deck could not be resolved; the route was sent to the picker.
    NotFound(String),
}

/// Loads and unloads decks as the route's deck id changes.
///
/// Only the deck id is watched. Moving between presentation, editor and
/// overview for the same deck never reloads it, so the slide position survives.
#[derive(Debug, Default)]
pub struct DeckLoader {
    mounted: bool,
    last_deck: Option<Option<String>>,
}

impl DeckLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sync<L: Location>(
        &mut self,
        router: &mut Router<L>,
        store: &mut SlideStore,
        source: &mut dyn DeckSource,
    ) -> LoadOutcome {
        if !self.mounted {
            self.mounted = true;
            match source.migrate_legacy() {
                Ok(true) => log::info!("migrated legacy draft into the default deck"),
                Ok(false) => {}
                Err(e) => log::warn!("legacy draft migration failed: {e}"),
            }
        }

        let deck_id = router.route().deck_id().map(str::to_string);
        if self.last_deck.as_ref() == Some(&deck_id) {
            return LoadOutcome::Unchanged;
        }
        self.last_deck = Some(deck_id.clone());

        let Some(deck_id) = deck_id else {
            store.dispatch(SlideAction::UnloadDeck);
            return LoadOutcome::Unloaded;
        };

        match source.load_deck(&deck_id) {
            Some(markdown) => {
                log::debug!("loading deck {deck_id}");
                store.dispatch(SlideAction::LoadDeck {
                    deck_id: deck_id.clone(),
                    markdown,
                });
                LoadOutcome::Loaded(deck_id)
            }
            None => {
                log::warn!("deck {deck_id} not found, returning to picker");
                router.set_route(Route::Picker);
                LoadOutcome::NotFound(deck_id)
            }
        }
    }
}
