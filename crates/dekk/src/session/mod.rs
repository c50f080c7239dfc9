//! Glue between the store, the router and the deck source.
//!
//! A host (the viewer window, or a test) drives a [`Session`] one tick at a
//! time: feed it input through the `handle_*`/`select_*`/`edit_*` methods, then
//! call [`Session::after_render`] once the frame has been drawn.

pub mod deck_loader;
pub mod navigation;
pub mod route_sync;

use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use crate::error::{Error, Result};
use crate::exporter::ExportRequest;
use crate::keyboard::{self, KeyEvent};
use crate::route::{Location, MemoryLocation, Route, Router};
use crate::source::DeckSource;
use crate::store::{SlideAction, SlideState, SlideStore};

pub use deck_loader::{DeckLoader, LoadOutcome};
pub use navigation::NavEffect;
pub use route_sync::RouteSync;

/// Largest markdown file accepted by drag and drop.
pub const MAX_DROP_FILE_SIZE: u64 = 5 * 1024 * 1024;

pub const DEFAULT_AUTOSAVE_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug)]
struct PendingDraft {
    deck_id: String,
    markdown: String,
    since: Instant,
}

pub struct Session<L: Location> {
    store: SlideStore,
    router: Router<L>,
    source: Box<dyn DeckSource>,
    loader: DeckLoader,
    route_sync: RouteSync,
    autosave_delay: Duration,
    pending_draft: Option<PendingDraft>,
    fullscreen: bool,
}

impl<L: Location> Session<L> {
    pub fn new(location: L, source: Box<dyn DeckSource>) -> Self {
        Self {
            store: SlideStore::new(),
            router: Router::new(location),
            source,
            loader: DeckLoader::new(),
            route_sync: RouteSync::new(),
            autosave_delay: DEFAULT_AUTOSAVE_DELAY,
            pending_draft: None,
            fullscreen: false,
        }
    }

    pub fn with_autosave_delay(mut self, delay: Duration) -> Self {
        self.autosave_delay = delay;
        self
    }

    pub fn state(&self) -> &SlideState {
        self.store.state()
    }

    pub fn store(&self) -> &SlideStore {
        &self.store
    }

    pub fn route(&self) -> &Route {
        self.router.route()
    }

    pub fn router(&self) -> &Router<L> {
        &self.router
    }

    pub fn source(&self) -> &dyn DeckSource {
        self.source.as_ref()
    }

    pub fn source_mut(&mut self) -> &mut dyn DeckSource {
        self.source.as_mut()
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    /// Record a fullscreen change made outside the keyboard (window controls).
    pub fn set_fullscreen(&mut self, fullscreen: bool) {
        self.fullscreen = fullscreen;
    }

    /// Write a fragment the way a user editing the address bar would.
    pub fn navigate_external(&mut self, hash: &str) {
        self.router.location_mut().set_hash(hash);
    }

    pub fn handle_key(&mut self, event: &KeyEvent) -> NavEffect {
        match keyboard::interpret(event) {
            Some(command) => {
                navigation::apply(command, &mut self.router, &mut self.store, &mut self.fullscreen)
            }
            None => NavEffect::None,
        }
    }

    /// The markdown to write out if `event` is the save shortcut and there is
    /// a deck open with content.
    pub fn save_request(&self, event: &KeyEvent) -> Option<ExportRequest> {
        if !keyboard::is_save_shortcut(event) {
            return None;
        }
        self.export_request()
    }

    pub fn export_request(&self) -> Option<ExportRequest> {
        let state = self.store.state();
        if matches!(self.router.route(), Route::Picker) || state.raw_markdown.is_empty() {
            return None;
        }
        Some(ExportRequest {
            markdown: state.raw_markdown.clone(),
            title: state.title().map(str::to_string),
            deck_id: state.current_deck.clone(),
        })
    }

    /// Picker selection.
    pub fn select_deck(&mut self, deck_id: &str) {
        self.router.set_route(Route::presentation(deck_id, 0));
    }

    /// Overview selection: jump there and present it.
    pub fn select_slide(&mut self, index: usize) {
        self.store.dispatch(SlideAction::GoToSlide(index));
        if let Some(deck_id) = self.router.route().deck_id() {
            let route = Route::presentation(deck_id, self.store.state().current_index);
            self.router.set_route(route);
        }
    }

    pub fn go_to_picker(&mut self) {
        self.router.set_route(Route::Picker);
    }

    /// Apply an edit from the editor. The draft is saved once edits have been
    /// quiet for the autosave delay (see [`Session::flush_drafts`]).
    pub fn edit_markdown(&mut self, markdown: String, now: Instant) {
        self.store.dispatch(SlideAction::SetMarkdown(markdown.clone()));
        let Some(deck_id) = self.store.state().current_deck.clone() else {
            return;
        };
        if self
            .pending_draft
            .as_ref()
            .is_some_and(|pending| pending.deck_id != deck_id)
        {
            self.flush_all();
        }
        self.pending_draft = Some(PendingDraft {
            deck_id,
            markdown,
            since: now,
        });
    }

    pub fn has_pending_draft(&self) -> bool {
        self.pending_draft.is_some()
    }

    /// Save the pending draft if the autosave delay has passed. Returns
    /// whether a draft was written.
    pub fn flush_drafts(&mut self, now: Instant) -> bool {
        let due = self
            .pending_draft
            .as_ref()
            .is_some_and(|pending| now.duration_since(pending.since) >= self.autosave_delay);
        due && self.flush_all()
    }

    /// Save any pending draft now.
    pub fn flush_all(&mut self) -> bool {
        let Some(pending) = self.pending_draft.take() else {
            return false;
        };
        match self.source.save_deck_draft(&pending.deck_id, &pending.markdown) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("failed to save draft for {}: {e}", pending.deck_id);
                false
            }
        }
    }

    /// Replace the open deck's markdown with a dropped file.
    ///
    /// Returns `Ok(false)` for files that are not markdown.
    pub fn drop_file(&mut self, path: &Path) -> Result<bool> {
        let is_markdown = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("md") || ext.eq_ignore_ascii_case("markdown"));
        if !is_markdown {
            return Ok(false);
        }

        let size = fs::metadata(path)?.len();
        if size > MAX_DROP_FILE_SIZE {
            log::warn!(
                "dropped file too large ({:.1} MB), maximum is 5 MB",
                size as f64 / 1024.0 / 1024.0
            );
            return Err(Error::FileTooLarge {
                path: path.to_path_buf(),
                size,
                limit: MAX_DROP_FILE_SIZE,
            });
        }

        let markdown = fs::read_to_string(path)?;
        self.store.dispatch(SlideAction::SetMarkdown(markdown.clone()));
        if let Some(deck_id) = self.store.state().current_deck.clone() {
            self.pending_draft = None;
            self.source.save_deck_draft(&deck_id, &markdown)?;
        }
        Ok(true)
    }

    /// Rescan the deck source and refresh the open deck from it. Unsaved
    /// edits win over whatever changed on disk.
    pub fn reload_source(&mut self) -> Result<()> {
        self.source.reload()?;
        if self.pending_draft.is_some() {
            return Ok(());
        }
        let Some(deck_id) = self.store.state().current_deck.clone() else {
            return Ok(());
        };
        match self.source.load_deck(&deck_id) {
            Some(markdown) if markdown != self.store.state().raw_markdown => {
                log::debug!("deck {deck_id} changed on disk, refreshing");
                self.store.dispatch(SlideAction::SetMarkdown(markdown));
            }
            _ => {}
        }
        Ok(())
    }

    /// Post-render work for one tick.
    ///
    /// Loads or unloads the deck if the route's deck changed, lets the route
    /// follow the store's slide index, then ends the router's tick. External
    /// navigations to a slide of the open deck are applied to the store.
    /// Returns whether anything changed that needs another frame.
    pub fn after_render(&mut self) -> bool {
        let mut changed = false;

        let leaving_deck = self
            .pending_draft
            .as_ref()
            .is_some_and(|pending| self.router.route().deck_id() != Some(pending.deck_id.as_str()));
        if leaving_deck {
            self.flush_all();
        }

        match self
            .loader
            .sync(&mut self.router, &mut self.store, self.source.as_mut())
        {
            LoadOutcome::Unchanged => {}
            LoadOutcome::Loaded(_) => {
                changed = true;
                // Deep links land on their slide
                if let Some(index) = self.router.route().slide_index().filter(|&i| i > 0) {
                    self.store.dispatch(SlideAction::GoToSlide(index));
                }
            }
            LoadOutcome::Unloaded | LoadOutcome::NotFound(_) => changed = true,
        }

        if self
            .route_sync
            .sync(self.store.state().current_index, &mut self.router)
        {
            changed = true;
        }

        if let Some(route) = self.router.tick() {
            changed = true;
            if let Route::Presentation {
                deck_id,
                slide_index,
            } = &route
            {
                if self.store.state().current_deck.as_deref() == Some(deck_id.as_str()) {
                    self.store.dispatch(SlideAction::GoToSlide(*slide_index));
                }
            }
        }

        changed
    }
}

impl Session<MemoryLocation> {
    pub fn back(&mut self) -> bool {
        self.router.location_mut().back()
    }

    pub fn forward(&mut self) -> bool {
        self.router.location_mut().forward()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyboard::Key;
    use crate::source::MemoryDeckSource;

    const DECK: &str = "---\ntitle: Test Deck\n---\n# 1\n---\n# 2\n---\n# 3\n---\n# 4";

    fn session(hash: &str) -> Session<MemoryLocation> {
        let mut session = Session::new(
            MemoryLocation::new(hash),
            Box::new(MemoryDeckSource::single("test", DECK)),
        );
        session.after_render();
        session
    }

    #[test]
    fn test_keys_move_store_then_route() {
        let mut s = session("#deck/test");
        for _ in 0..3 {
            s.handle_key(&KeyEvent::new(Key::ArrowRight));
        }
        assert_eq!(s.state().current_index, 3);
        s.after_render();
        assert_eq!(s.route(), &Route::presentation("test", 3));
        assert_eq!(s.router().location().hash(), "#deck/test/3");
    }

    #[test]
    fn test_deep_link_lands_on_slide() {
        let s = session("#deck/test/2");
        assert_eq!(s.state().current_index, 2);
        assert_eq!(s.route(), &Route::presentation("test", 2));
    }

    #[test]
    fn test_deep_link_beyond_end_is_clamped() {
        let mut s = session("#deck/test/40");
        assert_eq!(s.state().current_index, 3);
        s.after_render();
        assert_eq!(s.route(), &Route::presentation("test", 3));
    }

    #[test]
    fn test_unknown_deck_goes_to_picker() {
        let mut s = session("#deck/missing/1");
        assert_eq!(s.route(), &Route::Picker);
        s.after_render();
        assert!(s.state().current_deck.is_none());
        assert_eq!(s.router().location().hash(), "");
    }

    #[test]
    fn test_select_slide_from_overview() {
        let mut s = session("#deck/test/overview");
        s.select_slide(2);
        assert_eq!(s.route(), &Route::presentation("test", 2));
        assert_eq!(s.state().current_index, 2);
    }

    #[test]
    fn test_external_navigation_moves_store() {
        let mut s = session("#deck/test/0");
        s.after_render();
        s.navigate_external("#deck/test/3");
        assert!(s.after_render());
        assert_eq!(s.state().current_index, 3);
        s.after_render();
        assert_eq!(s.route(), &Route::presentation("test", 3));
    }

    #[test]
    fn test_back_restores_previous_slide() {
        let mut s = session("#deck/test/0");
        s.handle_key(&KeyEvent::new(Key::ArrowRight));
        s.after_render();
        s.handle_key(&KeyEvent::new(Key::ArrowRight));
        s.after_render();
        assert_eq!(s.router().location().hash(), "#deck/test/2");
        assert!(s.back());
        s.after_render();
        assert_eq!(s.state().current_index, 1);
    }

    #[test]
    fn test_edit_saves_after_delay() {
        let mut s = session("#deck/test/editor").with_autosave_delay(Duration::from_millis(100));
        let start = Instant::now();
        s.edit_markdown("# edited".to_string(), start);
        assert_eq!(s.state().slides.len(), 1);
        assert!(!s.flush_drafts(start + Duration::from_millis(50)));
        assert!(s.flush_drafts(start + Duration::from_millis(150)));
        assert_eq!(s.source().load_deck("test").as_deref(), Some("# edited"));
    }

    #[test]
    fn test_pending_draft_flushed_when_leaving_deck() {
        let mut s = session("#deck/test/editor");
        s.edit_markdown("# draft".to_string(), Instant::now());
        s.go_to_picker();
        s.after_render();
        assert!(!s.has_pending_draft());
        assert_eq!(s.source().load_deck("test").as_deref(), Some("# draft"));
    }

    #[test]
    fn test_save_request() {
        let mut s = session("#deck/test/editor");
        let save = KeyEvent::char('s').with_ctrl();
        let request = s.save_request(&save).unwrap();
        assert_eq!(request.title.as_deref(), Some("Test Deck"));
        assert_eq!(request.filename(), "test.md");
        assert!(s.save_request(&KeyEvent::char('s')).is_none());

        s.go_to_picker();
        s.after_render();
        assert!(s.save_request(&save).is_none());
    }

    #[test]
    fn test_reload_refreshes_open_deck() {
        let mut s = session("#deck/test/3");
        s.source_mut().save_deck_draft("test", "# only one").unwrap();
        s.reload_source().unwrap();
        assert_eq!(s.state().slides.len(), 1);
        assert_eq!(s.state().current_index, 0);
    }

    #[test]
    fn test_reload_keeps_unsaved_edits() {
        let mut s = session("#deck/test/editor");
        s.edit_markdown("# mine".to_string(), Instant::now());
        s.source_mut().save_deck_draft("test", "# theirs").unwrap();
        s.reload_source().unwrap();
        assert_eq!(s.state().raw_markdown, "# mine");
    }

    #[test]
    fn test_drop_file() {
        let tmp = tempfile::tempdir().unwrap();
        let md = tmp.path().join("dropped.md");
        fs::write(&md, "# Dropped\n---\n# Two").unwrap();
        let txt = tmp.path().join("notes.txt");
        fs::write(&txt, "text").unwrap();

        let mut s = session("#deck/test");
        assert!(!s.drop_file(&txt).unwrap());
        assert!(s.drop_file(&md).unwrap());
        assert_eq!(s.state().slides.len(), 2);
        assert_eq!(s.source().load_deck("test").as_deref(), Some("# Dropped\n---\n# Two"));
    }

    #[test]
    fn test_drop_file_too_large() {
        let tmp = tempfile::tempdir().unwrap();
        let big = tmp.path().join("big.md");
        let file = fs::File::create(&big).unwrap();
        file.set_len(MAX_DROP_FILE_SIZE + 1).unwrap();

        let mut s = session("#deck/test");
        assert!(matches!(s.drop_file(&big), Err(Error::FileTooLarge { .. })));
        assert_eq!(s.state().slides.len(), 4);
    }
}
