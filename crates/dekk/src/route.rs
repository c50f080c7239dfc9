//! Hash-fragment routing.
//!
//! Fragment grammar (leading `#` optional, `#/` accepted):
//!
//! ```text
//! ""                       picker
//! deck/<id>                presentation, slide 0
//! deck/<id>/<n>            presentation, slide n (non-numeric n -> 0)
//! deck/<id>/editor         editor
//! deck/<id>/overview       overview
//! ```
//!
//! Anything else, or an id longer than [`MAX_DECK_ID_LENGTH`], is the picker.

use std::fmt;

use serde::Serialize;

pub const MAX_DECK_ID_LENGTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "view", rename_all = "camelCase")]
pub enum Route {
    Picker,
    #[serde(rename_all = "camelCase")]
    Presentation { deck_id: String, slide_index: usize },
    #[serde(rename_all = "camelCase")]
    Editor { deck_id: String },
    #[serde(rename_all = "camelCase")]
    Overview { deck_id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Picker,
    Presentation,
    Editor,
    Overview,
}

impl Route {
    pub fn presentation(deck_id: impl Into<String>, slide_index: usize) -> Self {
        Route::Presentation {
            deck_id: deck_id.into(),
            slide_index,
        }
    }

    pub fn editor(deck_id: impl Into<String>) -> Self {
        Route::Editor {
            deck_id: deck_id.into(),
        }
    }

    pub fn overview(deck_id: impl Into<String>) -> Self {
        Route::Overview {
            deck_id: deck_id.into(),
        }
    }

    pub fn deck_id(&self) -> Option<&str> {
        match self {
            Route::Picker => None,
            Route::Presentation { deck_id, .. }
            | Route::Editor { deck_id }
            | Route::Overview { deck_id } => Some(deck_id),
        }
    }

    pub fn view(&self) -> View {
        match self {
            Route::Picker => View::Picker,
            Route::Presentation { .. } => View::Presentation,
            Route::Editor { .. } => View::Editor,
            Route::Overview { .. } => View::Overview,
        }
    }

    pub fn slide_index(&self) -> Option<usize> {
        match self {
            Route::Presentation { slide_index, .. } => Some(*slide_index),
            _ => None,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hash = route_to_hash(self);
        if hash.is_empty() {
            write!(f, "#")
        } else {
            write!(f, "#{hash}")
        }
    }
}

/// Parse a location fragment. Never fails: unknown shapes become the picker.
pub fn hash_to_route(hash: &str) -> Route {
    let raw = match hash.strip_prefix('#') {
        Some(rest) => rest.strip_prefix('/').unwrap_or(rest),
        None => hash,
    };
    let Some(rest) = raw.strip_prefix("deck/") else {
        return Route::Picker;
    };

    let mut parts = rest.split('/');
    let deck_id = parts.next().unwrap_or_default();
    if deck_id.is_empty() || deck_id.chars().count() > MAX_DECK_ID_LENGTH {
        return Route::Picker;
    }

    match parts.next() {
        Some("editor") => Route::editor(deck_id),
        Some("overview") => Route::overview(deck_id),
        Some(n) => Route::presentation(deck_id, n.parse().unwrap_or(0)),
        None => Route::presentation(deck_id, 0),
    }
}

/// Render a route as a fragment without the leading `#`. The picker is `""`.
pub fn route_to_hash(route: &Route) -> String {
    match route {
        Route::Picker => String::new(),
        Route::Presentation {
            deck_id,
            slide_index,
        } => format!("deck/{deck_id}/{slide_index}"),
        Route::Editor { deck_id } => format!("deck/{deck_id}/editor"),
        Route::Overview { deck_id } => format!("deck/{deck_id}/overview"),
    }
}

/// The fragment surface of a browser-like location.
///
/// Like a browser, an implementation queues one change notification for every
/// write that actually changes the fragment, whoever made it.
pub trait Location {
    /// Current fragment, including its `#` when non-empty.
    fn hash(&self) -> String;
    fn set_hash(&mut self, hash: &str);
    /// Drain queued change notifications, returning how many there were.
    fn take_changes(&mut self) -> usize;
}

/// In-memory location with back/forward history.
#[derive(Debug, Clone)]
pub struct MemoryLocation {
    history: Vec<String>,
    cursor: usize,
    pending: usize,
}

impl Default for MemoryLocation {
    fn default() -> Self {
        Self::new("")
    }
}

fn normalize_hash(hash: &str) -> String {
    let bare = hash.strip_prefix('#').unwrap_or(hash);
    if bare.is_empty() {
        String::new()
    } else {
        format!("#{bare}")
    }
}

impl MemoryLocation {
    pub fn new(initial: &str) -> Self {
        Self {
            history: vec![normalize_hash(initial)],
            cursor: 0,
            pending: 0,
        }
    }

    pub fn can_go_back(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.cursor + 1 < self.history.len()
    }

    pub fn back(&mut self) -> bool {
        if !self.can_go_back() {
            return false;
        }
        self.cursor -= 1;
        self.pending += 1;
        true
    }

    pub fn forward(&mut self) -> bool {
        if !self.can_go_forward() {
            return false;
        }
        self.cursor += 1;
        self.pending += 1;
        true
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }
}

impl Location for MemoryLocation {
    fn hash(&self) -> String {
        self.history[self.cursor].clone()
    }

    fn set_hash(&mut self, hash: &str) {
        let hash = normalize_hash(hash);
        if hash == self.history[self.cursor] {
            return;
        }
        self.history.truncate(self.cursor + 1);
        self.history.push(hash);
        self.cursor += 1;
        self.pending += 1;
    }

    fn take_changes(&mut self) -> usize {
        std::mem::take(&mut self.pending)
    }
}

/// Keeps a [`Route`] in step with a [`Location`].
///
/// [`Router::set_route`] updates the in-memory route immediately and writes the
/// fragment. The location then reports a change for that write; an internal
/// push flag makes [`Router::tick`] skip it so it is not handled as an external
/// navigation. The flag is cleared at the end of every tick.
#[derive(Debug)]
pub struct Router<L: Location> {
    location: L,
    route: Route,
    internal_push: bool,
}

impl<L: Location> Router<L> {
    pub fn new(location: L) -> Self {
        let route = hash_to_route(&location.hash());
        log::debug!("initial route {route}");
        Self {
            location,
            route,
            internal_push: false,
        }
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn location(&self) -> &L {
        &self.location
    }

    /// Mutable access for external navigation (address bar, back/forward).
    pub fn location_mut(&mut self) -> &mut L {
        &mut self.location
    }

    pub fn set_route(&mut self, route: Route) {
        self.internal_push = true;
        let hash = route_to_hash(&route);
        if hash.is_empty() {
            self.location.set_hash("");
        } else {
            self.location.set_hash(&format!("#{hash}"));
        }
        if route != self.route {
            log::debug!("route {} -> {}", self.route, route);
        }
        self.route = route;
    }

    /// Handle one location change notification.
    ///
    /// Returns the new route when an external navigation changed it.
    pub fn handle_hash_change(&mut self) -> Option<Route> {
        if self.internal_push {
            log::trace!("ignoring self-triggered hash change");
            return None;
        }
        let route = hash_to_route(&self.location.hash());
        if route == self.route {
            return None;
        }
        log::debug!("external navigation {} -> {}", self.route, route);
        self.route = route.clone();
        Some(route)
    }

    /// End of a scheduling tick: process queued notifications, then clear the
    /// internal push flag.
    pub fn tick(&mut self) -> Option<Route> {
        let mut changed = None;
        for _ in 0..self.location.take_changes() {
            if let Some(route) = self.handle_hash_change() {
                changed = Some(route);
            }
        }
        self.internal_push = false;
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_picker_fragments() {
        for hash in ["", "#", "#/", "#garbage", "deck", "#deck/", "#/deck//3", "#foo/deck/x"] {
            assert_eq!(hash_to_route(hash), Route::Picker, "hash {hash:?}");
        }
    }

    #[test]
    fn test_presentation_fragments() {
        assert_eq!(hash_to_route("#deck/my-talk"), Route::presentation("my-talk", 0));
        assert_eq!(hash_to_route("#deck/my-talk/3"), Route::presentation("my-talk", 3));
        assert_eq!(hash_to_route("#/deck/my-talk/3"), Route::presentation("my-talk", 3));
        assert_eq!(hash_to_route("deck/my-talk/3"), Route::presentation("my-talk", 3));
    }

    #[test]
    fn test_non_numeric_index_is_zero() {
        for n in ["abc", "-2", "", "1.5", "99999999999999999999999"] {
            let hash = format!("#deck/t/{n}");
            assert_eq!(hash_to_route(&hash), Route::presentation("t", 0), "hash {hash:?}");
        }
    }

    #[test]
    fn test_view_fragments() {
        assert_eq!(hash_to_route("#deck/my-talk/editor"), Route::editor("my-talk"));
        assert_eq!(hash_to_route("#deck/my-talk/overview"), Route::overview("my-talk"));
    }

    #[test]
    fn test_long_deck_id() {
        let ok = "a".repeat(MAX_DECK_ID_LENGTH);
        assert_eq!(hash_to_route(&format!("#deck/{ok}")), Route::presentation(ok, 0));
        let long = "a".repeat(MAX_DECK_ID_LENGTH + 1);
        assert_eq!(hash_to_route(&format!("#deck/{long}")), Route::Picker);
    }

    #[test]
    fn test_route_to_hash() {
        assert_eq!(route_to_hash(&Route::Picker), "");
        assert_eq!(route_to_hash(&Route::presentation("foo", 2)), "deck/foo/2");
        assert_eq!(route_to_hash(&Route::editor("foo")), "deck/foo/editor");
        assert_eq!(route_to_hash(&Route::overview("foo")), "deck/foo/overview");
    }

    #[test]
    fn test_round_trip() {
        let routes = [
            Route::Picker,
            Route::presentation("test", 0),
            Route::presentation("test", 5),
            Route::presentation("editor", 1),
            Route::editor("test"),
            Route::overview("test"),
            Route::overview("ünïcödé"),
        ];
        for route in routes {
            let hash = route_to_hash(&route);
            let fragment = if hash.is_empty() { String::new() } else { format!("#{hash}") };
            assert_eq!(hash_to_route(&fragment), route);
        }
    }

    #[test]
    fn test_parsed_routes_round_trip() {
        for hash in ["#deck/a", "#deck/a/7/extra", "#/deck/b/editor", "#deck/c/x", "#nope"] {
            let route = hash_to_route(hash);
            assert_eq!(hash_to_route(&route.to_string()), route);
        }
    }

    #[test]
    fn test_router_initial_route() {
        let router = Router::new(MemoryLocation::new("#deck/test/2"));
        assert_eq!(router.route(), &Route::presentation("test", 2));
    }

    #[test]
    fn test_set_route_writes_hash_synchronously() {
        let mut router = Router::new(MemoryLocation::default());
        router.set_route(Route::editor("foo"));
        assert_eq!(router.location().hash(), "#deck/foo/editor");
        assert_eq!(router.route(), &Route::editor("foo"));
        router.set_route(Route::Picker);
        assert_eq!(router.location().hash(), "");
    }

    #[test]
    fn test_self_triggered_change_is_not_reprocessed() {
        let mut router = Router::new(MemoryLocation::default());
        router.set_route(Route::presentation("a", 1));
        router.set_route(Route::presentation("a", 2));
        assert_eq!(router.tick(), None);
        assert_eq!(router.route(), &Route::presentation("a", 2));
    }

    #[test]
    fn test_external_change_after_tick() {
        let mut router = Router::new(MemoryLocation::default());
        router.set_route(Route::presentation("a", 1));
        router.tick();
        router.location_mut().set_hash("#deck/bar/overview");
        assert_eq!(router.tick(), Some(Route::overview("bar")));
        assert_eq!(router.route(), &Route::overview("bar"));
    }

    #[test]
    fn test_guard_cleared_within_one_tick() {
        let mut router = Router::new(MemoryLocation::default());
        router.set_route(Route::editor("a"));
        router.tick();
        router.location_mut().back();
        assert_eq!(router.tick(), Some(Route::Picker));
        router.location_mut().forward();
        assert_eq!(router.tick(), Some(Route::editor("a")));
    }

    #[test]
    fn test_memory_location_history() {
        let mut location = MemoryLocation::new("#deck/a/0");
        location.set_hash("deck/a/1");
        location.set_hash("#deck/a/1");
        assert_eq!(location.history_len(), 2);
        assert_eq!(location.take_changes(), 1);
        assert!(location.back());
        assert_eq!(location.hash(), "#deck/a/0");
        location.set_hash("#deck/b/0");
        assert!(!location.can_go_forward());
        assert_eq!(location.take_changes(), 2);
    }

    #[test]
    fn test_route_serializes_tagged() {
        let json = serde_json::to_value(Route::presentation("x", 3)).unwrap();
        assert_eq!(json["view"], "presentation");
        assert_eq!(json["deckId"], "x");
        assert_eq!(json["slideIndex"], 3);
        let json = serde_json::to_value(Route::Picker).unwrap();
        assert_eq!(json["view"], "picker");
    }
}
