use crate::route::{Location, Route, Router};

/// Makes the route follow the store's slide position.
///
/// Slide motion only ever changes the store; after each render this rewrites
/// the presentation route's index to match. Other views carry no index and
/// are left alone. The very first render is skipped.
#[derive(Debug)]
pub struct RouteSync {
    first_render: bool,
}

impl Default for RouteSync {
    fn default() -> Self {
        Self { first_render: true }
    }
}

impl RouteSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether the route was rewritten.
    pub fn sync<L: Location>(&mut self, current_index: usize, router: &mut Router<L>) -> bool {
        if self.first_render {
            self.first_render = false;
            return false;
        }
        let Route::Presentation {
            deck_id,
            slide_index,
        } = router.route()
        else {
            return false;
        };
        if *slide_index == current_index {
            return false;
        }
        let route = Route::presentation(deck_id.clone(), current_index);
        router.set_route(route);
        true
    }
}
