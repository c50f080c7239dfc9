use crate::keyboard::KeyCommand;
use crate::route::{Location, Route, Router};
use crate::store::{SlideAction, SlideStore};

/// What a key command did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavEffect {
    Dispatched(SlideAction),
    Routed(Route),
    Fullscreen(bool),
    None,
}

/// Apply a key command.
///
/// Slide motion goes to the store only; the route catches up through route
/// sync, so no index is ever computed here from a possibly stale route. View
/// changes go straight to the router because the view is not store state.
pub fn apply<L: Location>(
    command: KeyCommand,
    router: &mut Router<L>,
    store: &mut SlideStore,
    fullscreen: &mut bool,
) -> NavEffect {
    let action = match command {
        KeyCommand::NextSlide => SlideAction::NextSlide,
        KeyCommand::PrevSlide => SlideAction::PrevSlide,
        KeyCommand::FirstSlide => SlideAction::GoToSlide(0),
        KeyCommand::LastSlide => SlideAction::GoToSlide(store.state().last_index()),
        KeyCommand::GoToSlide(index) => SlideAction::GoToSlide(index),
        KeyCommand::ToggleFullscreen => {
            *fullscreen = !*fullscreen;
            return NavEffect::Fullscreen(*fullscreen);
        }
        KeyCommand::ToggleOverview => {
            let route = match router.route() {
                Route::Picker => return NavEffect::None,
                Route::Overview { deck_id } => Route::presentation(deck_id.clone(), 0),
                Route::Presentation { deck_id, .. } | Route::Editor { deck_id } => {
                    Route::overview(deck_id.clone())
                }
            };
            return route_to(router, route);
        }
        KeyCommand::ToggleEditor => {
            let route = match router.route() {
                Route::Picker => return NavEffect::None,
                Route::Editor { deck_id } => Route::presentation(deck_id.clone(), 0),
                Route::Presentation { deck_id, .. } | Route::Overview { deck_id } => {
                    Route::editor(deck_id.clone())
                }
            };
            return route_to(router, route);
        }
        KeyCommand::Escape => {
            if *fullscreen {
                *fullscreen = false;
                return NavEffect::Fullscreen(false);
            }
            let route = match router.route() {
                Route::Editor { deck_id } | Route::Overview { deck_id } => {
                    Route::presentation(deck_id.clone(), 0)
                }
                Route::Picker | Route::Presentation { .. } => return NavEffect::None,
            };
            return route_to(router, route);
        }
    };

    store.dispatch(action.clone());
    NavEffect::Dispatched(action)
}

// The presentation index written here is a placeholder; route sync replaces
// it with the store's index after the next render.
fn route_to<L: Location>(router: &mut Router<L>, route: Route) -> NavEffect {
    router.set_route(route.clone());
    NavEffect::Routed(route)
}
