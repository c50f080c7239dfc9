use colored::Colorize;
use dekk::route::View;
use dekk::{Route, hash_to_route, route_to_hash};

pub fn run(fragment: &str) {
    let route = hash_to_route(fragment);
    let view = match route.view() {
        View::Picker => "picker",
        View::Presentation => "presentation",
        View::Editor => "editor",
        View::Overview => "overview",
    };

    println!("{:<10} {}", "view".dimmed(), view.bold());
    if let Some(deck_id) = route.deck_id() {
        println!("{:<10} {deck_id}", "deck".dimmed());
    }
    if let Route::Presentation { slide_index, .. } = &route {
        println!(
            "{:<10} {slide_index} (slide {})",
            "index".dimmed(),
            slide_index.saturating_add(1)
        );
    }
    let canonical = route_to_hash(&route);
    println!(
        "{:<10} {}",
        "fragment".dimmed(),
        if canonical.is_empty() { "(empty)".to_string() } else { format!("#{canonical}") }.cyan()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_largest_slide_index() {
        let fragment = format!("#deck/x/{}", usize::MAX);
        assert_eq!(hash_to_route(&fragment), Route::presentation("x", usize::MAX));
        run(&fragment);
    }

    #[test]
    fn test_picker_and_views() {
        run("");
        run("#deck/x/editor");
        run("#deck/x/overview");
    }
}
