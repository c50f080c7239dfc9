use std::collections::BTreeMap;
use std::fs;
use std::time::Instant;

use dekk::keyboard::{Key, KeyEvent, KeyTarget};
use dekk::{
    DeckSource, FsDeckSource, Location, MemoryDeckSource, MemoryLocation, Route, Session, SlideAction,
    SlideStore, build_registry, hash_to_route, parse, route_to_hash,
};

const DEFAULT_DECK: &str = include_str!("../../../presentations/default/slides.md");
const ROUTE_SYNC_DECK: &str = include_str!("../../../presentations/route-sync/slides.md");

fn sample_files() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("/presentations/default/slides.md".to_string(), DEFAULT_DECK.to_string()),
        ("/presentations/route-sync/slides.md".to_string(), ROUTE_SYNC_DECK.to_string()),
    ])
}

fn open(hash: &str) -> Session<MemoryLocation> {
    let mut session = Session::new(
        MemoryLocation::new(hash),
        Box::new(MemoryDeckSource::new(&sample_files())),
    );
    session.after_render();
    session
}

#[test]
fn end_to_end_parse() {
    let result = parse("---\ntitle: My Talk\n---\n\n# One\n\n---\n\n# Two");
    assert_eq!(result.deck_metadata.title(), Some("My Talk"));
    assert_eq!(result.slides.len(), 2);
    assert!(result.slides[0].raw_content.contains("# One"));
    assert_eq!(parse(DEFAULT_DECK), parse(DEFAULT_DECK));
}

#[test]
fn separators_are_interchangeable() {
    for separator in ["---", "***", "___"] {
        let result = parse(&format!("# A\n\n{separator}\n\n# B"));
        assert_eq!(result.slides.len(), 2, "separator {separator}");
        assert!(result.slides[0].raw_content.contains("# A"));
        assert!(result.slides[1].raw_content.contains("# B"));
    }
    assert_eq!(parse("# A\n---\n# B\n***\n# C\n___\n# D").slides.len(), 4);
}

#[test]
fn leading_break_is_not_frontmatter() {
    let result = parse("---\n\n# Slide 1\n\n---\n\n# Slide 2");
    assert!(result.deck_metadata.is_empty());
    assert_eq!(result.slides.len(), 2);
}

#[test]
fn table_rows_do_not_split() {
    let result = parse("| A | B |\n|---|---|\n| 1 | 2 |");
    assert_eq!(result.slides.len(), 1);
}

#[test]
fn polluting_keys_are_dropped() {
    let result = parse(
        "---\n__proto__: x\ntitle: Safe\nconstructor: y\n---\n<!-- prototype: z -->\n<!-- bg: #000 -->\n# Slide",
    );
    assert_eq!(result.deck_metadata.len(), 1);
    assert_eq!(result.deck_metadata.title(), Some("Safe"));
    let slide = &result.slides[0];
    assert!(!slide.metadata.contains_key("prototype"));
    assert_eq!(slide.metadata.bg(), Some("#000"));
}

#[test]
fn registry_matches_parser() {
    let entries = build_registry(sample_files().iter().map(|(p, m)| (p.as_str(), m.as_str())));
    let ids: Vec<_> = entries.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, ["default", "route-sync"]);
    for entry in &entries {
        assert_eq!(entry.slide_count, parse(&entry.raw_markdown).slides.len());
    }
    assert_eq!(entries[1].title, "Keeping Routes in Sync");
}

#[test]
fn routes_round_trip() {
    let routes = [
        Route::Picker,
        Route::presentation("default", 0),
        Route::presentation("route-sync", 12),
        Route::editor("default"),
        Route::overview("x".repeat(64)),
    ];
    for route in routes {
        assert_eq!(hash_to_route(&format!("#{}", route_to_hash(&route))), route);
    }
}

#[test]
fn clamping_holds_under_any_sequence() {
    let mut store = SlideStore::new();
    let actions = [
        SlideAction::PrevSlide,
        SlideAction::GoToSlide(99),
        SlideAction::LoadDeck {
            deck_id: "default".to_string(),
            markdown: DEFAULT_DECK.to_string(),
        },
        SlideAction::GoToSlide(99),
        SlideAction::NextSlide,
        SlideAction::SetMarkdown("# only".to_string()),
        SlideAction::NextSlide,
        SlideAction::SetMarkdown(String::new()),
        SlideAction::PrevSlide,
        SlideAction::UnloadDeck,
    ];
    for action in actions {
        store.dispatch(action);
        let state = store.state();
        assert!(state.current_index < state.slide_count().max(1));
    }
}

#[test]
fn view_switches_keep_slide_position() {
    let mut session = open("#deck/default");
    for _ in 0..2 {
        session.handle_key(&KeyEvent::new(Key::ArrowRight));
    }
    session.after_render();
    assert_eq!(session.route(), &Route::presentation("default", 2));
    let revision = session.store().revision();

    session.handle_key(&KeyEvent::char('e'));
    session.after_render();
    assert_eq!(session.route(), &Route::editor("default"));

    session.handle_key(&KeyEvent::char('e'));
    session.after_render();
    assert_eq!(session.route(), &Route::presentation("default", 2));
    assert_eq!(session.state().current_index, 2);
    assert_eq!(session.store().revision(), revision);
}

#[test]
fn typing_in_editor_does_not_navigate() {
    let mut session = open("#deck/default/editor");
    let event = KeyEvent::new(Key::ArrowRight).in_target(KeyTarget::RichEditor);
    session.handle_key(&event);
    assert_eq!(session.state().current_index, 0);
}

#[test]
fn rapid_keys_never_desync() {
    let mut session = open("#deck/route-sync");
    for _ in 0..10 {
        session.handle_key(&KeyEvent::new(Key::ArrowRight));
    }
    session.handle_key(&KeyEvent::new(Key::ArrowLeft));
    session.after_render();
    let last = session.state().last_index();
    assert_eq!(session.state().current_index, last - 1);
    assert_eq!(session.route(), &Route::presentation("route-sync", last - 1));
    assert_eq!(
        session.router().location().hash(),
        format!("#deck/route-sync/{}", last - 1)
    );
}

#[test]
fn switching_decks_starts_at_first_slide() {
    let mut session = open("#deck/default/3");
    assert_eq!(session.state().current_index, 3);
    session.go_to_picker();
    session.after_render();
    assert!(session.state().current_deck.is_none());

    session.select_deck("route-sync");
    session.after_render();
    assert_eq!(session.state().current_deck.as_deref(), Some("route-sync"));
    assert_eq!(session.state().current_index, 0);
}

#[test]
fn filesystem_drafts_win_over_canonical_decks() {
    let tmp = tempfile::tempdir().unwrap();
    let decks = tmp.path().join("presentations");
    let drafts = tmp.path().join("drafts");
    fs::create_dir_all(decks.join("intro")).unwrap();
    fs::write(decks.join("intro/slides.md"), "---\ntitle: Intro\n---\n# A\n---\n# B").unwrap();
    fs::create_dir_all(&drafts).unwrap();
    fs::write(drafts.join("legacy.md"), "# Old single deck").unwrap();

    let source = FsDeckSource::open(&decks, Some(drafts.clone())).unwrap();
    assert_eq!(source.registry().get_deck("intro").unwrap().slide_count, 2);

    let mut session = Session::new(MemoryLocation::new("#deck/intro/editor"), Box::new(source));
    session.after_render();
    assert!(drafts.join("default.md").is_file());
    assert_eq!(session.state().title(), Some("Intro"));

    session.edit_markdown("---\ntitle: Intro\n---\n# Edited".to_string(), Instant::now());
    assert!(session.flush_all());
    assert_eq!(
        fs::read_to_string(drafts.join("intro.md")).unwrap(),
        "---\ntitle: Intro\n---\n# Edited"
    );
    assert_eq!(
        session.source().load_deck("intro").as_deref(),
        Some("---\ntitle: Intro\n---\n# Edited")
    );
    assert!(fs::read_to_string(decks.join("intro/slides.md")).unwrap().contains("# B"));
}

#[test]
fn missing_deck_redirects_to_picker() {
    let mut session = open("#deck/nowhere/2");
    assert_eq!(session.route(), &Route::Picker);
    session.after_render();
    assert_eq!(session.router().location().hash(), "");
    assert!(session.state().current_deck.is_none());
}
