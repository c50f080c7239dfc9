use anyhow::Context;
use eframe::egui;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use dekk::keyboard::{Key, KeyEvent, KeyTarget};
use dekk::route::View;
use dekk::session::NavEffect;
use dekk::source::{DEFAULT_DECK_ID, validate_deck_id};
use dekk::watch::{self, DeckWatcher};
use dekk::{DeckSource, FsDeckSource, Location, MemoryDeckSource, MemoryLocation, Route, Session};

use crate::config::{Config, StartView};
use crate::theme::Theme;

const TOAST_DURATION: f32 = 2.0;
const TOAST_FADE_START: f32 = 1.5;
const IDLE_REPAINT: Duration = Duration::from_millis(250);

/// Where the viewer opens, from the command line.
#[derive(Debug, Clone, Default)]
pub struct StartOptions {
    pub deck: Option<String>,
    /// 1-indexed.
    pub slide: Option<usize>,
    pub overview: bool,
    pub editor: bool,
}

impl StartOptions {
    /// Flags override the configured start view. Without a deck the picker opens.
    pub fn route(&self, default_deck: Option<&str>, start_view: Option<StartView>) -> Route {
        let Some(deck) = self.deck.as_deref().or(default_deck) else {
            return Route::Picker;
        };
        if self.overview {
            return Route::overview(deck);
        }
        if self.editor {
            return Route::editor(deck);
        }
        if let Some(slide) = self.slide {
            return Route::presentation(deck, slide.saturating_sub(1));
        }
        match start_view {
            Some(StartView::Overview) => Route::overview(deck),
            Some(StartView::Editor) => Route::editor(deck),
            Some(StartView::Slide(index)) => Route::presentation(deck, index),
            Some(StartView::Picker) | None => Route::presentation(deck, 0),
        }
    }
}

struct Toast {
    message: String,
    start: Instant,
}

impl Toast {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            start: Instant::now(),
        }
    }

    fn opacity(&self) -> f32 {
        let elapsed = self.start.elapsed().as_secs_f32();
        if elapsed < TOAST_FADE_START {
            1.0
        } else if elapsed < TOAST_DURATION {
            1.0 - (elapsed - TOAST_FADE_START) / (TOAST_DURATION - TOAST_FADE_START)
        } else {
            0.0
        }
    }

    fn is_expired(&self) -> bool {
        self.start.elapsed().as_secs_f32() >= TOAST_DURATION
    }
}

/// Things the panels asked for, applied once drawing is done.
enum Intent {
    SelectDeck(String),
    SelectSlide(usize),
    Picker,
    Navigate(String),
    Back,
    Forward,
    Edit(String),
}

struct DeckApp {
    session: Session<MemoryLocation>,
    theme: Theme,
    watcher: Option<DeckWatcher>,
    export_dir: PathBuf,
    location_buffer: String,
    location_editing: bool,
    editor_buffer: String,
    editor_revision: Option<u64>,
    fullscreen_requested: Option<bool>,
    window_title: String,
    toast: Option<Toast>,
}

impl DeckApp {
    fn new(
        session: Session<MemoryLocation>,
        theme: Theme,
        watcher: Option<DeckWatcher>,
        export_dir: PathBuf,
    ) -> Self {
        Self {
            session,
            theme,
            watcher,
            export_dir,
            location_buffer: String::new(),
            location_editing: false,
            editor_buffer: String::new(),
            editor_revision: None,
            fullscreen_requested: None,
            window_title: String::new(),
            toast: None,
        }
    }

    fn display_title(&self) -> String {
        match self.session.state().title() {
            Some(title) if self.session.state().current_deck.is_some() => format!("{title} \u{b7} dekk"),
            _ => "dekk".to_string(),
        }
    }

    fn export(&mut self, request: &dekk::exporter::ExportRequest) {
        match dekk::exporter::export_markdown(&self.export_dir, request) {
            Ok(Some(path)) => self.toast = Some(Toast::new(format!("Saved {}", path.display()))),
            Ok(None) => {}
            Err(e) => {
                log::warn!("export failed: {e}");
                self.toast = Some(Toast::new(format!("Save failed: {e}")));
            }
        }
    }

    fn handle_keys(&mut self, ctx: &egui::Context, viewport_cmds: &mut Vec<egui::ViewportCommand>) {
        let target = if !ctx.wants_keyboard_input() {
            KeyTarget::Document
        } else if self.session.route().view() == View::Editor {
            KeyTarget::RichEditor
        } else {
            KeyTarget::TextInput
        };

        let events: Vec<KeyEvent> = ctx.input(|i| {
            i.events
                .iter()
                .filter_map(|event| match event {
                    egui::Event::Key {
                        key,
                        pressed: true,
                        modifiers,
                        ..
                    } => map_key(*key).map(|key| KeyEvent {
                        key,
                        ctrl: modifiers.ctrl,
                        meta: modifiers.mac_cmd,
                        target,
                    }),
                    _ => None,
                })
                .collect()
        });

        for event in events {
            if let Some(request) = self.session.save_request(&event) {
                self.export(&request);
                continue;
            }
            match self.session.handle_key(&event) {
                NavEffect::Fullscreen(on) => {
                    self.fullscreen_requested = Some(on);
                    viewport_cmds.push(egui::ViewportCommand::Fullscreen(on));
                }
                NavEffect::None => {
                    if event.key == Key::Char('d')
                        && event.target == KeyTarget::Document
                        && !event.ctrl
                        && !event.meta
                    {
                        self.theme = self.theme.toggled();
                        ctx.set_visuals(self.theme.visuals());
                        self.toast = Some(Toast::new(format!("Theme: {}", self.theme.name)));
                    }
                }
                NavEffect::Dispatched(_) | NavEffect::Routed(_) => {}
            }
        }
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped: Vec<PathBuf> = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|file| file.path.clone())
                .collect()
        });
        for path in dropped {
            match self.session.drop_file(&path) {
                Ok(true) => {
                    self.toast = Some(Toast::new(format!(
                        "Loaded {}",
                        path.file_name().unwrap_or_default().to_string_lossy()
                    )));
                }
                Ok(false) => self.toast = Some(Toast::new("Only .md files can be dropped")),
                Err(e) => self.toast = Some(Toast::new(e.to_string())),
            }
        }
    }

    fn poll_watcher(&mut self) {
        let changed = self.watcher.as_ref().is_some_and(|w| w.poll());
        if !changed {
            return;
        }
        match self.session.reload_source() {
            Ok(()) => log::info!("presentations changed, registry rebuilt"),
            Err(e) => {
                log::warn!("failed to rescan presentations: {e}");
                self.toast = Some(Toast::new(format!("Rescan failed: {e}")));
            }
        }
    }

    fn sync_fullscreen(&mut self, ctx: &egui::Context) {
        let Some(actual) = ctx.input(|i| i.viewport().fullscreen) else {
            return;
        };
        match self.fullscreen_requested {
            Some(wanted) if wanted == actual => self.fullscreen_requested = None,
            Some(_) => {}
            None if actual != self.session.is_fullscreen() => self.session.set_fullscreen(actual),
            None => {}
        }
    }

    fn sync_buffers(&mut self) {
        if !self.location_editing {
            self.location_buffer = self.session.router().location().hash();
        }
        let revision = self.session.store().revision();
        if self.editor_revision != Some(revision) {
            self.editor_buffer = self.session.state().raw_markdown.clone();
            self.editor_revision = Some(revision);
        }
    }

    fn draw_location_bar(&mut self, ctx: &egui::Context, intents: &mut Vec<Intent>) {
        let location = self.session.router().location();
        let (can_back, can_forward) = (location.can_go_back(), location.can_go_forward());

        egui::TopBottomPanel::top("location_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.add_enabled(can_back, egui::Button::new("\u{2190}")).clicked() {
                    intents.push(Intent::Back);
                }
                if ui.add_enabled(can_forward, egui::Button::new("\u{2192}")).clicked() {
                    intents.push(Intent::Forward);
                }
                if ui.button("Decks").clicked() {
                    intents.push(Intent::Picker);
                }
                let response = ui.add(
                    egui::TextEdit::singleline(&mut self.location_buffer)
                        .font(egui::TextStyle::Monospace)
                        .hint_text("#deck/<id>/<slide>")
                        .desired_width(f32::INFINITY),
                );
                if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    intents.push(Intent::Navigate(self.location_buffer.clone()));
                }
                self.location_editing = response.has_focus();
            });
        });
    }

    fn draw_picker(&self, ui: &mut egui::Ui, intents: &mut Vec<Intent>) {
        let registry = self.session.source().registry();
        ui.add_space(24.0);
        ui.vertical_centered(|ui| {
            ui.label(
                egui::RichText::new("Decks")
                    .size(36.0)
                    .color(self.theme.heading_color)
                    .strong(),
            );
        });
        ui.add_space(16.0);

        if registry.is_empty() {
            ui.vertical_centered(|ui| {
                ui.label(
                    egui::RichText::new("No decks found. Add <deck>/slides.md to the presentations directory.")
                        .color(self.theme.muted),
                );
            });
            return;
        }

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.vertical_centered(|ui| {
                    for entry in registry.entries() {
                        let mut text = format!("{}\n{} \u{b7} {} slides", entry.title, entry.id, entry.slide_count);
                        if let Some(author) = &entry.author {
                            text.push_str(&format!(" \u{b7} {author}"));
                        }
                        let button = egui::Button::new(egui::RichText::new(text).size(18.0));
                        if ui.add_sized([480.0, 64.0], button).clicked() {
                            intents.push(Intent::SelectDeck(entry.id.clone()));
                        }
                        ui.add_space(8.0);
                    }
                });
            });
    }

    fn draw_presentation(&self, ui: &mut egui::Ui) {
        let state = self.session.state();
        let rect = ui.max_rect();
        let Some(slide) = state.current_slide() else {
            ui.centered_and_justified(|ui| {
                ui.label(egui::RichText::new("No slides").color(self.theme.muted));
            });
            return;
        };

        let slide_rect = fit_aspect(rect.shrink(24.0), aspect_ratio(state.deck_metadata.aspect_ratio()));
        let bg = self.theme.slide_background(slide.metadata.bg());
        let text_color = self.theme.text_on(bg);
        ui.painter().rect_filled(slide_rect, 8.0, bg);

        let scale = (slide_rect.height() / 720.0).max(0.5);
        let centered = slide.metadata.layout() == Some("title");
        ui.scope_builder(egui::UiBuilder::new().max_rect(slide_rect.shrink(48.0 * scale)), |ui| {
            if centered {
                ui.add_space(slide_rect.height() * 0.25);
                ui.vertical_centered(|ui| draw_content(ui, &slide.raw_content, &self.theme, text_color, scale));
            } else {
                draw_content(ui, &slide.raw_content, &self.theme, text_color, scale);
            }
        });

        let footer = format!("{} / {}", state.current_index + 1, state.slide_count());
        ui.painter().text(
            slide_rect.right_bottom() - egui::vec2(16.0, 12.0),
            egui::Align2::RIGHT_BOTTOM,
            footer,
            egui::FontId::proportional(14.0 * scale),
            Theme::with_opacity(text_color, 0.6),
        );
    }

    fn draw_overview(&self, ui: &mut egui::Ui, intents: &mut Vec<Intent>) {
        let state = self.session.state();
        let columns = match state.slide_count() {
            0..=4 => 2,
            5..=9 => 3,
            _ => 4,
        };
        let gap = 12.0;
        let cell_width = ((ui.available_width() - gap * (columns as f32 + 1.0)) / columns as f32).max(120.0);
        let cell_height = cell_width * 9.0 / 16.0;

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.add_space(gap);
                for (row, chunk) in state.slides.chunks(columns).enumerate() {
                    ui.horizontal(|ui| {
                        ui.add_space(gap);
                        for (col, slide) in chunk.iter().enumerate() {
                            let index = row * columns + col;
                            let heading = dekk::parser::slide_heading(slide)
                                .unwrap_or_else(|| slide.raw_content.lines().next().unwrap_or_default());
                            let button = egui::Button::new(
                                egui::RichText::new(format!("{}. {heading}", index + 1)).size(16.0),
                            )
                            .fill(self.theme.slide_background(slide.metadata.bg()))
                            .selected(index == state.current_index);
                            if ui.add_sized([cell_width, cell_height], button).clicked() {
                                intents.push(Intent::SelectSlide(index));
                            }
                            ui.add_space(gap);
                        }
                    });
                    ui.add_space(gap);
                }
            });
    }

    fn draw_editor(&mut self, ui: &mut egui::Ui, intents: &mut Vec<Intent>) {
        let state = self.session.state();
        let status = if self.session.has_pending_draft() {
            "editing"
        } else {
            "saved"
        };
        ui.horizontal(|ui| {
            ui.label(
                egui::RichText::new(format!("{} slides \u{b7} {status}", state.slide_count()))
                    .color(self.theme.muted),
            );
        });
        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                let response = ui.add(
                    egui::TextEdit::multiline(&mut self.editor_buffer)
                        .code_editor()
                        .desired_width(f32::INFINITY)
                        .desired_rows(30),
                );
                if response.changed() {
                    intents.push(Intent::Edit(self.editor_buffer.clone()));
                }
            });
    }

    fn draw_toast(&self, ctx: &egui::Context) {
        let Some(toast) = &self.toast else {
            return;
        };
        let opacity = toast.opacity();
        if opacity <= 0.0 {
            return;
        }
        let painter = ctx.layer_painter(egui::LayerId::new(egui::Order::Foreground, egui::Id::new("toast")));
        let screen = ctx.screen_rect();
        let galley = painter.layout_no_wrap(
            toast.message.clone(),
            egui::FontId::proportional(18.0),
            Theme::with_opacity(self.theme.foreground, opacity * 0.9),
        );
        let padding = 14.0;
        let toast_rect = egui::Rect::from_center_size(
            egui::pos2(screen.center().x, screen.bottom() - 64.0),
            galley.rect.size() + egui::vec2(padding * 2.0, padding * 2.0),
        );
        painter.rect_filled(
            toast_rect,
            8.0,
            Theme::with_opacity(self.theme.panel_background, opacity * 0.9),
        );
        painter.galley(
            toast_rect.min + egui::vec2(padding, padding),
            galley,
            self.theme.foreground,
        );
    }

    fn apply_intents(&mut self, intents: Vec<Intent>) {
        for intent in intents {
            match intent {
                Intent::SelectDeck(id) => self.session.select_deck(&id),
                Intent::SelectSlide(index) => self.session.select_slide(index),
                Intent::Picker => self.session.go_to_picker(),
                Intent::Navigate(hash) => self.session.navigate_external(&hash),
                Intent::Back => {
                    self.session.back();
                }
                Intent::Forward => {
                    self.session.forward();
                }
                Intent::Edit(markdown) => {
                    self.session.edit_markdown(markdown, Instant::now());
                    self.editor_revision = Some(self.session.store().revision());
                }
            }
        }
    }
}

impl eframe::App for DeckApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Viewport commands are sent after input handling, never inside ctx.input()
        let mut viewport_cmds: Vec<egui::ViewportCommand> = Vec::new();

        self.sync_fullscreen(ctx);
        self.handle_keys(ctx, &mut viewport_cmds);
        self.handle_dropped_files(ctx);
        self.poll_watcher();
        self.sync_buffers();

        if self.toast.as_ref().is_some_and(|t| t.is_expired()) {
            self.toast = None;
        }

        let mut intents = Vec::new();
        self.draw_location_bar(ctx, &mut intents);

        let bg = self.theme.background;
        let view = self.session.route().view();
        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(bg).inner_margin(0.0))
            .show(ctx, |ui| match view {
                View::Picker => self.draw_picker(ui, &mut intents),
                View::Presentation => self.draw_presentation(ui),
                View::Overview => self.draw_overview(ui, &mut intents),
                View::Editor => {
                    egui::Frame::new()
                        .inner_margin(16.0)
                        .show(ui, |ui| self.draw_editor(ui, &mut intents));
                }
            });
        self.draw_toast(ctx);

        self.apply_intents(intents);
        self.session.flush_drafts(Instant::now());
        if ctx.input(|i| i.viewport().close_requested()) {
            self.session.flush_all();
        }

        if self.session.after_render() {
            ctx.request_repaint();
        }

        let title = self.display_title();
        if title != self.window_title {
            viewport_cmds.push(egui::ViewportCommand::Title(title.clone()));
            self.window_title = title;
        }
        for cmd in viewport_cmds {
            ctx.send_viewport_cmd(cmd);
        }

        if self.toast.is_some() {
            ctx.request_repaint();
        } else if self.session.has_pending_draft() || self.watcher.is_some() {
            ctx.request_repaint_after(IDLE_REPAINT);
        }
    }
}

/// Map an egui key to the keys navigation understands.
fn map_key(key: egui::Key) -> Option<Key> {
    use egui::Key as K;
    let key = match key {
        K::ArrowRight => Key::ArrowRight,
        K::ArrowLeft => Key::ArrowLeft,
        K::Space => Key::Space,
        K::PageDown => Key::PageDown,
        K::PageUp => Key::PageUp,
        K::Backspace => Key::Backspace,
        K::Home => Key::Home,
        K::End => Key::End,
        K::F11 => Key::F11,
        K::Escape => Key::Escape,
        K::F => Key::Char('f'),
        K::O => Key::Char('o'),
        K::E => Key::Char('e'),
        K::S => Key::Char('s'),
        K::D => Key::Char('d'),
        K::Num1 => Key::Char('1'),
        K::Num2 => Key::Char('2'),
        K::Num3 => Key::Char('3'),
        K::Num4 => Key::Char('4'),
        K::Num5 => Key::Char('5'),
        K::Num6 => Key::Char('6'),
        K::Num7 => Key::Char('7'),
        K::Num8 => Key::Char('8'),
        K::Num9 => Key::Char('9'),
        _ => return None,
    };
    Some(key)
}

/// `"16:9"` style ratio, falling back to 16:9.
fn aspect_ratio(value: Option<&str>) -> f32 {
    value
        .and_then(|v| v.split_once(':'))
        .and_then(|(w, h)| Some((w.trim().parse::<f32>().ok()?, h.trim().parse::<f32>().ok()?)))
        .filter(|&(w, h)| w > 0.0 && h > 0.0)
        .map(|(w, h)| w / h)
        .unwrap_or(16.0 / 9.0)
}

fn fit_aspect(rect: egui::Rect, ratio: f32) -> egui::Rect {
    let width = rect.width().min(rect.height() * ratio);
    let height = width / ratio;
    egui::Rect::from_center_size(rect.center(), egui::vec2(width, height))
}

fn draw_content(ui: &mut egui::Ui, content: &str, theme: &Theme, color: egui::Color32, scale: f32) {
    let mut in_code = false;
    for line in content.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") {
            in_code = !in_code;
            continue;
        }
        if in_code {
            ui.label(
                egui::RichText::new(line)
                    .monospace()
                    .size(theme.body_size * 0.75 * scale)
                    .color(color),
            );
            continue;
        }
        if trimmed.is_empty() {
            ui.add_space(theme.body_size * 0.5 * scale);
            continue;
        }

        let level = trimmed.chars().take_while(|&c| c == '#').count();
        let text = if (1..=6).contains(&level) && trimmed[level..].starts_with(' ') {
            let size = theme.heading_size * scale / (1.0 + 0.25 * (level - 1) as f32);
            egui::RichText::new(trimmed[level..].trim()).size(size).strong()
        } else if let Some(item) = trimmed.strip_prefix("- ").or_else(|| trimmed.strip_prefix("* ")) {
            egui::RichText::new(format!("\u{2022} {item}")).size(theme.body_size * scale)
        } else {
            egui::RichText::new(trimmed).size(theme.body_size * scale)
        };
        ui.label(text.color(color));
    }
}

/// Deck id for a single presented file: its stem when usable.
fn deck_id_for_file(path: &Path) -> String {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| validate_deck_id(stem).is_ok() && !stem.contains('#'))
        .unwrap_or(DEFAULT_DECK_ID)
        .to_string()
}

pub fn run(
    path: PathBuf,
    drafts_dir: Option<PathBuf>,
    start: StartOptions,
    windowed: bool,
    config: &Config,
) -> anyhow::Result<()> {
    let (source, default_deck, export_dir, watcher) = if path.is_file() {
        let markdown = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let id = deck_id_for_file(&path);
        let export_dir = path.parent().unwrap_or(Path::new(".")).to_path_buf();
        let source: Box<dyn DeckSource> = Box::new(MemoryDeckSource::single(&id, &markdown));
        (source, Some(id), export_dir, None)
    } else {
        let source = FsDeckSource::open(&path, drafts_dir)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let watcher = match DeckWatcher::new(&path, watch::DEFAULT_DEBOUNCE) {
            Ok(watcher) => Some(watcher),
            Err(e) => {
                log::warn!("not watching {}: {e}", path.display());
                None
            }
        };
        let source: Box<dyn DeckSource> = Box::new(source);
        (source, None, PathBuf::from("."), watcher)
    };

    let route = start.route(default_deck.as_deref(), config.start_view());
    log::debug!("starting at {route}");

    let mut session = Session::new(MemoryLocation::new(&route.to_string()), source)
        .with_autosave_delay(config.autosave_delay());
    session.set_fullscreen(!windowed);

    let title = "dekk".to_string();
    let viewport = if windowed {
        egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_title(&title)
    } else {
        egui::ViewportBuilder::default()
            .with_fullscreen(true)
            .with_title(&title)
    };
    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    let theme = Theme::from_name(config.theme());
    eframe::run_native(
        &title,
        options,
        Box::new(move |cc| {
            cc.egui_ctx.set_visuals(theme.visuals());
            let app = DeckApp::new(session, theme, watcher, export_dir);
            Ok(Box::new(app))
        }),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}
