//! Raw key events and the navigation commands they map to.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowRight,
    ArrowLeft,
    Space,
    PageDown,
    PageUp,
    Backspace,
    Home,
    End,
    F11,
    Escape,
    Char(char),
}

/// What the focused element is when the key arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyTarget {
    #[default]
    Document,
    /// A single- or multi-line text input.
    TextInput,
    /// Inside the markdown editor region.
    RichEditor,
}

impl KeyTarget {
    pub fn accepts_text(self) -> bool {
        !matches!(self, KeyTarget::Document)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub ctrl: bool,
    /// Cmd on macOS.
    pub meta: bool,
    pub target: KeyTarget,
}

impl KeyEvent {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            ctrl: false,
            meta: false,
            target: KeyTarget::Document,
        }
    }

    pub fn char(c: char) -> Self {
        Self::new(Key::Char(c))
    }

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn with_meta(mut self) -> Self {
        self.meta = true;
        self
    }

    pub fn in_target(mut self, target: KeyTarget) -> Self {
        self.target = target;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    NextSlide,
    PrevSlide,
    FirstSlide,
    LastSlide,
    ToggleFullscreen,
    ToggleOverview,
    ToggleEditor,
    Escape,
    /// Zero-based slide index.
    GoToSlide(usize),
}

/// Map a key press to a navigation command.
///
/// Keys typed into text inputs or the editor are never navigation.
pub fn interpret(event: &KeyEvent) -> Option<KeyCommand> {
    if event.target.accepts_text() {
        return None;
    }
    if event.ctrl || event.meta {
        return None;
    }

    let command = match event.key {
        Key::ArrowRight | Key::Space | Key::PageDown => KeyCommand::NextSlide,
        Key::ArrowLeft | Key::Backspace | Key::PageUp => KeyCommand::PrevSlide,
        Key::Home => KeyCommand::FirstSlide,
        Key::End => KeyCommand::LastSlide,
        Key::F11 | Key::Char('f') => KeyCommand::ToggleFullscreen,
        Key::Char('o') => KeyCommand::ToggleOverview,
        Key::Char('e') => KeyCommand::ToggleEditor,
        Key::Escape => KeyCommand::Escape,
        Key::Char(c @ '1'..='9') => KeyCommand::GoToSlide(c as usize - '1' as usize),
        Key::Char(_) => return None,
    };
    Some(command)
}

/// Ctrl+S / Cmd+S. Recognised in every target so it works inside the editor.
pub fn is_save_shortcut(event: &KeyEvent) -> bool {
    (event.ctrl || event.meta) && event.key == Key::Char('s')
}
