use eframe::egui::{self, Color32};

#[derive(Debug, Clone)]
pub struct Theme {
    pub name: String,
    pub background: Color32,
    pub foreground: Color32,
    pub heading_color: Color32,
    pub accent: Color32,
    pub panel_background: Color32,
    pub muted: Color32,
    pub heading_size: f32,
    pub body_size: f32,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            name: "dark".to_string(),
            background: Color32::from_rgb(0x1E, 0x1E, 0x1E),
            foreground: Color32::from_rgb(0xC8, 0xC8, 0xC8),
            heading_color: Color32::WHITE,
            accent: Color32::from_rgb(0x52, 0x94, 0xE2),
            panel_background: Color32::from_rgb(0x2D, 0x2D, 0x2D),
            muted: Color32::from_rgb(0x80, 0x80, 0x80),
            heading_size: 56.0,
            body_size: 28.0,
        }
    }

    pub fn light() -> Self {
        Self {
            name: "light".to_string(),
            background: Color32::WHITE,
            foreground: Color32::from_rgb(0x1A, 0x1A, 0x2E),
            heading_color: Color32::from_rgb(0x16, 0x21, 0x3E),
            accent: Color32::from_rgb(0x0F, 0x34, 0x60),
            panel_background: Color32::from_rgb(0xF5, 0xF5, 0xF5),
            muted: Color32::from_rgb(0x70, 0x70, 0x70),
            heading_size: 56.0,
            body_size: 28.0,
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            _ => Self::dark(),
        }
    }

    pub fn toggled(&self) -> Self {
        if self.name == "dark" {
            Self::light()
        } else {
            Self::dark()
        }
    }

    pub fn is_dark(&self) -> bool {
        self.name == "dark"
    }

    /// egui widget visuals matching this theme.
    pub fn visuals(&self) -> egui::Visuals {
        let mut visuals = if self.is_dark() {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        };
        visuals.panel_fill = self.panel_background;
        visuals.selection.bg_fill = Self::with_opacity(self.accent, 0.6);
        visuals
    }

    /// Apply opacity to a color
    pub fn with_opacity(color: Color32, opacity: f32) -> Color32 {
        Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), (opacity * 255.0) as u8)
    }

    /// Slide background from a `bg` directive, when it is a hex color.
    pub fn slide_background(&self, bg: Option<&str>) -> Color32 {
        bg.and_then(|value| Color32::from_hex(value.trim()).ok())
            .unwrap_or(self.background)
    }

    /// Readable text color on top of `background`.
    pub fn text_on(&self, background: Color32) -> Color32 {
        if background == self.background {
            return self.foreground;
        }
        let luma = 0.299 * background.r() as f32
            + 0.587 * background.g() as f32
            + 0.114 * background.b() as f32;
        if luma > 140.0 {
            Color32::from_rgb(0x1A, 0x1A, 0x2E)
        } else {
            Color32::from_rgb(0xEE, 0xEE, 0xEE)
        }
    }
}
