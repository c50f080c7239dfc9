use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const FILENAME: &str = "config.yaml";
const APP_DIR: &str = "dekk";
const DRAFTS_DIR: &str = "drafts";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor: Option<EditorConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presentations_dir: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,

    /// `picker`, `overview`, `editor`, or a 1-indexed slide number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_view: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EditorConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autosave_ms: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drafts_dir: Option<PathBuf>,
}

/// Where the viewer starts when a deck is opened without an explicit route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartView {
    Picker,
    Overview,
    Editor,
    /// Zero-based.
    Slide(usize),
}

impl StartView {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "picker" => Some(Self::Picker),
            "overview" => Some(Self::Overview),
            "editor" => Some(Self::Editor),
            "first" => Some(Self::Slide(0)),
            n => n.parse::<usize>().ok().map(|n| Self::Slide(n.saturating_sub(1))),
        }
    }
}

impl Config {
    pub fn path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|d| d.join(APP_DIR).join(FILENAME))
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
    }

    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                anyhow::anyhow!("No config found. Run `dekk config show` to see defaults.")
            } else {
                anyhow::anyhow!("Failed to read config: {e}")
            }
        })?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(self)?;
        let contents = format!("# Dekk configuration\n{yaml}");
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn presentations_dir(&self) -> Option<&Path> {
        self.defaults.as_ref()?.presentations_dir.as_deref()
    }

    pub fn theme(&self) -> &str {
        self.defaults
            .as_ref()
            .and_then(|d| d.theme.as_deref())
            .unwrap_or("dark")
    }

    pub fn start_view(&self) -> Option<StartView> {
        self.defaults
            .as_ref()
            .and_then(|d| d.start_view.as_deref())
            .and_then(StartView::parse)
    }

    pub fn autosave_delay(&self) -> Duration {
        self.editor
            .as_ref()
            .and_then(|e| e.autosave_ms)
            .map(Duration::from_millis)
            .unwrap_or(dekk::session::DEFAULT_AUTOSAVE_DELAY)
    }

    /// Configured drafts directory, else `<data_dir>/dekk/drafts`.
    pub fn drafts_dir(&self) -> Option<PathBuf> {
        self.editor
            .as_ref()
            .and_then(|e| e.drafts_dir.clone())
            .or_else(|| dirs::data_dir().map(|d| d.join(APP_DIR).join(DRAFTS_DIR)))
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "defaults.presentations_dir" => {
                self.defaults
                    .get_or_insert_with(DefaultsConfig::default)
                    .presentations_dir = Some(PathBuf::from(value));
            }
            "defaults.theme" => {
                match value {
                    "light" | "dark" => {}
                    _ => anyhow::bail!("Invalid theme: {value}. Must be 'light' or 'dark'."),
                }
                self.defaults
                    .get_or_insert_with(DefaultsConfig::default)
                    .theme = Some(value.to_string());
            }
            "defaults.start_view" => {
                if StartView::parse(value).is_none() {
                    anyhow::bail!(
                        "Invalid start_view: {value}. Must be 'picker', 'overview', 'editor', 'first', or a slide number."
                    );
                }
                self.defaults
                    .get_or_insert_with(DefaultsConfig::default)
                    .start_view = Some(value.to_string());
            }
            "editor.autosave_ms" => {
                let ms: u64 = value
                    .parse()
                    .map_err(|_| anyhow::anyhow!("Invalid autosave_ms: {value}. Must be a number of milliseconds."))?;
                self.editor.get_or_insert_with(EditorConfig::default).autosave_ms = Some(ms);
            }
            "editor.drafts_dir" => {
                self.editor.get_or_insert_with(EditorConfig::default).drafts_dir =
                    Some(PathBuf::from(value));
            }
            _ => anyhow::bail!(
                "Unknown config key: {key}. Valid keys: defaults.presentations_dir, defaults.theme, defaults.start_view, editor.autosave_ms, editor.drafts_dir"
            ),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_validates_values() {
        let mut config = Config::default();
        config.set("defaults.theme", "light").unwrap();
        config.set("defaults.start_view", "3").unwrap();
        config.set("editor.autosave_ms", "750").unwrap();
        assert_eq!(config.theme(), "light");
        assert_eq!(config.start_view(), Some(StartView::Slide(2)));
        assert_eq!(config.autosave_delay(), Duration::from_millis(750));

        assert!(config.set("defaults.theme", "neon").is_err());
        assert!(config.set("defaults.start_view", "sideways").is_err());
        assert!(config.set("editor.autosave_ms", "soon").is_err());
        assert!(config.set("nope", "x").is_err());
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.theme(), "dark");
        assert_eq!(config.start_view(), None);
        assert_eq!(config.autosave_delay(), dekk::session::DEFAULT_AUTOSAVE_DELAY);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.yaml");
        let mut config = Config::default();
        config.set("defaults.presentations_dir", "/talks").unwrap();
        config.set("defaults.start_view", "overview").unwrap();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.presentations_dir(), Some(Path::new("/talks")));
        assert_eq!(loaded.start_view(), Some(StartView::Overview));
        assert!(loaded.editor.is_none());
    }

    #[test]
    fn test_missing_config_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = Config::load_from(&tmp.path().join("missing.yaml")).unwrap_err();
        assert!(err.to_string().contains("No config found"));
    }
}
