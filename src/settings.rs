use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::SettingsError;
use crate::model::{DEFAULT_STROKE_WIDTH, LineStyle, Rgba, Style};

pub const MIN_STROKE_WIDTH: u32 = 1;
pub const MAX_STROKE_WIDTH: u32 = 8;

/// Preset swatches offered in the toolbar.
pub const PALETTE: [(&str, Rgba); 10] = [
    ("Blue", Rgba::rgb(0x25, 0x63, 0xEB)),
    ("Red", Rgba::rgb(0xDC, 0x26, 0x26)),
    ("Green", Rgba::rgb(0x05, 0x96, 0x69)),
    ("Amber", Rgba::rgb(0xD9, 0x77, 0x06)),
    ("Purple", Rgba::rgb(0x7C, 0x3A, 0xED)),
    ("Pink", Rgba::rgb(0xDB, 0x27, 0x77)),
    ("Cyan", Rgba::rgb(0x08, 0x91, 0xB2)),
    ("Gray", Rgba::rgb(0x4B, 0x55, 0x63)),
    ("Slate", Rgba::rgb(0x0F, 0x17, 0x2A)),
    ("White", Rgba::WHITE),
];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Hex token such as `#2563EB`.
    pub default_color: String,
    pub stroke_width: u32,
    pub line_style: LineStyle,
    pub snap_to_grid: bool,
    pub show_grid: bool,
    pub export_dir: Option<PathBuf>,
    pub debug_logging: bool,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            default_color: Style::default().color.to_hex(),
            stroke_width: DEFAULT_STROKE_WIDTH,
            line_style: LineStyle::Solid,
            snap_to_grid: true,
            show_grid: true,
            export_dir: None,
            debug_logging: false,
        }
    }
}

impl EditorSettings {
    /// Parsed `default_color`, falling back to the stock blue.
    pub fn color(&self) -> Rgba {
        Rgba::from_hex(&self.default_color).unwrap_or_else(|| {
            warn!(value = %self.default_color, "invalid default_color, using stock color");
            Style::default().color
        })
    }

    pub fn stroke_width(&self) -> u32 {
        self.stroke_width.clamp(MIN_STROKE_WIDTH, MAX_STROKE_WIDTH)
    }
}

/// `$HOME/.config/umlsketch.toml` when it exists, else `settings.toml`.
pub fn config_path() -> PathBuf {
    if let Some(home) = std::env::var_os("HOME") {
        let path = PathBuf::from(home).join(".config").join("umlsketch.toml");
        if path.exists() {
            return path;
        }
    }
    PathBuf::from("settings.toml")
}

fn is_toml(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "toml")
}

pub fn load_settings(path: &Path) -> Option<EditorSettings> {
    let s = std::fs::read_to_string(path).ok()?;
    let parsed = if is_toml(path) {
        toml::from_str::<EditorSettings>(&s)
            .ok()
            .or_else(|| serde_json::from_str::<EditorSettings>(&s).ok())
    } else {
        serde_json::from_str::<EditorSettings>(&s)
            .ok()
            .or_else(|| toml::from_str::<EditorSettings>(&s).ok())
    };
    if parsed.is_none() {
        warn!(path = %path.display(), "ignoring malformed settings file");
    }
    parsed
}

/// Loads `path`, or defaults when it is missing or unreadable.
pub fn load_or_default(path: &Path) -> EditorSettings {
    load_settings(path).unwrap_or_else(|| {
        debug!(path = %path.display(), "using default settings");
        EditorSettings::default()
    })
}

pub fn save_settings(path: &Path, settings: &EditorSettings) -> Result<(), SettingsError> {
    let text = if is_toml(path) {
        toml::to_string_pretty(settings)?
    } else {
        serde_json::to_string_pretty(settings)?
    };
    std::fs::write(path, text)?;
    debug!(path = %path.display(), "saved settings");
    Ok(())
}
