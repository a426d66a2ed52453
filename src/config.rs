//! Text view configuration persistence
//!
//! Stores defaults for new views in `~/.config/richedit/config.yaml`.
//! Every field is optional in the file; missing keys take the built-in value.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::editable::{Color, EditConstraints, Font, TextAlignment};
use crate::geometry::EdgeInsets;
use crate::layout::VerticalAlignment;
use crate::model::{TextView, Timings};
use crate::services::DetectorTypes;

pub const DEFAULT_MAX_UNDO_LEVEL: usize = 20;

/// Errors reading or writing a config file
#[derive(Debug)]
pub enum ConfigError {
    /// No home or app-data directory could be determined
    NoConfigDir,
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NoConfigDir => write!(f, "no config directory available"),
            ConfigError::Io { path, source } => {
                write!(f, "failed to access {}: {}", path.display(), source)
            }
            ConfigError::Parse { path, source } => {
                write!(f, "failed to parse {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::NoConfigDir => None,
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
        }
    }
}

/// Defaults applied to a freshly created text view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextViewConfig {
    pub constraints: EditConstraints,
    pub timings: Timings,
    pub max_undo_level: usize,
    pub font: Option<Font>,
    pub text_color: Option<Color>,
    pub text_alignment: TextAlignment,
    pub vertical_alignment: VerticalAlignment,
    pub vertical_form: bool,
    /// Overrides the default inset for the current writing mode
    pub text_container_inset: Option<EdgeInsets>,
    pub data_detector_types: DetectorTypes,
    pub clears_on_insertion: bool,
    pub placeholder: Option<String>,
    pub extra_accessory_view_height: f64,
    /// Write a daily-rotated log under the config directory
    pub file_logging: bool,
}

impl Default for TextViewConfig {
    fn default() -> Self {
        Self {
            constraints: EditConstraints::editor(),
            timings: Timings::default(),
            max_undo_level: DEFAULT_MAX_UNDO_LEVEL,
            font: None,
            text_color: None,
            text_alignment: TextAlignment::Natural,
            vertical_alignment: VerticalAlignment::Top,
            vertical_form: false,
            text_container_inset: None,
            data_detector_types: DetectorTypes::default(),
            clears_on_insertion: false,
            placeholder: None,
            extra_accessory_view_height: 0.0,
            file_logging: true,
        }
    }
}

impl TextViewConfig {
    /// Load config from the user config directory, or return defaults if it
    /// is missing or unreadable
    pub fn load() -> Self {
        let Some(path) = crate::config_paths::config_file() else {
            tracing::debug!("No config directory available, using defaults");
            return Self::default();
        };

        if !path.exists() {
            tracing::debug!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(config) => {
                tracing::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                tracing::warn!("{}", e);
                Self::default()
            }
        }
    }

    /// Load config from an explicit path
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Save config to the user config directory
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = crate::config_paths::config_file().ok_or(ConfigError::NoConfigDir)?;
        self.save_to(&path)
    }

    /// Save config to an explicit path, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_error = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_error)?;
        }

        let content = serde_yaml::to_string(self).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, content).map_err(io_error)?;

        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Push these defaults into a view
    pub fn apply(&self, view: &mut TextView) {
        view.set_constraints(self.constraints);
        view.set_timings(self.timings);
        view.set_max_undo_level(self.max_undo_level);
        view.set_vertical_form(self.vertical_form);
        if let Some(insets) = self.text_container_inset {
            view.set_text_container_inset(insets);
        }
        if let Some(font) = &self.font {
            view.set_font(font.clone());
        }
        if let Some(color) = self.text_color {
            view.set_text_color(color);
        }
        view.set_text_alignment(self.text_alignment);
        view.set_vertical_alignment(self.vertical_alignment);
        view.set_data_detector_types(self.data_detector_types);
        view.set_clears_on_insertion(self.clears_on_insertion);
        view.set_placeholder_text(self.placeholder.as_deref());
        view.set_extra_accessory_view_height(self.extra_accessory_view_height);
    }
}
