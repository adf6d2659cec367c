// Application settings
// Loaded from ~/.config/sheetsum/settings.json

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::history::{DEFAULT_LABEL, DEFAULT_LIMIT};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // History
    #[serde(rename = "history.limit")]
    pub history_limit: usize,

    #[serde(rename = "history.path", skip_serializing_if = "Option::is_none")]
    pub history_path: Option<PathBuf>, // None = calc-history.json next to settings

    // File pool
    #[serde(rename = "pool.maxFiles")]
    pub pool_max_files: usize,

    // Result display
    #[serde(rename = "result.defaultLabel")]
    pub default_label: String,

    #[serde(rename = "result.decimals")]
    pub decimals: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_LIMIT,
            history_path: None,
            pool_max_files: 6,
            default_label: DEFAULT_LABEL.to_string(),
            decimals: 2,
        }
    }
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        crate::config_dir().join("settings.json")
    }

    /// Load settings from disk, falling back to defaults
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(contents) => {
                // Strip comments (lines starting with //)
                let cleaned: String = contents
                    .lines()
                    .filter(|line| !line.trim().starts_with("//"))
                    .collect::<Vec<_>>()
                    .join("\n");

                match serde_json::from_str(&cleaned) {
                    Ok(settings) => settings,
                    Err(e) => {
                        log::warn!("error parsing {}: {}; using default settings", path.display(), e);
                        Self::default()
                    }
                }
            }
            Err(e) => {
                log::warn!("error reading {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Where calculation history lives.
    pub fn history_file(&self) -> PathBuf {
        self.history_path
            .clone()
            .unwrap_or_else(|| crate::config_dir().join("calc-history.json"))
    }

    /// Format a total for display.
    pub fn format_result(&self, total: f64) -> String {
        format!("{:.*}", self.decimals, total)
    }
}
