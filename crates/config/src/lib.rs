// Configuration loading

pub mod history;
pub mod settings;

use std::path::PathBuf;

pub use history::{HistoryEntry, HistoryStore};
pub use settings::Settings;

/// Per-user directory holding settings and history.
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("sheetsum")
}
