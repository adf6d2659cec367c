// Calculation history
// Stored as a JSON array, newest first, in calc-history.json

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Entries kept before the oldest are dropped.
pub const DEFAULT_LIMIT: usize = 200;

/// Label recorded when a calculation has none.
pub const DEFAULT_LABEL: &str = "Untitled sheet";

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Local time, `YYYY-MM-DD HH:MM:SS`.
    pub time: String,
    pub file_name: String,
    /// Free-form label of the calculation.
    pub sheet_name: String,
    pub result: f64,
}

/// History file handle. Every operation reads and rewrites the whole file.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
    limit: usize,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), limit: DEFAULT_LIMIT }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All entries, newest first. A missing or unreadable file is an empty history.
    pub fn load(&self) -> Vec<HistoryEntry> {
        if !self.path.exists() {
            return Vec::new();
        }

        let contents = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) => {
                log::warn!("error reading {}: {}", self.path.display(), e);
                return Vec::new();
            }
        };

        match serde_json::from_str(&contents) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("ignoring corrupt history {}: {}", self.path.display(), e);
                Vec::new()
            }
        }
    }

    /// Record a result stamped with the current local time.
    pub fn add(&self, file_name: &str, label: &str, result: f64) -> Result<HistoryEntry, String> {
        let label = label.trim();
        let entry = HistoryEntry {
            time: chrono::Local::now().format(TIME_FORMAT).to_string(),
            file_name: file_name.to_string(),
            sheet_name: if label.is_empty() { DEFAULT_LABEL.to_string() } else { label.to_string() },
            result,
        };
        self.push(entry.clone())?;
        Ok(entry)
    }

    /// Prepend `entry`, dropping the oldest beyond the limit.
    pub fn push(&self, entry: HistoryEntry) -> Result<(), String> {
        let mut entries = self.load();
        entries.insert(0, entry);
        entries.truncate(self.limit);
        self.write(&entries)
    }

    pub fn clear(&self) -> Result<(), String> {
        self.write(&[])
    }

    fn write(&self, entries: &[HistoryEntry]) -> Result<(), String> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }

        let json = serde_json::to_string_pretty(entries).map_err(|e| e.to_string())?;

        fs::write(&self.path, json).map_err(|e| format!("cannot write {}: {}", self.path.display(), e))
    }
}
