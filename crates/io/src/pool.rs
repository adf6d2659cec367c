//! The set of files open for a calculation.

use std::path::{Path, PathBuf};

use sheetsum_engine::{FileId, SheetSource, Workbook};

use crate::error::PoolError;

struct Entry {
    workbook: Workbook,
    origin: Option<PathBuf>,
}

/// Bounded collection of loaded workbooks with unique display names.
pub struct FilePool {
    capacity: usize,
    entries: Vec<Entry>,
}

impl Default for FilePool {
    fn default() -> Self {
        Self::new()
    }
}

impl FilePool {
    pub const DEFAULT_CAPACITY: usize = 6;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { capacity, entries: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    /// Load `path` and add it to the pool.
    pub fn open(&mut self, path: &Path) -> Result<&Workbook, PoolError> {
        if self.is_full() {
            return Err(PoolError::Full { capacity: self.capacity });
        }
        let workbook = crate::load(path)?;
        self.insert(workbook, Some(path.to_path_buf()))
    }

    /// Add an already-loaded workbook, renaming it if its display name is taken.
    pub fn add(&mut self, workbook: Workbook) -> Result<&Workbook, PoolError> {
        self.insert(workbook, None)
    }

    fn insert(&mut self, mut workbook: Workbook, origin: Option<PathBuf>) -> Result<&Workbook, PoolError> {
        if self.is_full() {
            return Err(PoolError::Full { capacity: self.capacity });
        }

        let unique = unique_name(&workbook.name, |candidate| {
            self.entries.iter().any(|e| e.workbook.name == candidate)
        });
        if unique != workbook.name {
            log::debug!("renamed '{}' to '{}'", workbook.name, unique);
            workbook.name = unique;
        }

        self.entries.push(Entry { workbook, origin });
        let last = self.entries.len() - 1;
        Ok(&self.entries[last].workbook)
    }

    pub fn remove(&mut self, id: &FileId) -> Option<Workbook> {
        let pos = self.entries.iter().position(|e| &e.workbook.id == id)?;
        Some(self.entries.remove(pos).workbook)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn get(&self, id: &FileId) -> Option<&Workbook> {
        self.entries.iter().find(|e| &e.workbook.id == id).map(|e| &e.workbook)
    }

    /// Look a file up by id, then display name, then the path it was opened from.
    pub fn find(&self, reference: &str) -> Option<&Workbook> {
        let by_id = self.entries.iter().find(|e| e.workbook.id.as_str() == reference);
        let by_name = || self.entries.iter().find(|e| e.workbook.name == reference);
        let by_path = || {
            let wanted = Path::new(reference);
            self.entries
                .iter()
                .find(|e| e.origin.as_deref().is_some_and(|p| p == wanted))
        };

        by_id.or_else(by_name).or_else(by_path).map(|e| &e.workbook)
    }

    /// Loaded files in insertion order.
    pub fn files(&self) -> impl Iterator<Item = &Workbook> {
        self.entries.iter().map(|e| &e.workbook)
    }

    pub fn first(&self) -> Option<&Workbook> {
        self.entries.first().map(|e| &e.workbook)
    }
}

impl SheetSource for FilePool {
    fn workbook(&self, id: &FileId) -> Option<&Workbook> {
        self.get(id)
    }
}

/// `name.xlsx` → `name-1.xlsx` → `name-2.xlsx` … until `taken` says no.
///
/// An existing `-N` suffix on the stem is replaced rather than extended.
fn unique_name(name: &str, taken: impl Fn(&str) -> bool) -> String {
    if !taken(name) {
        return name.to_string();
    }

    let (stem, ext) = match name.rfind('.') {
        Some(dot) if dot > 0 => name.split_at(dot),
        _ => (name, ""),
    };
    let base = strip_counter(stem);

    let mut index = 1;
    loop {
        let candidate = format!("{base}-{index}{ext}");
        if !taken(&candidate) {
            return candidate;
        }
        index += 1;
    }
}

fn strip_counter(stem: &str) -> &str {
    match stem.rsplit_once('-') {
        Some((base, digits)) if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) => {
            base.trim_end()
        }
        _ => stem,
    }
}
