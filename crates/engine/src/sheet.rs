use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::CellValue;

/// One decoded row. Rows may be shorter than their neighbours (jagged).
pub type Row = Vec<CellValue>;

/// Opaque identifier of a loaded file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(String);

impl FileId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Composite key for a sheet inside a loaded file.
///
/// Filter state is tracked per key, so two rules pointing at the same sheet
/// share state no matter how they were authored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SheetKey {
    pub file: FileId,
    pub sheet: String,
}

impl SheetKey {
    pub fn new(file: FileId, sheet: impl Into<String>) -> Self {
        Self { file, sheet: sheet.into() }
    }
}

impl fmt::Display for SheetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}!{}", self.file, self.sheet)
    }
}

/// A named sheet: rows of raw values, immutable once loaded.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Row>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, rows: Vec<Row>) -> Self {
        Self { name: name.into(), rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Width of the widest row.
    pub fn col_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&CellValue> {
        self.rows.get(row)?.get(col)
    }
}

/// A loaded file: display name plus its sheets in workbook order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Workbook {
    pub id: FileId,
    pub name: String,
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new(id: FileId, name: impl Into<String>, sheets: Vec<Sheet>) -> Self {
        Self { id, name: name.into(), sheets }
    }

    /// First sheet with this exact name.
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }
}

/// Read-only access to loaded files, keyed by id.
///
/// The engine only ever borrows from a source; it never mutates or outlives it.
pub trait SheetSource {
    fn workbook(&self, id: &FileId) -> Option<&Workbook>;

    fn sheet(&self, key: &SheetKey) -> Option<&Sheet> {
        self.workbook(&key.file)?.sheet(&key.sheet)
    }
}

impl SheetSource for HashMap<FileId, Workbook> {
    fn workbook(&self, id: &FileId) -> Option<&Workbook> {
        self.get(id)
    }
}

/// Build rows from string literals; `""` becomes an empty cell. Test helper.
#[cfg(test)]
pub(crate) fn text_rows(rows: &[&[&str]]) -> Vec<Row> {
    rows.iter()
        .map(|r| {
            r.iter()
                .map(|s| if s.is_empty() { CellValue::Empty } else { CellValue::from(*s) })
                .collect()
        })
        .collect()
}
