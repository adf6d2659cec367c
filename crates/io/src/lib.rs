// File I/O operations

pub mod csv;
pub mod error;
pub mod pool;
pub mod xlsx;

use std::path::Path;

use sheetsum_engine::{FileId, Row, Workbook};

pub use error::{LoadError, PoolError};
pub use pool::FilePool;

/// Extensions handled by the spreadsheet decoder.
const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];
const TEXT_EXTENSIONS: &[&str] = &["csv", "tsv", "txt"];

/// Load a file, choosing the decoder by extension.
pub fn load(path: &Path) -> Result<Workbook, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let result = if SPREADSHEET_EXTENSIONS.contains(&ext.as_str()) {
        xlsx::load(path)
    } else if TEXT_EXTENSIONS.contains(&ext.as_str()) {
        csv::load(path)
    } else {
        Err(LoadError::Unsupported { path: path.to_path_buf() })
    };

    match &result {
        Ok(wb) => log::info!("loaded {} ({} sheets) as {}", path.display(), wb.sheets.len(), wb.id),
        Err(e) => log::warn!("{}", e),
    }
    result
}

/// Fresh opaque id for a loaded file.
pub fn new_file_id() -> FileId {
    FileId::new(format!("file_{}", uuid::Uuid::new_v4().simple()))
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Drop rows at the end that hold no non-empty cell.
fn trim_trailing_empty(rows: &mut Vec<Row>) {
    while rows.last().is_some_and(|r| r.iter().all(|c| c.is_empty())) {
        rows.pop();
    }
}
