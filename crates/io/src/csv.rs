// CSV/TSV import

use std::io::Read;
use std::path::Path;

use sheetsum_engine::{CellValue, Row, Sheet, Workbook};

use crate::error::LoadError;

/// Import a delimited text file as a single-sheet workbook.
///
/// The sheet is named after the file stem. Fields are kept as text; numeric
/// coercion happens at evaluation time.
pub fn load(path: &Path) -> Result<Workbook, LoadError> {
    let content = read_file_as_utf8(path)?;
    let delimiter = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => b'\t',
        _ => sniff_delimiter(&content),
    };

    let rows = import_from_string(&content, delimiter).map_err(|message| LoadError::Decode {
        path: path.to_path_buf(),
        message,
    })?;

    let sheet_name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Sheet1")
        .to_string();

    Ok(Workbook::new(
        crate::new_file_id(),
        crate::display_name(path),
        vec![Sheet::new(sheet_name, rows)],
    ))
}

const DELIMITERS: [u8; 4] = [b'\t', b';', b',', b'|'];
const SNIFF_RECORDS: usize = 10;

/// Guess the delimiter from the first few records.
///
/// A candidate has to split the first record into at least two fields. Its
/// score is that width times the number of sampled records sharing it, and
/// ties go to the earlier candidate. Records are parsed whole, so a quoted
/// field spanning lines does not skew the count. Falls back to comma.
fn sniff_delimiter(content: &str) -> u8 {
    let mut best = (b',', 0);

    for delimiter in DELIMITERS {
        let widths: Vec<usize> = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .flexible(true)
            .from_reader(content.as_bytes())
            .records()
            .take(SNIFF_RECORDS)
            .map_while(Result::ok)
            .map(|record| record.len())
            .collect();

        let Some(&width) = widths.first() else {
            continue;
        };
        if width < 2 {
            continue;
        }

        let score = width * widths.iter().filter(|&&w| w == width).count();
        if score > best.1 {
            best = (delimiter, score);
        }
    }

    best.0
}

/// Read file and convert to UTF-8 if needed (handles Windows-1252, Latin-1, etc.)
fn read_file_as_utf8(path: &Path) -> Result<String, LoadError> {
    let io_err = |source| LoadError::Io { path: path.to_path_buf(), source };

    let mut file = std::fs::File::open(path).map_err(io_err)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(io_err)?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s.strip_prefix('\u{feff}').map(str::to_string).unwrap_or(s)),
        Err(e) => {
            let bytes = e.into_bytes();
            log::debug!("{}: not UTF-8, decoding as Windows-1252", path.display());
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

fn import_from_string(content: &str, delimiter: u8) -> Result<Vec<Row>, String> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| e.to_string())?;
        let row: Row = record
            .iter()
            .map(|field| if field.is_empty() { CellValue::Empty } else { CellValue::from(field) })
            .collect();
        rows.push(row);
    }

    crate::trim_trailing_empty(&mut rows);
    Ok(rows)
}
