// Excel / OpenDocument import

use std::path::Path;

use calamine::{open_workbook_auto, Data, ExcelDateTime, Range, Reader, Sheets};

use sheetsum_engine::{CellValue, Row, Sheet, Workbook};

use crate::error::LoadError;

/// Import every sheet of a spreadsheet file (xlsx, xlsm, xlsb, xls, ods).
///
/// Rows are positioned from A1 even when the used range starts later, so a
/// sheet whose data begins at C3 has two leading empty rows and two leading
/// empty cells per row.
pub fn load(path: &Path) -> Result<Workbook, LoadError> {
    let mut workbook: Sheets<_> = open_workbook_auto(path).map_err(|e| match e {
        calamine::Error::Io(source) => LoadError::Io { path: path.to_path_buf(), source },
        other => LoadError::Decode { path: path.to_path_buf(), message: other.to_string() },
    })?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let mut sheets = Vec::with_capacity(sheet_names.len());

    for sheet_name in &sheet_names {
        let range = workbook.worksheet_range(sheet_name).map_err(|e| LoadError::Decode {
            path: path.to_path_buf(),
            message: format!("sheet '{}': {}", sheet_name, e),
        })?;

        let rows = range_to_rows(&range);
        log::debug!("{}: sheet '{}' {} rows", path.display(), sheet_name, rows.len());
        sheets.push(Sheet::new(sheet_name.clone(), rows));
    }

    Ok(Workbook::new(crate::new_file_id(), crate::display_name(path), sheets))
}

fn range_to_rows(range: &Range<Data>) -> Vec<Row> {
    if range.is_empty() {
        return Vec::new();
    }

    // Range start offset (data may not begin at A1)
    let (start_row, start_col) = range.start().unwrap_or((0, 0));
    let mut rows: Vec<Row> = vec![Vec::new(); start_row as usize];

    for data_row in range.rows() {
        let mut row = Vec::with_capacity(start_col as usize + data_row.len());
        row.resize(start_col as usize, CellValue::Empty);
        row.extend(data_row.iter().map(convert));
        rows.push(row);
    }

    crate::trim_trailing_empty(&mut rows);
    rows
}

fn convert(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) if s.is_empty() => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(n) => CellValue::Number(*n),
        Data::Int(n) => CellValue::Number(*n as f64),
        // TRUE/FALSE text, never numeric
        Data::Bool(b) => CellValue::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Data::Error(e) => CellValue::Text(format!("#{:?}", e)),
        Data::DateTime(dt) => convert_date(dt),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

/// Dates become text so keyword filters can match "2024" or "2024-01".
/// Durations stay numeric.
fn convert_date(dt: &ExcelDateTime) -> CellValue {
    if dt.is_duration() {
        return CellValue::Number(dt.as_f64());
    }
    match dt.as_datetime() {
        Some(at) if at.time() == chrono::NaiveTime::MIN => CellValue::Text(at.format("%Y-%m-%d").to_string()),
        Some(at) => CellValue::Text(at.format("%Y-%m-%d %H:%M:%S").to_string()),
        None => CellValue::Number(dt.as_f64()),
    }
}
