//! `sheetsum sheets` — what a file contains, for writing rules against it.

use std::path::PathBuf;

use serde::Serialize;

use sheetsum_engine::{address::column_letters, Row, Sheet};

use crate::exit_codes::EXIT_LOAD_FAILED;
use crate::{print_json, CliError};

const PREVIEW_ROWS: usize = 3;

#[derive(Serialize)]
struct SheetSummary<'a> {
    name: &'a str,
    rows: usize,
    cols: usize,
    preview: &'a [Row],
}

pub fn cmd_sheets(file: PathBuf, json: bool) -> Result<(), CliError> {
    let workbook = sheetsum_io::load(&file).map_err(|e| CliError::new(EXIT_LOAD_FAILED, e.to_string()))?;

    if json {
        let summaries: Vec<SheetSummary> = workbook.sheets.iter().map(summarize).collect();
        return print_json(&summaries);
    }

    println!("{} ({} sheets)", workbook.name, workbook.sheets.len());
    for sheet in &workbook.sheets {
        println!();
        println!("{}  {} rows x {} cols", sheet.name, sheet.row_count(), sheet.col_count());
        if sheet.is_empty() {
            println!("  (empty)");
            continue;
        }

        let width = sheet.rows.iter().take(PREVIEW_ROWS).map(Vec::len).max().unwrap_or(0);
        let header: Vec<String> = (0..width).map(column_letters).collect();
        println!("     {}", header.join("\t"));
        for (i, row) in sheet.rows.iter().take(PREVIEW_ROWS).enumerate() {
            let cells: Vec<String> = row.iter().map(ToString::to_string).collect();
            println!("  {:>2} {}", i + 1, cells.join("\t"));
        }
    }

    Ok(())
}

fn summarize(sheet: &Sheet) -> SheetSummary<'_> {
    SheetSummary {
        name: &sheet.name,
        rows: sheet.row_count(),
        cols: sheet.col_count(),
        preview: &sheet.rows[..sheet.rows.len().min(PREVIEW_ROWS)],
    }
}
