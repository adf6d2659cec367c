//! Numeric contribution of a single reference.

use crate::address::{decode_cell, decode_column, decode_row};
use crate::rule::Reference;
use crate::sheet::Row;
use crate::value::{to_number, CellValue};

/// Evaluate `reference` against an already-filtered row set.
///
/// Row positions are positions within `rows`, so after filtering "B2" means
/// the second surviving row. Malformed addresses and out-of-range positions
/// contribute 0.
pub fn evaluate_reference(reference: &Reference, rows: &[&Row]) -> f64 {
    match reference {
        Reference::Custom { value } => custom_value(*value),
        Reference::Cell { address, .. } => decode_cell(address)
            .and_then(|addr| cell(rows, addr.row, addr.col))
            .map(to_number)
            .unwrap_or(0.0),
        Reference::Row { row, .. } => decode_row(row)
            .and_then(|r| rows.get(r))
            .map(|cells| cells.iter().map(to_number).sum())
            .unwrap_or(0.0),
        Reference::Column {
            column,
            start_row,
            end_row,
            ..
        } => match decode_column(column) {
            Some(col) => sum_column(rows, col, *start_row, *end_row),
            None => 0.0,
        },
    }
}

/// Literal values pass through; NaN counts as nothing.
pub(crate) fn custom_value(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value
    }
}

fn cell<'r>(rows: &[&'r Row], row: usize, col: usize) -> Option<&'r CellValue> {
    rows.get(row)?.get(col)
}

/// Sum one column over an inclusive 1-based row range.
///
/// A missing or zero start means the first row. A missing or zero end means
/// the last row holding a non-empty value in this column; when the column has
/// none at all, the last row of the data.
fn sum_column(rows: &[&Row], col: usize, start_row: Option<u32>, end_row: Option<u32>) -> f64 {
    let Some(last) = rows.len().checked_sub(1) else {
        return 0.0;
    };

    let start = start_row.map(|r| (r as usize).saturating_sub(1)).unwrap_or(0);
    let end = match end_row {
        Some(r) if r > 0 => r as usize - 1,
        _ => last_non_empty_row(rows, col).unwrap_or(last),
    };

    // Positions past the data are empty and add nothing
    let end = end.min(last);
    if start > end {
        return 0.0;
    }

    rows[start..=end]
        .iter()
        .filter_map(|r| r.get(col))
        .map(to_number)
        .sum()
}

/// Last row index whose cell in `col` is present and non-empty, scanning up.
fn last_non_empty_row(rows: &[&Row], col: usize) -> Option<usize> {
    rows.iter()
        .rposition(|r| r.get(col).is_some_and(|v| !v.is_empty()))
}
