//! Row condition matching and per-rule condition groups.

use crate::address::decode_column;
use crate::rule::{Condition, ConditionMode, Logic};
use crate::sheet::Row;
use crate::value::CellValue;

/// Does `row` survive a single condition?
///
/// The target cell is stringified and lowercased, then searched for the
/// lowercased keyword. A column that fails to decode, or a cell past the end
/// of the row, reads as "".
pub fn row_matches(row: &[CellValue], condition: &Condition) -> bool {
    let text = decode_column(&condition.column)
        .and_then(|col| row.get(col))
        .map(|cell| cell.to_string().to_lowercase())
        .unwrap_or_default();
    let found = text.contains(&condition.keyword.to_lowercase());

    match condition.mode {
        ConditionMode::Include => found,
        ConditionMode::Exclude => !found,
    }
}

/// The ordered conditions belonging to one rule.
#[derive(Debug, Clone, Default)]
pub struct ConditionGroup<'a> {
    conditions: Vec<&'a Condition>,
}

impl<'a> ConditionGroup<'a> {
    pub fn new(conditions: Vec<&'a Condition>) -> Self {
        Self { conditions }
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub(crate) fn push(&mut self, condition: &'a Condition) {
        self.conditions.push(condition);
    }

    /// Fold the group left to right over one row.
    ///
    /// Condition `i`'s result joins the running result through the logic of
    /// condition `i - 1`; the last condition's logic is never read. An empty
    /// group keeps everything.
    pub fn keeps(&self, row: &[CellValue]) -> bool {
        let mut iter = self.conditions.iter();
        let Some(first) = iter.next() else {
            return true;
        };

        let mut result = row_matches(row, first);
        let mut connector = first.logic;
        for cond in iter {
            let matched = row_matches(row, cond);
            result = match connector {
                Logic::And => result && matched,
                Logic::Or => result || matched,
            };
            connector = cond.logic;
        }
        result
    }

    /// Rows that survive the group, order preserved.
    pub fn apply<'r>(&self, rows: Vec<&'r Row>) -> Vec<&'r Row> {
        if self.conditions.is_empty() {
            return rows;
        }
        rows.into_iter().filter(|row| self.keeps(row)).collect()
    }
}
