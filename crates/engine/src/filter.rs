//! Layered filtering - per-sheet row state across a rule sequence
//!
//! Each sheet touched by an evaluation carries two row sets:
//! - `original`: the sheet's full rows, never modified
//! - `chain`: the rows left by the most recent rule on that sheet
//!
//! Key invariants:
//! - The first rule, and every OR rule, starts again from `original`
//! - An AND rule starts from `chain` and narrows it further
//! - Whatever a rule produces becomes the new `chain` for its sheet
//! - State is keyed by sheet, never by rule; rules on other sheets are invisible
//! - Row sets borrow from the sheet; nothing is copied
//!
//! So at rule i, the visible rows are the original rows with every condition
//! group of the AND-linked rules since the last reset applied in order.

use std::collections::HashMap;

use crate::condition::ConditionGroup;
use crate::rule::Logic;
use crate::sheet::{Row, Sheet, SheetKey};

struct SheetState<'a> {
    original: &'a [Row],
    chain: Vec<&'a Row>,
}

/// Filter accumulator for one evaluation call.
#[derive(Default)]
pub struct LayeredFilter<'a> {
    sheets: HashMap<SheetKey, SheetState<'a>>,
}

impl<'a> LayeredFilter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one rule's condition group against its sheet and return the rows
    /// that rule should read from.
    ///
    /// `index` is the rule's position in the whole sequence; index 0 always
    /// resets regardless of `logic`. A sheet seen for the first time under AND
    /// starts from its original rows.
    pub fn step(
        &mut self,
        index: usize,
        logic: Logic,
        key: &SheetKey,
        sheet: &'a Sheet,
        group: &ConditionGroup<'_>,
    ) -> &[&'a Row] {
        let state = self.sheets.entry(key.clone()).or_insert_with(|| SheetState {
            original: &sheet.rows,
            chain: sheet.rows.iter().collect(),
        });

        let base = if index == 0 || logic == Logic::Or {
            state.original.iter().collect()
        } else {
            std::mem::take(&mut state.chain)
        };

        state.chain = group.apply(base);
        &state.chain
    }
}
