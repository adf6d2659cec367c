//! `sheetsum-engine` — Rule evaluation over loaded sheets.
//!
//! Pure engine crate: receives workbooks through [`SheetSource`], returns a
//! total. No file or CLI dependencies.

pub mod address;
pub mod condition;
pub mod engine;
pub mod error;
pub mod filter;
pub mod reference;
pub mod rule;
pub mod ruleset;
pub mod sheet;
pub mod value;

pub use engine::{evaluate, evaluate_traced, Evaluation, RuleStep, StepOutcome};
pub use error::RuleSetError;
pub use rule::{Condition, ConditionMode, Logic, Reference, ReferenceKind, Rule, TaggedCondition};
pub use ruleset::{Flattened, RuleSet};
pub use sheet::{FileId, Row, Sheet, SheetKey, SheetSource, Workbook};
pub use value::CellValue;
