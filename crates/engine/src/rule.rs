//! Rule and condition model consumed by the engine.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::sheet::SheetKey;

/// How a rule relates to the filter state accumulated for its sheet, or how a
/// condition connects to the next one in its group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Logic {
    #[default]
    And,
    Or,
}

impl fmt::Display for Logic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And => write!(f, "AND"),
            Self::Or => write!(f, "OR"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConditionMode {
    /// Matching rows are dropped.
    #[default]
    Exclude,
    /// Only matching rows are kept.
    Include,
}

impl fmt::Display for ConditionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exclude => write!(f, "exclude"),
            Self::Include => write!(f, "include"),
        }
    }
}

/// Row-level keyword filter attached to a rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Column letters of the cell to test.
    pub column: String,
    /// Case-insensitive substring to look for.
    pub keyword: String,
    #[serde(default)]
    pub mode: ConditionMode,
    /// Connector to the *next* condition in the same group. Unused on the last one.
    #[serde(default)]
    pub logic: Logic,
}

impl Condition {
    pub fn new(column: impl Into<String>, keyword: impl Into<String>, mode: ConditionMode) -> Self {
        Self {
            column: column.into(),
            keyword: keyword.into(),
            mode,
            logic: Logic::And,
        }
    }

    pub fn exclude(column: impl Into<String>, keyword: impl Into<String>) -> Self {
        Self::new(column, keyword, ConditionMode::Exclude)
    }

    pub fn include(column: impl Into<String>, keyword: impl Into<String>) -> Self {
        Self::new(column, keyword, ConditionMode::Include)
    }

    pub fn then(mut self, logic: Logic) -> Self {
        self.logic = logic;
        self
    }
}

/// A condition in the flattened engine input, tagged with the index of the
/// rule it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedCondition {
    pub rule_index: usize,
    pub condition: Condition,
}

impl TaggedCondition {
    pub fn new(rule_index: usize, condition: Condition) -> Self {
        Self { rule_index, condition }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceKind {
    Cell,
    Row,
    Column,
    Custom,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cell => write!(f, "cell"),
            Self::Row => write!(f, "row"),
            Self::Column => write!(f, "column"),
            Self::Custom => write!(f, "custom"),
        }
    }
}

/// What a rule reads. Address strings are kept as authored; malformed ones
/// contribute zero at evaluation time.
#[derive(Debug, Clone, PartialEq)]
pub enum Reference {
    /// Single cell, "A1" style.
    Cell { sheet: SheetKey, address: String },
    /// Every cell of a 1-based row number.
    Row { sheet: SheetKey, row: String },
    /// Column letters with optional 1-based inclusive bounds.
    Column {
        sheet: SheetKey,
        column: String,
        start_row: Option<u32>,
        end_row: Option<u32>,
    },
    /// Literal value, no sheet lookup.
    Custom { value: f64 },
}

impl Reference {
    pub fn cell(sheet: SheetKey, address: impl Into<String>) -> Self {
        Self::Cell { sheet, address: address.into() }
    }

    pub fn row(sheet: SheetKey, row: impl Into<String>) -> Self {
        Self::Row { sheet, row: row.into() }
    }

    pub fn column(sheet: SheetKey, column: impl Into<String>) -> Self {
        Self::Column {
            sheet,
            column: column.into(),
            start_row: None,
            end_row: None,
        }
    }

    pub fn column_range(
        sheet: SheetKey,
        column: impl Into<String>,
        start_row: Option<u32>,
        end_row: Option<u32>,
    ) -> Self {
        Self::Column {
            sheet,
            column: column.into(),
            start_row,
            end_row,
        }
    }

    pub fn custom(value: f64) -> Self {
        Self::Custom { value }
    }

    /// Sheet this reference reads from; `None` for custom values.
    pub fn sheet(&self) -> Option<&SheetKey> {
        match self {
            Self::Cell { sheet, .. } | Self::Row { sheet, .. } | Self::Column { sheet, .. } => Some(sheet),
            Self::Custom { .. } => None,
        }
    }

    pub fn kind(&self) -> ReferenceKind {
        match self {
            Self::Cell { .. } => ReferenceKind::Cell,
            Self::Row { .. } => ReferenceKind::Row,
            Self::Column { .. } => ReferenceKind::Column,
            Self::Custom { .. } => ReferenceKind::Custom,
        }
    }
}

/// A reference plus its relationship to the running filter state.
///
/// `logic` never changes the arithmetic: every contribution is added. It only
/// decides which filtered row set the reference sees. The first rule's logic
/// is ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub logic: Logic,
    pub reference: Reference,
}

impl Rule {
    /// AND-linked rule.
    pub fn new(reference: Reference) -> Self {
        Self { logic: Logic::And, reference }
    }

    /// OR-linked rule.
    pub fn or(reference: Reference) -> Self {
        Self { logic: Logic::Or, reference }
    }

    pub fn with_logic(reference: Reference, logic: Logic) -> Self {
        Self { logic, reference }
    }
}
