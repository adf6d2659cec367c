//! Authored rule sets.
//!
//! A rule set is the saved form of what a user builds rule by rule: which
//! files to load, and an ordered list of rules with their filter conditions.
//! It is written in TOML:
//!
//! ```toml
//! name = "Q3 totals"
//!
//! [[files]]
//! alias = "sales"
//! path = "sales.xlsx"
//!
//! [[rules]]
//! kind = "column"
//! file = "sales"
//! sheet = "Sales"
//! column = "B"
//! start_row = 2
//!
//! [[rules.conditions]]
//! column = "A"
//! keyword = "test"
//! mode = "exclude"
//!
//! [[rules]]
//! kind = "custom"
//! logic = "or"
//! value = 12.5
//! ```
//!
//! [`RuleSet::flatten`] turns it into the engine's input: ordered [`Rule`]s and
//! a flat [`TaggedCondition`] list.

use std::collections::HashSet;

use serde::Deserialize;

use crate::error::RuleSetError;
use crate::rule::{Condition, Logic, Reference, ReferenceKind, Rule, TaggedCondition};
use crate::sheet::{FileId, SheetKey};

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct RuleSet {
    /// Label for the result; used as the history entry name.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub files: Vec<FileSpec>,
    #[serde(default)]
    pub rules: Vec<RuleSpec>,
}

/// A file to load before evaluating. `path` is relative to the rule set.
#[derive(Debug, Clone, Deserialize)]
pub struct FileSpec {
    pub path: String,
    #[serde(default)]
    pub alias: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RuleSpec {
    pub kind: ReferenceKind,
    #[serde(default)]
    pub logic: Logic,
    /// File alias, display name, or id. Omitted means the first loaded file.
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub sheet: Option<String>,
    #[serde(default)]
    pub cell: Option<String>,
    #[serde(default)]
    pub row: Option<RowNumber>,
    #[serde(default)]
    pub column: Option<String>,
    #[serde(default)]
    pub start_row: Option<u32>,
    #[serde(default)]
    pub end_row: Option<u32>,
    #[serde(default)]
    pub value: Option<f64>,
    /// Free-text note, shown next to the rule in traces.
    #[serde(default)]
    pub description: Option<String>,
    /// Keep the conditions but stop applying them.
    #[serde(default = "default_true")]
    pub filters_enabled: bool,
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

/// Row numbers may be written as `row = 3` or `row = "3"`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RowNumber {
    Number(i64),
    Text(String),
}

impl std::fmt::Display for RowNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

fn default_true() -> bool {
    true
}

/// Engine input produced by [`RuleSet::flatten`].
#[derive(Debug, Clone, Default)]
pub struct Flattened {
    pub rules: Vec<Rule>,
    pub conditions: Vec<TaggedCondition>,
    /// One per entry in `rules`; `None` when blank.
    pub descriptions: Vec<Option<String>>,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl RuleSet {
    pub fn from_toml(input: &str) -> Result<Self, RuleSetError> {
        let set: RuleSet = toml::from_str(input).map_err(|e| RuleSetError::Parse(e.to_string()))?;
        set.validate()?;
        Ok(set)
    }

    pub fn validate(&self) -> Result<(), RuleSetError> {
        if self.rules.is_empty() {
            return Err(RuleSetError::Validation("at least one rule is required".into()));
        }

        let mut aliases = HashSet::new();
        for file in &self.files {
            if file.path.trim().is_empty() {
                return Err(RuleSetError::Validation("file entry with empty path".into()));
            }
            if let Some(alias) = &file.alias {
                if !aliases.insert(alias.as_str()) {
                    return Err(RuleSetError::Validation(format!("duplicate file alias '{alias}'")));
                }
            }
        }

        for (i, rule) in self.rules.iter().enumerate() {
            let missing = match rule.kind {
                ReferenceKind::Cell if rule.cell.is_none() => Some("cell"),
                ReferenceKind::Row if rule.row.is_none() => Some("row"),
                ReferenceKind::Column if rule.column.is_none() => Some("column"),
                ReferenceKind::Custom if rule.value.is_none() => Some("value"),
                _ => None,
            };
            if let Some(field) = missing {
                return Err(RuleSetError::MissingField {
                    rule: i + 1,
                    kind: rule.kind.to_string(),
                    field,
                });
            }
        }

        Ok(())
    }

    /// Convert to engine input.
    ///
    /// `resolve` maps a rule's `file` field to a loaded file's id. A file that
    /// does not resolve keeps its raw text as the id, so the engine skips it
    /// like any other missing sheet. Sheet rules with no sheet name are left
    /// out entirely, and condition tags point into the returned rule list.
    pub fn flatten<F>(&self, mut resolve: F) -> Flattened
    where
        F: FnMut(Option<&str>) -> Option<FileId>,
    {
        let mut out = Flattened::default();

        for (i, spec) in self.rules.iter().enumerate() {
            let reference = match spec.kind {
                ReferenceKind::Custom => Reference::custom(spec.value.unwrap_or(0.0)),
                kind => {
                    let Some(sheet) = spec.sheet.as_deref().filter(|s| !s.is_empty()) else {
                        log::debug!("rule {}: no sheet selected, left out", i + 1);
                        continue;
                    };
                    let file = resolve(spec.file.as_deref()).unwrap_or_else(|| {
                        let raw = spec.file.clone().unwrap_or_default();
                        log::warn!("rule {}: file '{}' is not loaded", i + 1, raw);
                        FileId::new(raw)
                    });
                    sheet_reference(kind, spec, SheetKey::new(file, sheet))
                }
            };

            let index = out.rules.len();
            out.rules.push(Rule::with_logic(reference, spec.logic));
            out.descriptions.push(
                spec.description
                    .as_deref()
                    .map(str::trim)
                    .filter(|d| !d.is_empty())
                    .map(str::to_string),
            );

            if spec.filters_enabled {
                out.conditions.extend(
                    spec.conditions
                        .iter()
                        .cloned()
                        .map(|c| TaggedCondition::new(index, c)),
                );
            }
        }

        out
    }

    /// Label for the result: the rule set's name, if it has a non-blank one.
    pub fn label(&self) -> Option<&str> {
        self.name.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

fn sheet_reference(kind: ReferenceKind, spec: &RuleSpec, sheet: SheetKey) -> Reference {
    match kind {
        ReferenceKind::Cell => Reference::cell(sheet, spec.cell.clone().unwrap_or_default()),
        ReferenceKind::Row => Reference::row(
            sheet,
            spec.row.as_ref().map(ToString::to_string).unwrap_or_default(),
        ),
        ReferenceKind::Column => Reference::column_range(
            sheet,
            spec.column.clone().unwrap_or_default(),
            spec.start_row,
            spec.end_row,
        ),
        ReferenceKind::Custom => Reference::custom(spec.value.unwrap_or(0.0)),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
