use serde::Serialize;

use crate::condition::ConditionGroup;
use crate::filter::LayeredFilter;
use crate::reference::{custom_value, evaluate_reference};
use crate::rule::{Logic, Reference, ReferenceKind, Rule, TaggedCondition};
use crate::sheet::SheetSource;

/// What happened to one rule during an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepOutcome {
    /// Filtered and evaluated against its sheet.
    Applied,
    /// Literal value, no sheet involved.
    Custom,
    /// File or sheet not loaded (or the sheet has no rows); contributed nothing.
    MissingSheet,
}

#[derive(Debug, Clone, Serialize)]
pub struct RuleStep {
    pub index: usize,
    pub logic: Logic,
    pub kind: ReferenceKind,
    pub conditions: usize,
    /// Rows visible to the reference after filtering. `None` when no sheet was read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<usize>,
    pub contribution: f64,
    pub outcome: StepOutcome,
}

/// Total plus a per-rule account of how it was reached.
#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    pub total: f64,
    pub steps: Vec<RuleStep>,
}

impl Evaluation {
    /// One-line account of the run, e.g.
    /// `Rule 1: no filters → [OR] Rule 2: 2 filter conditions → result: 300`.
    pub fn describe(&self) -> String {
        let mut parts: Vec<String> = self
            .steps
            .iter()
            .map(|step| {
                let logic = if step.index > 0 { format!("[{}] ", step.logic) } else { String::new() };
                let filters = match step.conditions {
                    0 => "no filters".to_string(),
                    1 => "1 filter condition".to_string(),
                    n => format!("{n} filter conditions"),
                };
                format!("{logic}Rule {}: {filters}", step.index + 1)
            })
            .collect();
        parts.push(format!("result: {}", self.total));
        parts.join(" → ")
    }
}

/// Evaluate `rules` in order and return the summed total.
///
/// `conditions` is the flattened condition list, each tagged with the index of
/// the rule it belongs to. Never fails: anything malformed or missing
/// contributes 0.
pub fn evaluate<S>(rules: &[Rule], conditions: &[TaggedCondition], source: &S) -> f64
where
    S: SheetSource + ?Sized,
{
    evaluate_traced(rules, conditions, source).total
}

/// [`evaluate`], keeping a record of every step.
pub fn evaluate_traced<S>(rules: &[Rule], conditions: &[TaggedCondition], source: &S) -> Evaluation
where
    S: SheetSource + ?Sized,
{
    let groups = group_conditions(rules.len(), conditions);
    let mut filter = LayeredFilter::new();
    let mut total = 0.0;
    let mut steps = Vec::with_capacity(rules.len());

    for (index, (rule, group)) in rules.iter().zip(&groups).enumerate() {
        let mut step = RuleStep {
            index,
            logic: rule.logic,
            kind: rule.reference.kind(),
            conditions: group.len(),
            rows: None,
            contribution: 0.0,
            outcome: StepOutcome::Custom,
        };

        if let Reference::Custom { value } = &rule.reference {
            step.contribution = custom_value(*value);
        } else if let Some(key) = rule.reference.sheet() {
            match source.sheet(key).filter(|s| !s.is_empty()) {
                None => {
                    log::debug!("rule {}: sheet {} not loaded, skipped", index + 1, key);
                    step.outcome = StepOutcome::MissingSheet;
                }
                Some(sheet) => {
                    let rows = filter.step(index, rule.logic, key, sheet, group);
                    step.rows = Some(rows.len());
                    step.contribution = evaluate_reference(&rule.reference, rows);
                    step.outcome = StepOutcome::Applied;
                }
            }
        }

        log::trace!(
            "rule {} [{}] {}: {:?} rows, +{}",
            index + 1,
            step.logic,
            step.kind,
            step.rows,
            step.contribution
        );
        total += step.contribution;
        steps.push(step);
    }

    Evaluation { total, steps }
}

/// Bucket conditions by owning rule, keeping their relative order.
/// Conditions tagged with an index past the end of `rules` are dropped.
fn group_conditions(rule_count: usize, conditions: &[TaggedCondition]) -> Vec<ConditionGroup<'_>> {
    let mut groups = vec![ConditionGroup::default(); rule_count];
    for tagged in conditions {
        match groups.get_mut(tagged.rule_index) {
            Some(group) => group.push(&tagged.condition),
            None => log::debug!("condition for missing rule {} ignored", tagged.rule_index + 1),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::rule::Condition;
    use crate::sheet::{text_rows, FileId, Sheet, SheetKey, Workbook};

    fn source() -> HashMap<FileId, Workbook> {
        let id = FileId::new("f1");
        let wb = Workbook::new(
            id.clone(),
            "sales.xlsx",
            vec![
                Sheet::new(
                    "Sales",
                    text_rows(&[
                        &["Name", "Amt"],
                        &["test-1", "50"],
                        &["ok-1", "100"],
                        &["ok-2", "200"],
                    ]),
                ),
                Sheet::new("Blank", vec![]),
            ],
        );
        HashMap::from([(id, wb)])
    }

    fn sales() -> SheetKey {
        SheetKey::new(FileId::new("f1"), "Sales")
    }

    #[test]
    fn test_scenario_exclude_then_column() {
        let rules = vec![Rule::new(Reference::column_range(sales(), "B", Some(2), Some(4)))];
        let conditions = vec![TaggedCondition::new(0, Condition::exclude("A", "test"))];

        assert_eq!(evaluate(&rules, &conditions, &source()), 300.0);
    }

    #[test]
    fn test_missing_sheet_and_file_skipped() {
        let rules = vec![
            Rule::new(Reference::custom(5.0)),
            Rule::new(Reference::cell(SheetKey::new(FileId::new("f1"), "Nope"), "B2")),
            Rule::new(Reference::cell(SheetKey::new(FileId::new("gone"), "Sales"), "B2")),
            Rule::new(Reference::column(SheetKey::new(FileId::new("f1"), "Blank"), "A")),
        ];
        let eval = evaluate_traced(&rules, &[], &source());

        assert_eq!(eval.total, 5.0);
        assert_eq!(eval.steps[0].outcome, StepOutcome::Custom);
        assert!(eval.steps[1..].iter().all(|s| s.outcome == StepOutcome::MissingSheet));
    }

    #[test]
    fn test_out_of_range_condition_ignored() {
        let rules = vec![Rule::new(Reference::column(sales(), "B"))];
        let conditions = vec![TaggedCondition::new(7, Condition::include("A", "zzz"))];
        assert_eq!(evaluate(&rules, &conditions, &source()), 350.0);
    }

    #[test]
    fn test_custom_rule_does_not_touch_filter_state() {
        let rules = vec![
            Rule::new(Reference::column(sales(), "B")),
            Rule::or(Reference::custom(1.0)),
            Rule::new(Reference::column(sales(), "B")),
        ];
        let conditions = vec![TaggedCondition::new(0, Condition::exclude("A", "ok"))];

        // Rule 3 (AND) still sees rule 1's chain: Name + test-1
        let eval = evaluate_traced(&rules, &conditions, &source());
        assert_eq!(eval.steps[2].rows, Some(2));
        assert_eq!(eval.total, 50.0 + 1.0 + 50.0);
    }

    #[test]
    fn test_trace_records_rows_and_conditions() {
        let rules = vec![
            Rule::new(Reference::column(sales(), "B")),
            Rule::or(Reference::column(sales(), "B")),
        ];
        let conditions = vec![
            TaggedCondition::new(1, Condition::include("A", "ok").then(Logic::Or)),
            TaggedCondition::new(1, Condition::include("A", "name")),
        ];
        let eval = evaluate_traced(&rules, &conditions, &source());

        assert_eq!(eval.steps[0].conditions, 0);
        assert_eq!(eval.steps[0].rows, Some(4));
        assert_eq!(eval.steps[1].conditions, 2);
        assert_eq!(eval.steps[1].rows, Some(3));
        assert_eq!(eval.total, 350.0 + 300.0);
    }

    #[test]
    fn test_describe() {
        let rules = vec![
            Rule::new(Reference::column_range(sales(), "B", Some(2), Some(4))),
            Rule::or(Reference::custom(10.0)),
        ];
        let conditions = vec![
            TaggedCondition::new(0, Condition::exclude("A", "test")),
            TaggedCondition::new(0, Condition::exclude("A", "ok-2")),
        ];
        let eval = evaluate_traced(&rules, &conditions, &source());

        assert_eq!(
            eval.describe(),
            "Rule 1: 2 filter conditions → [OR] Rule 2: no filters → result: 110"
        );
    }

    #[test]
    fn test_empty_rules() {
        assert_eq!(evaluate(&[], &[], &source()), 0.0);
    }
}
