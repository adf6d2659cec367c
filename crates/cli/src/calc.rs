//! `sheetsum calc` — evaluate a rule set against loaded files.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use sheetsum_config::{HistoryStore, Settings};
use sheetsum_engine::{evaluate_traced, FileId, Rule, RuleSet, RuleStep, StepOutcome};
use sheetsum_io::{FilePool, PoolError};

use crate::exit_codes::{EXIT_HISTORY_IO, EXIT_LOAD_FAILED, EXIT_RULESET_INVALID};
use crate::{print_json, CliError};

pub struct CalcArgs {
    pub rules: PathBuf,
    pub files: Vec<PathBuf>,
    pub label: Option<String>,
    pub json: bool,
    /// Where to record the result; `None` with `--no-history`.
    pub history: Option<PathBuf>,
    pub trace: bool,
    pub keep_going: bool,
}

#[derive(Serialize)]
struct CalcOutput<'a> {
    label: &'a str,
    total: f64,
    summary: String,
    files: Vec<FileSummary<'a>>,
    steps: &'a [RuleStep],
    recorded: bool,
}

#[derive(Serialize)]
struct FileSummary<'a> {
    id: &'a str,
    name: &'a str,
    sheets: Vec<&'a str>,
}

pub fn cmd_calc(settings: &Settings, args: CalcArgs) -> Result<(), CliError> {
    let text = std::fs::read_to_string(&args.rules)
        .map_err(|e| CliError::args(format!("cannot read {}: {}", args.rules.display(), e)))?;
    let set = RuleSet::from_toml(&text).map_err(|e| {
        CliError::new(EXIT_RULESET_INVALID, format!("{}: {}", args.rules.display(), e))
    })?;

    // Files listed in the rule set are relative to it
    let base_dir = args.rules.parent().map(Path::to_path_buf).unwrap_or_default();
    let mut pool = FilePool::with_capacity(settings.pool_max_files);
    let mut aliases: HashMap<String, FileId> = HashMap::new();

    for spec in &set.files {
        let path = base_dir.join(&spec.path);
        if let Some(id) = open_file(&mut pool, &path, args.keep_going)? {
            aliases.insert(spec.path.clone(), id.clone());
            if let Some(alias) = &spec.alias {
                aliases.insert(alias.clone(), id);
            }
        }
    }
    for path in &args.files {
        if let Some(id) = open_file(&mut pool, path, args.keep_going)? {
            aliases.insert(path.to_string_lossy().into_owned(), id);
        }
    }

    let flat = set.flatten(|file| match file {
        None => pool.first().map(|w| w.id.clone()),
        Some(reference) => aliases
            .get(reference)
            .cloned()
            .or_else(|| pool.find(reference).map(|w| w.id.clone())),
    });

    let evaluation = evaluate_traced(&flat.rules, &flat.conditions, &pool);
    log::info!("{} rules evaluated, total {}", flat.rules.len(), evaluation.total);

    let label = args
        .label
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .or(set.label())
        .unwrap_or(&settings.default_label)
        .to_string();

    // Only non-zero results are worth remembering
    let recorded = match &args.history {
        Some(path) if evaluation.total != 0.0 => {
            let file_name = history_file_name(&flat.rules, &pool);
            let store = HistoryStore::new(path).with_limit(settings.history_limit);
            store.add(&file_name, &label, evaluation.total).map_err(|e| {
                CliError::new(
                    EXIT_HISTORY_IO,
                    format!("result {} not recorded: {}", settings.format_result(evaluation.total), e),
                )
                .with_hint("pass --no-history, or --history <PATH> to write elsewhere")
            })?;
            true
        }
        _ => false,
    };

    if args.json {
        let output = CalcOutput {
            label: &label,
            total: evaluation.total,
            summary: evaluation.describe(),
            files: pool
                .files()
                .map(|w| FileSummary { id: w.id.as_str(), name: &w.name, sheets: w.sheet_names() })
                .collect(),
            steps: &evaluation.steps,
            recorded,
        };
        return print_json(&output);
    }

    if args.trace {
        let rules = flat.rules.iter().zip(&flat.descriptions);
        for (step, (rule, description)) in evaluation.steps.iter().zip(rules) {
            println!("{}", step_line(step, rule, description.as_deref(), &pool, settings));
        }
        println!("{}", evaluation.describe());
    }
    println!("{}", settings.format_result(evaluation.total));

    Ok(())
}

/// Load into the pool. With `keep_going`, failures are logged and skipped.
fn open_file(pool: &mut FilePool, path: &Path, keep_going: bool) -> Result<Option<FileId>, CliError> {
    match pool.open(path) {
        Ok(wb) => Ok(Some(wb.id.clone())),
        Err(e) if keep_going => {
            log::warn!("skipping {}: {}", path.display(), e);
            Ok(None)
        }
        Err(e @ PoolError::Full { .. }) => Err(CliError::new(EXIT_LOAD_FAILED, e.to_string())
            .with_hint("raise \"pool.maxFiles\" in settings.json")),
        Err(e) => Err(CliError::new(EXIT_LOAD_FAILED, e.to_string())
            .with_hint("use --keep-going to evaluate without this file")),
    }
}

/// Display name of the file the first sheet rule reads, else the first loaded file.
fn history_file_name(rules: &[Rule], pool: &FilePool) -> String {
    rules
        .iter()
        .filter_map(|r| r.reference.sheet())
        .find_map(|key| pool.get(&key.file))
        .or_else(|| pool.first())
        .map(|w| w.name.clone())
        .unwrap_or_default()
}

fn step_line(
    step: &RuleStep,
    rule: &Rule,
    description: Option<&str>,
    pool: &FilePool,
    settings: &Settings,
) -> String {
    let target = match rule.reference.sheet() {
        Some(key) => {
            let file = pool.get(&key.file).map(|w| w.name.as_str()).unwrap_or(key.file.as_str());
            format!("{}!{}", file, key.sheet)
        }
        // Custom values are identified by their note
        None => description.unwrap_or("-").to_string(),
    };
    let rows = match (step.outcome, step.rows) {
        (StepOutcome::MissingSheet, _) => "not loaded".to_string(),
        (_, Some(n)) => format!("{} rows", n),
        (_, None) => "-".to_string(),
    };

    let mut line = format!(
        "rule {:>2} [{:<3}] {:<6} {:<28} {:>10}  +{}",
        step.index + 1,
        step.logic.to_string(),
        step.kind.to_string(),
        target,
        rows,
        settings.format_result(step.contribution)
    );
    if let (Some(note), Some(_)) = (description, rule.reference.sheet()) {
        line.push_str("  # ");
        line.push_str(note);
    }
    line
}
