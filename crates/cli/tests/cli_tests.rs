// End-to-end tests for the sheetsum binary.
// Run with: cargo test -p sheetsum-cli --test cli_tests
//
// Each test builds its own workbook and rule set in a temp dir and points
// --history into it. Settings come from <dir>/settings.json, which most
// tests never write, so the defaults apply regardless of the user's config.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use rust_xlsxwriter::Workbook;
use tempfile::TempDir;

fn sheetsum(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_sheetsum"));
    cmd.current_dir(dir);
    cmd.env("SHEETSUM_CONFIG", dir.join("settings.json"));
    cmd.env("XDG_CONFIG_HOME", dir);
    cmd.env("HOME", dir);
    cmd.env_remove("SHEETSUM_HISTORY");
    cmd.env_remove("RUST_LOG");
    cmd
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

/// sales.xlsx with a "Sales" sheet:
/// Name | Amt | Region
/// test-1 | 50 | north
/// ok-1 | 100 | south
/// ok-2 | 200 | north
fn write_sales(dir: &Path) -> PathBuf {
    let path = dir.join("sales.xlsx");
    let mut book = Workbook::new();
    let sheet = book.add_worksheet();
    sheet.set_name("Sales").unwrap();

    let rows: [(&str, f64, &str); 3] = [("test-1", 50.0, "north"), ("ok-1", 100.0, "south"), ("ok-2", 200.0, "north")];
    sheet.write_string(0, 0, "Name").unwrap();
    sheet.write_string(0, 1, "Amt").unwrap();
    sheet.write_string(0, 2, "Region").unwrap();
    for (i, (name, amt, region)) in rows.iter().enumerate() {
        let r = i as u32 + 1;
        sheet.write_string(r, 0, *name).unwrap();
        sheet.write_number(r, 1, *amt).unwrap();
        sheet.write_string(r, 2, *region).unwrap();
    }
    book.save(&path).unwrap();
    path
}

const SALES_RULES: &str = r#"
name = "Sales without tests"

[[files]]
alias = "sales"
path = "sales.xlsx"

[[rules]]
kind = "column"
file = "sales"
sheet = "Sales"
column = "B"
start_row = 2
end_row = 4

[[rules.conditions]]
column = "A"
keyword = "test"
mode = "exclude"
"#;

fn setup(rules: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    write_sales(dir.path());
    let rules_path = dir.path().join("rules.toml");
    std::fs::write(&rules_path, rules).unwrap();
    (dir, rules_path)
}

fn history(dir: &Path) -> serde_json::Value {
    let text = std::fs::read_to_string(dir.join("history.json")).unwrap();
    serde_json::from_str(&text).unwrap()
}

// -------------------------------------------------------------------------
// calc
// -------------------------------------------------------------------------

#[test]
fn calc_prints_total_and_records_history() {
    let (dir, rules) = setup(SALES_RULES);

    let out = sheetsum(dir.path())
        .args(["calc", rules.to_str().unwrap(), "--history", "history.json"])
        .output()
        .unwrap();

    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert_eq!(stdout(&out).trim(), "300.00");

    let entries = history(dir.path());
    assert_eq!(entries.as_array().unwrap().len(), 1);
    assert_eq!(entries[0]["fileName"], "sales.xlsx");
    assert_eq!(entries[0]["sheetName"], "Sales without tests");
    assert_eq!(entries[0]["result"], 300.0);
}

#[test]
fn calc_label_overrides_name() {
    let (dir, rules) = setup(SALES_RULES);

    let out = sheetsum(dir.path())
        .args(["calc", rules.to_str().unwrap(), "--history", "history.json", "--label", "March"])
        .output()
        .unwrap();
    assert!(out.status.success());

    let out = sheetsum(dir.path())
        .args(["calc", rules.to_str().unwrap(), "--history", "history.json"])
        .output()
        .unwrap();
    assert!(out.status.success());

    let entries = history(dir.path());
    assert_eq!(entries[0]["sheetName"], "Sales without tests");
    assert_eq!(entries[1]["sheetName"], "March");
}

#[test]
fn calc_json_without_history() {
    let (dir, rules) = setup(SALES_RULES);

    let out = sheetsum(dir.path())
        .args(["calc", rules.to_str().unwrap(), "--json", "--no-history", "--history", "history.json"])
        .output()
        .unwrap();
    assert!(out.status.success(), "stderr: {}", stderr(&out));

    let json: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(json["total"], 300.0);
    assert_eq!(json["label"], "Sales without tests");
    assert_eq!(json["recorded"], false);
    assert_eq!(json["files"][0]["name"], "sales.xlsx");
    assert_eq!(json["steps"][0]["rows"], 3);
    assert_eq!(json["steps"][0]["outcome"], "applied");
    assert_eq!(json["summary"], "Rule 1: 1 filter condition → result: 300");
    assert!(!dir.path().join("history.json").exists());
}

#[test]
fn calc_zero_total_not_recorded() {
    let (dir, rules) = setup(
        r#"
[[rules]]
kind = "custom"
value = 0
"#,
    );

    let out = sheetsum(dir.path())
        .args(["calc", rules.to_str().unwrap(), "--history", "history.json"])
        .output()
        .unwrap();
    assert!(out.status.success());
    assert_eq!(stdout(&out).trim(), "0.00");
    assert!(!dir.path().join("history.json").exists());
}

#[test]
fn calc_trace_shows_each_rule() {
    let (dir, rules) = setup(
        r#"
[[files]]
path = "sales.xlsx"

[[rules]]
kind = "column"
sheet = "Sales"
column = "B"
description = "north only"

[[rules.conditions]]
column = "C"
keyword = "north"
mode = "include"

[[rules]]
kind = "cell"
logic = "or"
sheet = "Sales"
cell = "B3"

[[rules]]
kind = "cell"
sheet = "Missing"
cell = "A1"
"#,
    );

    let out = sheetsum(dir.path())
        .args(["calc", rules.to_str().unwrap(), "--trace", "--no-history"])
        .output()
        .unwrap();
    assert!(out.status.success(), "stderr: {}", stderr(&out));

    let text = stdout(&out);
    let lines: Vec<&str> = text.lines().collect();
    // 250 north + 100 from B3 of the unfiltered sheet
    assert_eq!(lines.last().copied(), Some("350.00"));
    assert!(lines[0].contains("sales.xlsx!Sales"));
    assert!(lines[0].contains("2 rows"));
    assert!(lines[0].ends_with("# north only"));
    assert!(lines[2].contains("not loaded"));
    assert!(text.contains("Rule 1: 1 filter condition → [OR] Rule 2: no filters → [AND] Rule 3: no filters → result: 350"));
}

#[test]
fn calc_trace_names_custom_values() {
    let (dir, rules) = setup(
        r#"
[[rules]]
kind = "custom"
value = 12.5
description = "petty cash"

[[rules]]
kind = "custom"
value = 1
"#,
    );

    let out = sheetsum(dir.path())
        .args(["calc", rules.to_str().unwrap(), "--trace", "--no-history"])
        .output()
        .unwrap();
    assert!(out.status.success(), "stderr: {}", stderr(&out));

    let text = stdout(&out);
    let lines: Vec<&str> = text.lines().collect();
    assert!(lines[0].contains("petty cash"));
    assert!(lines[0].contains("+12.50"));
    assert!(!lines[1].contains('#'));
    assert_eq!(lines.last().copied(), Some("13.50"));
}

#[test]
fn calc_reads_settings_from_config_file() {
    let (dir, rules) = setup(SALES_RULES);
    std::fs::write(
        dir.path().join("settings.json"),
        r#"{ "result.decimals": 0 }"#,
    )
    .unwrap();

    let out = sheetsum(dir.path())
        .args(["calc", rules.to_str().unwrap(), "--no-history"])
        .output()
        .unwrap();
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert_eq!(stdout(&out).trim(), "300");

    // --config wins over the environment
    let other = dir.path().join("other.json");
    std::fs::write(&other, r#"{ "result.decimals": 3 }"#).unwrap();
    let out = sheetsum(dir.path())
        .args(["calc", rules.to_str().unwrap(), "--no-history", "--config"])
        .arg(&other)
        .output()
        .unwrap();
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert_eq!(stdout(&out).trim(), "300.000");
}

#[test]
fn calc_positional_csv_by_display_name() {
    let (dir, rules) = setup(
        r#"
[[rules]]
kind = "row"
file = "extra.csv"
sheet = "extra"
row = 2

[[rules]]
kind = "custom"
value = 0.25
"#,
    );
    std::fs::write(dir.path().join("extra.csv"), "a,b\n\"1,000\",$5\n").unwrap();

    let out = sheetsum(dir.path())
        .args(["calc", rules.to_str().unwrap(), "extra.csv", "--no-history"])
        .output()
        .unwrap();
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert_eq!(stdout(&out).trim(), "1005.25");
}

#[test]
fn calc_invalid_rule_set_exit_3() {
    let (dir, rules) = setup(
        r#"
[[rules]]
kind = "cell"
sheet = "Sales"
"#,
    );

    let out = sheetsum(dir.path())
        .args(["calc", rules.to_str().unwrap(), "--no-history"])
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(3));
    assert!(stderr(&out).contains("error: "));
    assert!(stderr(&out).contains("requires 'cell'"));
}

#[test]
fn calc_missing_rules_file_exit_2() {
    let dir = tempfile::tempdir().unwrap();
    let out = sheetsum(dir.path())
        .args(["calc", "nope.toml", "--no-history"])
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn calc_unloadable_file_exit_4_unless_keep_going() {
    let (dir, rules) = setup(
        r#"
[[files]]
path = "gone.xlsx"

[[rules]]
kind = "cell"
file = "gone.xlsx"
sheet = "Sales"
cell = "B2"

[[rules]]
kind = "custom"
value = 7
"#,
    );

    let out = sheetsum(dir.path())
        .args(["calc", rules.to_str().unwrap(), "--no-history"])
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(4));
    assert!(stderr(&out).contains("hint:"));

    let out = sheetsum(dir.path())
        .args(["calc", rules.to_str().unwrap(), "--no-history", "--keep-going"])
        .output()
        .unwrap();
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert_eq!(stdout(&out).trim(), "7.00");
}

#[test]
fn calc_history_unwritable_exit_5() {
    let (dir, rules) = setup(SALES_RULES);
    // A directory where the history file should be
    std::fs::create_dir(dir.path().join("history.json")).unwrap();

    let out = sheetsum(dir.path())
        .args(["calc", rules.to_str().unwrap(), "--history", "history.json"])
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(5));
}

// -------------------------------------------------------------------------
// sheets / history
// -------------------------------------------------------------------------

#[test]
fn sheets_lists_preview() {
    let dir = tempfile::tempdir().unwrap();
    write_sales(dir.path());

    let out = sheetsum(dir.path()).args(["sheets", "sales.xlsx"]).output().unwrap();
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let text = stdout(&out);
    assert!(text.contains("Sales  4 rows x 3 cols"));
    assert!(text.contains("test-1"));
    assert!(!text.contains("ok-2"));

    let out = sheetsum(dir.path()).args(["sheets", "sales.xlsx", "--json"]).output().unwrap();
    let json: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(json[0]["name"], "Sales");
    assert_eq!(json[0]["rows"], 4);
    assert_eq!(json[0]["preview"].as_array().unwrap().len(), 3);
    assert_eq!(json[0]["preview"][1][1], 50.0);
}

#[test]
fn sheets_unsupported_file_exit_4() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("notes.pdf"), "x").unwrap();

    let out = sheetsum(dir.path()).args(["sheets", "notes.pdf"]).output().unwrap();
    assert_eq!(out.status.code(), Some(4));
}

#[test]
fn history_list_and_clear() {
    let (dir, rules) = setup(SALES_RULES);
    for label in ["one", "two", "three"] {
        let out = sheetsum(dir.path())
            .args(["calc", rules.to_str().unwrap(), "--history", "history.json", "--label", label])
            .output()
            .unwrap();
        assert!(out.status.success());
    }

    let out = sheetsum(dir.path())
        .args(["history", "list", "--json", "--limit", "2", "--history", "history.json"])
        .output()
        .unwrap();
    let json: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    let labels: Vec<&str> = json.as_array().unwrap().iter().map(|e| e["sheetName"].as_str().unwrap()).collect();
    assert_eq!(labels, vec!["three", "two"]);

    let out = sheetsum(dir.path())
        .args(["history", "list", "--history", "history.json"])
        .output()
        .unwrap();
    assert_eq!(stdout(&out).lines().count(), 3);
    assert!(stdout(&out).contains("300.00"));

    let out = sheetsum(dir.path())
        .args(["history", "clear", "--history", "history.json"])
        .output()
        .unwrap();
    assert!(out.status.success());
    assert_eq!(std::fs::read_to_string(dir.path().join("history.json")).unwrap(), "[]");

    let out = sheetsum(dir.path())
        .args(["history", "list", "--history", "history.json"])
        .output()
        .unwrap();
    assert_eq!(stdout(&out).trim(), "No history.");
}
