//! CLI integration tests for `refit parse` / `refit check`.
//!
//! These tests invoke the compiled binary against the rule files under
//! `demos/rules`.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use pretty_assertions::assert_eq;

const OBJECTS_EQUALS: &str = include_str!("../../../demos/rules/objects_equals.json");
const MAX_DIFFERENCE: &str = include_str!("../../../demos/rules/max_difference.json");
const DEMO_SOURCE: &str = include_str!("../../../demos/Test.java");

fn refit_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_refit"))
}

struct Workspace {
    dir: tempfile::TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create tempdir"),
        }
    }

    fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, contents).expect("write file");
        path
    }
}

fn run(args: &[&str]) -> Output {
    refit_bin().args(args).output().expect("run binary")
}

fn path_str(path: &Path) -> &str {
    path.to_str().expect("utf-8 path")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn parse_dumps_json() {
    let ws = Workspace::new();
    let file = ws.write("Test.java", DEMO_SOURCE);

    let output = run(&["parse", path_str(&file), "--format", "json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let unit: serde_json::Value = serde_json::from_str(&stdout(&output)).expect("valid JSON");
    assert_eq!(unit["classes"][0]["name"]["text"], "Test");
}

#[test]
fn parse_reports_syntax_errors() {
    let ws = Workspace::new();
    let file = ws.write("Broken.java", "class Broken { int m( { }");

    let output = run(&["parse", path_str(&file)]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Error"), "stderr: {}", stderr(&output));
}

#[test]
fn check_reports_matches_in_text() {
    let ws = Workspace::new();
    let file = ws.write("Test.java", DEMO_SOURCE);
    let rules = ws.write("objects_equals.json", OBJECTS_EQUALS);

    let output = run(&["check", path_str(&file), "--rules", path_str(&rules)]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let out = stdout(&output);
    assert!(out.contains(":9:9: warning: [ObjectsEquals] use Objects.equals"), "{out}");
    assert!(out.contains("replace `!x.equals(y)` with `!Objects.equals(x, y)`"), "{out}");
    assert!(out.contains("add import java.util.Objects"), "{out}");
    assert!(out.contains("2 matches"), "{out}");

    // Reporting alone leaves the file untouched.
    assert_eq!(std::fs::read_to_string(&file).unwrap(), DEMO_SOURCE);
}

#[test]
fn check_reports_matches_in_json() {
    let ws = Workspace::new();
    let file = ws.write("Test.java", DEMO_SOURCE);
    let rules = ws.write("max.json", MAX_DIFFERENCE);

    let output = run(&[
        "check",
        path_str(&file),
        "--rules",
        path_str(&rules),
        "--format",
        "json",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).expect("valid JSON");
    let matches = report["matches"].as_array().expect("matches");
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0]["checker"], "MaxAsConditional");
    assert_eq!(matches[0]["severity"], "suggestion");
    assert_eq!(matches[0]["line"], 5);
    assert_eq!(
        matches[0]["fix"]["replacements"][0]["text"],
        "(x >= y ? x : y)"
    );
}

#[test]
fn check_applies_fixes_from_several_rule_files() {
    let ws = Workspace::new();
    let file = ws.write("Test.java", DEMO_SOURCE);
    let equals = ws.write("objects_equals.json", OBJECTS_EQUALS);
    let max = ws.write("max.json", MAX_DIFFERENCE);

    let output = run(&[
        "check",
        path_str(&file),
        "--rules",
        path_str(&equals),
        path_str(&max),
        "--apply",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stderr(&output).contains("Rewrote"), "stderr: {}", stderr(&output));

    assert_eq!(
        std::fs::read_to_string(&file).unwrap(),
        "package com.example;

import java.util.Objects;

class Test {
  int bound(int x, int y) {
    return 2 * (x >= y ? x : y);
  }

  void check(String x, String y) {
    if (!Objects.equals(x, y)) {
      x = y;
    }
  }
}
"
    );
}

#[test]
fn import_policy_flag_overrides_rule_files() {
    let ws = Workspace::new();
    let file = ws.write("Test.java", DEMO_SOURCE);
    let rules = ws.write("objects_equals.json", OBJECTS_EQUALS);

    let output = run(&[
        "check",
        path_str(&file),
        "--rules",
        path_str(&rules),
        "--import-policy",
        "fully-qualified",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let out = stdout(&output);
    assert!(out.contains("with `!java.util.Objects.equals(x, y)`"), "{out}");
    assert!(!out.contains("add import"), "{out}");
}

#[test]
fn malformed_rule_file_is_an_error() {
    let ws = Workspace::new();
    let file = ws.write("Test.java", DEMO_SOURCE);
    let rules = ws.write("bad.json", "{\"rules\": [{\"name\": \"Half\"}]}");

    let output = run(&["check", path_str(&file), "--rules", path_str(&rules)]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("bad.json"), "stderr: {}", stderr(&output));
}

#[test]
fn oversized_source_is_rejected() {
    let ws = Workspace::new();
    let body = "// padding\n".repeat(refit_cli::MAX_SOURCE_SIZE / 10);
    let file = ws.write("Huge.java", &format!("class Huge {{}}\n{body}"));

    let output = run(&["parse", path_str(&file)]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("1MB limit"), "stderr: {}", stderr(&output));
}
