//! Text and JSON renderings of a check report.

use std::fmt::Write;

use refit_core::{Description, Severity};
use serde::Serialize;

use crate::check::CheckReport;

/// 1-based line and column of byte `offset` in `src`.
pub fn line_col(src: &str, offset: u32) -> (usize, usize) {
    let offset = (offset as usize).min(src.len());
    let before = &src[..offset];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    (line, before[line_start..].chars().count() + 1)
}

fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
        Severity::Suggestion => "suggestion",
        Severity::NotAProblem => "note",
    }
}

/// One block per description:
///
/// ```text
/// Test.java:5:9: warning: [ObjectsEquals] ObjectsEquals: this can be rewritten
///   replace `!x.equals(y)` with `!Objects.equals(x, y)`
///   add import java.util.Objects
/// ```
pub fn render_text(file: &str, src: &str, report: &CheckReport) -> String {
    let mut out = String::new();
    for d in &report.descriptions {
        // Writing into a String cannot fail.
        let _ = write_description(&mut out, file, src, d);
    }
    let _ = match report.descriptions.len() {
        0 => writeln!(out, "{file}: no matches"),
        1 => writeln!(out, "{file}: 1 match"),
        n => writeln!(out, "{file}: {n} matches"),
    };
    out
}

fn write_description(out: &mut String, file: &str, src: &str, d: &Description) -> std::fmt::Result {
    let (line, col) = line_col(src, d.span.start);
    writeln!(
        out,
        "{file}:{line}:{col}: {}: [{}] {}",
        severity_label(d.severity),
        d.checker,
        d.message
    )?;
    for r in d.fix.replacements() {
        let old = src.get(r.span.range()).unwrap_or_default();
        writeln!(out, "  replace `{}` with `{}`", old, r.text)?;
    }
    for import in d.fix.imports_to_add() {
        writeln!(out, "  add import {import}")?;
    }
    Ok(())
}

#[derive(Serialize)]
struct JsonReport<'a> {
    file: &'a str,
    matches: Vec<JsonMatch<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rewritten: Option<&'a str>,
}

#[derive(Serialize)]
struct JsonMatch<'a> {
    line: usize,
    column: usize,
    #[serde(flatten)]
    description: &'a Description,
}

pub fn render_json(file: &str, src: &str, report: &CheckReport) -> serde_json::Result<String> {
    let matches = report
        .descriptions
        .iter()
        .map(|description| {
            let (line, column) = line_col(src, description.span.start);
            JsonMatch {
                line,
                column,
                description,
            }
        })
        .collect();
    serde_json::to_string_pretty(&JsonReport {
        file,
        matches,
        rewritten: report.rewritten.as_deref(),
    })
}
