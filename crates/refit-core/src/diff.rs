//! Applies the fixes of reported descriptions to a unit's source text.

use std::collections::BTreeSet;

use refit_ast::ast::CompilationUnit;
use refit_ast::span::Span;
use thiserror::Error;

use crate::description::{Description, DescriptionListener};
use crate::fix::Replacement;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiffError {
    #[error("overlapping replacements at {first:?} and {second:?}")]
    Overlap { first: Span, second: Span },
    #[error("replacement at {span:?} is outside the source ({len} bytes)")]
    OutOfBounds { span: Span, len: usize },
}

/// Collects the fixes of every description reported for one unit.
#[derive(Debug)]
pub struct DescriptionBasedDiff<'a> {
    unit: &'a CompilationUnit,
    ignore_overlaps: bool,
    replacements: Vec<Replacement>,
    imports_to_add: BTreeSet<String>,
}

impl<'a> DescriptionBasedDiff<'a> {
    pub fn new(unit: &'a CompilationUnit) -> Self {
        Self {
            unit,
            ignore_overlaps: false,
            replacements: Vec::new(),
            imports_to_add: BTreeSet::new(),
        }
    }

    /// A diff that drops any fix overlapping one reported earlier instead
    /// of failing.
    pub fn ignoring_overlaps(unit: &'a CompilationUnit) -> Self {
        Self {
            ignore_overlaps: true,
            ..Self::new(unit)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.replacements.is_empty() && self.imports_to_add.is_empty()
    }

    fn overlaps(&self, r: &Replacement) -> bool {
        self.replacements
            .iter()
            .any(|e| e != r && e.span.start < r.span.end && r.span.start < e.span.end)
    }

    /// Returns `source` with every collected replacement and import applied.
    pub fn apply_differences(&self, source: &str) -> Result<String, DiffError> {
        let mut edits: Vec<Replacement> = Vec::new();
        for r in &self.replacements {
            if r.span.end as usize > source.len()
                || r.span.start > r.span.end
                || !source.is_char_boundary(r.span.start as usize)
                || !source.is_char_boundary(r.span.end as usize)
            {
                return Err(DiffError::OutOfBounds {
                    span: r.span,
                    len: source.len(),
                });
            }
            if !edits.contains(r) {
                edits.push(r.clone());
            }
        }
        edits.sort_by_key(|r| (r.span.start, r.span.end));
        for pair in edits.windows(2) {
            if pair[0].span.end > pair[1].span.start {
                return Err(DiffError::Overlap {
                    first: pair[0].span,
                    second: pair[1].span,
                });
            }
        }
        if let Some(insertion) = self.import_insertion(source) {
            // Zero width; sorts before a replacement starting at the same offset.
            let at = edits.partition_point(|e| e.span.start < insertion.span.start);
            edits.insert(at, insertion);
        }

        let mut out = String::with_capacity(source.len());
        let mut pos = 0;
        for edit in &edits {
            let start = edit.span.start as usize;
            out.push_str(&source[pos..start]);
            out.push_str(&edit.text);
            pos = edit.span.end as usize;
        }
        out.push_str(&source[pos..]);
        Ok(out)
    }

    /// The import declarations still missing from the unit, as one
    /// insertion after the last import, after the package declaration, or
    /// at the top of the file.
    fn import_insertion(&self, source: &str) -> Option<Replacement> {
        let existing: BTreeSet<String> = self
            .unit
            .imports
            .iter()
            .filter(|i| !i.on_demand)
            .map(|i| i.name.text())
            .collect();
        let missing: Vec<&String> = self
            .imports_to_add
            .iter()
            .filter(|i| !existing.contains(*i))
            .collect();
        if missing.is_empty() {
            return None;
        }

        let lines = |prefix: &str| {
            missing
                .iter()
                .map(|i| format!("{prefix}import {i};"))
                .collect::<String>()
        };
        let (offset, text) = if let Some(last) = self.unit.imports.last() {
            (last.span.end, lines("\n"))
        } else if let Some(package) = &self.unit.package {
            let end = package.span.end as usize;
            let semi = source
                .get(end..)
                .and_then(|rest| rest.find(';'))
                .map_or(end, |i| end + i + 1);
            let text = format!("\n{}", lines("\n"));
            (semi as u32, text)
        } else {
            let text = missing
                .iter()
                .map(|i| format!("import {i};\n"))
                .collect::<String>();
            (0, text + "\n")
        };
        Some(Replacement {
            span: Span::new(offset, offset),
            text,
        })
    }
}

impl DescriptionListener for DescriptionBasedDiff<'_> {
    fn on_described(&mut self, description: Description) {
        let fix = description.fix;
        if self.ignore_overlaps && fix.replacements().iter().any(|r| self.overlaps(r)) {
            return;
        }
        self.replacements.extend(fix.replacements().iter().cloned());
        self.imports_to_add
            .extend(fix.imports_to_add().iter().cloned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::description::Severity;
    use crate::fix::SuggestedFix;
    use pretty_assertions::assert_eq;
    use refit_parse::parse_str;

    const SOURCE: &str = "package foo.bar;
class Foo {
  public static void main(String[] args) {
    System.out.println(\"foo\");
  }
}";

    fn describe(fix: SuggestedFix) -> Description {
        Description {
            checker: "test".into(),
            span: Span::DUMMY,
            message: "message".into(),
            fix,
            severity: Severity::NotAProblem,
        }
    }

    fn apply(fixes: Vec<SuggestedFix>) -> String {
        let unit = parse_str("<test>", SOURCE).expect("parse failed");
        let mut diff = DescriptionBasedDiff::new(&unit);
        for fix in fixes {
            diff.on_described(describe(fix));
        }
        diff.apply_differences(SOURCE).expect("diff failed")
    }

    #[test]
    fn no_diffs() {
        assert_eq!(apply(vec![]), SOURCE);
    }

    #[test]
    fn one_diff() {
        let fix = SuggestedFix::builder()
            .replace(Span::new(96, 99), "bar")
            .build();
        assert_eq!(apply(vec![fix]), SOURCE.replace("\"foo\"", "\"bar\""));
    }

    #[test]
    fn two_diffs() {
        let fix = SuggestedFix::builder()
            .replace(Span::new(83, 86), "longer")
            .replace(Span::new(96, 99), "bar")
            .build();
        assert_eq!(
            apply(vec![fix]),
            "package foo.bar;
class Foo {
  public static void main(String[] args) {
    System.longer.println(\"bar\");
  }
}"
        );
    }

    #[test]
    fn add_import() {
        let fix = SuggestedFix::builder()
            .add_import("com.google.foo.Bar")
            .build();
        assert_eq!(
            apply(vec![fix]),
            "package foo.bar;

import com.google.foo.Bar;
class Foo {
  public static void main(String[] args) {
    System.out.println(\"foo\");
  }
}"
        );
    }

    #[test]
    fn two_diffs_with_import() {
        let fix = SuggestedFix::builder()
            .replace(Span::new(83, 86), "longer")
            .replace(Span::new(96, 99), "bar")
            .add_import("com.google.foo.Bar")
            .build();
        assert_eq!(
            apply(vec![fix]),
            "package foo.bar;

import com.google.foo.Bar;
class Foo {
  public static void main(String[] args) {
    System.longer.println(\"bar\");
  }
}"
        );
    }

    #[test]
    fn imports_follow_existing_ones_and_are_not_duplicated() {
        let source = "import java.util.List;\nclass A {}";
        let unit = parse_str("<test>", source).expect("parse failed");
        let mut diff = DescriptionBasedDiff::new(&unit);
        diff.on_described(describe(
            SuggestedFix::builder()
                .add_import("java.util.List")
                .add_import("java.util.Objects")
                .build(),
        ));
        assert_eq!(
            diff.apply_differences(source).unwrap(),
            "import java.util.List;\nimport java.util.Objects;\nclass A {}"
        );
    }

    #[test]
    fn overlapping_fixes_fail_unless_ignored() {
        let unit = parse_str("<test>", SOURCE).expect("parse failed");
        let outer = SuggestedFix::builder()
            .replace(Span::new(83, 99), "x")
            .build();
        let inner = SuggestedFix::builder()
            .replace(Span::new(96, 99), "bar")
            .build();

        let mut strict = DescriptionBasedDiff::new(&unit);
        strict.on_described(describe(outer.clone()));
        strict.on_described(describe(inner.clone()));
        assert!(matches!(
            strict.apply_differences(SOURCE),
            Err(DiffError::Overlap { .. })
        ));

        let mut lenient = DescriptionBasedDiff::ignoring_overlaps(&unit);
        lenient.on_described(describe(outer));
        lenient.on_described(describe(inner));
        let out = lenient.apply_differences(SOURCE).unwrap();
        assert!(out.contains("    System.x\");"), "{out}");
    }

    #[test]
    fn out_of_bounds_is_rejected() {
        let unit = parse_str("<test>", "class A {}").expect("parse failed");
        let mut diff = DescriptionBasedDiff::new(&unit);
        diff.on_described(describe(
            SuggestedFix::builder().replace(Span::new(5, 50), "x").build(),
        ));
        assert!(matches!(
            diff.apply_differences("class A {}"),
            Err(DiffError::OutOfBounds { .. })
        ));
    }
}
