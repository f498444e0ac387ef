use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use refit_core::{
    CodeTransformer, Description, DescriptionBasedDiff, DescriptionListener, HostContext,
    ImportPolicy, RefasterRule, RuleSet,
};
use refit_parse::parse_and_attribute;
use refit_types::ClassPath;
use tracing::{debug, info};

/// Maximum source file size in bytes (1MB)
pub const MAX_SOURCE_SIZE: usize = 1_000_000;

pub fn read_source(path: &Path) -> Result<String> {
    let src = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read `{}`", path.display()))?;
    if src.len() > MAX_SOURCE_SIZE {
        bail!(
            "source file exceeds {}MB limit ({} bytes)",
            MAX_SOURCE_SIZE / 1_000_000,
            src.len()
        );
    }
    Ok(src)
}

/// Loads every rule of every file, in order. `policy` overrides the
/// import policy the files ask for.
pub fn load_rules(paths: &[PathBuf], policy: Option<ImportPolicy>) -> Result<Vec<RefasterRule>> {
    let mut rules = Vec::new();
    for path in paths {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read rule file `{}`", path.display()))?;
        let mut set = RuleSet::from_json(&text)
            .with_context(|| format!("in rule file `{}`", path.display()))?;
        if let Some(policy) = policy {
            set = set.with_import_policy(policy);
        }
        let built = set
            .build()
            .with_context(|| format!("in rule file `{}`", path.display()))?;
        debug!(file = %path.display(), rules = built.len(), "loaded rule file");
        rules.extend(built);
    }
    Ok(rules)
}

#[derive(Debug)]
pub struct CheckReport {
    pub descriptions: Vec<Description>,
    /// The source with every fix applied, when asked for.
    pub rewritten: Option<String>,
}

/// Attributes `src` against the built-in class path and runs `transformer`
/// over it. With `apply`, fixes that overlap an earlier one are dropped
/// and the rest are applied to the text.
pub fn check_source(
    file: &str,
    src: &str,
    transformer: &dyn CodeTransformer,
    apply: bool,
) -> Result<CheckReport> {
    let mut classpath = ClassPath::with_builtins();
    let unit = parse_and_attribute(file, src, &mut classpath)?;
    let ctx = HostContext::new(src, &unit, &classpath);

    let mut descriptions = Vec::new();
    transformer.apply(&ctx, &mut descriptions);
    info!(file, found = descriptions.len(), "checked");

    let rewritten = if apply {
        let mut diff = DescriptionBasedDiff::ignoring_overlaps(&unit);
        for description in &descriptions {
            diff.on_described(description.clone());
        }
        Some(
            diff.apply_differences(src)
                .with_context(|| format!("failed to apply fixes to `{file}`"))?,
        )
    } else {
        None
    };

    Ok(CheckReport {
        descriptions,
        rewritten,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use refit_core::CompositeCodeTransformer;

    const RULES: &str = r#"{"rules": [{
        "name": "StringIsEmpty",
        "before": [{
            "kind": "expression",
            "expression_argument_types": {"s": {"kind": "class", "name": "java.lang.String"}},
            "expression": {
                "kind": "binary",
                "lhs": {"kind": "method_invocation",
                        "method": {"kind": "member_select", "expr": {"kind": "free", "name": "s"}, "name": "length"},
                        "args": []},
                "op": "Eq",
                "rhs": {"kind": "literal", "value": {"int": 0}}
            },
            "return_type": {"kind": "primitive", "prim": "boolean"}
        }],
        "after": {
            "kind": "expression",
            "expression": {"kind": "method_invocation",
                           "method": {"kind": "member_select", "expr": {"kind": "free", "name": "s"}, "name": "isEmpty"},
                           "args": []},
            "return_type": {"kind": "primitive", "prim": "boolean"}
        }
    }]}"#;

    const SOURCE: &str = "class T {
  boolean m(String s) {
    return s.length() == 0;
  }
}
";

    fn transformer() -> CompositeCodeTransformer {
        let rules = RuleSet::from_json(RULES).unwrap().build().unwrap();
        CompositeCodeTransformer::new(
            rules
                .into_iter()
                .map(|r| Box::new(r) as Box<dyn CodeTransformer>)
                .collect(),
        )
    }

    #[test]
    fn reports_without_rewriting() {
        let report = check_source("T.java", SOURCE, &transformer(), false).unwrap();
        assert_eq!(report.descriptions.len(), 1);
        assert!(report.rewritten.is_none());
    }

    #[test]
    fn applies_fixes_on_request() {
        let report = check_source("T.java", SOURCE, &transformer(), true).unwrap();
        assert_eq!(
            report.rewritten.as_deref(),
            Some("class T {\n  boolean m(String s) {\n    return s.isEmpty();\n  }\n}\n")
        );
    }

    #[test]
    fn attribution_errors_surface() {
        let err = check_source("T.java", "class T { int m() { return nope; } }", &transformer(), false)
            .unwrap_err();
        assert!(err.to_string().contains("nope"), "{err}");
    }
}
