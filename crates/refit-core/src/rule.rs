//! Rule files: JSON documents listing before/after template pairs.
//!
//! ```json
//! {"rules": [{
//!   "name": "ObjectsEquals",
//!   "annotations": [{"kind": "also_negation"}],
//!   "before": [{"kind": "expression", "expression": {...}, "return_type": {...}}],
//!   "after": {"kind": "expression", "expression": {...}, "return_type": {...}}
//! }]}
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::annotations::{Annotation, Annotations};
use crate::description::Severity;
use crate::import_policy::ImportPolicy;
use crate::template::{Template, TemplateError};
use crate::transformer::RefasterRule;

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("invalid rule file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("rule `{name}`: {source}")]
    Template {
        name: String,
        #[source]
        source: TemplateError,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDef {
    pub name: String,
    #[serde(default)]
    pub annotations: Annotations,
    #[serde(default)]
    pub severity: Severity,
    pub before: Vec<Template>,
    pub after: Template,
}

impl RuleDef {
    pub fn build(self) -> Result<RefasterRule, RuleError> {
        let name = self.name;
        RefasterRule::new(name.clone(), self.before, self.after, self.annotations)
            .map(|rule| rule.with_severity(self.severity))
            .map_err(|source| RuleError::Template { name, source })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    pub rules: Vec<RuleDef>,
}

impl RuleSet {
    pub fn from_json(text: &str) -> Result<Self, RuleError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Forces `policy` on every rule, overriding what the file says.
    pub fn with_import_policy(mut self, policy: ImportPolicy) -> Self {
        for rule in &mut self.rules {
            rule.annotations
                .insert(Annotation::UseImportPolicy { policy });
        }
        self
    }

    pub fn build(self) -> Result<Vec<RefasterRule>, RuleError> {
        self.rules.into_iter().map(RuleDef::build).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transformer::CodeTransformer;

    const OBJECTS_EQUALS: &str = r#"{"rules": [{
        "name": "ObjectsEquals",
        "annotations": [{"kind": "also_negation"}],
        "before": [{
            "kind": "expression",
            "expression_argument_types": {
                "a": {"kind": "class", "name": "java.lang.Object"},
                "b": {"kind": "class", "name": "java.lang.Object"}
            },
            "expression": {
                "kind": "method_invocation",
                "method": {"kind": "member_select", "expr": {"kind": "free", "name": "a"}, "name": "equals"},
                "args": [{"kind": "free", "name": "b"}]
            },
            "return_type": {"kind": "primitive", "prim": "boolean"}
        }],
        "after": {
            "kind": "expression",
            "expression": {
                "kind": "method_invocation",
                "method": {"kind": "member_select", "expr": {"kind": "class_ident", "class": "java.util.Objects"}, "name": "equals"},
                "args": [{"kind": "free", "name": "a"}, {"kind": "free", "name": "b"}]
            },
            "return_type": {"kind": "primitive", "prim": "boolean"}
        }
    }]}"#;

    #[test]
    fn loads_rules_with_negation() {
        let rules = RuleSet::from_json(OBJECTS_EQUALS).unwrap().build().unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].name(), "ObjectsEquals");
        assert!(rules[0].annotations().also_negation());
        assert_eq!(rules[0].pairs().len(), 2);
    }

    #[test]
    fn import_policy_override_reaches_templates() {
        let rules = RuleSet::from_json(OBJECTS_EQUALS)
            .unwrap()
            .with_import_policy(ImportPolicy::FullyQualified)
            .build()
            .unwrap();
        for (before, after) in rules[0].pairs() {
            assert_eq!(
                before.annotations().import_policy(),
                ImportPolicy::FullyQualified
            );
            assert_eq!(
                after.annotations().import_policy(),
                ImportPolicy::FullyQualified
            );
        }
    }

    #[test]
    fn negating_a_non_boolean_rule_is_an_error() {
        let text = OBJECTS_EQUALS.replace(r#""prim": "boolean""#, r#""prim": "int""#);
        let err = RuleSet::from_json(&text).unwrap().build().unwrap_err();
        assert!(
            matches!(err, RuleError::Template { ref name, .. } if name == "ObjectsEquals"),
            "{err}"
        );
    }

    #[test]
    fn malformed_json_is_reported() {
        assert!(matches!(
            RuleSet::from_json("{\"rules\": [{]}"),
            Err(RuleError::Json(_))
        ));
    }
}
