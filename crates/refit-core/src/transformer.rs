//! Code transformers: walk a whole compilation unit and report every match
//! as a [`Description`] carrying the replacement edit.

use refit_ast::path::NodeRef;
use tracing::{debug, trace};

use crate::annotations::Annotations;
use crate::context::HostContext;
use crate::description::{Description, DescriptionListener, Severity};
use crate::template::{Template, TemplateError};

/// Applies to one compilation unit at a time. Never mutates the unit;
/// edits are handed to the listener.
pub trait CodeTransformer {
    fn apply(&self, ctx: &HostContext<'_>, listener: &mut dyn DescriptionListener);

    fn annotations(&self) -> &Annotations;
}

/// Rewrites whatever any before template matches into the after template.
#[derive(Debug, Clone, PartialEq)]
pub struct RefasterRule {
    name: String,
    pairs: Vec<(Template, Template)>,
    annotations: Annotations,
    severity: Severity,
}

impl RefasterRule {
    /// The rule's annotations are laid over each template's. A before
    /// template carrying the also-negation annotation, its own or the
    /// rule's, is matched negated too and rewritten to the negated after
    /// template; both must then be boolean-returning. Every template must
    /// declare the type variables it uses.
    pub fn new(
        name: impl Into<String>,
        before: Vec<Template>,
        after: Template,
        annotations: Annotations,
    ) -> Result<Self, TemplateError> {
        if before.is_empty() {
            return Err(TemplateError::NoBeforeTemplates);
        }
        let kind = after.is_expression();
        if before.iter().any(|t| t.is_expression() != kind) {
            return Err(TemplateError::MixedTemplateKinds);
        }
        for t in before.iter().chain(std::iter::once(&after)) {
            t.check_type_variables()?;
        }

        let before: Vec<Template> = before
            .into_iter()
            .map(|t| t.annotated(&annotations))
            .collect();
        let after = after.annotated(&annotations);
        let mut pairs: Vec<_> = before.iter().map(|b| (b.clone(), after.clone())).collect();
        if before.iter().any(Template::generate_negation) {
            let negated_after = after.negation()?;
            for b in before.iter().filter(|b| b.generate_negation()) {
                pairs.push((b.negation()?, negated_after.clone()));
            }
        }
        Ok(Self {
            name: name.into(),
            pairs,
            annotations,
            severity: Severity::default(),
        })
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// (before, after) pairs in matching order: the plain templates first,
    /// then their negations.
    pub fn pairs(&self) -> &[(Template, Template)] {
        &self.pairs
    }

    fn message(&self) -> String {
        match self.annotations.message() {
            Some(text) => text.to_string(),
            None => format!("{}: this can be rewritten", self.name),
        }
    }
}

impl CodeTransformer for RefasterRule {
    fn apply(&self, ctx: &HostContext<'_>, listener: &mut dyn DescriptionListener) {
        let mut matched = 0usize;
        let mut reported = 0usize;
        let mut stack = vec![NodeRef::Unit(ctx.unit())];
        while let Some(node) = stack.pop() {
            // First template to match a node wins.
            for (before, after) in &self.pairs {
                let matches = before.match_node(node, ctx);
                if matches.is_empty() {
                    continue;
                }
                for m in &matches {
                    matched += 1;
                    match after.replace(m) {
                        Some(fix) => {
                            reported += 1;
                            listener.on_described(Description {
                                checker: self.name.clone(),
                                span: m.span(),
                                message: self.message(),
                                fix,
                                severity: self.severity,
                            });
                        }
                        None => {
                            trace!(rule = %self.name, span = ?m.span(), "match has no replacement")
                        }
                    }
                }
                break;
            }
            let mut children = node.children();
            children.reverse();
            stack.extend(children);
        }
        debug!(rule = %self.name, matched, reported, "rule applied");
    }

    fn annotations(&self) -> &Annotations {
        &self.annotations
    }
}

/// Several transformers applied in order to the same unit.
#[derive(Default)]
pub struct CompositeCodeTransformer {
    transformers: Vec<Box<dyn CodeTransformer>>,
    annotations: Annotations,
}

impl CompositeCodeTransformer {
    pub fn new(transformers: Vec<Box<dyn CodeTransformer>>) -> Self {
        let annotations = transformers
            .iter()
            .fold(Annotations::new(), |acc, t| acc.merge(t.annotations()));
        Self {
            transformers,
            annotations,
        }
    }

    pub fn len(&self) -> usize {
        self.transformers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transformers.is_empty()
    }
}

impl CodeTransformer for CompositeCodeTransformer {
    fn apply(&self, ctx: &HostContext<'_>, listener: &mut dyn DescriptionListener) {
        for transformer in &self.transformers {
            transformer.apply(ctx, listener);
        }
    }

    fn annotations(&self) -> &Annotations {
        &self.annotations
    }
}
