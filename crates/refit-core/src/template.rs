//! Templates: match a pattern tree against a node of the host unit and
//! turn a match of another template into a text edit.

use std::collections::BTreeMap;

use refit_ast::ast::{Block, Expr, Stmt};
use refit_ast::path::NodeRef;
use refit_ast::pretty::Pretty;
use refit_ast::span::Span;
use refit_types::Type;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error};

use crate::annotations::Annotations;
use crate::context::HostContext;
use crate::fix::SuggestedFix;
use crate::import_policy::ImportPolicy;
use crate::inliner::{Inlineable, Inliner};
use crate::precedence::precedence_for;
use crate::typecheck::{typecheck, Rejection};
use crate::unifier::{unify_list, Mismatch, Unifiable, Unifier, Unify};
use crate::utree::{inline_all, UExpr, UStatement, UType};

/// Misuse of the template construction API.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TemplateError {
    #[error("return type must be boolean to generate negation, but was {0:?}")]
    NegationOfNonBoolean(UType),
    #[error("a rule needs at least one before template")]
    NoBeforeTemplates,
    #[error("before and after templates must all be expression templates or all block templates")]
    MixedTemplateKinds,
    #[error("negation is only defined for expression templates")]
    NegationOfBlock,
    #[error("type variable `{0}` is not declared by the template")]
    UndeclaredTypeVariable(String),
}

/// Every type variable in `types` must be one of `declared`.
fn require_declared<'t>(
    declared: &[String],
    types: impl IntoIterator<Item = &'t UType>,
) -> Result<(), TemplateError> {
    match types
        .into_iter()
        .find_map(|ty| ty.undeclared_type_var(declared))
    {
        Some(name) => Err(TemplateError::UndeclaredTypeVariable(name.to_string())),
        None => Ok(()),
    }
}

// ======= expression templates =======

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpressionTemplate {
    #[serde(default)]
    pub annotations: Annotations,
    #[serde(default)]
    pub type_variables: Vec<String>,
    /// Declared types of the placeholders, checked against what they bind.
    #[serde(default)]
    pub expression_argument_types: BTreeMap<String, UType>,
    pub expression: UExpr,
    pub return_type: UType,
}

impl ExpressionTemplate {
    pub fn new(expression: UExpr, return_type: UType) -> Self {
        Self {
            annotations: Annotations::new(),
            type_variables: Vec::new(),
            expression_argument_types: BTreeMap::new(),
            expression,
            return_type,
        }
    }

    pub fn with_argument(mut self, name: &str, ty: UType) -> Self {
        self.expression_argument_types.insert(name.to_string(), ty);
        self
    }

    pub fn with_type_variable(mut self, name: &str) -> Self {
        self.type_variables.push(name.to_string());
        self
    }

    pub fn with_annotations(mut self, annotations: Annotations) -> Self {
        self.annotations = annotations;
        self
    }

    pub fn check_type_variables(&self) -> Result<(), TemplateError> {
        require_declared(
            &self.type_variables,
            self.expression_argument_types
                .values()
                .chain(std::iter::once(&self.return_type)),
        )
    }

    /// The same template with its expression logically negated.
    pub fn negation(&self) -> Result<ExpressionTemplate, TemplateError> {
        if !self.return_type.is_boolean() {
            return Err(TemplateError::NegationOfNonBoolean(self.return_type.clone()));
        }
        Ok(ExpressionTemplate {
            expression: self.expression.negate(),
            ..self.clone()
        })
    }

    fn import_policy(&self) -> ImportPolicy {
        self.annotations.import_policy()
    }

    pub fn match_expr<'a>(
        &self,
        target: &'a Expr,
        ctx: &'a HostContext<'a>,
    ) -> Option<ExpressionTemplateMatch<'a>> {
        let unifier = self.unify(target, Unifier::new(ctx)).ok()?;
        Some(ExpressionTemplateMatch {
            location: target,
            unifier,
        })
    }

    /// Text edit replacing `m`'s location with this template, inlined
    /// with `m`'s bindings. `None` when a class cannot be resolved.
    pub fn replace(&self, m: &ExpressionTemplateMatch<'_>) -> Option<SuggestedFix> {
        let ctx = m.unifier.ctx();
        let mut inliner = m.create_inliner(self.import_policy());
        let prec = ctx
            .path_for(NodeRef::Expr(m.location))
            .map_or(refit_ast::prec::NO_PREC, |path| precedence_for(&path));

        let expr = match self.expression.inline(&mut inliner) {
            Ok(expr) => expr,
            Err(e) => {
                error!(class = e.class_name(), "failure to resolve in replacement: {e}");
                return None;
            }
        };
        let mut text = String::new();
        if let Err(e) = Pretty::new(&mut text).print_expr(&expr, prec) {
            error!("failure to print replacement: {e}");
            return None;
        }
        Some(
            SuggestedFix::builder()
                .replace(m.location.span, text)
                .add_imports(inliner.into_imports())
                .build(),
        )
    }
}

impl Unifiable<Expr> for ExpressionTemplate {
    /// Structural match, then the return type and placeholder types are
    /// checked together as one applicability test.
    fn unify<'a>(&self, target: &'a Expr, unifier: Unifier<'a>) -> Unify<'a> {
        let unifier = self.expression.unify(target, unifier)?;

        let mut expected = vec![&self.return_type];
        let mut actual = vec![target.ty.clone().ok_or(Mismatch)?];
        let (more_expected, more_actual) =
            argument_types(&self.expression_argument_types, &unifier)?;
        expected.extend(more_expected);
        actual.extend(more_actual);

        checked(typecheck(unifier, &expected, &actual, self.import_policy()))
    }
}

/// Declared placeholder types paired with the types of their bindings.
/// Placeholders the pattern never bound are skipped.
fn argument_types<'t>(
    declared: &'t BTreeMap<String, UType>,
    unifier: &Unifier<'_>,
) -> Result<(Vec<&'t UType>, Vec<Type>), Mismatch> {
    let mut expected = Vec::new();
    let mut actual = Vec::new();
    for (name, ty) in declared {
        if let Some(bound) = unifier.expr_binding(name) {
            expected.push(ty);
            actual.push(bound.ty.clone().ok_or(Mismatch)?);
        }
    }
    Ok((expected, actual))
}

/// Resolution failures while matching only mean "no match".
fn checked(result: Result<Unifier<'_>, Rejection>) -> Unify<'_> {
    match result {
        Ok(unifier) => Ok(unifier),
        Err(Rejection::Mismatch(m)) => Err(m),
        Err(Rejection::Unresolved(e)) => {
            debug!(class = e.class_name(), "failure to resolve import: {e}");
            Err(Mismatch)
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExpressionTemplateMatch<'a> {
    location: &'a Expr,
    unifier: Unifier<'a>,
}

impl<'a> ExpressionTemplateMatch<'a> {
    pub fn location(&self) -> &'a Expr {
        self.location
    }

    pub fn unifier(&self) -> &Unifier<'a> {
        &self.unifier
    }

    pub fn create_inliner(&self, policy: ImportPolicy) -> Inliner<'_> {
        self.unifier.create_inliner(policy)
    }
}

// ======= block templates =======

/// Matches runs of consecutive statements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockTemplate {
    #[serde(default)]
    pub annotations: Annotations,
    #[serde(default)]
    pub type_variables: Vec<String>,
    #[serde(default)]
    pub expression_argument_types: BTreeMap<String, UType>,
    pub statements: Vec<UStatement>,
}

impl BlockTemplate {
    pub fn new(statements: Vec<UStatement>) -> Self {
        Self {
            annotations: Annotations::new(),
            type_variables: Vec::new(),
            expression_argument_types: BTreeMap::new(),
            statements,
        }
    }

    pub fn with_argument(mut self, name: &str, ty: UType) -> Self {
        self.expression_argument_types.insert(name.to_string(), ty);
        self
    }

    pub fn with_type_variable(mut self, name: &str) -> Self {
        self.type_variables.push(name.to_string());
        self
    }

    pub fn with_annotations(mut self, annotations: Annotations) -> Self {
        self.annotations = annotations;
        self
    }

    pub fn check_type_variables(&self) -> Result<(), TemplateError> {
        require_declared(
            &self.type_variables,
            self.expression_argument_types.values(),
        )
    }

    fn import_policy(&self) -> ImportPolicy {
        self.annotations.import_policy()
    }

    /// Every non-overlapping run of `block`'s statements that this
    /// template matches, scanning from the front.
    pub fn match_block<'a>(
        &self,
        block: &'a Block,
        ctx: &'a HostContext<'a>,
    ) -> Vec<BlockTemplateMatch<'a>> {
        let len = self.statements.len();
        let mut matches = Vec::new();
        if len == 0 {
            return matches;
        }
        let mut start = 0;
        while start + len <= block.stmts.len() {
            let window = &block.stmts[start..start + len];
            match self.unify_window(window, Unifier::new(ctx)) {
                Ok(unifier) => {
                    matches.push(BlockTemplateMatch {
                        statements: window,
                        unifier,
                    });
                    start += len;
                }
                Err(Mismatch) => start += 1,
            }
        }
        matches
    }

    fn unify_window<'a>(&self, window: &'a [Stmt], unifier: Unifier<'a>) -> Unify<'a> {
        let unifier = unify_list(&self.statements, window, unifier)?;
        let (expected, actual) = argument_types(&self.expression_argument_types, &unifier)?;
        checked(typecheck(unifier, &expected, &actual, self.import_policy()))
    }

    /// Replaces the matched statements with this template's, one per line
    /// at the indentation of the first.
    pub fn replace(&self, m: &BlockTemplateMatch<'_>) -> Option<SuggestedFix> {
        let ctx = m.unifier.ctx();
        let mut inliner = m.create_inliner(self.import_policy());
        let stmts = match inline_all(&self.statements, &mut inliner) {
            Ok(stmts) => stmts,
            Err(e) => {
                error!(class = e.class_name(), "failure to resolve in replacement: {e}");
                return None;
            }
        };
        let span = m.span();
        let indent = ctx.indentation_at(span.start);
        let mut text = String::new();
        if let Err(e) = Pretty::with_indent(&mut text, indent).print_stmts(&stmts) {
            error!("failure to print replacement: {e}");
            return None;
        }
        Some(
            SuggestedFix::builder()
                .replace(span, text)
                .add_imports(inliner.into_imports())
                .build(),
        )
    }
}

#[derive(Debug, Clone)]
pub struct BlockTemplateMatch<'a> {
    statements: &'a [Stmt],
    unifier: Unifier<'a>,
}

impl<'a> BlockTemplateMatch<'a> {
    pub fn statements(&self) -> &'a [Stmt] {
        self.statements
    }

    pub fn unifier(&self) -> &Unifier<'a> {
        &self.unifier
    }

    /// From the start of the first matched statement to the end of the last.
    pub fn span(&self) -> Span {
        match (self.statements.first(), self.statements.last()) {
            (Some(first), Some(last)) => first.span().to(last.span()),
            _ => Span::DUMMY,
        }
    }

    pub fn create_inliner(&self, policy: ImportPolicy) -> Inliner<'_> {
        self.unifier.create_inliner(policy)
    }
}

// ======= either kind =======

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Template {
    Expression(ExpressionTemplate),
    Block(BlockTemplate),
}

impl Template {
    pub fn annotations(&self) -> &Annotations {
        match self {
            Template::Expression(t) => &t.annotations,
            Template::Block(t) => &t.annotations,
        }
    }

    /// This template with `extra` laid over its own annotations.
    pub fn annotated(self, extra: &Annotations) -> Template {
        match self {
            Template::Expression(t) => {
                let annotations = t.annotations.merge(extra);
                Template::Expression(t.with_annotations(annotations))
            }
            Template::Block(t) => {
                let annotations = t.annotations.merge(extra);
                Template::Block(t.with_annotations(annotations))
            }
        }
    }

    pub fn is_expression(&self) -> bool {
        matches!(self, Template::Expression(_))
    }

    pub fn generate_negation(&self) -> bool {
        self.annotations().also_negation()
    }

    /// Fails on a type variable the template uses without declaring it.
    pub fn check_type_variables(&self) -> Result<(), TemplateError> {
        match self {
            Template::Expression(t) => t.check_type_variables(),
            Template::Block(t) => t.check_type_variables(),
        }
    }

    pub fn negation(&self) -> Result<Template, TemplateError> {
        match self {
            Template::Expression(t) => t.negation().map(Template::Expression),
            Template::Block(_) => Err(TemplateError::NegationOfBlock),
        }
    }

    /// Matches of this template at `node`. Expression templates look at
    /// expressions, block templates at blocks.
    pub fn match_node<'a>(
        &self,
        node: NodeRef<'a>,
        ctx: &'a HostContext<'a>,
    ) -> Vec<TemplateMatch<'a>> {
        match (self, node) {
            (Template::Expression(t), NodeRef::Expr(e)) => t
                .match_expr(e, ctx)
                .map(TemplateMatch::Expression)
                .into_iter()
                .collect(),
            (Template::Block(t), NodeRef::Block(b)) => t
                .match_block(b, ctx)
                .into_iter()
                .map(TemplateMatch::Block)
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Replaces a match of another template of the same kind.
    pub fn replace(&self, m: &TemplateMatch<'_>) -> Option<SuggestedFix> {
        match (self, m) {
            (Template::Expression(t), TemplateMatch::Expression(m)) => t.replace(m),
            (Template::Block(t), TemplateMatch::Block(m)) => t.replace(m),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum TemplateMatch<'a> {
    Expression(ExpressionTemplateMatch<'a>),
    Block(BlockTemplateMatch<'a>),
}

impl TemplateMatch<'_> {
    pub fn span(&self) -> Span {
        match self {
            TemplateMatch::Expression(m) => m.location.span,
            TemplateMatch::Block(m) => m.span(),
        }
    }
}
