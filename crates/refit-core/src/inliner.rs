//! Substitutes a completed set of bindings back into pattern trees.

use std::collections::BTreeSet;

use refit_ast::ast::Expr;
use refit_types::{ClassPathError, ClassSymbol, Type};
use thiserror::Error;

use crate::context::HostContext;
use crate::import_policy::ImportPolicy;
use crate::unifier::{Binding, BindingKey, Bindings};

/// A class named by a template is unknown to the target compilation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("could not resolve import: {source}")]
pub struct CouldNotResolveImport {
    #[from]
    source: ClassPathError,
}

impl CouldNotResolveImport {
    pub fn class_name(&self) -> &str {
        match &self.source {
            ClassPathError::NotFound(name) => name,
        }
    }
}

/// Pattern nodes that produce concrete nodes given an [`Inliner`].
pub trait Inlineable {
    type Output;

    fn inline(&self, inliner: &mut Inliner<'_>) -> Result<Self::Output, CouldNotResolveImport>;
}

/// Read-only view of a unifier's bindings. The only state it accumulates is
/// the set of imports the printed references rely on.
pub struct Inliner<'u> {
    ctx: &'u HostContext<'u>,
    bindings: &'u Bindings<'u>,
    policy: ImportPolicy,
    imports: BTreeSet<String>,
}

impl<'u> Inliner<'u> {
    pub(crate) fn new(
        ctx: &'u HostContext<'u>,
        bindings: &'u Bindings<'u>,
        policy: ImportPolicy,
    ) -> Self {
        Self {
            ctx,
            bindings,
            policy,
            imports: BTreeSet::new(),
        }
    }

    pub fn ctx(&self) -> &'u HostContext<'u> {
        self.ctx
    }

    pub fn policy(&self) -> ImportPolicy {
        self.policy
    }

    pub fn binding(&self, key: &BindingKey) -> Option<&'u Binding<'u>> {
        self.bindings.get(key)
    }

    pub fn expr_binding(&self, name: &str) -> Option<&'u Expr> {
        match self.binding(&BindingKey::Free(name.to_string())) {
            Some(Binding::Expr(e)) => Some(*e),
            _ => None,
        }
    }

    pub fn local_binding(&self, name: &str) -> Option<&'u str> {
        match self.binding(&BindingKey::Local(name.to_string())) {
            Some(Binding::Local(target)) => Some(target.as_str()),
            _ => None,
        }
    }

    pub fn type_binding(&self, name: &str) -> Option<&'u Type> {
        match self.binding(&BindingKey::TypeVar(name.to_string())) {
            Some(Binding::Type(ty)) => Some(ty),
            _ => None,
        }
    }

    pub fn resolve(&self, qualified_name: &str) -> Result<&'u ClassSymbol, CouldNotResolveImport> {
        Ok(self.ctx.resolve(qualified_name)?)
    }

    /// Resolves `qualified` and returns the path to print for it under the
    /// inliner's import policy.
    pub fn class_reference(
        &mut self,
        top_level: &str,
        qualified: &str,
    ) -> Result<Vec<String>, CouldNotResolveImport> {
        self.resolve(qualified)?;
        Ok(self.policy.class_reference(self, top_level, qualified))
    }

    pub fn add_import(&mut self, qualified: &str) {
        if !self.ctx.scope().has_single_import(qualified) {
            self.imports.insert(qualified.to_string());
        }
    }

    /// Whether a pending import already claims `simple` for another class.
    pub fn import_clashes(&self, simple: &str, qualified: &str) -> bool {
        self.imports
            .iter()
            .any(|i| i != qualified && i.rsplit('.').next() == Some(simple))
    }

    pub fn imports(&self) -> &BTreeSet<String> {
        &self.imports
    }

    pub fn into_imports(self) -> BTreeSet<String> {
        self.imports
    }
}
