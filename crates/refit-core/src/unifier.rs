//! Binding environment threaded through unification.
//!
//! A [`Unifier`] is moved into each `unify` call and handed back on
//! success, so a failed attempt simply drops it:
//!
//! ```ignore
//! let u = self.cond.unify(cond, u)?;
//! let u = self.then_.unify(then_, u)?;
//! ```

use std::collections::BTreeMap;

use refit_ast::ast::{Expr, ExprKind};
use refit_types::Type;
use thiserror::Error;

use crate::context::HostContext;
use crate::import_policy::ImportPolicy;
use crate::inliner::Inliner;

/// The pattern does not match the target. Expected and silent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("template does not match")]
pub struct Mismatch;

pub type Unify<'a> = Result<Unifier<'a>, Mismatch>;

/// Fails unless `cond` holds.
pub fn require<'a>(cond: bool, unifier: Unifier<'a>) -> Unify<'a> {
    if cond {
        Ok(unifier)
    } else {
        Err(Mismatch)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum BindingKey {
    /// Expression placeholder of the template.
    Free(String),
    /// Variable declared inside a template; bound to the target's name.
    Local(String),
    TypeVar(String),
}

#[derive(Debug, Clone)]
pub enum Binding<'a> {
    Expr(&'a Expr),
    Local(String),
    Type(Type),
}

pub type Bindings<'a> = BTreeMap<BindingKey, Binding<'a>>;

/// Unifies a pattern node against a concrete node of type `T`.
pub trait Unifiable<T> {
    fn unify<'a>(&self, target: &'a T, unifier: Unifier<'a>) -> Unify<'a>;
}

/// Positional unification; lists of different length never match.
pub fn unify_list<'a, P, T>(
    patterns: &[P],
    targets: &'a [T],
    mut unifier: Unifier<'a>,
) -> Unify<'a>
where
    P: Unifiable<T>,
{
    if patterns.len() != targets.len() {
        return Err(Mismatch);
    }
    for (pattern, target) in patterns.iter().zip(targets) {
        unifier = pattern.unify(target, unifier)?;
    }
    Ok(unifier)
}

/// Both absent, or both present and unifying.
pub fn unify_nullable<'a, P, T>(
    pattern: Option<&P>,
    target: Option<&'a T>,
    unifier: Unifier<'a>,
) -> Unify<'a>
where
    P: Unifiable<T>,
{
    match (pattern, target) {
        (None, None) => Ok(unifier),
        (Some(p), Some(t)) => p.unify(t, unifier),
        _ => Err(Mismatch),
    }
}

#[derive(Debug, Clone)]
pub struct Unifier<'a> {
    ctx: &'a HostContext<'a>,
    bindings: Bindings<'a>,
}

impl<'a> Unifier<'a> {
    pub fn new(ctx: &'a HostContext<'a>) -> Self {
        Self {
            ctx,
            bindings: BTreeMap::new(),
        }
    }

    pub fn ctx(&self) -> &'a HostContext<'a> {
        self.ctx
    }

    pub fn get(&self, key: &BindingKey) -> Option<&Binding<'a>> {
        self.bindings.get(key)
    }

    pub fn bindings(&self) -> &Bindings<'a> {
        &self.bindings
    }

    /// Binds placeholder `name`; a repeated placeholder must see the same tree.
    pub fn bind_expr(self, name: &str, target: &'a Expr) -> Unify<'a> {
        let key = BindingKey::Free(name.to_string());
        let same = match self.bindings.get(&key) {
            Some(Binding::Expr(bound)) => Some(bound.same_tree(target)),
            Some(_) => Some(false),
            None => None,
        };
        self.insert_or_check(key, same, Binding::Expr(target))
    }

    /// Binds template-local variable `name` to the target's variable name.
    pub fn bind_local(self, name: &str, target_name: &str) -> Unify<'a> {
        let key = BindingKey::Local(name.to_string());
        let same = match self.bindings.get(&key) {
            Some(Binding::Local(bound)) => Some(bound == target_name),
            Some(_) => Some(false),
            None => None,
        };
        self.insert_or_check(key, same, Binding::Local(target_name.to_string()))
    }

    /// Binds type variable `name`. A bound variable accepts any type
    /// convertible to its binding.
    pub fn bind_type(self, name: &str, ty: &Type) -> Unify<'a> {
        let key = BindingKey::TypeVar(name.to_string());
        let cp = self.ctx.classpath();
        let same = match self.bindings.get(&key) {
            Some(Binding::Type(bound)) => Some(cp.is_method_convertible(ty, bound)),
            Some(_) => Some(false),
            None => None,
        };
        self.insert_or_check(key, same, Binding::Type(ty.clone()))
    }

    fn insert_or_check(
        mut self,
        key: BindingKey,
        same: Option<bool>,
        value: Binding<'a>,
    ) -> Unify<'a> {
        match same {
            Some(same) => require(same, self),
            None => {
                self.bindings.insert(key, value);
                Ok(self)
            }
        }
    }

    pub fn expr_binding(&self, name: &str) -> Option<&'a Expr> {
        match self.bindings.get(&BindingKey::Free(name.to_string())) {
            Some(Binding::Expr(e)) => Some(*e),
            _ => None,
        }
    }

    pub fn create_inliner(&self, policy: ImportPolicy) -> Inliner<'_> {
        Inliner::new(self.ctx, &self.bindings, policy)
    }
}

/// Whether `target` denotes a value rather than a class or package name.
pub(crate) fn is_value(target: &Expr) -> bool {
    match &target.kind {
        ExprKind::Ident { sym, .. } | ExprKind::Field { sym, .. } => !matches!(
            sym,
            Some(refit_types::Symbol::Class(_)) | Some(refit_types::Symbol::Package(_))
        ),
        _ => true,
    }
}
