//! Type compatibility of a structural match.
//!
//! The declared types (return type first, then placeholder types) are
//! treated as the parameters of a method and the matched expressions'
//! types as its arguments; the match stands iff such a call would be
//! applicable.

use refit_types::{PrimKind, Type};
use thiserror::Error;

use crate::import_policy::ImportPolicy;
use crate::inliner::{CouldNotResolveImport, Inlineable};
use crate::unifier::{Mismatch, Unifier};
use crate::utree::UType;

/// Why a structurally matching target was still rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error(transparent)]
    Mismatch(#[from] Mismatch),
    #[error(transparent)]
    Unresolved(#[from] CouldNotResolveImport),
}

/// Infers type variables from `actual`, inlines `expected`, and checks
/// applicability. Pairs are positional.
pub fn typecheck<'a>(
    unifier: Unifier<'a>,
    expected: &[&UType],
    actual: &[Type],
    policy: ImportPolicy,
) -> Result<Unifier<'a>, Rejection> {
    if expected.len() != actual.len() {
        return Err(Mismatch.into());
    }

    let mut unifier = unifier;
    for (pattern, actual) in expected.iter().zip(actual) {
        if pattern.mentions_type_var() {
            unifier = infer(pattern, actual, unifier);
        }
    }

    let (expected, actual) = {
        let mut inliner = unifier.create_inliner(policy);
        let mut exp = Vec::with_capacity(expected.len());
        let mut act = Vec::with_capacity(actual.len());
        for (pattern, actual) in expected.iter().zip(actual) {
            let ty = pattern.inline(&mut inliner)?;
            // void is not convertible to anything, not even itself
            if is_void(&ty) && is_void(actual) {
                continue;
            }
            exp.push(ty);
            act.push(actual.clone());
        }
        (exp, act)
    };

    if unifier.ctx().is_applicable(&expected, &actual) {
        Ok(unifier)
    } else {
        Err(Mismatch.into())
    }
}

/// Binds the type variables of `pattern` from `actual`, viewed as the
/// pattern's class where possible. Inference never rejects on its own;
/// anything it cannot bind is left to the applicability check.
fn infer<'a>(pattern: &UType, actual: &Type, unifier: Unifier<'a>) -> Unifier<'a> {
    let boxed = actual.boxed();
    let viewed = match pattern {
        UType::Class(class) => unifier.ctx().classpath().as_super(&boxed, &class.name),
        UType::TypeVar { .. } => Some(boxed),
        _ => Some(actual.clone()),
    };
    match viewed {
        Some(ty) => pattern.unify(&ty, unifier.clone()).unwrap_or(unifier),
        None => unifier,
    }
}

fn is_void(ty: &Type) -> bool {
    *ty == Type::Prim(PrimKind::Void)
}
