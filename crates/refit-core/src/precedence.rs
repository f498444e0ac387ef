//! Precedence context for splicing an expression into a given slot.

use std::ptr;

use refit_ast::ast::{Expr, ExprKind};
use refit_ast::path::{NodeRef, TreePath};
use refit_ast::prec::{self, Prec};

/// Minimal precedence at which the replacement for `path`'s leaf must be
/// printed so that it keeps its grouping under the leaf's parent.
///
/// The conditional case bumps only the condition slot. Branches are
/// printed at the conditional's own level.
pub fn precedence_for(path: &TreePath<'_>) -> Prec {
    let (Some(leaf), Some(NodeRef::Expr(parent))) = (path.leaf().as_expr(), path.parent()) else {
        return prec::NO_PREC;
    };
    slot_precedence(leaf, parent)
}

fn slot_precedence(leaf: &Expr, parent: &Expr) -> Prec {
    let is = |e: &Box<Expr>| ptr::eq(&**e, leaf);
    let bump = |b: bool| Prec::from(b);
    match &parent.kind {
        ExprKind::Cond { cond, .. } => prec::COND + bump(is(cond)),
        ExprKind::Assign { lhs, .. } => prec::ASSIGN + bump(is(lhs)),
        ExprKind::AssignOp { lhs, .. } => prec::ASSIGNOP + bump(is(lhs)),
        ExprKind::Unary { op, .. } => op.prec(),
        ExprKind::Binary { op, rhs, .. } => op.prec() + bump(is(rhs)),
        ExprKind::Cast { expr, .. } if is(expr) => prec::PREFIX,
        // The type operand is never an expression here.
        ExprKind::InstanceOf { .. } => prec::ORD,
        ExprKind::Index { target, .. } if is(target) => prec::POSTFIX,
        ExprKind::Field { target, .. } if is(target) => prec::POSTFIX,
        _ => prec::NO_PREC,
    }
}
