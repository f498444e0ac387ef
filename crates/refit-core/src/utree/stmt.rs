use refit_ast::ast::{Block, Ident, Stmt};
use refit_ast::span::Span;
use serde::{Deserialize, Serialize};

use super::expr::UExpr;
use super::types::UTypeTree;
use crate::inliner::{CouldNotResolveImport, Inlineable, Inliner};
use crate::unifier::{unify_list, unify_nullable, Mismatch, Unifiable, Unifier, Unify};

/// Statement patterns, used by block templates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UStatement {
    Expression {
        expr: UExpr,
    },
    Block {
        stmts: Vec<UStatement>,
    },
    If {
        cond: UExpr,
        then_: Box<UStatement>,
        #[serde(default)]
        else_: Option<Box<UStatement>>,
    },
    While {
        cond: UExpr,
        body: Box<UStatement>,
    },
    Return {
        #[serde(default)]
        expr: Option<UExpr>,
    },
    /// Declares a template-local variable; the name binds to the target's.
    VariableDecl {
        name: String,
        ty: UTypeTree,
        #[serde(default)]
        init: Option<UExpr>,
    },
}

impl UStatement {
    pub fn expr(expr: UExpr) -> Self {
        UStatement::Expression { expr }
    }

    pub fn ret(expr: Option<UExpr>) -> Self {
        UStatement::Return { expr }
    }

    pub fn local(name: &str, ty: UTypeTree, init: Option<UExpr>) -> Self {
        UStatement::VariableDecl {
            name: name.to_string(),
            ty,
            init,
        }
    }
}

impl Unifiable<Stmt> for UStatement {
    fn unify<'a>(&self, target: &'a Stmt, unifier: Unifier<'a>) -> Unify<'a> {
        match (self, target) {
            (UStatement::Expression { expr }, Stmt::Expr { expr: actual, .. }) => {
                expr.unify(actual, unifier)
            }
            (UStatement::Block { stmts }, Stmt::Block(block)) => {
                unify_list(stmts, &block.stmts, unifier)
            }
            (
                UStatement::If { cond, then_, else_ },
                Stmt::If {
                    cond: tc,
                    then_: tt,
                    else_: te,
                    ..
                },
            ) => {
                let unifier = cond.unify(tc, unifier)?;
                let unifier = then_.unify(&**tt, unifier)?;
                unify_nullable(else_.as_deref(), te.as_deref(), unifier)
            }
            (UStatement::While { cond, body }, Stmt::While { cond: tc, body: tb, .. }) => {
                let unifier = cond.unify(tc, unifier)?;
                body.unify(&**tb, unifier)
            }
            (UStatement::Return { expr }, Stmt::Return { value, .. }) => {
                unify_nullable(expr.as_ref(), value.as_ref(), unifier)
            }
            (
                UStatement::VariableDecl { name, ty, init },
                Stmt::Local {
                    ty: target_ty,
                    name: target_name,
                    init: target_init,
                    ..
                },
            ) => {
                let unifier = ty.unify(target_ty, unifier)?;
                let unifier = unify_nullable(init.as_ref(), target_init.as_ref(), unifier)?;
                unifier.bind_local(name, &target_name.text)
            }
            _ => Err(Mismatch),
        }
    }
}

impl Inlineable for UStatement {
    type Output = Stmt;

    fn inline(&self, inliner: &mut Inliner<'_>) -> Result<Stmt, CouldNotResolveImport> {
        let span = Span::DUMMY;
        Ok(match self {
            UStatement::Expression { expr } => Stmt::Expr {
                expr: expr.inline(inliner)?,
                span,
            },
            UStatement::Block { stmts } => Stmt::Block(Block {
                stmts: inline_all(stmts, inliner)?,
                span,
            }),
            UStatement::If { cond, then_, else_ } => Stmt::If {
                cond: cond.inline(inliner)?,
                then_: Box::new(then_.inline(inliner)?),
                else_: match else_ {
                    Some(e) => Some(Box::new(e.inline(inliner)?)),
                    None => None,
                },
                span,
            },
            UStatement::While { cond, body } => Stmt::While {
                cond: cond.inline(inliner)?,
                body: Box::new(body.inline(inliner)?),
                span,
            },
            UStatement::Return { expr } => Stmt::Return {
                value: expr.as_ref().map(|e| e.inline(inliner)).transpose()?,
                span,
            },
            UStatement::VariableDecl { name, ty, init } => Stmt::Local {
                ty: ty.inline(inliner)?,
                name: Ident {
                    text: inliner.local_binding(name).unwrap_or(name.as_str()).to_string(),
                    span,
                },
                init: init.as_ref().map(|e| e.inline(inliner)).transpose()?,
                span,
            },
        })
    }
}

pub(crate) fn inline_all(
    stmts: &[UStatement],
    inliner: &mut Inliner<'_>,
) -> Result<Vec<Stmt>, CouldNotResolveImport> {
    stmts.iter().map(|s| s.inline(inliner)).collect()
}
