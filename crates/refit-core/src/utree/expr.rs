use refit_ast::ast::{BinOp, Expr, ExprKind, Lit, UnOp};
use serde::{Deserialize, Serialize};

use super::types::{UClassIdent, UTypeTree};
use crate::inliner::{CouldNotResolveImport, Inlineable, Inliner};
use crate::unifier::{is_value, require, unify_list, Mismatch, Unifiable, Unifier, Unify};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ULiteral {
    Int(i64),
    Long(i64),
    Double(f64),
    Bool(bool),
    Char(char),
    Str(String),
    Null,
}

impl ULiteral {
    fn matches(&self, lit: &Lit) -> bool {
        match (self, lit) {
            (ULiteral::Int(a), Lit::Int(b)) | (ULiteral::Long(a), Lit::Long(b)) => a == b,
            (ULiteral::Double(a), Lit::Double(b)) => a == b,
            (ULiteral::Bool(a), Lit::Bool(b)) => a == b,
            (ULiteral::Char(a), Lit::Char(b)) => a == b,
            (ULiteral::Str(a), Lit::Str(b)) => a == b,
            (ULiteral::Null, Lit::Null) => true,
            _ => false,
        }
    }

    fn to_lit(&self) -> Lit {
        match self {
            ULiteral::Int(v) => Lit::Int(*v),
            ULiteral::Long(v) => Lit::Long(*v),
            ULiteral::Double(v) => Lit::Double(*v),
            ULiteral::Bool(v) => Lit::Bool(*v),
            ULiteral::Char(v) => Lit::Char(*v),
            ULiteral::Str(v) => Lit::Str(v.clone()),
            ULiteral::Null => Lit::Null,
        }
    }
}

/// Expression patterns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UExpr {
    /// Placeholder; binds any value expression.
    Free {
        name: String,
    },
    ClassIdent {
        class: UClassIdent,
    },
    /// Variable declared by the template itself.
    LocalIdent {
        name: String,
    },
    Literal {
        value: ULiteral,
    },
    Parens {
        expr: Box<UExpr>,
    },
    MemberSelect {
        expr: Box<UExpr>,
        name: String,
    },
    MethodInvocation {
        method: Box<UExpr>,
        #[serde(default)]
        args: Vec<UExpr>,
    },
    Unary {
        op: UnOp,
        expr: Box<UExpr>,
    },
    Binary {
        lhs: Box<UExpr>,
        op: BinOp,
        rhs: Box<UExpr>,
    },
    Conditional {
        cond: Box<UExpr>,
        then_: Box<UExpr>,
        else_: Box<UExpr>,
    },
    Assign {
        lhs: Box<UExpr>,
        rhs: Box<UExpr>,
    },
    AssignOp {
        lhs: Box<UExpr>,
        op: BinOp,
        rhs: Box<UExpr>,
    },
    TypeCast {
        ty: UTypeTree,
        expr: Box<UExpr>,
    },
    InstanceOf {
        expr: Box<UExpr>,
        ty: UTypeTree,
    },
    ArrayAccess {
        expr: Box<UExpr>,
        index: Box<UExpr>,
    },
}

// ======= constructors =======

impl UExpr {
    pub fn free(name: &str) -> Self {
        UExpr::Free {
            name: name.to_string(),
        }
    }

    pub fn class(qualified_name: &str) -> Self {
        UExpr::ClassIdent {
            class: UClassIdent::create(qualified_name),
        }
    }

    pub fn local(name: &str) -> Self {
        UExpr::LocalIdent {
            name: name.to_string(),
        }
    }

    pub fn literal(value: ULiteral) -> Self {
        UExpr::Literal { value }
    }

    pub fn parens(expr: UExpr) -> Self {
        UExpr::Parens {
            expr: Box::new(expr),
        }
    }

    pub fn select(expr: UExpr, name: &str) -> Self {
        UExpr::MemberSelect {
            expr: Box::new(expr),
            name: name.to_string(),
        }
    }

    pub fn invoke(method: UExpr, args: Vec<UExpr>) -> Self {
        UExpr::MethodInvocation {
            method: Box::new(method),
            args,
        }
    }

    pub fn unary(op: UnOp, expr: UExpr) -> Self {
        UExpr::Unary {
            op,
            expr: Box::new(expr),
        }
    }

    pub fn binary(lhs: UExpr, op: BinOp, rhs: UExpr) -> Self {
        UExpr::Binary {
            lhs: Box::new(lhs),
            op,
            rhs: Box::new(rhs),
        }
    }

    pub fn conditional(cond: UExpr, then_: UExpr, else_: UExpr) -> Self {
        UExpr::Conditional {
            cond: Box::new(cond),
            then_: Box::new(then_),
            else_: Box::new(else_),
        }
    }

    pub fn assign(lhs: UExpr, rhs: UExpr) -> Self {
        UExpr::Assign {
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn assign_op(lhs: UExpr, op: BinOp, rhs: UExpr) -> Self {
        UExpr::AssignOp {
            lhs: Box::new(lhs),
            op,
            rhs: Box::new(rhs),
        }
    }

    pub fn cast(ty: UTypeTree, expr: UExpr) -> Self {
        UExpr::TypeCast {
            ty,
            expr: Box::new(expr),
        }
    }

    pub fn instance_of(expr: UExpr, ty: UTypeTree) -> Self {
        UExpr::InstanceOf {
            expr: Box::new(expr),
            ty,
        }
    }

    pub fn array_access(expr: UExpr, index: UExpr) -> Self {
        UExpr::ArrayAccess {
            expr: Box::new(expr),
            index: Box::new(index),
        }
    }

    /// The logical negation of this boolean pattern.
    pub fn negate(&self) -> UExpr {
        match self {
            UExpr::Unary {
                op: UnOp::Not,
                expr,
            } => (**expr).clone(),
            UExpr::Binary { lhs, op, rhs } => {
                let flipped = match op {
                    BinOp::Eq => Some(BinOp::Ne),
                    BinOp::Ne => Some(BinOp::Eq),
                    BinOp::Lt => Some(BinOp::Ge),
                    BinOp::Ge => Some(BinOp::Lt),
                    BinOp::Gt => Some(BinOp::Le),
                    BinOp::Le => Some(BinOp::Gt),
                    _ => None,
                };
                match (flipped, op) {
                    (Some(op), _) => UExpr::binary((**lhs).clone(), op, (**rhs).clone()),
                    (None, BinOp::And) => UExpr::binary(lhs.negate(), BinOp::Or, rhs.negate()),
                    (None, BinOp::Or) => UExpr::binary(lhs.negate(), BinOp::And, rhs.negate()),
                    _ => UExpr::unary(UnOp::Not, self.clone()),
                }
            }
            UExpr::Literal {
                value: ULiteral::Bool(b),
            } => UExpr::literal(ULiteral::Bool(!b)),
            UExpr::Parens { expr } => UExpr::parens(expr.negate()),
            _ => UExpr::unary(UnOp::Not, self.clone()),
        }
    }
}

// ======= unification =======

impl Unifiable<Expr> for UExpr {
    fn unify<'a>(&self, target: &'a Expr, unifier: Unifier<'a>) -> Unify<'a> {
        use ExprKind as K;
        match (self, &target.kind) {
            (UExpr::Free { name }, _) => {
                let unifier = require(is_value(target), unifier)?;
                unifier.bind_expr(name, target)
            }
            (UExpr::ClassIdent { class }, _) => class.unify(target, unifier),
            (UExpr::LocalIdent { name }, K::Ident { name: target_name, sym }) => {
                let is_local = matches!(sym, Some(refit_types::Symbol::Local { .. }));
                require(is_local, unifier)?.bind_local(name, target_name)
            }
            (UExpr::Literal { value }, K::Lit(lit)) => require(value.matches(lit), unifier),
            (UExpr::Parens { expr }, K::Paren(inner)) => expr.unify(&**inner, unifier),
            (
                UExpr::MemberSelect { expr, name },
                K::Field {
                    target: selected,
                    name: target_name,
                    ..
                },
            ) => {
                let unifier = require(name == target_name, unifier)?;
                expr.unify(&**selected, unifier)
            }
            (UExpr::MethodInvocation { method, args }, K::Call { callee, args: actual }) => {
                let unifier = method.unify(&**callee, unifier)?;
                unify_list(args, actual, unifier)
            }
            (UExpr::Unary { op, expr }, K::Unary { op: target_op, expr: operand }) => {
                let unifier = require(op == target_op, unifier)?;
                expr.unify(&**operand, unifier)
            }
            (
                UExpr::Binary { lhs, op, rhs },
                K::Binary {
                    lhs: tl,
                    op: top,
                    rhs: tr,
                },
            )
            | (
                UExpr::AssignOp { lhs, op, rhs },
                K::AssignOp {
                    lhs: tl,
                    op: top,
                    rhs: tr,
                },
            ) => {
                let unifier = require(op == top, unifier)?;
                let unifier = lhs.unify(&**tl, unifier)?;
                rhs.unify(&**tr, unifier)
            }
            (
                UExpr::Conditional { cond, then_, else_ },
                K::Cond {
                    cond: tc,
                    then_: tt,
                    else_: te,
                },
            ) => {
                let unifier = cond.unify(&**tc, unifier)?;
                let unifier = then_.unify(&**tt, unifier)?;
                else_.unify(&**te, unifier)
            }
            (UExpr::Assign { lhs, rhs }, K::Assign { lhs: tl, rhs: tr }) => {
                let unifier = lhs.unify(&**tl, unifier)?;
                rhs.unify(&**tr, unifier)
            }
            (UExpr::TypeCast { ty, expr }, K::Cast { ty: tt, expr: te }) => {
                let unifier = ty.unify(tt, unifier)?;
                expr.unify(&**te, unifier)
            }
            (UExpr::InstanceOf { expr, ty }, K::InstanceOf { expr: te, ty: tt }) => {
                let unifier = expr.unify(&**te, unifier)?;
                ty.unify(tt, unifier)
            }
            (
                UExpr::ArrayAccess { expr, index },
                K::Index {
                    target: tt,
                    index: ti,
                },
            ) => {
                let unifier = expr.unify(&**tt, unifier)?;
                index.unify(&**ti, unifier)
            }
            _ => Err(Mismatch),
        }
    }
}

// ======= inlining =======

impl Inlineable for UExpr {
    type Output = Expr;

    fn inline(&self, inliner: &mut Inliner<'_>) -> Result<Expr, CouldNotResolveImport> {
        let kind = match self {
            UExpr::Free { name } => {
                return Ok(match inliner.expr_binding(name) {
                    Some(bound) => bound.clone(),
                    None => Expr::ident(name.clone()),
                })
            }
            UExpr::ClassIdent { class } => return class.inline(inliner),
            UExpr::LocalIdent { name } => {
                let bound = inliner.local_binding(name).unwrap_or(name.as_str());
                return Ok(Expr::ident(bound));
            }
            UExpr::Literal { value } => ExprKind::Lit(value.to_lit()),
            UExpr::Parens { expr } => ExprKind::Paren(boxed(expr, inliner)?),
            UExpr::MemberSelect { expr, name } => ExprKind::Field {
                target: boxed(expr, inliner)?,
                name: name.clone(),
                sym: None,
            },
            UExpr::MethodInvocation { method, args } => ExprKind::Call {
                callee: boxed(method, inliner)?,
                args: args
                    .iter()
                    .map(|a| a.inline(inliner))
                    .collect::<Result<_, _>>()?,
            },
            UExpr::Unary { op, expr } => ExprKind::Unary {
                op: *op,
                expr: boxed(expr, inliner)?,
            },
            UExpr::Binary { lhs, op, rhs } => ExprKind::Binary {
                lhs: boxed(lhs, inliner)?,
                op: *op,
                rhs: boxed(rhs, inliner)?,
            },
            UExpr::Conditional { cond, then_, else_ } => ExprKind::Cond {
                cond: boxed(cond, inliner)?,
                then_: boxed(then_, inliner)?,
                else_: boxed(else_, inliner)?,
            },
            UExpr::Assign { lhs, rhs } => ExprKind::Assign {
                lhs: boxed(lhs, inliner)?,
                rhs: boxed(rhs, inliner)?,
            },
            UExpr::AssignOp { lhs, op, rhs } => ExprKind::AssignOp {
                lhs: boxed(lhs, inliner)?,
                op: *op,
                rhs: boxed(rhs, inliner)?,
            },
            UExpr::TypeCast { ty, expr } => ExprKind::Cast {
                ty: ty.inline(inliner)?,
                expr: boxed(expr, inliner)?,
            },
            UExpr::InstanceOf { expr, ty } => ExprKind::InstanceOf {
                expr: boxed(expr, inliner)?,
                ty: ty.inline(inliner)?,
            },
            UExpr::ArrayAccess { expr, index } => ExprKind::Index {
                target: boxed(expr, inliner)?,
                index: boxed(index, inliner)?,
            },
        };
        Ok(Expr::synth(kind))
    }
}

fn boxed(e: &UExpr, inliner: &mut Inliner<'_>) -> Result<Box<Expr>, CouldNotResolveImport> {
    e.inline(inliner).map(Box::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn equals(a: UExpr, b: UExpr) -> UExpr {
        UExpr::invoke(UExpr::select(a, "equals"), vec![b])
    }

    #[test]
    fn negation_flips_comparisons_and_strips_not() {
        let lt = UExpr::binary(UExpr::free("a"), BinOp::Lt, UExpr::free("b"));
        assert_eq!(
            lt.negate(),
            UExpr::binary(UExpr::free("a"), BinOp::Ge, UExpr::free("b"))
        );

        let call = equals(UExpr::free("a"), UExpr::free("b"));
        let not_call = call.negate();
        assert_eq!(not_call, UExpr::unary(UnOp::Not, call.clone()));
        assert_eq!(not_call.negate(), call);
    }

    #[test]
    fn negation_applies_de_morgan() {
        let and = UExpr::binary(
            UExpr::free("p"),
            BinOp::And,
            UExpr::binary(UExpr::free("a"), BinOp::Eq, UExpr::free("b")),
        );
        assert_eq!(
            and.negate(),
            UExpr::binary(
                UExpr::unary(UnOp::Not, UExpr::free("p")),
                BinOp::Or,
                UExpr::binary(UExpr::free("a"), BinOp::Ne, UExpr::free("b")),
            )
        );
        assert_eq!(
            UExpr::literal(ULiteral::Bool(true)).negate(),
            UExpr::literal(ULiteral::Bool(false))
        );
    }

    #[test]
    fn patterns_round_trip_through_json() {
        let pattern = UExpr::invoke(
            UExpr::select(UExpr::class("java.util.Objects"), "equals"),
            vec![UExpr::free("a"), UExpr::free("b")],
        );
        let json = serde_json::to_string(&pattern).unwrap();
        assert!(json.contains(r#""class":"java.util.Objects""#), "{json}");
        let back: UExpr = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pattern);
    }
}
