//! Operator precedence levels used when printing expressions.
//!
//! An expression printed in a context of precedence `p` is parenthesized
//! iff its own precedence is lower than `p`.

use crate::ast::{BinOp, Expr, ExprKind, UnOp};

pub type Prec = u8;

pub const NO_PREC: Prec = 0;
pub const ASSIGN: Prec = 1;
pub const ASSIGNOP: Prec = 2;
pub const COND: Prec = 3;
pub const OR: Prec = 4;
pub const AND: Prec = 5;
pub const BITOR: Prec = 6;
pub const BITXOR: Prec = 7;
pub const BITAND: Prec = 8;
pub const EQ: Prec = 9;
pub const ORD: Prec = 10;
pub const SHIFT: Prec = 11;
pub const ADD: Prec = 12;
pub const MUL: Prec = 13;
pub const PREFIX: Prec = 14;
pub const POSTFIX: Prec = 15;

impl BinOp {
    pub fn prec(self) -> Prec {
        match self {
            BinOp::Or => OR,
            BinOp::And => AND,
            BinOp::BitOr => BITOR,
            BinOp::BitXor => BITXOR,
            BinOp::BitAnd => BITAND,
            BinOp::Eq | BinOp::Ne => EQ,
            BinOp::Lt | BinOp::Gt | BinOp::Le | BinOp::Ge => ORD,
            BinOp::Shl | BinOp::Shr | BinOp::UShr => SHIFT,
            BinOp::Add | BinOp::Sub => ADD,
            BinOp::Mul | BinOp::Div | BinOp::Rem => MUL,
        }
    }
}

impl UnOp {
    pub fn prec(self) -> Prec {
        if self.is_postfix() {
            POSTFIX
        } else {
            PREFIX
        }
    }
}

impl Expr {
    /// Precedence of the expression's own top-level operator.
    pub fn own_prec(&self) -> Prec {
        match &self.kind {
            ExprKind::Assign { .. } => ASSIGN,
            ExprKind::AssignOp { .. } => ASSIGNOP,
            ExprKind::Cond { .. } => COND,
            ExprKind::Binary { op, .. } => op.prec(),
            ExprKind::Unary { op, .. } => op.prec(),
            ExprKind::Cast { .. } => PREFIX,
            ExprKind::InstanceOf { .. } => ORD,
            ExprKind::Lit(_)
            | ExprKind::Ident { .. }
            | ExprKind::Field { .. }
            | ExprKind::Call { .. }
            | ExprKind::Index { .. }
            | ExprKind::Paren(_) => POSTFIX,
        }
    }
}
