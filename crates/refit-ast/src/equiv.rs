//! Structural equality that ignores spans and attributed types.

use crate::ast::{Expr, ExprKind, Stmt, TypeExpr, TypeExprKind};

impl Expr {
    /// Whether both trees have the same shape, names and literals.
    /// Symbols are compared only when both sides carry one.
    pub fn same_tree(&self, other: &Expr) -> bool {
        use ExprKind as K;
        match (&self.kind, &other.kind) {
            (K::Lit(a), K::Lit(b)) => a == b,
            (K::Ident { name: a, sym: sa }, K::Ident { name: b, sym: sb }) => {
                a == b && same_sym(sa, sb)
            }
            (
                K::Field {
                    target: ta,
                    name: a,
                    sym: sa,
                },
                K::Field {
                    target: tb,
                    name: b,
                    sym: sb,
                },
            ) => a == b && same_sym(sa, sb) && ta.same_tree(tb),
            (K::Call { callee: ca, args: aa }, K::Call { callee: cb, args: ab }) => {
                ca.same_tree(cb) && same_list(aa, ab)
            }
            (K::Unary { op: a, expr: ea }, K::Unary { op: b, expr: eb }) => {
                a == b && ea.same_tree(eb)
            }
            (
                K::Binary {
                    lhs: la,
                    op: a,
                    rhs: ra,
                },
                K::Binary {
                    lhs: lb,
                    op: b,
                    rhs: rb,
                },
            )
            | (
                K::AssignOp {
                    lhs: la,
                    op: a,
                    rhs: ra,
                },
                K::AssignOp {
                    lhs: lb,
                    op: b,
                    rhs: rb,
                },
            ) => a == b && la.same_tree(lb) && ra.same_tree(rb),
            (
                K::Cond {
                    cond: ca,
                    then_: ta,
                    else_: ea,
                },
                K::Cond {
                    cond: cb,
                    then_: tb,
                    else_: eb,
                },
            ) => ca.same_tree(cb) && ta.same_tree(tb) && ea.same_tree(eb),
            (K::Assign { lhs: la, rhs: ra }, K::Assign { lhs: lb, rhs: rb }) => {
                la.same_tree(lb) && ra.same_tree(rb)
            }
            (K::Cast { ty: ta, expr: ea }, K::Cast { ty: tb, expr: eb })
            | (K::InstanceOf { expr: ea, ty: ta }, K::InstanceOf { expr: eb, ty: tb }) => {
                ta.same_tree(tb) && ea.same_tree(eb)
            }
            (
                K::Index {
                    target: ta,
                    index: ia,
                },
                K::Index {
                    target: tb,
                    index: ib,
                },
            ) => ta.same_tree(tb) && ia.same_tree(ib),
            (K::Paren(a), K::Paren(b)) => a.same_tree(b),
            _ => false,
        }
    }
}

impl TypeExpr {
    pub fn same_tree(&self, other: &TypeExpr) -> bool {
        match (&self.kind, &other.kind) {
            (TypeExprKind::Primitive(a), TypeExprKind::Primitive(b)) => a == b,
            (
                TypeExprKind::Named {
                    path: pa,
                    args: aa,
                    class: ca,
                },
                TypeExprKind::Named {
                    path: pb,
                    args: ab,
                    class: cb,
                },
            ) => {
                let same_class = match (ca, cb) {
                    (Some(a), Some(b)) => a == b,
                    _ => pa == pb,
                };
                same_class
                    && aa.len() == ab.len()
                    && aa.iter().zip(ab).all(|(a, b)| a.same_tree(b))
            }
            (TypeExprKind::Array(a), TypeExprKind::Array(b)) => a.same_tree(b),
            _ => false,
        }
    }
}

impl Stmt {
    pub fn same_tree(&self, other: &Stmt) -> bool {
        match (self, other) {
            (
                Stmt::Local {
                    ty: ta,
                    name: na,
                    init: ia,
                    ..
                },
                Stmt::Local {
                    ty: tb,
                    name: nb,
                    init: ib,
                    ..
                },
            ) => ta.same_tree(tb) && na.text == nb.text && same_opt(ia, ib),
            (Stmt::Expr { expr: a, .. }, Stmt::Expr { expr: b, .. }) => a.same_tree(b),
            (
                Stmt::If {
                    cond: ca,
                    then_: ta,
                    else_: ea,
                    ..
                },
                Stmt::If {
                    cond: cb,
                    then_: tb,
                    else_: eb,
                    ..
                },
            ) => {
                ca.same_tree(cb)
                    && ta.same_tree(tb)
                    && match (ea, eb) {
                        (Some(a), Some(b)) => a.same_tree(b),
                        (None, None) => true,
                        _ => false,
                    }
            }
            (
                Stmt::While {
                    cond: ca, body: ba, ..
                },
                Stmt::While {
                    cond: cb, body: bb, ..
                },
            ) => ca.same_tree(cb) && ba.same_tree(bb),
            (Stmt::Return { value: a, .. }, Stmt::Return { value: b, .. }) => same_opt(a, b),
            (Stmt::Block(a), Stmt::Block(b)) => {
                a.stmts.len() == b.stmts.len()
                    && a.stmts.iter().zip(&b.stmts).all(|(x, y)| x.same_tree(y))
            }
            _ => false,
        }
    }
}

fn same_sym<T: PartialEq>(a: &Option<T>, b: &Option<T>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a == b,
        _ => true,
    }
}

fn same_list(a: &[Expr], b: &[Expr]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same_tree(y))
}

fn same_opt(a: &Option<Expr>, b: &Option<Expr>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.same_tree(b),
        (None, None) => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{Expr, ExprKind, Lit};
    use crate::span::Span;

    #[test]
    fn spans_do_not_matter() {
        let mut a = Expr::ident("x");
        a.span = Span::new(3, 4);
        let b = Expr::ident("x");
        assert!(a.same_tree(&b));
        assert!(!a.same_tree(&Expr::ident("y")));
    }

    #[test]
    fn parens_are_significant() {
        let x = Expr::ident("x");
        let px = Expr::synth(ExprKind::Paren(Box::new(Expr::ident("x"))));
        assert!(!x.same_tree(&px));
        let one = Expr::synth(ExprKind::Lit(Lit::Int(1)));
        assert!(one.same_tree(&one.clone()));
    }
}
