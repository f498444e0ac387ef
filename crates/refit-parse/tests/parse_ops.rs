// Integration tests live outside the crate root, so we import from the public API.
use refit_ast::ast::{Expr, ExprKind, Lit};
use refit_parse::parse_expr_str;

/// Fully bracketed rendering of the tree shape.
fn shape(e: &Expr) -> String {
    match &e.kind {
        ExprKind::Lit(Lit::Int(n)) => n.to_string(),
        ExprKind::Lit(other) => format!("{:?}", other),
        ExprKind::Ident { name, .. } => name.clone(),
        ExprKind::Field { target, name, .. } => format!("{}.{}", shape(target), name),
        ExprKind::Call { callee, args } => {
            let args: Vec<String> = args.iter().map(shape).collect();
            format!("{}({})", shape(callee), args.join(", "))
        }
        ExprKind::Unary { op, expr } if op.is_postfix() => {
            format!("({}{})", shape(expr), op.symbol())
        }
        ExprKind::Unary { op, expr } => format!("({}{})", op.symbol(), shape(expr)),
        ExprKind::Binary { lhs, op, rhs } => {
            format!("({} {} {})", shape(lhs), op.symbol(), shape(rhs))
        }
        ExprKind::Cond { cond, then_, else_ } => {
            format!("({} ? {} : {})", shape(cond), shape(then_), shape(else_))
        }
        ExprKind::Assign { lhs, rhs } => format!("({} = {})", shape(lhs), shape(rhs)),
        ExprKind::AssignOp { lhs, op, rhs } => {
            format!("({} {}= {})", shape(lhs), op.symbol(), shape(rhs))
        }
        ExprKind::Cast { expr, .. } => format!("(cast {})", shape(expr)),
        ExprKind::InstanceOf { expr, .. } => format!("({} instanceof _)", shape(expr)),
        ExprKind::Index { target, index } => format!("{}[{}]", shape(target), shape(index)),
        ExprKind::Paren(inner) => format!("[{}]", shape(inner)),
    }
}

fn parsed(src: &str) -> String {
    shape(&parse_expr_str(src).expect("parse failed"))
}

#[test]
fn precedence_and_or_eq_rel_add_mul() {
    assert_eq!(
        parsed("1 + 2 * 3 == 7 && 4 < 5 || 0 == 1"),
        "((((1 + (2 * 3)) == 7) && (4 < 5)) || (0 == 1))"
    );
}

#[test]
fn binary_operators_are_left_associative() {
    assert_eq!(parsed("a - b - c"), "((a - b) - c)");
    assert_eq!(parsed("a / b * c"), "((a / b) * c)");
}

#[test]
fn assignment_is_right_associative() {
    assert_eq!(parsed("a = b = c"), "(a = (b = c))");
    assert_eq!(parsed("a += b -= 1"), "(a += (b -= 1))");
}

#[test]
fn conditional_nests_to_the_right() {
    assert_eq!(parsed("a ? b : c ? d : e"), "(a ? b : (c ? d : e))");
    assert_eq!(parsed("a || b ? c : d"), "((a || b) ? c : d)");
}

#[test]
fn shifts_are_assembled_from_angle_tokens() {
    assert_eq!(parsed("a >> 2 + 1"), "(a >> (2 + 1))");
    assert_eq!(parsed("a >>> b < c"), "((a >>> b) < c)");
    assert_eq!(parsed("a > b"), "(a > b)");
    assert_eq!(parsed("x >>= 1"), "(x >>= 1)");
    assert_eq!(parsed("x >>>= 1"), "(x >>>= 1)");
    assert_eq!(parsed("x <<= 1"), "(x <<= 1)");
}

#[test]
fn prefix_and_postfix_operators() {
    assert_eq!(parsed("!a.b()"), "(!a.b())");
    assert_eq!(parsed("-x++"), "(-(x++))");
    assert_eq!(parsed("- -x"), "(-(-x))");
    assert_eq!(parsed("a[i].length"), "a[i].length");
}

#[test]
fn casts_and_parenthesized_expressions() {
    assert_eq!(parsed("(int) x + 1"), "((cast x) + 1)");
    assert_eq!(parsed("(String) o"), "(cast o)");
    assert_eq!(parsed("(a) + b"), "([a] + b)");
    assert_eq!(parsed("(a + b) * c"), "([(a + b)] * c)");
}

#[test]
fn instanceof_binds_like_relational() {
    assert_eq!(
        parsed("o instanceof String && b"),
        "((o instanceof _) && b)"
    );
    assert_eq!(parsed("a == o instanceof String"), "(a == (o instanceof _))");
}
