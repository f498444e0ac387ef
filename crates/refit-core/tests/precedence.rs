//! Replacements keep their grouping in every parent slot, and re-parse to
//! the intended structure.

use pretty_assertions::assert_eq;
use refit_ast::ast::{BinOp, CompilationUnit};
use refit_ast::prec::NO_PREC;
use refit_ast::pretty::expr_to_string;
use refit_core::utree::{UExpr, ULiteral, UType};
use refit_core::{
    Annotations, CodeTransformer, DescriptionBasedDiff, ExpressionTemplate, HostContext,
    RefasterRule, Template,
};
use refit_parse::{parse_and_attribute, parse_expr_str};
use refit_types::{ClassPath, PrimKind};

fn max_of(args: Vec<UExpr>) -> UExpr {
    UExpr::invoke(UExpr::select(UExpr::class("java.lang.Math"), "max"), args)
}

/// `Math.max(a, b)` rewritten to `after`.
fn rule(after: UExpr) -> RefasterRule {
    let int = UType::prim(PrimKind::Int);
    let before = ExpressionTemplate::new(
        max_of(vec![UExpr::free("a"), UExpr::free("b")]),
        int.clone(),
    )
    .with_argument("a", int.clone())
    .with_argument("b", int.clone());
    let after = ExpressionTemplate::new(after, int);
    RefasterRule::new(
        "Max",
        vec![Template::Expression(before)],
        Template::Expression(after),
        Annotations::new(),
    )
    .expect("valid rule")
}

fn difference() -> UExpr {
    UExpr::binary(UExpr::free("a"), BinOp::Sub, UExpr::free("b"))
}

fn conditional() -> UExpr {
    UExpr::conditional(
        UExpr::binary(UExpr::free("a"), BinOp::Gt, UExpr::free("b")),
        UExpr::free("a"),
        UExpr::free("b"),
    )
}

/// `T.pick(c, a, b)` rewritten to `c ? a : b`, over arguments of type `ty`.
fn inline_pick(method: &str, ty: UType) -> RefasterRule {
    let before = ExpressionTemplate::new(
        UExpr::invoke(
            UExpr::select(UExpr::class("T"), method),
            vec![UExpr::free("c"), UExpr::free("a"), UExpr::free("b")],
        ),
        ty.clone(),
    )
    .with_argument("c", UType::boolean())
    .with_argument("a", ty.clone())
    .with_argument("b", ty.clone());
    let after = ExpressionTemplate::new(
        UExpr::conditional(UExpr::free("c"), UExpr::free("a"), UExpr::free("b")),
        ty,
    );
    RefasterRule::new(
        "InlinePick",
        vec![Template::Expression(before)],
        Template::Expression(after),
        Annotations::new(),
    )
    .expect("valid rule")
}

/// `Objects.equals(a, b)` rewritten to `a == b || a.equals(b)`.
fn same_or_equal() -> RefasterRule {
    let object = UType::class("java.lang.Object");
    let before = ExpressionTemplate::new(
        UExpr::invoke(
            UExpr::select(UExpr::class("java.util.Objects"), "equals"),
            vec![UExpr::free("a"), UExpr::free("b")],
        ),
        UType::boolean(),
    )
    .with_argument("a", object.clone())
    .with_argument("b", object);
    let after = ExpressionTemplate::new(
        UExpr::binary(
            UExpr::binary(UExpr::free("a"), BinOp::Eq, UExpr::free("b")),
            BinOp::Or,
            UExpr::invoke(
                UExpr::select(UExpr::free("a"), "equals"),
                vec![UExpr::free("b")],
            ),
        ),
        UType::boolean(),
    );
    RefasterRule::new(
        "SameOrEqual",
        vec![Template::Expression(before)],
        Template::Expression(after),
        Annotations::new(),
    )
    .expect("valid rule")
}

/// `a[i]` rewritten to `a[a.length - 1 - i]`.
fn from_the_end() -> RefasterRule {
    let int = UType::prim(PrimKind::Int);
    let before = ExpressionTemplate::new(
        UExpr::array_access(UExpr::free("a"), UExpr::free("i")),
        int.clone(),
    )
    .with_argument("a", UType::array(int.clone()))
    .with_argument("i", int.clone());
    let last = UExpr::binary(
        UExpr::select(UExpr::free("a"), "length"),
        BinOp::Sub,
        UExpr::literal(ULiteral::Int(1)),
    );
    let after = ExpressionTemplate::new(
        UExpr::array_access(
            UExpr::free("a"),
            UExpr::binary(last, BinOp::Sub, UExpr::free("i")),
        ),
        int,
    );
    RefasterRule::new(
        "FromTheEnd",
        vec![Template::Expression(before)],
        Template::Expression(after),
        Annotations::new(),
    )
    .expect("valid rule")
}

fn rewrite(after: UExpr, expr: &str) -> String {
    rewrite_with(&rule(after), expr)
}

/// Rewrites the one expression `expr` in a method with int locals `x`, `y`,
/// int arrays `xs`, `ys` and references `o`, `s`, and returns the
/// rewritten expression text.
fn rewrite_with(rule: &RefasterRule, expr: &str) -> String {
    let src = format!(
        "import java.util.Objects;\n\nclass T {{\n  long m(int x, int y, int[] xs, int[] ys, boolean c, Object o, String s) {{\n    return {expr};\n  }}\n\n  static Object pick(boolean c, Object a, Object b) {{\n    return a;\n  }}\n\n  static int[] pickArray(boolean c, int[] a, int[] b) {{\n    return a;\n  }}\n}}\n"
    );
    let mut cp = ClassPath::with_builtins();
    let unit: CompilationUnit = parse_and_attribute("<test>", &src, &mut cp).expect("attribution failed");
    let ctx = HostContext::new(&src, &unit, &cp);
    let mut diff = DescriptionBasedDiff::new(&unit);
    rule.apply(&ctx, &mut diff);
    let out = diff.apply_differences(&src).expect("diff failed");

    let start = out.find("return ").expect("return") + "return ".len();
    let end = out[start..].find(";\n").expect("semicolon") + start;
    out[start..end].to_string()
}

fn reparsed(text: &str) -> String {
    let e = parse_expr_str(text).expect("re-parse failed");
    expr_to_string(&e, NO_PREC)
}

#[test]
fn binary_operands() {
    assert_eq!(rewrite(difference(), "y * Math.max(x, y)"), "y * (x - y)");
    assert_eq!(rewrite(difference(), "Math.max(x, y) * y"), "(x - y) * y");
    assert_eq!(rewrite(difference(), "Math.max(x, y) - y"), "x - y - y");
    assert_eq!(rewrite(difference(), "y - Math.max(x, y)"), "y - (x - y)");
}

#[test]
fn conditional_slots() {
    assert_eq!(
        rewrite(conditional(), "y + Math.max(x, y)"),
        "y + (x > y ? x : y)"
    );
    assert_eq!(
        rewrite(conditional(), "c ? Math.max(x, y) : y"),
        "c ? x > y ? x : y : y"
    );
    assert_eq!(
        rewrite(conditional(), "c ? y : Math.max(x, y)"),
        "c ? y : x > y ? x : y"
    );
}

#[test]
fn cast_and_index_slots() {
    assert_eq!(rewrite(difference(), "(long) Math.max(x, y)"), "(long) (x - y)");
    assert_eq!(rewrite(difference(), "xs[Math.max(x, y)]"), "xs[x - y]");
}

#[test]
fn assignment_right_hand_side() {
    assert_eq!(rewrite(conditional(), "x = Math.max(x, y)"), "x = x > y ? x : y");
    assert_eq!(rewrite(difference(), "x += Math.max(x, y)"), "x += x - y");
}

#[test]
fn statement_context_needs_no_parens() {
    assert_eq!(rewrite(conditional(), "Math.max(x, y)"), "x > y ? x : y");
}

#[test]
fn rewritten_text_reparses_to_the_same_structure() {
    for (after, expr) in [
        (difference(), "y * Math.max(x, y)"),
        (difference(), "y - Math.max(x, y)"),
        (conditional(), "y + Math.max(x, y)"),
        (conditional(), "c ? Math.max(x, y) : y"),
        (difference(), "xs[Math.max(x, y)]"),
    ] {
        let text = rewrite(after, expr);
        assert_eq!(reparsed(&text), text);
    }
}

#[test]
fn conditional_condition_slot() {
    assert_eq!(
        rewrite_with(&same_or_equal(), "Objects.equals(o, s) ? x : y"),
        "o == s || o.equals(s) ? x : y"
    );
    assert_eq!(
        rewrite_with(&same_or_equal(), "!Objects.equals(o, s)"),
        "!(o == s || o.equals(s))"
    );
}

#[test]
fn assignment_left_hand_side() {
    assert_eq!(
        rewrite_with(&from_the_end(), "xs[x] = y"),
        "xs[xs.length - 1 - x] = y"
    );
    assert_eq!(
        rewrite_with(&from_the_end(), "xs[x] += y"),
        "xs[xs.length - 1 - x] += y"
    );
}

#[test]
fn postfix_and_instanceof_operands() {
    let object = UType::class("java.lang.Object");
    let array = UType::array(UType::prim(PrimKind::Int));
    assert_eq!(
        rewrite_with(&inline_pick("pick", object), "T.pick(c, o, s) instanceof String"),
        "(c ? o : s) instanceof String"
    );
    assert_eq!(
        rewrite_with(&inline_pick("pickArray", array.clone()), "T.pickArray(c, xs, ys)[x]"),
        "(c ? xs : ys)[x]"
    );
    assert_eq!(
        rewrite_with(&inline_pick("pickArray", array), "T.pickArray(c, xs, ys).length"),
        "(c ? xs : ys).length"
    );
}

#[test]
fn rewrites_in_every_slot_reparse_to_the_same_structure() {
    let object = UType::class("java.lang.Object");
    let array = UType::array(UType::prim(PrimKind::Int));
    for (rule, expr) in [
        (same_or_equal(), "Objects.equals(o, s) ? x : y"),
        (same_or_equal(), "!Objects.equals(o, s)"),
        (from_the_end(), "xs[x] = y"),
        (from_the_end(), "xs[x] += y"),
        (inline_pick("pick", object), "T.pick(c, o, s) instanceof String"),
        (inline_pick("pickArray", array.clone()), "T.pickArray(c, xs, ys)[x]"),
        (inline_pick("pickArray", array), "T.pickArray(c, xs, ys).length"),
    ] {
        let text = rewrite_with(&rule, expr);
        assert_eq!(reparsed(&text), text, "{expr}");
    }
}
