//! Source printer for expressions, statements and type trees.
//!
//! `print_expr` takes the precedence of the surrounding context and adds
//! parentheses only where the expression's own precedence is lower.

use std::fmt::{self, Write};

use crate::ast::{Block, Expr, ExprKind, Lit, Stmt, TypeExpr, TypeExprKind, UnOp};
use crate::prec::{self, Prec};

pub struct Pretty<'w, W: Write> {
    out: &'w mut W,
    /// Prefix written after every newline.
    base_indent: String,
    level: usize,
}

const INDENT: &str = "  ";

impl<'w, W: Write> Pretty<'w, W> {
    pub fn new(out: &'w mut W) -> Self {
        Self::with_indent(out, "")
    }

    /// A printer whose continuation lines start with `base_indent`.
    pub fn with_indent(out: &'w mut W, base_indent: &str) -> Self {
        Self {
            out,
            base_indent: base_indent.to_string(),
            level: 0,
        }
    }

    fn newline(&mut self) -> fmt::Result {
        self.out.write_char('\n')?;
        self.out.write_str(&self.base_indent)?;
        for _ in 0..self.level {
            self.out.write_str(INDENT)?;
        }
        Ok(())
    }

    fn open(&mut self, context: Prec, own: Prec) -> fmt::Result {
        if own < context {
            self.out.write_char('(')?;
        }
        Ok(())
    }

    fn close(&mut self, context: Prec, own: Prec) -> fmt::Result {
        if own < context {
            self.out.write_char(')')?;
        }
        Ok(())
    }

    pub fn print_expr(&mut self, e: &Expr, context: Prec) -> fmt::Result {
        let own = e.own_prec();
        self.open(context, own)?;
        match &e.kind {
            ExprKind::Lit(lit) => self.print_lit(lit)?,
            ExprKind::Ident { name, .. } => self.out.write_str(name)?,
            ExprKind::Field { target, name, .. } => {
                self.print_expr(target, prec::POSTFIX)?;
                write!(self.out, ".{}", name)?;
            }
            ExprKind::Call { callee, args } => {
                self.print_expr(callee, prec::POSTFIX)?;
                self.out.write_char('(')?;
                self.print_args(args)?;
                self.out.write_char(')')?;
            }
            ExprKind::Unary { op, expr } => {
                if op.is_postfix() {
                    self.print_expr(expr, own)?;
                    self.out.write_str(op.symbol())?;
                } else {
                    self.out.write_str(op.symbol())?;
                    // `- -x`, `+ +x` and `- -1` must not collapse into `--x`, `++x`, `--1`.
                    let collides = match &expr.kind {
                        ExprKind::Unary { op: inner, .. } => {
                            !inner.is_postfix() && inner.symbol().starts_with(op.symbol())
                        }
                        ExprKind::Lit(lit) => *op == UnOp::Neg && is_negative_number(lit),
                        _ => false,
                    };
                    if matches!(op, UnOp::Neg | UnOp::Pos) && collides {
                        self.out.write_char(' ')?;
                    }
                    self.print_expr(expr, own)?;
                }
            }
            ExprKind::Binary { lhs, op, rhs } => {
                self.print_expr(lhs, own)?;
                write!(self.out, " {} ", op.symbol())?;
                self.print_expr(rhs, own + 1)?;
            }
            ExprKind::Cond { cond, then_, else_ } => {
                self.print_expr(cond, prec::COND + 1)?;
                self.out.write_str(" ? ")?;
                self.print_expr(then_, prec::NO_PREC)?;
                self.out.write_str(" : ")?;
                self.print_expr(else_, prec::COND)?;
            }
            ExprKind::Assign { lhs, rhs } => {
                self.print_expr(lhs, prec::ASSIGN + 1)?;
                self.out.write_str(" = ")?;
                self.print_expr(rhs, prec::ASSIGN)?;
            }
            ExprKind::AssignOp { lhs, op, rhs } => {
                self.print_expr(lhs, prec::ASSIGNOP + 1)?;
                write!(self.out, " {}= ", op.symbol())?;
                self.print_expr(rhs, prec::ASSIGNOP)?;
            }
            ExprKind::Cast { ty, expr } => {
                self.out.write_char('(')?;
                self.print_type(ty)?;
                self.out.write_char(')')?;
                self.print_expr(expr, prec::PREFIX)?;
            }
            ExprKind::InstanceOf { expr, ty } => {
                self.print_expr(expr, prec::ORD)?;
                self.out.write_str(" instanceof ")?;
                self.print_type(ty)?;
            }
            ExprKind::Index { target, index } => {
                self.print_expr(target, prec::POSTFIX)?;
                self.out.write_char('[')?;
                self.print_expr(index, prec::NO_PREC)?;
                self.out.write_char(']')?;
            }
            ExprKind::Paren(inner) => {
                self.out.write_char('(')?;
                self.print_expr(inner, prec::NO_PREC)?;
                self.out.write_char(')')?;
            }
        }
        self.close(context, own)
    }

    fn print_args(&mut self, args: &[Expr]) -> fmt::Result {
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                self.out.write_str(", ")?;
            }
            self.print_expr(arg, prec::NO_PREC)?;
        }
        Ok(())
    }

    fn print_lit(&mut self, lit: &Lit) -> fmt::Result {
        match lit {
            Lit::Int(n) => write!(self.out, "{}", n),
            Lit::Long(n) => write!(self.out, "{}L", n),
            Lit::Double(x) => {
                if x.fract() == 0.0 && x.is_finite() {
                    write!(self.out, "{:.1}", x)
                } else {
                    write!(self.out, "{}", x)
                }
            }
            Lit::Bool(b) => write!(self.out, "{}", b),
            Lit::Char(c) => {
                self.out.write_char('\'')?;
                write_escaped(self.out, *c, '\'')?;
                self.out.write_char('\'')
            }
            Lit::Str(s) => {
                self.out.write_char('"')?;
                for c in s.chars() {
                    write_escaped(self.out, c, '"')?;
                }
                self.out.write_char('"')
            }
            Lit::Null => self.out.write_str("null"),
        }
    }

    pub fn print_type(&mut self, ty: &TypeExpr) -> fmt::Result {
        match &ty.kind {
            TypeExprKind::Primitive(kind) => self.out.write_str(kind.keyword()),
            TypeExprKind::Named { path, args, .. } => {
                self.out.write_str(&path.join("."))?;
                if !args.is_empty() {
                    self.out.write_char('<')?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            self.out.write_str(", ")?;
                        }
                        self.print_type(arg)?;
                    }
                    self.out.write_char('>')?;
                }
                Ok(())
            }
            TypeExprKind::Array(elem) => {
                self.print_type(elem)?;
                self.out.write_str("[]")
            }
        }
    }

    pub fn print_stmt(&mut self, stmt: &Stmt) -> fmt::Result {
        match stmt {
            Stmt::Local { ty, name, init, .. } => {
                self.print_type(ty)?;
                write!(self.out, " {}", name.text)?;
                if let Some(init) = init {
                    self.out.write_str(" = ")?;
                    self.print_expr(init, prec::NO_PREC)?;
                }
                self.out.write_char(';')
            }
            Stmt::Expr { expr, .. } => {
                self.print_expr(expr, prec::NO_PREC)?;
                self.out.write_char(';')
            }
            Stmt::If {
                cond, then_, else_, ..
            } => {
                self.out.write_str("if (")?;
                self.print_expr(cond, prec::NO_PREC)?;
                self.out.write_str(") ")?;
                self.print_stmt(then_)?;
                if let Some(else_) = else_ {
                    self.out.write_str(" else ")?;
                    self.print_stmt(else_)?;
                }
                Ok(())
            }
            Stmt::While { cond, body, .. } => {
                self.out.write_str("while (")?;
                self.print_expr(cond, prec::NO_PREC)?;
                self.out.write_str(") ")?;
                self.print_stmt(body)
            }
            Stmt::Return { value, .. } => {
                self.out.write_str("return")?;
                if let Some(value) = value {
                    self.out.write_char(' ')?;
                    self.print_expr(value, prec::NO_PREC)?;
                }
                self.out.write_char(';')
            }
            Stmt::Block(block) => self.print_block(block),
        }
    }

    pub fn print_block(&mut self, block: &Block) -> fmt::Result {
        self.out.write_char('{')?;
        self.level += 1;
        for stmt in &block.stmts {
            self.newline()?;
            self.print_stmt(stmt)?;
        }
        self.level -= 1;
        self.newline()?;
        self.out.write_char('}')
    }

    /// Prints statements one per line; the first line gets no indentation.
    pub fn print_stmts(&mut self, stmts: &[Stmt]) -> fmt::Result {
        for (i, stmt) in stmts.iter().enumerate() {
            if i > 0 {
                self.newline()?;
            }
            self.print_stmt(stmt)?;
        }
        Ok(())
    }
}

/// Literals that print with a leading minus sign.
fn is_negative_number(lit: &Lit) -> bool {
    match lit {
        Lit::Int(n) | Lit::Long(n) => *n < 0,
        Lit::Double(x) => x.is_sign_negative(),
        _ => false,
    }
}

fn write_escaped<W: Write>(out: &mut W, c: char, quote: char) -> fmt::Result {
    match c {
        '\n' => out.write_str("\\n"),
        '\t' => out.write_str("\\t"),
        '\r' => out.write_str("\\r"),
        '\\' => out.write_str("\\\\"),
        c if c == quote => {
            out.write_char('\\')?;
            out.write_char(c)
        }
        c => out.write_char(c),
    }
}

/// Renders `e` as it would appear in a context of precedence `context`.
pub fn expr_to_string(e: &Expr, context: Prec) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = Pretty::new(&mut out).print_expr(e, context);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::BinOp;
    use pretty_assertions::assert_eq;

    fn bin(lhs: Expr, op: BinOp, rhs: Expr) -> Expr {
        Expr::synth(ExprKind::Binary {
            lhs: Box::new(lhs),
            op,
            rhs: Box::new(rhs),
        })
    }

    #[test]
    fn right_operand_of_same_precedence_is_grouped() {
        let e = bin(
            Expr::ident("a"),
            BinOp::Sub,
            bin(Expr::ident("b"), BinOp::Sub, Expr::ident("c")),
        );
        assert_eq!(expr_to_string(&e, prec::NO_PREC), "a - (b - c)");

        let left = bin(
            bin(Expr::ident("a"), BinOp::Sub, Expr::ident("b")),
            BinOp::Sub,
            Expr::ident("c"),
        );
        assert_eq!(expr_to_string(&left, prec::NO_PREC), "a - b - c");
    }

    #[test]
    fn context_precedence_adds_parens() {
        let e = bin(Expr::ident("a"), BinOp::Add, Expr::ident("b"));
        assert_eq!(expr_to_string(&e, prec::MUL), "(a + b)");
        assert_eq!(expr_to_string(&e, prec::ADD), "a + b");
    }

    #[test]
    fn nested_negation_keeps_tokens_apart() {
        let e = Expr::synth(ExprKind::Unary {
            op: UnOp::Neg,
            expr: Box::new(Expr::synth(ExprKind::Unary {
                op: UnOp::Neg,
                expr: Box::new(Expr::ident("x")),
            })),
        });
        assert_eq!(expr_to_string(&e, prec::NO_PREC), "- -x");
    }

    #[test]
    fn negating_a_negative_literal_keeps_tokens_apart() {
        let neg = |lit| {
            Expr::synth(ExprKind::Unary {
                op: UnOp::Neg,
                expr: Box::new(Expr::synth(ExprKind::Lit(lit))),
            })
        };
        assert_eq!(expr_to_string(&neg(Lit::Int(-1)), prec::NO_PREC), "- -1");
        assert_eq!(expr_to_string(&neg(Lit::Long(-2)), prec::NO_PREC), "- -2L");
        assert_eq!(expr_to_string(&neg(Lit::Double(-0.5)), prec::NO_PREC), "- -0.5");
        assert_eq!(expr_to_string(&neg(Lit::Int(1)), prec::NO_PREC), "-1");

        let plus = Expr::synth(ExprKind::Unary {
            op: UnOp::Pos,
            expr: Box::new(Expr::synth(ExprKind::Lit(Lit::Int(-1)))),
        });
        assert_eq!(expr_to_string(&plus, prec::NO_PREC), "+-1");
    }

    #[test]
    fn literals_are_escaped() {
        let s = Expr::synth(ExprKind::Lit(Lit::Str("a\"b\n".into())));
        assert_eq!(expr_to_string(&s, prec::NO_PREC), r#""a\"b\n""#);
        let d = Expr::synth(ExprKind::Lit(Lit::Double(2.0)));
        assert_eq!(expr_to_string(&d, prec::NO_PREC), "2.0");
        let l = Expr::synth(ExprKind::Lit(Lit::Long(7)));
        assert_eq!(expr_to_string(&l, prec::NO_PREC), "7L");
    }
}
