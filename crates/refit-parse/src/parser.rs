use crate::lexer::Lexer;
use crate::token::{Tok, TokKind};
use anyhow::{bail, Result};
use refit_ast::ast::{
    BinOp, Block, ClassDecl, CompilationUnit, Expr, ExprKind, FieldDecl, Ident, Import, Lit,
    Member, MethodDecl, Param, QualName, Stmt, TypeExpr, TypeExprKind, UnOp,
};
use refit_ast::span::Span;

pub fn parse_str(_file: &str, src: &str) -> Result<CompilationUnit> {
    let mut p = Parser::new(src);
    p.parse_unit()
}

/// Parses a single expression; the whole input must be consumed.
pub fn parse_expr_str(src: &str) -> Result<Expr> {
    let mut p = Parser::new(src);
    let e = p.parse_expr()?;
    p.expect_eof()?;
    Ok(e)
}

struct Parser {
    toks: Vec<Tok>,
    pos: usize,
}

impl Parser {
    fn new(src: &str) -> Self {
        Self {
            toks: Lexer::new(src).tokenize(),
            pos: 0,
        }
    }

    fn cur(&self) -> &Tok {
        // `tokenize` always ends with Eof and we never bump past it.
        &self.toks[self.pos.min(self.toks.len() - 1)]
    }

    fn kind_at(&self, offset: usize) -> &TokKind {
        let i = (self.pos + offset).min(self.toks.len() - 1);
        &self.toks[i].kind
    }

    /// Whether the token at `offset` starts exactly where the previous one ends.
    fn adjacent(&self, offset: usize) -> bool {
        let i = self.pos + offset;
        i > 0 && i < self.toks.len() && self.toks[i - 1].span.end == self.toks[i].span.start
    }

    fn bump(&mut self) -> Tok {
        let t = self.cur().clone();
        if self.pos < self.toks.len() - 1 {
            self.pos += 1;
        }
        t
    }

    fn prev_end(&self) -> u32 {
        match self.pos {
            0 => 0,
            i => self.toks[i - 1].span.end,
        }
    }

    fn span_from(&self, start: u32) -> Span {
        Span {
            start,
            end: self.prev_end(),
        }
    }

    fn at(&self, k: &TokKind) -> bool {
        std::mem::discriminant(&self.cur().kind) == std::mem::discriminant(k)
    }

    fn eat(&mut self, k: &TokKind) -> bool {
        if self.at(k) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, k: TokKind) -> Result<Tok> {
        if self.at(&k) {
            Ok(self.bump())
        } else {
            bail!(
                "expected {:?}, found {:?} at {}",
                k,
                self.cur().kind,
                self.cur().span.start
            )
        }
    }

    fn expect_eof(&self) -> Result<()> {
        match &self.cur().kind {
            TokKind::Eof => Ok(()),
            other => bail!("unexpected trailing input: {:?}", other),
        }
    }

    // ======= compilation unit / declarations =======

    fn parse_unit(&mut self) -> Result<CompilationUnit> {
        let start = self.cur().span.start;
        let package = if self.eat(&TokKind::KwPackage) {
            let name = self.parse_qual_name()?;
            self.expect(TokKind::Semicolon)?;
            Some(name)
        } else {
            None
        };

        let mut imports = Vec::new();
        while self.at(&TokKind::KwImport) {
            imports.push(self.parse_import()?);
        }

        let mut classes = Vec::new();
        while !matches!(self.cur().kind, TokKind::Eof) {
            self.parse_modifiers();
            classes.push(self.parse_class()?);
        }
        Ok(CompilationUnit {
            package,
            imports,
            classes,
            span: self.span_from(start),
        })
    }

    fn parse_ident(&mut self) -> Result<Ident> {
        match &self.cur().kind {
            TokKind::Ident(s) => {
                let id = Ident {
                    text: s.clone(),
                    span: self.cur().span,
                };
                self.bump();
                Ok(id)
            }
            other => bail!("expected identifier, found {:?}", other),
        }
    }

    fn parse_qual_name(&mut self) -> Result<QualName> {
        let start = self.cur().span.start;
        let mut segments = vec![self.parse_ident()?];
        while matches!(self.cur().kind, TokKind::Dot)
            && matches!(self.kind_at(1), TokKind::Ident(_))
        {
            self.bump();
            segments.push(self.parse_ident()?);
        }
        Ok(QualName {
            segments,
            span: self.span_from(start),
        })
    }

    fn parse_import(&mut self) -> Result<Import> {
        let start = self.cur().span.start;
        self.expect(TokKind::KwImport)?;
        let name = self.parse_qual_name()?;
        let on_demand = if self.eat(&TokKind::Dot) {
            self.expect(TokKind::Star)?;
            true
        } else {
            false
        };
        self.expect(TokKind::Semicolon)?;
        Ok(Import {
            name,
            on_demand,
            span: self.span_from(start),
        })
    }

    /// Skips access modifiers; returns whether `static` was present.
    fn parse_modifiers(&mut self) -> bool {
        let mut is_static = false;
        loop {
            match self.cur().kind {
                TokKind::KwModifier => {}
                TokKind::KwStatic => is_static = true,
                _ => return is_static,
            }
            self.bump();
        }
    }

    fn parse_class(&mut self) -> Result<ClassDecl> {
        let start = self.cur().span.start;
        self.expect(TokKind::KwClass)?;
        let name = self.parse_ident()?;
        let superclass = if self.eat(&TokKind::KwExtends) {
            Some(self.parse_type()?)
        } else {
            None
        };
        self.expect(TokKind::LBrace)?;
        let mut members = Vec::new();
        while !matches!(self.cur().kind, TokKind::RBrace | TokKind::Eof) {
            members.push(self.parse_member()?);
        }
        self.expect(TokKind::RBrace)?;
        Ok(ClassDecl {
            name,
            superclass,
            members,
            span: self.span_from(start),
        })
    }

    fn parse_member(&mut self) -> Result<Member> {
        let start = self.cur().span.start;
        let is_static = self.parse_modifiers();
        let ty = self.parse_type()?;
        let name = self.parse_ident()?;

        if self.eat(&TokKind::LParen) {
            let mut params = Vec::new();
            if !matches!(self.cur().kind, TokKind::RParen) {
                loop {
                    let pstart = self.cur().span.start;
                    let pty = self.parse_type()?;
                    let pname = self.parse_ident()?;
                    params.push(Param {
                        ty: pty,
                        name: pname,
                        span: self.span_from(pstart),
                    });
                    if !self.eat(&TokKind::Comma) {
                        break;
                    }
                }
            }
            self.expect(TokKind::RParen)?;
            let body = self.parse_block()?;
            return Ok(Member::Method(MethodDecl {
                is_static,
                ret_ty: ty,
                name,
                params,
                body,
                span: self.span_from(start),
            }));
        }

        let init = if self.eat(&TokKind::Eq) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        self.expect(TokKind::Semicolon)?;
        Ok(Member::Field(FieldDecl {
            is_static,
            ty,
            name,
            init,
            span: self.span_from(start),
        }))
    }

    fn parse_type(&mut self) -> Result<TypeExpr> {
        let start = self.cur().span.start;
        let mut ty = match self.cur().kind.clone() {
            TokKind::KwPrim(kind) => {
                self.bump();
                TypeExprKind::Primitive(kind)
            }
            TokKind::Ident(_) => {
                let path = self
                    .parse_qual_name()?
                    .segments
                    .into_iter()
                    .map(|s| s.text)
                    .collect();
                let mut args = Vec::new();
                if self.eat(&TokKind::Lt) {
                    loop {
                        args.push(self.parse_type()?);
                        if !self.eat(&TokKind::Comma) {
                            break;
                        }
                    }
                    self.expect(TokKind::Gt)?;
                }
                TypeExprKind::Named {
                    path,
                    args,
                    class: None,
                }
            }
            other => bail!("expected type, found {:?}", other),
        };
        while matches!(self.cur().kind, TokKind::LBracket)
            && matches!(self.kind_at(1), TokKind::RBracket)
        {
            self.bump();
            self.bump();
            ty = TypeExprKind::Array(Box::new(TypeExpr {
                kind: ty,
                span: self.span_from(start),
            }));
        }
        Ok(TypeExpr {
            kind: ty,
            span: self.span_from(start),
        })
    }

    // ======= blocks and statements =======

    fn parse_block(&mut self) -> Result<Block> {
        let start = self.cur().span.start;
        self.expect(TokKind::LBrace)?;
        let mut stmts = Vec::new();
        while !matches!(self.cur().kind, TokKind::RBrace | TokKind::Eof) {
            stmts.push(self.parse_stmt()?);
        }
        self.expect(TokKind::RBrace)?;
        Ok(Block {
            stmts,
            span: self.span_from(start),
        })
    }

    fn parse_stmt(&mut self) -> Result<Stmt> {
        let start = self.cur().span.start;
        match self.cur().kind {
            TokKind::LBrace => Ok(Stmt::Block(self.parse_block()?)),
            TokKind::KwIf => {
                self.bump();
                self.expect(TokKind::LParen)?;
                let cond = self.parse_expr()?;
                self.expect(TokKind::RParen)?;
                let then_ = Box::new(self.parse_stmt()?);
                let else_ = if self.eat(&TokKind::KwElse) {
                    Some(Box::new(self.parse_stmt()?))
                } else {
                    None
                };
                Ok(Stmt::If {
                    cond,
                    then_,
                    else_,
                    span: self.span_from(start),
                })
            }
            TokKind::KwWhile => {
                self.bump();
                self.expect(TokKind::LParen)?;
                let cond = self.parse_expr()?;
                self.expect(TokKind::RParen)?;
                let body = Box::new(self.parse_stmt()?);
                Ok(Stmt::While {
                    cond,
                    body,
                    span: self.span_from(start),
                })
            }
            TokKind::KwReturn => {
                self.bump();
                let value = if matches!(self.cur().kind, TokKind::Semicolon) {
                    None
                } else {
                    Some(self.parse_expr()?)
                };
                self.expect(TokKind::Semicolon)?;
                Ok(Stmt::Return {
                    value,
                    span: self.span_from(start),
                })
            }
            _ => {
                if let Some((ty, name)) = self.try_local_head() {
                    let init = if self.eat(&TokKind::Eq) {
                        Some(self.parse_expr()?)
                    } else {
                        None
                    };
                    self.expect(TokKind::Semicolon)?;
                    return Ok(Stmt::Local {
                        ty,
                        name,
                        init,
                        span: self.span_from(start),
                    });
                }
                let expr = self.parse_expr()?;
                self.expect(TokKind::Semicolon)?;
                Ok(Stmt::Expr {
                    expr,
                    span: self.span_from(start),
                })
            }
        }
    }

    /// `Type name` followed by `=` or `;` starts a local declaration.
    /// Anything else rewinds and is parsed as an expression statement.
    fn try_local_head(&mut self) -> Option<(TypeExpr, Ident)> {
        let save = self.pos;
        self.parse_modifiers();
        if let Ok(ty) = self.parse_type() {
            if matches!(self.cur().kind, TokKind::Ident(_))
                && matches!(self.kind_at(1), TokKind::Eq | TokKind::Semicolon)
            {
                if let Ok(name) = self.parse_ident() {
                    return Some((ty, name));
                }
            }
        }
        self.pos = save;
        None
    }

    // ======= expressions =======
    //
    // Binary operators are parsed by precedence climbing over the levels in
    // `refit_ast::prec`; all of them are left-associative.

    fn parse_expr(&mut self) -> Result<Expr> {
        let start = self.cur().span.start;
        let lhs = self.parse_cond()?;

        if self.eat(&TokKind::Eq) {
            let rhs = self.parse_expr()?;
            return Ok(Expr::new(
                ExprKind::Assign {
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                self.span_from(start),
            ));
        }
        if let Some((op, ntoks)) = self.peek_assign_op() {
            for _ in 0..ntoks {
                self.bump();
            }
            let rhs = self.parse_expr()?;
            return Ok(Expr::new(
                ExprKind::AssignOp {
                    lhs: Box::new(lhs),
                    op,
                    rhs: Box::new(rhs),
                },
                self.span_from(start),
            ));
        }
        Ok(lhs)
    }

    fn peek_assign_op(&self) -> Option<(BinOp, usize)> {
        match &self.cur().kind {
            TokKind::OpEq(op) => {
                let op = match op.as_str() {
                    "+" => BinOp::Add,
                    "-" => BinOp::Sub,
                    "*" => BinOp::Mul,
                    "/" => BinOp::Div,
                    "%" => BinOp::Rem,
                    "&" => BinOp::BitAnd,
                    "|" => BinOp::BitOr,
                    "^" => BinOp::BitXor,
                    "<<" => BinOp::Shl,
                    _ => return None,
                };
                Some((op, 1))
            }
            TokKind::Gt => match (self.kind_at(1), self.kind_at(2)) {
                (TokKind::Ge, _) if self.adjacent(1) => Some((BinOp::Shr, 2)),
                (TokKind::Gt, TokKind::Ge) if self.adjacent(1) && self.adjacent(2) => {
                    Some((BinOp::UShr, 3))
                }
                _ => None,
            },
            _ => None,
        }
    }

    fn parse_cond(&mut self) -> Result<Expr> {
        let start = self.cur().span.start;
        let cond = self.parse_binary(refit_ast::prec::OR)?;
        if !self.eat(&TokKind::Question) {
            return Ok(cond);
        }
        let then_ = self.parse_expr()?;
        self.expect(TokKind::Colon)?;
        let else_ = self.parse_cond()?;
        Ok(Expr::new(
            ExprKind::Cond {
                cond: Box::new(cond),
                then_: Box::new(then_),
                else_: Box::new(else_),
            },
            self.span_from(start),
        ))
    }

    /// Binary operator at the cursor and the number of tokens it spans.
    fn peek_binop(&self) -> Option<(BinOp, usize)> {
        let op = match self.cur().kind {
            TokKind::OrOr => BinOp::Or,
            TokKind::AndAnd => BinOp::And,
            TokKind::Pipe => BinOp::BitOr,
            TokKind::Caret => BinOp::BitXor,
            TokKind::Amp => BinOp::BitAnd,
            TokKind::EqEq => BinOp::Eq,
            TokKind::BangEq => BinOp::Ne,
            TokKind::Lt => BinOp::Lt,
            TokKind::Le => BinOp::Le,
            TokKind::Ge => BinOp::Ge,
            TokKind::Shl => BinOp::Shl,
            TokKind::Plus => BinOp::Add,
            TokKind::Minus => BinOp::Sub,
            TokKind::Star => BinOp::Mul,
            TokKind::Slash => BinOp::Div,
            TokKind::Percent => BinOp::Rem,
            TokKind::Gt => {
                return match (self.kind_at(1), self.kind_at(2)) {
                    (TokKind::Gt, TokKind::Gt) if self.adjacent(1) && self.adjacent(2) => {
                        Some((BinOp::UShr, 3))
                    }
                    (TokKind::Gt, TokKind::Ge) if self.adjacent(1) && self.adjacent(2) => None,
                    (TokKind::Gt, _) if self.adjacent(1) => Some((BinOp::Shr, 2)),
                    (TokKind::Ge, _) if self.adjacent(1) => None,
                    _ => Some((BinOp::Gt, 1)),
                }
            }
            _ => return None,
        };
        Some((op, 1))
    }

    fn parse_binary(&mut self, min_prec: u8) -> Result<Expr> {
        let start = self.cur().span.start;
        let mut lhs = self.parse_unary()?;

        loop {
            if matches!(self.cur().kind, TokKind::KwInstanceof) {
                if refit_ast::prec::ORD < min_prec {
                    break;
                }
                self.bump();
                let ty = self.parse_type()?;
                lhs = Expr::new(
                    ExprKind::InstanceOf {
                        expr: Box::new(lhs),
                        ty,
                    },
                    self.span_from(start),
                );
                continue;
            }

            let Some((op, ntoks)) = self.peek_binop() else {
                break;
            };
            if op.prec() < min_prec {
                break;
            }
            for _ in 0..ntoks {
                self.bump();
            }
            let rhs = self.parse_binary(op.prec() + 1)?;
            lhs = Expr::new(
                ExprKind::Binary {
                    lhs: Box::new(lhs),
                    op,
                    rhs: Box::new(rhs),
                },
                self.span_from(start),
            );
        }

        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        let start = self.cur().span.start;
        let op = match self.cur().kind {
            TokKind::Bang => Some(UnOp::Not),
            TokKind::Minus => Some(UnOp::Neg),
            TokKind::Plus => Some(UnOp::Pos),
            TokKind::Tilde => Some(UnOp::BitNot),
            TokKind::PlusPlus => Some(UnOp::PreInc),
            TokKind::MinusMinus => Some(UnOp::PreDec),
            _ => None,
        };
        if let Some(op) = op {
            self.bump();
            let inner = self.parse_unary()?;
            return Ok(Expr::new(
                ExprKind::Unary {
                    op,
                    expr: Box::new(inner),
                },
                self.span_from(start),
            ));
        }

        if matches!(self.cur().kind, TokKind::LParen) && self.looks_like_cast() {
            self.bump();
            let ty = self.parse_type()?;
            self.expect(TokKind::RParen)?;
            let inner = self.parse_unary()?;
            return Ok(Expr::new(
                ExprKind::Cast {
                    ty,
                    expr: Box::new(inner),
                },
                self.span_from(start),
            ));
        }

        self.parse_postfix()
    }

    /// `(Type)` followed by something that can only start an operand.
    fn looks_like_cast(&mut self) -> bool {
        if matches!(self.kind_at(1), TokKind::KwPrim(_)) {
            return true;
        }
        let save = self.pos;
        self.bump();
        let is_cast = self.parse_type().is_ok()
            && self.eat(&TokKind::RParen)
            && matches!(
                self.cur().kind,
                TokKind::Ident(_)
                    | TokKind::LParen
                    | TokKind::Bang
                    | TokKind::Tilde
                    | TokKind::Int(_)
                    | TokKind::Long(_)
                    | TokKind::Double(_)
                    | TokKind::Char(_)
                    | TokKind::Str(_)
                    | TokKind::KwTrue
                    | TokKind::KwFalse
                    | TokKind::KwNull
            );
        self.pos = save;
        is_cast
    }

    fn parse_postfix(&mut self) -> Result<Expr> {
        let start = self.cur().span.start;
        let mut e = self.parse_primary()?;
        loop {
            let kind = match self.cur().kind {
                TokKind::Dot => {
                    self.bump();
                    let name = self.parse_ident()?;
                    ExprKind::Field {
                        target: Box::new(e),
                        name: name.text,
                        sym: None,
                    }
                }
                TokKind::LParen => {
                    let args = self.parse_call_args()?;
                    ExprKind::Call {
                        callee: Box::new(e),
                        args,
                    }
                }
                TokKind::LBracket => {
                    self.bump();
                    let index = self.parse_expr()?;
                    self.expect(TokKind::RBracket)?;
                    ExprKind::Index {
                        target: Box::new(e),
                        index: Box::new(index),
                    }
                }
                TokKind::PlusPlus | TokKind::MinusMinus => {
                    let op = if matches!(self.bump().kind, TokKind::PlusPlus) {
                        UnOp::PostInc
                    } else {
                        UnOp::PostDec
                    };
                    ExprKind::Unary {
                        op,
                        expr: Box::new(e),
                    }
                }
                _ => break,
            };
            e = Expr::new(kind, self.span_from(start));
        }
        Ok(e)
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        let tok = self.bump();
        let lit = |l: Lit| Ok(Expr::new(ExprKind::Lit(l), tok.span));
        match tok.kind {
            TokKind::Int(v) => lit(Lit::Int(v)),
            TokKind::Long(v) => lit(Lit::Long(v)),
            TokKind::Double(v) => lit(Lit::Double(v)),
            TokKind::Char(c) => lit(Lit::Char(c)),
            TokKind::Str(ref s) => lit(Lit::Str(s.clone())),
            TokKind::KwTrue => lit(Lit::Bool(true)),
            TokKind::KwFalse => lit(Lit::Bool(false)),
            TokKind::KwNull => lit(Lit::Null),
            TokKind::Ident(ref name) => Ok(Expr::new(
                ExprKind::Ident {
                    name: name.clone(),
                    sym: None,
                },
                tok.span,
            )),
            TokKind::LParen => {
                let inner = self.parse_expr()?;
                let end_tok = self.expect(TokKind::RParen)?;
                Ok(Expr::new(
                    ExprKind::Paren(Box::new(inner)),
                    Span {
                        start: tok.span.start,
                        end: end_tok.span.end,
                    },
                ))
            }
            TokKind::Error(ref msg) => bail!("lex error at {}: {}", tok.span.start, msg),
            ref other => bail!("unexpected token in expression: {:?}", other),
        }
    }

    fn parse_call_args(&mut self) -> Result<Vec<Expr>> {
        self.expect(TokKind::LParen)?; // we are at '('
        let mut args = Vec::new();
        if !matches!(self.cur().kind, TokKind::RParen) {
            loop {
                args.push(self.parse_expr()?);
                if self.eat(&TokKind::Comma) {
                    continue;
                }
                break;
            }
        }
        self.expect(TokKind::RParen)?;
        Ok(args)
    }
}
