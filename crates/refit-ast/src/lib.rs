#![forbid(unsafe_code)]
#![deny(unused_must_use)]
#![warn(clippy::dbg_macro, clippy::todo, clippy::unimplemented)]

mod equiv;
pub mod path;
pub mod prec;
pub mod pretty;
pub mod scope;

pub mod span {
    use serde::Serialize;

    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
    pub struct Span {
        pub start: u32,
        pub end: u32,
    }

    impl Span {
        /// Span of synthesized nodes that have no source position.
        pub const DUMMY: Span = Span { start: 0, end: 0 };

        pub fn new(start: u32, end: u32) -> Self {
            Self { start, end }
        }

        /// Smallest span covering both.
        pub fn to(self, other: Span) -> Span {
            Span {
                start: self.start.min(other.start),
                end: self.end.max(other.end),
            }
        }

        pub fn len(self) -> u32 {
            self.end.saturating_sub(self.start)
        }

        pub fn is_empty(self) -> bool {
            self.len() == 0
        }

        pub fn range(self) -> std::ops::Range<usize> {
            self.start as usize..self.end as usize
        }
    }
}

pub mod ast {
    use super::span::Span;
    use refit_types::{PrimKind, Symbol, Type};
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize)]
    pub struct CompilationUnit {
        pub package: Option<QualName>,
        pub imports: Vec<Import>,
        pub classes: Vec<ClassDecl>,
        pub span: Span,
    }

    impl CompilationUnit {
        /// Dotted package name; empty for the unnamed package.
        pub fn package_name(&self) -> String {
            self.package.as_ref().map(QualName::text).unwrap_or_default()
        }
    }

    #[derive(Debug, Clone, Serialize)]
    pub struct QualName {
        pub segments: Vec<Ident>,
        pub span: Span,
    }

    impl QualName {
        pub fn text(&self) -> String {
            self.segments
                .iter()
                .map(|s| s.text.as_str())
                .collect::<Vec<_>>()
                .join(".")
        }
    }

    #[derive(Debug, Clone, Serialize)]
    pub struct Import {
        pub name: QualName,
        /// `import a.b.*;`
        pub on_demand: bool,
        pub span: Span,
    }

    #[derive(Debug, Clone, Serialize)]
    pub struct ClassDecl {
        pub name: Ident,
        pub superclass: Option<TypeExpr>,
        pub members: Vec<Member>,
        pub span: Span,
    }

    #[derive(Debug, Clone, Serialize)]
    pub enum Member {
        Field(FieldDecl),
        Method(MethodDecl),
    }

    #[derive(Debug, Clone, Serialize)]
    pub struct FieldDecl {
        pub is_static: bool,
        pub ty: TypeExpr,
        pub name: Ident,
        pub init: Option<Expr>,
        pub span: Span,
    }

    #[derive(Debug, Clone, Serialize)]
    pub struct MethodDecl {
        pub is_static: bool,
        pub ret_ty: TypeExpr,
        pub name: Ident,
        pub params: Vec<Param>,
        pub body: Block,
        pub span: Span,
    }

    #[derive(Debug, Clone, Serialize)]
    pub struct Param {
        pub ty: TypeExpr,
        pub name: Ident,
        pub span: Span,
    }

    #[derive(Debug, Clone, PartialEq, Serialize)]
    pub struct Ident {
        pub text: String,
        pub span: Span,
    }

    #[derive(Debug, Clone, Serialize)]
    pub struct TypeExpr {
        pub kind: TypeExprKind,
        pub span: Span,
    }

    #[derive(Debug, Clone, Serialize)]
    pub enum TypeExprKind {
        Primitive(PrimKind),
        /// `a.b.C<T, U>`; `class` is the resolved qualified name.
        Named {
            path: Vec<String>,
            args: Vec<TypeExpr>,
            class: Option<String>,
        },
        Array(Box<TypeExpr>),
    }

    impl TypeExpr {
        pub fn new(kind: TypeExprKind) -> Self {
            Self {
                kind,
                span: Span::DUMMY,
            }
        }

        pub fn primitive(kind: PrimKind) -> Self {
            Self::new(TypeExprKind::Primitive(kind))
        }

        pub fn named(path: Vec<String>, args: Vec<TypeExpr>) -> Self {
            Self::new(TypeExprKind::Named {
                path,
                args,
                class: None,
            })
        }

        pub fn array(elem: TypeExpr) -> Self {
            Self::new(TypeExprKind::Array(Box::new(elem)))
        }
    }

    #[derive(Debug, Clone, Serialize)]
    pub struct Block {
        pub stmts: Vec<Stmt>,
        pub span: Span,
    }

    #[derive(Debug, Clone, Serialize)]
    pub enum Stmt {
        /// `Type name [= init];`
        Local {
            ty: TypeExpr,
            name: Ident,
            init: Option<Expr>,
            span: Span,
        },
        Expr {
            expr: Expr,
            span: Span,
        },
        If {
            cond: Expr,
            then_: Box<Stmt>,
            else_: Option<Box<Stmt>>,
            span: Span,
        },
        While {
            cond: Expr,
            body: Box<Stmt>,
            span: Span,
        },
        Return {
            value: Option<Expr>,
            span: Span,
        },
        Block(Block),
    }

    impl Stmt {
        pub fn span(&self) -> Span {
            match self {
                Stmt::Local { span, .. }
                | Stmt::Expr { span, .. }
                | Stmt::If { span, .. }
                | Stmt::While { span, .. }
                | Stmt::Return { span, .. } => *span,
                Stmt::Block(block) => block.span,
            }
        }
    }

    /// Expression node. `ty` is filled in by attribution.
    #[derive(Debug, Clone, Serialize)]
    pub struct Expr {
        pub kind: ExprKind,
        pub span: Span,
        pub ty: Option<Type>,
    }

    #[derive(Debug, Clone, Serialize)]
    pub enum ExprKind {
        Lit(Lit),
        Ident {
            name: String,
            sym: Option<Symbol>,
        },
        Field {
            target: Box<Expr>,
            name: String,
            sym: Option<Symbol>,
        },
        Call {
            callee: Box<Expr>,
            args: Vec<Expr>,
        },
        Unary {
            op: UnOp,
            expr: Box<Expr>,
        },
        Binary {
            lhs: Box<Expr>,
            op: BinOp,
            rhs: Box<Expr>,
        },
        Cond {
            cond: Box<Expr>,
            then_: Box<Expr>,
            else_: Box<Expr>,
        },
        Assign {
            lhs: Box<Expr>,
            rhs: Box<Expr>,
        },
        AssignOp {
            lhs: Box<Expr>,
            op: BinOp,
            rhs: Box<Expr>,
        },
        Cast {
            ty: TypeExpr,
            expr: Box<Expr>,
        },
        InstanceOf {
            expr: Box<Expr>,
            ty: TypeExpr,
        },
        Index {
            target: Box<Expr>,
            index: Box<Expr>,
        },
        Paren(Box<Expr>),
    }

    impl Expr {
        pub fn new(kind: ExprKind, span: Span) -> Self {
            Self {
                kind,
                span,
                ty: None,
            }
        }

        /// Synthesized node without a source position.
        pub fn synth(kind: ExprKind) -> Self {
            Self::new(kind, Span::DUMMY)
        }

        pub fn ident(name: impl Into<String>) -> Self {
            Self::synth(ExprKind::Ident {
                name: name.into(),
                sym: None,
            })
        }

        pub fn field(target: Expr, name: impl Into<String>) -> Self {
            Self::synth(ExprKind::Field {
                target: Box::new(target),
                name: name.into(),
                sym: None,
            })
        }

        /// Symbol of an identifier or field access.
        pub fn sym(&self) -> Option<&Symbol> {
            match &self.kind {
                ExprKind::Ident { sym, .. } | ExprKind::Field { sym, .. } => sym.as_ref(),
                _ => None,
            }
        }

        /// Strips any number of enclosing parentheses.
        pub fn skip_parens(&self) -> &Expr {
            match &self.kind {
                ExprKind::Paren(inner) => inner.skip_parens(),
                _ => self,
            }
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize)]
    pub enum Lit {
        Int(i64),
        Long(i64),
        Double(f64),
        Bool(bool),
        Char(char),
        Str(String),
        Null,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub enum UnOp {
        Not,
        Neg,
        Pos,
        BitNot,
        PreInc,
        PreDec,
        PostInc,
        PostDec,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub enum BinOp {
        // logical
        Or,
        And,
        // bitwise
        BitOr,
        BitXor,
        BitAnd,
        // equality
        Eq,
        Ne,
        // relational
        Lt,
        Gt,
        Le,
        Ge,
        // shift
        Shl,
        Shr,
        UShr,
        // arithmetic
        Add,
        Sub,
        Mul,
        Div,
        Rem,
    }

    impl UnOp {
        pub fn symbol(self) -> &'static str {
            match self {
                UnOp::Not => "!",
                UnOp::Neg => "-",
                UnOp::Pos => "+",
                UnOp::BitNot => "~",
                UnOp::PreInc | UnOp::PostInc => "++",
                UnOp::PreDec | UnOp::PostDec => "--",
            }
        }

        pub fn is_postfix(self) -> bool {
            matches!(self, UnOp::PostInc | UnOp::PostDec)
        }
    }

    impl BinOp {
        pub fn symbol(self) -> &'static str {
            match self {
                BinOp::Or => "||",
                BinOp::And => "&&",
                BinOp::BitOr => "|",
                BinOp::BitXor => "^",
                BinOp::BitAnd => "&",
                BinOp::Eq => "==",
                BinOp::Ne => "!=",
                BinOp::Lt => "<",
                BinOp::Gt => ">",
                BinOp::Le => "<=",
                BinOp::Ge => ">=",
                BinOp::Shl => "<<",
                BinOp::Shr => ">>",
                BinOp::UShr => ">>>",
                BinOp::Add => "+",
                BinOp::Sub => "-",
                BinOp::Mul => "*",
                BinOp::Div => "/",
                BinOp::Rem => "%",
            }
        }

        /// Operators allowed in compound assignment (`op=`).
        pub fn is_compound_assignable(self) -> bool {
            !matches!(
                self,
                BinOp::Or
                    | BinOp::And
                    | BinOp::Eq
                    | BinOp::Ne
                    | BinOp::Lt
                    | BinOp::Gt
                    | BinOp::Le
                    | BinOp::Ge
            )
        }
    }
}
