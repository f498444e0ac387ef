use refit_ast::span::Span;

#[derive(Debug, Clone, PartialEq)]
pub enum TokKind {
    // trivia / eof / error
    Eof,
    /// Unrecognized input.
    Error(String),
    // punctuation
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Dot,
    Semicolon,
    Question,
    Colon,
    // assignment
    Eq,
    /// Compound assignment, e.g. `+=`; `>>=` and `>>>=` are assembled by the parser.
    OpEq(String),
    // arithmetic
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    PlusPlus,
    MinusMinus,
    // bitwise
    Amp,
    Pipe,
    Caret,
    Tilde,
    Shl,
    // equality
    EqEq,
    BangEq,
    // relational; `>` is always a single token so `List<List<T>>` lexes cleanly
    Lt,
    Le,
    Gt,
    Ge,
    // logical
    AndAnd,
    OrOr,
    Bang,
    // idents / keywords
    Ident(String),
    KwPackage,
    KwImport,
    KwClass,
    KwExtends,
    KwStatic,
    /// `public`, `private`, `protected`, `final`: accepted and ignored.
    KwModifier,
    KwIf,
    KwElse,
    KwWhile,
    KwReturn,
    KwInstanceof,
    KwTrue,
    KwFalse,
    KwNull,
    /// Primitive type keyword, `void` included.
    KwPrim(refit_types::PrimKind),
    // literals
    Int(i64),
    Long(i64),
    Double(f64),
    Char(char),
    Str(String),
}

#[derive(Debug, Clone)]
pub struct Tok {
    pub kind: TokKind,
    pub span: Span,
}
