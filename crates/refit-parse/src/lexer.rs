use crate::token::{Tok, TokKind};
use refit_ast::span::Span;
use refit_types::PrimKind;

pub struct Lexer<'a> {
    src: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src: src.as_bytes(),
            pos: 0,
        }
    }

    /// Lexes the whole input; the last token is always `Eof`.
    pub fn tokenize(mut self) -> Vec<Tok> {
        let mut toks = Vec::new();
        loop {
            let tok = self.next_tok();
            let done = matches!(tok.kind, TokKind::Eof);
            toks.push(tok);
            if done {
                return toks;
            }
        }
    }

    fn bump(&mut self) -> Option<u8> {
        if self.pos >= self.src.len() {
            None
        } else {
            let b = self.src[self.pos];
            self.pos += 1;
            Some(b)
        }
    }

    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }
    fn peek2(&self) -> Option<u8> {
        self.src.get(self.pos + 1).copied()
    }

    fn span(&self, start: usize) -> Span {
        Span {
            start: start as u32,
            end: self.pos as u32,
        }
    }

    fn tok(&self, kind: TokKind, start: usize) -> Tok {
        Tok {
            kind,
            span: self.span(start),
        }
    }

    fn skip_ws_and_comments(&mut self) {
        loop {
            while matches!(self.peek(), Some(b) if (b as char).is_whitespace()) {
                self.bump();
            }
            // line comment: //
            if self.peek() == Some(b'/') && self.peek2() == Some(b'/') {
                while let Some(b) = self.peek() {
                    if b == b'\n' {
                        break;
                    }
                    self.bump();
                }
                continue;
            }
            // block comment: /* ... */
            if self.peek() == Some(b'/') && self.peek2() == Some(b'*') {
                self.bump();
                self.bump();
                while self.peek().is_some() {
                    if self.peek() == Some(b'*') && self.peek2() == Some(b'/') {
                        self.bump();
                        self.bump();
                        break;
                    }
                    self.bump();
                }
                continue;
            }
            break;
        }
    }

    fn escape(&mut self) -> Option<char> {
        let esc = self.bump()? as char;
        Some(match esc {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            '0' => '\0',
            other => other,
        })
    }

    pub fn next_tok(&mut self) -> Tok {
        self.skip_ws_and_comments();
        let start = self.pos;
        let Some(b) = self.bump() else {
            return self.tok(TokKind::Eof, start);
        };
        let c = b as char;

        // 3-char operators first
        if c == '<' && self.peek() == Some(b'<') && self.peek2() == Some(b'=') {
            self.bump();
            self.bump();
            return self.tok(TokKind::OpEq("<<".into()), start);
        }

        // 2-char operators
        let two = match (c, self.peek().map(|b| b as char)) {
            ('&', Some('&')) => Some(TokKind::AndAnd),
            ('|', Some('|')) => Some(TokKind::OrOr),
            ('=', Some('=')) => Some(TokKind::EqEq),
            ('!', Some('=')) => Some(TokKind::BangEq),
            ('<', Some('=')) => Some(TokKind::Le),
            ('>', Some('=')) => Some(TokKind::Ge),
            ('<', Some('<')) => Some(TokKind::Shl),
            ('+', Some('+')) => Some(TokKind::PlusPlus),
            ('-', Some('-')) => Some(TokKind::MinusMinus),
            ('+' | '-' | '*' | '/' | '%' | '&' | '|' | '^', Some('=')) => {
                Some(TokKind::OpEq(c.to_string()))
            }
            _ => None,
        };
        if let Some(kind) = two {
            self.bump();
            return self.tok(kind, start);
        }

        // 1-char punctuation/operators
        let single = match c {
            '(' => Some(TokKind::LParen),
            ')' => Some(TokKind::RParen),
            '{' => Some(TokKind::LBrace),
            '}' => Some(TokKind::RBrace),
            '[' => Some(TokKind::LBracket),
            ']' => Some(TokKind::RBracket),
            ',' => Some(TokKind::Comma),
            ';' => Some(TokKind::Semicolon),
            '?' => Some(TokKind::Question),
            ':' => Some(TokKind::Colon),
            '+' => Some(TokKind::Plus),
            '-' => Some(TokKind::Minus),
            '*' => Some(TokKind::Star),
            '/' => Some(TokKind::Slash),
            '%' => Some(TokKind::Percent),
            '&' => Some(TokKind::Amp),
            '|' => Some(TokKind::Pipe),
            '^' => Some(TokKind::Caret),
            '~' => Some(TokKind::Tilde),
            '=' => Some(TokKind::Eq),
            '<' => Some(TokKind::Lt),
            '>' => Some(TokKind::Gt),
            '!' => Some(TokKind::Bang),
            '.' if !matches!(self.peek(), Some(d) if d.is_ascii_digit()) => Some(TokKind::Dot),
            _ => None,
        };
        if let Some(k) = single {
            return self.tok(k, start);
        }

        // string
        if c == '"' {
            let mut s = String::new();
            while let Some(b) = self.bump() {
                match b as char {
                    '"' => return self.tok(TokKind::Str(s), start),
                    '\\' => match self.escape() {
                        Some(ch) => s.push(ch),
                        None => break,
                    },
                    '\n' => break,
                    ch => s.push(ch),
                }
            }
            return self.tok(TokKind::Error("unterminated string literal".into()), start);
        }

        // char
        if c == '\'' {
            let ch = match self.bump().map(|b| b as char) {
                Some('\\') => self.escape(),
                other => other,
            };
            return match (ch, self.bump()) {
                (Some(ch), Some(b'\'')) => self.tok(TokKind::Char(ch), start),
                _ => self.tok(TokKind::Error("malformed char literal".into()), start),
            };
        }

        // number (int/long/double)
        if c.is_ascii_digit() || c == '.' {
            let mut s = String::from(c);
            let mut dot = c == '.';
            while let Some(p) = self.peek() {
                let ch = p as char;
                if ch.is_ascii_digit() || ch == '_' {
                    if ch != '_' {
                        s.push(ch);
                    }
                    self.bump();
                } else if ch == '.' && !dot && matches!(self.peek2(), Some(d) if d.is_ascii_digit())
                {
                    dot = true;
                    s.push('.');
                    self.bump();
                } else {
                    break;
                }
            }
            let kind = match self.peek() {
                Some(b'L' | b'l') if !dot => {
                    self.bump();
                    s.parse().map(TokKind::Long).ok()
                }
                Some(b'd' | b'D' | b'f' | b'F') => {
                    self.bump();
                    s.parse().map(TokKind::Double).ok()
                }
                _ if dot => s.parse().map(TokKind::Double).ok(),
                _ => s.parse().map(TokKind::Int).ok(),
            };
            let kind =
                kind.unwrap_or_else(|| TokKind::Error(format!("malformed number literal `{s}`")));
            return self.tok(kind, start);
        }

        // ident / keywords
        if c.is_ascii_alphabetic() || c == '_' || c == '$' {
            let mut s = String::from(c);
            while let Some(p) = self.peek() {
                let ch = p as char;
                if ch.is_ascii_alphanumeric() || ch == '_' || ch == '$' {
                    s.push(ch);
                    self.bump();
                } else {
                    break;
                }
            }
            let kind = match s.as_str() {
                "package" => TokKind::KwPackage,
                "import" => TokKind::KwImport,
                "class" => TokKind::KwClass,
                "extends" => TokKind::KwExtends,
                "static" => TokKind::KwStatic,
                "public" | "private" | "protected" | "final" => TokKind::KwModifier,
                "if" => TokKind::KwIf,
                "else" => TokKind::KwElse,
                "while" => TokKind::KwWhile,
                "return" => TokKind::KwReturn,
                "instanceof" => TokKind::KwInstanceof,
                "true" => TokKind::KwTrue,
                "false" => TokKind::KwFalse,
                "null" => TokKind::KwNull,
                other => match PrimKind::from_keyword(other) {
                    Some(kind) => TokKind::KwPrim(kind),
                    None => TokKind::Ident(s),
                },
            };
            return self.tok(kind, start);
        }

        self.tok(TokKind::Error(format!("unexpected character `{c}`")), start)
    }
}
