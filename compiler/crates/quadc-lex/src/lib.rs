//! quadc-lex - lexical analyzer.
//!
//! Out of THE CORE's scope (the core is driven by whatever recognizes
//! tokens and grammar productions), but needed to exercise the whole
//! pipeline end to end. Kept small and undocumented beyond a token table:
//! this is scaffolding around the semantic core, not where the interesting
//! design lives.

pub mod cursor;

use cursor::Cursor;
use quadc_util::Symbol;
use thiserror::Error;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Op {
    Plus,
    Minus,
    Mult,
    Div,
    Lt,
    Gt,
    Lte,
    Gte,
    Eq,
    Ne,
    And,
    Or,
}

#[derive(Clone, PartialEq, Debug)]
pub enum TokenKind {
    // Literals
    Integer(i64),
    Double(f64),
    Logical(bool),
    StringLit(String),
    Ident(Symbol),

    // Type keywords
    KwInt,
    KwReal,
    KwLogical,
    KwString,
    KwEnum,
    KwConst,

    // Control-flow / structure keywords
    KwFunc,
    KwReturn,
    KwBegin,
    KwEnd,
    KwIf,
    KwThen,
    KwElse,
    KwWhile,
    KwDo,
    KwRepeat,
    KwUntil,
    KwFor,
    KwSwitch,
    KwCase,
    KwDefault,
    KwEndswitch,
    KwPrint,
    KwDump,

    // Operators
    Op(Op),
    Assign, // :=
    Bang,   // ! (complement)

    // Punctuation
    LParen,
    RParen,
    LBrace,
    RBrace,
    Comma,
    Semicolon,
    Colon,
    Dot,

    Eof,
}

#[derive(Clone, Debug)]
pub struct Token {
    pub kind: TokenKind,
    pub line: u32,
    /// The literal source text, used by the STX diagnostic
    /// (`Invalid syntax near '<text>'`).
    pub text: String,
}

#[derive(Debug, Error)]
pub enum LexError {
    #[error("unterminated string literal")]
    UnterminatedString { line: u32 },
    #[error("unexpected character '{ch}'")]
    UnexpectedChar { ch: char, line: u32 },
    #[error("malformed number literal '{text}'")]
    MalformedNumber { text: String, line: u32 },
}

pub struct Lexer<'a> {
    cursor: Cursor<'a>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Lexer { cursor: Cursor::new(source) }
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.cursor.first() {
                Some(c) if c.is_whitespace() => {
                    self.cursor.bump();
                }
                Some('/') if self.cursor.second() == Some('/') => {
                    self.cursor.eat_while(|c| c != '\n');
                }
                _ => break,
            }
        }
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_trivia();
        let line = self.cursor.line();

        let Some(c) = self.cursor.first() else {
            return Ok(Token { kind: TokenKind::Eof, line, text: String::new() });
        };

        if c.is_ascii_digit() {
            return self.lex_number(line);
        }
        if c.is_alphabetic() || c == '_' {
            return Ok(self.lex_ident_or_keyword(line));
        }
        if c == '"' {
            return self.lex_string(line);
        }

        self.cursor.bump();
        let (kind, text) = match c {
            '+' => (TokenKind::Op(Op::Plus), "+"),
            '-' => (TokenKind::Op(Op::Minus), "-"),
            '*' => (TokenKind::Op(Op::Mult), "*"),
            '/' => (TokenKind::Op(Op::Div), "/"),
            '(' => (TokenKind::LParen, "("),
            ')' => (TokenKind::RParen, ")"),
            '{' => (TokenKind::LBrace, "{"),
            '}' => (TokenKind::RBrace, "}"),
            ',' => (TokenKind::Comma, ","),
            ';' => (TokenKind::Semicolon, ";"),
            '.' => (TokenKind::Dot, "."),
            ':' => {
                if self.cursor.first() == Some('=') {
                    self.cursor.bump();
                    (TokenKind::Assign, ":=")
                } else {
                    (TokenKind::Colon, ":")
                }
            }
            '<' => {
                if self.cursor.first() == Some('=') {
                    self.cursor.bump();
                    (TokenKind::Op(Op::Lte), "<=")
                } else {
                    (TokenKind::Op(Op::Lt), "<")
                }
            }
            '>' => {
                if self.cursor.first() == Some('=') {
                    self.cursor.bump();
                    (TokenKind::Op(Op::Gte), ">=")
                } else {
                    (TokenKind::Op(Op::Gt), ">")
                }
            }
            '=' => {
                if self.cursor.first() == Some('=') {
                    self.cursor.bump();
                    (TokenKind::Op(Op::Eq), "==")
                } else {
                    return Err(LexError::UnexpectedChar { ch: '=', line });
                }
            }
            '!' => {
                if self.cursor.first() == Some('=') {
                    self.cursor.bump();
                    (TokenKind::Op(Op::Ne), "!=")
                } else {
                    (TokenKind::Bang, "!")
                }
            }
            '&' if self.cursor.first() == Some('&') => {
                self.cursor.bump();
                (TokenKind::Op(Op::And), "&&")
            }
            '|' if self.cursor.first() == Some('|') => {
                self.cursor.bump();
                (TokenKind::Op(Op::Or), "||")
            }
            other => return Err(LexError::UnexpectedChar { ch: other, line }),
        };
        Ok(Token { kind, line, text: text.to_string() })
    }

    fn lex_number(&mut self, line: u32) -> Result<Token, LexError> {
        let mut text = self.cursor.eat_while(|c| c.is_ascii_digit());
        let mut is_real = false;
        if self.cursor.first() == Some('.') && self.cursor.second().is_some_and(|c| c.is_ascii_digit()) {
            is_real = true;
            text.push(self.cursor.bump().unwrap());
            text.push_str(&self.cursor.eat_while(|c| c.is_ascii_digit()));
        }
        if is_real {
            let v: f64 = text.parse().map_err(|_| LexError::MalformedNumber { text: text.clone(), line })?;
            Ok(Token { kind: TokenKind::Double(v), line, text })
        } else {
            let v: i64 = text.parse().map_err(|_| LexError::MalformedNumber { text: text.clone(), line })?;
            Ok(Token { kind: TokenKind::Integer(v), line, text })
        }
    }

    fn lex_ident_or_keyword(&mut self, line: u32) -> Token {
        let text = self.cursor.eat_while(|c| c.is_alphanumeric() || c == '_');
        let kind = match text.as_str() {
            "int" => TokenKind::KwInt,
            "real" => TokenKind::KwReal,
            "logical" => TokenKind::KwLogical,
            "string" => TokenKind::KwString,
            "enum" => TokenKind::KwEnum,
            "const" => TokenKind::KwConst,
            "func" => TokenKind::KwFunc,
            "return" => TokenKind::KwReturn,
            "begin" => TokenKind::KwBegin,
            "end" => TokenKind::KwEnd,
            "if" => TokenKind::KwIf,
            "then" => TokenKind::KwThen,
            "else" => TokenKind::KwElse,
            "while" => TokenKind::KwWhile,
            "do" => TokenKind::KwDo,
            "repeat" => TokenKind::KwRepeat,
            "until" => TokenKind::KwUntil,
            "for" => TokenKind::KwFor,
            "switch" => TokenKind::KwSwitch,
            "case" => TokenKind::KwCase,
            "default" => TokenKind::KwDefault,
            "endswitch" => TokenKind::KwEndswitch,
            "print" => TokenKind::KwPrint,
            "dump" => TokenKind::KwDump,
            "true" => TokenKind::Logical(true),
            "false" => TokenKind::Logical(false),
            _ => TokenKind::Ident(Symbol::intern(&text)),
        };
        Token { kind, line, text }
    }

    fn lex_string(&mut self, line: u32) -> Result<Token, LexError> {
        self.cursor.bump(); // opening quote
        let mut value = String::new();
        let mut raw = String::from("\"");
        loop {
            match self.cursor.bump() {
                None => return Err(LexError::UnterminatedString { line }),
                Some('"') => {
                    raw.push('"');
                    break;
                }
                Some('\\') => {
                    raw.push('\\');
                    match self.cursor.bump() {
                        Some('n') => {
                            value.push('\n');
                            raw.push('n');
                        }
                        Some('t') => {
                            value.push('\t');
                            raw.push('t');
                        }
                        Some('"') => {
                            value.push('"');
                            raw.push('"');
                        }
                        Some('\\') => {
                            value.push('\\');
                            raw.push('\\');
                        }
                        Some(c) => {
                            value.push(c);
                            raw.push(c);
                        }
                        None => return Err(LexError::UnterminatedString { line }),
                    }
                }
                Some(c) => {
                    value.push(c);
                    raw.push(c);
                }
            }
        }
        Ok(Token { kind: TokenKind::StringLit(value), line, text: raw })
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_token() {
            Ok(tok) if matches!(tok.kind, TokenKind::Eof) => None,
            other => Some(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::new(src).map(|t| t.unwrap().kind).collect()
    }

    #[test]
    fn lexes_declaration() {
        let k = kinds("const int x := 3 + 4;");
        assert_eq!(
            k,
            vec![
                TokenKind::KwConst,
                TokenKind::KwInt,
                TokenKind::Ident(Symbol::intern("x")),
                TokenKind::Assign,
                TokenKind::Integer(3),
                TokenKind::Op(Op::Plus),
                TokenKind::Integer(4),
                TokenKind::Semicolon,
            ]
        );
    }

    #[test]
    fn lexes_real_literal() {
        let k = kinds("1.5");
        assert_eq!(k, vec![TokenKind::Double(1.5)]);
    }

    #[test]
    fn lexes_string_with_escapes() {
        let k = kinds(r#""hi\n""#);
        assert_eq!(k, vec![TokenKind::StringLit("hi\n".to_string())]);
    }

    #[test]
    fn tracks_line_numbers_across_newlines() {
        let mut lexer = Lexer::new("int x;\nint y;");
        let first = lexer.next_token().unwrap();
        assert_eq!(first.line, 1);
        for _ in 0..2 {
            lexer.next_token().unwrap();
        }
        let y_line = lexer.next_token().unwrap().line;
        assert_eq!(y_line, 2);
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let mut lexer = Lexer::new("\"oops");
        assert!(matches!(lexer.next_token(), Err(LexError::UnterminatedString { .. })));
    }
}
