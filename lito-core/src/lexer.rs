//! Lexer for Lito source text.

use crate::error::LexError;
use std::fmt;

/// Kind of a token produced by the lexer.
///
/// Keywords are recognized here by exact text match; everything the
/// grammar does not reserve lexes as [`TokenKind::Ident`]. A few kinds
/// (`new`, `^`, the bracket pairs other than braces) are part of the
/// token set without having a grammar production yet; the parser
/// rejects them where they cannot appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // Special
    Eof,
    Newline,

    // Literals
    Number,
    Ident,
    String,

    // Keywords
    Return,
    Else,
    Print,
    Input,
    Let,
    If,
    While,
    New,

    // Operators
    Eq,       // =
    Plus,     // +
    Minus,    // -
    Asterisk, // *
    Slash,    // /
    EqEq,     // ==
    NotEq,    // !=
    Lt,       // <
    LtEq,     // <=
    Gt,       // >
    GtEq,     // >=
    Percent,  // %
    Caret,    // ^

    // Brackets
    LParen,   // (
    RParen,   // )
    LBrace,   // {
    RBrace,   // }
    LBracket, // [
    RBracket, // ]
}

impl TokenKind {
    /// Looks up the keyword kind for an identifier-shaped word.
    pub fn keyword(text: &str) -> Option<TokenKind> {
        let kind = match text {
            "return" => TokenKind::Return,
            "else" => TokenKind::Else,
            "print" => TokenKind::Print,
            "input" => TokenKind::Input,
            "let" => TokenKind::Let,
            "if" => TokenKind::If,
            "while" => TokenKind::While,
            "new" => TokenKind::New,
            _ => return None,
        };
        Some(kind)
    }

    /// True for the comparison-operator subset accepted by the
    /// `comparison` production.
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            TokenKind::EqEq
                | TokenKind::NotEq
                | TokenKind::Lt
                | TokenKind::LtEq
                | TokenKind::Gt
                | TokenKind::GtEq
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        use TokenKind::*;

        let string = match self {
            Eof => "end of input",
            Newline => "newline",
            Number => "number",
            Ident => "identifier",
            String => "string",
            Return => "keyword `return`",
            Else => "keyword `else`",
            Print => "keyword `print`",
            Input => "keyword `input`",
            Let => "keyword `let`",
            If => "keyword `if`",
            While => "keyword `while`",
            New => "keyword `new`",
            Eq => "`=`",
            Plus => "`+`",
            Minus => "`-`",
            Asterisk => "`*`",
            Slash => "`/`",
            EqEq => "`==`",
            NotEq => "`!=`",
            Lt => "`<`",
            LtEq => "`<=`",
            Gt => "`>`",
            GtEq => "`>=`",
            Percent => "`%`",
            Caret => "`^`",
            LParen => "`(`",
            RParen => "`)`",
            LBrace => "`{`",
            RBrace => "`}`",
            LBracket => "`[`",
            RBracket => "`]`",
        };

        fmt.write_str(string)
    }
}

/// A single token with its kind and source text.
///
/// `text` borrows from the original source string; for string literals
/// it is the content between the quotes. `offset` is the byte offset of
/// the token's first character, kept for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'src> {
    pub text: &'src str,
    pub kind: TokenKind,
    pub offset: usize,
}

/// Pull-based scanner over a source string.
///
/// The cursor only ever moves forward. Once it reaches the end of the
/// source, [`Lexer::next_token`] returns an `Eof` token on every call.
pub struct Lexer<'src> {
    source: &'src str,
    bytes: &'src [u8],
    pos: usize,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Lexer {
            source,
            bytes: source.as_bytes(),
            pos: 0,
        }
    }

    /// Scans the next token, skipping whitespace and comments first.
    pub fn next_token(&mut self) -> Result<Token<'src>, LexError> {
        self.skip_whitespace_and_comments();

        let start = self.pos;
        let Some(ch) = self.current() else {
            return Ok(Token {
                text: "",
                kind: TokenKind::Eof,
                offset: start,
            });
        };

        let kind = match ch {
            b'\n' => {
                self.advance();
                TokenKind::Newline
            }
            b'+' => {
                self.advance();
                TokenKind::Plus
            }
            b'-' => {
                self.advance();
                TokenKind::Minus
            }
            b'*' => {
                self.advance();
                TokenKind::Asterisk
            }
            b'/' => {
                self.advance();
                TokenKind::Slash
            }
            b'%' => {
                self.advance();
                TokenKind::Percent
            }
            b'^' => {
                self.advance();
                TokenKind::Caret
            }
            b'=' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    self.advance();
                    TokenKind::EqEq
                } else {
                    self.advance();
                    TokenKind::Eq
                }
            }
            b'<' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    self.advance();
                    TokenKind::LtEq
                } else {
                    self.advance();
                    TokenKind::Lt
                }
            }
            b'>' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    self.advance();
                    TokenKind::GtEq
                } else {
                    self.advance();
                    TokenKind::Gt
                }
            }
            b'!' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    self.advance();
                    TokenKind::NotEq
                } else {
                    return Err(LexError::expected("`!=`", '!', start));
                }
            }
            b'(' => {
                self.advance();
                TokenKind::LParen
            }
            b')' => {
                self.advance();
                TokenKind::RParen
            }
            b'{' => {
                self.advance();
                TokenKind::LBrace
            }
            b'}' => {
                self.advance();
                TokenKind::RBrace
            }
            b'[' => {
                self.advance();
                TokenKind::LBracket
            }
            b']' => {
                self.advance();
                TokenKind::RBracket
            }
            b'"' => return self.lex_string(),
            b'0'..=b'9' => return self.lex_number(),
            c if c.is_ascii_alphabetic() => return Ok(self.lex_word()),
            _ => {
                let character = self.source[start..]
                    .chars()
                    .next()
                    .unwrap_or(char::REPLACEMENT_CHARACTER);
                return Err(LexError::UnknownToken {
                    character,
                    position: start,
                });
            }
        };

        Ok(self.token(kind, start))
    }

    /// Space, tab and carriage return separate tokens; `#` starts a
    /// comment running to the end of the line. The newline itself is a
    /// token and is left in place.
    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.current() {
                Some(b' ' | b'\t' | b'\r') => self.advance(),
                Some(b'#') => {
                    while !matches!(self.current(), None | Some(b'\n')) {
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    fn lex_string(&mut self) -> Result<Token<'src>, LexError> {
        let start = self.pos;
        self.advance(); // opening quote

        let content = self.pos;
        loop {
            match self.current() {
                Some(b'"') => break,
                Some(_) => self.advance(),
                None => return Err(LexError::UnterminatedString { position: start }),
            }
        }

        let text = &self.source[content..self.pos];
        self.advance(); // closing quote
        Ok(Token {
            text,
            kind: TokenKind::String,
            offset: start,
        })
    }

    fn lex_number(&mut self) -> Result<Token<'src>, LexError> {
        let start = self.pos;
        while self.current().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }

        if self.current() == Some(b'.') {
            // At least one digit must follow the decimal point.
            if !self.peek().is_some_and(|c| c.is_ascii_digit()) {
                let found = self.peek().map_or('\0', char::from);
                return Err(LexError::expected("a digit", found, self.pos + 1));
            }
            self.advance(); // '.'
            while self.current().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        Ok(self.token(TokenKind::Number, start))
    }

    fn lex_word(&mut self) -> Token<'src> {
        let start = self.pos;
        while self.current().is_some_and(|c| c.is_ascii_alphanumeric()) {
            self.advance();
        }

        let text = &self.source[start..self.pos];
        let kind = TokenKind::keyword(text).unwrap_or(TokenKind::Ident);
        Token {
            text,
            kind,
            offset: start,
        }
    }

    fn token(&self, kind: TokenKind, start: usize) -> Token<'src> {
        Token {
            text: &self.source[start..self.pos],
            kind,
            offset: start,
        }
    }

    fn current(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos + 1).copied()
    }

    fn advance(&mut self) {
        if self.pos < self.bytes.len() {
            self.pos += 1;
        }
    }
}
