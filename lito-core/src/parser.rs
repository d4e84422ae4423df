//! Syntax-directed translation from Lito to C.
//!
//! One method per grammar production. Recognizing a production emits its
//! C rendition as a side effect, so there is no intermediate tree; the
//! call stack is the parse stack. Two tokens are held at a time, the
//! current one and a single token of lookahead.
//!
//! ```text
//! program    := ( NEWLINE )* statement* EOF
//! statement  := printStmt | ifStmt | whileStmt | letStmt | inputStmt | returnStmt
//! printStmt  := 'print' ( STRING | expression )* NEWLINE
//! ifStmt     := 'if' comparison block ( 'else' ( ifStmt | block ) )?
//! whileStmt  := 'while' comparison block
//! letStmt    := 'let' IDENT '=' expression NEWLINE
//! inputStmt  := 'input' IDENT+ NEWLINE
//! returnStmt := 'return' expression NEWLINE
//! block      := '{' NEWLINE? statement* '}'
//! comparison := expression compOp expression ( compOp expression )*
//! expression := term ( ('+'|'-') term )*
//! term       := unary ( ('*'|'/'|'%') unary )*
//! unary      := ('+'|'-')? primary
//! primary    := NUMBER | IDENT
//! ```

use crate::emitter::Emitter;
use crate::error::ParseError;
use crate::lexer::{Lexer, Token, TokenKind};
use crate::symbols::SymbolTable;

pub struct Parser<'src> {
    lexer: Lexer<'src>,
    emitter: Emitter,
    symbols: SymbolTable,
    cur_token: Token<'src>,
    peek_token: Token<'src>,
}

impl<'src> Parser<'src> {
    /// Primes the current and lookahead tokens, so lexical errors in
    /// the first two tokens surface before any production runs.
    pub fn new(mut lexer: Lexer<'src>, emitter: Emitter) -> Result<Self, ParseError> {
        let cur_token = lexer.next_token()?;
        let peek_token = lexer.next_token()?;
        Ok(Parser {
            lexer,
            emitter,
            symbols: SymbolTable::new(),
            cur_token,
            peek_token,
        })
    }

    /// Consumes the whole program and returns the finished C source.
    pub fn translate(mut self) -> Result<String, ParseError> {
        self.program()?;
        Ok(self.emitter.finish())
    }

    fn program(&mut self) -> Result<(), ParseError> {
        self.emitter.header_line("#include <stdio.h>");
        self.emitter.header_line("int main(void){");

        while self.check_token(TokenKind::Newline) {
            self.next_token()?;
        }

        let mut falls_through = true;
        while !self.check_token(TokenKind::Eof) {
            falls_through = !self.check_token(TokenKind::Return);
            self.statement()?;
        }

        // A top-level `return` as the final statement already leaves
        // main; anything else falls through to the default.
        if falls_through {
            self.emitter.emit_line("return 0;");
        }
        self.emitter.emit_line("}");
        Ok(())
    }

    fn statement(&mut self) -> Result<(), ParseError> {
        match self.cur_token.kind {
            TokenKind::Print => self.print_statement()?,
            TokenKind::If => self.if_statement()?,
            TokenKind::While => self.while_statement()?,
            TokenKind::Let => self.let_statement()?,
            TokenKind::Input => self.input_statement()?,
            TokenKind::Return => self.return_statement()?,
            _ => return Err(self.invalid_token()),
        }
        self.newline()
    }

    // A mixed run of string literals and expressions, one printf
    // fragment each, up to the terminating newline.
    fn print_statement(&mut self) -> Result<(), ParseError> {
        self.next_token()?;

        loop {
            if self.check_token(TokenKind::String) {
                self.emitter
                    .emit_line(&format!("printf(\"{}\");", self.cur_token.text));
                self.next_token()?;
            } else if self.starts_expression() {
                let value = self.expression()?;
                self.emitter
                    .emit_line(&format!("printf(\"%f\", (float)({value}));"));
            } else {
                break;
            }
        }
        Ok(())
    }

    fn if_statement(&mut self) -> Result<(), ParseError> {
        self.next_token()?;
        let condition = self.comparison()?;
        self.emitter.emit_line(&format!("if({condition}){{"));
        self.block()?;

        if self.check_token(TokenKind::Else) {
            self.next_token()?;
            if self.check_token(TokenKind::If) {
                // `else if` re-enters this production without a block
                // wrapper; the recursive call closes the chain.
                self.emitter.emit("} else ");
                self.if_statement()?;
            } else {
                self.emitter.emit_line("} else {");
                self.block()?;
                self.emitter.emit_line("}");
            }
        } else {
            self.emitter.emit_line("}");
        }
        Ok(())
    }

    fn while_statement(&mut self) -> Result<(), ParseError> {
        self.next_token()?;
        let condition = self.comparison()?;
        self.emitter.emit_line(&format!("while({condition}){{"));
        self.block()?;
        self.emitter.emit_line("}");
        Ok(())
    }

    fn let_statement(&mut self) -> Result<(), ParseError> {
        self.next_token()?;
        if !self.check_token(TokenKind::Ident) {
            return Err(self.expected(TokenKind::Ident.to_string()));
        }
        let name = self.cur_token.text.to_string();
        self.declare(&name);
        self.next_token()?;
        self.match_token(TokenKind::Eq)?;

        let value = self.expression()?;
        self.emitter.emit_line(&format!("{name} = {value};"));
        Ok(())
    }

    fn input_statement(&mut self) -> Result<(), ParseError> {
        self.next_token()?;
        if !self.check_token(TokenKind::Ident) {
            return Err(self.expected(TokenKind::Ident.to_string()));
        }
        while self.check_token(TokenKind::Ident) {
            let name = self.cur_token.text.to_string();
            self.declare(&name);
            self.emitter.emit_line(&format!("scanf(\"%f\", &{name});"));
            self.next_token()?;
        }
        Ok(())
    }

    fn return_statement(&mut self) -> Result<(), ParseError> {
        self.next_token()?;
        let value = self.expression()?;
        self.emitter.emit_line(&format!("return {value};"));
        Ok(())
    }

    fn block(&mut self) -> Result<(), ParseError> {
        self.match_token(TokenKind::LBrace)?;
        while self.check_token(TokenKind::Newline) {
            self.next_token()?;
        }
        while !self.check_token(TokenKind::RBrace) {
            if self.check_token(TokenKind::Eof) {
                return Err(self.expected(TokenKind::RBrace.to_string()));
            }
            self.statement()?;
        }
        self.match_token(TokenKind::RBrace)
    }

    // A bare expression is not a valid condition; at least one
    // comparator must follow the first operand.
    fn comparison(&mut self) -> Result<String, ParseError> {
        let mut text = self.expression()?;
        if !self.cur_token.kind.is_comparison() {
            return Err(self.expected("comparison operator"));
        }
        while self.cur_token.kind.is_comparison() {
            let op = self.cur_token.text;
            self.next_token()?;
            let right = self.expression()?;
            text = format!("{text} {op} {right}");
        }
        Ok(text)
    }

    fn expression(&mut self) -> Result<String, ParseError> {
        let mut text = self.term()?;
        while matches!(self.cur_token.kind, TokenKind::Plus | TokenKind::Minus) {
            let op = self.cur_token.text;
            self.next_token()?;
            let right = self.term()?;
            text = format!("{text} {op} {right}");
        }
        Ok(text)
    }

    // Variables are stored as C floats but `%` is integer-only there,
    // so both sides of a modulo are cast down when it is applied.
    fn term(&mut self) -> Result<String, ParseError> {
        let mut text = self.unary()?;
        loop {
            match self.cur_token.kind {
                TokenKind::Asterisk | TokenKind::Slash => {
                    let op = self.cur_token.text;
                    self.next_token()?;
                    let right = self.unary()?;
                    text = format!("{text} {op} {right}");
                }
                TokenKind::Percent => {
                    self.next_token()?;
                    let right = self.unary()?;
                    text = format!("(int)({text}) % (int)({right})");
                }
                _ => break,
            }
        }
        Ok(text)
    }

    fn unary(&mut self) -> Result<String, ParseError> {
        if matches!(self.cur_token.kind, TokenKind::Plus | TokenKind::Minus) {
            let sign = self.cur_token.text;
            self.next_token()?;
            let operand = self.primary()?;
            Ok(format!("{sign}{operand}"))
        } else {
            self.primary()
        }
    }

    fn primary(&mut self) -> Result<String, ParseError> {
        match self.cur_token.kind {
            TokenKind::Number => {
                let text = self.cur_token.text.to_string();
                self.next_token()?;
                Ok(text)
            }
            TokenKind::Ident => {
                if !self.symbols.contains(self.cur_token.text) {
                    return Err(ParseError::UndefinedVariable {
                        name: self.cur_token.text.to_string(),
                        position: self.cur_token.offset,
                    });
                }
                let text = self.cur_token.text.to_string();
                self.next_token()?;
                Ok(text)
            }
            _ => Err(self.invalid_token()),
        }
    }

    /// First use of a name emits its declaration into the header,
    /// ahead of any body code that may already reference it.
    fn declare(&mut self, name: &str) {
        if self.symbols.declare(name) {
            self.emitter.header_line(&format!("float {name};"));
        }
    }

    fn starts_expression(&self) -> bool {
        matches!(
            self.cur_token.kind,
            TokenKind::Number | TokenKind::Ident | TokenKind::Plus | TokenKind::Minus
        )
    }

    // The terminating-newline check is relaxed next to block braces:
    // `}` ends a statement, and so does the end of the source, which
    // lets a program omit its final newline.
    fn newline(&mut self) -> Result<(), ParseError> {
        if self.check_token(TokenKind::RBrace) || self.check_token(TokenKind::Eof) {
            return Ok(());
        }
        self.match_token(TokenKind::Newline)?;
        while self.check_token(TokenKind::Newline) {
            self.next_token()?;
        }
        Ok(())
    }

    fn check_token(&self, kind: TokenKind) -> bool {
        self.cur_token.kind == kind
    }

    fn match_token(&mut self, kind: TokenKind) -> Result<(), ParseError> {
        if !self.check_token(kind) {
            return Err(self.expected(kind.to_string()));
        }
        self.next_token()
    }

    fn next_token(&mut self) -> Result<(), ParseError> {
        self.cur_token = self.peek_token;
        self.peek_token = self.lexer.next_token()?;
        Ok(())
    }

    fn invalid_token(&self) -> ParseError {
        ParseError::InvalidToken {
            text: self.cur_token.text.to_string(),
            position: self.cur_token.offset,
        }
    }

    fn expected(&self, expected: impl Into<String>) -> ParseError {
        ParseError::ExpectedToken {
            expected: expected.into(),
            source: Box::new(self.invalid_token()),
        }
    }
}
