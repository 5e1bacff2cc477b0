//! # Parser Cursor
//!
//! A thin cursor over the token stream shared by [`super::expression_parser`]
//! and [`super::statement_parser`]. It owns no grammar knowledge of its own —
//! just positional bookkeeping and the primitives both parsers build on.

use crate::ast::nodes::Program;
use crate::compiler::error::ParseError;
use crate::compiler::lexer::{Span, Token};

pub struct Parser {
    tokens: Vec<(Token, Span)>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<(Token, Span)>) -> Self {
        Self { tokens, pos: 0 }
    }

    /// The token under the cursor, without consuming it.
    pub fn peek(&self) -> &Token {
        &self.tokens[self.pos].0
    }

    /// The span of the token under the cursor, for diagnostics.
    pub fn span(&self) -> Span {
        self.tokens[self.pos].1
    }

    /// The token one past the cursor, without consuming anything.
    pub fn peek_next(&self) -> &Token {
        let next = (self.pos + 1).min(self.tokens.len() - 1);
        &self.tokens[next].0
    }

    pub fn is_at_end(&self) -> bool {
        matches!(self.peek(), Token::Eof)
    }

    /// Consumes and returns the current token.
    pub fn advance(&mut self) -> Token {
        let token = self.tokens[self.pos].0.clone();
        if !self.is_at_end() {
            self.pos += 1;
        }
        token
    }

    /// True if the current token equals `expected`, without consuming it.
    pub fn check(&self, expected: &Token) -> bool {
        self.peek() == expected
    }

    /// Consumes the current token if it equals `expected`, returning whether
    /// a match happened.
    pub fn matches(&mut self, expected: &Token) -> bool {
        if self.check(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consumes the current token if it equals `expected`, else reports a
    /// [`ParseError`] naming what was wanted.
    pub fn expect(&mut self, expected: Token, context: &str) -> Result<Token, ParseError> {
        if self.check(&expected) {
            Ok(self.advance())
        } else {
            let span = self.span();
            Err(ParseError::new(
                span.line,
                span.column,
                format!("expected {expected:?} {context}, found {:?}", self.peek()),
            ))
        }
    }

    /// Consumes an identifier token and returns its name, or reports an error.
    pub fn expect_identifier(&mut self, context: &str) -> Result<String, ParseError> {
        match self.peek().clone() {
            Token::Identifier(name) => {
                self.advance();
                Ok(name)
            }
            other => {
                let span = self.span();
                Err(ParseError::new(
                    span.line,
                    span.column,
                    format!("expected identifier {context}, found {other:?}"),
                ))
            }
        }
    }

    pub fn error(&self, message: impl Into<String>) -> ParseError {
        let span = self.span();
        ParseError::new(span.line, span.column, message.into())
    }
}

/// Parses a complete program: a sequence of top-level statements up to EOF.
pub fn parse_program(tokens: Vec<(Token, Span)>) -> Result<Program, ParseError> {
    let mut parser = Parser::new(tokens);
    let statements = super::statement_parser::StatementParser::parse_block_until_eof(&mut parser)?;
    Ok(Program { statements })
}
