//! # Parser Module
//!
//! This module serves as the primary interface for the syntactic analysis
//! (parsing) phase of the Toy compiler. It orchestrates the process of
//! converting the linear stream of tokens produced by the lexer into a
//! hierarchical Abstract Syntax Tree (AST).

// Sub-modules containing the core parsing logic.
pub mod common;
pub mod expression_parser;
pub mod statement_parser;

use crate::ast::nodes::Program;
use crate::compiler::error::ParseError;
use crate::compiler::lexer::{Span, Token};

/// The main entry point for the parsing phase.
///
/// Initializes the concrete [`common::Parser`] cursor and starts the
/// recursive descent process by parsing top-level statements until EOF.
pub fn parse(tokens: Vec<(Token, Span)>) -> Result<Program, ParseError> {
    common::parse_program(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::lexer::tokenize;

    #[test]
    fn parses_a_small_program() {
        let source = "x = 1;\nwhile x < 5 {\n  print x;\n  x = x + 1;\n}\n";
        let tokens = tokenize(source).unwrap();
        let program = parse(tokens).unwrap();
        assert_eq!(program.statements.len(), 2);
    }

    #[test]
    fn reports_position_on_syntax_error() {
        let tokens = tokenize("x = ;").unwrap();
        let err = parse(tokens).unwrap_err();
        assert_eq!(err.line, 1);
    }
}
