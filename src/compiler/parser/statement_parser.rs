//! # Statement Parser
//!
//! Parses Toy's statement forms — assignment, `print`, `if`/`else`,
//! `while`, `break`, `continue`, `return`, subroutine definitions, and
//! bare call expressions used as statements. Delegates expression parsing
//! to [`ExpressionParser`].

use super::common::Parser;
use super::expression_parser::ExpressionParser;
use crate::ast::nodes::{Expr, PrintArg, Stmt};
use crate::compiler::error::ParseError;
use crate::compiler::lexer::Token;

/// A static utility struct dedicated to parsing statements and building
/// statement AST nodes.
pub struct StatementParser;

impl StatementParser {
    /// Parses statements until EOF, used for the top level of a program.
    /// Only this entry point allows `sub` — every nested block rejects it.
    pub fn parse_block_until_eof(parser: &mut Parser) -> Result<Vec<Stmt>, ParseError> {
        let mut statements = Vec::new();
        while !parser.is_at_end() {
            statements.push(Self::parse_statement(parser, true)?);
        }
        Ok(statements)
    }

    /// Parses statements until a closing `}`, which is consumed before
    /// returning. Used for `if`/`else`/`while`/`sub` bodies, none of which
    /// are top level.
    fn parse_block(parser: &mut Parser) -> Result<Vec<Stmt>, ParseError> {
        parser.expect(Token::LBrace, "to open a block")?;
        let mut statements = Vec::new();
        while !parser.check(&Token::RBrace) {
            if parser.is_at_end() {
                return Err(parser.error("unterminated block, expected `}`"));
            }
            statements.push(Self::parse_statement(parser, false)?);
        }
        parser.advance();
        Ok(statements)
    }

    /// Dispatches on the current token to parse a single statement.
    /// `at_top_level` gates `sub`, which spec.md restricts to the program's
    /// top level.
    pub fn parse_statement(parser: &mut Parser, at_top_level: bool) -> Result<Stmt, ParseError> {
        match parser.peek() {
            Token::Print => Self::parse_print_statement(parser),
            Token::If => Self::parse_if_statement(parser),
            Token::While => Self::parse_while_statement(parser),
            Token::Break => {
                parser.advance();
                parser.expect(Token::Semicolon, "after `break`")?;
                Ok(Stmt::Break)
            }
            Token::Continue => {
                parser.advance();
                parser.expect(Token::Semicolon, "after `continue`")?;
                Ok(Stmt::Continue)
            }
            Token::Return => Self::parse_return_statement(parser),
            Token::Sub => {
                if !at_top_level {
                    return Err(parser.error("sub definitions are only legal at top level"));
                }
                Self::parse_sub_def(parser)
            }
            Token::Identifier(_) => Self::parse_assignment_or_expr_statement(parser),
            other => Err(parser.error(format!("unexpected token at start of statement: {other:?}"))),
        }
    }

    fn parse_print_statement(parser: &mut Parser) -> Result<Stmt, ParseError> {
        parser.advance();
        let arg = if let Token::StringLiteral(text) = parser.peek().clone() {
            parser.advance();
            PrintArg::Str(text)
        } else {
            PrintArg::Expr(ExpressionParser::parse_expression(parser)?)
        };
        parser.expect(Token::Semicolon, "after a print statement")?;
        Ok(Stmt::Print(arg))
    }

    fn parse_if_statement(parser: &mut Parser) -> Result<Stmt, ParseError> {
        parser.advance();
        let condition = ExpressionParser::parse_expression(parser)?;
        let then_block = Self::parse_block(parser)?;
        let else_block = if parser.matches(&Token::Else) {
            Some(Self::parse_block(parser)?)
        } else {
            None
        };
        Ok(Stmt::If { condition, then_block, else_block })
    }

    fn parse_while_statement(parser: &mut Parser) -> Result<Stmt, ParseError> {
        parser.advance();
        let condition = ExpressionParser::parse_expression(parser)?;
        let body = Self::parse_block(parser)?;
        Ok(Stmt::While { condition, body })
    }

    fn parse_return_statement(parser: &mut Parser) -> Result<Stmt, ParseError> {
        parser.advance();
        if parser.matches(&Token::Semicolon) {
            return Ok(Stmt::Return(None));
        }
        let value = ExpressionParser::parse_expression(parser)?;
        parser.expect(Token::Semicolon, "after a return expression")?;
        Ok(Stmt::Return(Some(value)))
    }

    fn parse_sub_def(parser: &mut Parser) -> Result<Stmt, ParseError> {
        parser.advance();
        let name = parser.expect_identifier("after `sub`")?;
        parser.expect(Token::LParen, "to open a subroutine's parameter list")?;
        let mut params = Vec::new();
        if !parser.check(&Token::RParen) {
            loop {
                params.push(parser.expect_identifier("as a parameter name")?);
                if parser.matches(&Token::Comma) {
                    continue;
                }
                break;
            }
        }
        parser.expect(Token::RParen, "to close a subroutine's parameter list")?;
        let body = Self::parse_block(parser)?;
        Ok(Stmt::SubDef { name, params, body })
    }

    /// Parses either `name = expr;` or a bare call expression used as a
    /// statement (`name(args);`). Both start with an identifier, so one
    /// token of lookahead decides between them. The grammar restricts
    /// expression statements to calls — `1 + 2;` alone is not a statement.
    fn parse_assignment_or_expr_statement(parser: &mut Parser) -> Result<Stmt, ParseError> {
        if matches!(parser.peek_next(), Token::Assign) {
            let name = parser.expect_identifier("at the start of an assignment")?;
            parser.advance(); // consume `=`
            let value = ExpressionParser::parse_expression(parser)?;
            parser.expect(Token::Semicolon, "after an assignment")?;
            return Ok(Stmt::Assign { name, value });
        }

        let expr = ExpressionParser::parse_expression(parser)?;
        if !matches!(expr, Expr::Call { .. }) {
            return Err(parser.error("expected a call expression as a statement"));
        }
        parser.expect(Token::Semicolon, "after an expression statement")?;
        Ok(Stmt::ExprStmt(expr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::lexer::tokenize;

    fn parse_one(source: &str) -> Stmt {
        let tokens = tokenize(source).unwrap();
        let mut parser = Parser::new(tokens);
        StatementParser::parse_statement(&mut parser, true).unwrap()
    }

    #[test]
    fn parses_assignment() {
        assert!(matches!(parse_one("x = 1;"), Stmt::Assign { .. }));
    }

    #[test]
    fn parses_if_with_else() {
        match parse_one("if x { y = 1; } else { y = 2; }") {
            Stmt::If { else_block: Some(block), .. } => assert_eq!(block.len(), 1),
            other => panic!("unexpected statement: {other:?}"),
        }
    }

    #[test]
    fn parses_while_loop() {
        match parse_one("while x < 10 { x = x + 1; }") {
            Stmt::While { body, .. } => assert_eq!(body.len(), 1),
            other => panic!("unexpected statement: {other:?}"),
        }
    }

    #[test]
    fn parses_sub_def_with_params() {
        match parse_one("sub add(a, b) { return a + b; }") {
            Stmt::SubDef { name, params, body } => {
                assert_eq!(name, "add");
                assert_eq!(params, vec!["a".to_string(), "b".to_string()]);
                assert_eq!(body.len(), 1);
            }
            other => panic!("unexpected statement: {other:?}"),
        }
    }

    #[test]
    fn parses_bare_call_statement() {
        assert!(matches!(parse_one("foo(1, 2);"), Stmt::ExprStmt(_)));
    }

    #[test]
    fn parses_return_without_value() {
        assert!(matches!(parse_one("return;"), Stmt::Return(None)));
    }

    #[test]
    fn rejects_sub_nested_inside_if() {
        let tokens = tokenize("if 1 { sub f() { return 1; } }").unwrap();
        let mut parser = Parser::new(tokens);
        let err = StatementParser::parse_statement(&mut parser, true).unwrap_err();
        assert!(err.message.contains("top level"));
    }

    #[test]
    fn rejects_sub_nested_inside_while() {
        let tokens = tokenize("while 1 { sub f() { return 1; } }").unwrap();
        let mut parser = Parser::new(tokens);
        let err = StatementParser::parse_statement(&mut parser, true).unwrap_err();
        assert!(err.message.contains("top level"));
    }

    #[test]
    fn rejects_sub_nested_inside_sub() {
        let tokens = tokenize("sub outer() { sub inner() { return 1; } }").unwrap();
        let mut parser = Parser::new(tokens);
        let err = StatementParser::parse_statement(&mut parser, true).unwrap_err();
        assert!(err.message.contains("top level"));
    }

    #[test]
    fn rejects_non_call_expression_statement() {
        let tokens = tokenize("1 + 2;").unwrap();
        let mut parser = Parser::new(tokens);
        let err = StatementParser::parse_statement(&mut parser, true).unwrap_err();
        assert!(err.message.contains("call expression"));
    }
}
