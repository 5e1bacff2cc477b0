//! # Expression Parser
//!
//! A cascade of one recursive-descent level per precedence class, low to
//! high: `||`, `&&`, comparison, `+`/`-`, `*`/`/`, unary, primary. Every
//! level except comparison loops to stay left-associative; comparison
//! parses at most one operator, since chained comparisons (`a < b < c`)
//! are rejected rather than silently re-associated.

use super::common::Parser;
use crate::ast::nodes::{BinOp, Expr, UnOp};
use crate::compiler::error::ParseError;
use crate::compiler::lexer::Token;

/// A static utility struct dedicated to parsing expressions and building
/// expression AST nodes.
pub struct ExpressionParser;

impl ExpressionParser {
    /// The entry point for parsing any expression.
    pub fn parse_expression(parser: &mut Parser) -> Result<Expr, ParseError> {
        Self::parse_or(parser)
    }

    /// `||` is the loosest-binding operator and left-associative.
    fn parse_or(parser: &mut Parser) -> Result<Expr, ParseError> {
        let mut lhs = Self::parse_and(parser)?;
        while matches!(parser.peek(), Token::OrOr) {
            parser.advance();
            let rhs = Self::parse_and(parser)?;
            lhs = Expr::Binary { op: BinOp::Or, lhs: Box::new(lhs), rhs: Box::new(rhs) };
        }
        Ok(lhs)
    }

    /// `&&` binds tighter than `||`, looser than comparison, left-associative.
    fn parse_and(parser: &mut Parser) -> Result<Expr, ParseError> {
        let mut lhs = Self::parse_comparison(parser)?;
        while matches!(parser.peek(), Token::AndAnd) {
            parser.advance();
            let rhs = Self::parse_comparison(parser)?;
            lhs = Expr::Binary { op: BinOp::And, lhs: Box::new(lhs), rhs: Box::new(rhs) };
        }
        Ok(lhs)
    }

    /// Comparison operators do not chain: at most one may appear at this
    /// level, unlike every other binary operator class.
    fn parse_comparison(parser: &mut Parser) -> Result<Expr, ParseError> {
        let lhs = Self::parse_additive(parser)?;
        let Some(op) = Self::comparison_op(parser.peek()) else {
            return Ok(lhs);
        };
        parser.advance();
        let rhs = Self::parse_additive(parser)?;
        let expr = Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs) };

        if Self::comparison_op(parser.peek()).is_some() {
            return Err(parser.error("comparison operators do not chain"));
        }
        Ok(expr)
    }

    fn comparison_op(token: &Token) -> Option<BinOp> {
        match token {
            Token::EqEq => Some(BinOp::Eq),
            Token::NotEq => Some(BinOp::NotEq),
            Token::Less => Some(BinOp::Lt),
            Token::LessEq => Some(BinOp::LtEq),
            Token::Greater => Some(BinOp::Gt),
            Token::GreaterEq => Some(BinOp::GtEq),
            _ => None,
        }
    }

    /// `+`/`-`, left-associative, tighter than comparison.
    fn parse_additive(parser: &mut Parser) -> Result<Expr, ParseError> {
        let mut lhs = Self::parse_multiplicative(parser)?;
        loop {
            let op = match parser.peek() {
                Token::Plus => BinOp::Add,
                Token::Minus => BinOp::Sub,
                _ => break,
            };
            parser.advance();
            let rhs = Self::parse_multiplicative(parser)?;
            lhs = Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs) };
        }
        Ok(lhs)
    }

    /// `*`/`/`, left-associative, tighter than additive.
    fn parse_multiplicative(parser: &mut Parser) -> Result<Expr, ParseError> {
        let mut lhs = Self::parse_unary(parser)?;
        loop {
            let op = match parser.peek() {
                Token::Star => BinOp::Mul,
                Token::Slash => BinOp::Div,
                _ => break,
            };
            parser.advance();
            let rhs = Self::parse_unary(parser)?;
            lhs = Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs) };
        }
        Ok(lhs)
    }

    /// Parses a unary prefix expression, or falls through to a primary
    /// expression if no unary operator is present.
    fn parse_unary(parser: &mut Parser) -> Result<Expr, ParseError> {
        match parser.peek() {
            Token::Minus => {
                parser.advance();
                let operand = Self::parse_unary(parser)?;
                Ok(Expr::Unary { op: UnOp::Neg, operand: Box::new(operand) })
            }
            Token::Bang => {
                parser.advance();
                let operand = Self::parse_unary(parser)?;
                Ok(Expr::Unary { op: UnOp::Not, operand: Box::new(operand) })
            }
            _ => Self::parse_primary(parser),
        }
    }

    /// Parses a primary expression: a literal, a parenthesized expression,
    /// a variable reference, or a subroutine call.
    fn parse_primary(parser: &mut Parser) -> Result<Expr, ParseError> {
        match parser.peek().clone() {
            Token::Integer(value) => {
                parser.advance();
                Ok(Expr::IntLiteral(value))
            }
            Token::StringLiteral(text) => {
                parser.advance();
                Ok(Expr::StringLiteral(text))
            }
            Token::LParen => {
                parser.advance();
                let expr = Self::parse_expression(parser)?;
                parser.expect(Token::RParen, "to close a parenthesized expression")?;
                Ok(expr)
            }
            Token::Identifier(name) => {
                parser.advance();
                if parser.check(&Token::LParen) {
                    parser.advance();
                    let args = Self::parse_call_arguments(parser)?;
                    Ok(Expr::Call { name, args })
                } else {
                    Ok(Expr::Variable(name))
                }
            }
            other => Err(parser.error(format!("expected an expression, found {other:?}"))),
        }
    }

    /// Parses the comma-separated argument list of a call, after the
    /// opening parenthesis has already been consumed.
    fn parse_call_arguments(parser: &mut Parser) -> Result<Vec<Expr>, ParseError> {
        let mut args = Vec::new();
        if parser.check(&Token::RParen) {
            parser.advance();
            return Ok(args);
        }
        loop {
            args.push(Self::parse_expression(parser)?);
            if parser.matches(&Token::Comma) {
                continue;
            }
            break;
        }
        parser.expect(Token::RParen, "to close a call's argument list")?;
        Ok(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::lexer::tokenize;

    fn parse_expr(source: &str) -> Expr {
        let tokens = tokenize(source).unwrap();
        let mut parser = Parser::new(tokens);
        ExpressionParser::parse_expression(&mut parser).unwrap()
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let expr = parse_expr("1 + 2 * 3");
        match expr {
            Expr::Binary { op: BinOp::Add, rhs, .. } => {
                assert!(matches!(*rhs, Expr::Binary { op: BinOp::Mul, .. }));
            }
            _ => panic!("expected a top-level addition"),
        }
    }

    #[test]
    fn and_binds_tighter_than_or() {
        let expr = parse_expr("a || b && c");
        match expr {
            Expr::Binary { op: BinOp::Or, rhs, .. } => {
                assert!(matches!(*rhs, Expr::Binary { op: BinOp::And, .. }));
            }
            _ => panic!("expected a top-level or"),
        }
    }

    #[test]
    fn parses_call_with_arguments() {
        let expr = parse_expr("add(1, 2)");
        match expr {
            Expr::Call { name, args } => {
                assert_eq!(name, "add");
                assert_eq!(args.len(), 2);
            }
            _ => panic!("expected a call expression"),
        }
    }

    #[test]
    fn comparison_does_not_chain() {
        let tokens = tokenize("a < b < c").unwrap();
        let mut parser = Parser::new(tokens);
        let err = ExpressionParser::parse_expression(&mut parser).unwrap_err();
        assert!(err.message.contains("do not chain"));
    }

    #[test]
    fn comparison_binds_looser_than_additive() {
        let expr = parse_expr("a + 1 < b");
        match expr {
            Expr::Binary { op: BinOp::Lt, lhs, .. } => {
                assert!(matches!(*lhs, Expr::Binary { op: BinOp::Add, .. }));
            }
            _ => panic!("expected a top-level comparison"),
        }
    }

    #[test]
    fn unary_negation_binds_tighter_than_binary() {
        let expr = parse_expr("-a + b");
        match expr {
            Expr::Binary { op: BinOp::Add, lhs, .. } => {
                assert!(matches!(*lhs, Expr::Unary { op: UnOp::Neg, .. }));
            }
            _ => panic!("expected a top-level addition"),
        }
    }
}
