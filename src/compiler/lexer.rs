//! # Lexer
//!
//! Tokenizes Toy source text into a flat vector of `(Token, Span)` pairs.
//! `//` comments are stripped here; the parser never sees them.

use crate::compiler::error::ParseError;

/// A 1-based source position, used for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Token {
    // Literals
    Identifier(String),
    StringLiteral(String),
    Integer(i64),

    // Keywords
    If,
    Else,
    While,
    Print,
    Sub,
    Return,
    Break,
    Continue,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    EqEq,
    NotEq,
    Less,
    LessEq,
    Greater,
    GreaterEq,
    AndAnd,
    OrOr,
    Bang,
    Assign,

    // Punctuation
    Semicolon,
    Comma,
    LParen,
    RParen,
    LBrace,
    RBrace,

    Eof,
}

pub fn tokenize(source: &str) -> Result<Vec<(Token, Span)>, ParseError> {
    let mut tokens = Vec::new();
    let mut chars = source.chars().peekable();
    let mut line = 1usize;
    let mut column = 1usize;

    macro_rules! bump {
        () => {{
            let ch = chars.next().unwrap();
            if ch == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
            ch
        }};
    }

    while let Some(&ch) = chars.peek() {
        let start_line = line;
        let start_col = column;

        match ch {
            ' ' | '\t' | '\r' | '\n' => {
                bump!();
            }
            '/' => {
                bump!();
                if chars.peek() == Some(&'/') {
                    while let Some(&c) = chars.peek() {
                        if c == '\n' {
                            break;
                        }
                        bump!();
                    }
                } else {
                    tokens.push((Token::Slash, Span { line: start_line, column: start_col }));
                }
            }
            '"' => {
                bump!();
                let mut text = String::new();
                loop {
                    match chars.peek() {
                        None => {
                            return Err(ParseError::new(
                                start_line,
                                start_col,
                                "unterminated string literal",
                            ));
                        }
                        Some('\n') => {
                            return Err(ParseError::new(
                                start_line,
                                start_col,
                                "unterminated string literal",
                            ));
                        }
                        Some('"') => {
                            bump!();
                            break;
                        }
                        Some(_) => {
                            text.push(bump!());
                        }
                    }
                }
                tokens.push((Token::StringLiteral(text), Span { line: start_line, column: start_col }));
            }
            'a'..='z' | 'A'..='Z' | '_' => {
                let mut ident = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_alphanumeric() || c == '_' {
                        ident.push(bump!());
                    } else {
                        break;
                    }
                }
                let token = match ident.as_str() {
                    "if" => Token::If,
                    "else" => Token::Else,
                    "while" => Token::While,
                    "print" => Token::Print,
                    "sub" => Token::Sub,
                    "return" => Token::Return,
                    "break" => Token::Break,
                    "continue" => Token::Continue,
                    _ => Token::Identifier(ident),
                };
                tokens.push((token, Span { line: start_line, column: start_col }));
            }
            '0'..='9' => {
                let mut digits = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_digit() {
                        digits.push(bump!());
                    } else {
                        break;
                    }
                }
                let value: i64 = digits.parse().map_err(|_| {
                    ParseError::new(start_line, start_col, format!("invalid integer literal `{digits}`"))
                })?;
                tokens.push((Token::Integer(value), Span { line: start_line, column: start_col }));
            }
            '+' => {
                bump!();
                tokens.push((Token::Plus, Span { line: start_line, column: start_col }));
            }
            '-' => {
                bump!();
                tokens.push((Token::Minus, Span { line: start_line, column: start_col }));
            }
            '*' => {
                bump!();
                tokens.push((Token::Star, Span { line: start_line, column: start_col }));
            }
            '=' => {
                bump!();
                if chars.peek() == Some(&'=') {
                    bump!();
                    tokens.push((Token::EqEq, Span { line: start_line, column: start_col }));
                } else {
                    tokens.push((Token::Assign, Span { line: start_line, column: start_col }));
                }
            }
            '!' => {
                bump!();
                if chars.peek() == Some(&'=') {
                    bump!();
                    tokens.push((Token::NotEq, Span { line: start_line, column: start_col }));
                } else {
                    tokens.push((Token::Bang, Span { line: start_line, column: start_col }));
                }
            }
            '<' => {
                bump!();
                if chars.peek() == Some(&'=') {
                    bump!();
                    tokens.push((Token::LessEq, Span { line: start_line, column: start_col }));
                } else {
                    tokens.push((Token::Less, Span { line: start_line, column: start_col }));
                }
            }
            '>' => {
                bump!();
                if chars.peek() == Some(&'=') {
                    bump!();
                    tokens.push((Token::GreaterEq, Span { line: start_line, column: start_col }));
                } else {
                    tokens.push((Token::Greater, Span { line: start_line, column: start_col }));
                }
            }
            '&' => {
                bump!();
                if chars.peek() == Some(&'&') {
                    bump!();
                    tokens.push((Token::AndAnd, Span { line: start_line, column: start_col }));
                } else {
                    return Err(ParseError::new(start_line, start_col, "unexpected character `&`"));
                }
            }
            '|' => {
                bump!();
                if chars.peek() == Some(&'|') {
                    bump!();
                    tokens.push((Token::OrOr, Span { line: start_line, column: start_col }));
                } else {
                    return Err(ParseError::new(start_line, start_col, "unexpected character `|`"));
                }
            }
            ';' => {
                bump!();
                tokens.push((Token::Semicolon, Span { line: start_line, column: start_col }));
            }
            ',' => {
                bump!();
                tokens.push((Token::Comma, Span { line: start_line, column: start_col }));
            }
            '(' => {
                bump!();
                tokens.push((Token::LParen, Span { line: start_line, column: start_col }));
            }
            ')' => {
                bump!();
                tokens.push((Token::RParen, Span { line: start_line, column: start_col }));
            }
            '{' => {
                bump!();
                tokens.push((Token::LBrace, Span { line: start_line, column: start_col }));
            }
            '}' => {
                bump!();
                tokens.push((Token::RBrace, Span { line: start_line, column: start_col }));
            }
            other => {
                return Err(ParseError::new(
                    start_line,
                    start_col,
                    format!("unexpected character `{other}`"),
                ));
            }
        }
    }

    tokens.push((Token::Eof, Span { line, column }));
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token> {
        tokenize(source).unwrap().into_iter().map(|(t, _)| t).collect()
    }

    #[test]
    fn tokenizes_assignment_and_print() {
        assert_eq!(
            kinds("x = 42; print x;"),
            vec![
                Token::Identifier("x".into()),
                Token::Assign,
                Token::Integer(42),
                Token::Semicolon,
                Token::Print,
                Token::Identifier("x".into()),
                Token::Semicolon,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn strips_line_comments() {
        assert_eq!(
            kinds("x = 1; // trailing comment\ny = 2;"),
            vec![
                Token::Identifier("x".into()),
                Token::Assign,
                Token::Integer(1),
                Token::Semicolon,
                Token::Identifier("y".into()),
                Token::Assign,
                Token::Integer(2),
                Token::Semicolon,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn recognizes_comparison_and_logical_operators() {
        assert_eq!(
            kinds("a <= b && c != d || e > f"),
            vec![
                Token::Identifier("a".into()),
                Token::LessEq,
                Token::Identifier("b".into()),
                Token::AndAnd,
                Token::Identifier("c".into()),
                Token::NotEq,
                Token::Identifier("d".into()),
                Token::OrOr,
                Token::Identifier("e".into()),
                Token::Greater,
                Token::Identifier("f".into()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn rejects_unterminated_string() {
        let err = tokenize("print \"oops").unwrap_err();
        assert_eq!(err.line, 1);
        assert_eq!(err.column, 7);
    }

    #[test]
    fn rejects_newline_inside_string() {
        let err = tokenize("print \"oops\nmore\";").unwrap_err();
        assert_eq!(err.line, 1);
    }

    #[test]
    fn tracks_line_numbers_across_newlines() {
        let tokens = tokenize("x = 1;\ny = 2;\nz = 3;").unwrap();
        let third_ident = tokens
            .iter()
            .find(|(t, _)| matches!(t, Token::Identifier(s) if s == "z"))
            .unwrap();
        assert_eq!(third_ident.1.line, 3);
    }
}
