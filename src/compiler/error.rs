//! # Compiler Error Definitions
//!
//! This module centralizes the error types that can occur across the Toy
//! compiler's pipeline: lexing, parsing, scope analysis, and code
//! generation. It leverages the `thiserror` crate to simplify error
//! reporting and provide clear, descriptive messages to the user.

use thiserror::Error;

/// A lexer- or parser-level syntax error, carrying the 1-based source
/// position at which it was detected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{line}:{column}: {message}")]
pub struct ParseError {
    /// 1-based line number.
    pub line: usize,
    /// 1-based column number.
    pub column: usize,
    /// Human-readable description of what went wrong.
    pub message: String,
}

impl ParseError {
    /// Constructs a new `ParseError` at the given position.
    pub fn new(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            column,
            message: message.into(),
        }
    }
}

/// A semantic error raised by the scope analyzer or the code generator.
///
/// Unlike [`ParseError`], these are caught after the AST has already been
/// built successfully, so the offending node is identified by name rather
/// than by source position.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// `return` appeared outside of a subroutine body.
    #[error("return statement outside of a subroutine")]
    ReturnOutsideSub,

    /// `break` or `continue` appeared outside of a `while` loop.
    #[error("{keyword} statement outside of a loop")]
    LoopControlOutsideLoop {
        /// Either `"break"` or `"continue"`.
        keyword: &'static str,
    },

    /// A call referenced a subroutine that was never defined.
    #[error("call to undefined subroutine `{name}`")]
    UndefinedSub {
        /// The name that was called.
        name: String,
    },

    /// A string literal appeared somewhere other than the sole argument of
    /// `print`.
    #[error("string literal used outside of print")]
    StringOutsidePrint,

    /// A call supplied the wrong number of arguments for the subroutine's
    /// declared parameter list.
    #[error("subroutine `{name}` expects {expected} argument(s), got {found}")]
    ArityMismatch {
        /// The subroutine being called.
        name: String,
        /// The number of parameters the subroutine declares.
        expected: usize,
        /// The number of arguments actually supplied at the call site.
        found: usize,
    },

    /// A reference to a variable that the generator has no offset for.
    ///
    /// The analyzer zero-initializes every slot it discovers, so in
    /// practice this guards against internal inconsistencies rather than
    /// ordinary user mistakes.
    #[error("undefined variable `{name}`")]
    UndefinedVariable {
        /// The variable name.
        name: String,
    },

    /// Wrapper for I/O failures encountered by the driver (reading the
    /// source file or writing the generated assembly).
    #[error("I/O error: {0}")]
    Io(String),
}

impl CompileError {
    /// Constructs an [`CompileError::UndefinedSub`] variant.
    pub fn undefined_sub(name: impl Into<String>) -> Self {
        Self::UndefinedSub { name: name.into() }
    }

    /// Constructs an [`CompileError::UndefinedVariable`] variant.
    pub fn undefined_variable(name: impl Into<String>) -> Self {
        Self::UndefinedVariable { name: name.into() }
    }

    /// Constructs an [`CompileError::ArityMismatch`] variant.
    pub fn arity_mismatch(name: impl Into<String>, expected: usize, found: usize) -> Self {
        Self::ArityMismatch {
            name: name.into(),
            expected,
            found,
        }
    }
}

impl From<std::io::Error> for CompileError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// The top-level error returned by the driver, unifying the phases a user
/// can fail at.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToycError {
    /// A syntax error from the lexer or parser.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
    /// A semantic error from the analyzer or code generator.
    #[error("compile error: {0}")]
    Compile(#[from] CompileError),
}
