//! # Compiler Module
//!
//! Aggregates the compiler's phases — lexer, parser, scope analyzer, code
//! generator, and error types — and exposes the single pipeline function
//! the driver calls: source text in, NASM assembly text out.

// Publicly exposes the compiler phases.
pub mod analyzer;
pub mod error;
pub mod lexer;
pub mod parser;

// Re-exports essential functions for external use.
pub use analyzer::analyze;
pub use lexer::tokenize;
pub use parser::parse;

use crate::codegen;
use crate::debug;
use error::ToycError;

/// Runs the full pipeline — tokenize, parse, analyze, generate — on a
/// complete Toy source string, returning the NASM assembly text or the
/// first error encountered.
///
/// Assembling and linking the output are out of scope here; the driver
/// only writes the returned text to a file.
pub fn compile_to_asm(source: &str) -> Result<String, ToycError> {
    debug::log_lexer(&format!("tokenizing {} bytes of source", source.len()));
    let tokens = tokenize(source)?;

    debug::log_parser(&format!("parsing {} tokens", tokens.len()));
    let ast = parse(tokens)?;

    debug::log_analyzer(&format!("analyzing {} top-level statements", ast.statements.len()));
    let analysis = analyze(&ast)?;

    debug::log_codegen(&format!(
        "generating NASM for {} global(s), {} subroutine(s)",
        analysis.globals.len(),
        analysis.sub_order.len()
    ));
    let asm = codegen::generate(&ast, &analysis)?;
    Ok(asm)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiles_a_minimal_program_to_assembly() {
        let asm = compile_to_asm("x = 1;\nprint x;\n").unwrap();
        assert!(asm.contains("global _start"));
    }

    #[test]
    fn surfaces_parse_errors_through_the_unified_error_type() {
        let err = compile_to_asm("x = ;").unwrap_err();
        assert!(matches!(err, ToycError::Parse(_)));
    }

    #[test]
    fn surfaces_compile_errors_through_the_unified_error_type() {
        let err = compile_to_asm("break;\n").unwrap_err();
        assert!(matches!(err, ToycError::Compile(_)));
    }
}
