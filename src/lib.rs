//! # Toy Compiler Crate
//!
//! This crate contains the core implementation of the Toy compiler,
//! providing modules for lexical analysis, parsing, scope analysis, and
//! code generation targeting freestanding x86-64 NASM assembly. It exposes
//! the pipeline phases individually and a single convenience entry point,
//! [`compile_to_asm`].

// --- Core Modules ---
/// Defines the Abstract Syntax Tree (AST) node structures and related types.
pub mod ast;
/// Contains the code generation phase logic.
pub mod codegen;
/// The core compiler logic, encompassing all phases and the pipeline entry point.
pub mod compiler;
/// Utilities for debugging and introspection of compiler stages.
pub mod debug;

// --- Public Re-exports (The Compiler API) ---
/// Re-exports the scope analysis function.
pub use compiler::analyze;
/// Re-exports the parsing function.
pub use compiler::parse;
/// Re-exports the lexical analysis (tokenization) function.
pub use compiler::tokenize;
/// Re-exports the unified pipeline error type.
pub use compiler::error::ToycError;

/// Compiles a complete Toy source string straight through to NASM
/// assembly text: tokenize, parse, scope-analyze, generate.
///
/// # Arguments
///
/// * `source` - The raw Toy source code string.
///
/// # Returns
///
/// The generated assembly text, or the first [`ToycError`] encountered.
pub fn compile_to_asm(source: &str) -> Result<String, ToycError> {
    compiler::compile_to_asm(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_api_compiles_a_program() {
        let asm = compile_to_asm("x = 1;\nprint x;\n").unwrap();
        assert!(asm.contains("section .text"));
    }
}

/// End-to-end scenarios, one per example in the testable-properties
/// section: each compiles a complete program and inspects the emitted
/// instruction shape, since this crate does not invoke `nasm`/`ld` to
/// actually execute the result.
#[cfg(test)]
mod end_to_end {
    use super::*;

    /// True if every needle appears in `asm`, each one strictly after the
    /// previous, in source order.
    fn in_order(asm: &str, needles: &[&str]) -> bool {
        let mut cursor = 0;
        for needle in needles {
            match asm[cursor..].find(needle) {
                Some(found) => cursor += found + needle.len(),
                None => return false,
            }
        }
        true
    }

    #[test]
    fn hello_prints_a_literal() {
        let asm = compile_to_asm("x = 42;\nprint x;\n").unwrap();
        assert!(in_order(&asm, &["mov rax, 42", "call print_int", "call print_newline"]));
    }

    #[test]
    fn arithmetic_precedence_multiplies_before_adding() {
        let asm = compile_to_asm("print 2 + 3 * 4;\n").unwrap();
        assert!(in_order(&asm, &["mov rax, 3", "mov rax, 4", "imul rax, rbx", "add rax, rbx"]));
    }

    #[test]
    fn parenthesized_precedence_adds_before_multiplying() {
        let asm = compile_to_asm("print (2 + 3) * 4;\n").unwrap();
        assert!(in_order(&asm, &["mov rax, 2", "mov rax, 3", "add rax, rbx", "imul rax, rbx"]));
    }

    #[test]
    fn conditional_emits_a_branch_and_both_arms() {
        let asm = compile_to_asm("x = 10;\nif x > 5 {\n  print 100;\n} else {\n  print 200;\n}\n").unwrap();
        assert!(asm.contains("setg al"));
        assert!(asm.contains("je else.0"));
        assert!(asm.contains("mov rax, 100"));
        assert!(asm.contains("mov rax, 200"));
        assert!(asm.contains("endif.0:"));
    }

    #[test]
    fn loop_with_continue_skips_the_print_on_that_iteration() {
        let asm = compile_to_asm(
            "i = 0;\nwhile i < 5 {\n  i = i + 1;\n  if i == 3 {\n    continue;\n  }\n  print i;\n}\n",
        )
        .unwrap();
        // `continue` resolves to the loop's own condition-check label.
        assert!(asm.contains("jmp while.0"));
        assert!(asm.contains("je endwhile.0"));
    }

    #[test]
    fn break_jumps_past_the_loops_own_condition_check() {
        let asm = compile_to_asm("while 1 {\n  break;\n}\nprint 0;\n").unwrap();
        assert!(asm.contains("jmp endwhile.0"));
    }

    #[test]
    fn recursive_factorial_calls_itself() {
        let asm = compile_to_asm(
            "sub factorial(n) {\n  if n <= 1 {\n    return 1;\n  }\n  return n * factorial(n - 1);\n}\nprint factorial(5);\n",
        )
        .unwrap();
        assert!(asm.contains("sub_factorial:"));
        assert!(asm.contains("call sub_factorial"));
        assert!(asm.contains("imul rax, rbx"));
    }

    #[test]
    fn short_circuit_and_skips_the_side_effecting_call() {
        let asm = compile_to_asm(
            "sub side() {\n  print 999;\n  return 1;\n}\nif 0 && side() {\n  print 1;\n}\nprint 7;\n",
        )
        .unwrap();
        // The call to `side` is only reachable after the short-circuit
        // false branch has already been taken at runtime — lexically it
        // must still appear after the `je` that skips it when the left
        // operand is zero.
        assert!(in_order(&asm, &["je sc.0", "call sub_side"]));
    }
}
