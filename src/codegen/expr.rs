//! # Expression Generator
//!
//! Lowers each [`Expr`] variant to NASM that leaves its result in `rax`.
//! Binary arithmetic and comparisons use a push/pop discipline around a
//! recursive post-order walk (left operand's result is saved on the real
//! stack while the right operand is evaluated); `&&`/`||` instead branch,
//! since their right operand must not always execute.

use super::{fmt_offset, CodegenContext};
use crate::ast::nodes::{BinOp, Expr, UnOp};
use crate::compiler::error::CompileError;

/// A static utility struct dedicated to lowering expressions.
pub struct ExpressionGenerator;

impl ExpressionGenerator {
    pub fn generate(ctx: &mut CodegenContext, expr: &Expr) -> Result<(), CompileError> {
        match expr {
            Expr::IntLiteral(value) => {
                ctx.writer.emit_instruction(&format!("mov rax, {value}"));
                Ok(())
            }
            Expr::StringLiteral(_) => {
                unreachable!("scope analyzer rejects string literals outside of print")
            }
            Expr::Variable(name) => {
                let offset = ctx.offset_of(name)?;
                ctx.writer.emit_instruction(&format!("mov rax, [rbp{}]", fmt_offset(offset)));
                Ok(())
            }
            Expr::Unary { op, operand } => Self::generate_unary(ctx, *op, operand),
            Expr::Binary { op: BinOp::And, lhs, rhs } => Self::generate_and(ctx, lhs, rhs),
            Expr::Binary { op: BinOp::Or, lhs, rhs } => Self::generate_or(ctx, lhs, rhs),
            Expr::Binary { op, lhs, rhs } => Self::generate_binary(ctx, *op, lhs, rhs),
            Expr::Call { name, args } => Self::generate_call(ctx, name, args),
        }
    }

    fn generate_unary(ctx: &mut CodegenContext, op: UnOp, operand: &Expr) -> Result<(), CompileError> {
        Self::generate(ctx, operand)?;
        match op {
            UnOp::Neg => ctx.writer.emit_instruction("neg rax"),
            UnOp::Not => {
                ctx.writer.emit_instruction("cmp rax, 0");
                ctx.writer.emit_instruction("sete al");
                ctx.writer.emit_instruction("movzx rax, al");
            }
        }
        Ok(())
    }

    /// Evaluates `lhs` then `rhs`, saving `lhs`'s result across the second
    /// evaluation with a `push`/`pop` pair, leaving `lhs` in `rax` and
    /// `rhs` in `rbx` before applying `op`.
    fn generate_binary(ctx: &mut CodegenContext, op: BinOp, lhs: &Expr, rhs: &Expr) -> Result<(), CompileError> {
        Self::generate(ctx, lhs)?;
        ctx.writer.emit_instruction("push rax");
        Self::generate(ctx, rhs)?;
        ctx.writer.emit_instruction("mov rbx, rax");
        ctx.writer.emit_instruction("pop rax");

        match op {
            BinOp::Add => ctx.writer.emit_instruction("add rax, rbx"),
            BinOp::Sub => ctx.writer.emit_instruction("sub rax, rbx"),
            BinOp::Mul => ctx.writer.emit_instruction("imul rax, rbx"),
            BinOp::Div => {
                ctx.writer.emit_instruction("cqo");
                ctx.writer.emit_instruction("idiv rbx");
            }
            BinOp::Eq => Self::emit_setcc(ctx, "sete"),
            BinOp::NotEq => Self::emit_setcc(ctx, "setne"),
            BinOp::Lt => Self::emit_setcc(ctx, "setl"),
            BinOp::LtEq => Self::emit_setcc(ctx, "setle"),
            BinOp::Gt => Self::emit_setcc(ctx, "setg"),
            BinOp::GtEq => Self::emit_setcc(ctx, "setge"),
            BinOp::And | BinOp::Or => unreachable!("short-circuit operators branch before reaching here"),
        }
        Ok(())
    }

    fn emit_setcc(ctx: &mut CodegenContext, mnemonic: &str) {
        ctx.writer.emit_instruction("cmp rax, rbx");
        ctx.writer.emit_instruction(&format!("{mnemonic} al"));
        ctx.writer.emit_instruction("movzx rax, al");
    }

    /// `lhs && rhs`: if `lhs` is false, short-circuit to `0` without
    /// evaluating `rhs`; otherwise the result is `rhs` normalized to
    /// strictly `0`/`1`.
    fn generate_and(ctx: &mut CodegenContext, lhs: &Expr, rhs: &Expr) -> Result<(), CompileError> {
        let false_label = ctx.writer.new_label("sc");
        let end_label = ctx.writer.new_label("sc");

        Self::generate(ctx, lhs)?;
        ctx.writer.emit_instruction("cmp rax, 0");
        ctx.writer.emit_instruction(&format!("je {false_label}"));

        Self::generate(ctx, rhs)?;
        Self::normalize_bool(ctx);
        ctx.writer.emit_instruction(&format!("jmp {end_label}"));

        ctx.writer.emit_label(&false_label);
        ctx.writer.emit_instruction("mov rax, 0");
        ctx.writer.emit_label(&end_label);
        Ok(())
    }

    /// `lhs || rhs`: if `lhs` is true, short-circuit to `1` without
    /// evaluating `rhs`; otherwise the result is `rhs` normalized.
    fn generate_or(ctx: &mut CodegenContext, lhs: &Expr, rhs: &Expr) -> Result<(), CompileError> {
        let true_label = ctx.writer.new_label("sc");
        let end_label = ctx.writer.new_label("sc");

        Self::generate(ctx, lhs)?;
        ctx.writer.emit_instruction("cmp rax, 0");
        ctx.writer.emit_instruction(&format!("jne {true_label}"));

        Self::generate(ctx, rhs)?;
        Self::normalize_bool(ctx);
        ctx.writer.emit_instruction(&format!("jmp {end_label}"));

        ctx.writer.emit_label(&true_label);
        ctx.writer.emit_instruction("mov rax, 1");
        ctx.writer.emit_label(&end_label);
        Ok(())
    }

    fn normalize_bool(ctx: &mut CodegenContext) {
        ctx.writer.emit_instruction("cmp rax, 0");
        ctx.writer.emit_instruction("setne al");
        ctx.writer.emit_instruction("movzx rax, al");
    }

    /// Evaluates arguments left-to-right, pushing each result immediately
    /// (see [`crate::compiler::analyzer::SubScope::offset_for`] for how
    /// the callee reads them back out in the same order).
    fn generate_call(ctx: &mut CodegenContext, name: &str, args: &[Expr]) -> Result<(), CompileError> {
        for arg in args {
            Self::generate(ctx, arg)?;
            ctx.writer.emit_instruction("push rax");
        }
        ctx.writer.emit_instruction(&format!("call sub_{name}"));
        if !args.is_empty() {
            ctx.writer.emit_instruction(&format!("add rsp, {}", 8 * args.len()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::generate;
    use crate::compiler::analyzer::analyze;
    use crate::compiler::lexer::tokenize;
    use crate::compiler::parser::parse;

    fn compile_to_asm(source: &str) -> String {
        let tokens = tokenize(source).unwrap();
        let program = parse(tokens).unwrap();
        let analysis = analyze(&program).unwrap();
        generate(&program, &analysis).unwrap()
    }

    #[test]
    fn division_uses_sign_extended_idiv() {
        let asm = compile_to_asm("x = 10 / 3;\n");
        assert!(asm.contains("cqo"));
        assert!(asm.contains("idiv rbx"));
    }

    #[test]
    fn comparison_normalizes_to_zero_or_one() {
        let asm = compile_to_asm("x = 1 < 2;\n");
        assert!(asm.contains("setl al"));
        assert!(asm.contains("movzx rax, al"));
    }

    #[test]
    fn short_circuit_and_skips_right_operand_label() {
        let asm = compile_to_asm("x = 1 && 2;\n");
        assert!(asm.contains("sc.0:"));
        assert!(asm.contains("sc.1:"));
    }

    #[test]
    fn call_cleans_up_pushed_arguments() {
        let asm = compile_to_asm("sub add(a, b) { return a + b; }\nx = add(1, 2);\n");
        assert!(asm.contains("add rsp, 16"));
    }
}
