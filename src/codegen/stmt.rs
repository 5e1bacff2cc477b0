//! # Statement Generator
//!
//! Lowers each [`Stmt`] variant to NASM, delegating expression evaluation
//! to [`ExpressionGenerator`]. Every expression leaves its result in
//! `rax`, which statement lowering reads or stores as needed.

use super::expr::ExpressionGenerator;
use super::{fmt_offset, CodegenContext, LoopLabels};
use crate::ast::nodes::{Expr, PrintArg, Stmt};
use crate::compiler::error::CompileError;

/// A static utility struct dedicated to lowering statements.
pub struct StatementGenerator;

impl StatementGenerator {
    pub fn generate_block(ctx: &mut CodegenContext, statements: &[Stmt]) -> Result<(), CompileError> {
        for statement in statements {
            Self::generate(ctx, statement)?;
        }
        Ok(())
    }

    pub fn generate(ctx: &mut CodegenContext, statement: &Stmt) -> Result<(), CompileError> {
        match statement {
            Stmt::Assign { name, value } => Self::generate_assign(ctx, name, value),
            Stmt::Print(arg) => Self::generate_print(ctx, arg),
            Stmt::If { condition, then_block, else_block } => {
                Self::generate_if(ctx, condition, then_block, else_block.as_deref())
            }
            Stmt::While { condition, body } => Self::generate_while(ctx, condition, body),
            Stmt::Break => Self::generate_break(ctx),
            Stmt::Continue => Self::generate_continue(ctx),
            Stmt::Return(value) => Self::generate_return(ctx, value.as_ref()),
            // Subroutine bodies are emitted separately, from the top level only.
            Stmt::SubDef { .. } => Ok(()),
            Stmt::ExprStmt(expr) => ExpressionGenerator::generate(ctx, expr),
        }
    }

    fn generate_assign(ctx: &mut CodegenContext, name: &str, value: &Expr) -> Result<(), CompileError> {
        ExpressionGenerator::generate(ctx, value)?;
        let offset = ctx.offset_of(name)?;
        ctx.writer.emit_instruction(&format!("mov [rbp{}], rax", fmt_offset(offset)));
        Ok(())
    }

    fn generate_print(ctx: &mut CodegenContext, arg: &PrintArg) -> Result<(), CompileError> {
        match arg {
            PrintArg::Str(text) => {
                let index = ctx
                    .analysis
                    .strings
                    .index_of(text)
                    .expect("scope analyzer interns every print string literal");
                ctx.writer.emit_instruction("mov rax, 1");
                ctx.writer.emit_instruction("mov rdi, 1");
                ctx.writer.emit_instruction(&format!("lea rsi, [rel const.{index}]"));
                ctx.writer.emit_instruction(&format!("mov rdx, const.{index}_len"));
                ctx.writer.emit_instruction("syscall");
            }
            PrintArg::Expr(expr) => {
                ExpressionGenerator::generate(ctx, expr)?;
                ctx.writer.emit_instruction("mov rdi, rax");
                ctx.writer.emit_instruction("call print_int");
            }
        }
        ctx.writer.emit_instruction("call print_newline");
        Ok(())
    }

    fn generate_if(
        ctx: &mut CodegenContext,
        condition: &Expr,
        then_block: &[Stmt],
        else_block: Option<&[Stmt]>,
    ) -> Result<(), CompileError> {
        ExpressionGenerator::generate(ctx, condition)?;
        ctx.writer.emit_instruction("cmp rax, 0");

        let then_label = ctx.writer.new_label("if");
        let endif_label = ctx.writer.new_label("endif");

        match else_block {
            Some(else_stmts) => {
                let else_label = ctx.writer.new_label("else");
                ctx.writer.emit_instruction(&format!("je {else_label}"));
                ctx.writer.emit_label(&then_label);
                Self::generate_block(ctx, then_block)?;
                ctx.writer.emit_instruction(&format!("jmp {endif_label}"));
                ctx.writer.emit_label(&else_label);
                Self::generate_block(ctx, else_stmts)?;
                ctx.writer.emit_label(&endif_label);
            }
            None => {
                ctx.writer.emit_instruction(&format!("je {endif_label}"));
                ctx.writer.emit_label(&then_label);
                Self::generate_block(ctx, then_block)?;
                ctx.writer.emit_label(&endif_label);
            }
        }
        Ok(())
    }

    fn generate_while(ctx: &mut CodegenContext, condition: &Expr, body: &[Stmt]) -> Result<(), CompileError> {
        let while_label = ctx.writer.new_label("while");
        let endwhile_label = ctx.writer.new_label("endwhile");

        ctx.writer.emit_label(&while_label);
        ExpressionGenerator::generate(ctx, condition)?;
        ctx.writer.emit_instruction("cmp rax, 0");
        ctx.writer.emit_instruction(&format!("je {endwhile_label}"));

        ctx.loop_stack.push(LoopLabels {
            continue_label: while_label.clone(),
            break_label: endwhile_label.clone(),
        });
        Self::generate_block(ctx, body)?;
        ctx.loop_stack.pop();

        ctx.writer.emit_instruction(&format!("jmp {while_label}"));
        ctx.writer.emit_label(&endwhile_label);
        Ok(())
    }

    fn generate_break(ctx: &mut CodegenContext) -> Result<(), CompileError> {
        let target = ctx
            .loop_stack
            .last()
            .map(|labels| labels.break_label.clone())
            .expect("scope analyzer rejects break outside a loop");
        ctx.writer.emit_instruction(&format!("jmp {target}"));
        Ok(())
    }

    fn generate_continue(ctx: &mut CodegenContext) -> Result<(), CompileError> {
        let target = ctx
            .loop_stack
            .last()
            .map(|labels| labels.continue_label.clone())
            .expect("scope analyzer rejects continue outside a loop");
        ctx.writer.emit_instruction(&format!("jmp {target}"));
        Ok(())
    }

    fn generate_return(ctx: &mut CodegenContext, value: Option<&Expr>) -> Result<(), CompileError> {
        match value {
            Some(expr) => ExpressionGenerator::generate(ctx, expr)?,
            None => ctx.writer.emit_instruction("mov rax, 0"),
        }
        let label = ctx
            .current_return_label
            .clone()
            .expect("scope analyzer rejects return outside a subroutine");
        ctx.writer.emit_instruction(&format!("jmp {label}"));
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
    fn while_loop_emits_matching_labels() {
        let asm = compile_to_asm("i = 0;\nwhile i < 3 {\n  i = i + 1;\n}\n");
        assert!(asm.contains("while.0:"));
        assert!(asm.contains("endwhile.0:"));
    }

    #[test]
    fn break_jumps_to_enclosing_loops_exit() {
        let asm = compile_to_asm("while 1 {\n  break;\n}\n");
        assert!(asm.contains("jmp endwhile.0"));
    }

    #[test]
    fn return_without_value_zeroes_rax() {
        let asm = compile_to_asm("sub noop() { return; }\nnoop();\n");
        assert!(asm.contains("mov rax, 0"));
        assert!(asm.contains("sub_noop.return:"));
    }
}
