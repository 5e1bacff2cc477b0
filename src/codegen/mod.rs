//! # Code Generation Module
//!
//! Translates an analyzed [`Program`] into a complete NASM source string.
//! Emission order is: the `.data`/`.bss` sections, then `_start` (the
//! program's top-level statements, skipping subroutine definitions), then
//! one `sub_<name>` block per subroutine in declaration order, after the
//! `exit` syscall so the instruction stream can never fall into them.
//!
//! Key components:
//! - [`writer::AssemblyWriter`]: buffered section output and label minting.
//! - [`expr::ExpressionGenerator`] / [`stmt::StatementGenerator`]: the
//!   per-node-kind lowering logic, each a static-dispatch struct taking a
//!   `&mut CodegenContext`.

pub mod expr;
pub mod stmt;
pub mod writer;

use crate::ast::nodes::{Program, Stmt};
use crate::compiler::analyzer::Analysis;
use crate::compiler::error::CompileError;
use stmt::StatementGenerator;
use writer::AssemblyWriter;

/// The `(continue, break)` targets a `break`/`continue` statement resolves
/// against; pushed when entering a `while` body, popped on exit.
pub struct LoopLabels {
    pub continue_label: String,
    pub break_label: String,
}

/// Shared state threaded through expression and statement generation: the
/// resolved variable/string tables from analysis, the output buffer, which
/// subroutine (if any) is currently being emitted, and the active loop
/// stack for `break`/`continue`.
pub struct CodegenContext<'a> {
    pub analysis: &'a Analysis,
    pub writer: AssemblyWriter,
    pub current_sub: Option<String>,
    pub current_return_label: Option<String>,
    pub loop_stack: Vec<LoopLabels>,
}

impl<'a> CodegenContext<'a> {
    fn new(analysis: &'a Analysis) -> Self {
        Self {
            analysis,
            writer: AssemblyWriter::new(),
            current_sub: None,
            current_return_label: None,
            loop_stack: Vec::new(),
        }
    }

    /// Resolves a variable to its `rbp`-relative offset in whichever scope
    /// the generator currently sits in — a subroutine's own scope, or the
    /// global scope at the top level.
    pub fn offset_of(&self, name: &str) -> Result<i64, CompileError> {
        match &self.current_sub {
            Some(sub_name) => self
                .analysis
                .subs
                .get(sub_name)
                .and_then(|scope| scope.offset_of(name))
                .ok_or_else(|| CompileError::undefined_variable(name)),
            None => self
                .analysis
                .globals
                .get(name)
                .ok_or_else(|| CompileError::undefined_variable(name)),
        }
    }

    fn emit_main_prologue(&mut self) {
        self.writer.emit_label("_start");
        self.writer.emit_instruction("push rbp");
        self.writer.emit_instruction("mov rbp, rsp");
        let frame_size = 8 * self.analysis.globals.len() as i64;
        if frame_size > 0 {
            self.writer.emit_instruction(&format!("sub rsp, {frame_size}"));
        }
        for name in self.analysis.globals.names().to_vec() {
            let offset = self.analysis.globals.get(&name).expect("just listed");
            self.writer
                .emit_instruction(&format!("mov qword [rbp{}], 0", fmt_offset(offset)));
        }
    }

    /// `_start` has no caller to return to: the program exits the process
    /// directly via the `exit` syscall rather than `ret`-ing.
    fn emit_main_epilogue(&mut self) {
        self.writer.emit_instruction("mov rsp, rbp");
        self.writer.emit_instruction("pop rbp");
        self.writer.emit_instruction("mov rax, 60");
        self.writer.emit_instruction("xor rdi, rdi");
        self.writer.emit_instruction("syscall");
        self.writer.emit(String::new());
    }

    fn emit_sub(&mut self, name: &str, body: &[Stmt]) -> Result<(), CompileError> {
        self.current_sub = Some(name.to_string());
        let return_label = format!("sub_{name}.return");
        self.current_return_label = Some(return_label.clone());

        self.writer.emit_label(&format!("sub_{name}"));
        self.writer.emit_instruction("push rbp");
        self.writer.emit_instruction("mov rbp, rsp");

        let local_names: Vec<String> = self
            .analysis
            .subs
            .get(name)
            .map(|scope| scope.locals.names().to_vec())
            .unwrap_or_default();
        let frame_size = 8 * local_names.len() as i64;
        if frame_size > 0 {
            self.writer.emit_instruction(&format!("sub rsp, {frame_size}"));
        }
        for local_name in &local_names {
            let offset = self
                .analysis
                .subs
                .get(name)
                .and_then(|scope| scope.locals.get(local_name))
                .expect("just listed");
            self.writer
                .emit_instruction(&format!("mov qword [rbp{}], 0", fmt_offset(offset)));
        }

        StatementGenerator::generate_block(self, body)?;

        // Implicit `return 0` for a body that falls off the end without an
        // explicit `return`; an explicit `return` already jumped past this.
        self.writer.emit_instruction("mov rax, 0");
        self.writer.emit_label(&return_label);
        self.writer.emit_instruction("mov rsp, rbp");
        self.writer.emit_instruction("pop rbp");
        self.writer.emit_instruction("ret");
        self.writer.emit(String::new());

        self.current_sub = None;
        self.current_return_label = None;
        Ok(())
    }
}

/// Formats a signed `rbp`-relative offset for embedding in a memory
/// operand, e.g. `8` -> `"+8"`, `-16` -> `"-16"`.
pub(crate) fn fmt_offset(offset: i64) -> String {
    if offset >= 0 {
        format!("+{offset}")
    } else {
        format!("{offset}")
    }
}

/// Generates the complete NASM source for `program`, given the variable
/// offsets and string pool `analyze` already resolved.
pub fn generate(program: &Program, analysis: &Analysis) -> Result<String, CompileError> {
    let mut ctx = CodegenContext::new(analysis);
    ctx.writer.build_data_section(analysis);

    ctx.emit_main_prologue();
    for statement in &program.statements {
        if matches!(statement, Stmt::SubDef { .. }) {
            continue;
        }
        StatementGenerator::generate(&mut ctx, statement)?;
    }
    ctx.emit_main_epilogue();

    for statement in &program.statements {
        if let Stmt::SubDef { name, body, .. } = statement {
            ctx.emit_sub(name, body)?;
        }
    }

    Ok(ctx.writer.render())
}

#[cfg(test)]
mod tests {
    use super::*;
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
    fn emits_main_and_extern_declarations() {
        let asm = compile_to_asm("x = 1;\nprint x;\n");
        assert!(asm.contains("global _start"));
        assert!(asm.contains("extern print_int"));
        assert!(asm.contains("_start:"));
    }

    #[test]
    fn emits_one_sub_block_per_subroutine() {
        let asm = compile_to_asm("sub add(a, b) { return a + b; }\nx = add(1, 2);\nprint x;\n");
        assert!(asm.contains("sub_add:"));
        assert!(asm.contains("call sub_add"));
    }

    #[test]
    fn labels_stay_unique_across_repeated_if_statements() {
        let asm = compile_to_asm("if 1 { x = 1; } if 1 { y = 2; }");
        assert!(asm.contains("endif.0"));
        assert!(asm.contains("endif.1"));
    }

    #[test]
    fn string_literal_print_references_interned_const() {
        let asm = compile_to_asm("print \"hi\";\n");
        assert!(asm.contains("const.0"));
        assert!(asm.contains("const.0_len"));
        assert!(asm.contains("syscall"));
    }

    #[test]
    fn zero_initializes_globals_and_locals() {
        let asm = compile_to_asm(
            "x = 0;\nsub f(a) {\n  y = 1;\n  return a + y;\n}\nprint f(1);\n",
        );
        assert!(asm.contains("mov qword [rbp-8], 0"));
    }

    #[test]
    fn program_exits_via_syscall_rather_than_returning() {
        let asm = compile_to_asm("print 1;\n");
        assert!(asm.contains("mov rax, 60"));
        assert!(asm.contains("xor rdi, rdi"));
    }

    #[test]
    fn sub_falling_off_the_end_implicitly_returns_zero() {
        let asm = compile_to_asm("sub f(a) {\n  x = a;\n}\nprint f(5);\n");
        let body_start = asm.find("sub_f:").expect("sub_f label emitted");
        let return_label = asm.find("sub_f.return:").expect("return label emitted");
        let body = &asm[body_start..return_label];
        assert!(body.trim_end().ends_with("mov rax, 0"));
    }
}
