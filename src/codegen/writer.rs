//! # Assembly Writer
//!
//! A small buffered emitter for the three NASM sections the generated
//! program needs (`.data`, `.bss`, `.text`), plus a label minter that
//! hands out unique names per control-flow class (`if`, `else`, `endif`,
//! `while`, `endwhile`, `sc`). Keeping one counter per class, rather than
//! one flat counter, makes the emitted assembly easier to read without
//! weakening the uniqueness guarantee every label still needs.

use crate::compiler::analyzer::Analysis;
use std::collections::HashMap;
use std::fmt::Write as _;

pub struct AssemblyWriter {
    data: Vec<String>,
    bss: Vec<String>,
    text: Vec<String>,
    label_counters: HashMap<&'static str, usize>,
}

impl AssemblyWriter {
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            bss: Vec::new(),
            text: Vec::new(),
            label_counters: HashMap::new(),
        }
    }

    /// Mints a fresh label of the given class, e.g. `new_label("if")` ->
    /// `"if.0"`, then `"if.1"`, and so on. Each class counts independently.
    pub fn new_label(&mut self, class: &'static str) -> String {
        let counter = self.label_counters.entry(class).or_insert(0);
        let label = format!("{class}.{counter}");
        *counter += 1;
        label
    }

    pub fn emit(&mut self, line: impl Into<String>) {
        self.text.push(line.into());
    }

    pub fn emit_instruction(&mut self, instruction: &str) {
        self.text.push(format!("    {instruction}"));
    }

    pub fn emit_label(&mut self, label: &str) {
        self.text.push(format!("{label}:"));
    }

    pub fn emit_comment(&mut self, comment: &str) {
        self.text.push(format!("    ; {comment}"));
    }

    /// Builds the `.data` section: one labeled, null-terminated string per
    /// pool entry, plus its length (excluding the trailing null byte) as
    /// an `equ` constant.
    pub fn build_data_section(&mut self, analysis: &Analysis) {
        for (index, text) in analysis.strings.strings().iter().enumerate() {
            let escaped = escape_for_nasm(text);
            self.data.push(format!("const.{index}: db {escaped}, 0"));
            self.data.push(format!("const.{index}_len equ $-const.{index}-1"));
        }
    }

    pub fn render(self) -> String {
        let mut out = String::new();
        writeln!(out, "section .data").unwrap();
        for line in &self.data {
            writeln!(out, "    {line}").unwrap();
        }
        writeln!(out).unwrap();

        if !self.bss.is_empty() {
            writeln!(out, "section .bss").unwrap();
            for line in &self.bss {
                writeln!(out, "    {line}").unwrap();
            }
            writeln!(out).unwrap();
        }

        writeln!(out, "section .text").unwrap();
        writeln!(out, "    global _start").unwrap();
        writeln!(out, "    extern print_int, print_newline").unwrap();
        writeln!(out).unwrap();
        for line in &self.text {
            writeln!(out, "{line}").unwrap();
        }
        out
    }
}

impl Default for AssemblyWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Renders a Toy string literal as a NASM byte-list operand, e.g. `"hi"`
/// becomes `"hi"` verbatim (NASM accepts double-quoted string literals
/// directly inside a `db` list) since Toy strings have no escape syntax
/// and cannot contain a literal `"` or newline.
fn escape_for_nasm(text: &str) -> String {
    format!("\"{text}\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_unique_per_class_and_monotonic() {
        let mut writer = AssemblyWriter::new();
        assert_eq!(writer.new_label("if"), "if.0");
        assert_eq!(writer.new_label("if"), "if.1");
        assert_eq!(writer.new_label("while"), "while.0");
        assert_eq!(writer.new_label("if"), "if.2");
    }
}
