//! # Scope Analyzer
//!
//! Walks the AST once after parsing to (a) assign every variable and
//! parameter a stack-frame offset, (b) intern every string literal in
//! first-appearance order, and (c) enforce the structural rules the parser
//! itself cannot express: `return` only inside a subroutine, `break`/
//! `continue` only inside a `while`, calls only to subroutines that exist
//! and with the right arity, and string literals only as the sole argument
//! of `print`.
//!
//! Toy has exactly two kinds of scope — the flat global scope for
//! top-level statements, and one flat scope per subroutine covering its
//! parameters and locals. There are no nested block scopes: an `if` or
//! `while` body shares its enclosing scope.

use crate::ast::nodes::*;
use crate::compiler::error::CompileError;
use std::collections::HashMap;

/// Assigns each variable it sees a unique, monotonically increasing stack
/// slot below the frame base, in first-appearance order.
#[derive(Debug, Default)]
pub struct VarTable {
    offsets: HashMap<String, i64>,
    order: Vec<String>,
}

impl VarTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the frame offset for `name`, assigning a fresh slot the
    /// first time it is seen.
    pub fn slot_for(&mut self, name: &str) -> i64 {
        if let Some(&offset) = self.offsets.get(name) {
            return offset;
        }
        let index = self.order.len() as i64;
        let offset = -(8 * (index + 1));
        self.offsets.insert(name.to_string(), offset);
        self.order.push(name.to_string());
        offset
    }

    pub fn get(&self, name: &str) -> Option<i64> {
        self.offsets.get(name).copied()
    }

    /// Number of distinct local slots assigned so far.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Names in first-appearance order, for deterministic `.bss` emission.
    pub fn names(&self) -> &[String] {
        &self.order
    }
}

/// The flat scope belonging to a single subroutine: its parameters
/// (addressed positively above `rbp`) and its locals (addressed
/// negatively below `rbp`, same as globals).
#[derive(Debug)]
pub struct SubScope {
    pub params: Vec<String>,
    pub locals: VarTable,
}

impl SubScope {
    pub fn new(params: Vec<String>) -> Self {
        Self { params, locals: VarTable::new() }
    }

    /// Resolves `name` to a frame offset. Call arguments are evaluated
    /// and pushed left-to-right, so the first declared parameter ends up
    /// at the *highest* address among the pushed arguments (it was
    /// pushed first, so the stack pointer had the least distance left to
    /// fall): `rbp + 16 + 8*(n-1-j)` for parameter `j` of `n`. Anything
    /// else is treated as a local and assigned the next free slot below
    /// `rbp` on first use.
    pub fn offset_for(&mut self, name: &str) -> i64 {
        if let Some(index) = self.params.iter().position(|p| p == name) {
            let n = self.params.len() as i64;
            16 + 8 * (n - 1 - index as i64)
        } else {
            self.locals.slot_for(name)
        }
    }

    /// Non-mutating counterpart of [`Self::offset_for`], used by the code
    /// generator after analysis has already assigned every slot.
    pub fn offset_of(&self, name: &str) -> Option<i64> {
        if let Some(index) = self.params.iter().position(|p| p == name) {
            let n = self.params.len() as i64;
            Some(16 + 8 * (n - 1 - index as i64))
        } else {
            self.locals.get(name)
        }
    }
}

/// Interns string literals in first-appearance order so the code
/// generator can emit one `const.N` label per distinct literal.
#[derive(Debug, Default)]
pub struct StringTable {
    strings: Vec<String>,
    index: HashMap<String, usize>,
}

impl StringTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, text: &str) -> usize {
        if let Some(&id) = self.index.get(text) {
            return id;
        }
        let id = self.strings.len();
        self.strings.push(text.to_string());
        self.index.insert(text.to_string(), id);
        id
    }

    pub fn strings(&self) -> &[String] {
        &self.strings
    }

    /// Looks up the pool index assigned to a literal that was already
    /// interned during analysis.
    pub fn index_of(&self, text: &str) -> Option<usize> {
        self.index.get(text).copied()
    }
}

/// Everything the code generator needs that isn't already in the AST:
/// variable offsets, subroutine scopes in declaration order, and the
/// string pool.
#[derive(Debug, Default)]
pub struct Analysis {
    pub globals: VarTable,
    pub subs: HashMap<String, SubScope>,
    pub sub_order: Vec<String>,
    pub strings: StringTable,
}

/// Tracks where in the AST the walk currently is, for the structural
/// checks that depend on nesting (but not on block scoping, since Toy has
/// none below the subroutine level).
struct WalkContext<'a> {
    current_sub: Option<&'a str>,
    loop_depth: usize,
}

struct Analyzer {
    analysis: Analysis,
    sub_arity: HashMap<String, usize>,
    errors: Vec<CompileError>,
}

impl Analyzer {
    fn new() -> Self {
        Self {
            analysis: Analysis::default(),
            sub_arity: HashMap::new(),
            errors: Vec::new(),
        }
    }

    fn analyze(program: &Program) -> Result<Analysis, CompileError> {
        let mut analyzer = Self::new();
        analyzer.collect_sub_signatures(program);

        let mut ctx = WalkContext { current_sub: None, loop_depth: 0 };
        for statement in &program.statements {
            analyzer.visit_statement(statement, &mut ctx);
        }

        if analyzer.errors.is_empty() {
            Ok(analyzer.analysis)
        } else {
            Err(analyzer.errors.remove(0))
        }
    }

    /// First pass: record every subroutine's name and parameter count so
    /// calls can be checked regardless of textual order, and so every
    /// `SubScope` exists before any body is walked. Only scans top-level
    /// statements — the parser rejects `sub` anywhere else, so a `SubDef`
    /// never appears nested in the AST this sees.
    fn collect_sub_signatures(&mut self, program: &Program) {
        for statement in &program.statements {
            if let Stmt::SubDef { name, params, .. } = statement {
                self.sub_arity.insert(name.clone(), params.len());
                self.analysis.sub_order.push(name.clone());
                self.analysis
                    .subs
                    .insert(name.clone(), SubScope::new(params.clone()));
            }
        }
    }

    fn visit_statement(&mut self, statement: &Stmt, ctx: &mut WalkContext) {
        match statement {
            Stmt::Assign { name, value } => {
                self.visit_expression(value, ctx);
                self.register_slot(name, ctx);
            }
            Stmt::Print(arg) => match arg {
                PrintArg::Str(text) => {
                    self.analysis.strings.intern(text);
                }
                PrintArg::Expr(expr) => self.visit_expression(expr, ctx),
            },
            Stmt::If { condition, then_block, else_block } => {
                self.visit_expression(condition, ctx);
                for stmt in then_block {
                    self.visit_statement(stmt, ctx);
                }
                if let Some(else_block) = else_block {
                    for stmt in else_block {
                        self.visit_statement(stmt, ctx);
                    }
                }
            }
            Stmt::While { condition, body } => {
                self.visit_expression(condition, ctx);
                ctx.loop_depth += 1;
                for stmt in body {
                    self.visit_statement(stmt, ctx);
                }
                ctx.loop_depth -= 1;
            }
            Stmt::Break => {
                if ctx.loop_depth == 0 {
                    self.errors.push(CompileError::LoopControlOutsideLoop { keyword: "break" });
                }
            }
            Stmt::Continue => {
                if ctx.loop_depth == 0 {
                    self.errors.push(CompileError::LoopControlOutsideLoop { keyword: "continue" });
                }
            }
            Stmt::Return(value) => {
                if ctx.current_sub.is_none() {
                    self.errors.push(CompileError::ReturnOutsideSub);
                }
                if let Some(value) = value {
                    self.visit_expression(value, ctx);
                }
            }
            Stmt::SubDef { name, body, .. } => {
                let mut inner_ctx = WalkContext { current_sub: Some(name.as_str()), loop_depth: 0 };
                for stmt in body {
                    self.visit_statement(stmt, &mut inner_ctx);
                }
            }
            Stmt::ExprStmt(expr) => self.visit_expression(expr, ctx),
        }
    }

    fn visit_expression(&mut self, expression: &Expr, ctx: &WalkContext) {
        match expression {
            Expr::IntLiteral(_) => {}
            Expr::StringLiteral(_) => {
                self.errors.push(CompileError::StringOutsidePrint);
            }
            Expr::Variable(name) => {
                self.resolve_slot(name, ctx);
            }
            Expr::Binary { lhs, rhs, .. } => {
                self.visit_expression(lhs, ctx);
                self.visit_expression(rhs, ctx);
            }
            Expr::Unary { operand, .. } => {
                self.visit_expression(operand, ctx);
            }
            Expr::Call { name, args } => {
                for arg in args {
                    self.visit_expression(arg, ctx);
                }
                match self.sub_arity.get(name).copied() {
                    None => {
                        self.errors.push(CompileError::undefined_sub(name));
                    }
                    Some(expected) if expected != args.len() => {
                        self.errors.push(CompileError::arity_mismatch(name, expected, args.len()));
                    }
                    Some(_) => {}
                }
            }
        }
    }

    /// Assigns a fresh slot for a variable being written, in the scope the
    /// current walk position implies.
    fn register_slot(&mut self, name: &str, ctx: &WalkContext) {
        match ctx.current_sub {
            Some(sub_name) => {
                let scope = self.analysis.subs.get_mut(sub_name).expect("sub scope pre-registered");
                scope.offset_for(name);
            }
            None => {
                self.analysis.globals.slot_for(name);
            }
        }
    }

    /// Same as [`Self::register_slot`] but for a read; Toy has no
    /// "declare before use" requirement, so reads lazily assign a slot
    /// exactly like writes do.
    fn resolve_slot(&mut self, name: &str, ctx: &WalkContext) {
        match ctx.current_sub {
            Some(sub_name) => {
                if let Some(scope) = self.analysis.subs.get_mut(sub_name) {
                    scope.offset_for(name);
                }
            }
            None => {
                self.analysis.globals.slot_for(name);
            }
        }
    }
}

/// Runs scope analysis over `program`, returning the resolved variable
/// offsets and string pool the code generator needs, or the first
/// structural error encountered.
pub fn analyze(program: &Program) -> Result<Analysis, CompileError> {
    Analyzer::analyze(program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::lexer::tokenize;
    use crate::compiler::parser::parse;

    fn analyze_source(source: &str) -> Result<Analysis, CompileError> {
        let tokens = tokenize(source).unwrap();
        let program = parse(tokens).unwrap();
        analyze(&program)
    }

    #[test]
    fn assigns_distinct_global_slots_in_order() {
        let analysis = analyze_source("x = 1;\ny = 2;\nx = 3;\n").unwrap();
        assert_eq!(analysis.globals.get("x"), Some(-8));
        assert_eq!(analysis.globals.get("y"), Some(-16));
        assert_eq!(analysis.globals.len(), 2);
    }

    #[test]
    fn interns_strings_once_each() {
        let analysis = analyze_source("print \"hi\";\nprint \"bye\";\nprint \"hi\";\n").unwrap();
        assert_eq!(analysis.strings.strings(), &["hi".to_string(), "bye".to_string()]);
    }

    #[test]
    fn rejects_break_outside_loop() {
        let err = analyze_source("break;\n").unwrap_err();
        assert!(matches!(err, CompileError::LoopControlOutsideLoop { keyword: "break" }));
    }

    #[test]
    fn rejects_return_outside_sub() {
        let err = analyze_source("return 1;\n").unwrap_err();
        assert!(matches!(err, CompileError::ReturnOutsideSub));
    }

    #[test]
    fn rejects_call_to_undefined_sub() {
        let err = analyze_source("x = foo(1);\n").unwrap_err();
        assert!(matches!(err, CompileError::UndefinedSub { name } if name == "foo"));
    }

    #[test]
    fn rejects_arity_mismatch() {
        let err = analyze_source("sub add(a, b) { return a + b; }\nx = add(1);\n").unwrap_err();
        assert!(matches!(err, CompileError::ArityMismatch { name, expected: 2, found: 1 } if name == "add"));
    }

    #[test]
    fn resolves_parameters_above_frame_base() {
        let analysis = analyze_source("sub id(a) { return a; }\n").unwrap();
        let scope = &analysis.subs["id"];
        assert_eq!(scope.params, vec!["a".to_string()]);
    }

    #[test]
    fn allows_break_inside_nested_loop() {
        assert!(analyze_source("while 1 { if 1 { break; } }\n").is_ok());
    }
}
