//! # AST Nodes
//!
//! This module defines the fundamental data structures (nodes) that make up
//! the Abstract Syntax Tree (AST) of the Toy language.

/// Represents the root of a Toy program's Abstract Syntax Tree (AST).
///
/// Subroutine definitions and ordinary statements may be freely interleaved
/// textually; the code generator separates them on emission (main body
/// first, subroutines after).
#[derive(Debug, Clone)]
pub struct Program {
    /// The ordered sequence of top-level statements.
    pub statements: Vec<Stmt>,
}

// -----------------------------------------------------------------------------

/// Represents all possible statement types in the Toy language.
#[derive(Debug, Clone)]
pub enum Stmt {
    /// `name = expr;`
    Assign { name: String, value: Expr },
    /// `print expr;` or `print "literal";`
    Print(PrintArg),
    /// `if cond { .. } [else { .. }]`
    If {
        condition: Expr,
        then_block: Vec<Stmt>,
        else_block: Option<Vec<Stmt>>,
    },
    /// `while cond { .. }`
    While { condition: Expr, body: Vec<Stmt> },
    /// `break;` — valid only inside a `while` body.
    Break,
    /// `continue;` — valid only inside a `while` body.
    Continue,
    /// `return [expr];` — valid only inside a subroutine body.
    Return(Option<Expr>),
    /// `sub name(params) { .. }` — only legal at top level.
    SubDef {
        name: String,
        params: Vec<String>,
        body: Vec<Stmt>,
    },
    /// A call used as a statement; its return value is discarded.
    ExprStmt(Expr),
}

// -----------------------------------------------------------------------------

/// The argument to a `print` statement: either a bare string literal or an
/// arbitrary integer-valued expression. Kept distinct from
/// [`Expr::StringLiteral`] because a string literal is valid *only* in this
/// position; everywhere else it is a semantic error.
#[derive(Debug, Clone)]
pub enum PrintArg {
    /// A string literal printed verbatim, followed by a newline.
    Str(String),
    /// An expression whose integer result is printed, followed by a newline.
    Expr(Expr),
}

// -----------------------------------------------------------------------------

/// Represents all possible expression types in the Toy language. Every
/// expression produces exactly one 64-bit signed integer result in `rax`.
#[derive(Debug, Clone)]
pub enum Expr {
    /// A literal 64-bit signed integer.
    IntLiteral(i64),
    /// A string literal. Valid only as the sole argument of `print`;
    /// rejected anywhere else by the scope analyzer.
    StringLiteral(String),
    /// A reference to a variable by its identifier.
    Variable(String),
    /// A binary operation involving two operands and an operator.
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// A unary operation (negation or logical not).
    Unary { op: UnOp, operand: Box<Expr> },
    /// A call to a user-defined subroutine.
    Call { name: String, args: Vec<Expr> },
}

// -----------------------------------------------------------------------------

/// Binary operators, grouped by the precedence classes the grammar defines.
/// Comparison operators do not chain; `&&`/`||` bind loosest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    /// Addition operator (`+`).
    Add,
    /// Subtraction operator (`-`).
    Sub,
    /// Multiplication operator (`*`).
    Mul,
    /// Division operator (`/`).
    Div,
    /// Equality comparison operator (`==`).
    Eq,
    /// Inequality comparison operator (`!=`).
    NotEq,
    /// Less-than comparison operator (`<`).
    Lt,
    /// Less-than-or-equal comparison operator (`<=`).
    LtEq,
    /// Greater-than comparison operator (`>`).
    Gt,
    /// Greater-than-or-equal comparison operator (`>=`).
    GtEq,
    /// Short-circuit logical AND (`&&`).
    And,
    /// Short-circuit logical OR (`||`).
    Or,
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    /// Arithmetic negation (`-x`).
    Neg,
    /// Logical not (`!x`).
    Not,
}
