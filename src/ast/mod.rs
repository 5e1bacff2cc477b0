//! # Abstract Syntax Tree (AST) for Toy
//!
//! This module defines the core structures for the Abstract Syntax Tree (AST)
//! of the Toy language. The AST is built once by the parser and consumed once
//! by the code generator; it is never mutated after construction.
//!
//! It includes:
//! - [`nodes`]: Definitions for the statement and expression node families.

pub mod nodes;

pub use nodes::{BinOp, Expr, PrintArg, Program, Stmt, UnOp};
