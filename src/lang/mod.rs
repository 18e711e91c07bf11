//! # jminus Abstract Syntax Tree
//!
//! This module defines the Abstract Syntax Tree (AST) for jminus.
//! The AST is produced by the parser and consumed by the tree-walking
//! interpreter or the bytecode compiler.
//!
//! ## Conventions
//!
//! - Every `Expr` evaluates to exactly one `i64`.
//! - Every `Stmt` leaves the operand stack as it found it.
//! - Truthiness: zero is false, anything else is true.

pub mod node;
pub mod printer;

pub use node::{BinaryOp, Expr, Stmt};
