//! Code generation module for the compiler.
//!
//! This module translates a type checked program into units of stack
//! machine code. It handles:
//!
//! - Storage selection for arguments, locals and global cells
//! - Instruction selection driven by the resolved expression types
//! - Labels and branches for `if`/`else`
//! - Function literals compiled as units of their own
//! - Operand stack balance checks for every statement and expression

pub mod bytecode;
pub mod compiler;
pub mod expr;
pub mod stmt;
