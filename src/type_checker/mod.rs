//! Semantic analysis module.
//!
//! This module gives a parsed program its meaning. It:
//!
//! - Defines the closed set of Monkey types and their structural compatibility
//! - Maintains the hierarchical scope table, seeded with the built-ins
//! - Type checks every declaration, statement and expression in one walk
//! - Records the resolved type of each expression node for code generation
//!
//! Diagnostics are collected rather than raised, so one run reports every
//! problem it can find.

pub mod symbol_table;
pub mod type_checker;
pub mod typed_ast;
pub mod types;
