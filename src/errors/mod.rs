//! Error types and error handling for the compiler.
//!
//! This module defines the error types used throughout the compilation
//! process. It includes:
//!
//! - Syntax errors with source position information and suggestions
//! - Scope table invariant violations
//! - Internal code generation errors
//! - Runtime faults raised while executing a generated program

pub mod errors;

#[cfg(test)]
mod tests;
