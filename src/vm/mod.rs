//! Execution of generated programs.
//!
//! The VM interprets the units produced by the code generator on an
//! operand stack with one frame per active call. `print` output goes to
//! a caller supplied sink.

pub mod value;
pub mod vm;
