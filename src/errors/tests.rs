//! Unit tests for error handling.
//!
//! This module contains tests for error types and error reporting.

use crate::errors::errors::{Error, ErrorImpl, ErrorTip, GenerationError, PipelineError, RuntimeFault};
use crate::type_checker::types::Type;
use crate::Position;
use std::rc::Rc;

fn position(offset: u32) -> Position {
    Position::new(offset, 1, Rc::new("test.monkey".to_string()))
}

#[test]
fn test_error_creation() {
    let error = Error::new(
        ErrorImpl::UnrecognisedToken {
            token: "@".to_string(),
        },
        position(10),
    );

    assert_eq!(error.get_error_name(), "UnrecognisedToken");
}

#[test]
fn test_error_position() {
    let error = Error::new(
        ErrorImpl::UnexpectedToken {
            token: "identifier".to_string(),
        },
        position(42),
    );

    assert_eq!(error.get_position().offset, 42);
    assert_eq!(error.get_position().line, 1);
}

#[test]
fn test_unknown_type_error() {
    let error = Error::new(
        ErrorImpl::UnknownType {
            type_: "float".to_string(),
        },
        position(0),
    );

    assert_eq!(error.get_error_name(), "UnknownType");
    assert_eq!(error.get_tip().to_string(), "Unknown type `float` found");
}

#[test]
fn test_missing_main_error() {
    let error = Error::new(ErrorImpl::MissingMain, position(0));

    assert_eq!(error.get_error_name(), "MissingMain");
    assert!(matches!(error.get_tip(), ErrorTip::Suggestion(_)));
}

#[test]
fn test_error_tip_none() {
    let error = Error::new(
        ErrorImpl::UnrecognisedToken {
            token: "@".to_string(),
        },
        position(0),
    );

    assert!(matches!(error.get_tip(), ErrorTip::None));
}

#[test]
fn test_error_tip_display() {
    let tip = ErrorTip::Suggestion("Try this instead".to_string());
    assert_eq!(tip.to_string(), "Try this instead");

    let tip = ErrorTip::None;
    assert_eq!(tip.to_string(), "");
}

#[test]
fn test_error_display_includes_line() {
    let error = Error::new(ErrorImpl::DuplicateMain, Position::new(3, 7, Rc::new("a.monkey".to_string())));

    assert_eq!(error.to_string(), "a.monkey:7: main function declared more than once");
}

#[test]
fn test_generation_error_message() {
    let error = GenerationError::UnsupportedConversion {
        from: Type::String,
        to: Type::Int,
    };

    assert_eq!(error.to_string(), "conversion from string to int is not supported");
}

#[test]
fn test_runtime_fault_message() {
    let fault = RuntimeFault::IndexOutOfRange { index: 5, length: 3 };

    assert_eq!(fault.to_string(), "index 5 out of range for array of length 3");
}

#[test]
fn test_semantic_pipeline_error_lists_every_diagnostic() {
    let error = PipelineError::Semantic(vec![
        "Line 1: first".to_string(),
        "Line 2: second".to_string(),
    ]);

    assert_eq!(error.to_string(), "2 semantic error(s):\nLine 1: first\nLine 2: second");
}
