use std::fmt::Display;

use thiserror::Error;

use crate::{type_checker::types::Type, Position};

/// A syntax error raised by the lexer or the parser.
#[derive(Debug, Clone)]
pub struct Error {
    internal_error: ErrorImpl,
    position: Position,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, position: Position) -> Self {
        Error {
            internal_error: error_impl,
            position,
        }
    }

    pub fn get_position(&self) -> &Position {
        &self.position
    }

    pub fn get_kind(&self) -> &ErrorImpl {
        &self.internal_error
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => "UnrecognisedToken",
            ErrorImpl::UnexpectedToken { .. } => "UnexpectedToken",
            ErrorImpl::UnexpectedTokenDetailed { .. } => "UnexpectedTokenDetailed",
            ErrorImpl::NumberParseError { .. } => "NumberParseError",
            ErrorImpl::InvalidCharLiteral { .. } => "InvalidCharLiteral",
            ErrorImpl::UnknownType { .. } => "UnknownType",
            ErrorImpl::MissingMain => "MissingMain",
            ErrorImpl::DuplicateMain => "DuplicateMain",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => ErrorTip::None,
            ErrorImpl::UnexpectedToken { token } => {
                ErrorTip::Suggestion(format!("Unexpected token: `{}`", token))
            }
            ErrorImpl::UnexpectedTokenDetailed { token, message } => {
                ErrorTip::Suggestion(format!("Unexpected token: `{}`, {}", token, message))
            }
            ErrorImpl::NumberParseError { token } => ErrorTip::Suggestion(format!(
                "Invalid number: `{}`, is it above the integer limit?",
                token
            )),
            ErrorImpl::InvalidCharLiteral { literal } => ErrorTip::Suggestion(format!(
                "Invalid char literal: `{}`, a char literal holds exactly one character",
                literal
            )),
            ErrorImpl::UnknownType { type_ } => {
                ErrorTip::Suggestion(format!("Unknown type `{}` found", type_))
            }
            ErrorImpl::MissingMain => ErrorTip::Suggestion(String::from(
                "Every program needs an entry block: `fn main() { ... }`",
            )),
            ErrorImpl::DuplicateMain => {
                ErrorTip::Suggestion(String::from("`main` may only be declared once"))
            }
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}: {}",
            self.position.file, self.position.line, self.internal_error
        )
    }
}

impl std::error::Error for Error {}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorImpl {
    #[error("unrecognised token: {token:?}")]
    UnrecognisedToken { token: String },
    #[error("unexpected token: {token:?}")]
    UnexpectedToken { token: String },
    #[error("unexpected token ({message}): {token:?}")]
    UnexpectedTokenDetailed { token: String, message: String },
    #[error("error parsing number: {token:?}")]
    NumberParseError { token: String },
    #[error("invalid char literal: {literal:?}")]
    InvalidCharLiteral { literal: String },
    #[error("unknown type {type_} found")]
    UnknownType { type_: String },
    #[error("program has no main function")]
    MissingMain,
    #[error("main function declared more than once")]
    DuplicateMain,
}

/// Misuse of the scope table. Unreachable from well-formed callers.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvariantViolation {
    #[error("cannot exit the global scope")]
    ExitGlobalScope,
}

/// Raised when the code generator meets a construct the analyzer should have rejected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerationError {
    #[error("variable `{name}` does not resolve to an argument, local, global or function")]
    UnresolvedVariable { name: String },
    #[error("no type recorded for expression node {node}")]
    MissingType { node: u32 },
    #[error("conversion from {from} to {to} is not supported")]
    UnsupportedConversion { from: Type, to: Type },
    #[error("call to `{function}` passes {received} arguments, signature takes {expected}")]
    ArityMismatch {
        function: String,
        expected: usize,
        received: usize,
    },
    #[error("no instruction for operator `{operator}` on {operand}")]
    UnsupportedOperator { operator: String, operand: Type },
    #[error("cannot index a value of type {target}")]
    InvalidIndexTarget { target: Type },
    #[error("cannot call a value of type {callee}")]
    InvalidCallee { callee: Type },
    #[error("stack imbalance in `{unit}`: expected depth {expected}, found {found}")]
    StackImbalance {
        unit: String,
        expected: usize,
        found: usize,
    },
    #[error("label L{label} in `{unit}` was never placed")]
    UnplacedLabel { unit: String, label: usize },
    #[error("callable unit #{unit} was reserved but never generated")]
    UnfinishedUnit { unit: usize },
    #[error(transparent)]
    Invariant(#[from] InvariantViolation),
}

/// A fault raised while executing a generated program.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuntimeFault {
    #[error("division by zero")]
    DivisionByZero,
    #[error("index {index} out of range for array of length {length}")]
    IndexOutOfRange { index: i64, length: usize },
    #[error("key {key} not found in hash")]
    KeyNotFound { key: String },
    #[error("`{builtin}` called on an empty array")]
    EmptyArray { builtin: String },
    #[error("callable expects {expected} arguments, received {received}")]
    ArityMismatch { expected: usize, received: usize },
    #[error("`{unit}` read argument {index}, which it was not passed")]
    MissingArgument { unit: String, index: usize },
    #[error("jump to unknown label L{label} in `{unit}`")]
    InvalidJump { unit: String, label: usize },
    #[error("invocation of an unresolved callable reference")]
    UnresolvedCallable,
    #[error("global `{name}` read before its initializer ran")]
    UninitializedGlobal { name: String },
    #[error("`{function}` reached its end without returning a value")]
    MissingReturn { function: String },
    #[error("call depth exceeded {limit} frames")]
    StackOverflow { limit: usize },
    #[error("operand stack underflow in `{unit}`")]
    StackUnderflow { unit: String },
    #[error("expected a {expected} operand, found {found}")]
    OperandMismatch { expected: String, found: String },
    #[error("failed to write program output: {message}")]
    Output { message: String },
}

/// Everything that can stop the compile-and-run pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("syntax error: {0}")]
    Syntax(Error),
    #[error("{} semantic error(s):\n{}", .0.len(), .0.join("\n"))]
    Semantic(Vec<String>),
    #[error("internal compiler error: {0}")]
    Invariant(#[from] InvariantViolation),
    #[error("internal code generation error: {0}")]
    Generation(#[from] GenerationError),
    #[error("runtime fault: {0}")]
    Runtime(#[from] RuntimeFault),
}

impl From<Error> for PipelineError {
    fn from(error: Error) -> Self {
        PipelineError::Syntax(error)
    }
}
