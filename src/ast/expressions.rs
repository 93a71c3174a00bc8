use crate::{lexer::tokens::Token, Span};

use super::{
    ast::{Expr, NodeId},
    statements::{BlockStmt, Parameter},
    types::TypeExpr,
};

// LITERALS

/// Number Expression
/// Represents an integer literal in the AST.
#[derive(Debug, Clone)]
pub struct NumberExpr {
    pub id: NodeId,
    pub value: i64,
    pub span: Span,
}

/// String Expression
/// Represents a string literal in the AST, escapes already resolved.
#[derive(Debug, Clone)]
pub struct StringExpr {
    pub id: NodeId,
    pub value: String,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct CharExpr {
    pub id: NodeId,
    pub value: char,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct BoolExpr {
    pub id: NodeId,
    pub value: bool,
    pub span: Span,
}

/// Symbol Expression
/// A reference to a variable, parameter, function or built-in by name.
#[derive(Debug, Clone)]
pub struct SymbolExpr {
    pub id: NodeId,
    pub value: String,
    pub span: Span,
}

// COMPLEX

/// Binary Expression
/// `left <operator> right` where the operator is an arithmetic or relational token.
#[derive(Debug, Clone)]
pub struct BinaryExpr {
    pub id: NodeId,
    pub left: Box<Expr>,
    pub operator: Token,
    pub right: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ArrayLiteralExpr {
    pub id: NodeId,
    pub elements: Vec<Expr>,
    pub span: Span,
}

/// Hash literal, entries kept in source order.
#[derive(Debug, Clone)]
pub struct HashLiteralExpr {
    pub id: NodeId,
    pub entries: Vec<(Expr, Expr)>,
    pub span: Span,
}

/// Anonymous function. Compiled as its own callable unit, with no captured environment.
#[derive(Debug, Clone)]
pub struct FunctionLiteralExpr {
    pub id: NodeId,
    pub parameters: Vec<Parameter>,
    pub return_type: TypeExpr,
    pub body: BlockStmt,
    pub span: Span,
}

/// Element access `target[index]` on an array or a hash.
#[derive(Debug, Clone)]
pub struct IndexExpr {
    pub id: NodeId,
    pub target: Box<Expr>,
    pub index: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct CallExpr {
    pub id: NodeId,
    pub callee: Box<Expr>,
    pub arguments: Vec<Expr>,
    pub span: Span,
}
