use std::slice::Iter;

use crate::Span;

use super::{
    ast::{Expr, Stmt},
    types::TypeExpr,
};

#[derive(Debug, Clone)]
pub struct BlockStmt {
    pub body: Vec<Stmt>,
    pub span: Span,
}

impl BlockStmt {
    pub fn iter(&self) -> Iter<'_, Stmt> {
        self.body.iter()
    }
}

#[derive(Debug, Clone)]
pub struct ExpressionStmt {
    pub expression: Expr,
    pub span: Span,
}

/// `let` / `const` declaration. Every declaration carries an explicit type.
#[derive(Debug, Clone)]
pub struct VarDeclStmt {
    pub identifier: String,
    pub constant: bool,
    pub explicit_type: TypeExpr,
    pub assigned_value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: String,
    pub type_: TypeExpr,
    pub span: Span,
}

/// Top-level function declaration.
#[derive(Debug, Clone)]
pub struct FnDeclStmt {
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub return_type: TypeExpr,
    pub body: BlockStmt,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct IfStmt {
    pub condition: Expr,
    pub consequent: BlockStmt,
    pub alternate: Option<BlockStmt>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct PrintStmt {
    pub value: Expr,
    pub span: Span,
}
