use crate::Span;

use super::{
    expressions::{
        ArrayLiteralExpr, BinaryExpr, BoolExpr, CallExpr, CharExpr, FunctionLiteralExpr,
        HashLiteralExpr, IndexExpr, NumberExpr, StringExpr, SymbolExpr,
    },
    statements::{
        BlockStmt, ExpressionStmt, FnDeclStmt, IfStmt, PrintStmt, ReturnStmt, VarDeclStmt,
    },
};

/// Identity of an expression node, unique within one parsed program.
///
/// The type checker keys its resolved types on this id and the code
/// generator reads them back, so the id must survive cloning unchanged.
pub type NodeId = u32;

/// A whole Monkey program: top-level functions, global statements and the `main` block.
#[derive(Debug, Clone)]
pub struct Program {
    pub functions: Vec<FnDeclStmt>,
    pub global_statements: Vec<Stmt>,
    pub main: BlockStmt,
    pub span: Span,
}

/// Statement Types
///
/// Defines the kinds of statements in the AST.
#[derive(Debug, Clone)]
pub enum Stmt {
    VarDecl(VarDeclStmt),
    Return(ReturnStmt),
    Expression(ExpressionStmt),
    If(IfStmt),
    Print(PrintStmt),
    Block(BlockStmt),
}

impl Stmt {
    pub fn get_span(&self) -> &Span {
        match self {
            Stmt::VarDecl(stmt) => &stmt.span,
            Stmt::Return(stmt) => &stmt.span,
            Stmt::Expression(stmt) => &stmt.span,
            Stmt::If(stmt) => &stmt.span,
            Stmt::Print(stmt) => &stmt.span,
            Stmt::Block(stmt) => &stmt.span,
        }
    }
}

/// Expression Types
///
/// Defines the kinds of expressions in the AST. Every variant carries a
/// [`NodeId`] and a span.
#[derive(Debug, Clone)]
pub enum Expr {
    Number(NumberExpr),
    String(StringExpr),
    Char(CharExpr),
    Bool(BoolExpr),
    Symbol(SymbolExpr),
    Binary(BinaryExpr),
    Array(ArrayLiteralExpr),
    Hash(HashLiteralExpr),
    Function(FunctionLiteralExpr),
    Index(IndexExpr),
    Call(CallExpr),
}

impl Expr {
    pub fn get_id(&self) -> NodeId {
        match self {
            Expr::Number(expr) => expr.id,
            Expr::String(expr) => expr.id,
            Expr::Char(expr) => expr.id,
            Expr::Bool(expr) => expr.id,
            Expr::Symbol(expr) => expr.id,
            Expr::Binary(expr) => expr.id,
            Expr::Array(expr) => expr.id,
            Expr::Hash(expr) => expr.id,
            Expr::Function(expr) => expr.id,
            Expr::Index(expr) => expr.id,
            Expr::Call(expr) => expr.id,
        }
    }

    pub fn get_span(&self) -> &Span {
        match self {
            Expr::Number(expr) => &expr.span,
            Expr::String(expr) => &expr.span,
            Expr::Char(expr) => &expr.span,
            Expr::Bool(expr) => &expr.span,
            Expr::Symbol(expr) => &expr.span,
            Expr::Binary(expr) => &expr.span,
            Expr::Array(expr) => &expr.span,
            Expr::Hash(expr) => &expr.span,
            Expr::Function(expr) => &expr.span,
            Expr::Index(expr) => &expr.span,
            Expr::Call(expr) => &expr.span,
        }
    }

    /// Source line the expression starts on.
    pub fn line(&self) -> u32 {
        self.get_span().line()
    }
}
