//! Unit tests for the parser module.
//!
//! This module contains tests for parsing language constructs including:
//! - Variable declarations
//! - Function declarations and `main`
//! - Expressions and precedence
//! - Control flow statements
//! - Type annotations

use std::rc::Rc;

use super::parser::parse;
use crate::{
    ast::{
        ast::{Expr, Program, Stmt},
        types::TypeExpr,
    },
    errors::errors::Error,
    lexer::{lexer::tokenize, tokens::TokenKind},
};

fn parse_source(source: &str) -> Result<Program, Error> {
    let tokens = tokenize(source.to_string(), Some("test.monkey".to_string()))?;
    parse(tokens, Rc::new("test.monkey".to_string()))
}

fn parse_main_body(body: &str) -> Vec<Stmt> {
    let program = parse_source(&format!("fn main() {{\n{}\n}}", body)).unwrap();
    program.main.body
}

#[test]
fn test_parse_variable_declaration() {
    let body = parse_main_body("let x: int = 42;");

    let Stmt::VarDecl(decl) = &body[0] else {
        panic!("expected a declaration, got {:?}", body[0]);
    };
    assert_eq!(decl.identifier, "x");
    assert!(!decl.constant);
    assert_eq!(decl.explicit_type, TypeExpr::Int);
    assert!(matches!(decl.assigned_value, Expr::Number(ref number) if number.value == 42));
}

#[test]
fn test_parse_const_declarations() {
    let body = parse_main_body("const a: int = 1\nlet const b: string = \"x\"");

    for stmt in &body {
        let Stmt::VarDecl(decl) = stmt else {
            panic!("expected a declaration");
        };
        assert!(decl.constant);
    }
}

#[test]
fn test_declaration_requires_type() {
    let error = parse_source("fn main() { let x = 1 }").unwrap_err();

    assert_eq!(error.get_error_name(), "UnexpectedTokenDetailed");
}

#[test]
fn test_parse_function_declaration() {
    let program = parse_source("fn add(a: int, b: int): int { return a + b }\nfn main() {}").unwrap();

    assert_eq!(program.functions.len(), 1);
    let function = &program.functions[0];
    assert_eq!(function.name, "add");
    assert_eq!(function.parameters.len(), 2);
    assert_eq!(function.parameters[1].name, "b");
    assert_eq!(function.return_type, TypeExpr::Int);
    assert!(matches!(function.body.body[0], Stmt::Return(ref ret) if ret.value.is_some()));
}

#[test]
fn test_parse_program_sections() {
    let source = "let g: int = 1\nfn f(): void { }\nprint(g)\nfn main(): void { print(f) }";
    let program = parse_source(source).unwrap();

    assert_eq!(program.functions.len(), 1);
    assert_eq!(program.global_statements.len(), 2);
    assert_eq!(program.main.body.len(), 1);
}

#[test]
fn test_missing_main() {
    let error = parse_source("let x: int = 1").unwrap_err();

    assert_eq!(error.get_error_name(), "MissingMain");
}

#[test]
fn test_duplicate_main() {
    let error = parse_source("fn main() {}\nfn main() {}").unwrap_err();

    assert_eq!(error.get_error_name(), "DuplicateMain");
    assert_eq!(error.get_position().line, 2);
}

#[test]
fn test_main_must_return_void() {
    assert!(parse_source("fn main(): int { return 1 }").is_err());
    assert!(parse_source("fn main(x: int) { }").is_err());
}

#[test]
fn test_operator_precedence() {
    let body = parse_main_body("1 + 2 * 3 < 10 - 4");

    let Stmt::Expression(stmt) = &body[0] else {
        panic!("expected an expression statement");
    };
    let Expr::Binary(relational) = &stmt.expression else {
        panic!("expected a binary expression");
    };
    assert_eq!(relational.operator.kind, TokenKind::Less);

    let Expr::Binary(sum) = relational.left.as_ref() else {
        panic!("expected a binary expression");
    };
    assert_eq!(sum.operator.kind, TokenKind::Plus);
    assert!(matches!(sum.right.as_ref(), Expr::Binary(product) if product.operator.kind == TokenKind::Star));
}

#[test]
fn test_binary_operators_are_left_associative() {
    let body = parse_main_body("10 - 3 - 2");

    let Stmt::Expression(stmt) = &body[0] else {
        panic!("expected an expression statement");
    };
    let Expr::Binary(outer) = &stmt.expression else {
        panic!("expected a binary expression");
    };
    assert!(matches!(outer.left.as_ref(), Expr::Binary(_)));
    assert!(matches!(outer.right.as_ref(), Expr::Number(number) if number.value == 2));
}

#[test]
fn test_parse_postfix_chain() {
    let body = parse_main_body("f(1)[0](2, 3)");

    let Stmt::Expression(stmt) = &body[0] else {
        panic!("expected an expression statement");
    };
    let Expr::Call(call) = &stmt.expression else {
        panic!("expected a call");
    };
    assert_eq!(call.arguments.len(), 2);

    let Expr::Index(index) = call.callee.as_ref() else {
        panic!("expected an index expression");
    };
    assert!(matches!(index.target.as_ref(), Expr::Call(_)));
}

#[test]
fn test_parse_literals() {
    // A `{` in statement position opens a block, so the hash goes through print
    let body = parse_main_body("[1, 2, 3]\nprint({\"a\": 1, \"b\": 2})\n'c'\ntrue\nfn(x: int): int { return x }");

    assert!(matches!(&body[0], Stmt::Expression(stmt) if matches!(&stmt.expression, Expr::Array(array) if array.elements.len() == 3)));
    assert!(matches!(&body[1], Stmt::Print(stmt) if matches!(&stmt.value, Expr::Hash(hash) if hash.entries.len() == 2)));
    assert!(matches!(&body[2], Stmt::Expression(stmt) if matches!(&stmt.expression, Expr::Char(c) if c.value == 'c')));
    assert!(matches!(&body[3], Stmt::Expression(stmt) if matches!(&stmt.expression, Expr::Bool(b) if b.value)));
    assert!(matches!(&body[4], Stmt::Expression(stmt) if matches!(&stmt.expression, Expr::Function(f) if f.parameters.len() == 1)));
}

#[test]
fn test_block_and_hash_disambiguation() {
    let body = parse_main_body("{ let x: hash<int, int> = {} }");

    let Stmt::Block(block) = &body[0] else {
        panic!("expected a block");
    };
    let Stmt::VarDecl(decl) = &block.body[0] else {
        panic!("expected a declaration");
    };
    assert!(matches!(&decl.assigned_value, Expr::Hash(hash) if hash.entries.is_empty()));
}

#[test]
fn test_parse_if_else_statement() {
    let body = parse_main_body("if (x > 0) { print(\"positive\") } else { print(\"negative\") }");

    let Stmt::If(stmt) = &body[0] else {
        panic!("expected an if statement");
    };
    assert_eq!(stmt.consequent.body.len(), 1);
    assert!(stmt.alternate.is_some());
}

#[test]
fn test_parse_bare_return() {
    let program = parse_source("fn f(): void {\n return\n}\nfn g(): int { return 1 }\nfn main() {}").unwrap();

    assert!(matches!(&program.functions[0].body.body[0], Stmt::Return(ret) if ret.value.is_none()));
    assert!(matches!(&program.functions[1].body.body[0], Stmt::Return(ret) if ret.value.is_some()));
}

#[test]
fn test_parse_types() {
    let body = parse_main_body(
        "let a: array<array<int>> = []\nlet h: hash<string, array<char>> = {}\nlet f: fn(int, string): bool = g",
    );

    let types: Vec<TypeExpr> = body
        .iter()
        .map(|stmt| match stmt {
            Stmt::VarDecl(decl) => decl.explicit_type.clone(),
            _ => panic!("expected a declaration"),
        })
        .collect();

    assert_eq!(types[0].to_string(), "array<array<int>>");
    assert_eq!(types[1].to_string(), "hash<string, array<char>>");
    assert_eq!(types[2].to_string(), "fn(int, string): bool");
}

#[test]
fn test_unknown_type() {
    let error = parse_source("fn main() { let x: float = 1 }").unwrap_err();

    assert_eq!(error.get_error_name(), "UnknownType");
}

#[test]
fn test_node_ids_are_unique() {
    let body = parse_main_body("print(a + b * c)");

    let Stmt::Print(print) = &body[0] else {
        panic!("expected a print statement");
    };
    let Expr::Binary(sum) = &print.value else {
        panic!("expected a binary expression");
    };
    let Expr::Binary(product) = sum.right.as_ref() else {
        panic!("expected a binary expression");
    };

    let mut ids = vec![
        sum.id,
        sum.left.get_id(),
        product.id,
        product.left.get_id(),
        product.right.get_id(),
    ];
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 5);
}

#[test]
fn test_unexpected_token_reports_line() {
    let error = parse_source("fn main() {\n let x: int = 1 +\n}").unwrap_err();

    assert_eq!(error.get_error_name(), "UnexpectedToken");
    assert_eq!(error.get_position().line, 3);
}
