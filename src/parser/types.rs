//! Type parsing implementation.
//!
//! This module handles parsing of type annotations. It supports:
//!
//! - Primitive types (`int`, `string`, `bool`, `char`, `void`)
//! - Generic collections (`array<T>`, `hash<K, V>`)
//! - Function types (`fn(T, U): R`)
//!
//! Like expression parsing, dispatch goes through a NUD lookup keyed on
//! the first token of the annotation.

use std::collections::HashMap;

use crate::{
    ast::types::TypeExpr,
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
};

use super::parser::Parser;

/// Type alias for type null denotation handler functions.
pub type TypeNUDHandler = fn(&mut Parser) -> Result<TypeExpr, Error>;

/// Type alias for type NUD lookup table.
pub type TypeNUDLookup = HashMap<TokenKind, TypeNUDHandler>;

/// Initializes the type parsing lookup table.
pub fn create_token_type_lookups(parser: &mut Parser) {
    parser.type_nud(TokenKind::Identifier, parse_symbol_type);
    parser.type_nud(TokenKind::Fn, parse_function_type);
}

pub fn parse_symbol_type(parser: &mut Parser) -> Result<TypeExpr, Error> {
    let token = parser.expect(TokenKind::Identifier)?;

    match token.value.as_str() {
        "int" => Ok(TypeExpr::Int),
        "string" => Ok(TypeExpr::String),
        "bool" => Ok(TypeExpr::Bool),
        "char" => Ok(TypeExpr::Char),
        "void" => Ok(TypeExpr::Void),
        "array" => {
            parser.expect(TokenKind::Less)?;
            let element = parse_type(parser)?;
            parser.expect(TokenKind::Greater)?;

            Ok(TypeExpr::Array(Box::new(element)))
        }
        "hash" => {
            parser.expect(TokenKind::Less)?;
            let key = parse_type(parser)?;
            parser.expect(TokenKind::Comma)?;
            let value = parse_type(parser)?;
            parser.expect(TokenKind::Greater)?;

            Ok(TypeExpr::Hash(Box::new(key), Box::new(value)))
        }
        _ => Err(Error::new(
            ErrorImpl::UnknownType { type_: token.value },
            token.span.start,
        )),
    }
}

pub fn parse_function_type(parser: &mut Parser) -> Result<TypeExpr, Error> {
    parser.expect(TokenKind::Fn)?;
    parser.expect(TokenKind::OpenParen)?;

    let mut parameters = vec![];
    while parser.current_token_kind() != TokenKind::CloseParen {
        parameters.push(parse_type(parser)?);

        if !parser.eat(TokenKind::Comma) {
            break;
        }
    }

    parser.expect(TokenKind::CloseParen)?;
    parser.expect(TokenKind::Colon)?;
    let return_type = parse_type(parser)?;

    Ok(TypeExpr::Function(parameters, Box::new(return_type)))
}

pub fn parse_type(parser: &mut Parser) -> Result<TypeExpr, Error> {
    let token_kind = parser.current_token_kind();
    let Some(nud_fn) = parser.get_type_nud_handler(token_kind) else {
        return Err(Error::new(
            ErrorImpl::UnexpectedTokenDetailed {
                token: parser.current_token().value.clone(),
                message: String::from("expected a type"),
            },
            parser.get_position(),
        ));
    };

    nud_fn(parser)
}
