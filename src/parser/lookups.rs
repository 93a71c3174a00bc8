use std::collections::HashMap;

use crate::{
    ast::ast::{Expr, Stmt},
    errors::errors::Error,
    lexer::tokens::TokenKind,
};

use super::{expr::*, parser::Parser, stmt::*};

/// Precedence levels, weakest first. All binary operators are left associative.
#[derive(PartialEq, PartialOrd, Clone, Copy, Debug)]
pub enum BindingPower {
    Default,
    Relational,
    Additive,
    Multiplicative,
    Call,
    Primary,
}

pub type StmtHandler = fn(&mut Parser) -> Result<Stmt, Error>;
pub type NUDHandler = fn(&mut Parser) -> Result<Expr, Error>;
pub type LEDHandler = fn(&mut Parser, Expr, BindingPower) -> Result<Expr, Error>;

pub type StmtLookup = HashMap<TokenKind, StmtHandler>;
pub type NUDLookup = HashMap<TokenKind, NUDHandler>;
pub type LEDLookup = HashMap<TokenKind, LEDHandler>;
pub type BPLookup = HashMap<TokenKind, BindingPower>;

const BINARY_OPERATORS: [(TokenKind, BindingPower); 10] = [
    (TokenKind::Equals, BindingPower::Relational),
    (TokenKind::NotEquals, BindingPower::Relational),
    (TokenKind::Less, BindingPower::Relational),
    (TokenKind::LessEquals, BindingPower::Relational),
    (TokenKind::Greater, BindingPower::Relational),
    (TokenKind::GreaterEquals, BindingPower::Relational),
    (TokenKind::Plus, BindingPower::Additive),
    (TokenKind::Dash, BindingPower::Additive),
    (TokenKind::Star, BindingPower::Multiplicative),
    (TokenKind::Slash, BindingPower::Multiplicative),
];

/// Tokens that start a literal or a name.
const PRIMARY_TOKENS: [TokenKind; 6] = [
    TokenKind::Number,
    TokenKind::String,
    TokenKind::Char,
    TokenKind::True,
    TokenKind::False,
    TokenKind::Identifier,
];

pub fn create_token_lookups(parser: &mut Parser) {
    for (kind, binding_power) in BINARY_OPERATORS {
        parser.led(kind, binding_power, parse_binary_expr);
    }
    parser.led(TokenKind::OpenParen, BindingPower::Call, parse_call_expr);
    parser.led(TokenKind::OpenBracket, BindingPower::Call, parse_index_expr);

    for kind in PRIMARY_TOKENS {
        parser.nud(kind, parse_primary_expr);
    }
    parser.nud(TokenKind::OpenParen, parse_grouping_expr);
    parser.nud(TokenKind::OpenBracket, parse_array_literal_expr);
    parser.nud(TokenKind::OpenCurly, parse_hash_literal_expr);
    parser.nud(TokenKind::Fn, parse_function_literal_expr);

    // `{` at statement start is a block, never a hash literal
    parser.stmt(TokenKind::OpenCurly, parse_block_stmt_wrapped);
    parser.stmt(TokenKind::Let, parse_var_decl_stmt);
    parser.stmt(TokenKind::Const, parse_var_decl_stmt);
    parser.stmt(TokenKind::If, parse_if_stmt);
    parser.stmt(TokenKind::Return, parse_return_stmt);
    parser.stmt(TokenKind::Print, parse_print_stmt);
}
