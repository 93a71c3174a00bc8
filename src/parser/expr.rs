use crate::{
    ast::{
        ast::Expr,
        expressions::{
            ArrayLiteralExpr, BinaryExpr, BoolExpr, CallExpr, CharExpr, FunctionLiteralExpr,
            HashLiteralExpr, IndexExpr, NumberExpr, StringExpr, SymbolExpr,
        },
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
    Span,
};

use super::{
    lookups::BindingPower,
    parser::Parser,
    stmt::{parse_block_stmt, parse_parameters},
    types::parse_type,
};

pub fn parse_expr(parser: &mut Parser, bp: BindingPower) -> Result<Expr, Error> {
    // First parse NUD
    let token_kind = parser.current_token_kind();
    let Some(nud_fn) = parser.get_nud_handler(token_kind) else {
        return Err(Error::new(
            ErrorImpl::UnexpectedToken {
                token: parser.current_token().value.clone(),
            },
            parser.get_position(),
        ));
    };

    let mut left = nud_fn(parser)?;

    // While LED and current BP is less than BP of current token, continue parsing lhs
    while parser.get_binding_power(parser.current_token_kind()) > bp {
        let token_kind = parser.current_token_kind();
        let Some(led_fn) = parser.get_led_handler(token_kind) else {
            return Err(Error::new(
                ErrorImpl::UnexpectedToken {
                    token: parser.current_token().value.clone(),
                },
                parser.get_position(),
            ));
        };

        left = led_fn(parser, left, parser.get_binding_power(token_kind))?;
    }

    Ok(left)
}

pub fn parse_primary_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let id = parser.advance_id();
    let token = parser.current_token().clone();

    let expr = match token.kind {
        TokenKind::Number => {
            let Ok(value) = token.value.parse::<i64>() else {
                return Err(Error::new(
                    ErrorImpl::NumberParseError { token: token.value },
                    token.span.start,
                ));
            };
            Expr::Number(NumberExpr { id, value, span: token.span })
        }
        TokenKind::Identifier => Expr::Symbol(SymbolExpr {
            id,
            value: token.value,
            span: token.span,
        }),
        TokenKind::String => Expr::String(StringExpr {
            id,
            value: token.value,
            span: token.span,
        }),
        TokenKind::Char => {
            let Some(value) = token.value.chars().next() else {
                return Err(Error::new(
                    ErrorImpl::InvalidCharLiteral { literal: token.value },
                    token.span.start,
                ));
            };
            Expr::Char(CharExpr { id, value, span: token.span })
        }
        TokenKind::True | TokenKind::False => Expr::Bool(BoolExpr {
            id,
            value: token.kind == TokenKind::True,
            span: token.span,
        }),
        _ => {
            return Err(Error::new(
                ErrorImpl::UnexpectedToken { token: token.value },
                token.span.start,
            ))
        }
    };

    parser.advance();
    Ok(expr)
}

pub fn parse_binary_expr(parser: &mut Parser, left: Expr, bp: BindingPower) -> Result<Expr, Error> {
    let operator_token = parser.advance().clone();

    let right = parse_expr(parser, bp)?;

    Ok(Expr::Binary(BinaryExpr {
        id: parser.advance_id(),
        span: Span {
            start: left.get_span().start.clone(),
            end: right.get_span().end.clone(),
        },
        left: Box::new(left),
        operator: operator_token,
        right: Box::new(right),
    }))
}

pub fn parse_grouping_expr(parser: &mut Parser) -> Result<Expr, Error> {
    parser.advance();
    let expr = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseParen)?;

    Ok(expr)
}

/// Parses a comma separated list of expressions up to `close`, consuming it.
fn parse_expr_list(parser: &mut Parser, close: TokenKind) -> Result<Vec<Expr>, Error> {
    let mut list = vec![];

    while parser.current_token_kind() != close {
        list.push(parse_expr(parser, BindingPower::Default)?);

        if !parser.eat(TokenKind::Comma) {
            break;
        }
    }

    parser.expect(close)?;
    Ok(list)
}

pub fn parse_call_expr(parser: &mut Parser, left: Expr, _bp: BindingPower) -> Result<Expr, Error> {
    parser.advance();

    let arguments = parse_expr_list(parser, TokenKind::CloseParen)?;

    Ok(Expr::Call(CallExpr {
        id: parser.advance_id(),
        span: Span {
            start: left.get_span().start.clone(),
            end: parser.get_previous_end(),
        },
        callee: Box::new(left),
        arguments,
    }))
}

pub fn parse_index_expr(parser: &mut Parser, left: Expr, _bp: BindingPower) -> Result<Expr, Error> {
    parser.advance();

    let index = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseBracket)?;

    Ok(Expr::Index(IndexExpr {
        id: parser.advance_id(),
        span: Span {
            start: left.get_span().start.clone(),
            end: parser.get_previous_end(),
        },
        target: Box::new(left),
        index: Box::new(index),
    }))
}

pub fn parse_array_literal_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let start = parser.advance().span.start.clone();

    let elements = parse_expr_list(parser, TokenKind::CloseBracket)?;

    Ok(Expr::Array(ArrayLiteralExpr {
        id: parser.advance_id(),
        elements,
        span: Span {
            start,
            end: parser.get_previous_end(),
        },
    }))
}

pub fn parse_hash_literal_expr(parser: &mut Parser) -> Result<Expr, Error> {
    // { key: value, key: value }
    let start = parser.advance().span.start.clone();

    let mut entries = vec![];

    while parser.current_token_kind() != TokenKind::CloseCurly {
        let key = parse_expr(parser, BindingPower::Default)?;
        parser.expect(TokenKind::Colon)?;
        let value = parse_expr(parser, BindingPower::Default)?;

        entries.push((key, value));

        if !parser.eat(TokenKind::Comma) {
            break;
        }
    }

    parser.expect(TokenKind::CloseCurly)?;

    Ok(Expr::Hash(HashLiteralExpr {
        id: parser.advance_id(),
        entries,
        span: Span {
            start,
            end: parser.get_previous_end(),
        },
    }))
}

pub fn parse_function_literal_expr(parser: &mut Parser) -> Result<Expr, Error> {
    // fn(a: int, b: int): int { ... }
    let start = parser.advance().span.start.clone();

    let parameters = parse_parameters(parser)?;
    parser.expect(TokenKind::Colon)?;
    let return_type = parse_type(parser)?;
    let body = parse_block_stmt(parser)?;

    Ok(Expr::Function(FunctionLiteralExpr {
        id: parser.advance_id(),
        parameters,
        return_type,
        span: Span {
            start,
            end: body.span.end.clone(),
        },
        body,
    }))
}
