use crate::{
    ast::{
        ast::Stmt,
        statements::{
            BlockStmt, ExpressionStmt, FnDeclStmt, IfStmt, Parameter, PrintStmt, ReturnStmt,
            VarDeclStmt,
        },
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
    parser::{expr::parse_expr, lookups::BindingPower},
    Span,
};

use super::{parser::Parser, types::parse_type};

/// Parses one statement. A trailing `;` is optional and swallowed.
pub fn parse_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let stmt = match parser.get_stmt_handler(parser.current_token_kind()) {
        Some(stmt_fn) => stmt_fn(parser)?,
        None => {
            let expression = parse_expr(parser, BindingPower::Default)?;

            Stmt::Expression(ExpressionStmt {
                span: expression.get_span().clone(),
                expression,
            })
        }
    };

    parser.eat(TokenKind::Semicolon);

    Ok(stmt)
}

pub fn parse_var_decl_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start_token = parser.advance().clone();

    // `let const x` and `const x` both declare a constant
    let constant = start_token.kind == TokenKind::Const || parser.eat(TokenKind::Const);

    let error = Error::new(
        ErrorImpl::UnexpectedTokenDetailed {
            token: parser.current_token().value.clone(),
            message: String::from("expected identifier during variable declaration"),
        },
        parser.get_position(),
    );
    let identifier = parser.expect_error(TokenKind::Identifier, Some(error))?.value;

    let error = Error::new(
        ErrorImpl::UnexpectedTokenDetailed {
            token: parser.current_token().value.clone(),
            message: String::from("every declaration needs an explicit type"),
        },
        parser.get_position(),
    );
    parser.expect_error(TokenKind::Colon, Some(error))?;
    let explicit_type = parse_type(parser)?;

    parser.expect(TokenKind::Assignment)?;
    let assigned_value = parse_expr(parser, BindingPower::Default)?;

    Ok(Stmt::VarDecl(VarDeclStmt {
        span: Span {
            start: start_token.span.start.clone(),
            end: parser.get_previous_end(),
        },
        constant,
        identifier,
        explicit_type,
        assigned_value,
    }))
}

pub fn parse_if_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start.clone();

    let condition = parse_expr(parser, BindingPower::Default)?;
    let consequent = parse_block_stmt(parser)?;

    let alternate = if parser.eat(TokenKind::Else) {
        Some(parse_block_stmt(parser)?)
    } else {
        None
    };

    Ok(Stmt::If(IfStmt {
        condition,
        consequent,
        alternate,
        span: Span {
            start,
            end: parser.get_previous_end(),
        },
    }))
}

pub fn parse_print_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start.clone();

    parser.expect(TokenKind::OpenParen)?;
    let value = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseParen)?;

    Ok(Stmt::Print(PrintStmt {
        value,
        span: Span {
            start,
            end: parser.get_previous_end(),
        },
    }))
}

pub fn parse_block_stmt(parser: &mut Parser) -> Result<BlockStmt, Error> {
    let start = parser.expect(TokenKind::OpenCurly)?.span.start.clone();

    let mut statements = Vec::new();
    while parser.current_token_kind() != TokenKind::CloseCurly {
        statements.push(parse_stmt(parser)?);
    }

    parser.expect(TokenKind::CloseCurly)?;

    Ok(BlockStmt {
        body: statements,
        span: Span {
            start,
            end: parser.get_previous_end(),
        },
    })
}

pub fn parse_block_stmt_wrapped(parser: &mut Parser) -> Result<Stmt, Error> {
    Ok(Stmt::Block(parse_block_stmt(parser)?))
}

/// Parses `( name: type, ... )` including both parentheses.
pub fn parse_parameters(parser: &mut Parser) -> Result<Vec<Parameter>, Error> {
    parser.expect(TokenKind::OpenParen)?;

    let mut parameters = Vec::new();
    while parser.current_token_kind() != TokenKind::CloseParen {
        let name_token = parser.expect(TokenKind::Identifier)?;
        parser.expect(TokenKind::Colon)?;
        let type_ = parse_type(parser)?;

        parameters.push(Parameter {
            name: name_token.value,
            type_,
            span: Span {
                start: name_token.span.start,
                end: parser.get_previous_end(),
            },
        });

        if !parser.eat(TokenKind::Comma) {
            break;
        }
    }

    parser.expect(TokenKind::CloseParen)?;

    Ok(parameters)
}

pub fn parse_fn_decl_stmt(parser: &mut Parser) -> Result<FnDeclStmt, Error> {
    let start = parser.expect(TokenKind::Fn)?.span.start.clone();

    let name = parser.expect(TokenKind::Identifier)?.value;
    let parameters = parse_parameters(parser)?;

    let error = Error::new(
        ErrorImpl::UnexpectedTokenDetailed {
            token: parser.current_token().value.clone(),
            message: format!("expected `: <type>` after the parameters of `{}`", name),
        },
        parser.get_position(),
    );
    parser.expect_error(TokenKind::Colon, Some(error))?;
    let return_type = parse_type(parser)?;

    let body = parse_block_stmt(parser)?;

    Ok(FnDeclStmt {
        span: Span {
            start,
            end: body.span.end.clone(),
        },
        name,
        parameters,
        return_type,
        body,
    })
}

pub fn parse_return_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let return_token = parser.advance().clone();

    // A value must start on the same line as `return`
    let next = parser.current_token();
    let has_value = next.span.line() == return_token.span.line()
        && parser.get_nud_handler(next.kind).is_some();

    let value = if has_value {
        Some(parse_expr(parser, BindingPower::Default)?)
    } else {
        None
    };

    Ok(Stmt::Return(ReturnStmt {
        value,
        span: Span {
            start: return_token.span.start.clone(),
            end: parser.get_previous_end(),
        },
    }))
}
