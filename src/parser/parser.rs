//! Token cursor and the program-level entry point.
//!
//! Expressions are parsed Pratt style: every token kind may own a prefix
//! (NUD) handler, an infix (LED) handler with a binding power, a statement
//! handler and a type handler, all registered in tables on the [`Parser`].
//! A program is a sequence of function declarations and global statements
//! around exactly one `fn main()`.

use std::{collections::HashMap, rc::Rc};

use tracing::debug;

use crate::{
    ast::{
        ast::{NodeId, Program},
        statements::{BlockStmt, FnDeclStmt},
        types::TypeExpr,
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::{Token, TokenKind},
    Position, Span,
};

use super::{
    lookups::{
        create_token_lookups, BPLookup, BindingPower, LEDHandler, LEDLookup, NUDHandler, NUDLookup,
        StmtHandler, StmtLookup,
    },
    stmt::{parse_block_stmt, parse_fn_decl_stmt, parse_stmt},
    types::{create_token_type_lookups, TypeNUDHandler, TypeNUDLookup},
};

pub struct Parser {
    /// Always terminated by EOF
    tokens: Vec<Token>,
    pos: usize,
    file: Rc<String>,
    stmt_lookup: StmtLookup,
    nud_lookup: NUDLookup,
    led_lookup: LEDLookup,
    binding_power_lookup: BPLookup,
    type_nud_lookup: TypeNUDLookup,
    /// Next free expression id
    current_id: NodeId,
}

impl Parser {
    /// Wraps `tokens`, appending an EOF token when the lexer left none.
    pub fn new(mut tokens: Vec<Token>, file: Rc<String>) -> Self {
        if tokens.last().map(|token| token.kind) != Some(TokenKind::EOF) {
            let end = tokens
                .last()
                .map(|token| token.span.end.clone())
                .unwrap_or_else(|| Position::new(0, 1, Rc::clone(&file)));

            tokens.push(Token {
                kind: TokenKind::EOF,
                value: String::from("EOF"),
                span: Span { start: end.clone(), end },
            });
        }

        Parser {
            tokens,
            pos: 0,
            file,
            stmt_lookup: HashMap::new(),
            nud_lookup: HashMap::new(),
            led_lookup: HashMap::new(),
            binding_power_lookup: HashMap::new(),
            type_nud_lookup: HashMap::new(),
            current_id: 0,
        }
    }

    pub fn current_token(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    pub fn current_token_kind(&self) -> TokenKind {
        self.current_token().kind
    }

    pub fn peek(&self) -> &Token {
        &self.tokens[(self.pos + 1).min(self.tokens.len() - 1)]
    }

    /// Consumes the current token and returns it. Sticks at EOF.
    pub fn advance(&mut self) -> &Token {
        let index = self.pos.min(self.tokens.len() - 1);
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        &self.tokens[index]
    }

    /// Consumes a token of `expected_kind`, failing with `error` (or a
    /// generic unexpected-token error) on anything else.
    pub fn expect_error(
        &mut self,
        expected_kind: TokenKind,
        error: Option<Error>,
    ) -> Result<Token, Error> {
        let token = self.current_token();

        if token.kind == expected_kind {
            return Ok(self.advance().clone());
        }

        match error {
            Some(error) => Err(error),
            None => Err(Error::new(
                ErrorImpl::UnexpectedTokenDetailed {
                    token: token.value.clone(),
                    message: format!("expected {}", expected_kind),
                },
                token.span.start.clone(),
            )),
        }
    }

    pub fn expect(&mut self, expected_kind: TokenKind) -> Result<Token, Error> {
        self.expect_error(expected_kind, None)
    }

    /// Consumes the current token when it is of the given kind.
    pub fn eat(&mut self, kind: TokenKind) -> bool {
        if self.current_token_kind() == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    pub fn has_tokens(&self) -> bool {
        self.current_token_kind() != TokenKind::EOF
    }

    pub fn get_stmt_handler(&self, kind: TokenKind) -> Option<StmtHandler> {
        self.stmt_lookup.get(&kind).copied()
    }

    pub fn get_nud_handler(&self, kind: TokenKind) -> Option<NUDHandler> {
        self.nud_lookup.get(&kind).copied()
    }

    pub fn get_led_handler(&self, kind: TokenKind) -> Option<LEDHandler> {
        self.led_lookup.get(&kind).copied()
    }

    pub fn get_type_nud_handler(&self, kind: TokenKind) -> Option<TypeNUDHandler> {
        self.type_nud_lookup.get(&kind).copied()
    }

    /// Binding power of a token in infix position, `Default` if it has none.
    pub fn get_binding_power(&self, kind: TokenKind) -> BindingPower {
        self.binding_power_lookup
            .get(&kind)
            .copied()
            .unwrap_or(BindingPower::Default)
    }

    pub fn led(&mut self, kind: TokenKind, binding_power: BindingPower, led_fn: LEDHandler) {
        self.binding_power_lookup.insert(kind, binding_power);
        self.led_lookup.insert(kind, led_fn);
    }

    /// Registers a null denotation (prefix) handler for a token.
    ///
    /// Tokens that are also infix operators (`(` and `[`) keep their infix binding power.
    pub fn nud(&mut self, kind: TokenKind, nud_fn: NUDHandler) {
        self.nud_lookup.insert(kind, nud_fn);
    }

    pub fn stmt(&mut self, kind: TokenKind, stmt_fn: StmtHandler) {
        self.stmt_lookup.insert(kind, stmt_fn);
    }

    pub fn type_nud(&mut self, kind: TokenKind, nud_fn: TypeNUDHandler) {
        self.type_nud_lookup.insert(kind, nud_fn);
    }

    pub fn advance_id(&mut self) -> NodeId {
        let id = self.current_id;
        self.current_id += 1;
        id
    }

    pub fn get_position(&self) -> Position {
        self.current_token().span.start.clone()
    }

    /// End position of the most recently consumed token.
    pub fn get_previous_end(&self) -> Position {
        match self.pos.checked_sub(1) {
            Some(previous) => self.tokens[previous].span.end.clone(),
            None => self.get_position(),
        }
    }

    pub fn get_file(&self) -> Rc<String> {
        Rc::clone(&self.file)
    }
}

/// Parses `fn main() [: void] { ... }`, the `fn` token not yet consumed.
fn parse_main(parser: &mut Parser) -> Result<BlockStmt, Error> {
    parser.expect(TokenKind::Fn)?;
    parser.expect(TokenKind::Identifier)?;
    parser.expect(TokenKind::OpenParen)?;

    if parser.current_token_kind() != TokenKind::CloseParen {
        return Err(Error::new(
            ErrorImpl::UnexpectedTokenDetailed {
                token: parser.current_token().value.clone(),
                message: String::from("main takes no parameters"),
            },
            parser.get_position(),
        ));
    }
    parser.advance();

    if parser.eat(TokenKind::Colon) {
        let position = parser.get_position();
        let return_type = super::types::parse_type(parser)?;

        if return_type != TypeExpr::Void {
            return Err(Error::new(
                ErrorImpl::UnexpectedTokenDetailed {
                    token: return_type.to_string(),
                    message: String::from("main must return void"),
                },
                position,
            ));
        }
    }

    parse_block_stmt(parser)
}

fn is_fn_declaration(parser: &Parser) -> bool {
    parser.current_token_kind() == TokenKind::Fn && parser.peek().kind == TokenKind::Identifier
}

/// Sorts top-level items into function declarations, global statements
/// and the single `main` block.
pub fn parse(tokens: Vec<Token>, file: Rc<String>) -> Result<Program, Error> {
    let mut parser = Parser::new(tokens, Rc::clone(&file));
    create_token_lookups(&mut parser);
    create_token_type_lookups(&mut parser);

    let start = parser.get_position();
    let mut functions: Vec<FnDeclStmt> = vec![];
    let mut global_statements = vec![];
    let mut main: Option<BlockStmt> = None;

    while parser.has_tokens() {
        if is_fn_declaration(&parser) && parser.peek().value == "main" {
            let position = parser.get_position();
            let block = parse_main(&mut parser)?;

            if main.is_some() {
                return Err(Error::new(ErrorImpl::DuplicateMain, position));
            }
            main = Some(block);
        } else if is_fn_declaration(&parser) {
            functions.push(parse_fn_decl_stmt(&mut parser)?);
        } else {
            global_statements.push(parse_stmt(&mut parser)?);
        }

        parser.eat(TokenKind::Semicolon);
    }

    let Some(main) = main else {
        return Err(Error::new(ErrorImpl::MissingMain, parser.get_position()));
    };

    debug!(
        file = %file,
        functions = functions.len(),
        globals = global_statements.len(),
        "parsed program"
    );

    Ok(Program {
        functions,
        global_statements,
        main,
        span: Span {
            start,
            end: parser.get_position(),
        },
    })
}
