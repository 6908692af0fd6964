//! Recursive descent parser for workflow sources.
//!
//! Each top-level statement parses to a `Result`. On a grammar violation the
//! program loop records the error, calls [`Parser::synchronize`] and carries
//! on, so parsing always terminates with the program plus every syntax error
//! it met.

use crate::ast::{
    Connection, ConnectionsBlock, FunctionCall, Literal, Location, NodeDefinition, ParameterSpec,
    PortRef, Program, Statement, VariableDeclaration, WorkspaceBlock,
};
use crate::error::{Error, Result, SyntaxError};
use crate::lexer;
use crate::token::{Token, TokenKind};

type ParseResult<T> = std::result::Result<T, SyntaxError>;

/// Tokenize and parse a source string
pub fn parse(source: &str) -> ParseOutcome {
    Parser::new(lexer::tokenize(source)).parse()
}

/// A parsed program and the syntax errors met along the way
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOutcome {
    /// Every statement that parsed
    pub program: Program,
    /// Syntax errors in source order
    pub errors: Vec<SyntaxError>,
}

impl ParseOutcome {
    /// The program, or the first syntax error
    pub fn into_result(self) -> Result<Program> {
        match self.errors.into_iter().next() {
            Some(err) => Err(Error::Syntax(err)),
            None => Ok(self.program),
        }
    }
}

/// Which port list a section fills
#[derive(Clone, Copy)]
enum PortSection {
    Inputs,
    Outputs,
}

impl PortSection {
    fn keyword(self) -> &'static str {
        match self {
            PortSection::Inputs => "inputs",
            PortSection::Outputs => "outputs",
        }
    }

    fn noun(self) -> &'static str {
        match self {
            PortSection::Inputs => "input",
            PortSection::Outputs => "output",
        }
    }
}

/// Token cursor with one token of lookahead (two for declarations)
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    /// Create a parser over a token stream.
    ///
    /// Comment tokens are dropped here so that lookahead never sees them. An
    /// EOF token is appended if the stream lacks one.
    pub fn new(mut tokens: Vec<Token>) -> Self {
        tokens.retain(|t| t.kind != TokenKind::Comment);
        if !tokens.last().is_some_and(|t| t.is(TokenKind::Eof)) {
            let (line, column) = tokens.last().map_or((1, 1), |t| (t.line, t.column));
            tokens.push(Token::new(TokenKind::Eof, "", line, column));
        }
        Self { tokens, pos: 0 }
    }

    /// Parse the whole token stream
    pub fn parse(&mut self) -> ParseOutcome {
        let mut statements = Vec::new();
        let mut errors = Vec::new();

        while !self.check(TokenKind::Eof) {
            match self.statement() {
                Ok(statement) => statements.push(statement),
                Err(err) => {
                    tracing::debug!(
                        "Syntax error at {}:{}: {}",
                        err.token.line,
                        err.token.column,
                        err.message
                    );
                    errors.push(err);
                    self.synchronize();
                }
            }
        }

        ParseOutcome {
            program: Program { statements },
            errors,
        }
    }

    /// Recover after a syntax error.
    ///
    /// Discards the offending token, then tokens up to and including the next
    /// `;`. Stops early, without consuming, at a `workspace` or `connections`
    /// keyword or at the end of input.
    pub fn synchronize(&mut self) {
        self.advance();
        while !self.check(TokenKind::Eof) {
            match self.peek().kind {
                TokenKind::Semicolon => {
                    self.advance();
                    return;
                }
                TokenKind::Workspace | TokenKind::Connections => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// The current token
    pub fn peek(&self) -> &Token {
        self.peek_nth(0)
    }

    /// The token `n` places ahead, clamped to EOF
    pub fn peek_nth(&self, n: usize) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.pos + n).min(last)]
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().is(kind)
    }

    /// Consume the current token. The cursor never moves past EOF.
    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if !token.is(TokenKind::Eof) {
            self.pos += 1;
        }
        token
    }

    /// Consume the current token if it has the given kind
    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> ParseResult<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error(what))
        }
    }

    fn error(&self, what: &str) -> SyntaxError {
        let token = self.peek().clone();
        SyntaxError {
            message: format!("expected {}, found {}", what, token),
            token,
        }
    }

    fn location(&self) -> Location {
        let token = self.peek();
        Location::new(token.line, token.column)
    }

    fn statement(&mut self) -> ParseResult<Statement> {
        match self.peek().kind {
            TokenKind::Node => Ok(Statement::NodeDefinition(self.node_definition()?)),
            TokenKind::Workspace => Ok(Statement::Workspace(self.workspace_block()?)),
            TokenKind::Connections => Ok(Statement::Connections(self.connections_block()?)),
            TokenKind::Identifier if self.peek_nth(1).is(TokenKind::Equals) => Ok(
                Statement::VariableDeclaration(self.variable_declaration()?),
            ),
            _ => Ok(Statement::FunctionCall(self.function_call()?)),
        }
    }

    fn node_definition(&mut self) -> ParseResult<NodeDefinition> {
        let location = self.location();
        self.expect(TokenKind::Node, "'node'")?;
        let name = self.expect(TokenKind::Identifier, "node name")?;
        self.expect(TokenKind::LBrace, "'{' after node name")?;

        let mut def = NodeDefinition::new(name.text, location);
        while !self.check(TokenKind::RBrace) && !self.check(TokenKind::Eof) {
            match self.peek().kind {
                TokenKind::Inputs => self.port_section(&mut def, PortSection::Inputs)?,
                TokenKind::Outputs => self.port_section(&mut def, PortSection::Outputs)?,
                TokenKind::Parameters => self.parameters_section(&mut def)?,
                _ => {
                    self.advance();
                }
            }
        }

        self.expect(TokenKind::RBrace, "'}' to close node definition")?;
        Ok(def)
    }

    fn port_section(&mut self, def: &mut NodeDefinition, section: PortSection) -> ParseResult<()> {
        self.advance();
        self.expect(
            TokenKind::LBrace,
            &format!("'{{' after '{}'", section.keyword()),
        )?;

        while !self.check(TokenKind::RBrace) && !self.check(TokenKind::Eof) {
            let name = self.expect(
                TokenKind::Identifier,
                &format!("{} name", section.noun()),
            )?;
            self.expect(
                TokenKind::Colon,
                &format!("':' after {} name", section.noun()),
            )?;
            let type_name = self.expect(
                TokenKind::Identifier,
                &format!("{} type", section.noun()),
            )?;

            match section {
                PortSection::Inputs => def.add_input(name.text, type_name.text),
                PortSection::Outputs => def.add_output(name.text, type_name.text),
            }
            self.eat(TokenKind::Comma);
        }

        self.expect(
            TokenKind::RBrace,
            &format!("'}}' to close {}", section.keyword()),
        )?;
        Ok(())
    }

    fn parameters_section(&mut self, def: &mut NodeDefinition) -> ParseResult<()> {
        self.advance();
        self.expect(TokenKind::LBrace, "'{' after 'parameters'")?;

        while !self.check(TokenKind::RBrace) && !self.check(TokenKind::Eof) {
            let spec = self.parameter_spec()?;
            def.add_parameter(spec);
            self.eat(TokenKind::Comma);
        }

        self.expect(TokenKind::RBrace, "'}' to close parameters")?;
        Ok(())
    }

    fn parameter_spec(&mut self) -> ParseResult<ParameterSpec> {
        let name = self.expect(TokenKind::Identifier, "parameter name")?;
        self.expect(TokenKind::Colon, "':' after parameter name")?;
        let kind = self.expect(TokenKind::Identifier, "parameter type")?;

        let mut constraints = Vec::new();
        if self.eat(TokenKind::LParen) {
            while !self.check(TokenKind::RParen) && !self.check(TokenKind::Eof) {
                constraints.push(self.literal()?);
                self.eat(TokenKind::Comma);
            }
            self.expect(TokenKind::RParen, "')' to close parameter constraints")?;
        }

        Ok(ParameterSpec {
            name: name.text,
            kind_name: kind.text,
            constraints,
        })
    }

    fn workspace_block(&mut self) -> ParseResult<WorkspaceBlock> {
        let location = self.location();
        self.advance();
        self.expect(TokenKind::LBrace, "'{' after 'workspace'")?;

        let mut node_defs = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.check(TokenKind::Eof) {
            if self.check(TokenKind::Node) {
                node_defs.push(self.node_definition()?);
            } else {
                self.advance();
            }
        }

        self.expect(TokenKind::RBrace, "'}' to close workspace")?;
        Ok(WorkspaceBlock {
            node_defs,
            location,
        })
    }

    fn connections_block(&mut self) -> ParseResult<ConnectionsBlock> {
        let location = self.location();
        self.advance();
        self.expect(TokenKind::LBrace, "'{' after 'connections'")?;

        let mut connections = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.check(TokenKind::Eof) {
            let from = self.port_ref()?;
            self.expect(TokenKind::Arrow, "'->' between ports")?;
            let to = self.port_ref()?;
            connections.push(Connection { from, to });

            if !self.eat(TokenKind::Semicolon) {
                self.eat(TokenKind::Comma);
            }
        }

        self.expect(TokenKind::RBrace, "'}' to close connections")?;
        Ok(ConnectionsBlock {
            connections,
            location,
        })
    }

    fn port_ref(&mut self) -> ParseResult<PortRef> {
        let location = self.location();
        let node = self.expect(TokenKind::Identifier, "node name")?;
        self.expect(TokenKind::Dot, "'.' after node name")?;
        let port = self.expect(TokenKind::Identifier, "port name")?;
        Ok(PortRef {
            node_name: node.text,
            port_name: port.text,
            location,
        })
    }

    fn variable_declaration(&mut self) -> ParseResult<VariableDeclaration> {
        let location = self.location();
        let name = self.expect(TokenKind::Identifier, "variable name")?;
        self.expect(TokenKind::Equals, "'=' after variable name")?;
        let initializer = self.function_call()?;
        Ok(VariableDeclaration {
            name: name.text,
            initializer,
            location,
        })
    }

    fn function_call(&mut self) -> ParseResult<FunctionCall> {
        let location = self.location();
        let name = self.expect(TokenKind::Identifier, "function name")?;
        self.expect(TokenKind::LParen, "'(' after function name")?;

        let mut call = FunctionCall {
            name: name.text,
            positional_args: Vec::new(),
            named_args: Vec::new(),
            location,
        };

        if !self.check(TokenKind::RParen) {
            loop {
                if self.check(TokenKind::Identifier) && self.peek_nth(1).is(TokenKind::Equals) {
                    let key = self.advance();
                    self.advance();
                    let value = self.literal()?;
                    call.set_named(key.text, value);
                } else {
                    call.positional_args.push(self.literal()?);
                }

                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }

        self.expect(TokenKind::RParen, "')' after arguments")?;
        self.eat(TokenKind::Semicolon);
        Ok(call)
    }

    fn literal(&mut self) -> ParseResult<Literal> {
        match self.peek().kind {
            TokenKind::Number => Ok(Literal::Number(number_value(&self.advance().text))),
            TokenKind::String => Ok(Literal::String(self.advance().unquoted().to_string())),
            TokenKind::Identifier => Ok(Literal::Ident(self.advance().text)),
            _ => Err(self.error("a literal")),
        }
    }
}

/// Numeric value of a number token: the longest prefix that reads as a
/// decimal (`1.2.3` is `1.2`, `4.` is `4`)
pub fn number_value(text: &str) -> f64 {
    let int_len = text.find(|c: char| !c.is_ascii_digit()).unwrap_or(text.len());
    let mut end = int_len;

    let rest = &text[int_len..];
    if let Some(fraction) = rest.strip_prefix('.') {
        let frac_len = fraction
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(fraction.len());
        if frac_len > 0 {
            end += 1 + frac_len;
        }
    }

    text[..end].parse().unwrap_or(f64::NAN)
}
