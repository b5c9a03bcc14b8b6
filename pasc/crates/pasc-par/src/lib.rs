//! pasc-par - Syntactic analyzer.
//!
//! A recursive-descent parser over the token stream produced by `pasc-lex`.
//! Statements and declarations are parsed by one function per production;
//! expressions use a Pratt core (see [`expr`]) so that the precedence ladder
//! lives in one table of binding powers.
//!
//! The parser is fatal-on-first-error: every production returns
//! `Result<_, ParseError>` and the first unexpected token aborts the parse.

pub mod ast;
pub mod expr;
pub mod items;
pub mod pretty;
pub mod stmt;
pub mod types;

pub use ast::*;

use pasc_lex::{Token, TokenKind};
use pasc_util::Symbol;
use thiserror::Error;

/// Syntax errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("Erro sintático: token inesperado '{lexeme}' na linha {line}")]
    UnexpectedToken { lexeme: String, line: u32 },

    #[error("Erro sintático: fim de ficheiro inesperado")]
    UnexpectedEof,
}

/// Result type alias for parsing operations.
pub type Result<T> = std::result::Result<T, ParseError>;

/// Parser over a token stream.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    /// Creates a parser over `tokens` (the stream must not contain `Eof`).
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    /// Parses a complete program: `program ID ; block .`
    ///
    /// Trailing tokens after the final `.` are a syntax error.
    pub fn parse_program(mut self) -> Result<Program> {
        self.expect(&TokenKind::Program)?;
        let name = self.expect_ident()?;
        self.expect(&TokenKind::Semicolon)?;
        let block = self.parse_block()?;
        self.expect(&TokenKind::Dot)?;

        if self.peek().is_some() {
            return Err(self.unexpected());
        }

        Ok(Program { name, block })
    }

    /// Parses `declarations begin statement_list end`.
    pub(crate) fn parse_block(&mut self) -> Result<Block> {
        let decls = self.parse_declarations()?;
        self.expect(&TokenKind::Begin)?;
        let body = self.parse_statement_list()?;
        self.expect(&TokenKind::End)?;
        Ok(Block { decls, body })
    }

    // =========================================================================
    // Token stream helpers
    // =========================================================================

    /// The current token, if any.
    pub(crate) fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    /// The kind of the current token, if any.
    pub(crate) fn peek_kind(&self) -> Option<&TokenKind> {
        self.peek().map(|t| &t.kind)
    }

    /// The kind of the token `n` positions ahead.
    pub(crate) fn peek_kind_at(&self, n: usize) -> Option<&TokenKind> {
        self.tokens.get(self.pos + n).map(|t| &t.kind)
    }

    /// Consumes and returns the current token.
    pub(crate) fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// True when the current token has the given kind.
    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        self.peek_kind() == Some(kind)
    }

    /// Consumes the current token when it has the given kind.
    pub(crate) fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Consumes a token of the given kind or fails.
    pub(crate) fn expect(&mut self, kind: &TokenKind) -> Result<Token> {
        if self.check(kind) {
            Ok(self.advance().expect("checked token present"))
        } else {
            Err(self.unexpected())
        }
    }

    /// Consumes an identifier token and returns its (canonical) symbol.
    pub(crate) fn expect_ident(&mut self) -> Result<Symbol> {
        match self.peek_kind() {
            Some(TokenKind::Ident(name)) => {
                let name = *name;
                self.pos += 1;
                Ok(name)
            },
            _ => Err(self.unexpected()),
        }
    }

    /// Consumes an integer literal token and returns its value.
    pub(crate) fn expect_int(&mut self) -> Result<i64> {
        match self.peek_kind() {
            Some(TokenKind::Int(value)) => {
                let value = *value;
                self.pos += 1;
                Ok(value)
            },
            _ => Err(self.unexpected()),
        }
    }

    /// Builds the error for the current position: unexpected token, or
    /// unexpected end of file when the stream is exhausted.
    pub(crate) fn unexpected(&self) -> ParseError {
        match self.peek() {
            Some(token) => ParseError::UnexpectedToken {
                lexeme: token.kind.to_string(),
                line: token.line,
            },
            None => ParseError::UnexpectedEof,
        }
    }
}

/// Convenience: tokenize-and-parse in one step, for tests and tools.
///
/// Lexical errors take precedence over syntax errors; the first lexical
/// diagnostic is converted into an `UnexpectedToken`-style abort by the
/// caller (the driver keeps the full diagnostic list instead).
pub fn parse_source(source: &str, handler: &mut pasc_util::Handler) -> Result<Program> {
    let tokens = pasc_lex::tokenize(source, handler);
    Parser::new(tokens).parse_program()
}
