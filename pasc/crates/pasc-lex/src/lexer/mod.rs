//! Core lexer: token dispatch and error reporting.

mod comment;
mod identifier;
mod number;
mod operator;
mod string;

use pasc_util::{DiagnosticBuilder, Handler};

use crate::cursor::Cursor;
use crate::token::{is_ident_start, Token, TokenKind};

/// Lexer for the Pascal-family source language.
pub struct Lexer<'a> {
    /// Character cursor over the source.
    pub(crate) cursor: Cursor<'a>,

    /// Error sink; lexical faults do not stop tokenization.
    handler: &'a mut Handler,

    /// Byte offset where the current token started.
    pub(crate) token_start: usize,

    /// Line where the current token started (1-based).
    token_line: u32,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer over `source`, reporting errors to `handler`.
    pub fn new(source: &'a str, handler: &'a mut Handler) -> Self {
        Self {
            cursor: Cursor::new(source),
            handler,
            token_start: 0,
            token_line: 1,
        }
    }

    /// Returns the next token, or `TokenKind::Eof` at end of input.
    ///
    /// Skips whitespace and both comment forms first, then dispatches on the
    /// leading character. An illegal character is reported, skipped, and
    /// lexing resumes with the following character.
    pub fn next_token(&mut self) -> Token {
        loop {
            self.skip_whitespace_and_comments();

            self.token_start = self.cursor.position();
            self.token_line = self.cursor.line();

            if self.cursor.is_at_end() {
                return self.token(TokenKind::Eof);
            }

            match self.cursor.current_char() {
                // '(*' was consumed by the comment skipper, so a '(' here
                // always opens a parenthesis.
                '(' => {
                    self.cursor.advance();
                    return self.token(TokenKind::LParen);
                },
                ')' => {
                    self.cursor.advance();
                    return self.token(TokenKind::RParen);
                },
                '[' => {
                    self.cursor.advance();
                    return self.token(TokenKind::LBracket);
                },
                ']' => {
                    self.cursor.advance();
                    return self.token(TokenKind::RBracket);
                },
                ';' => {
                    self.cursor.advance();
                    return self.token(TokenKind::Semicolon);
                },
                ',' => {
                    self.cursor.advance();
                    return self.token(TokenKind::Comma);
                },
                '+' => {
                    self.cursor.advance();
                    return self.token(TokenKind::Plus);
                },
                '-' => {
                    self.cursor.advance();
                    return self.token(TokenKind::Minus);
                },
                '*' => {
                    self.cursor.advance();
                    return self.token(TokenKind::Star);
                },
                '/' => {
                    self.cursor.advance();
                    return self.token(TokenKind::Slash);
                },
                '=' => {
                    self.cursor.advance();
                    return self.token(TokenKind::Eq);
                },
                ':' => return self.lex_colon(),
                '<' => return self.lex_less(),
                '>' => return self.lex_greater(),
                '.' => return self.lex_dot(),
                '\'' => {
                    if let Some(token) = self.lex_quoted() {
                        return token;
                    }
                    // Malformed literal already reported; keep lexing.
                },
                c if is_ident_start(c) => return self.lex_identifier(),
                c if c.is_ascii_digit() => return self.lex_number(),
                c => {
                    self.report_error(format!(
                        "Carácter ilegal '{}' na linha {}",
                        c,
                        self.cursor.line()
                    ));
                    self.cursor.advance();
                },
            }
        }
    }

    /// Wraps a kind into a token at the current token's start line.
    pub(crate) fn token(&self, kind: TokenKind) -> Token {
        Token {
            kind,
            line: self.token_line,
        }
    }

    /// Line on which the current token started (1-based).
    pub(crate) fn token_line(&self) -> u32 {
        self.token_line
    }

    /// Reports a lexical error at the current token's line.
    pub(crate) fn report_error(&mut self, message: String) {
        let line = self.token_line;
        self.report_error_at(line, message);
    }

    /// Reports a lexical error at an explicit line.
    ///
    /// Used by the comment skipper, which runs before the current token's
    /// line is recorded.
    pub(crate) fn report_error_at(&mut self, line: u32, message: String) {
        DiagnosticBuilder::error(message)
            .line(line)
            .emit(self.handler);
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.next_token();
        if token.kind == TokenKind::Eof {
            None
        } else {
            Some(token)
        }
    }
}
