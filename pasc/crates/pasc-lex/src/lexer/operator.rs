//! Multi-character operator lexing.
//!
//! Longest match is mandatory here: `:=`, `<=`, `>=`, `<>`, and `..` must
//! win over their single-character prefixes.

use crate::token::{Token, TokenKind};
use crate::Lexer;

impl<'a> Lexer<'a> {
    /// Lexes `:=` or `:`.
    pub(crate) fn lex_colon(&mut self) -> Token {
        self.cursor.advance();
        if self.cursor.match_char('=') {
            self.token(TokenKind::Assign)
        } else {
            self.token(TokenKind::Colon)
        }
    }

    /// Lexes `<=`, `<>`, or `<`.
    pub(crate) fn lex_less(&mut self) -> Token {
        self.cursor.advance();
        if self.cursor.match_char('=') {
            self.token(TokenKind::Le)
        } else if self.cursor.match_char('>') {
            self.token(TokenKind::Ne)
        } else {
            self.token(TokenKind::Lt)
        }
    }

    /// Lexes `>=` or `>`.
    pub(crate) fn lex_greater(&mut self) -> Token {
        self.cursor.advance();
        if self.cursor.match_char('=') {
            self.token(TokenKind::Ge)
        } else {
            self.token(TokenKind::Gt)
        }
    }

    /// Lexes `..` or `.`.
    pub(crate) fn lex_dot(&mut self) -> Token {
        self.cursor.advance();
        if self.cursor.match_char('.') {
            self.token(TokenKind::DotDot)
        } else {
            self.token(TokenKind::Dot)
        }
    }
}
