//! Integer and real literal lexing.

use crate::token::{Token, TokenKind};
use crate::Lexer;

impl<'a> Lexer<'a> {
    /// Lexes a number literal.
    ///
    /// Integers are maximal digit runs. Reals require digits on both sides
    /// of the point (`3.14`, `2.5e-3`); a digit run followed by `..` stays
    /// an integer so that subranges like `1..10` lex as three tokens.
    pub(crate) fn lex_number(&mut self) -> Token {
        while self.cursor.current_char().is_ascii_digit() {
            self.cursor.advance();
        }

        let is_real =
            self.cursor.current_char() == '.' && self.cursor.peek_char(1).is_ascii_digit();

        if !is_real {
            let text = self.cursor.slice_from(self.token_start);
            return match text.parse::<i64>() {
                Ok(value) => self.token(TokenKind::Int(value)),
                Err(_) => {
                    let line = self.token_line();
                    self.report_error(format!(
                        "Constante inteira demasiado grande '{text}' na linha {line}"
                    ));
                    self.token(TokenKind::Int(0))
                },
            };
        }

        self.cursor.advance();
        while self.cursor.current_char().is_ascii_digit() {
            self.cursor.advance();
        }

        // The exponent is only part of the literal when a complete
        // `[eE][+-]?digit` suffix is present; otherwise `1.5e` is the real
        // `1.5` followed by the identifier `e`.
        let c = self.cursor.current_char();
        if c == 'e' || c == 'E' {
            let mut offset = 1;
            if matches!(self.cursor.peek_char(1), '+' | '-') {
                offset = 2;
            }
            if self.cursor.peek_char(offset).is_ascii_digit() {
                for _ in 0..offset {
                    self.cursor.advance();
                }
                while self.cursor.current_char().is_ascii_digit() {
                    self.cursor.advance();
                }
            }
        }

        let text = self.cursor.slice_from(self.token_start);
        match text.parse::<f64>() {
            Ok(value) => self.token(TokenKind::Real(value)),
            Err(_) => {
                let line = self.token_line();
                self.report_error(format!("Constante real inválida '{text}' na linha {line}"));
                self.token(TokenKind::Real(0.0))
            },
        }
    }
}
