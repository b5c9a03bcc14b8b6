//! Quoted literal lexing: char and texto.
//!
//! Both literal kinds share the same surface form `'…'` with `''` denoting a
//! single embedded quote. Classification happens after escape resolution: an
//! inner length of exactly one yields a char literal, two or more a texto
//! literal, and zero is a lexical fault.

use pasc_util::Symbol;

use crate::token::{Token, TokenKind};
use crate::Lexer;

impl<'a> Lexer<'a> {
    /// Lexes a quoted literal.
    ///
    /// Returns `None` when the literal is malformed (empty or unterminated);
    /// the error has been reported and the caller resumes lexing.
    pub(crate) fn lex_quoted(&mut self) -> Option<Token> {
        self.cursor.advance();

        let mut content = String::new();

        loop {
            if self.cursor.is_at_end() || self.cursor.current_char() == '\n' {
                let line = self.token_line();
                self.report_error(format!("Erro: literal não terminado na linha {line}"));
                return None;
            }

            let c = self.cursor.current_char();
            if c == '\'' {
                if self.cursor.peek_char(1) == '\'' {
                    content.push('\'');
                    self.cursor.advance();
                    self.cursor.advance();
                } else {
                    self.cursor.advance();
                    break;
                }
            } else {
                content.push(c);
                self.cursor.advance();
            }
        }

        let mut chars = content.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(self.token(TokenKind::CharLit(c))),
            (Some(_), Some(_)) => Some(self.token(TokenKind::Str(Symbol::intern(&content)))),
            (None, _) => {
                let line = self.token_line();
                self.report_error(format!(
                    "Erro: literal de carácter inválido '' na linha {line}"
                ));
                None
            },
        }
    }
}
