//! Identifier and keyword lexing.

use pasc_util::Symbol;

use crate::token::{is_ident_continue, keyword_from_ident, Token};
use crate::Lexer;

impl<'a> Lexer<'a> {
    /// Lexes an identifier or keyword.
    ///
    /// The whole maximal run `[A-Za-z_][A-Za-z0-9_]*` is consumed first and
    /// only then matched against the keyword table, so a keyword followed by
    /// more identifier characters is an ordinary identifier. Identifiers are
    /// interned lowercased, the canonical form of this case-insensitive
    /// language.
    pub(crate) fn lex_identifier(&mut self) -> Token {
        while is_ident_continue(self.cursor.current_char()) {
            self.cursor.advance();
        }

        let text = self.cursor.slice_from(self.token_start);

        let kind = keyword_from_ident(text)
            .unwrap_or_else(|| crate::TokenKind::Ident(Symbol::intern_lower(text)));
        self.token(kind)
    }
}
