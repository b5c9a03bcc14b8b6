//! Whitespace and comment skipping.
//!
//! Two comment forms exist: `{ … }` and `(* … *)`. The parenthesized form
//! admits `*` internally and only `*)` terminates it. Newlines inside
//! comments still advance the line counter (the cursor does that).

use crate::Lexer;

impl<'a> Lexer<'a> {
    /// Skips whitespace and comments before the next token.
    pub(crate) fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.cursor.current_char() {
                ' ' | '\t' | '\r' | '\n' => self.cursor.advance(),
                '{' => self.skip_brace_comment(),
                '(' if self.cursor.peek_char(1) == '*' => self.skip_paren_comment(),
                _ => return,
            }
        }
    }

    /// Skips a `{ … }` comment.
    fn skip_brace_comment(&mut self) {
        let line = self.cursor.line();
        self.cursor.advance();

        while !self.cursor.is_at_end() && self.cursor.current_char() != '}' {
            self.cursor.advance();
        }

        if self.cursor.is_at_end() {
            self.report_error_at(line, format!("Erro: comentário não terminado na linha {line}"));
        } else {
            self.cursor.advance();
        }
    }

    /// Skips a `(* … *)` comment.
    fn skip_paren_comment(&mut self) {
        let line = self.cursor.line();
        self.cursor.advance();
        self.cursor.advance();

        loop {
            if self.cursor.is_at_end() {
                self.report_error_at(
                    line,
                    format!("Erro: comentário não terminado na linha {line}"),
                );
                return;
            }
            if self.cursor.current_char() == '*' && self.cursor.peek_char(1) == ')' {
                self.cursor.advance();
                self.cursor.advance();
                return;
            }
            self.cursor.advance();
        }
    }
}

#[cfg(test)]
mod tests {
    use pasc_util::{Handler, Symbol};

    use crate::token::TokenKind;

    fn lex_all(source: &str) -> (Vec<TokenKind>, usize) {
        let mut handler = Handler::new();
        let kinds = crate::tokenize(source, &mut handler)
            .into_iter()
            .map(|t| t.kind)
            .collect();
        (kinds, handler.error_count())
    }

    #[test]
    fn test_brace_comment() {
        let (kinds, errors) = lex_all("{ comentário } x");
        assert_eq!(kinds, vec![TokenKind::Ident(Symbol::intern("x"))]);
        assert_eq!(errors, 0);
    }

    #[test]
    fn test_paren_comment() {
        let (kinds, errors) = lex_all("(* comentário *) x");
        assert_eq!(kinds, vec![TokenKind::Ident(Symbol::intern("x"))]);
        assert_eq!(errors, 0);
    }

    #[test]
    fn test_paren_comment_with_inner_stars() {
        let (kinds, errors) = lex_all("(* a * b ** c *) y");
        assert_eq!(kinds, vec![TokenKind::Ident(Symbol::intern("y"))]);
        assert_eq!(errors, 0);
    }

    #[test]
    fn test_lparen_without_star_is_a_token() {
        let (kinds, _) = lex_all("(x)");
        assert_eq!(kinds, vec![
            TokenKind::LParen,
            TokenKind::Ident(Symbol::intern("x")),
            TokenKind::RParen,
        ]);
    }

    #[test]
    fn test_unterminated_brace_comment() {
        let (kinds, errors) = lex_all("{ aberto");
        assert!(kinds.is_empty());
        assert_eq!(errors, 1);
    }

    #[test]
    fn test_unterminated_paren_comment() {
        let (kinds, errors) = lex_all("(* aberto *");
        assert!(kinds.is_empty());
        assert_eq!(errors, 1);
    }

    #[test]
    fn test_newlines_in_comment_count() {
        let mut handler = Handler::new();
        let tokens = crate::tokenize("(*\n\n*)\nz", &mut handler);
        assert_eq!(tokens[0].line, 4);
    }
}
