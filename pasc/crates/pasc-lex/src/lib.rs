//! pasc-lex - Lexical analyzer.
//!
//! Transforms Pascal-family source text into a stream of [`Token`]s. The
//! source language is case-insensitive: keywords are recognized in any
//! casing and identifiers are interned lowercased. Two comment forms are
//! skipped (`{ … }` and `(* … *)`), and 1-based line numbers are tracked
//! across both code and comments.
//!
//! Lexical errors (illegal characters, malformed literals) are reported to
//! the shared [`Handler`](pasc_util::Handler) and lexing continues; the
//! driver checks the handler before running the rest of the pipeline.

pub mod cursor;
pub mod lexer;
pub mod token;

pub use lexer::Lexer;
pub use token::{SimpleType, Token, TokenKind};

use pasc_util::Handler;

/// Tokenizes an entire source text.
///
/// The returned stream excludes the final `Eof` token. Lexical errors are
/// reported through `handler`; the stream still contains every token that
/// could be recognized.
pub fn tokenize(source: &str, handler: &mut Handler) -> Vec<Token> {
    Lexer::new(source, handler).collect()
}
