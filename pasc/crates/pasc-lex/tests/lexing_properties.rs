//! Property tests for the lexer.
//!
//! Lexing must be a pure function of the source text, and tokenization of a
//! program must be invariant under case folding (string literals excluded,
//! since their payloads are case-sensitive).

use pasc_lex::tokenize;
use pasc_util::Handler;
use proptest::prelude::*;

proptest! {
    #[test]
    fn lexing_is_a_pure_function(source in "[a-zA-Z0-9_+*/:;,.()\\[\\]<>= \t\n'-]{0,80}") {
        let mut first_handler = Handler::new();
        let first = tokenize(&source, &mut first_handler);

        let mut second_handler = Handler::new();
        let second = tokenize(&source, &mut second_handler);

        prop_assert_eq!(first, second);
        prop_assert_eq!(first_handler.error_count(), second_handler.error_count());
    }

    #[test]
    fn token_stream_invariant_under_case_folding(source in "[a-zA-Z0-9_ ;.:=()\n]{0,80}") {
        let mut lower_handler = Handler::new();
        let lower = tokenize(&source.to_lowercase(), &mut lower_handler);

        let mut mixed_handler = Handler::new();
        let mixed = tokenize(&source, &mut mixed_handler);

        prop_assert_eq!(lower, mixed);
    }
}
