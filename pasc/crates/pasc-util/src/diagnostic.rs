//! Diagnostic collection.
//!
//! Diagnostics are the user-facing error messages of the compiler. The parser
//! and the later passes fail fast through their own error types; the lexer is
//! the one pass that recovers (skip one character, keep tokenizing), so it
//! reports through a [`Handler`] and the driver refuses to emit output when
//! the handler holds errors.

use std::fmt;

/// A single user-facing message, optionally anchored to a source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// The message text, already formatted for the user.
    pub message: String,

    /// 1-based source line, when one is known.
    pub line: Option<u32>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Builder for a [`Diagnostic`].
///
/// ```
/// use pasc_util::{DiagnosticBuilder, Handler};
///
/// let mut handler = Handler::new();
/// DiagnosticBuilder::error("Carácter ilegal '@' na linha 3")
///     .line(3)
///     .emit(&mut handler);
/// assert!(handler.has_errors());
/// ```
pub struct DiagnosticBuilder {
    diagnostic: Diagnostic,
}

impl DiagnosticBuilder {
    /// Starts an error diagnostic with the given message.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            diagnostic: Diagnostic {
                message: message.into(),
                line: None,
            },
        }
    }

    /// Attaches a 1-based source line.
    pub fn line(mut self, line: u32) -> Self {
        self.diagnostic.line = Some(line);
        self
    }

    /// Hands the diagnostic to the handler.
    pub fn emit(self, handler: &mut Handler) {
        handler.report(self.diagnostic);
    }
}

/// Collects diagnostics for one compilation.
#[derive(Debug, Default)]
pub struct Handler {
    diagnostics: Vec<Diagnostic>,
}

impl Handler {
    /// Creates an empty handler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a diagnostic.
    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Returns true if any diagnostic has been reported.
    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    /// Number of reported diagnostics.
    pub fn error_count(&self) -> usize {
        self.diagnostics.len()
    }

    /// The reported diagnostics, in report order.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Drains the reported diagnostics, leaving the handler empty.
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_handler() {
        let handler = Handler::new();
        assert!(!handler.has_errors());
        assert_eq!(handler.error_count(), 0);
    }

    #[test]
    fn test_report_and_take() {
        let mut handler = Handler::new();
        DiagnosticBuilder::error("Carácter ilegal '#' na linha 1")
            .line(1)
            .emit(&mut handler);
        DiagnosticBuilder::error("Carácter ilegal '?' na linha 2")
            .line(2)
            .emit(&mut handler);

        assert!(handler.has_errors());
        assert_eq!(handler.error_count(), 2);

        let taken = handler.take_diagnostics();
        assert_eq!(taken.len(), 2);
        assert_eq!(taken[0].line, Some(1));
        assert_eq!(taken[1].message, "Carácter ilegal '?' na linha 2");
        assert!(!handler.has_errors());
    }

    #[test]
    fn test_display_is_message() {
        let diagnostic = Diagnostic {
            message: "Erro qualquer".to_string(),
            line: Some(7),
        };
        assert_eq!(diagnostic.to_string(), "Erro qualquer");
    }
}
