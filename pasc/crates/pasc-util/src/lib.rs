//! pasc-util - Foundation types for the pasc compiler.
//!
//! This crate provides the two pieces of infrastructure shared by every
//! compiler pass:
//!
//! - [`Symbol`]: interned identifier handles. Identifiers in the source
//!   language are case-insensitive, so the lexer interns them lowercased and
//!   every later comparison is a cheap integer comparison.
//! - [`Handler`] / [`Diagnostic`]: collection of user-facing diagnostics.
//!   The lexer keeps going after an illegal character; the driver checks the
//!   handler before letting the pipeline continue.

pub mod diagnostic;
pub mod symbol;

pub use diagnostic::{Diagnostic, DiagnosticBuilder, Handler};
pub use symbol::Symbol;
