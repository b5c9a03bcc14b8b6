//! pasc-drv - Compiler driver.
//!
//! Orchestrates the four-pass pipeline over one source text:
//!
//! ```text
//! source text
//!      │
//!      ▼
//!  [pasc-lex]  ──▶ token stream      (recovers; diagnostics collected)
//!      │
//!      ▼
//!  [pasc-par]  ──▶ AST               (fatal on first syntax error)
//!      │
//!      ▼
//!  [pasc-sem]  ──▶ checked AST       (fatal on first semantic error)
//!      │
//!      ▼
//!  [pasc-gen]  ──▶ SVM instructions  (fatal on first emission error)
//! ```
//!
//! Each pass consumes the full artifact of the prior pass. Any error aborts
//! compilation and surfaces one Portuguese diagnostic; the process exit code
//! is 1 for every failure class.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use pasc_util::{Diagnostic, Handler};
use thiserror::Error;

/// Joins lexical diagnostics into one display block.
fn render_diagnostics(diagnostics: &[Diagnostic]) -> String {
    let mut out = String::new();
    for (i, diagnostic) in diagnostics.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let _ = write!(out, "{diagnostic}");
    }
    out
}

/// Any failure of the compilation pipeline.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("{}", render_diagnostics(.0))]
    Lexical(Vec<Diagnostic>),

    #[error(transparent)]
    Parse(#[from] pasc_par::ParseError),

    #[error(transparent)]
    Sem(#[from] pasc_sem::SemError),

    #[error(transparent)]
    Gen(#[from] pasc_gen::GenError),
}

/// Compiles one source text down to SVM instructions.
pub fn compile_source(source: &str) -> Result<Vec<String>, CompileError> {
    let mut handler = Handler::new();

    let tokens = pasc_lex::tokenize(source, &mut handler);
    if handler.has_errors() {
        return Err(CompileError::Lexical(handler.take_diagnostics()));
    }
    tracing::debug!(tokens = tokens.len(), "lexing done");

    let program = pasc_par::Parser::new(tokens).parse_program()?;
    tracing::debug!(name = %program.name, "parsing done");

    pasc_sem::SemanticAnalyzer::new().analyze(&program)?;
    tracing::debug!("semantic analysis done");

    let code = pasc_gen::CodeGenerator::new().generate(&program)?;
    tracing::debug!(instructions = code.len(), "code generation done");

    Ok(code)
}

/// Writes the instruction list, one line each, to `path`.
///
/// The file handle is scoped to this function and closes on every path.
pub fn write_output(path: &Path, code: &[String]) -> std::io::Result<()> {
    let mut text = String::with_capacity(code.iter().map(|l| l.len() + 1).sum());
    for line in code {
        text.push_str(line);
        text.push('\n');
    }
    fs::write(path, text)
}

/// The default output path: the input with a `vm` extension.
pub fn default_output_path(input: &Path) -> PathBuf {
    input.with_extension("vm")
}
