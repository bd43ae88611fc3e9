//! Parse-only syntax checking.
//!
//! This module provides:
//! - `SyntaxParser` trait: abstract interface for a parse-only pass
//! - `SyntaxDiagnostic`: one syntax problem located by byte offset
//! - Tree-sitter implementation and grammar factories (behind the
//!   `tree-sitter` feature)

#[cfg(feature = "tree-sitter")]
pub mod languages;
#[cfg(feature = "tree-sitter")]
pub mod treesitter;

/// A syntax problem reported by a parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxDiagnostic {
    /// Byte offset of the problem in the source.
    pub offset: usize,
    /// 1-based line, derived from `offset`.
    pub line: usize,
    pub message: String,
}

/// Parser that checks a source file without executing it.
pub trait SyntaxParser: Send + Sync {
    /// Parse `source` and return every syntax diagnostic.
    ///
    /// An `Err` means the parser itself failed (grammar could not be
    /// loaded, parse aborted), not that the source is malformed.
    fn check(&self, source: &str) -> anyhow::Result<Vec<SyntaxDiagnostic>>;

    /// Return the grammar name this parser uses (e.g., "tsx", "python").
    fn grammar(&self) -> &str;
}

/// Whether parse-only checking is compiled in.
pub fn parsers_available() -> bool {
    cfg!(feature = "tree-sitter")
}
