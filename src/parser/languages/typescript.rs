//! TypeScript grammars. `.tsx` needs the TSX variant; the plain grammar
//! reads `<T>expr` as a type assertion.

use crate::parser::treesitter::{Config, TreeSitterParser};
use crate::parser::SyntaxParser;

/// Create a parser for .ts, .mts and .cts files.
pub fn new_parser() -> Box<dyn SyntaxParser> {
    Box::new(TreeSitterParser::new(Config {
        language: tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
        grammar_name: "typescript",
    }))
}

/// Create a parser for .tsx files.
pub fn new_tsx_parser() -> Box<dyn SyntaxParser> {
    Box::new(TreeSitterParser::new(Config {
        language: tree_sitter_typescript::LANGUAGE_TSX.into(),
        grammar_name: "tsx",
    }))
}
