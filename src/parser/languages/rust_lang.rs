//! Rust grammar.

use crate::parser::treesitter::{Config, TreeSitterParser};
use crate::parser::SyntaxParser;

pub fn new_parser() -> Box<dyn SyntaxParser> {
    Box::new(TreeSitterParser::new(Config {
        language: tree_sitter_rust::LANGUAGE.into(),
        grammar_name: "rust",
    }))
}
