//! JavaScript grammar (.js, .jsx, .mjs, .cjs).

use crate::parser::treesitter::{Config, TreeSitterParser};
use crate::parser::SyntaxParser;

/// Create a new JavaScript parser. The grammar accepts JSX.
pub fn new_parser() -> Box<dyn SyntaxParser> {
    Box::new(TreeSitterParser::new(Config {
        language: tree_sitter_javascript::LANGUAGE.into(),
        grammar_name: "javascript",
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jsx_is_valid() {
        let source = "export default function App() {\n  return <div className=\"app\">hi</div>;\n}\n";
        assert!(new_parser().check(source).unwrap().is_empty());
    }

    #[test]
    fn test_unclosed_brace() {
        let diags = new_parser().check("function f() {\n  return 1;\n").unwrap();
        assert!(!diags.is_empty());
    }
}
