//! Tree-sitter based parse-only checker.
//!
//! Tree-sitter always produces a tree; syntax problems show up as `ERROR`
//! nodes (unexpected input) and zero-width `MISSING` nodes (expected token
//! absent). Both are turned into diagnostics.

use tree_sitter::{Language, Node, Parser as TsParser};

use super::{SyntaxDiagnostic, SyntaxParser};
use crate::bundle::line_of_offset;

/// Longest snippet of offending text quoted in a message.
const SNIPPET_LEN: usize = 40;

/// Configuration for a tree-sitter grammar.
#[derive(Clone)]
pub struct Config {
    /// The tree-sitter language
    pub language: Language,
    /// Grammar name (e.g., "typescript", "tsx")
    pub grammar_name: &'static str,
}

/// Tree-sitter based parse-only checker.
pub struct TreeSitterParser {
    config: Config,
}

impl TreeSitterParser {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    fn parse(&self, source: &str) -> anyhow::Result<tree_sitter::Tree> {
        let mut parser = TsParser::new();
        parser.set_language(&self.config.language)?;
        parser
            .parse(source, None)
            .ok_or_else(|| anyhow::anyhow!("{} parser aborted", self.config.grammar_name))
    }
}

impl SyntaxParser for TreeSitterParser {
    fn check(&self, source: &str) -> anyhow::Result<Vec<SyntaxDiagnostic>> {
        let tree = self.parse(source)?;
        let mut diagnostics = Vec::new();

        let root = tree.root_node();
        if !root.has_error() {
            return Ok(diagnostics);
        }

        let mut cursor = root.walk();
        loop {
            let node = cursor.node();
            let mut descend = node.has_error();

            if node.is_error() {
                diagnostics.push(diagnostic(source, node, unexpected_message(source, node)));
                descend = false;
            } else if node.is_missing() {
                diagnostics.push(diagnostic(source, node, format!("missing `{}`", node.kind())));
                descend = false;
            }

            if descend && cursor.goto_first_child() {
                continue;
            }

            loop {
                if cursor.goto_next_sibling() {
                    break;
                }
                if !cursor.goto_parent() {
                    return Ok(diagnostics);
                }
            }
        }
    }

    fn grammar(&self) -> &str {
        self.config.grammar_name
    }
}

fn diagnostic(source: &str, node: Node, message: String) -> SyntaxDiagnostic {
    let offset = node.start_byte();
    SyntaxDiagnostic {
        offset,
        line: line_of_offset(source, offset),
        message,
    }
}

fn unexpected_message(source: &str, node: Node) -> String {
    let text = node
        .utf8_text(source.as_bytes())
        .unwrap_or("")
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("");

    if text.is_empty() {
        return "unexpected end of input".to_string();
    }

    let snippet: String = text.chars().take(SNIPPET_LEN).collect();
    if snippet.len() < text.len() {
        format!("unexpected `{}…`", snippet)
    } else {
        format!("unexpected `{}`", snippet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn js_parser() -> TreeSitterParser {
        TreeSitterParser::new(Config {
            language: tree_sitter_javascript::LANGUAGE.into(),
            grammar_name: "javascript",
        })
    }

    #[test]
    fn test_clean_source_has_no_diagnostics() {
        let diags = js_parser()
            .check("function add(a, b) {\n  return a + b;\n}\n")
            .unwrap();
        assert!(diags.is_empty(), "unexpected diagnostics: {:?}", diags);
    }

    #[test]
    fn test_broken_source_reports_line() {
        let source = "const a = 1;\nfunction broken( {\n  return 2;\n}\n";
        let diags = js_parser().check(source).unwrap();
        assert!(!diags.is_empty());
        assert!(diags.iter().all(|d| d.line >= 2), "got {:?}", diags);
    }

    #[test]
    fn test_grammar_name() {
        assert_eq!(js_parser().grammar(), "javascript");
    }
}
