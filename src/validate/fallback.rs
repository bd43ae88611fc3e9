//! Heuristic syntax checks used when no parser is compiled in.
//!
//! Brackets are balanced over the whole file, skipping string literals and
//! comments. Python additionally gets an indentation check, since there
//! indentation is syntax.

use crate::languages::Language;

use super::imports::blank_c_style_comments;
use super::{ErrorKind, Severity, ValidationError};

/// Lexical conventions the fallback needs to skip strings and comments.
#[derive(Debug, Clone, Copy)]
pub struct FallbackStyle {
    pub line_comment: &'static str,
    pub quotes: &'static [char],
    /// Quote characters whose literals may span lines.
    pub multiline_quotes: &'static [char],
    pub block_comments: bool,
    pub triple_quotes: bool,
    pub significant_indent: bool,
}

impl FallbackStyle {
    pub fn for_language(language: Language) -> Self {
        match language {
            Language::JavaScript | Language::TypeScript => Self {
                line_comment: "//",
                quotes: &['"', '\'', '`'],
                multiline_quotes: &['`'],
                block_comments: true,
                triple_quotes: false,
                significant_indent: false,
            },
            Language::Go => Self {
                line_comment: "//",
                quotes: &['"', '\'', '`'],
                multiline_quotes: &['`'],
                block_comments: true,
                triple_quotes: false,
                significant_indent: false,
            },
            // '\'' starts lifetimes as often as char literals
            Language::Rust => Self {
                line_comment: "//",
                quotes: &['"'],
                multiline_quotes: &['"'],
                block_comments: true,
                triple_quotes: false,
                significant_indent: false,
            },
            Language::Python => Self {
                line_comment: "#",
                quotes: &['"', '\''],
                multiline_quotes: &[],
                block_comments: false,
                triple_quotes: true,
                significant_indent: true,
            },
        }
    }
}

fn closing_for(open: char) -> char {
    match open {
        '(' => ')',
        '[' => ']',
        _ => '}',
    }
}

/// String literal state carried from one line to the next.
#[derive(Debug, Default)]
pub struct LiteralScanner {
    quote: Option<char>,
    triple: Option<&'static str>,
}

impl LiteralScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the scanner is inside a string literal.
    pub fn in_literal(&self) -> bool {
        self.quote.is_some() || self.triple.is_some()
    }

    /// Walk one line, calling `on_code` for every character outside string
    /// literals and line comments.
    pub fn scan_line(&mut self, line: &str, style: &FallbackStyle, mut on_code: impl FnMut(char)) {
        if self.quote.is_some_and(|q| !style.multiline_quotes.contains(&q)) {
            self.quote = None;
        }

        let mut i = 0;
        while i < line.len() {
            let rest = &line[i..];
            let Some(c) = rest.chars().next() else { break };

            if let Some(delim) = self.triple {
                if rest.starts_with(delim) {
                    self.triple = None;
                    i += delim.len();
                } else {
                    i += c.len_utf8();
                }
                continue;
            }

            if let Some(q) = self.quote {
                if c == '\\' {
                    i += c.len_utf8();
                    i += rest[c.len_utf8()..].chars().next().map_or(0, char::len_utf8);
                    continue;
                }
                if c == q {
                    self.quote = None;
                }
                i += c.len_utf8();
                continue;
            }

            if style.triple_quotes {
                if let Some(delim) = ["\"\"\"", "'''"].into_iter().find(|d| rest.starts_with(*d)) {
                    self.triple = Some(delim);
                    i += delim.len();
                    continue;
                }
            }

            if rest.starts_with(style.line_comment) {
                break;
            }

            if style.quotes.contains(&c) {
                self.quote = Some(c);
            } else {
                on_code(c);
            }
            i += c.len_utf8();
        }
    }
}

/// Run the fallback checks over one file.
pub fn check_fallback(file: &str, content: &str, style: &FallbackStyle) -> Vec<ValidationError> {
    let code = if style.block_comments {
        blank_c_style_comments(content)
    } else {
        content.to_string()
    };

    let mut errors = Vec::new();
    let mut stack: Vec<(char, usize)> = Vec::new();
    let mut scanner = LiteralScanner::new();
    let mut last_line = 0;

    for (idx, line) in code.lines().enumerate() {
        let line_no = idx + 1;
        last_line = line_no;
        let starts_in_literal = scanner.in_literal();
        let starts_in_bracket = !stack.is_empty();
        let mut reported = false;

        scanner.scan_line(line, style, |c| match c {
            '(' | '[' | '{' => stack.push((c, line_no)),
            ')' | ']' | '}' => match stack.last() {
                Some(&(open, _)) if closing_for(open) == c => {
                    stack.pop();
                }
                Some(&(open, opened_at)) => {
                    stack.pop();
                    if !reported {
                        errors.push(unbalanced(
                            file,
                            line_no,
                            format!(
                                "Mismatched `{}`: expected `{}` to close `{}` from line {}",
                                c,
                                closing_for(open),
                                open,
                                opened_at
                            ),
                        ));
                        reported = true;
                    }
                }
                None => {
                    if !reported {
                        errors.push(unbalanced(
                            file,
                            line_no,
                            format!("Unexpected closing `{}`", c),
                        ));
                        reported = true;
                    }
                }
            },
            _ => {}
        });

        if style.significant_indent && !starts_in_literal && !starts_in_bracket {
            if let Some(err) = check_indentation(file, line, line_no) {
                errors.push(err);
            }
        }
    }

    if let Some(&(open, opened_at)) = stack.first() {
        errors.push(unbalanced(
            file,
            last_line.max(1),
            format!(
                "{} unclosed bracket(s); first `{}` opened on line {}",
                stack.len(),
                open,
                opened_at
            ),
        ));
    }

    errors
}

fn unbalanced(file: &str, line: usize, message: String) -> ValidationError {
    ValidationError::new(Severity::High, ErrorKind::SyntaxError, file, message)
        .at_line(line)
        .with_fix("Balance the brackets")
}

fn check_indentation(file: &str, line: &str, line_no: usize) -> Option<ValidationError> {
    if line.trim().is_empty() {
        return None;
    }
    let indent: &str = &line[..line.len() - line.trim_start().len()];
    if indent.is_empty() || indent.contains('\t') || indent.len() % 4 == 0 {
        return None;
    }
    Some(
        ValidationError::new(
            Severity::Medium,
            ErrorKind::SyntaxError,
            file,
            format!("Indentation of {} spaces is not a multiple of 4", indent.len()),
        )
        .at_line(line_no)
        .with_fix("Indent with multiples of 4 spaces"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn js() -> FallbackStyle {
        FallbackStyle::for_language(Language::JavaScript)
    }

    fn py() -> FallbackStyle {
        FallbackStyle::for_language(Language::Python)
    }

    #[test]
    fn test_balanced_multiline_constructs() {
        let source = "function f(a) {\n  const xs = [\n    a,\n  ];\n  return xs;\n}\n";
        assert!(check_fallback("a.js", source, &js()).is_empty());
    }

    #[test]
    fn test_unclosed_reported_at_last_line() {
        let source = "function f() {\n  if (x) {\n    return 1;\n}\n";
        let errors = check_fallback("a.js", source, &js());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].line, Some(4));
        assert_eq!(errors[0].severity, Severity::High);
        assert!(errors[0].message.contains("line 1"));
    }

    #[test]
    fn test_extra_closer_reported_at_its_line() {
        let errors = check_fallback("a.js", "f(1);\nx = 2);\n", &js());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].line, Some(2));
    }

    #[test]
    fn test_strings_and_comments_ignored() {
        let source = "const s = \"(\";\n// )\n/* { */\nconst t = '[';\nconst u = `\n)`;\n";
        assert!(check_fallback("a.js", source, &js()).is_empty());
    }

    #[test]
    fn test_rust_lifetimes_do_not_open_strings() {
        let style = FallbackStyle::for_language(Language::Rust);
        let source = "fn f<'a>(x: &'a str) -> &'a str {\n    x\n}\n";
        assert!(check_fallback("lib.rs", source, &style).is_empty());
    }

    #[test]
    fn test_python_indentation() {
        let source = "def f():\n   return 1\n";
        let errors = check_fallback("a.py", source, &py());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].severity, Severity::Medium);
        assert_eq!(errors[0].kind, ErrorKind::SyntaxError);
        assert_eq!(errors[0].line, Some(2));
    }

    #[test]
    fn test_python_continuation_and_docstrings_skip_indentation() {
        let source = "def f(a,\n      b):\n    \"\"\"Doc.\n\n      detail ( \n    \"\"\"\n    return a  # )\n";
        assert!(check_fallback("a.py", source, &py()).is_empty());
    }

    #[test]
    fn test_js_two_space_indent_not_judged() {
        let source = "if (x) {\n  y();\n}\n";
        assert!(check_fallback("a.js", source, &js()).is_empty());
    }
}
