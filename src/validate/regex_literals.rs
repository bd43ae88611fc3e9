//! Regex literal validation.
//!
//! Finds regex patterns written in source (JS `/.../flags` literals and
//! `RegExp("...")`, Python `re.compile("...")` and friends, Go
//! `regexp.MustCompile("...")`, Rust `Regex::new("...")`) and compiles each
//! one with the `regex` crate. Patterns that use constructs this engine does
//! not implement (look-around, back-references) are skipped rather than
//! judged.

use regex::Regex;

use crate::bundle::line_of_offset;

use super::imports::blank_c_style_comments;
use super::{ErrorKind, Severity, ValidationError};

/// A regex pattern found in source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegexCandidate {
    /// Pattern text after string-escape processing.
    pub pattern: String,
    /// 1-based line of the literal.
    pub line: usize,
}

const FIX_HINT: &str = "Fix the character-class range or escape special characters";

/// Constructs other engines accept that `regex` rejects by design.
const UNSUPPORTED: &[&str] = &[
    "(?=", "(?!", "(?<=", "(?<!", "(?P=", "(?>", "(?(", "\\k<", "[^]", "\\c", "\\0",
];

/// Candidates in JavaScript or TypeScript source.
pub fn javascript_candidates(content: &str) -> Vec<RegexCandidate> {
    lazy_static::lazy_static! {
        // A `/` in expression position: after an operator, opening bracket, or `return`.
        static ref LITERAL_RE: Regex = Regex::new(
            r"(?m)(?:^|[=(,:\[!&|?{};]|\breturn)\s*/((?:\\.|\[(?:\\.|[^\]\\\n])*\]|[^/\\\n\[*])(?:\\.|\[(?:\\.|[^\]\\\n])*\]|[^/\\\n\[])*)/[dgimsuyv]*"
        ).unwrap();
        static ref CONSTRUCTOR_RE: Regex = Regex::new(
            r#"\bRegExp\(\s*("(?:[^"\\\n]|\\.)*"|'(?:[^'\\\n]|\\.)*')"#
        ).unwrap();
    }

    let code = blank_c_style_comments(content);
    let mut out = Vec::new();

    for caps in LITERAL_RE.captures_iter(&code) {
        let Some(m) = caps.get(1) else { continue };
        out.push(RegexCandidate {
            pattern: m.as_str().to_string(),
            line: line_of_offset(&code, m.start()),
        });
    }

    for caps in CONSTRUCTOR_RE.captures_iter(&code) {
        let Some(m) = caps.get(1) else { continue };
        out.push(RegexCandidate {
            pattern: unescape(strip_quotes(m.as_str())),
            line: line_of_offset(&code, m.start()),
        });
    }

    out.sort_by_key(|c| c.line);
    out
}

/// Candidates in Python source.
pub fn python_candidates(content: &str) -> Vec<RegexCandidate> {
    lazy_static::lazy_static! {
        static ref RE_CALL: Regex = Regex::new(
            r#"\bre\.(?:compile|match|search|fullmatch|findall|finditer|sub|subn|split)\(\s*([rRbBuU]{0,2})("(?:[^"\\\n]|\\.)*"|'(?:[^'\\\n]|\\.)*')"#
        ).unwrap();
    }

    RE_CALL
        .captures_iter(content)
        .filter_map(|caps| {
            let prefix = caps.get(1)?.as_str();
            let m = caps.get(2)?;
            let body = strip_quotes(m.as_str());
            let pattern = if prefix.contains(['r', 'R']) {
                body.to_string()
            } else {
                unescape(body)
            };
            Some(RegexCandidate {
                // `\Z` is Python's spelling of end-of-text.
                pattern: pattern.replace("\\Z", "\\z"),
                line: line_of_offset(content, m.start()),
            })
        })
        .collect()
}

/// Candidates in Go source.
pub fn go_candidates(content: &str) -> Vec<RegexCandidate> {
    lazy_static::lazy_static! {
        static ref COMPILE_RE: Regex = Regex::new(
            r#"\bregexp\.(?:MustCompile|Compile|MustCompilePOSIX|CompilePOSIX|MatchString|Match)\(\s*("(?:[^"\\\n]|\\.)*"|`[^`]*`)"#
        ).unwrap();
    }

    COMPILE_RE
        .captures_iter(content)
        .filter_map(|caps| {
            let m = caps.get(1)?;
            let raw = m.as_str();
            let pattern = if raw.starts_with('`') {
                raw.trim_matches('`').to_string()
            } else {
                unescape(strip_quotes(raw))
            };
            Some(RegexCandidate {
                pattern,
                line: line_of_offset(content, m.start()),
            })
        })
        .collect()
}

/// Candidates in Rust source.
pub fn rust_candidates(content: &str) -> Vec<RegexCandidate> {
    lazy_static::lazy_static! {
        static ref NEW_RE: Regex = Regex::new(
            r##"\b(?:Regex|RegexBuilder)::new\(\s*(?:r#"(?s:(.*?))"#|r"([^"]*)"|"((?:[^"\\]|\\.)*)")"##
        ).unwrap();
    }

    NEW_RE
        .captures_iter(content)
        .filter_map(|caps| {
            let (m, raw) = match (caps.get(1), caps.get(2), caps.get(3)) {
                (Some(m), _, _) | (None, Some(m), _) => (m, true),
                (None, None, Some(m)) => (m, false),
                _ => return None,
            };
            let pattern = if raw {
                m.as_str().to_string()
            } else {
                unescape(m.as_str())
            };
            Some(RegexCandidate {
                pattern,
                line: line_of_offset(content, m.start()),
            })
        })
        .collect()
}

/// Compile every candidate and report the ones with syntax errors.
pub fn check_candidates(file: &str, candidates: &[RegexCandidate]) -> Vec<ValidationError> {
    candidates
        .iter()
        .filter(|c| is_judgeable(&c.pattern))
        .filter_map(|c| {
            let translated = escape_literal_braces(&c.pattern);
            match Regex::new(&translated) {
                Err(regex::Error::Syntax(detail)) => Some(
                    ValidationError::new(
                        Severity::Critical,
                        ErrorKind::RegexSyntaxError,
                        file,
                        format!(
                            "Invalid regular expression /{}/: {}",
                            c.pattern,
                            first_error_line(&detail)
                        ),
                    )
                    .at_line(c.line)
                    .with_fix(FIX_HINT),
                ),
                // Size limits are not syntax problems.
                _ => None,
            }
        })
        .collect()
}

fn is_judgeable(pattern: &str) -> bool {
    if UNSUPPORTED.iter().any(|u| pattern.contains(u)) {
        return false;
    }
    // Back-references \1 through \9
    let bytes = pattern.as_bytes();
    !bytes
        .windows(2)
        .any(|w| w[0] == b'\\' && (b'1'..=b'9').contains(&w[1]))
}

/// Backtracking engines read a `{` that does not start a counted repetition
/// as a literal; `regex` does not.
fn escape_literal_braces(pattern: &str) -> String {
    lazy_static::lazy_static! {
        static ref QUANTIFIER_RE: Regex = Regex::new(r"^\{\d+(?:,\d*)?\}").unwrap();
    }

    let mut out = String::with_capacity(pattern.len());
    let mut i = 0;
    while i < pattern.len() {
        let rest = &pattern[i..];
        let Some(c) = rest.chars().next() else { break };
        match c {
            '\\' => {
                let escaped = braced_escape(rest)
                    .unwrap_or_else(|| rest.chars().take(2).collect::<String>().len());
                out.push_str(&rest[..escaped]);
                i += escaped;
                continue;
            }
            '{' => {
                if let Some(m) = QUANTIFIER_RE.find(rest) {
                    out.push_str(m.as_str());
                    i += m.end();
                    continue;
                }
                out.push_str("\\{");
            }
            '}' => out.push_str("\\}"),
            _ => out.push(c),
        }
        i += c.len_utf8();
    }
    out
}

/// Byte length of a `\p{..}`, `\x{..}`, `\u{..}` style escape at the start
/// of `rest`, braces included.
fn braced_escape(rest: &str) -> Option<usize> {
    let mut chars = rest.chars();
    chars.next();
    let letter = chars.next()?;
    if !matches!(letter, 'p' | 'P' | 'x' | 'u' | 'U') || !rest[2..].starts_with('{') {
        return None;
    }
    rest.find('}').map(|end| end + 1)
}

fn strip_quotes(literal: &str) -> &str {
    let inner = literal.get(1..literal.len().saturating_sub(1));
    inner.unwrap_or("")
}

/// Resolve string-literal escapes. Unknown escapes keep their backslash.
fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some('\'') => out.push('\''),
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

fn first_error_line(detail: &str) -> &str {
    detail
        .lines()
        .rev()
        .find(|l| l.trim_start().starts_with("error:"))
        .map(|l| l.trim_start().trim_start_matches("error:").trim())
        .unwrap_or_else(|| detail.lines().next().unwrap_or(detail))
}
