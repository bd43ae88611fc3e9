//! Anti-pattern catalogs.
//!
//! Each language has a static table of regex signatures for code that
//! generators leave unfinished or unsafe. Every language catalog is followed
//! by the common catalog (placeholder and TODO markers). Tables are compiled
//! once per process and shared read-only.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::languages::Language;
use crate::policy::CustomPattern;
use crate::validate::Severity;

/// One catalog row as written in source.
#[derive(Debug, Clone, Copy)]
pub struct PatternEntry {
    pub pattern: &'static str,
    pub severity: Severity,
    pub message: &'static str,
    pub fix: &'static str,
}

const fn entry(
    pattern: &'static str,
    severity: Severity,
    message: &'static str,
    fix: &'static str,
) -> PatternEntry {
    PatternEntry {
        pattern,
        severity,
        message,
        fix,
    }
}

/// Markers shared by every language.
pub static COMMON: &[PatternEntry] = &[
    entry(
        r"(?i)(?://|#|/\*|<!--)\s*\.\.\.\s*(?:rest|remaining|existing|other|more)\b",
        Severity::Critical,
        "Truncated code placeholder",
        "Replace the placeholder comment with the complete implementation",
    ),
    entry(
        r"(?i)\b(?:your|insert)[ _-](?:code|implementation|logic)[ _-]here\b",
        Severity::High,
        "Placeholder left for the user to fill in",
        "Write the missing implementation",
    ),
    entry(
        r"\bYOUR_[A-Z0-9_]*(?:KEY|TOKEN|SECRET|PASSWORD)\b|(?i:\byour[-_ ]api[-_ ]key\b)",
        Severity::High,
        "Placeholder credential",
        "Read the credential from configuration or the environment",
    ),
    entry(
        r"\b(?:FIXME|XXX|HACK)\b",
        Severity::Medium,
        "Unresolved FIXME marker",
        "Resolve the issue or remove the marker",
    ),
    entry(
        r"\bTODO\b",
        Severity::Low,
        "Unfinished work marker",
        "Finish the work or remove the TODO",
    ),
    entry(
        r"(?i)\blorem ipsum\b",
        Severity::Low,
        "Filler text",
        "Replace the filler text with real content",
    ),
];

pub static JAVASCRIPT: &[PatternEntry] = &[
    entry(
        r"\beval\s*\(",
        Severity::High,
        "eval() executes arbitrary code",
        "Parse the data or call the function directly",
    ),
    entry(
        r#"\bthrow\s+new\s+Error\(\s*['"`](?i:not implemented|todo|unimplemented)"#,
        Severity::High,
        "Unimplemented function stub",
        "Implement the function body",
    ),
    entry(
        r"^\s*debugger\s*;?\s*$",
        Severity::Medium,
        "Leftover debugger statement",
        "Remove the debugger statement",
    ),
    entry(
        r"\.innerHTML\s*=",
        Severity::Medium,
        "Assignment to innerHTML",
        "Use textContent or build DOM nodes",
    ),
    entry(
        r"\bdocument\.write\s*\(",
        Severity::Medium,
        "document.write() call",
        "Build DOM nodes instead",
    ),
    entry(
        r"\bconsole\.log\s*\(",
        Severity::Low,
        "Debug logging left in code",
        "Remove console.log or use a logger",
    ),
];

pub static TYPESCRIPT: &[PatternEntry] = &[
    entry(
        r"@ts-(?:ignore|nocheck)\b",
        Severity::Medium,
        "Type checking suppressed",
        "Fix the type error instead of suppressing it",
    ),
    entry(
        r":\s*any\b|\bas\s+any\b",
        Severity::Low,
        "Use of the any type",
        "Give the value a concrete type",
    ),
];

pub static PYTHON: &[PatternEntry] = &[
    entry(
        r"\braise\s+NotImplementedError\b",
        Severity::High,
        "Unimplemented function stub",
        "Implement the function body",
    ),
    entry(
        r"(?:^|[^.\w])(?:eval|exec)\s*\(",
        Severity::High,
        "eval()/exec() executes arbitrary code",
        "Parse the data explicitly",
    ),
    entry(
        r"\bverify\s*=\s*False\b",
        Severity::High,
        "TLS certificate verification disabled",
        "Keep certificate verification enabled",
    ),
    entry(
        r"^\s*except\s*:",
        Severity::Medium,
        "Bare except clause",
        "Catch a specific exception type",
    ),
    entry(
        r"^\s*from\s+\S+\s+import\s+\*",
        Severity::Medium,
        "Wildcard import",
        "Import the names you use",
    ),
    entry(
        r"\bpdb\.set_trace\(\)|\bbreakpoint\(\)",
        Severity::Medium,
        "Leftover debugger breakpoint",
        "Remove the breakpoint",
    ),
    entry(
        r"^\s*print\s*\(",
        Severity::Low,
        "Debug print left in code",
        "Use the logging module",
    ),
];

pub static GO: &[PatternEntry] = &[
    entry(
        r#"\bpanic\(\s*"(?i:not implemented|todo|unimplemented)"#,
        Severity::High,
        "Unimplemented function stub",
        "Implement the function body",
    ),
    entry(
        r"\bInsecureSkipVerify:\s*true\b",
        Severity::High,
        "TLS certificate verification disabled",
        "Keep certificate verification enabled",
    ),
    entry(
        r"^\s*_\s*=\s*err\b",
        Severity::Medium,
        "Error discarded",
        "Handle or return the error",
    ),
    entry(
        r"\bfmt\.Print(?:ln|f)?\(",
        Severity::Low,
        "Debug print left in code",
        "Use a logger",
    ),
];

pub static RUST: &[PatternEntry] = &[
    entry(
        r"\b(?:todo|unimplemented)!\s*\(",
        Severity::High,
        "Unimplemented function stub",
        "Implement the function body",
    ),
    entry(
        r"\bunsafe\s*\{",
        Severity::Medium,
        "Unsafe block",
        "Use a safe API or document the invariant",
    ),
    entry(
        r"\.unwrap\(\)",
        Severity::Low,
        "unwrap() panics on error",
        "Propagate the error with ?",
    ),
    entry(
        r"\bdbg!\s*\(",
        Severity::Low,
        "Leftover dbg! macro",
        "Remove the dbg! call",
    ),
];

/// A catalog entry ready for matching.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    pub regex: Regex,
    pub severity: Severity,
    pub message: String,
    pub fix: Option<String>,
}

impl CompiledPattern {
    fn from_entry(e: &PatternEntry) -> Self {
        Self {
            // Catalog patterns are fixed at compile time and covered by tests.
            regex: Regex::new(e.pattern).unwrap(),
            severity: e.severity,
            message: e.message.to_string(),
            fix: Some(e.fix.to_string()),
        }
    }

    pub fn from_custom(p: &CustomPattern) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(&p.pattern)?,
            severity: p.severity,
            message: p.message.clone(),
            fix: p.fix.clone(),
        })
    }
}

fn compile(tables: &[&[PatternEntry]]) -> Vec<CompiledPattern> {
    tables
        .iter()
        .flat_map(|t| t.iter())
        .chain(COMMON.iter())
        .map(CompiledPattern::from_entry)
        .collect()
}

static JAVASCRIPT_COMPILED: Lazy<Vec<CompiledPattern>> = Lazy::new(|| compile(&[JAVASCRIPT]));
static TYPESCRIPT_COMPILED: Lazy<Vec<CompiledPattern>> =
    Lazy::new(|| compile(&[JAVASCRIPT, TYPESCRIPT]));
static PYTHON_COMPILED: Lazy<Vec<CompiledPattern>> = Lazy::new(|| compile(&[PYTHON]));
static GO_COMPILED: Lazy<Vec<CompiledPattern>> = Lazy::new(|| compile(&[GO]));
static RUST_COMPILED: Lazy<Vec<CompiledPattern>> = Lazy::new(|| compile(&[RUST]));

/// Language catalog followed by the common catalog, compiled.
pub fn compiled(language: Language) -> &'static [CompiledPattern] {
    match language {
        Language::JavaScript => &JAVASCRIPT_COMPILED,
        Language::TypeScript => &TYPESCRIPT_COMPILED,
        Language::Python => &PYTHON_COMPILED,
        Language::Go => &GO_COMPILED,
        Language::Rust => &RUST_COMPILED,
    }
}
