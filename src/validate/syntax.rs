//! Syntax layer.
//!
//! Per-file soundness checks: a parse-only pass (tree-sitter, or the
//! bracket/indentation fallback when no parser is compiled in), regex
//! literal compilation, and double-escaping detection.

use crate::bundle::GeneratedFile;
use crate::languages::LanguageProfile;

use super::escaping::check_double_escaping;
use super::fallback::{check_fallback, FallbackStyle};
use super::regex_literals::check_candidates;
use super::{ErrorKind, Severity, ValidationError};

/// Check one file. Files that are not code files of the language are skipped.
pub fn check_file(
    file: &GeneratedFile,
    profile: &dyn LanguageProfile,
    escape_threshold: usize,
) -> Vec<ValidationError> {
    if !profile.is_code_file(file) {
        return Vec::new();
    }

    let path = file.normalized_path();
    let mut errors = match profile.syntax_parser(&file.extension()) {
        Some(parser) => parse_check(&path, &file.content, parser.as_ref()),
        None => check_fallback(
            &path,
            &file.content,
            &FallbackStyle::for_language(profile.language()),
        ),
    };

    let candidates = profile.regex_candidates(&file.content);
    errors.extend(check_candidates(&path, &candidates));

    if let Some(err) = check_double_escaping(&path, &file.content, escape_threshold) {
        errors.push(err);
    }

    errors
}

fn parse_check(
    path: &str,
    content: &str,
    parser: &dyn crate::parser::SyntaxParser,
) -> Vec<ValidationError> {
    match parser.check(content) {
        Ok(diagnostics) => diagnostics
            .into_iter()
            .map(|d| {
                ValidationError::new(
                    Severity::Critical,
                    ErrorKind::SyntaxError,
                    path,
                    format!("Syntax error: {}", d.message),
                )
                .at_line(d.line)
                .with_fix(format!("Fix the {} syntax at this line", parser.grammar()))
            })
            .collect(),
        Err(e) => {
            tracing::warn!(file = path, grammar = parser.grammar(), error = %e, "parser failed");
            vec![ValidationError::new(
                Severity::Critical,
                ErrorKind::SyntaxError,
                path,
                format!("Could not parse {}: {}", path, e),
            )]
        }
    }
}
