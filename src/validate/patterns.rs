//! Pattern matcher.
//!
//! Scans code files line by line against the language catalog, the common
//! catalog, and any extra patterns from the policy. Every match is reported.

use crate::bundle::GeneratedFile;
use crate::catalog::CompiledPattern;
use crate::languages::LanguageProfile;

use super::{ErrorKind, ValidationError};

/// Scan one file. `catalog` is checked before `extra` on every line.
pub fn scan_file(
    file: &GeneratedFile,
    profile: &dyn LanguageProfile,
    catalog: &[CompiledPattern],
    extra: &[CompiledPattern],
) -> Vec<ValidationError> {
    if !profile.is_code_file(file) {
        return Vec::new();
    }

    let path = file.normalized_path();
    let mut errors = Vec::new();

    for (line_num, line) in file.content.lines().enumerate() {
        for p in catalog.iter().chain(extra.iter()) {
            for _ in p.regex.find_iter(line) {
                let mut err = ValidationError::new(
                    p.severity,
                    ErrorKind::AntiPattern,
                    path.as_str(),
                    p.message.clone(),
                )
                .at_line(line_num + 1);
                if let Some(fix) = &p.fix {
                    err = err.with_fix(fix.clone());
                }
                errors.push(err);
            }
        }
    }

    errors
}
