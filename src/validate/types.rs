//! Core types for validation findings and results.

use serde::{Deserialize, Serialize};

/// Severity levels for findings, ordered from least to most severe.
///
/// The derived `Ord` gives `Low < Medium < High < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Whether findings of this severity land in `errors` (as opposed to `warnings`).
    pub fn is_error(&self) -> bool {
        matches!(self, Severity::Critical | Severity::High)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Type tags for findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    SyntaxError,
    RegexSyntaxError,
    JsonEscapingError,
    MissingFile,
    MissingDependency,
    InvalidDependencyVersion,
    InvalidJson,
    InvalidManifest,
    DuplicateFile,
    EmptyFile,
    PlaceholderFile,
    MissingConfig,
    AntiPattern,
    ValidationError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::SyntaxError => "syntax_error",
            ErrorKind::RegexSyntaxError => "regex_syntax_error",
            ErrorKind::JsonEscapingError => "json_escaping_error",
            ErrorKind::MissingFile => "missing_file",
            ErrorKind::MissingDependency => "missing_dependency",
            ErrorKind::InvalidDependencyVersion => "invalid_dependency_version",
            ErrorKind::InvalidJson => "invalid_json",
            ErrorKind::InvalidManifest => "invalid_manifest",
            ErrorKind::DuplicateFile => "duplicate_file",
            ErrorKind::EmptyFile => "empty_file",
            ErrorKind::PlaceholderFile => "placeholder_file",
            ErrorKind::MissingConfig => "missing_config",
            ErrorKind::AntiPattern => "anti_pattern",
            ErrorKind::ValidationError => "validation_error",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single detected issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    pub severity: Severity,
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    pub file: String,
    /// 1-based line, when the finding has a location inside the file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_fix: Option<String>,
}

impl ValidationError {
    pub fn new(
        severity: Severity,
        kind: ErrorKind,
        file: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            kind,
            file: file.into(),
            line: None,
            message: message.into(),
            suggested_fix: None,
        }
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    pub fn with_fix(mut self, fix: impl Into<String>) -> Self {
        self.suggested_fix = Some(fix.into());
        self
    }
}

/// Outcome of one validation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    /// True iff no finding has `Severity::Critical`.
    pub is_valid: bool,
    /// Critical and high findings, most severe first.
    pub errors: Vec<ValidationError>,
    /// Medium and low findings, most severe first.
    pub warnings: Vec<ValidationError>,
    pub duration_ms: f64,
    pub confidence: f64,
    /// False when the run was cancelled before every layer finished.
    #[serde(default = "default_complete")]
    pub complete: bool,
    #[serde(default)]
    pub files_checked: usize,
}

fn default_complete() -> bool {
    true
}

impl ValidationResult {
    /// Whether a deployment gate should let the bundle through.
    pub fn passed(&self) -> bool {
        self.complete && self.is_valid
    }

    /// Number of findings with the given severity, across errors and warnings.
    pub fn count(&self, severity: Severity) -> usize {
        self.errors
            .iter()
            .chain(self.warnings.iter())
            .filter(|e| e.severity == severity)
            .count()
    }

    /// All findings of the given kind, errors first.
    pub fn of_kind(&self, kind: ErrorKind) -> Vec<&ValidationError> {
        self.errors
            .iter()
            .chain(self.warnings.iter())
            .filter(|e| e.kind == kind)
            .collect()
    }

    pub fn has_kind(&self, kind: ErrorKind) -> bool {
        self.errors
            .iter()
            .chain(self.warnings.iter())
            .any(|e| e.kind == kind)
    }
}

/// Failure of a whole layer, as opposed to a finding produced by it.
#[derive(Debug, thiserror::Error)]
pub enum LayerError {
    #[error("{layer} layer panicked: {message}")]
    Panicked { layer: &'static str, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_order() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);

        let mut all = vec![Severity::Low, Severity::Critical, Severity::Medium, Severity::High];
        all.sort_by(|a, b| b.cmp(a));
        assert_eq!(
            all,
            vec![Severity::Critical, Severity::High, Severity::Medium, Severity::Low]
        );
    }

    #[test]
    fn test_error_json_shape() {
        let err = ValidationError::new(
            Severity::High,
            ErrorKind::MissingDependency,
            "package.json",
            "missing",
        )
        .with_fix("add it");

        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["type"], "missing_dependency");
        assert_eq!(json["severity"], "high");
        assert_eq!(json["suggestedFix"], "add it");
        assert!(json.get("line").is_none());
    }

    #[test]
    fn test_passed_requires_complete() {
        let result = ValidationResult {
            is_valid: true,
            errors: vec![],
            warnings: vec![],
            duration_ms: 0.0,
            confidence: 1.0,
            complete: false,
            files_checked: 0,
        };
        assert!(!result.passed());
    }
}
