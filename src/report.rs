//! Output formatting for bundlecheck results.
//!
//! Supports two output formats:
//! - Pretty: colored terminal output for human readability
//! - JSON: the `ValidationResult` plus run metadata, for deployment gates

use std::fmt::{self, Write as _};

use colored::*;
use serde::{Deserialize, Serialize};

use crate::languages::Language;
use crate::validate::{Severity, ValidationError, ValidationResult};

// =============================================================================
// JSON Format
// =============================================================================

/// JSON report structure. The result's fields are inlined at the top level.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonReport {
    pub version: String,
    pub path: String,
    pub language: Language,
    pub passed: bool,
    #[serde(flatten)]
    pub result: ValidationResult,
}

impl JsonReport {
    pub fn new(path: &str, language: Language, result: &ValidationResult) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            path: path.to_string(),
            language,
            passed: result.passed(),
            result: result.clone(),
        }
    }
}

/// Render results as pretty-printed JSON.
pub fn render_json(path: &str, language: Language, result: &ValidationResult) -> anyhow::Result<String> {
    let report = JsonReport::new(path, language, result);
    Ok(serde_json::to_string_pretty(&report)?)
}

/// Write results in JSON format to stdout.
pub fn write_json(path: &str, language: Language, result: &ValidationResult) -> anyhow::Result<()> {
    println!("{}", render_json(path, language, result)?);
    Ok(())
}

// =============================================================================
// Pretty Format
// =============================================================================

/// Write results in colored terminal format to stdout.
pub fn write_pretty(path: &str, language: Language, result: &ValidationResult) {
    print!("{}", render_pretty(path, language, result));
}

/// Render results in colored terminal format.
pub fn render_pretty(path: &str, language: Language, result: &ValidationResult) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail
    let _ = write_report(&mut out, path, language, result);
    out
}

fn write_report(
    out: &mut String,
    path: &str,
    language: Language,
    result: &ValidationResult,
) -> fmt::Result {
    // Header
    writeln!(out)?;
    writeln!(
        out,
        "  {} v{}",
        "bundlecheck".cyan().bold(),
        env!("CARGO_PKG_VERSION")
    )?;
    writeln!(out)?;

    // Run info
    writeln!(out, "  {}{}", "Checking: ".dimmed(), path)?;
    writeln!(out, "  {}{}", "Language: ".dimmed(), language)?;
    writeln!(
        out,
        "  {}{} in {:.1}ms",
        "Files:    ".dimmed(),
        result.files_checked,
        result.duration_ms
    )?;
    writeln!(out)?;

    write_result_summary(out, result)?;
    writeln!(out)?;

    if !result.errors.is_empty() {
        write_findings(out, "Errors", &result.errors)?;
    }
    if !result.warnings.is_empty() {
        write_findings(out, "Warnings", &result.warnings)?;
    }

    write_breakdown(out, result)?;
    write_final_status(out, result)?;
    writeln!(out)
}

fn write_result_summary(out: &mut String, result: &ValidationResult) -> fmt::Result {
    let status = if result.passed() {
        "✓ PASS".green()
    } else {
        "✗ FAIL".red()
    };
    write!(out, "  {}  Confidence: {}", status, colored_confidence(result.confidence))?;

    if !result.complete {
        write!(out, "  {}", "(cancelled before all layers ran)".yellow())?;
    }
    writeln!(out)
}

fn colored_confidence(confidence: f64) -> ColoredString {
    let text = format!("{:.2}", confidence);
    match confidence {
        c if c >= 0.9 => text.green().bold(),
        c if c >= 0.7 => text.green(),
        c if c >= 0.4 => text.yellow(),
        _ => text.red(),
    }
}

fn write_findings(out: &mut String, title: &str, findings: &[ValidationError]) -> fmt::Result {
    writeln!(out, "  {} ({}):", title.bold(), findings.len())?;
    writeln!(out)?;

    for f in findings {
        write!(out, "    {} ", severity_tag(f.severity))?;
        write!(out, "  {:<28}", f.kind.as_str().dimmed())?;
        write!(out, "{}", f.file.blue())?;
        if let Some(line) = f.line {
            write!(out, "{}", format!(":{}", line).dimmed())?;
        }
        writeln!(out)?;

        // Message and fix on following lines, indented
        writeln!(out, "              {}", f.message)?;
        if let Some(fix) = &f.suggested_fix {
            writeln!(out, "              {} {}", "fix:".dimmed(), fix)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

fn severity_tag(severity: Severity) -> ColoredString {
    match severity {
        Severity::Critical => "CRIT".red().bold(),
        Severity::High => "HIGH".red(),
        Severity::Medium => "MED ".yellow(),
        Severity::Low => "LOW ".blue(),
    }
}

fn write_breakdown(out: &mut String, result: &ValidationResult) -> fmt::Result {
    if result.errors.is_empty() && result.warnings.is_empty() {
        return Ok(());
    }
    writeln!(out, "  {}", "Breakdown:".bold())?;
    for severity in [Severity::Critical, Severity::High, Severity::Medium, Severity::Low] {
        let count = result.count(severity);
        if count > 0 {
            let plural = if count != 1 { "s" } else { "" };
            writeln!(out, "    {:<10} {} finding{}", severity.as_str(), count, plural)?;
        }
    }
    writeln!(out)
}

fn write_final_status(out: &mut String, result: &ValidationResult) -> fmt::Result {
    let verdict = if result.passed() {
        "PASSED".green()
    } else {
        "FAILED".red()
    };
    writeln!(
        out,
        "  {}  {}",
        format!(
            "{} errors, {} warnings",
            result.errors.len(),
            result.warnings.len()
        )
        .dimmed(),
        verdict
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::ErrorKind;

    fn sample() -> ValidationResult {
        ValidationResult {
            is_valid: false,
            errors: vec![ValidationError::new(
                Severity::Critical,
                ErrorKind::DuplicateFile,
                "src/app.py",
                "Duplicate file path src/app.py (occurrence 2)",
            )
            .with_fix("Merge the duplicate files into one")],
            warnings: vec![ValidationError::new(
                Severity::Low,
                ErrorKind::AntiPattern,
                "src/app.py",
                "Unfinished work marker",
            )
            .at_line(4)],
            duration_ms: 1.5,
            confidence: 0.68,
            complete: true,
            files_checked: 2,
        }
    }

    #[test]
    fn test_pretty_lists_findings() {
        colored::control::set_override(false);
        let out = render_pretty("./bundle", Language::Python, &sample());
        assert!(out.contains("✗ FAIL"));
        assert!(out.contains("Confidence: 0.68"));
        assert!(out.contains("duplicate_file"));
        assert!(out.contains("src/app.py:4"));
        assert!(out.contains("fix: Merge the duplicate files into one"));
        assert!(out.contains("critical   1 finding\n"));
        assert!(out.contains("FAILED"));
    }

    #[test]
    fn test_pretty_notes_cancellation() {
        colored::control::set_override(false);
        let mut result = sample();
        result.complete = false;
        let out = render_pretty("b", Language::Go, &result);
        assert!(out.contains("cancelled"));
    }

    #[test]
    fn test_json_inlines_result() {
        let json = render_json("b", Language::TypeScript, &sample()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["language"], "typescript");
        assert_eq!(value["passed"], false);
        assert_eq!(value["isValid"], false);
        assert_eq!(value["filesChecked"], 2);
        assert_eq!(value["errors"][0]["type"], "duplicate_file");
        assert_eq!(value["errors"][0]["suggestedFix"], "Merge the duplicate files into one");
        assert!(value["errors"][0].get("line").is_none());
        assert_eq!(value["warnings"][0]["line"], 4);
    }
}
