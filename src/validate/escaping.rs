//! Double-escaping detection.
//!
//! Generators that emit files inside JSON sometimes leave the JSON escapes
//! in place, so the file arrives with literal `\n` text where line breaks
//! belong.

use regex::Regex;

use super::{ErrorKind, Severity, ValidationError};

/// Count escaped control sequences not preceded by a quote or backslash.
pub fn escaped_sequence_count(content: &str) -> usize {
    lazy_static::lazy_static! {
        static ref ESCAPED_RE: Regex = Regex::new(r#"[^"\\]\\[nrt]"#).unwrap();
    }
    ESCAPED_RE.find_iter(content).count()
}

/// Flag `content` when it has more escaped sequences than `threshold`.
pub fn check_double_escaping(
    file: &str,
    content: &str,
    threshold: usize,
) -> Option<ValidationError> {
    let count = escaped_sequence_count(content);
    if count <= threshold {
        return None;
    }
    Some(
        ValidationError::new(
            Severity::High,
            ErrorKind::JsonEscapingError,
            file,
            format!(
                "Content looks double-escaped: {} literal escape sequences found",
                count
            ),
        )
        .with_fix("Decode the JSON string escapes before writing the file"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapsed_file_flagged() {
        let content =
            r#"import os\nimport sys\n\ndef main():\n    print(os.getcwd())\n    return 0\n\nmain()\n"#;
        let err = check_double_escaping("main.py", content, 5).unwrap();
        assert_eq!(err.kind, ErrorKind::JsonEscapingError);
        assert_eq!(err.severity, Severity::High);
        assert!(err.line.is_none());
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let content = r"a\nb\nc\nd\ne\nf";
        assert_eq!(escaped_sequence_count(content), 5);
        assert!(check_double_escaping("x.js", content, 5).is_none());
        assert!(check_double_escaping("x.js", content, 4).is_some());
    }

    #[test]
    fn test_quoted_and_escaped_backslash_ignored() {
        // "\n" right after a quote and \\n are legitimate source
        let content = r#"s = "\n" + "\n"; t = "a\\n";"#;
        assert_eq!(escaped_sequence_count(content), 0);
    }
}
