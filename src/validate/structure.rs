//! Structure layer.
//!
//! Bundle-level checks that need no parsing: duplicate paths, empty files,
//! placeholder filenames, a missing type-checker config, and a missing
//! manifest.

use std::collections::HashMap;

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

use crate::bundle::GeneratedFile;
use crate::languages::LanguageProfile;
use crate::policy::PolicyError;

use super::{ErrorKind, Severity, ValidationError};

/// Files that are conventionally empty.
const EMPTY_BY_CONVENTION: &[&str] = &["__init__.py", "py.typed", ".gitkeep", ".keep"];

/// Compile placeholder filename globs. Matching ignores case.
pub fn build_placeholder_set(patterns: &[String]) -> Result<GlobSet, PolicyError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(pattern)
            .case_insensitive(true)
            .literal_separator(true)
            .build()
            .map_err(|source| PolicyError::InvalidGlob {
                pattern: pattern.clone(),
                source,
            })?;
        builder.add(glob);
    }
    builder.build().map_err(|source| PolicyError::InvalidGlob {
        pattern: patterns.join(", "),
        source,
    })
}

/// Run the layer.
pub fn check_structure(
    files: &[GeneratedFile],
    profile: &dyn LanguageProfile,
    placeholders: &GlobSet,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut occurrences: HashMap<String, usize> = HashMap::new();

    for file in files {
        let path = file.normalized_path();

        let seen = occurrences.entry(path.clone()).or_insert(0);
        *seen += 1;
        if *seen > 1 {
            errors.push(
                ValidationError::new(
                    Severity::Critical,
                    ErrorKind::DuplicateFile,
                    path.as_str(),
                    format!("Duplicate file path {} (occurrence {})", path, seen),
                )
                .with_fix("Merge the duplicate files into one"),
            );
        }

        if file.content.trim().is_empty() && !EMPTY_BY_CONVENTION.contains(&file.file_name()) {
            errors.push(
                ValidationError::new(
                    Severity::High,
                    ErrorKind::EmptyFile,
                    path.as_str(),
                    format!("{} is empty", path),
                )
                .with_fix("Generate the file's content or remove it"),
            );
        }

        if placeholders.is_match(&path) {
            errors.push(
                ValidationError::new(
                    Severity::Medium,
                    ErrorKind::PlaceholderFile,
                    path.as_str(),
                    format!("{} has a placeholder filename", path),
                )
                .with_fix("Give the file a name that describes its content"),
            );
        }
    }

    if let Some(marker) = profile.type_marker() {
        let has_config = files.iter().any(|f| f.file_name() == marker.config_file);
        let marked = files
            .iter()
            .find(|f| marker.extensions.contains(&f.extension().as_str()));
        if let (Some(first), false) = (marked, has_config) {
            errors.push(
                ValidationError::new(
                    Severity::Critical,
                    ErrorKind::MissingConfig,
                    marker.config_file,
                    format!(
                        "{} is required by {} but missing",
                        marker.config_file,
                        first.normalized_path()
                    ),
                )
                .with_fix(format!("Add a {}", marker.config_file)),
            );
        }
    }

    let ecosystem = profile.ecosystem();
    let manifest_file = ecosystem.manifest_file();
    if !files.iter().any(|f| f.file_name() == manifest_file) {
        errors.push(
            ValidationError::new(
                ecosystem.missing_manifest_severity(),
                ErrorKind::MissingConfig,
                manifest_file,
                format!("{} projects need a {}", profile.language(), manifest_file),
            )
            .with_fix(format!("Add a {}", manifest_file)),
        );
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::languages::Language;
    use crate::policy::Policy;

    fn placeholders() -> GlobSet {
        build_placeholder_set(&Policy::default().placeholder_files).unwrap()
    }

    fn run(files: &[GeneratedFile], language: Language) -> Vec<ValidationError> {
        check_structure(files, language.profile(), &placeholders())
    }

    #[test]
    fn test_duplicates_reported_per_extra_occurrence() {
        let files = vec![
            GeneratedFile::new("requirements.txt", "flask\n"),
            GeneratedFile::new("app.py", "x = 1\n"),
            GeneratedFile::new("./app.py", "x = 2\n"),
            GeneratedFile::new("app.py", "x = 3\n"),
        ];
        let errors = run(&files, Language::Python);
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| e.kind == ErrorKind::DuplicateFile));
        assert!(errors[1].message.contains("occurrence 3"));
    }

    #[test]
    fn test_empty_files() {
        let files = vec![
            GeneratedFile::new("requirements.txt", "flask\n"),
            GeneratedFile::new("app/__init__.py", ""),
            GeneratedFile::new("app/views.py", "  \n\n"),
        ];
        let errors = run(&files, Language::Python);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ErrorKind::EmptyFile);
        assert_eq!(errors[0].file, "app/views.py");
    }

    #[test]
    fn test_placeholder_names() {
        let files = vec![
            GeneratedFile::new("go.mod", "module a.com/x\n"),
            GeneratedFile::new("cmd/Untitled.go", "package main\n"),
            GeneratedFile::new("placeholder.txt", "x"),
            GeneratedFile::new("main.go", "package main\n"),
        ];
        let errors = run(&files, Language::Go);
        let flagged: Vec<&str> = errors
            .iter()
            .filter(|e| e.kind == ErrorKind::PlaceholderFile)
            .map(|e| e.file.as_str())
            .collect();
        assert_eq!(flagged, vec!["cmd/Untitled.go", "placeholder.txt"]);
        assert!(errors.iter().all(|e| e.severity == Severity::Medium));
    }

    #[test]
    fn test_missing_tsconfig() {
        let files = vec![
            GeneratedFile::new("package.json", "{}"),
            GeneratedFile::new("src/index.ts", "export const a = 1;\n"),
        ];
        let errors = run(&files, Language::JavaScript);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ErrorKind::MissingConfig);
        assert_eq!(errors[0].file, "tsconfig.json");

        let mut with_config = files.clone();
        with_config.push(GeneratedFile::new("tsconfig.json", "{}"));
        assert!(run(&with_config, Language::TypeScript).is_empty());
    }

    #[test]
    fn test_missing_manifest_config() {
        let errors = run(&[GeneratedFile::new("main.rs", "fn main() {}\n")], Language::Rust);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ErrorKind::MissingConfig);
        assert_eq!(errors[0].severity, Severity::Critical);
        assert_eq!(errors[0].file, "Cargo.toml");

        let errors = run(&[GeneratedFile::new("main.py", "x = 1\n")], Language::Python);
        assert_eq!(errors[0].severity, Severity::High);
    }

    #[test]
    fn test_invalid_glob() {
        assert!(build_placeholder_set(&["a/[".to_string()]).is_err());
    }
}
