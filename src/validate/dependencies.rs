//! Dependency layer.
//!
//! Locates the language's manifest, parses it, judges declared versions,
//! and reports every external import the manifest does not declare. A
//! missing or malformed manifest ends the layer with a single finding.

use std::collections::HashSet;

use crate::bundle::GeneratedFile;
use crate::languages::LanguageProfile;
use crate::policy::VersionPolicies;

use super::imports::ImportedDependency;
use super::manifest::{parse_manifest, ManifestError};
use super::versions::check_version;
use super::{ErrorKind, Severity, ValidationError};

/// The manifest closest to the bundle root; ties go to the earlier file.
pub fn locate_manifest<'a>(files: &'a [GeneratedFile], manifest_file: &str) -> Option<&'a GeneratedFile> {
    files
        .iter()
        .filter(|f| f.file_name() == manifest_file)
        .min_by_key(|f| f.depth())
}

/// Run the layer. `imports` holds every file's imports in bundle order.
pub fn check_dependencies(
    files: &[GeneratedFile],
    profile: &dyn LanguageProfile,
    versions: &VersionPolicies,
    imports: &[ImportedDependency],
) -> Vec<ValidationError> {
    let ecosystem = profile.ecosystem();
    let manifest_file = ecosystem.manifest_file();

    let Some(manifest_entry) = locate_manifest(files, manifest_file) else {
        return vec![ValidationError::new(
            ecosystem.missing_manifest_severity(),
            ErrorKind::MissingFile,
            manifest_file,
            format!(
                "Missing {}: {} dependencies cannot be resolved",
                manifest_file,
                profile.language()
            ),
        )
        .with_fix(format!(
            "Add a {} that declares the project's dependencies",
            manifest_file
        ))];
    };

    let manifest_path = manifest_entry.normalized_path();
    let manifest = match parse_manifest(ecosystem, &manifest_entry.content) {
        Ok(m) => m,
        Err(e) => return vec![malformed_manifest(&manifest_path, &e)],
    };
    tracing::debug!(
        manifest = %manifest_path,
        packages = manifest.stats().package_count,
        "manifest parsed"
    );

    let policy = versions.for_ecosystem(ecosystem);
    let mut errors: Vec<ValidationError> = manifest
        .declared()
        .iter()
        .filter_map(|dep| check_version(&manifest_path, dep, policy))
        .collect();

    let locals = profile.local_modules(files);
    let mut reported = HashSet::new();

    for import in imports {
        if profile.is_builtin(&import.name)
            || profile.is_local(&import.name, &locals, manifest.as_ref())
            || manifest.declares(&import.name)
        {
            continue;
        }

        let name = profile.reported_name(import);
        if !reported.insert(name.clone()) {
            continue;
        }

        errors.push(
            ValidationError::new(
                Severity::High,
                ErrorKind::MissingDependency,
                manifest_path.as_str(),
                format!(
                    "'{}' is imported in {} (line {}) but not declared in {}",
                    name, import.file, import.line, manifest_file
                ),
            )
            .with_fix(format!("Add '{}' to {}", name, manifest_file)),
        );
    }

    errors
}

fn malformed_manifest(path: &str, err: &ManifestError) -> ValidationError {
    let kind = match err {
        ManifestError::InvalidJson { .. } => ErrorKind::InvalidJson,
        ManifestError::Invalid { .. } => ErrorKind::InvalidManifest,
    };
    let finding = ValidationError::new(
        Severity::Critical,
        kind,
        path,
        format!("Malformed {}: {}", path, err),
    )
    .with_fix(format!("Fix the syntax of {}", path));

    match err.line() {
        Some(line) => finding.at_line(line),
        None => finding,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::languages::Language;

    fn imports_of(files: &[GeneratedFile], language: Language) -> Vec<ImportedDependency> {
        files
            .iter()
            .filter(|f| language.profile().is_code_file(f))
            .flat_map(|f| language.profile().extract_imports(f))
            .collect()
    }

    fn run(files: &[GeneratedFile], language: Language) -> Vec<ValidationError> {
        let imports = imports_of(files, language);
        check_dependencies(files, language.profile(), &VersionPolicies::default(), &imports)
    }

    #[test]
    fn test_locate_prefers_shallowest() {
        let files = vec![
            GeneratedFile::new("packages/web/package.json", "{}"),
            GeneratedFile::new("package.json", "{}"),
            GeneratedFile::new("./other/package.json", "{}"),
        ];
        assert_eq!(locate_manifest(&files, "package.json").unwrap().path, "package.json");
    }

    #[test]
    fn test_locate_tie_goes_to_first() {
        let files = vec![
            GeneratedFile::new("a/go.mod", "module a"),
            GeneratedFile::new("b/go.mod", "module b"),
        ];
        assert_eq!(locate_manifest(&files, "go.mod").unwrap().path, "a/go.mod");
    }

    #[test]
    fn test_missing_manifest_short_circuits() {
        let files = vec![GeneratedFile::new("index.js", "import express from 'express';\n")];
        let errors = run(&files, Language::JavaScript);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ErrorKind::MissingFile);
        assert_eq!(errors[0].severity, Severity::Critical);

        let py = vec![GeneratedFile::new("main.py", "import flask\n")];
        let errors = run(&py, Language::Python);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].severity, Severity::High);
    }

    #[test]
    fn test_malformed_manifest_short_circuits() {
        let files = vec![
            GeneratedFile::new("package.json", "{ \"dependencies\": { \"react\": }"),
            GeneratedFile::new("index.js", "import express from 'express';\n"),
        ];
        let errors = run(&files, Language::JavaScript);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ErrorKind::InvalidJson);
        assert_eq!(errors[0].severity, Severity::Critical);
    }

    #[test]
    fn test_missing_dependency_once_per_name() {
        let files = vec![
            GeneratedFile::new("package.json", r#"{"name": "app", "dependencies": {"react": "^18.2.0"}}"#),
            GeneratedFile::new(
                "src/a.js",
                "import React from 'react';\nimport axios from 'axios';\nimport fs from 'fs';\nimport x from './x';\n",
            ),
            GeneratedFile::new("src/b.js", "const axios = require('axios');\nconst _ = require('lodash/fp');\n"),
        ];
        let errors = run(&files, Language::JavaScript);
        let names: Vec<&str> = errors
            .iter()
            .map(|e| e.suggested_fix.as_deref().unwrap_or(""))
            .collect();
        assert_eq!(
            names,
            vec!["Add 'axios' to package.json", "Add 'lodash' to package.json"]
        );
        assert!(errors.iter().all(|e| e.file == "package.json"));
        assert!(errors.iter().all(|e| e.severity == Severity::High));
    }

    #[test]
    fn test_types_package_does_not_satisfy_import() {
        let files = vec![
            GeneratedFile::new("package.json", r#"{"devDependencies": {"@types/express": "^4.17.21"}}"#),
            GeneratedFile::new("src/server.ts", "import express from 'express';\n"),
        ];
        let errors = run(&files, Language::TypeScript);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("'express'"));
    }

    #[test]
    fn test_python_local_modules_and_aliases() {
        let files = vec![
            GeneratedFile::new("requirements.txt", "PyYAML==6.0.1\nflask>=3.0\n"),
            GeneratedFile::new("app/main.py", "import os\nimport yaml\nfrom flask import Flask\nfrom app import utils\nimport helpers\nimport requests\n"),
            GeneratedFile::new("app/helpers.py", "X = 1\n"),
        ];
        let errors = run(&files, Language::Python);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].suggested_fix.as_deref(), Some("Add 'requests' to requirements.txt"));
    }

    #[test]
    fn test_go_reports_module_name() {
        let files = vec![
            GeneratedFile::new("go.mod", "module example.com/svc\n\ngo 1.22\n\nrequire github.com/gin-gonic/gin v1.9.1\n"),
            GeneratedFile::new(
                "main.go",
                "package main\n\nimport (\n\t\"fmt\"\n\t\"example.com/svc/internal/db\"\n\t\"github.com/gin-gonic/gin\"\n\t\"github.com/gorilla/mux/middleware\"\n)\n",
            ),
        ];
        let errors = run(&files, Language::Go);
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].suggested_fix.as_deref(),
            Some("Add 'github.com/gorilla/mux' to go.mod")
        );
    }

    #[test]
    fn test_rust_crates() {
        let files = vec![
            GeneratedFile::new("Cargo.toml", "[package]\nname = \"svc\"\n\n[dependencies]\nserde-json = \"1\"\n"),
            GeneratedFile::new(
                "src/main.rs",
                "mod config;\nuse std::fs;\nuse serde_json::Value;\nuse config::Settings;\nuse tokio::runtime;\n",
            ),
        ];
        let errors = run(&files, Language::Rust);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].suggested_fix.as_deref(), Some("Add 'tokio' to Cargo.toml"));
    }

    #[test]
    fn test_version_findings() {
        let files = vec![GeneratedFile::new(
            "package.json",
            "{\n  \"dependencies\": {\n    \"react\": \"^99.0.0\"\n  }\n}",
        )];
        let errors = run(&files, Language::JavaScript);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ErrorKind::InvalidDependencyVersion);
        assert_eq!(errors[0].line, Some(3));
    }
}
