//! Trait-based manifest parsing.
//!
//! Each ecosystem has exactly one canonical manifest file. Parsers turn its
//! content into a `ManifestProvider` that answers whether an import is
//! declared, or fail with a `ManifestError` when the file is malformed.
//!
//! # Architecture
//!
//! ```text
//! ManifestProvider trait
//!     ├── NpmManifest      (package.json)
//!     ├── PythonManifest   (requirements.txt)
//!     ├── GoManifest       (go.mod)
//!     └── CargoManifest    (Cargo.toml)
//! ```

use serde::{Deserialize, Serialize};

use super::Severity;

mod cargo;
mod golang;
mod npm;
mod python;

pub use cargo::{normalize_crate_name, CargoManifest};
pub use golang::GoManifest;
pub use npm::NpmManifest;
pub use python::PythonManifest;

/// Package ecosystem a language resolves its dependencies from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ecosystem {
    Npm,
    #[serde(rename = "pypi")]
    PyPI,
    Go,
    Crates,
}

impl Ecosystem {
    /// Canonical manifest file name.
    pub fn manifest_file(&self) -> &'static str {
        match self {
            Ecosystem::Npm => "package.json",
            Ecosystem::PyPI => "requirements.txt",
            Ecosystem::Go => "go.mod",
            Ecosystem::Crates => "Cargo.toml",
        }
    }

    /// Severity of a missing manifest. Python tolerates bundles without
    /// requirements.txt; the others cannot build without their manifest.
    pub fn missing_manifest_severity(&self) -> Severity {
        match self {
            Ecosystem::PyPI => Severity::High,
            _ => Severity::Critical,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Ecosystem::Npm => "npm",
            Ecosystem::PyPI => "pypi",
            Ecosystem::Go => "go",
            Ecosystem::Crates => "crates",
        }
    }
}

impl std::fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A dependency declared in a manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredDependency {
    /// Name as written in the manifest
    pub name: String,
    /// Version requirement as written ("" when none was given)
    pub requirement: String,
    /// Line of the declaration, when it could be located
    pub line: Option<usize>,
}

/// Why a manifest could not be read as structured data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ManifestError {
    #[error("invalid JSON: {message}")]
    InvalidJson {
        message: String,
        line: Option<usize>,
    },
    #[error("{message}")]
    Invalid {
        message: String,
        line: Option<usize>,
    },
}

impl ManifestError {
    pub fn invalid(message: impl Into<String>, line: Option<usize>) -> Self {
        ManifestError::Invalid {
            message: message.into(),
            line,
        }
    }

    pub fn line(&self) -> Option<usize> {
        match self {
            ManifestError::InvalidJson { line, .. } | ManifestError::Invalid { line, .. } => *line,
        }
    }
}

/// Trait for manifest-based import validation.
pub trait ManifestProvider: Send + Sync {
    /// Every dependency the manifest declares, in file order.
    fn declared(&self) -> &[DeclaredDependency];

    /// Returns true if `import_name` is satisfied by a declared dependency.
    fn declares(&self, import_name: &str) -> bool;

    /// Returns true if `import_name` refers to the project itself
    /// (Go module path, Cargo package name).
    fn is_local(&self, _import_name: &str) -> bool {
        false
    }

    /// Get statistics about the manifest for logging.
    fn stats(&self) -> ManifestStats {
        ManifestStats {
            package_count: self.declared().len(),
        }
    }
}

/// Statistics about a loaded manifest.
#[derive(Debug, Clone, Default)]
pub struct ManifestStats {
    /// Total number of declared packages
    pub package_count: usize,
}

/// Parse manifest content for the given ecosystem.
pub fn parse_manifest(
    ecosystem: Ecosystem,
    content: &str,
) -> Result<Box<dyn ManifestProvider>, ManifestError> {
    Ok(match ecosystem {
        Ecosystem::Npm => Box::new(NpmManifest::parse(content)?),
        Ecosystem::PyPI => Box::new(PythonManifest::parse(content)?),
        Ecosystem::Go => Box::new(GoManifest::parse(content)?),
        Ecosystem::Crates => Box::new(CargoManifest::parse(content)?),
    })
}

/// 1-based line of the first line containing `needle`.
pub(crate) fn find_line(content: &str, needle: &str) -> Option<usize> {
    content
        .lines()
        .position(|l| l.contains(needle))
        .map(|idx| idx + 1)
}
