//! Supported languages and their capability profiles.
//!
//! `Language` is a closed set. Each variant maps to a static
//! `LanguageProfile` that knows the language's code files, parser, import
//! syntax, builtin modules, manifest ecosystem, and regex literal syntax.
//! The validation layers only talk to the profile.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::bundle::GeneratedFile;
use crate::parser::SyntaxParser;
use crate::validate::imports::ImportedDependency;
use crate::validate::manifest::{Ecosystem, ManifestProvider};
use crate::validate::regex_literals::RegexCandidate;

mod go;
mod javascript;
mod python;
mod rust_lang;
mod typescript;

pub use go::GoProfile;
pub use javascript::JavaScriptProfile;
pub use python::PythonProfile;
pub use rust_lang::RustProfile;
pub use typescript::TypeScriptProfile;

/// A language a bundle can be declared as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    JavaScript,
    TypeScript,
    Python,
    Go,
    Rust,
}

impl Language {
    pub const ALL: [Language; 5] = [
        Language::JavaScript,
        Language::TypeScript,
        Language::Python,
        Language::Go,
        Language::Rust,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Python => "python",
            Language::Go => "go",
            Language::Rust => "rust",
        }
    }

    pub fn profile(&self) -> &'static dyn LanguageProfile {
        match self {
            Language::JavaScript => &JavaScriptProfile,
            Language::TypeScript => &TypeScriptProfile,
            Language::Python => &PythonProfile,
            Language::Go => &GoProfile,
            Language::Rust => &RustProfile,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Unknown language tag.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported language {0:?} (expected one of: javascript, typescript, python, go, rust)")]
pub struct ParseLanguageError(pub String);

impl FromStr for Language {
    type Err = ParseLanguageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "javascript" | "js" | "node" => Ok(Language::JavaScript),
            "typescript" | "ts" => Ok(Language::TypeScript),
            "python" | "py" => Ok(Language::Python),
            "go" | "golang" => Ok(Language::Go),
            "rust" | "rs" => Ok(Language::Rust),
            _ => Err(ParseLanguageError(s.to_string())),
        }
    }
}

/// Files with one of `extensions` need `config_file` somewhere in the bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeMarker {
    pub extensions: &'static [&'static str],
    pub config_file: &'static str,
}

/// TypeScript sources need a compiler config in JavaScript and TypeScript
/// bundles alike.
pub const TSCONFIG_MARKER: TypeMarker = TypeMarker {
    extensions: &["ts", "tsx"],
    config_file: "tsconfig.json",
};

/// Per-language capabilities used by the validation layers.
pub trait LanguageProfile: Send + Sync {
    fn language(&self) -> Language;

    /// Extensions (lowercase, no dot) of files the layers inspect.
    fn code_extensions(&self) -> &'static [&'static str];

    fn is_code_file(&self, file: &GeneratedFile) -> bool {
        let ext = file.extension();
        self.code_extensions().contains(&ext.as_str())
    }

    fn ecosystem(&self) -> Ecosystem;

    fn type_marker(&self) -> Option<TypeMarker> {
        None
    }

    /// Parse-only checker for a file extension, if one is compiled in.
    fn syntax_parser(&self, extension: &str) -> Option<Box<dyn SyntaxParser>>;

    /// External imports of one file, normalized to package names.
    fn extract_imports(&self, file: &GeneratedFile) -> Vec<ImportedDependency>;

    /// Standard library or language-provided module.
    fn is_builtin(&self, name: &str) -> bool;

    /// Module names the bundle itself provides.
    fn local_modules(&self, _files: &[GeneratedFile]) -> HashSet<String> {
        HashSet::new()
    }

    /// Whether an import is satisfied by the project itself.
    fn is_local(
        &self,
        name: &str,
        locals: &HashSet<String>,
        manifest: &dyn ManifestProvider,
    ) -> bool {
        locals.contains(name) || manifest.is_local(name)
    }

    /// Name reported in a `missing_dependency` finding.
    fn reported_name(&self, import: &ImportedDependency) -> String {
        import.name.clone()
    }

    /// Regex patterns written in source.
    fn regex_candidates(&self, content: &str) -> Vec<RegexCandidate>;
}
