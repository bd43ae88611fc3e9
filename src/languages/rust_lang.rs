use std::collections::HashSet;

use regex::Regex;

use crate::bundle::GeneratedFile;
use crate::parser::SyntaxParser;
use crate::validate::imports::{extract_rust_imports, ImportedDependency};
use crate::validate::manifest::{normalize_crate_name, Ecosystem, ManifestProvider};
use crate::validate::regex_literals::{rust_candidates, RegexCandidate};
use crate::validate::stdlib::is_rust_builtin;

use super::{Language, LanguageProfile};

pub struct RustProfile;

impl LanguageProfile for RustProfile {
    fn language(&self) -> Language {
        Language::Rust
    }

    fn code_extensions(&self) -> &'static [&'static str] {
        &["rs"]
    }

    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Crates
    }

    #[cfg(feature = "tree-sitter")]
    fn syntax_parser(&self, extension: &str) -> Option<Box<dyn SyntaxParser>> {
        (extension == "rs").then(crate::parser::languages::rust_lang::new_parser)
    }

    #[cfg(not(feature = "tree-sitter"))]
    fn syntax_parser(&self, _extension: &str) -> Option<Box<dyn SyntaxParser>> {
        None
    }

    fn extract_imports(&self, file: &GeneratedFile) -> Vec<ImportedDependency> {
        extract_rust_imports(&file.content, &file.normalized_path())
    }

    fn is_builtin(&self, name: &str) -> bool {
        is_rust_builtin(name)
    }

    /// `mod` declarations and source file stems.
    fn local_modules(&self, files: &[GeneratedFile]) -> HashSet<String> {
        lazy_static::lazy_static! {
            static ref MOD_RE: Regex = Regex::new(
                r"(?m)^\s*(?:pub(?:\([^)]*\))?\s+)?mod\s+([A-Za-z_][A-Za-z0-9_]*)"
            ).unwrap();
        }

        let mut locals = HashSet::new();
        for file in files.iter().filter(|f| f.extension() == "rs") {
            for caps in MOD_RE.captures_iter(&file.content) {
                locals.insert(caps[1].to_string());
            }
            if let Some(stem) = file.file_name().strip_suffix(".rs") {
                if !matches!(stem, "main" | "lib" | "mod" | "build") {
                    locals.insert(stem.to_string());
                }
            }
        }
        locals
    }

    /// Capitalized first segments are items brought into scope, never crates.
    fn is_local(
        &self,
        name: &str,
        locals: &HashSet<String>,
        manifest: &dyn ManifestProvider,
    ) -> bool {
        name.starts_with(|c: char| c.is_ascii_uppercase())
            || locals.contains(name)
            || locals.contains(&normalize_crate_name(name))
            || manifest.is_local(name)
    }

    fn regex_candidates(&self, content: &str) -> Vec<RegexCandidate> {
        rust_candidates(content)
    }
}
