use crate::bundle::GeneratedFile;
use crate::parser::SyntaxParser;
use crate::validate::imports::{extract_js_imports, ImportedDependency};
use crate::validate::manifest::Ecosystem;
use crate::validate::regex_literals::{javascript_candidates, RegexCandidate};
use crate::validate::stdlib::is_node_builtin;

use super::javascript::js_family_parser;
use super::{Language, LanguageProfile, TypeMarker, TSCONFIG_MARKER};

const EXTENSIONS: &[&str] = &["ts", "tsx", "mts", "cts", "js", "jsx", "mjs", "cjs"];

pub struct TypeScriptProfile;

impl LanguageProfile for TypeScriptProfile {
    fn language(&self) -> Language {
        Language::TypeScript
    }

    fn code_extensions(&self) -> &'static [&'static str] {
        EXTENSIONS
    }

    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Npm
    }

    fn type_marker(&self) -> Option<TypeMarker> {
        Some(TSCONFIG_MARKER)
    }

    fn syntax_parser(&self, extension: &str) -> Option<Box<dyn SyntaxParser>> {
        js_family_parser(extension)
    }

    fn extract_imports(&self, file: &GeneratedFile) -> Vec<ImportedDependency> {
        extract_js_imports(&file.content, &file.normalized_path())
    }

    fn is_builtin(&self, name: &str) -> bool {
        is_node_builtin(name)
    }

    fn regex_candidates(&self, content: &str) -> Vec<RegexCandidate> {
        javascript_candidates(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_files() {
        for path in ["a.ts", "b.tsx", "c.mts", "d.js"] {
            assert!(TypeScriptProfile.is_code_file(&GeneratedFile::new(path, "")), "{}", path);
        }
        assert!(!TypeScriptProfile.is_code_file(&GeneratedFile::new("tsconfig.json", "")));
    }

    #[test]
    fn test_type_only_import_counts() {
        let file = GeneratedFile::new("src/a.ts", "import type { Request } from 'express';\n");
        let imports = TypeScriptProfile.extract_imports(&file);
        assert_eq!(imports.len(), 1);
        assert_eq!(imports[0].name, "express");
    }
}
