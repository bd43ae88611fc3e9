use crate::bundle::GeneratedFile;
use crate::parser::SyntaxParser;
use crate::validate::imports::{extract_js_imports, ImportedDependency};
use crate::validate::manifest::Ecosystem;
use crate::validate::regex_literals::{javascript_candidates, RegexCandidate};
use crate::validate::stdlib::is_node_builtin;

use super::{Language, LanguageProfile, TypeMarker, TSCONFIG_MARKER};

/// JavaScript bundles may carry TypeScript sources alongside.
const EXTENSIONS: &[&str] = &["js", "jsx", "mjs", "cjs", "ts", "tsx"];

pub struct JavaScriptProfile;

impl LanguageProfile for JavaScriptProfile {
    fn language(&self) -> Language {
        Language::JavaScript
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

/// Grammar for a JavaScript or TypeScript file extension.
#[cfg(feature = "tree-sitter")]
pub(super) fn js_family_parser(extension: &str) -> Option<Box<dyn SyntaxParser>> {
    use crate::parser::languages::{javascript, typescript};

    match extension {
        "tsx" => Some(typescript::new_tsx_parser()),
        "ts" | "mts" | "cts" => Some(typescript::new_parser()),
        "js" | "jsx" | "mjs" | "cjs" => Some(javascript::new_parser()),
        _ => None,
    }
}

#[cfg(not(feature = "tree-sitter"))]
pub(super) fn js_family_parser(_extension: &str) -> Option<Box<dyn SyntaxParser>> {
    None
}
