use crate::bundle::GeneratedFile;
use crate::parser::SyntaxParser;
use crate::validate::imports::{extract_go_imports, extract_go_module_name, ImportedDependency};
use crate::validate::manifest::Ecosystem;
use crate::validate::regex_literals::{go_candidates, RegexCandidate};
use crate::validate::stdlib::is_go_stdlib;

use super::{Language, LanguageProfile};

pub struct GoProfile;

impl LanguageProfile for GoProfile {
    fn language(&self) -> Language {
        Language::Go
    }

    fn code_extensions(&self) -> &'static [&'static str] {
        &["go"]
    }

    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Go
    }

    #[cfg(feature = "tree-sitter")]
    fn syntax_parser(&self, extension: &str) -> Option<Box<dyn SyntaxParser>> {
        (extension == "go").then(crate::parser::languages::go::new_parser)
    }

    #[cfg(not(feature = "tree-sitter"))]
    fn syntax_parser(&self, _extension: &str) -> Option<Box<dyn SyntaxParser>> {
        None
    }

    fn extract_imports(&self, file: &GeneratedFile) -> Vec<ImportedDependency> {
        extract_go_imports(&file.content, &file.normalized_path())
    }

    fn is_builtin(&self, name: &str) -> bool {
        is_go_stdlib(name)
    }

    /// Go findings name the module, not the imported package.
    fn reported_name(&self, import: &ImportedDependency) -> String {
        extract_go_module_name(&import.name)
    }

    fn regex_candidates(&self, content: &str) -> Vec<RegexCandidate> {
        go_candidates(content)
    }
}
