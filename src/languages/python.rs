use std::collections::HashSet;

use crate::bundle::GeneratedFile;
use crate::parser::SyntaxParser;
use crate::validate::imports::{extract_python_imports, ImportedDependency};
use crate::validate::manifest::Ecosystem;
use crate::validate::regex_literals::{python_candidates, RegexCandidate};
use crate::validate::stdlib::is_python_stdlib;

use super::{Language, LanguageProfile};

pub struct PythonProfile;

impl LanguageProfile for PythonProfile {
    fn language(&self) -> Language {
        Language::Python
    }

    fn code_extensions(&self) -> &'static [&'static str] {
        &["py"]
    }

    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::PyPI
    }

    #[cfg(feature = "tree-sitter")]
    fn syntax_parser(&self, extension: &str) -> Option<Box<dyn SyntaxParser>> {
        (extension == "py").then(crate::parser::languages::python::new_parser)
    }

    #[cfg(not(feature = "tree-sitter"))]
    fn syntax_parser(&self, _extension: &str) -> Option<Box<dyn SyntaxParser>> {
        None
    }

    fn extract_imports(&self, file: &GeneratedFile) -> Vec<ImportedDependency> {
        extract_python_imports(&file.content, &file.normalized_path())
    }

    fn is_builtin(&self, name: &str) -> bool {
        is_python_stdlib(name)
    }

    /// Every directory and module stem in the bundle is importable, since
    /// scripts may run from any package directory.
    fn local_modules(&self, files: &[GeneratedFile]) -> HashSet<String> {
        let mut locals = HashSet::new();
        for file in files.iter().filter(|f| f.extension() == "py") {
            let path = file.normalized_path();
            let mut parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();
            if let Some(name) = parts.pop() {
                locals.insert(name.trim_end_matches(".py").to_string());
            }
            locals.extend(parts.into_iter().map(str::to_string));
        }
        locals
    }

    fn regex_candidates(&self, content: &str) -> Vec<RegexCandidate> {
        python_candidates(content)
    }
}
