//! Generated file bundles.

use serde::{Deserialize, Serialize};

/// One file of a generated bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedFile {
    pub path: String,
    pub content: String,
}

impl GeneratedFile {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    /// Path with `./` prefixes and backslashes normalized away.
    pub fn normalized_path(&self) -> String {
        normalize_path(&self.path)
    }

    /// Final path component.
    pub fn file_name(&self) -> &str {
        file_name(&self.path)
    }

    /// Lowercased extension without the dot, or "" when there is none.
    pub fn extension(&self) -> String {
        extension(&self.path)
    }

    /// Number of path components; the bundle root has depth 1.
    pub fn depth(&self) -> usize {
        self.normalized_path().split('/').filter(|s| !s.is_empty()).count()
    }
}

/// Normalize a bundle path for comparison.
pub fn normalize_path(path: &str) -> String {
    let mut p = path.trim().replace('\\', "/");
    while let Some(rest) = p.strip_prefix("./") {
        p = rest.to_string();
    }
    p.trim_start_matches('/').to_string()
}

pub fn file_name(path: &str) -> &str {
    path.rsplit(|c| c == '/' || c == '\\').next().unwrap_or(path)
}

pub fn extension(path: &str) -> String {
    let name = file_name(path);
    match name.rfind('.') {
        Some(idx) if idx > 0 => name[idx + 1..].to_lowercase(),
        _ => String::new(),
    }
}

/// 1-based line number of a byte offset in `content`.
pub fn line_of_offset(content: &str, offset: usize) -> usize {
    let end = offset.min(content.len());
    content.as_bytes()[..end].iter().filter(|&&b| b == b'\n').count() + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("./src/index.ts"), "src/index.ts");
        assert_eq!(normalize_path("src\\lib\\a.py"), "src/lib/a.py");
        assert_eq!(normalize_path("././a.go"), "a.go");
        assert_eq!(normalize_path("/abs.rs"), "abs.rs");
    }

    #[test]
    fn test_extension() {
        assert_eq!(extension("src/App.TSX"), "tsx");
        assert_eq!(extension("Makefile"), "");
        assert_eq!(extension(".gitignore"), "");
        assert_eq!(extension("a/b.c/d"), "");
    }

    #[test]
    fn test_depth() {
        assert_eq!(GeneratedFile::new("package.json", "").depth(), 1);
        assert_eq!(GeneratedFile::new("./web/package.json", "").depth(), 2);
    }

    #[test]
    fn test_line_of_offset() {
        let content = "a\nb\nc";
        assert_eq!(line_of_offset(content, 0), 1);
        assert_eq!(line_of_offset(content, 2), 2);
        assert_eq!(line_of_offset(content, 4), 3);
        assert_eq!(line_of_offset(content, 999), 3);
    }
}
