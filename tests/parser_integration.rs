//! Integration tests for parse-only syntax checking.
//!
//! These go through the language profiles, so they also cover the
//! extension-to-grammar mapping.

use bundlecheck::bundle::GeneratedFile;
use bundlecheck::parser::parsers_available;
use bundlecheck::{ErrorKind, Language, Policy, Severity, Validator};

fn syntax_findings(path: &str, source: &str, language: Language) -> Vec<bundlecheck::ValidationError> {
    let files = vec![GeneratedFile::new(path, source)];
    Validator::new(Policy::default())
        .expect("default policy should be valid")
        .validate(&files, language)
        .of_kind(ErrorKind::SyntaxError)
        .into_iter()
        .cloned()
        .collect()
}

// =============================================================================
// Grammar selection
// =============================================================================

#[test]
#[cfg(feature = "tree-sitter")]
fn test_parser_per_extension() {
    let cases = [
        (Language::JavaScript, "js", "javascript"),
        (Language::JavaScript, "mjs", "javascript"),
        (Language::JavaScript, "tsx", "tsx"),
        (Language::TypeScript, "ts", "typescript"),
        (Language::TypeScript, "tsx", "tsx"),
        (Language::Python, "py", "python"),
        (Language::Go, "go", "go"),
        (Language::Rust, "rs", "rust"),
    ];
    for (language, ext, grammar) in cases {
        let parser = language
            .profile()
            .syntax_parser(ext)
            .unwrap_or_else(|| panic!("{} should have a parser for .{}", language, ext));
        assert_eq!(parser.grammar(), grammar);
    }
    assert!(parsers_available());
}

#[test]
fn test_no_parser_for_data_files() {
    assert!(Language::Python.profile().syntax_parser("json").is_none());
    assert!(Language::Rust.profile().syntax_parser("toml").is_none());
}

// =============================================================================
// Valid sources
// =============================================================================

#[test]
fn test_valid_sources_have_no_findings() {
    let cases = [
        (
            "src/server.ts",
            "interface User {\n  id: number;\n  name: string;\n}\n\nexport function label(u: User): string {\n  return `${u.id}: ${u.name}`;\n}\n",
            Language::TypeScript,
        ),
        (
            "src/App.jsx",
            "export function App() {\n  return <div className=\"app\">Hello</div>;\n}\n",
            Language::JavaScript,
        ),
        (
            "app.py",
            "class Store:\n    def __init__(self):\n        self.items = {}\n\n    def get(self, key):\n        return self.items.get(key)\n",
            Language::Python,
        ),
        (
            "main.go",
            "package main\n\nimport \"os\"\n\nfunc main() {\n\tif len(os.Args) > 1 {\n\t\tos.Exit(1)\n\t}\n}\n",
            Language::Go,
        ),
        (
            "src/lib.rs",
            "pub struct Counter {\n    n: u64,\n}\n\nimpl Counter {\n    pub fn bump(&mut self) -> u64 {\n        self.n += 1;\n        self.n\n    }\n}\n",
            Language::Rust,
        ),
    ];
    for (path, source, language) in cases {
        let findings = syntax_findings(path, source, language);
        assert!(findings.is_empty(), "{}: {:?}", path, findings);
    }
}

// =============================================================================
// Broken sources
// =============================================================================

#[test]
fn test_broken_sources_reported_as_critical() {
    let cases = [
        ("index.js", "function run() {\n  return [1, 2;\n}\n", Language::JavaScript),
        ("app.py", "def run(:\n    return 1\n", Language::Python),
        ("main.go", "package main\n\nfunc main() {\n\tx := (1 + 2\n}\n", Language::Go),
        ("src/main.rs", "fn main() {\n    let x = (1 + 2;\n}\n", Language::Rust),
    ];
    for (path, source, language) in cases {
        let findings = syntax_findings(path, source, language);
        assert!(!findings.is_empty(), "{} should have a syntax finding", path);
        for f in &findings {
            assert_eq!(f.severity, Severity::Critical);
            assert_eq!(f.file, path);
            let line = f.line.expect("syntax findings carry a line");
            assert!(line >= 1 && line <= source.lines().count());
        }
    }
}

#[test]
fn test_invalid_regex_literal() {
    let source = "const DIGITS = /[9-0]+/;\n\nexport function digits(s) {\n  return DIGITS.test(s);\n}\n";
    let files = vec![GeneratedFile::new("digits.js", source)];
    let result = Validator::new(Policy::default())
        .unwrap()
        .validate(&files, Language::JavaScript);

    let found = result.of_kind(ErrorKind::RegexSyntaxError);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].line, Some(1));
    assert_eq!(found[0].severity, Severity::Critical);
    assert!(!result.has_kind(ErrorKind::SyntaxError));
}

#[test]
fn test_double_escaped_python() {
    // A whole module written on one line with literal `\n` sequences
    let source = "import os\\nimport sys\\ndef main():\\n    x = 1\\n    y = 2\\n    return x + y\\nmain()\\n";
    let files = vec![
        GeneratedFile::new("requirements.txt", "flask==3.0.0\n"),
        GeneratedFile::new("generated.py", source),
    ];
    let result = Validator::new(Policy::default())
        .unwrap()
        .validate(&files, Language::Python);

    let found = result.of_kind(ErrorKind::JsonEscapingError);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].severity, Severity::High);
    assert_eq!(found[0].file, "generated.py");
}

#[test]
fn test_unicode_regex_escapes_accepted() {
    let bundles = [
        (
            vec![
                GeneratedFile::new("package.json", "{\"name\": \"words\"}"),
                GeneratedFile::new(
                    "words.js",
                    "export const WORD = /\\p{L}+/u;\nexport const SMILE = /\\u{1F600}/u;\n",
                ),
            ],
            Language::JavaScript,
        ),
        (
            vec![
                GeneratedFile::new("Cargo.toml", "[package]\nname = \"greek\"\n\n[dependencies]\nregex = \"1\"\n"),
                GeneratedFile::new(
                    "src/lib.rs",
                    "use regex::Regex;\n\npub fn greek() -> Regex {\n    Regex::new(r\"\\p{Greek}+\").unwrap()\n}\n",
                ),
            ],
            Language::Rust,
        ),
        (
            vec![
                GeneratedFile::new("go.mod", "module example.com/han\n\ngo 1.22\n"),
                GeneratedFile::new(
                    "han.go",
                    "package han\n\nimport \"regexp\"\n\nvar Han = regexp.MustCompile(`\\p{Han}+`)\n",
                ),
            ],
            Language::Go,
        ),
    ];
    let v = Validator::new(Policy::default()).unwrap();
    for (files, language) in bundles {
        let result = v.validate(&files, language);
        assert!(
            !result.has_kind(ErrorKind::RegexSyntaxError),
            "{}: {:?}",
            language,
            result.of_kind(ErrorKind::RegexSyntaxError)
        );
    }
}
