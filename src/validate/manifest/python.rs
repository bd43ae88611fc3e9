//! requirements.txt manifest provider.
//!
//! Accepts the subset of pip's requirement file format that generated
//! projects use: `name[extras] <specifiers> ; <markers>`, option lines
//! (`-r`, `-e`, `--index-url`), comments, and direct URL references.

use regex::Regex;

use super::{DeclaredDependency, ManifestError, ManifestProvider};

/// Import names whose distribution name differs in a way the prefix and
/// separator rules in `import_matches_package` cannot derive.
const IMPORT_ALIASES: &[(&str, &[&str])] = &[
    ("yaml", &["pyyaml"]),
    ("PIL", &["pillow"]),
    ("cv2", &["opencv-python", "opencv-python-headless", "opencv-contrib-python"]),
    ("sklearn", &["scikit-learn"]),
    ("skimage", &["scikit-image"]),
    ("bs4", &["beautifulsoup4"]),
    ("dotenv", &["python-dotenv"]),
    ("jwt", &["pyjwt"]),
    ("dateutil", &["python-dateutil"]),
    ("jose", &["python-jose"]),
    ("multipart", &["python-multipart"]),
    ("magic", &["python-magic"]),
    ("serial", &["pyserial"]),
    ("usb", &["pyusb"]),
    ("Crypto", &["pycryptodome", "pycryptodomex"]),
    ("OpenSSL", &["pyopenssl"]),
    ("google", &["protobuf", "google-cloud-storage", "google-api-python-client", "google-generativeai"]),
    ("psycopg2", &["psycopg2-binary"]),
    ("MySQLdb", &["mysqlclient"]),
    ("attr", &["attrs"]),
    ("pkg_resources", &["setuptools"]),
    ("telegram", &["python-telegram-bot"]),
    ("discord", &["discord.py"]),
    ("docx", &["python-docx"]),
    ("pptx", &["python-pptx"]),
    ("fitz", &["pymupdf"]),
    ("git", &["gitpython"]),
    ("zmq", &["pyzmq"]),
    ("win32api", &["pywin32"]),
    ("websocket", &["websocket-client"]),
];

/// Python manifest provider backed by requirements.txt.
pub struct PythonManifest {
    dependencies: Vec<DeclaredDependency>,
}

impl PythonManifest {
    pub fn parse(content: &str) -> Result<Self, ManifestError> {
        lazy_static::lazy_static! {
            static ref REQUIREMENT_RE: Regex = Regex::new(
                r"^([A-Za-z0-9][A-Za-z0-9._-]*)\s*(?:\[[A-Za-z0-9._,\s-]*\])?\s*(.*)$"
            ).unwrap();
            static ref SPECIFIER_RE: Regex = Regex::new(
                r"^(?:(?:===|==|!=|~=|>=|<=|>|<)\s*[A-Za-z0-9.*+!_-]+\s*,?\s*)+$"
            ).unwrap();
            static ref EGG_RE: Regex = Regex::new(r"#egg=([A-Za-z0-9._-]+)").unwrap();
        }

        let mut dependencies = Vec::new();

        for (idx, raw) in content.lines().enumerate() {
            let line_no = idx + 1;
            let line = strip_options(strip_comment(raw).trim().trim_end_matches('\\').trim_end());

            if line.is_empty() || line.starts_with('-') {
                continue;
            }

            // Direct references: git+https://...#egg=name, ./local/path
            if line.contains("://") || line.starts_with('.') || line.starts_with('/') {
                if let Some(caps) = EGG_RE.captures(line) {
                    dependencies.push(DeclaredDependency {
                        name: caps[1].to_string(),
                        requirement: String::new(),
                        line: Some(line_no),
                    });
                }
                continue;
            }

            let caps = REQUIREMENT_RE
                .captures(line)
                .ok_or_else(|| invalid_line(line, line_no))?;
            let name = caps[1].to_string();
            let rest = caps.get(2).map(|m| m.as_str().trim()).unwrap_or("");

            // Environment markers and `name @ url` carry no version to judge.
            let (spec, requirement) = if let Some(idx) = rest.find(';') {
                (rest[..idx].trim(), rest[..idx].trim().to_string())
            } else if rest.starts_with('@') {
                ("", String::new())
            } else {
                (rest, rest.to_string())
            };

            if !spec.is_empty() && !SPECIFIER_RE.is_match(spec) {
                return Err(invalid_line(line, line_no));
            }

            dependencies.push(DeclaredDependency {
                name,
                requirement,
                line: Some(line_no),
            });
        }

        Ok(Self { dependencies })
    }
}

fn strip_comment(line: &str) -> &str {
    match line.find(" #").or_else(|| line.starts_with('#').then_some(0)) {
        Some(idx) => &line[..idx],
        None => line,
    }
}

/// Drop per-requirement options such as `--hash=...`.
fn strip_options(line: &str) -> &str {
    line.char_indices()
        .find(|&(i, c)| c.is_whitespace() && line[i + c.len_utf8()..].starts_with("--"))
        .map(|(i, _)| line[..i].trim_end())
        .unwrap_or(line)
}

fn invalid_line(line: &str, line_no: usize) -> ManifestError {
    ManifestError::invalid(
        format!("line {} is not a valid requirement: {:?}", line_no, line),
        Some(line_no),
    )
}

impl ManifestProvider for PythonManifest {
    fn declared(&self) -> &[DeclaredDependency] {
        &self.dependencies
    }

    fn declares(&self, import_name: &str) -> bool {
        let aliases = IMPORT_ALIASES
            .iter()
            .find(|(imp, _)| *imp == import_name)
            .map(|(_, dists)| *dists)
            .unwrap_or(&[]);

        self.dependencies.iter().any(|d| {
            let dist = d.name.to_lowercase();
            import_matches_package(import_name, &d.name)
                || aliases.iter().any(|a| normalize_package_name(a) == normalize_package_name(&dist))
        })
    }
}

/// Normalize a package name for comparison.
///
/// Converts to lowercase and normalizes separators (hyphens/underscores/dots).
pub fn normalize_package_name(name: &str) -> String {
    name.to_lowercase().replace(['-', '.'], "_")
}

/// Check if an import name matches a package name using common Python patterns.
///
/// This handles the various ways Python import names differ from package names:
/// - py prefix: `pyswitchbot` → import `switchbot`
/// - python- prefix: `python-miio` → import `miio`
/// - Namespace packages: `jaraco.abode` → import `jaraco`
/// - .py suffix: `Mastodon.py` → import `mastodon`
/// - Hyphens vs underscores: `flask-restful` → import `flask_restful`
pub fn import_matches_package(import_name: &str, package_name: &str) -> bool {
    let pkg = package_name.to_lowercase();
    let imp = import_name.to_lowercase();

    if pkg == imp {
        return true;
    }

    let imp_normalized = normalize_package_name(&imp);
    if normalize_package_name(&pkg) == imp_normalized {
        return true;
    }

    // py prefix: pyswitchbot → switchbot
    if let Some(stripped) = pkg.strip_prefix("py") {
        if normalize_package_name(stripped) == imp_normalized {
            return true;
        }
    }

    // python- prefix: python-miio → miio
    if let Some(stripped) = pkg.strip_prefix("python-") {
        if normalize_package_name(stripped) == imp_normalized {
            return true;
        }
    }

    // Namespace packages: jaraco.abode → jaraco
    if pkg.starts_with(&format!("{}.", imp)) || pkg.starts_with(&format!("{}-", imp)) {
        return true;
    }

    // -py and .py suffixes: somelib-py → somelib, Mastodon.py → mastodon
    if let Some(stripped) = pkg.strip_suffix("-py").or_else(|| pkg.strip_suffix(".py")) {
        if stripped == imp {
            return true;
        }
    }

    // Separator-free variations: evohome-async → evohomeasync
    let pkg_no_sep = pkg.replace(['-', '_', '.'], "");
    let imp_no_sep = imp.replace(['-', '_', '.'], "");
    pkg_no_sep == imp_no_sep
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_requirements() {
        let content = "\
# web stack
flask==3.0.0
requests>=2.31,<3  # http
uvicorn[standard]>=0.27.0
pydantic
-r dev-requirements.txt
--index-url https://pypi.org/simple
numpy>=1.26; python_version >= \"3.9\"
git+https://github.com/org/tool.git#egg=tool
";
        let manifest = PythonManifest::parse(content).unwrap();
        let names: Vec<&str> = manifest.declared().iter().map(|d| d.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["flask", "requests", "uvicorn", "pydantic", "numpy", "tool"]
        );

        let requests = &manifest.declared()[1];
        assert_eq!(requests.requirement, ">=2.31,<3");
        assert_eq!(requests.line, Some(3));

        let numpy = &manifest.declared()[4];
        assert_eq!(numpy.requirement, ">=1.26");
    }

    #[test]
    fn test_per_requirement_options() {
        let content = "\
flask==3.0.0 --hash=sha256:0b5387a2e2d5e2e6e6b4b4b8a3d0c7a7
requests==2.31.0 \\
    --hash=sha256:58cd2187c01e70e6e26505bca751777aa9f2ee0b7f4300988b709f44e013003f \\
    --hash=sha256:942c5a758f98d790eaed1a29cb6eefc7ffb0d1cf7af05c3d2791656dbd6ad1e1
numpy>=1.26 --config-settings=setup-args=-Dblas=openblas
";
        let manifest = PythonManifest::parse(content).unwrap();
        let declared: Vec<(&str, &str)> = manifest
            .declared()
            .iter()
            .map(|d| (d.name.as_str(), d.requirement.as_str()))
            .collect();
        assert_eq!(
            declared,
            vec![("flask", "==3.0.0"), ("requests", "==2.31.0"), ("numpy", ">=1.26")]
        );
    }

    #[test]
    fn test_invalid_requirement_line() {
        let err = PythonManifest::parse("flask==3.0.0\nrequests = 2.0\n").err().unwrap();
        assert_eq!(err.line(), Some(2));
    }

    #[test]
    fn test_json_in_requirements_is_invalid() {
        assert!(PythonManifest::parse("{\"flask\": \"3.0\"}").is_err());
    }

    #[test]
    fn test_declares_with_aliases() {
        let manifest =
            PythonManifest::parse("PyYAML==6.0.1\nbeautifulsoup4\nscikit-learn\nFlask-RESTful\n")
                .unwrap();
        assert!(manifest.declares("yaml"));
        assert!(manifest.declares("bs4"));
        assert!(manifest.declares("sklearn"));
        assert!(manifest.declares("flask_restful"));
        assert!(!manifest.declares("requests"));
    }

    #[test]
    fn test_import_matches_package() {
        assert!(import_matches_package("requests", "requests"));
        assert!(import_matches_package("switchbot", "pyswitchbot"));
        assert!(import_matches_package("miio", "python-miio"));
        assert!(import_matches_package("jaraco", "jaraco.abode"));
        assert!(import_matches_package("mastodon", "Mastodon.py"));
        assert!(import_matches_package("flask_restful", "flask-restful"));
        assert!(import_matches_package("evohomeasync", "evohome-async"));
        assert!(!import_matches_package("notrelated", "something-else"));
    }
}
