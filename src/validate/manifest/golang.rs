//! go.mod manifest provider.
//!
//! Go imports subpackages but only declares root modules in go.mod, so an
//! import is declared when it equals or lies under a required module path.

use super::{DeclaredDependency, ManifestError, ManifestProvider};

/// Directives the go command accepts in go.mod.
const KNOWN_DIRECTIVES: &[&str] = &[
    "module", "go", "toolchain", "godebug", "require", "replace", "exclude", "retract", "tool",
];

/// Go module manifest provider.
pub struct GoManifest {
    /// Root module path (e.g., "example.com/service")
    root_module: String,
    /// Required modules with their versions
    requires: Vec<DeclaredDependency>,
    /// Left-hand module paths of replace directives
    replaced: Vec<String>,
}

#[derive(Clone, Copy, PartialEq)]
enum Block {
    None,
    Require,
    Replace,
    Other,
}

impl GoManifest {
    pub fn parse(content: &str) -> Result<Self, ManifestError> {
        let mut root_module = String::new();
        let mut requires = Vec::new();
        let mut replaced = Vec::new();
        let mut block = Block::None;
        let mut block_start = 0;

        for (idx, raw) in content.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.split("//").next().unwrap_or("").trim();

            if line.is_empty() {
                continue;
            }

            if block != Block::None {
                if line == ")" {
                    block = Block::None;
                    continue;
                }
                match block {
                    Block::Require => requires.push(parse_require(line, line_no)?),
                    Block::Replace => replaced.push(parse_replace(line, line_no)?),
                    _ => {}
                }
                continue;
            }

            let mut parts = line.splitn(2, char::is_whitespace);
            let directive = parts.next().unwrap_or("");
            let rest = parts.next().unwrap_or("").trim();

            if !KNOWN_DIRECTIVES.contains(&directive) {
                return Err(ManifestError::invalid(
                    format!("unknown go.mod directive {:?} on line {}", directive, line_no),
                    Some(line_no),
                ));
            }

            if rest == "(" {
                block = match directive {
                    "require" => Block::Require,
                    "replace" => Block::Replace,
                    _ => Block::Other,
                };
                block_start = line_no;
                continue;
            }

            match directive {
                "module" => root_module = rest.trim_matches('"').to_string(),
                "require" => requires.push(parse_require(rest, line_no)?),
                "replace" => replaced.push(parse_replace(rest, line_no)?),
                _ => {}
            }
        }

        if block != Block::None {
            return Err(ManifestError::invalid(
                format!("block opened on line {} is never closed", block_start),
                Some(block_start),
            ));
        }

        if root_module.is_empty() {
            return Err(ManifestError::invalid("go.mod has no module directive", None));
        }

        Ok(Self {
            root_module,
            requires,
            replaced,
        })
    }

    pub fn root_module(&self) -> &str {
        &self.root_module
    }
}

fn parse_require(spec: &str, line_no: usize) -> Result<DeclaredDependency, ManifestError> {
    let fields: Vec<&str> = spec.split_whitespace().collect();
    if fields.len() != 2 {
        return Err(ManifestError::invalid(
            format!("require on line {} must be \"<module> <version>\"", line_no),
            Some(line_no),
        ));
    }
    Ok(DeclaredDependency {
        name: fields[0].trim_matches('"').to_string(),
        requirement: fields[1].to_string(),
        line: Some(line_no),
    })
}

fn parse_replace(spec: &str, line_no: usize) -> Result<String, ManifestError> {
    match spec.split_once("=>") {
        Some((from, _)) => Ok(from
            .split_whitespace()
            .next()
            .unwrap_or("")
            .trim_matches('"')
            .to_string()),
        None => Err(ManifestError::invalid(
            format!("replace on line {} is missing \"=>\"", line_no),
            Some(line_no),
        )),
    }
}

fn is_under(import_path: &str, module: &str) -> bool {
    !module.is_empty()
        && (import_path == module || import_path.starts_with(&format!("{}/", module)))
}

impl ManifestProvider for GoManifest {
    fn declared(&self) -> &[DeclaredDependency] {
        &self.requires
    }

    fn declares(&self, import_name: &str) -> bool {
        self.requires.iter().any(|r| is_under(import_name, &r.name))
            || self.replaced.iter().any(|r| is_under(import_name, r))
    }

    fn is_local(&self, import_name: &str) -> bool {
        is_under(import_name, &self.root_module)
    }
}
