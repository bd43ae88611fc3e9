//! package.json manifest provider.

use serde_json::Value;

use super::{find_line, DeclaredDependency, ManifestError, ManifestProvider};

/// Sections whose keys are installable packages.
const DEPENDENCY_SECTIONS: &[&str] = &[
    "dependencies",
    "devDependencies",
    "peerDependencies",
    "optionalDependencies",
];

/// npm manifest provider.
///
/// Imports must match a declared package name exactly; `@types/x` does not
/// satisfy an import of `x`.
pub struct NpmManifest {
    name: Option<String>,
    dependencies: Vec<DeclaredDependency>,
}

impl NpmManifest {
    pub fn parse(content: &str) -> Result<Self, ManifestError> {
        let value: Value = serde_json::from_str(content).map_err(|e| ManifestError::InvalidJson {
            message: e.to_string(),
            line: Some(e.line()).filter(|&l| l > 0),
        })?;

        let Value::Object(root) = value else {
            return Err(ManifestError::InvalidJson {
                message: "top-level value must be an object".to_string(),
                line: Some(1),
            });
        };

        let mut dependencies = Vec::new();
        for section in DEPENDENCY_SECTIONS {
            let Some(entries) = root.get(*section) else {
                continue;
            };
            let Value::Object(entries) = entries else {
                return Err(ManifestError::InvalidJson {
                    message: format!("\"{}\" must be an object", section),
                    line: find_line(content, &format!("\"{}\"", section)),
                });
            };

            for (name, requirement) in entries {
                dependencies.push(DeclaredDependency {
                    name: name.clone(),
                    requirement: requirement.as_str().unwrap_or("").to_string(),
                    line: find_line(content, &format!("\"{}\"", name)),
                });
            }
        }

        Ok(Self {
            name: root.get("name").and_then(Value::as_str).map(str::to_string),
            dependencies,
        })
    }
}

impl ManifestProvider for NpmManifest {
    fn declared(&self) -> &[DeclaredDependency] {
        &self.dependencies
    }

    fn declares(&self, import_name: &str) -> bool {
        self.dependencies.iter().any(|d| d.name == import_name)
    }

    fn is_local(&self, import_name: &str) -> bool {
        self.name.as_deref() == Some(import_name)
    }
}
