//! Cargo.toml manifest provider.

use toml::{Table, Value};

use super::{find_line, DeclaredDependency, ManifestError, ManifestProvider};

const DEPENDENCY_TABLES: &[&str] = &["dependencies", "dev-dependencies", "build-dependencies"];

/// Cargo manifest provider.
///
/// Crate names are compared with hyphens folded to underscores, which is how
/// they appear in `use` paths.
pub struct CargoManifest {
    package_names: Vec<String>,
    dependencies: Vec<DeclaredDependency>,
}

impl CargoManifest {
    pub fn parse(content: &str) -> Result<Self, ManifestError> {
        let table: Table = content.parse().map_err(|e: toml::de::Error| {
            let line = e
                .span()
                .map(|span| crate::bundle::line_of_offset(content, span.start));
            ManifestError::invalid(e.message().to_string(), line)
        })?;

        let mut dependencies = Vec::new();
        let mut package_names = Vec::new();

        for key in ["package", "lib"] {
            if let Some(name) = table
                .get(key)
                .and_then(|p| p.get("name"))
                .and_then(Value::as_str)
            {
                package_names.push(normalize_crate_name(name));
            }
        }

        for section in DEPENDENCY_TABLES {
            collect_table(content, table.get(*section), section, &mut dependencies)?;
        }

        if let Some(workspace) = table.get("workspace") {
            collect_table(content, workspace.get("dependencies"), "workspace.dependencies", &mut dependencies)?;
        }

        // [target.'cfg(unix)'.dependencies]
        if let Some(Value::Table(targets)) = table.get("target") {
            for (target, spec) in targets {
                for section in DEPENDENCY_TABLES {
                    let label = format!("target.{}.{}", target, section);
                    collect_table(content, spec.get(*section), &label, &mut dependencies)?;
                }
            }
        }

        Ok(Self {
            package_names,
            dependencies,
        })
    }
}

fn collect_table(
    content: &str,
    value: Option<&Value>,
    label: &str,
    out: &mut Vec<DeclaredDependency>,
) -> Result<(), ManifestError> {
    let Some(value) = value else {
        return Ok(());
    };
    let Value::Table(entries) = value else {
        return Err(ManifestError::invalid(format!("[{}] must be a table", label), None));
    };

    for (name, spec) in entries {
        // Renamed dependencies (`alias = { package = "real" }`) are used by alias.
        let requirement = match spec {
            Value::String(v) => v.clone(),
            Value::Table(t) => t
                .get("version")
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string(),
            _ => {
                return Err(ManifestError::invalid(
                    format!("dependency {:?} in [{}] must be a string or table", name, label),
                    find_line(content, name),
                ))
            }
        };
        out.push(DeclaredDependency {
            name: name.clone(),
            requirement,
            line: find_line(content, &format!("{} ", name))
                .or_else(|| find_line(content, &format!("{}=", name))),
        });
    }
    Ok(())
}

pub fn normalize_crate_name(name: &str) -> String {
    name.replace('-', "_")
}

impl ManifestProvider for CargoManifest {
    fn declared(&self) -> &[DeclaredDependency] {
        &self.dependencies
    }

    fn declares(&self, import_name: &str) -> bool {
        let wanted = normalize_crate_name(import_name);
        self.dependencies
            .iter()
            .any(|d| normalize_crate_name(&d.name) == wanted)
    }

    fn is_local(&self, import_name: &str) -> bool {
        let wanted = normalize_crate_name(import_name);
        self.package_names.iter().any(|n| *n == wanted)
    }
}
