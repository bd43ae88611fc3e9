//! Policy definitions for bundlecheck.
//!
//! A policy holds the tunable data behind the heuristics: version ceilings
//! and allow-lists per ecosystem, known-bad releases, placeholder filenames,
//! extra anti-patterns, and the worker count. Every field has a default, so
//! a policy file only needs the keys it overrides.

use globset::Glob;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::validate::{Ecosystem, Severity};

/// Top-level policy definition.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Policy {
    /// Worker threads for per-file checks; 0 means one per available core.
    pub workers: usize,
    /// A file is flagged as double-escaped when it has more escaped control
    /// sequences than this.
    pub escape_threshold: usize,
    /// Glob patterns for filenames that are placeholder artifacts.
    pub placeholder_files: Vec<String>,
    /// Extra anti-patterns appended after the built-in catalogs.
    pub anti_patterns: Vec<CustomPattern>,
    /// Version plausibility rules per ecosystem.
    pub versions: VersionPolicies,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            workers: 0,
            escape_threshold: 5,
            placeholder_files: default_placeholder_files(),
            anti_patterns: Vec::new(),
            versions: VersionPolicies::default(),
        }
    }
}

impl Policy {
    /// Parse a policy from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse a policy from YAML text.
    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let policy: Policy = serde_yaml::from_str(content)?;
        Ok(policy)
    }

    /// Render the policy as YAML.
    pub fn to_yaml(&self) -> anyhow::Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Number of worker threads to use for this machine.
    pub fn worker_count(&self) -> usize {
        if self.workers > 0 {
            return self.workers;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }
}

/// A user-supplied anti-pattern.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CustomPattern {
    pub pattern: String,
    #[serde(default = "default_custom_severity")]
    pub severity: Severity,
    pub message: String,
    #[serde(default)]
    pub fix: Option<String>,
}

fn default_custom_severity() -> Severity {
    Severity::Medium
}

/// Version rules for every ecosystem.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct VersionPolicies {
    pub npm: VersionPolicy,
    pub pypi: VersionPolicy,
    pub go: VersionPolicy,
    pub crates: VersionPolicy,
}

impl VersionPolicies {
    pub fn for_ecosystem(&self, ecosystem: Ecosystem) -> &VersionPolicy {
        match ecosystem {
            Ecosystem::Npm => &self.npm,
            Ecosystem::PyPI => &self.pypi,
            Ecosystem::Go => &self.go,
            Ecosystem::Crates => &self.crates,
        }
    }
}

impl Default for VersionPolicies {
    fn default() -> Self {
        Self {
            npm: VersionPolicy::new(
                25,
                &[
                    "electron", "electron-builder", "@electron/*", "puppeteer", "puppeteer-core",
                    "chromedriver", "@types/node", "jest", "ts-jest", "babel-jest",
                    "jest-environment-jsdom", "@types/jest", "@jest/*", "jsdom", "googleapis",
                    "stripe", "@octokit/*", "nx", "@nx/*", "@angular/*",
                ],
                &[
                    "colors@1.4.1", "colors@1.4.2", "faker@6.6.6", "event-stream@3.3.6",
                    "flatmap-stream@0.1.1", "ua-parser-js@0.7.29", "ua-parser-js@0.8.0",
                    "ua-parser-js@1.0.0", "node-ipc@10.1.1", "node-ipc@10.1.2", "coa@2.0.3",
                    "rc@1.2.9", "eslint-scope@3.7.2",
                ],
            ),
            pypi: VersionPolicy::new(
                30,
                &[
                    "setuptools", "pip", "certifi", "pytz", "tzdata", "attrs", "black",
                    "cryptography", "regex", "yt-dlp", "fsspec", "s3fs", "gcsfs", "dask",
                    "distributed", "xarray", "pyinstaller-hooks-contrib",
                ],
                &["ctx@0.2.2", "ctx@0.2.6", "ultralytics@8.3.41", "ultralytics@8.3.42"],
            ),
            go: VersionPolicy::new(
                20,
                &[
                    "github.com/docker/docker", "github.com/docker/cli",
                    "github.com/Azure/azure-sdk-for-go",
                ],
                &[],
            ),
            crates: VersionPolicy::new(10, &["wasmtime", "wasmtime-*", "wiggle", "v8"], &[]),
        }
    }
}

/// Version rules for one ecosystem.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct VersionPolicy {
    /// Highest plausible major version.
    pub max_major: u64,
    /// Packages exempt from the ceiling. A trailing `*` matches a prefix.
    #[serde(default)]
    pub allow: Vec<String>,
    /// Releases that must not be used, as `name@version`.
    #[serde(default)]
    pub known_bad: Vec<String>,
}

impl VersionPolicy {
    fn new(max_major: u64, allow: &[&str], known_bad: &[&str]) -> Self {
        Self {
            max_major,
            allow: allow.iter().map(|s| s.to_string()).collect(),
            known_bad: known_bad.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Whether `package` is exempt from the major-version ceiling.
    pub fn is_allowed(&self, package: &str) -> bool {
        let package = package.to_lowercase();
        self.allow.iter().any(|entry| {
            let entry = entry.to_lowercase();
            match entry.strip_suffix('*') {
                Some(prefix) => package.starts_with(prefix),
                None => package == entry,
            }
        })
    }

    /// Whether `package@version` is on the known-bad list.
    pub fn is_known_bad(&self, package: &str, version: &str) -> bool {
        let package = package.to_lowercase();
        self.known_bad.iter().any(|entry| match entry.rsplit_once('@') {
            Some((name, bad)) => name.to_lowercase() == package && bad == version,
            None => false,
        })
    }
}

fn default_placeholder_files() -> Vec<String> {
    [
        "**/placeholder",
        "**/placeholder.*",
        "**/untitled",
        "**/untitled.*",
        "**/untitled-*",
        "**/dummy.*",
        "**/your-file-here*",
        "**/your_file_here*",
        "**/filename.*",
        "**/file-name.*",
        "**/new-file.*",
        "**/newfile.*",
        "**/example-file.*",
        "**/TODO.txt",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Invalid policy contents.
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    #[error("anti-pattern {pattern:?} does not compile: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("placeholder glob {pattern:?} is invalid: {source}")]
    InvalidGlob {
        pattern: String,
        #[source]
        source: globset::Error,
    },
    #[error("anti-pattern {pattern:?} has an empty message")]
    EmptyMessage { pattern: String },
    #[error("could not start {workers} worker threads: {message}")]
    WorkerPool { workers: usize, message: String },
}

/// Check that every pattern and glob in the policy compiles.
pub fn validate(policy: &Policy) -> Result<(), PolicyError> {
    for p in &policy.anti_patterns {
        Regex::new(&p.pattern).map_err(|source| PolicyError::InvalidPattern {
            pattern: p.pattern.clone(),
            source,
        })?;
        if p.message.trim().is_empty() {
            return Err(PolicyError::EmptyMessage {
                pattern: p.pattern.clone(),
            });
        }
    }

    for g in &policy.placeholder_files {
        Glob::new(g).map_err(|source| PolicyError::InvalidGlob {
            pattern: g.clone(),
            source,
        })?;
    }

    Ok(())
}
