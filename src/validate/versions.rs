//! Version plausibility for declared dependencies.
//!
//! Only the first concrete version in a requirement is judged. Requirements
//! that name no version (`*`, `latest`, URLs, paths, workspace references)
//! are left alone.

use regex::Regex;

use crate::policy::VersionPolicy;

use super::manifest::DeclaredDependency;
use super::{ErrorKind, Severity, ValidationError};

/// Prefixes of requirements that resolve to something other than a registry version.
const NON_REGISTRY_PREFIXES: &[&str] = &[
    "git", "http:", "https:", "file:", "link:", "workspace:", "npm:", "github:", "portal:",
    "patch:",
];

/// A concrete version found in a requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConcreteVersion {
    pub major: u64,
    /// Version text without a leading `v`.
    pub text: String,
}

/// First concrete version in `requirement`, if it names one.
pub fn first_version(requirement: &str) -> Option<ConcreteVersion> {
    lazy_static::lazy_static! {
        static ref VERSION_RE: Regex = Regex::new(
            r"(\d+)(?:\.(?:\d+|[xX*]))?(?:\.(?:\d+|[xX*]))?(?:-[0-9A-Za-z.-]+)?"
        ).unwrap();
    }

    let req = requirement.trim();
    let lower = req.to_lowercase();
    if req.is_empty()
        || req == "*"
        || lower == "latest"
        || req.contains('/')
        || NON_REGISTRY_PREFIXES.iter().any(|p| lower.starts_with(p))
    {
        return None;
    }

    let m = VERSION_RE.captures(req)?;
    let major = m[1].parse::<u64>().unwrap_or(u64::MAX);
    Some(ConcreteVersion {
        major,
        text: m[0].to_string(),
    })
}

/// Judge one declared dependency against the ecosystem policy.
pub fn check_version(
    manifest_path: &str,
    dep: &DeclaredDependency,
    policy: &VersionPolicy,
) -> Option<ValidationError> {
    let version = first_version(&dep.requirement)?;

    let err = if policy.is_known_bad(&dep.name, &version.text) {
        ValidationError::new(
            Severity::High,
            ErrorKind::InvalidDependencyVersion,
            manifest_path,
            format!("{}@{} is a known-bad release", dep.name, version.text),
        )
        .with_fix(format!("Pin a different version of '{}'", dep.name))
    } else if version.major > policy.max_major && !policy.is_allowed(&dep.name) {
        ValidationError::new(
            Severity::High,
            ErrorKind::InvalidDependencyVersion,
            manifest_path,
            format!(
                "Implausible version \"{}\" for '{}': major version {} is above {}",
                dep.requirement, dep.name, version.major, policy.max_major
            ),
        )
        .with_fix(format!("Use a published version of '{}'", dep.name))
    } else {
        return None;
    };

    Some(match dep.line {
        Some(line) => err.at_line(line),
        None => err,
    })
}
