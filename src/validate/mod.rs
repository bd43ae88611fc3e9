//! The validation pipeline.
//!
//! Layers run in a fixed order: syntax, dependency, structure, pattern.
//! Each produces `ValidationError` findings; the runner merges them into
//! one `ValidationResult`.

mod cancel;
pub mod dependencies;
pub mod escaping;
pub mod fallback;
pub mod imports;
pub mod manifest;
pub mod patterns;
pub mod regex_literals;
mod runner;
pub mod stdlib;
pub mod structure;
pub mod syntax;
mod types;
pub mod versions;

pub use cancel::CancellationToken;
pub use imports::ImportedDependency;
pub use manifest::{Ecosystem, ManifestError, ManifestProvider};
pub use runner::{validate, Validator};
pub use types::{ErrorKind, LayerError, Severity, ValidationError, ValidationResult};
