//! Bundlecheck - static validation gate for AI-generated source bundles.
//!
//! A bundle is the set of files produced by one generation request. Before
//! it is deployed, bundlecheck runs it through four layers and reports every
//! problem it finds along with a confidence score:
//!
//! - syntax: tree-sitter parsing per file, with a bracket fallback, plus
//!   regex literal and double-escaping checks
//! - dependency: imports versus the language's manifest, and implausible
//!   declared versions
//! - structure: duplicate paths, empty and placeholder files, missing configs
//! - pattern: a catalog of regex signatures for unfinished code
//!
//! # Architecture
//!
//! - `bundle`: the `GeneratedFile` input type
//! - `languages`: per-language profiles behind the closed `Language` enum
//! - `parser`: tree-sitter syntax parsers
//! - `validate`: the layers and the `Validator` that runs them
//! - `catalog`: the built-in anti-pattern tables
//! - `policy`: YAML-loadable thresholds and extra patterns
//! - `score`: confidence calculation
//! - `report`: output formatting (pretty, JSON)
//!
//! # Adding a New Language
//!
//! Implement `LanguageProfile` in `src/languages/`, add a `Language` variant,
//! and give it a catalog table in `catalog.rs`.

pub mod bundle;
pub mod catalog;
pub mod cli;
pub mod languages;
pub mod parser;
pub mod policy;
pub mod report;
pub mod score;
pub mod validate;

pub use bundle::GeneratedFile;
pub use languages::{Language, LanguageProfile, ParseLanguageError};
pub use policy::{Policy, PolicyError};
pub use validate::{
    validate, CancellationToken, ErrorKind, LayerError, Severity, ValidationError,
    ValidationResult, Validator,
};
