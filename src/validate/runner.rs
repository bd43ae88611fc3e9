//! Validation runner that orchestrates all layers.

use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use globset::GlobSet;
use once_cell::sync::Lazy;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, info, warn};

use crate::bundle::GeneratedFile;
use crate::catalog::{self, CompiledPattern};
use crate::languages::{Language, LanguageProfile};
use crate::policy::{self, Policy, PolicyError};
use crate::score::{confidence, SeverityCounts};

use super::cancel::CancellationToken;
use super::dependencies::check_dependencies;
use super::patterns::scan_file;
use super::structure::{build_placeholder_set, check_structure};
use super::syntax::check_file;
use super::{ErrorKind, LayerError, Severity, ValidationError, ValidationResult};

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layer {
    Syntax,
    Dependency,
    Structure,
    Pattern,
}

impl Layer {
    const ALL: [Layer; 4] = [Layer::Syntax, Layer::Dependency, Layer::Structure, Layer::Pattern];

    fn name(&self) -> &'static str {
        match self {
            Layer::Syntax => "syntax",
            Layer::Dependency => "dependency",
            Layer::Structure => "structure",
            Layer::Pattern => "pattern",
        }
    }
}

/// Runs the validation layers over generated bundles.
///
/// A validator owns its worker pool and compiled policy data, so build one
/// and reuse it across calls.
pub struct Validator {
    policy: Policy,
    pool: ThreadPool,
    placeholders: GlobSet,
    extra_patterns: Vec<CompiledPattern>,
}

impl Validator {
    /// Create a validator, compiling the policy's patterns and globs.
    pub fn new(policy: Policy) -> Result<Self, PolicyError> {
        policy::validate(&policy)?;

        let extra_patterns = policy
            .anti_patterns
            .iter()
            .map(|p| {
                CompiledPattern::from_custom(p).map_err(|source| PolicyError::InvalidPattern {
                    pattern: p.pattern.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let placeholders = build_placeholder_set(&policy.placeholder_files)?;

        let workers = policy.worker_count();
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("bundlecheck-{}", i))
            .build()
            .map_err(|e| PolicyError::WorkerPool {
                workers,
                message: e.to_string(),
            })?;

        debug!(workers, extra_patterns = extra_patterns.len(), "validator ready");

        Ok(Self {
            policy,
            pool,
            placeholders,
            extra_patterns,
        })
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Validate a bundle declared as `language`.
    pub fn validate(&self, files: &[GeneratedFile], language: Language) -> ValidationResult {
        self.validate_with(files, language.profile(), &CancellationToken::new())
    }

    /// Validate a bundle whose language is given as a tag such as "ts" or
    /// "python". An unknown tag yields a single `validation_error`.
    pub fn validate_tagged(&self, files: &[GeneratedFile], tag: &str) -> ValidationResult {
        let start = Instant::now();
        match tag.parse::<Language>() {
            Ok(language) => self.validate(files, language),
            Err(e) => {
                warn!(tag, "unknown language tag");
                failure_result(e.to_string(), start, files.len())
            }
        }
    }

    /// Validate with a cancellation token checked between layers.
    pub fn validate_cancellable(
        &self,
        files: &[GeneratedFile],
        language: Language,
        token: &CancellationToken,
    ) -> ValidationResult {
        self.validate_with(files, language.profile(), token)
    }

    /// Validate using a custom language profile.
    pub fn validate_with(
        &self,
        files: &[GeneratedFile],
        profile: &dyn LanguageProfile,
        token: &CancellationToken,
    ) -> ValidationResult {
        let start = Instant::now();
        let language = profile.language();

        let result = match self.run_layers(files, profile, token) {
            Ok((findings, complete)) => build_result(findings, complete, start, files.len()),
            Err(e) => {
                warn!(%language, error = %e, "validation failed");
                failure_result(format!("Validation failed: {}", e), start, files.len())
            }
        };

        info!(
            %language,
            files = files.len(),
            valid = result.is_valid,
            complete = result.complete,
            confidence = result.confidence,
            errors = result.errors.len(),
            warnings = result.warnings.len(),
            duration_ms = result.duration_ms,
            "validation finished"
        );
        result
    }

    fn run_layers(
        &self,
        files: &[GeneratedFile],
        profile: &dyn LanguageProfile,
        token: &CancellationToken,
    ) -> Result<(Vec<ValidationError>, bool), LayerError> {
        let mut findings = Vec::new();

        for layer in Layer::ALL {
            if token.is_cancelled() {
                warn!(before = layer.name(), "validation cancelled");
                return Ok((findings, false));
            }

            let found = guard(layer, || self.run_layer(layer, files, profile))?;
            debug!(layer = layer.name(), findings = found.len(), "layer finished");
            findings.extend(found);
        }

        Ok((findings, true))
    }

    fn run_layer(
        &self,
        layer: Layer,
        files: &[GeneratedFile],
        profile: &dyn LanguageProfile,
    ) -> Vec<ValidationError> {
        match layer {
            Layer::Syntax => {
                let threshold = self.policy.escape_threshold;
                self.per_file(files, |f| check_file(f, profile, threshold))
            }
            Layer::Dependency => {
                let imports = self.per_file(files, |f| {
                    if profile.is_code_file(f) {
                        profile.extract_imports(f)
                    } else {
                        Vec::new()
                    }
                });
                check_dependencies(files, profile, &self.policy.versions, &imports)
            }
            Layer::Structure => check_structure(files, profile, &self.placeholders),
            Layer::Pattern => {
                let catalog = catalog::compiled(profile.language());
                self.per_file(files, |f| scan_file(f, profile, catalog, &self.extra_patterns))
            }
        }
    }

    /// Apply `check` to every file on the worker pool, keeping bundle order.
    fn per_file<T, F>(&self, files: &[GeneratedFile], check: F) -> Vec<T>
    where
        T: Send,
        F: Fn(&GeneratedFile) -> Vec<T> + Sync,
    {
        let mut tagged: Vec<(usize, Vec<T>)> = self.pool.install(|| {
            files
                .par_iter()
                .enumerate()
                .map(|(idx, file)| (idx, check(file)))
                .collect()
        });
        tagged.sort_by_key(|(idx, _)| *idx);
        tagged.into_iter().flat_map(|(_, found)| found).collect()
    }
}

/// Shared validator for the default policy, built on first use.
static DEFAULT_VALIDATOR: Lazy<Result<Validator, String>> =
    Lazy::new(|| Validator::new(Policy::default()).map_err(|e| e.to_string()));

/// Validate a bundle with the default policy.
pub fn validate(files: &[GeneratedFile], language: Language) -> ValidationResult {
    match DEFAULT_VALIDATOR.as_ref() {
        Ok(validator) => validator.validate(files, language),
        Err(e) => {
            warn!(error = %e, "default validator unavailable");
            failure_result(format!("Validation failed: {}", e), Instant::now(), files.len())
        }
    }
}

/// Run a layer, turning a panic into a `LayerError`.
fn guard<F>(layer: Layer, run: F) -> Result<Vec<ValidationError>, LayerError>
where
    F: FnOnce() -> Vec<ValidationError>,
{
    panic::catch_unwind(AssertUnwindSafe(run)).map_err(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        LayerError::Panicked {
            layer: layer.name(),
            message,
        }
    })
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

fn build_result(
    findings: Vec<ValidationError>,
    complete: bool,
    start: Instant,
    files_checked: usize,
) -> ValidationResult {
    let counts = SeverityCounts::from_findings(&findings);
    let (mut errors, mut warnings): (Vec<_>, Vec<_>) =
        findings.into_iter().partition(|f| f.severity.is_error());

    // Stable sorts keep layer, file, and line order within a severity.
    errors.sort_by(|a, b| b.severity.cmp(&a.severity));
    warnings.sort_by(|a, b| b.severity.cmp(&a.severity));

    ValidationResult {
        is_valid: counts.critical == 0,
        errors,
        warnings,
        duration_ms: elapsed_ms(start),
        confidence: confidence(&counts),
        complete,
        files_checked,
    }
}

fn failure_result(message: String, start: Instant, files_checked: usize) -> ValidationResult {
    ValidationResult {
        is_valid: false,
        errors: vec![ValidationError::new(
            Severity::Critical,
            ErrorKind::ValidationError,
            "",
            message,
        )],
        warnings: Vec::new(),
        duration_ms: elapsed_ms(start),
        confidence: 0.0,
        complete: true,
        files_checked,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> Validator {
        Validator::new(Policy {
            workers: 2,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_layer_order_within_severity() {
        let files = vec![
            GeneratedFile::new("requirements.txt", "flask\n"),
            GeneratedFile::new("app.py", "import requests\n"),
            GeneratedFile::new("app.py", "x = 1\n"),
        ];
        let result = validator().validate(&files, Language::Python);
        let kinds: Vec<ErrorKind> = result.errors.iter().map(|e| e.kind).collect();
        // The structure layer runs later, but critical sorts first.
        assert_eq!(kinds, vec![ErrorKind::DuplicateFile, ErrorKind::MissingDependency]);
    }

    #[test]
    fn test_guard_catches_panic() {
        let err = guard(Layer::Structure, || panic!("boom")).unwrap_err();
        assert!(matches!(err, LayerError::Panicked { layer: "structure", .. }));
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn test_failure_result_shape() {
        let result = failure_result("x".to_string(), Instant::now(), 3);
        assert!(!result.is_valid);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].kind, ErrorKind::ValidationError);
        assert_eq!(result.files_checked, 3);
    }

    #[test]
    fn test_invalid_policy_rejected() {
        let policy = Policy {
            placeholder_files: vec!["[".to_string()],
            ..Default::default()
        };
        assert!(Validator::new(policy).is_err());
    }
}
