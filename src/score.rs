//! Confidence scoring.
//!
//! Confidence starts at 1.0 and loses a fixed penalty per finding according
//! to its severity, clamped to `[0, 1]`.

use serde::{Deserialize, Serialize};

use crate::validate::{Severity, ValidationError};

/// Penalty weights per severity.
pub mod penalties {
    pub const CRITICAL: f64 = 0.3;
    pub const HIGH: f64 = 0.1;
    pub const MEDIUM: f64 = 0.02;
    pub const LOW: f64 = 0.02;
}

/// Finding counts per severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl SeverityCounts {
    pub fn from_findings<'a>(findings: impl IntoIterator<Item = &'a ValidationError>) -> Self {
        let mut counts = Self::default();
        for f in findings {
            match f.severity {
                Severity::Critical => counts.critical += 1,
                Severity::High => counts.high += 1,
                Severity::Medium => counts.medium += 1,
                Severity::Low => counts.low += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.critical + self.high + self.medium + self.low
    }
}

/// Confidence for the given counts.
pub fn confidence(counts: &SeverityCounts) -> f64 {
    let penalty = penalties::CRITICAL * counts.critical as f64
        + penalties::HIGH * counts.high as f64
        + penalties::MEDIUM * counts.medium as f64
        + penalties::LOW * counts.low as f64;
    (1.0 - penalty).clamp(0.0, 1.0)
}
