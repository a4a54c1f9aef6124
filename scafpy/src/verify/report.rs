//! Quality report types. One report per verified unit, recomputed whole
//! on every pass; a report is never patched in place.

use serde::Serialize;

/// The four independent checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CheckKind {
    SolutionLeak,
    AnnotationCoverage,
    HintQuality,
    TierConsistency,
}

impl CheckKind {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::SolutionLeak => "solution leak",
            Self::AnnotationCoverage => "annotation coverage",
            Self::HintQuality => "hint quality",
            Self::TierConsistency => "tier consistency",
        }
    }

    /// Remediation wording surfaced next to NeedsReview units.
    #[must_use]
    pub fn remediation(self) -> &'static str {
        match self {
            Self::SolutionLeak => "reduce placeholder detail",
            Self::AnnotationCoverage => "add type annotations",
            Self::HintQuality => "align hints with the surrounding prose",
            Self::TierConsistency => "reduce hint detail for the declared tier",
        }
    }
}

impl std::fmt::Display for CheckKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One finding from one check. Leak findings are always critical; a
/// single critical violation blocks Completed regardless of score.
#[derive(Debug, Clone, Serialize)]
pub struct Violation {
    pub check: CheckKind,
    pub message: String,
    pub critical: bool,
}

/// Outcome of one check over its subjects.
#[derive(Debug, Clone, Serialize)]
pub struct CheckOutcome {
    pub check: CheckKind,
    pub passed: usize,
    pub total: usize,
    pub violations: Vec<Violation>,
}

impl CheckOutcome {
    /// Fraction of subjects that passed; a check with nothing to examine
    /// passes vacuously.
    #[must_use]
    pub fn pass_rate(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.passed as f64 / self.total as f64
        }
    }
}

/// Full verification result for one unit.
#[derive(Debug, Clone, Serialize)]
pub struct QualityReport {
    pub checks: Vec<CheckOutcome>,
    pub score: f64,
    /// Hash of the exact scaffold content this report describes. Status
    /// promotion rejects reports whose hash no longer matches.
    pub subject_hash: u64,
    /// Annotated and total annotation positions, kept so a batch can
    /// aggregate coverage across units from counts instead of ratios.
    pub annotated_positions: usize,
    pub total_positions: usize,
}

impl QualityReport {
    /// All violations across checks, in check order.
    pub fn violations(&self) -> impl Iterator<Item = &Violation> {
        self.checks.iter().flat_map(|c| c.violations.iter())
    }

    #[must_use]
    pub fn has_critical(&self) -> bool {
        self.violations().any(|v| v.critical)
    }

    /// Promotion gate: score at or above the floor and no critical hits.
    #[must_use]
    pub fn passing(&self, min_score: f64) -> bool {
        self.score >= min_score && !self.has_critical()
    }

    /// Checks that produced at least one violation.
    pub fn failed_checks(&self) -> impl Iterator<Item = CheckKind> + '_ {
        self.checks
            .iter()
            .filter(|c| !c.violations.is_empty())
            .map(|c| c.check)
    }
}
