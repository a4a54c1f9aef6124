//! Scaffold quality verification.
//!
//! Four independent checks, all run on every pass:
//! - `leak`: meaningful statements smuggled into placeholders or hints
//! - `coverage`: annotation ratio over parameter and return positions
//! - `hint_quality`: copied token runs and context-blind generic hints
//! - `tier`: observed hint band versus the declared tier
//!
//! The weighted score and the critical-violation gate together decide
//! whether a unit may be promoted to Completed.

mod coverage;
mod hint_quality;
mod leak;
pub mod report;
mod tier;

pub use report::{CheckKind, CheckOutcome, QualityReport, Violation};

use crate::analyzer::Declaration;
use crate::constants::{
    CHECK_WEIGHT_COVERAGE, CHECK_WEIGHT_HINT_QUALITY, CHECK_WEIGHT_LEAK, CHECK_WEIGHT_TIER,
    DEFAULT_MAX_IMPLEMENTATION_LINES, DEFAULT_MIN_ANNOTATION_COVERAGE, DEFAULT_MIN_QUALITY_SCORE,
};
use crate::convert::{splice_fragment, ScaffoldedUnit};
use crate::hints::BandTable;
use crate::unit::SourceUnit;
use crate::utils::structural_hash;

/// Runs the four quality checks over a converted unit.
#[derive(Debug, Clone)]
pub struct Verifier {
    max_implementation_lines: usize,
    min_annotation_coverage: f64,
    min_quality_score: f64,
    bands: BandTable,
}

impl Default for Verifier {
    fn default() -> Self {
        Self {
            max_implementation_lines: DEFAULT_MAX_IMPLEMENTATION_LINES,
            min_annotation_coverage: DEFAULT_MIN_ANNOTATION_COVERAGE,
            min_quality_score: DEFAULT_MIN_QUALITY_SCORE,
            bands: BandTable::default(),
        }
    }
}

impl Verifier {
    #[must_use]
    pub fn with_max_implementation_lines(mut self, limit: usize) -> Self {
        self.max_implementation_lines = limit;
        self
    }

    #[must_use]
    pub fn with_min_annotation_coverage(mut self, floor: f64) -> Self {
        self.min_annotation_coverage = floor;
        self
    }

    #[must_use]
    pub fn with_min_quality_score(mut self, floor: f64) -> Self {
        self.min_quality_score = floor;
        self
    }

    #[must_use]
    pub fn with_bands(mut self, bands: BandTable) -> Self {
        self.bands = bands;
        self
    }

    /// Score floor a report must clear for Completed.
    #[must_use]
    pub fn min_quality_score(&self) -> f64 {
        self.min_quality_score
    }

    /// Verifies the scaffolds produced from `unit`.
    ///
    /// The report's `subject_hash` covers the exact spliced fragment the
    /// scaffolds render to; any later edit to the scaffold content
    /// invalidates the report for status promotion.
    #[must_use]
    pub fn verify(
        &self,
        unit: &SourceUnit,
        declarations: &[Declaration],
        scaffolds: &[ScaffoldedUnit],
    ) -> QualityReport {
        let leak = leak::run(scaffolds, self.max_implementation_lines);
        let coverage = coverage::run(declarations, self.min_annotation_coverage);
        let hint_quality = hint_quality::run(
            scaffolds,
            &unit.fragment,
            &unit.context,
            self.max_implementation_lines,
        );
        let tier = tier::run(scaffolds, &self.bands);

        let score = CHECK_WEIGHT_LEAK * leak.pass_rate()
            + CHECK_WEIGHT_COVERAGE * coverage.pass_rate()
            + CHECK_WEIGHT_HINT_QUALITY * hint_quality.pass_rate()
            + CHECK_WEIGHT_TIER * tier.pass_rate();

        let subject_hash = structural_hash(&splice_fragment(&unit.fragment, declarations, scaffolds));
        let (annotated_positions, total_positions) = (coverage.passed, coverage.total);

        QualityReport {
            checks: vec![leak, coverage, hint_quality, tier],
            score,
            subject_hash,
            annotated_positions,
            total_positions,
        }
    }

    /// Convenience for callers holding only a unit: analyzes, converts
    /// and verifies in one step. The batch orchestrator does the stages
    /// separately so it can attribute failures.
    pub fn verify_unit(
        &self,
        unit: &SourceUnit,
        generator: &crate::hints::HintGenerator,
    ) -> Result<QualityReport, crate::analyzer::ParseError> {
        let declarations = crate::analyzer::analyze_fragment(&unit.fragment)?;
        let scaffolds: Vec<ScaffoldedUnit> = declarations
            .iter()
            .map(|decl| {
                let mut scaffold = crate::convert::convert(decl, unit.tier);
                scaffold.unit_id = compact_str::CompactString::from(unit.id.as_str());
                scaffold.hints.extend(generator.generate(decl, unit.tier));
                scaffold.sort_hints();
                scaffold
            })
            .collect();
        Ok(self.verify(unit, &declarations, &scaffolds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hints::HintGenerator;
    use crate::unit::{SourceUnit, Tier};

    const WELL_FORMED: &str = "def find_max(values: list[int], floor: int) -> int:\n    \"\"\"Return the largest value above floor.\"\"\"\n    best = floor\n    for value in values:\n        if value > best:\n            best = value\n    return best\n";

    #[test]
    fn test_clean_unit_scores_above_floor() {
        let unit = SourceUnit::new("guide.md#1", WELL_FORMED, Tier::Tier2)
            .with_context("Find the largest value above a floor in a list of values.");
        let report = Verifier::default()
            .verify_unit(&unit, &HintGenerator::default())
            .expect("analyzable");
        assert!(report.score >= 0.80, "score was {}", report.score);
        assert!(!report.has_critical());
        assert!(report.passing(0.80));
    }

    #[test]
    fn test_weights_sum_to_one() {
        let total = crate::constants::CHECK_WEIGHT_LEAK
            + crate::constants::CHECK_WEIGHT_COVERAGE
            + crate::constants::CHECK_WEIGHT_HINT_QUALITY
            + crate::constants::CHECK_WEIGHT_TIER;
        assert!((total - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_unannotated_unit_loses_coverage_weight() {
        let bare = "def find_max(values, floor):\n    best = floor\n    for value in values:\n        if value > best:\n            best = value\n    return best\n";
        let unit = SourceUnit::new("guide.md#1", bare, Tier::Tier2);
        let report = Verifier::default()
            .verify_unit(&unit, &HintGenerator::default())
            .expect("analyzable");
        let coverage = report
            .checks
            .iter()
            .find(|c| c.check == CheckKind::AnnotationCoverage)
            .expect("coverage outcome present");
        assert_eq!((coverage.passed, coverage.total), (0, 3));
        assert_eq!(coverage.violations.len(), 1);
        assert!(report.score < 0.85);
    }

    #[test]
    fn test_leaked_placeholder_blocks_promotion_regardless_of_score() {
        let unit = SourceUnit::new("guide.md#1", WELL_FORMED, Tier::Tier2);
        let declarations = crate::analyzer::analyze_fragment(&unit.fragment).unwrap();
        let mut scaffolds: Vec<ScaffoldedUnit> = declarations
            .iter()
            .map(|d| crate::convert::convert(d, unit.tier))
            .collect();
        // Paste a full solution back into the placeholder.
        scaffolds[0].placeholder = "best = floor\nfor value in values:\n    if value > best:\n        best = value\nprint(best)\ncount = 0\ncount += 1\ncount += 2\n".to_owned();
        let report = Verifier::default().verify(&unit, &declarations, &scaffolds);
        assert!(report.has_critical());
        assert!(!report.passing(0.0));
    }

    #[test]
    fn test_subject_hash_tracks_scaffold_content() {
        let unit = SourceUnit::new("guide.md#1", WELL_FORMED, Tier::Tier2);
        let declarations = crate::analyzer::analyze_fragment(&unit.fragment).unwrap();
        let scaffolds: Vec<ScaffoldedUnit> = declarations
            .iter()
            .map(|d| crate::convert::convert(d, unit.tier))
            .collect();
        let verifier = Verifier::default();
        let before = verifier.verify(&unit, &declarations, &scaffolds);

        let mut edited = scaffolds.clone();
        edited[0].placeholder.push_str("\n# extra");
        let after = verifier.verify(&unit, &declarations, &edited);
        assert_ne!(before.subject_hash, after.subject_hash);
    }
}
