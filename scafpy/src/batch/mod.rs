//! Batch conversion over an ordered set of units.
//!
//! Strictly sequential: one unit's failure never stops the batch, and
//! output ordering matches input ordering. Each unit runs inside an
//! isolation boundary; expected failures travel as `Result`, anything
//! that panics is caught and recorded against the stage it happened in.
//! Cancellation is cooperative and only observed between units, so a
//! unit is either fully processed or untouched.

use std::cell::Cell;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use compact_str::CompactString;
use indicatif::ProgressBar;
use serde::Serialize;

use crate::analyzer;
use crate::convert::{self, splice_fragment, ScaffoldedUnit};
use crate::hints::HintGenerator;
use crate::progress::{ConversionStatus, MemoryStore, ProgressSnapshot, ProgressTracker, StatusStore};
use crate::unit::SourceUnit;
use crate::utils::structural_hash;
use crate::verify::{QualityReport, Verifier};

/// Pipeline stage a failure is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Stage {
    Analyze,
    Convert,
    Verify,
    Track,
}

impl Stage {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Analyze => "analyze",
            Self::Convert => "convert",
            Self::Verify => "verify",
            Self::Track => "track",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One unit's failure, kept as data so the batch can continue.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionError {
    pub unit_id: String,
    pub stage: Stage,
    pub message: String,
}

impl std::fmt::Display for ConversionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}: {}", self.unit_id, self.stage, self.message)
    }
}

impl std::error::Error for ConversionError {}

/// Error counts per stage across the whole batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StageErrorCounts {
    pub analyze: usize,
    pub convert: usize,
    pub verify: usize,
    pub track: usize,
}

impl StageErrorCounts {
    fn record(&mut self, stage: Stage) {
        match stage {
            Stage::Analyze => self.analyze += 1,
            Stage::Convert => self.convert += 1,
            Stage::Verify => self.verify += 1,
            Stage::Track => self.track += 1,
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.analyze + self.convert + self.verify + self.track
    }
}

/// Final record for one unit.
#[derive(Debug, Clone, Serialize)]
pub struct UnitOutcome {
    pub unit_id: String,
    pub status: ConversionStatus,
    /// The unit's fragment with every declaration replaced by its
    /// scaffold. Absent when conversion never produced one.
    pub scaffold: Option<String>,
    pub report: Option<QualityReport>,
    /// Remediation categories for NeedsReview units.
    pub remediation: Vec<String>,
    pub error: Option<ConversionError>,
}

impl UnitOutcome {
    #[must_use]
    pub fn score(&self) -> Option<f64> {
        self.report.as_ref().map(|r| r.score)
    }
}

/// Result of one batch run.
#[derive(Debug, Serialize)]
pub struct BatchRun {
    pub outcomes: Vec<UnitOutcome>,
    pub stage_errors: StageErrorCounts,
    pub snapshot: ProgressSnapshot,
    /// Batch-wide annotation coverage, aggregated from per-unit counts.
    pub annotation_coverage: f64,
    pub cancelled: bool,
}

impl BatchRun {
    /// Failures across the batch, in unit order.
    pub fn errors(&self) -> impl Iterator<Item = &ConversionError> {
        self.outcomes.iter().filter_map(|o| o.error.as_ref())
    }

    /// Units left flagged for author attention, in unit order.
    pub fn needs_review(&self) -> impl Iterator<Item = &UnitOutcome> {
        self.outcomes
            .iter()
            .filter(|o| o.status == ConversionStatus::NeedsReview)
    }
}

/// Everything a successfully converted unit produces.
struct UnitProduct {
    rendered: String,
    report: QualityReport,
}

/// Runs units through analyze, convert, verify and track.
pub struct BatchRunner<S: StatusStore = MemoryStore> {
    generator: HintGenerator,
    verifier: Verifier,
    tracker: ProgressTracker<S>,
    /// Progress bar for long runs (owned by the command layer).
    pub progress_bar: Option<Arc<ProgressBar>>,
}

impl BatchRunner<MemoryStore> {
    #[must_use]
    pub fn new(generator: HintGenerator, verifier: Verifier) -> Self {
        let floor = verifier.min_quality_score();
        Self {
            generator,
            verifier,
            tracker: ProgressTracker::in_memory().with_min_quality_score(floor),
            progress_bar: None,
        }
    }
}

impl Default for BatchRunner<MemoryStore> {
    fn default() -> Self {
        Self::new(HintGenerator::default(), Verifier::default())
    }
}

impl<S: StatusStore> BatchRunner<S> {
    /// Same runner over an injected status store.
    #[must_use]
    pub fn with_store<T: StatusStore>(self, store: T) -> BatchRunner<T> {
        let floor = self.verifier.min_quality_score();
        BatchRunner {
            generator: self.generator,
            verifier: self.verifier,
            tracker: ProgressTracker::new(store).with_min_quality_score(floor),
            progress_bar: self.progress_bar,
        }
    }

    #[must_use]
    pub fn tracker(&self) -> &ProgressTracker<S> {
        &self.tracker
    }

    /// Processes every unit in order; `cancel` is observed between units
    /// only. Already-completed units (pre-seeded stores) are left alone.
    pub fn run(&mut self, units: &[SourceUnit], cancel: &AtomicBool) -> BatchRun {
        for unit in units {
            self.tracker.register(&unit.id);
        }

        let mut outcomes = Vec::with_capacity(units.len());
        let mut stage_errors = StageErrorCounts::default();
        let mut annotated = 0usize;
        let mut total = 0usize;
        let mut cancelled = false;

        for unit in units {
            if cancel.load(Ordering::SeqCst) {
                cancelled = true;
                break;
            }
            let outcome = self.run_unit(unit);
            if let Some(error) = &outcome.error {
                stage_errors.record(error.stage);
            }
            if let Some(report) = &outcome.report {
                annotated += report.annotated_positions;
                total += report.total_positions;
            }
            outcomes.push(outcome);
            if let Some(ref pb) = self.progress_bar {
                pb.inc(1);
            }
        }

        // Units never reached keep their current status in the record.
        for unit in units.iter().skip(outcomes.len()) {
            outcomes.push(UnitOutcome {
                unit_id: unit.id.clone(),
                status: self.tracker.status(&unit.id),
                scaffold: None,
                report: None,
                remediation: Vec::new(),
                error: None,
            });
        }

        let annotation_coverage = if total == 0 {
            1.0
        } else {
            annotated as f64 / total as f64
        };

        BatchRun {
            outcomes,
            stage_errors,
            snapshot: self.tracker.snapshot(),
            annotation_coverage,
            cancelled,
        }
    }

    fn run_unit(&mut self, unit: &SourceUnit) -> UnitOutcome {
        let mut outcome = UnitOutcome {
            unit_id: unit.id.clone(),
            status: self.tracker.status(&unit.id),
            scaffold: None,
            report: None,
            remediation: Vec::new(),
            error: None,
        };

        match self.tracker.status(&unit.id) {
            ConversionStatus::NotStarted => {
                if let Err(err) = self.tracker.begin(&unit.id) {
                    outcome.error = Some(track_error(&unit.id, &err));
                    return outcome;
                }
            }
            // Retry only when the fragment changed since the failure.
            ConversionStatus::NeedsReview => {
                if self
                    .tracker
                    .resume(&unit.id, structural_hash(&unit.fragment))
                    .is_err()
                {
                    return outcome;
                }
            }
            ConversionStatus::InProgress => {}
            ConversionStatus::Completed | ConversionStatus::Verified => return outcome,
        }

        match self.convert_unit(unit) {
            Ok(product) => {
                let content_hash = structural_hash(&product.rendered);
                if product.report.passing(self.verifier.min_quality_score()) {
                    if let Err(err) =
                        self.tracker.complete(&unit.id, &product.report, content_hash)
                    {
                        outcome.error = Some(track_error(&unit.id, &err));
                    }
                } else {
                    outcome.remediation = product
                        .report
                        .failed_checks()
                        .map(|check| check.remediation().to_owned())
                        .collect();
                    if let Err(err) = self
                        .tracker
                        .flag_needs_review(&unit.id, structural_hash(&unit.fragment))
                    {
                        outcome.error = Some(track_error(&unit.id, &err));
                    }
                }
                outcome.scaffold = Some(product.rendered);
                outcome.report = Some(product.report);
            }
            Err(error) => {
                if error.stage == Stage::Analyze {
                    outcome.remediation = vec!["fix syntax error".to_owned()];
                }
                if let Err(err) = self
                    .tracker
                    .flag_needs_review(&unit.id, structural_hash(&unit.fragment))
                {
                    outcome.error = Some(track_error(&unit.id, &err));
                } else {
                    outcome.error = Some(error);
                }
            }
        }

        outcome.status = self.tracker.status(&unit.id);
        outcome
    }

    /// Analyze, convert and verify one unit behind a panic boundary.
    fn convert_unit(&self, unit: &SourceUnit) -> Result<UnitProduct, ConversionError> {
        if !unit.language.is_supported() {
            return Err(ConversionError {
                unit_id: unit.id.clone(),
                stage: Stage::Analyze,
                message: format!("unsupported language `{}`", unit.language),
            });
        }

        let stage = Cell::new(Stage::Analyze);
        let result = catch_unwind(AssertUnwindSafe(|| {
            let declarations =
                analyzer::analyze_fragment(&unit.fragment).map_err(|err| ConversionError {
                    unit_id: unit.id.clone(),
                    stage: Stage::Analyze,
                    message: err.to_string(),
                })?;

            stage.set(Stage::Convert);
            let scaffolds: Vec<ScaffoldedUnit> = declarations
                .iter()
                .map(|decl| {
                    let mut scaffold = convert::convert(decl, unit.tier);
                    scaffold.unit_id = CompactString::from(unit.id.as_str());
                    scaffold.hints.extend(self.generator.generate(decl, unit.tier));
                    scaffold.sort_hints();
                    scaffold
                })
                .collect();
            let rendered = splice_fragment(&unit.fragment, &declarations, &scaffolds);

            stage.set(Stage::Verify);
            let report = self.verifier.verify(unit, &declarations, &scaffolds);

            Ok(UnitProduct { rendered, report })
        }));

        match result {
            Ok(product) => product,
            Err(payload) => Err(ConversionError {
                unit_id: unit.id.clone(),
                stage: stage.get(),
                message: panic_message(payload.as_ref()),
            }),
        }
    }
}

fn track_error(unit_id: &str, err: &crate::progress::TransitionError) -> ConversionError {
    ConversionError {
        unit_id: unit_id.to_owned(),
        stage: Stage::Track,
        message: err.to_string(),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("internal panic: {message}")
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("internal panic: {message}")
    } else {
        "internal panic".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::{LanguageTag, Tier};

    const CLEAN: &str = "def double(x: int) -> int:\n    \"\"\"Twice the input.\"\"\"\n    return x * 2\n";
    const BROKEN: &str = "def broken(:\n    return \"unterminated\n";
    const BARE: &str = "def bare(a, b):\n    return a + b\n";

    fn runner() -> BatchRunner {
        BatchRunner::default()
    }

    #[test]
    fn test_parse_failure_does_not_stop_the_batch() {
        let units = vec![
            SourceUnit::new("guide.md#1", CLEAN, Tier::Tier3),
            SourceUnit::new("guide.md#2", BROKEN, Tier::Tier2),
            SourceUnit::new("guide.md#3", CLEAN, Tier::Tier3),
        ];
        let run = runner().run(&units, &AtomicBool::new(false));

        assert_eq!(run.outcomes.len(), 3);
        assert_eq!(run.outcomes[0].status, ConversionStatus::Completed);
        assert_eq!(run.outcomes[1].status, ConversionStatus::NeedsReview);
        assert_eq!(run.outcomes[2].status, ConversionStatus::Completed);

        assert_eq!(run.stage_errors.analyze, 1);
        assert_eq!(run.stage_errors.total(), 1);
        let error = run.errors().next().expect("one error");
        assert_eq!(error.unit_id, "guide.md#2");
        assert_eq!(error.stage, Stage::Analyze);
        assert_eq!(run.outcomes[1].remediation, ["fix syntax error"]);
        assert!(run.outcomes[1].scaffold.is_none());
        assert!(!run.cancelled);
    }

    #[test]
    fn test_low_coverage_unit_lands_in_needs_review() {
        let units = vec![SourceUnit::new("guide.md#1", BARE, Tier::Tier2)];
        let mut runner = BatchRunner::new(
            HintGenerator::default(),
            Verifier::default().with_min_quality_score(0.85),
        );
        let run = runner.run(&units, &AtomicBool::new(false));

        let outcome = &run.outcomes[0];
        assert_eq!(outcome.status, ConversionStatus::NeedsReview);
        assert_eq!(outcome.remediation, ["add type annotations"]);
        // The scaffold exists even though it failed the gate.
        assert!(outcome.scaffold.is_some());
        assert!(run.annotation_coverage < 0.95);
    }

    #[test]
    fn test_unsupported_language_fails_closed() {
        let unit = SourceUnit::new("guide.md#1", "fn main() {}", Tier::Tier2)
            .with_language(LanguageTag::from_fence("rust"));
        let run = runner().run(&[unit], &AtomicBool::new(false));

        let outcome = &run.outcomes[0];
        assert_eq!(outcome.status, ConversionStatus::NeedsReview);
        let error = outcome.error.as_ref().expect("language error");
        assert!(error.message.contains("unsupported language `rust`"));
        assert!(outcome.scaffold.is_none());
    }

    #[test]
    fn test_cancellation_between_units() {
        let units = vec![
            SourceUnit::new("guide.md#1", CLEAN, Tier::Tier3),
            SourceUnit::new("guide.md#2", CLEAN, Tier::Tier3),
        ];
        let cancel = AtomicBool::new(true);
        let run = runner().run(&units, &cancel);

        assert!(run.cancelled);
        assert_eq!(run.outcomes.len(), 2);
        assert!(run
            .outcomes
            .iter()
            .all(|o| o.status == ConversionStatus::NotStarted));
        assert_eq!(run.snapshot.total, 2);
        assert_eq!(run.snapshot.not_started, 2);
    }

    #[test]
    fn test_batch_coverage_aggregates_counts() {
        // 3/3 positions from the clean unit, 0/3 from the bare one.
        let units = vec![
            SourceUnit::new("guide.md#1", "def f(x: int) -> int:\n    return x\n", Tier::Tier3),
            SourceUnit::new("guide.md#2", BARE, Tier::Tier3),
        ];
        let run = runner().run(&units, &AtomicBool::new(false));
        let expected = 2.0 / 5.0;
        assert!((run.annotation_coverage - expected).abs() < 1e-9);
    }

    #[test]
    fn test_rerun_skips_completed_units() {
        let units = vec![SourceUnit::new("guide.md#1", CLEAN, Tier::Tier3)];
        let mut runner = runner();
        let first = runner.run(&units, &AtomicBool::new(false));
        assert_eq!(first.outcomes[0].status, ConversionStatus::Completed);

        let second = runner.run(&units, &AtomicBool::new(false));
        assert_eq!(second.outcomes[0].status, ConversionStatus::Completed);
        assert!(second.outcomes[0].scaffold.is_none());
        assert_eq!(second.stage_errors.total(), 0);
    }

    #[test]
    fn test_unchanged_needs_review_unit_is_not_retried() {
        let units = vec![SourceUnit::new("guide.md#1", BROKEN, Tier::Tier2)];
        let mut runner = runner();
        let first = runner.run(&units, &AtomicBool::new(false));
        assert_eq!(first.outcomes[0].status, ConversionStatus::NeedsReview);
        assert_eq!(first.stage_errors.analyze, 1);

        // Same content: the guard holds the unit in NeedsReview without
        // burning another attempt.
        let second = runner.run(&units, &AtomicBool::new(false));
        assert_eq!(second.outcomes[0].status, ConversionStatus::NeedsReview);
        assert_eq!(second.stage_errors.total(), 0);

        // Fixed content goes through.
        let fixed = vec![SourceUnit::new("guide.md#1", CLEAN, Tier::Tier2)];
        let third = runner.run(&fixed, &AtomicBool::new(false));
        assert_eq!(third.outcomes[0].status, ConversionStatus::Completed);
    }
}
