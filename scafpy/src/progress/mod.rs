//! Conversion progress tracking.
//!
//! One state machine per unit id:
//!
//! ```text
//! NotStarted -> InProgress -> Completed -> Verified
//!               InProgress -> NeedsReview -> InProgress
//! ```
//!
//! Completion demands a passing report computed from the unit's current
//! content; leaving NeedsReview demands the content actually changed.
//! Illegal moves come back as [`TransitionError`], never a panic.

mod store;

pub use store::{MemoryStore, StatusStore};

use serde::Serialize;

use crate::constants::DEFAULT_MIN_QUALITY_SCORE;
use crate::verify::QualityReport;

/// Lifecycle state of one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
pub enum ConversionStatus {
    #[default]
    NotStarted,
    InProgress,
    /// Passed verification; scaffold written.
    Completed,
    /// Failed verification; awaiting a content change.
    NeedsReview,
    /// Completed and signed off externally.
    Verified,
}

impl ConversionStatus {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::NotStarted => "not started",
            Self::InProgress => "in progress",
            Self::Completed => "completed",
            Self::NeedsReview => "needs review",
            Self::Verified => "verified",
        }
    }
}

impl std::fmt::Display for ConversionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Rejected state transition.
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionError {
    /// The move is not an edge of the state machine.
    Illegal {
        unit_id: String,
        from: ConversionStatus,
        to: ConversionStatus,
    },
    /// Promotion attempted with a report that does not pass the gate.
    FailingReport { unit_id: String, score: f64 },
    /// The report describes content other than the unit's current content.
    StaleReport {
        unit_id: String,
        report_hash: u64,
        current_hash: u64,
    },
    /// Resuming from NeedsReview without changing the content.
    ContentUnchanged { unit_id: String },
}

impl std::fmt::Display for TransitionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Illegal { unit_id, from, to } => {
                write!(f, "{unit_id}: cannot move from {from} to {to}")
            }
            Self::FailingReport { unit_id, score } => {
                write!(f, "{unit_id}: report score {score:.2} does not pass the quality gate")
            }
            Self::StaleReport {
                unit_id,
                report_hash,
                current_hash,
            } => write!(
                f,
                "{unit_id}: stale report (content {report_hash:016x}, current {current_hash:016x})"
            ),
            Self::ContentUnchanged { unit_id } => {
                write!(f, "{unit_id}: content unchanged since the last failed attempt")
            }
        }
    }
}

impl std::error::Error for TransitionError {}

/// Aggregate view over every tracked unit. Verified units count inside
/// `completed`, so the four coarse states always sum to `total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressSnapshot {
    pub total: usize,
    pub not_started: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub needs_review: usize,
    /// Subset of `completed` that was externally signed off.
    pub verified: usize,
}

/// Guards the per-unit state machine over an injected [`StatusStore`].
#[derive(Debug)]
pub struct ProgressTracker<S: StatusStore> {
    store: S,
    min_quality_score: f64,
}

impl ProgressTracker<MemoryStore> {
    /// Tracker over a fresh in-memory store.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::default())
    }
}

impl<S: StatusStore> ProgressTracker<S> {
    #[must_use]
    pub fn new(store: S) -> Self {
        Self {
            store,
            min_quality_score: DEFAULT_MIN_QUALITY_SCORE,
        }
    }

    #[must_use]
    pub fn with_min_quality_score(mut self, floor: f64) -> Self {
        self.min_quality_score = floor;
        self
    }

    /// Makes a unit visible in snapshots before any work happens.
    pub fn register(&mut self, unit_id: &str) {
        if matches!(self.store.status(unit_id), ConversionStatus::NotStarted) {
            self.store
                .set_status(unit_id, ConversionStatus::NotStarted);
        }
    }

    #[must_use]
    pub fn status(&self, unit_id: &str) -> ConversionStatus {
        self.store.status(unit_id)
    }

    /// NotStarted -> InProgress.
    pub fn begin(&mut self, unit_id: &str) -> Result<(), TransitionError> {
        let from = self.store.status(unit_id);
        if from != ConversionStatus::NotStarted {
            return Err(TransitionError::Illegal {
                unit_id: unit_id.to_owned(),
                from,
                to: ConversionStatus::InProgress,
            });
        }
        self.store.set_status(unit_id, ConversionStatus::InProgress);
        Ok(())
    }

    /// InProgress -> Completed, gated on a fresh passing report.
    ///
    /// `current_hash` is the structural hash of the scaffold content as
    /// it exists right now; a report carrying any other hash was
    /// computed from older content and is rejected outright.
    pub fn complete(
        &mut self,
        unit_id: &str,
        report: &QualityReport,
        current_hash: u64,
    ) -> Result<(), TransitionError> {
        let from = self.store.status(unit_id);
        if from != ConversionStatus::InProgress {
            return Err(TransitionError::Illegal {
                unit_id: unit_id.to_owned(),
                from,
                to: ConversionStatus::Completed,
            });
        }
        if report.subject_hash != current_hash {
            return Err(TransitionError::StaleReport {
                unit_id: unit_id.to_owned(),
                report_hash: report.subject_hash,
                current_hash,
            });
        }
        if !report.passing(self.min_quality_score) {
            return Err(TransitionError::FailingReport {
                unit_id: unit_id.to_owned(),
                score: report.score,
            });
        }
        self.store.set_status(unit_id, ConversionStatus::Completed);
        self.store.clear_failed_hash(unit_id);
        Ok(())
    }

    /// InProgress -> NeedsReview, remembering the failing content hash.
    pub fn flag_needs_review(
        &mut self,
        unit_id: &str,
        content_hash: u64,
    ) -> Result<(), TransitionError> {
        let from = self.store.status(unit_id);
        if from != ConversionStatus::InProgress {
            return Err(TransitionError::Illegal {
                unit_id: unit_id.to_owned(),
                from,
                to: ConversionStatus::NeedsReview,
            });
        }
        self.store
            .set_status(unit_id, ConversionStatus::NeedsReview);
        self.store.set_failed_hash(unit_id, content_hash);
        Ok(())
    }

    /// NeedsReview -> InProgress, only once the content has changed.
    pub fn resume(&mut self, unit_id: &str, current_hash: u64) -> Result<(), TransitionError> {
        let from = self.store.status(unit_id);
        if from != ConversionStatus::NeedsReview {
            return Err(TransitionError::Illegal {
                unit_id: unit_id.to_owned(),
                from,
                to: ConversionStatus::InProgress,
            });
        }
        if self.store.failed_hash(unit_id) == Some(current_hash) {
            return Err(TransitionError::ContentUnchanged {
                unit_id: unit_id.to_owned(),
            });
        }
        self.store.set_status(unit_id, ConversionStatus::InProgress);
        self.store.clear_failed_hash(unit_id);
        Ok(())
    }

    /// Completed -> Verified (external sign-off).
    pub fn promote(&mut self, unit_id: &str) -> Result<(), TransitionError> {
        let from = self.store.status(unit_id);
        if from != ConversionStatus::Completed {
            return Err(TransitionError::Illegal {
                unit_id: unit_id.to_owned(),
                from,
                to: ConversionStatus::Verified,
            });
        }
        self.store.set_status(unit_id, ConversionStatus::Verified);
        Ok(())
    }

    /// Counts every tracked unit by coarse state.
    #[must_use]
    pub fn snapshot(&self) -> ProgressSnapshot {
        let mut snapshot = ProgressSnapshot {
            total: 0,
            not_started: 0,
            in_progress: 0,
            completed: 0,
            needs_review: 0,
            verified: 0,
        };
        for unit_id in self.store.unit_ids() {
            snapshot.total += 1;
            match self.store.status(&unit_id) {
                ConversionStatus::NotStarted => snapshot.not_started += 1,
                ConversionStatus::InProgress => snapshot.in_progress += 1,
                ConversionStatus::Completed => snapshot.completed += 1,
                ConversionStatus::NeedsReview => snapshot.needs_review += 1,
                ConversionStatus::Verified => {
                    snapshot.completed += 1;
                    snapshot.verified += 1;
                }
            }
        }
        snapshot
    }
}
