//! Status persistence seam. The tracker owns the transition rules; the
//! store only remembers statuses and the hash recorded at the last
//! failed attempt. The in-memory implementation backs the CLI; anything
//! durable can slot in behind the same trait.

use rustc_hash::FxHashMap;

use super::ConversionStatus;

/// Storage backend for per-unit conversion status.
pub trait StatusStore {
    /// Current status; units never seen are `NotStarted`.
    fn status(&self, unit_id: &str) -> ConversionStatus;

    fn set_status(&mut self, unit_id: &str, status: ConversionStatus);

    /// Content hash recorded when the unit last entered NeedsReview.
    fn failed_hash(&self, unit_id: &str) -> Option<u64>;

    fn set_failed_hash(&mut self, unit_id: &str, hash: u64);

    fn clear_failed_hash(&mut self, unit_id: &str);

    /// Every unit id the store has seen, in no particular order.
    fn unit_ids(&self) -> Vec<String>;
}

/// In-memory store used by the batch orchestrator and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    statuses: FxHashMap<String, ConversionStatus>,
    failed_hashes: FxHashMap<String, u64>,
}

impl StatusStore for MemoryStore {
    fn status(&self, unit_id: &str) -> ConversionStatus {
        self.statuses
            .get(unit_id)
            .copied()
            .unwrap_or(ConversionStatus::NotStarted)
    }

    fn set_status(&mut self, unit_id: &str, status: ConversionStatus) {
        self.statuses.insert(unit_id.to_owned(), status);
    }

    fn failed_hash(&self, unit_id: &str) -> Option<u64> {
        self.failed_hashes.get(unit_id).copied()
    }

    fn set_failed_hash(&mut self, unit_id: &str, hash: u64) {
        self.failed_hashes.insert(unit_id.to_owned(), hash);
    }

    fn clear_failed_hash(&mut self, unit_id: &str) {
        self.failed_hashes.remove(unit_id);
    }

    fn unit_ids(&self) -> Vec<String> {
        self.statuses.keys().cloned().collect()
    }
}
