//! Tier band table: which hint categories each tier requires.
//!
//! The default table is monotonic by construction (Tier1 covers Tier2
//! covers Tier3). Config may override it; validation rejects tables that
//! break the ordering.

use crate::convert::HintCategory;
use crate::unit::Tier;

const TIER1_DEFAULT: &[HintCategory] = &[
    HintCategory::Conceptual,
    HintCategory::Approach,
    HintCategory::Implementation,
    HintCategory::Resource,
];
const TIER2_DEFAULT: &[HintCategory] = &[HintCategory::Conceptual, HintCategory::Approach];
const TIER3_DEFAULT: &[HintCategory] = &[HintCategory::Conceptual];

/// Required hint categories per tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BandTable {
    tiers: [Vec<HintCategory>; 3],
}

impl Default for BandTable {
    fn default() -> Self {
        Self {
            tiers: [
                TIER1_DEFAULT.to_vec(),
                TIER2_DEFAULT.to_vec(),
                TIER3_DEFAULT.to_vec(),
            ],
        }
    }
}

impl BandTable {
    /// Builds a table from per-tier category lists, rejecting tables
    /// where a more detailed tier requires less than a lighter one.
    pub fn new(
        tier1: Vec<HintCategory>,
        tier2: Vec<HintCategory>,
        tier3: Vec<HintCategory>,
    ) -> Result<Self, String> {
        let table = Self {
            tiers: [tier1, tier2, tier3],
        };
        if !table.covers(Tier::Tier1, Tier::Tier2) || !table.covers(Tier::Tier2, Tier::Tier3) {
            return Err(
                "tier bands must be monotonic: Tier1 covers Tier2 covers Tier3".to_owned()
            );
        }
        if table.tiers.iter().any(Vec::is_empty) {
            return Err("every tier must require at least one hint category".to_owned());
        }
        Ok(table)
    }

    #[must_use]
    pub fn categories(&self, tier: Tier) -> &[HintCategory] {
        &self.tiers[tier.band() as usize - 1]
    }

    fn covers(&self, outer: Tier, inner: Tier) -> bool {
        self.categories(inner)
            .iter()
            .all(|c| self.categories(outer).contains(c))
    }

    /// Most detailed tier whose required categories are all present.
    /// Falls back to Tier3 when even the lightest band is not covered.
    #[must_use]
    pub fn observed_band(&self, present: &[HintCategory]) -> Tier {
        for tier in [Tier::Tier1, Tier::Tier2, Tier::Tier3] {
            if self.categories(tier).iter().all(|c| present.contains(c)) {
                return tier;
            }
        }
        Tier::Tier3
    }
}
