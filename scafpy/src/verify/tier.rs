//! Tier consistency check. The observed band is inferred from the
//! banded hint categories actually present on a scaffold; converter-
//! mandated structural hints (collaboration, complexity) do not express
//! tier detail and stay out of the inference. A one-band gap is
//! tolerated, anything wider is a violation.

use crate::convert::{HintCategory, ScaffoldedUnit};
use crate::hints::BandTable;
use crate::verify::report::{CheckKind, CheckOutcome, Violation};

pub(crate) fn run(units: &[ScaffoldedUnit], bands: &BandTable) -> CheckOutcome {
    let mut violations = Vec::new();
    let total = units.len();
    let mut passed = 0usize;

    for unit in units {
        let present = banded_categories(unit);
        let observed = bands.observed_band(&present);
        let distance = i16::from(observed.band()) - i16::from(unit.tier.band());
        if distance.abs() > 1 {
            violations.push(Violation {
                check: CheckKind::TierConsistency,
                message: format!(
                    "`{}` declares {} but its hints read as {observed}",
                    unit.name, unit.tier,
                ),
                critical: false,
            });
        } else {
            passed += 1;
        }
    }

    CheckOutcome {
        check: CheckKind::TierConsistency,
        passed,
        total,
        violations,
    }
}

fn banded_categories(unit: &ScaffoldedUnit) -> Vec<HintCategory> {
    let mut present: Vec<HintCategory> = unit
        .all_hints()
        .filter(|h| h.tier_specific)
        .map(|h| h.category)
        .collect();
    present.dedup();
    present
}
