//! Annotation coverage check. Coverage is measured on the original
//! declarations, not the scaffold text, so the converter cannot improve
//! or damage the ratio: parameters (receivers excluded) plus one return
//! slot per function, annotated over total.

use crate::analyzer::Declaration;
use crate::verify::report::{CheckKind, CheckOutcome, Violation};

pub(crate) fn run(declarations: &[Declaration], min_coverage: f64) -> CheckOutcome {
    let mut annotated = 0usize;
    let mut total = 0usize;
    for decl in declarations {
        let (a, t) = decl.annotation_counts();
        annotated += a;
        total += t;
    }

    let mut violations = Vec::new();
    if total > 0 {
        let ratio = annotated as f64 / total as f64;
        if ratio < min_coverage {
            violations.push(Violation {
                check: CheckKind::AnnotationCoverage,
                message: format!(
                    "annotation coverage {ratio:.2} below required {min_coverage:.2} \
                     ({annotated} of {total} positions annotated)"
                ),
                critical: false,
            });
        }
    }

    CheckOutcome {
        check: CheckKind::AnnotationCoverage,
        passed: annotated,
        total,
        violations,
    }
}
