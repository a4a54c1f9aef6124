//! Hint quality check. Two detectors per hint: a contiguous token run
//! copied from the original fragment (paraphrase violation), and a hint
//! that shares no content terms with the unit's prose context (generic,
//! could be pasted onto any exercise). The generic detector is skipped
//! when the unit has no context, and applies only to banded hints;
//! structural hints restate code facts, not prose, and face the copied-
//! run detector alone.

use crate::constants::{TERM_RE, TOKENS_PER_STATEMENT};
use crate::convert::ScaffoldedUnit;
use crate::utils::content_terms;
use crate::verify::report::{CheckKind, CheckOutcome, Violation};

pub(crate) fn run(
    units: &[ScaffoldedUnit],
    fragment: &str,
    context: &str,
    max_implementation_lines: usize,
) -> CheckOutcome {
    let fragment_tokens = tokens(fragment);
    let context_terms = content_terms(context);
    let run_budget = max_implementation_lines * TOKENS_PER_STATEMENT;

    let mut violations = Vec::new();
    let mut total = 0usize;
    for unit in units {
        scan_unit(
            unit,
            &fragment_tokens,
            &context_terms,
            run_budget,
            &mut total,
            &mut violations,
        );
    }

    let passed = total - violations.len();
    CheckOutcome {
        check: CheckKind::HintQuality,
        passed,
        total,
        violations,
    }
}

fn scan_unit(
    unit: &ScaffoldedUnit,
    fragment_tokens: &[String],
    context_terms: &[String],
    run_budget: usize,
    total: &mut usize,
    violations: &mut Vec<Violation>,
) {
    for (position, hint) in unit.hints.iter().enumerate() {
        *total += 1;
        let hint_tokens = tokens(&hint.text);

        let run = longest_shared_run(&hint_tokens, fragment_tokens);
        if run > run_budget {
            violations.push(Violation {
                check: CheckKind::HintQuality,
                message: format!(
                    "hint {} ({}) of `{}` repeats a {run}-token run from the source (limit {run_budget})",
                    position + 1,
                    hint.category.label(),
                    unit.name,
                ),
                critical: false,
            });
            continue;
        }

        if !context_terms.is_empty() && hint.tier_specific {
            let hint_terms = content_terms(&hint.text);
            let shares_term = hint_terms.iter().any(|t| context_terms.contains(t));
            if !shares_term {
                violations.push(Violation {
                    check: CheckKind::HintQuality,
                    message: format!(
                        "hint {} ({}) of `{}` shares no terms with the surrounding prose",
                        position + 1,
                        hint.category.label(),
                        unit.name,
                    ),
                    critical: false,
                });
            }
        }
    }

    for member in &unit.members {
        scan_unit(
            member,
            fragment_tokens,
            context_terms,
            run_budget,
            total,
            violations,
        );
    }
}

/// Lowercased word tokens in source order, punctuation dropped. Both
/// sides of the comparison go through the same tokenizer, so case edits
/// cannot hide a copied run.
fn tokens(text: &str) -> Vec<String> {
    TERM_RE()
        .find_iter(text)
        .map(|m| m.as_str().to_ascii_lowercase())
        .collect()
}

/// Length of the longest contiguous token run present in both slices.
fn longest_shared_run(a: &[String], b: &[String]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let mut best = 0usize;
    let mut prev = vec![0usize; b.len() + 1];
    let mut current = vec![0usize; b.len() + 1];
    for token_a in a {
        for (j, token_b) in b.iter().enumerate() {
            if token_a == token_b {
                current[j + 1] = prev[j] + 1;
                best = best.max(current[j + 1]);
            } else {
                current[j + 1] = 0;
            }
        }
        std::mem::swap(&mut prev, &mut current);
    }
    best
}
