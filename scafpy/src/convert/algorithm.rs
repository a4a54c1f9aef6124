//! Algorithm variant: pseudocode paraphrase instead of markers, plus one
//! complexity hint derived from loop nesting.

use crate::analyzer::{Declaration, StmtRole};
use crate::unit::Tier;

use super::function::convert_function;
use super::types::{Hint, HintCategory, ScaffoldedUnit};
use super::{statement_groups, Group};

pub(crate) fn convert_algorithm(decl: &Declaration, tier: Tier) -> ScaffoldedUnit {
    let mut unit = convert_function(decl, tier);
    unit.placeholder = pseudocode_body(decl);
    unit.hints
        .push(Hint::structural(HintCategory::Implementation, complexity_text(decl)));
    unit
}

/// Paraphrased pseudocode: one comment per group in structural
/// vocabulary, with a `...` filler keeping the body parseable. Source
/// tokens never appear.
fn pseudocode_body(decl: &Declaration) -> String {
    let groups = statement_groups(&decl.body);
    if groups.is_empty() {
        return "# step 1: carry out this computation\n...".to_owned();
    }
    let mut lines = Vec::with_capacity(groups.len() * 2);
    for (ordinal, group) in groups.iter().enumerate() {
        lines.push(format!("# step {}: {}", ordinal + 1, paraphrase(group)));
        lines.push("...".to_owned());
    }
    lines.join("\n")
}

fn paraphrase(group: &Group<'_>) -> &'static str {
    let max_loop = group.stmts.iter().map(|s| s.loop_depth).max().unwrap_or(0);
    match group.role {
        StmtRole::Iterate if max_loop >= 2 => {
            "run nested passes over the data; the inner pass depends on the outer position"
        }
        StmtRole::Iterate => "scan the input once, updating state as each element arrives",
        StmtRole::Branch => "split on the decisive condition and handle each case",
        StmtRole::Validate => "reject inputs the routine cannot handle",
        StmtRole::Return => "produce the final value from the accumulated state",
        StmtRole::Initialize => "set up the state the later steps will refine",
        StmtRole::Accumulate => "fold each observation into the running answer",
        StmtRole::HandleErrors => "contain failures and choose a recovery",
        StmtRole::Call => "delegate the subproblem to a helper",
        StmtRole::Import => "bring in the required modules",
        StmtRole::Other => "carry out this step",
    }
}

/// Heuristic asymptotic complexity from maximum loop nesting. Recursion
/// and loop-free or unusually deep shapes read as irregular.
fn complexity_text(decl: &Declaration) -> String {
    if decl.is_self_recursive() {
        return "Time complexity is unknown, analyze carefully.".to_owned();
    }
    match decl.max_loop_depth() {
        1 => "Expected time complexity: O(n).".to_owned(),
        2 => "Expected time complexity: O(n\u{b2}).".to_owned(),
        3 => "Expected time complexity: O(n\u{b3}).".to_owned(),
        _ => "Time complexity is unknown, analyze carefully.".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::analyze_fragment;

    fn converted(source: &str) -> ScaffoldedUnit {
        let decl = analyze_fragment(source).unwrap().remove(0);
        convert_algorithm(&decl, Tier::Tier2)
    }

    #[test]
    fn nested_loops_report_quadratic() {
        let unit = converted(
            "def bubble(xs):\n    for i in range(len(xs)):\n        for j in range(i):\n            if xs[j] > xs[i]:\n                xs[i], xs[j] = xs[j], xs[i]\n    return xs\n",
        );
        let complexity = unit
            .hints
            .iter()
            .find(|h| h.category == HintCategory::Implementation)
            .unwrap();
        assert_eq!(complexity.text, "Expected time complexity: O(n\u{b2}).");
        assert!(!complexity.tier_specific);
    }

    #[test]
    fn single_loop_reports_linear() {
        let unit = converted(
            "def first_even(xs):\n    for x in xs:\n        if x % 2 == 0:\n            return x\n    return None\n",
        );
        assert!(unit.hints.iter().any(|h| h.text.contains("O(n).")));
    }

    #[test]
    fn recursion_reads_as_irregular() {
        let unit = converted(
            "def walk(node):\n    for child in node.children:\n        if child.live:\n            walk(child)\n",
        );
        assert!(unit
            .hints
            .iter()
            .any(|h| h.text.contains("unknown, analyze carefully")));
    }

    #[test]
    fn pseudocode_paraphrases_instead_of_quoting() {
        let unit = converted(
            "def bubble(xs):\n    for i in range(len(xs)):\n        for j in range(i):\n            if xs[j] > xs[i]:\n                xs[i], xs[j] = xs[j], xs[i]\n    return xs\n",
        );
        assert!(unit.placeholder.contains("# step 1: run nested passes"));
        assert!(!unit.placeholder.contains("range"));
        assert!(!unit.placeholder.contains("xs"));
    }
}
