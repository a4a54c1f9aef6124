//! Class variant: header, docstring and field declarations stay; every
//! method is scaffolded with the function variant; one conceptual hint
//! describes which method calls which.

use compact_str::CompactString;
use rustc_hash::FxHashSet;

use crate::analyzer::Declaration;
use crate::unit::Tier;

use super::function::convert_function;
use super::rebase_statement;
use super::types::{Hint, HintCategory, ScaffoldedUnit};

pub(crate) fn convert_class(decl: &Declaration, tier: Tier) -> ScaffoldedUnit {
    let preserved: Vec<String> = decl
        .body
        .iter()
        .map(|stmt| rebase_statement(&stmt.source, &decl.body_indent))
        .collect();

    let members: Vec<ScaffoldedUnit> = decl
        .methods
        .iter()
        .map(|method| convert_function(method, tier))
        .collect();

    let placeholder = if preserved.is_empty() && members.is_empty() {
        "...".to_owned()
    } else {
        preserved.join("\n")
    };

    ScaffoldedUnit {
        unit_id: CompactString::default(),
        kind: decl.kind,
        tier,
        name: decl.signature.name.clone(),
        header: decl.header.clone(),
        docstring: decl.docstring.clone().unwrap_or_default(),
        hints: vec![Hint::structural(
            HintCategory::Conceptual,
            collaboration_text(decl),
        )],
        placeholder,
        preserved,
        members,
        indent: decl.indent.clone(),
        body_indent: decl.body_indent.clone(),
    }
}

/// Which method invokes which, read from the original bodies. Logic is
/// never disclosed, only the call graph between the class's own methods.
fn collaboration_text(decl: &Declaration) -> String {
    let method_names: FxHashSet<&str> = decl
        .methods
        .iter()
        .map(|m| m.signature.name.as_str())
        .collect();

    let mut edges: Vec<String> = Vec::new();
    for method in &decl.methods {
        let mut seen: FxHashSet<&str> = FxHashSet::default();
        let mut callees: Vec<&str> = Vec::new();
        for stmt in &method.body {
            for call in &stmt.calls {
                let callee = call.as_str();
                if callee != method.signature.name
                    && method_names.contains(callee)
                    && seen.insert(callee)
                {
                    callees.push(callee);
                }
            }
        }
        if !callees.is_empty() {
            edges.push(format!(
                "{} calls {}",
                method.signature.name,
                callees.join(" and ")
            ));
        }
    }

    if edges.is_empty() {
        "Methods operate independently; no method calls another.".to_owned()
    } else {
        format!("Collaboration inside the class: {}.", edges.join("; "))
    }
}
