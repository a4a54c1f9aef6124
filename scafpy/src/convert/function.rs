//! Function variant: verbatim signature, synthesized docstring when the
//! original has none, one ordered marker per statement group.

use compact_str::CompactString;

use crate::analyzer::{Declaration, Signature, StmtRole};
use crate::unit::Tier;
use crate::utils::split_identifier;

use super::types::ScaffoldedUnit;
use super::{role_phrase, statement_groups};

pub(crate) fn convert_function(decl: &Declaration, tier: Tier) -> ScaffoldedUnit {
    let docstring = if decl.is_script() {
        String::new()
    } else {
        decl.docstring
            .clone()
            .unwrap_or_else(|| synthesized_docstring(&decl.signature))
    };

    ScaffoldedUnit {
        unit_id: CompactString::default(),
        kind: decl.kind,
        tier,
        name: decl.signature.name.clone(),
        header: decl.header.clone(),
        docstring,
        hints: Vec::new(),
        placeholder: placeholder_body(decl),
        preserved: Vec::new(),
        members: Vec::new(),
        indent: decl.indent.clone(),
        body_indent: decl.body_indent.clone(),
    }
}

/// One `# TODO(n): <role>` marker plus a `...` filler per group. A body
/// with nothing to group still yields one marker so the scaffold is never
/// empty, and the fillers keep the text parseable on its own.
pub(crate) fn placeholder_body(decl: &Declaration) -> String {
    let groups = statement_groups(&decl.body);
    if groups.is_empty() {
        return format!("# TODO(1): {}\n...", role_phrase(StmtRole::Other));
    }
    let mut lines = Vec::with_capacity(groups.len() * 2);
    for (ordinal, group) in groups.iter().enumerate() {
        lines.push(format!("# TODO({}): {}", ordinal + 1, role_phrase(group.role)));
        lines.push("...".to_owned());
    }
    lines.join("\n")
}

/// Deterministic docstring built from the name and parameter list.
pub(crate) fn synthesized_docstring(signature: &Signature) -> String {
    let words = split_identifier(&signature.name);
    let mut doc = if words.is_empty() {
        "Implement this step.".to_owned()
    } else {
        format!("{}.", capitalize(&words.join(" ")))
    };

    let named: Vec<&str> = signature
        .params
        .iter()
        .filter(|p| !p.is_receiver())
        .map(|p| p.name.as_str())
        .collect();
    if !named.is_empty() {
        doc.push_str(&format!(" Takes {}.", named.join(", ")));
    }
    if let Some(returns) = &signature.returns {
        doc.push_str(&format!(" Returns {returns}."));
    }
    doc
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::analyze_fragment;

    fn converted(source: &str) -> ScaffoldedUnit {
        let decl = analyze_fragment(source).unwrap().remove(0);
        convert_function(&decl, Tier::Tier2)
    }

    #[test]
    fn signature_is_kept_verbatim() {
        let unit = converted("def scale(values: list[int], factor: float = 2.0) -> list[int]:\n    return [v * factor for v in values]\n");
        assert_eq!(
            unit.header,
            "def scale(values: list[int], factor: float = 2.0) -> list[int]:"
        );
    }

    #[test]
    fn existing_docstring_survives() {
        let unit = converted("def f():\n    \"\"\"Original words.\"\"\"\n    return 1\n");
        assert_eq!(unit.docstring, "Original words.");
    }

    #[test]
    fn missing_docstring_is_synthesized_from_name_and_params() {
        let unit = converted("def find_max(values, limit):\n    return max(values)\n");
        assert_eq!(unit.docstring, "Find max. Takes values, limit.");
    }

    #[test]
    fn placeholder_has_one_marker_per_group() {
        let unit = converted(
            "def tally(xs):\n    total = 0\n    for x in xs:\n        total += x\n    return total\n",
        );
        let markers: Vec<&str> = unit
            .placeholder
            .lines()
            .filter(|l| l.starts_with("# TODO"))
            .collect();
        assert_eq!(
            markers,
            [
                "# TODO(1): initialize the working state",
                "# TODO(2): iterate over the input",
                "# TODO(3): return the result",
            ]
        );
    }

    #[test]
    fn empty_body_still_yields_a_placeholder() {
        let unit = converted("def todo():\n    pass\n");
        assert!(unit.placeholder.contains("# TODO(1)"));
        assert!(unit.placeholder.contains("..."));
    }

    #[test]
    fn placeholder_never_copies_source_text() {
        let unit = converted(
            "def tally(xs):\n    total_accumulator_value = 0\n    return total_accumulator_value\n",
        );
        assert!(!unit.placeholder.contains("total_accumulator_value"));
    }
}
