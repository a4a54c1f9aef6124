//! Scaffold text assembly.
//!
//! `declaration_text` renders one scaffolded declaration at its original
//! indentation. `splice_fragment` rebuilds a whole fragment, replacing
//! each declaration's byte range with its scaffold and keeping every
//! other byte verbatim.

use crate::analyzer::Declaration;

use super::types::ScaffoldedUnit;

/// Renders one scaffold block, no trailing newline.
#[must_use]
pub fn declaration_text(unit: &ScaffoldedUnit) -> String {
    let mut blocks: Vec<String> = Vec::with_capacity(1 + unit.members.len());
    blocks.push(head_block(unit));
    for member in &unit.members {
        blocks.push(declaration_text(member));
    }
    blocks.retain(|block| !block.is_empty());
    blocks.join("\n\n")
}

fn head_block(unit: &ScaffoldedUnit) -> String {
    let mut lines: Vec<String> = Vec::new();
    if !unit.header.is_empty() {
        lines.push(format!("{}{}", unit.indent, unit.header));
    }
    if !unit.docstring.is_empty() {
        lines.push(docstring_lines(unit));
    }
    for hint in &unit.hints {
        lines.push(format!(
            "{}# Hint ({}): {}",
            unit.body_indent, hint.category, hint.text
        ));
    }
    for line in unit.placeholder.lines() {
        if line.is_empty() {
            lines.push(String::new());
        } else {
            lines.push(format!("{}{}", unit.body_indent, line));
        }
    }
    lines.join("\n")
}

/// Triple-quoted docstring at body indentation. Content holding `"""`
/// switches to single-quote fencing.
fn docstring_lines(unit: &ScaffoldedUnit) -> String {
    let indent = &unit.body_indent;
    let fence = if unit.docstring.contains("\"\"\"") {
        "'''"
    } else {
        "\"\"\""
    };
    if unit.docstring.contains('\n') {
        format!("{indent}{fence}{}\n{indent}{fence}", unit.docstring)
    } else {
        format!("{indent}{fence}{}{fence}", unit.docstring)
    }
}

/// Splices scaffold blocks into the original fragment. Declarations must
/// be in source order; bytes outside their ranges are copied through
/// untouched so prose, imports and usage examples survive exactly.
#[must_use]
pub fn splice_fragment(
    fragment: &str,
    declarations: &[Declaration],
    units: &[ScaffoldedUnit],
) -> String {
    let mut out = String::with_capacity(fragment.len());
    let mut cursor = 0;
    for (decl, unit) in declarations.iter().zip(units) {
        let keep_until = decl.start_byte.saturating_sub(decl.indent.len());
        if keep_until > cursor {
            out.push_str(&fragment[cursor..keep_until]);
        }
        out.push_str(&declaration_text(unit));
        cursor = decl.end_byte.min(fragment.len());
    }
    out.push_str(&fragment[cursor..]);
    out
}
