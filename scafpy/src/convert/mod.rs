//! Pattern conversion: turning analyzed declarations into scaffolds.
//!
//! Four variants selected by declaration kind, all pure:
//! - `function`: placeholders per statement group with ordered markers
//! - `class`: header, docstring and fields kept, methods recursed
//! - `algorithm`: paraphrased pseudocode plus a complexity hint
//! - `test`: arrange statements kept, assertions replaced by markers

mod algorithm;
mod class;
mod function;
pub mod render;

/// Hint and scaffold value types.
pub mod types;

pub use render::{declaration_text, splice_fragment};
pub use types::{Hint, HintCategory, ScaffoldedUnit};

use crate::analyzer::{BodyStmt, DeclKind, Declaration, StmtRole};
use crate::unit::Tier;

/// Converts one declaration into its scaffolded form.
#[must_use]
pub fn convert(decl: &Declaration, tier: Tier) -> ScaffoldedUnit {
    match decl.kind {
        DeclKind::Function => function::convert_function(decl, tier),
        DeclKind::Class => class::convert_class(decl, tier),
        DeclKind::Algorithm => algorithm::convert_algorithm(decl, tier),
        DeclKind::Test => test::convert_test(decl, tier),
    }
}

/// A maximal run of consecutive top-level statements whose subtree
/// nesting does not change.
pub(crate) struct Group<'a> {
    pub role: StmtRole,
    pub stmts: &'a [BodyStmt],
}

pub(crate) fn statement_groups(body: &[BodyStmt]) -> Vec<Group<'_>> {
    let mut groups = Vec::new();
    let mut start = 0;
    for end in 1..=body.len() {
        let boundary =
            end == body.len() || body[end].control_depth != body[start].control_depth;
        if boundary {
            let stmts = &body[start..end];
            groups.push(Group {
                role: dominant_role(stmts),
                stmts,
            });
            start = end;
        }
    }
    groups
}

/// Picks the group's label by role precedence; `StmtRole` is declared in
/// precedence order, so the minimum wins.
fn dominant_role(stmts: &[BodyStmt]) -> StmtRole {
    stmts
        .iter()
        .map(|stmt| stmt.role)
        .min()
        .unwrap_or(StmtRole::Other)
}

/// Rebases a verbatim statement slice so continuation lines sit relative
/// to the body indent. Render re-applies the indent to every line, so a
/// kept statement round-trips to its original columns.
pub(crate) fn rebase_statement(source: &str, body_indent: &str) -> String {
    let mut lines = source.lines();
    let Some(first) = lines.next() else {
        return String::new();
    };
    let mut out = first.to_owned();
    for line in lines {
        out.push('\n');
        out.push_str(line.strip_prefix(body_indent).unwrap_or(line));
    }
    out
}

/// Marker phrase for a group role. Structural vocabulary only; source
/// tokens never appear here.
pub(crate) fn role_phrase(role: StmtRole) -> &'static str {
    match role {
        StmtRole::Return => "return the result",
        StmtRole::Iterate => "iterate over the input",
        StmtRole::Branch => "branch on the decisive condition",
        StmtRole::HandleErrors => "handle the failure paths",
        StmtRole::Validate => "validate the inputs",
        StmtRole::Accumulate => "update the running result",
        StmtRole::Call => "invoke the helpers",
        StmtRole::Initialize => "initialize the working state",
        StmtRole::Import => "bring in the required modules",
        StmtRole::Other => "implement this step",
    }
}
