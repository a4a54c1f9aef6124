//! Solution-leak check. A placeholder or hint that carries more than
//! `max_implementation_lines` structurally meaningful statements has
//! smuggled implementation into the scaffold. Comments, `...`, bare
//! literals, and statements the converter preserved on purpose (test
//! arrange lines, class fields) do not count.

use rustc_hash::FxHashSet;

use ruff_python_ast::{Expr, Stmt};
use ruff_python_parser::parse_module;

use crate::convert::ScaffoldedUnit;
use crate::verify::report::{CheckKind, CheckOutcome, Violation};

pub(crate) fn run(units: &[ScaffoldedUnit], max_implementation_lines: usize) -> CheckOutcome {
    let mut violations = Vec::new();
    let mut total = 0usize;

    for unit in units {
        scan_unit(unit, max_implementation_lines, &mut total, &mut violations);
    }

    let passed = total - violations.len();
    CheckOutcome {
        check: CheckKind::SolutionLeak,
        passed,
        total,
        violations,
    }
}

fn scan_unit(
    unit: &ScaffoldedUnit,
    budget: usize,
    total: &mut usize,
    violations: &mut Vec<Violation>,
) {
    let exempt: FxHashSet<&str> = unit.preserved.iter().map(String::as_str).collect();

    *total += 1;
    let count = meaningful_statement_count(&unit.placeholder, &exempt);
    if count > budget {
        violations.push(Violation {
            check: CheckKind::SolutionLeak,
            message: format!(
                "placeholder of `{}` carries {count} meaningful statements (limit {budget})",
                display_name(unit)
            ),
            critical: true,
        });
    }

    for (position, hint) in unit.hints.iter().enumerate() {
        *total += 1;
        let count = meaningful_statement_count(&hint.text, &FxHashSet::default());
        if count > budget {
            violations.push(Violation {
                check: CheckKind::SolutionLeak,
                message: format!(
                    "hint {} ({}) of `{}` carries {count} meaningful statements (limit {budget})",
                    position + 1,
                    hint.category.label(),
                    display_name(unit)
                ),
                critical: true,
            });
        }
    }

    for member in &unit.members {
        scan_unit(member, budget, total, violations);
    }
}

fn display_name(unit: &ScaffoldedUnit) -> &str {
    if unit.name.is_empty() {
        "<script>"
    } else {
        &unit.name
    }
}

/// Counts executable statements in `text`, skipping subtrees whose
/// verbatim source appears in `exempt`. Placeholders parse as Python by
/// construction; prose that does not parse falls back to a line-by-line
/// count so code pasted into a hint is still caught.
pub(crate) fn meaningful_statement_count(text: &str, exempt: &FxHashSet<&str>) -> usize {
    match parse_module(text) {
        Ok(parsed) => count_statements(&parsed.into_syntax().body, text, exempt),
        Err(_) => text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !exempt.contains(line))
            .filter(|line| line_is_meaningful(line))
            .count(),
    }
}

fn count_statements(stmts: &[Stmt], source: &str, exempt: &FxHashSet<&str>) -> usize {
    let mut count = 0;
    for stmt in stmts {
        let text = crate::analyzer::node_source(source, stmt).trim_end();
        if exempt.contains(text) {
            continue;
        }
        count += count_statement(stmt, source, exempt);
    }
    count
}

fn count_statement(stmt: &Stmt, source: &str, exempt: &FxHashSet<&str>) -> usize {
    match stmt {
        Stmt::Assign(_) | Stmt::AugAssign(_) => 1,
        Stmt::AnnAssign(node) => usize::from(node.value.is_some()),
        Stmt::Return(node) => usize::from(node.value.is_some()),
        Stmt::Raise(_) | Stmt::Assert(_) | Stmt::Delete(_) => 1,
        Stmt::Expr(node) => usize::from(expr_is_meaningful(&node.value)),
        Stmt::For(node) => {
            1 + count_statements(&node.body, source, exempt)
                + count_statements(&node.orelse, source, exempt)
        }
        Stmt::While(node) => {
            1 + count_statements(&node.body, source, exempt)
                + count_statements(&node.orelse, source, exempt)
        }
        Stmt::If(node) => {
            let mut total = 1 + count_statements(&node.body, source, exempt);
            for clause in &node.elif_else_clauses {
                total += count_statements(&clause.body, source, exempt);
            }
            total
        }
        Stmt::With(node) => 1 + count_statements(&node.body, source, exempt),
        Stmt::Match(node) => {
            let mut total = 1;
            for case in &node.cases {
                total += count_statements(&case.body, source, exempt);
            }
            total
        }
        Stmt::Try(node) => {
            let mut total = count_statements(&node.body, source, exempt);
            for handler in &node.handlers {
                let ruff_python_ast::ExceptHandler::ExceptHandler(h) = handler;
                total += count_statements(&h.body, source, exempt);
            }
            total += count_statements(&node.orelse, source, exempt);
            total += count_statements(&node.finalbody, source, exempt);
            total
        }
        Stmt::FunctionDef(node) => count_statements(&node.body, source, exempt),
        Stmt::ClassDef(node) => count_statements(&node.body, source, exempt),
        // Imports, pass, break, continue, global, nonlocal carry no logic.
        _ => 0,
    }
}

/// Expression statements only count when they do work; docstrings,
/// `...`, and other bare literals are inert.
fn expr_is_meaningful(expr: &Expr) -> bool {
    matches!(expr, Expr::Call(_) | Expr::Await(_) | Expr::Named(_))
}

/// Fallback for prose: a line counts when it parses on its own as a
/// single meaningful Python statement.
fn line_is_meaningful(line: &str) -> bool {
    if line.starts_with('#') {
        return false;
    }
    match parse_module(line) {
        Ok(parsed) => {
            let body = parsed.into_syntax().body;
            body.len() == 1 && count_statement(&body[0], line, &FxHashSet::default()) > 0
        }
        Err(_) => false,
    }
}
