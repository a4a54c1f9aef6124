//! Statement walker over a declaration body.
//!
//! Each top-level statement becomes one [`BodyStmt`] carrying aggregate
//! facts about its subtree: structural role, control and loop nesting,
//! outgoing call names, and assertion metadata. Nested function and class
//! definitions are never descended into, so a parent's depth accounting
//! reflects only its own executable statements.

use compact_str::CompactString;
use ruff_python_ast::visitor::{self, Visitor};
use ruff_python_ast::{self as ast, Expr, Stmt};
use ruff_text_size::Ranged;
use smallvec::SmallVec;

use crate::constants::get_assert_method_re;
use crate::utils::LineIndex;

use super::types::{AssertionInfo, BodyStmt, StmtRole};

/// Walks the top-level statements of a body into [`BodyStmt`] records.
pub(crate) fn collect_body<'a>(
    stmts: impl IntoIterator<Item = &'a Stmt>,
    source: &str,
    index: &LineIndex,
) -> Vec<BodyStmt> {
    stmts
        .into_iter()
        .map(|stmt| {
            let (control_depth, loop_depth) = subtree_depths(stmt);
            let mut calls = SmallVec::new();
            CallCollector { calls: &mut calls }.visit_stmt(stmt);
            let mut assertions = SmallVec::new();
            collect_assertions(stmt, source, &mut assertions);
            BodyStmt {
                role: role_of(stmt),
                control_depth,
                loop_depth,
                line: index.line_index(stmt.range().start()),
                source: node_source(source, stmt).to_owned(),
                calls,
                assertions,
            }
        })
        .collect()
}

/// Verbatim source slice of a node.
pub(crate) fn node_source<'a, T: Ranged>(source: &'a str, node: &T) -> &'a str {
    let range = node.range();
    &source[range.start().to_usize()..range.end().to_usize()]
}

fn role_of(stmt: &Stmt) -> StmtRole {
    match stmt {
        Stmt::Return(_) => StmtRole::Return,
        Stmt::For(_) | Stmt::While(_) => StmtRole::Iterate,
        Stmt::If(node) if is_guard_clause(node) => StmtRole::Validate,
        Stmt::If(_) | Stmt::Match(_) => StmtRole::Branch,
        Stmt::Try(_) => StmtRole::HandleErrors,
        Stmt::Assert(_) | Stmt::Raise(_) => StmtRole::Validate,
        Stmt::AugAssign(_) => StmtRole::Accumulate,
        Stmt::Assign(_) | Stmt::AnnAssign(_) | Stmt::With(_) => StmtRole::Initialize,
        Stmt::Expr(node) if matches!(&*node.value, Expr::Call(_)) => StmtRole::Call,
        Stmt::Import(_) | Stmt::ImportFrom(_) => StmtRole::Import,
        _ => StmtRole::Other,
    }
}

/// An `if` whose only action is raising reads as input validation.
fn is_guard_clause(node: &ast::StmtIf) -> bool {
    node.elif_else_clauses.is_empty()
        && node.body.len() == 1
        && matches!(node.body[0], Stmt::Raise(_))
}

/// Deepest (control, loop) nesting inside a statement subtree.
///
/// Loops and branches open a level; `with` and `try` pass child depths
/// through unchanged. Nested defs contribute nothing to the parent.
/// Descent stops at `MAX_NESTING_DEPTH` levels.
fn subtree_depths(stmt: &Stmt) -> (usize, usize) {
    subtree_depths_at(stmt, 0)
}

fn subtree_depths_at(stmt: &Stmt, level: usize) -> (usize, usize) {
    if level > crate::constants::MAX_NESTING_DEPTH {
        return (0, 0);
    }
    match stmt {
        Stmt::For(node) => {
            let (c, l) = max_depths(node.body.iter().chain(&node.orelse), level + 1);
            (c + 1, l + 1)
        }
        Stmt::While(node) => {
            let (c, l) = max_depths(node.body.iter().chain(&node.orelse), level + 1);
            (c + 1, l + 1)
        }
        Stmt::If(node) => {
            let clause_bodies = node.elif_else_clauses.iter().flat_map(|c| c.body.iter());
            let (c, l) = max_depths(node.body.iter().chain(clause_bodies), level + 1);
            (c + 1, l)
        }
        Stmt::Match(node) => {
            let (c, l) = max_depths(
                node.cases.iter().flat_map(|case| case.body.iter()),
                level + 1,
            );
            (c + 1, l)
        }
        Stmt::With(node) => max_depths(node.body.iter(), level + 1),
        Stmt::Try(node) => {
            let handler_bodies = node.handlers.iter().flat_map(|handler| {
                let ast::ExceptHandler::ExceptHandler(h) = handler;
                h.body.iter()
            });
            max_depths(
                node.body
                    .iter()
                    .chain(handler_bodies)
                    .chain(&node.orelse)
                    .chain(&node.finalbody),
                level + 1,
            )
        }
        _ => (0, 0),
    }
}

fn max_depths<'a>(stmts: impl Iterator<Item = &'a Stmt>, level: usize) -> (usize, usize) {
    stmts.fold((0, 0), |(c, l), stmt| {
        let (sc, sl) = subtree_depths_at(stmt, level);
        (c.max(sc), l.max(sl))
    })
}

/// Records callee names in source order, staying out of nested defs.
struct CallCollector<'a> {
    calls: &'a mut SmallVec<[CompactString; 4]>,
}

impl<'ast> Visitor<'ast> for CallCollector<'_> {
    fn visit_stmt(&mut self, stmt: &'ast Stmt) {
        match stmt {
            Stmt::FunctionDef(_) | Stmt::ClassDef(_) => {}
            _ => visitor::walk_stmt(self, stmt),
        }
    }

    fn visit_expr(&mut self, expr: &'ast Expr) {
        if let Expr::Call(call) = expr {
            if let Some(name) = callee_name(&call.func) {
                self.calls.push(name);
            }
        }
        visitor::walk_expr(self, expr);
    }
}

/// Callee identifier for `f(...)`, `obj.method(...)`, `pkg.mod.f(...)`.
pub(crate) fn callee_name(func: &Expr) -> Option<CompactString> {
    match func {
        Expr::Name(name) => Some(CompactString::from(name.id.as_str())),
        Expr::Attribute(attr) => Some(CompactString::from(attr.attr.id.as_str())),
        _ => None,
    }
}

/// Dotted display form of a callee, for recognizing `pytest.raises`.
fn dotted_callee(func: &Expr) -> Option<String> {
    match func {
        Expr::Name(name) => Some(name.id.to_string()),
        Expr::Attribute(attr) => {
            let base = dotted_callee(&attr.value)?;
            Some(format!("{base}.{}", attr.attr.id))
        }
        _ => None,
    }
}

fn collect_assertions(stmt: &Stmt, source: &str, out: &mut SmallVec<[AssertionInfo; 1]>) {
    match stmt {
        Stmt::Assert(node) => out.push(assert_statement_info(node, source)),
        Stmt::Expr(node) => {
            if let Expr::Call(call) = &*node.value {
                if let Some(info) = assert_method_info(call, source) {
                    out.push(info);
                }
            }
        }
        Stmt::With(node) => {
            for item in &node.items {
                if let Expr::Call(call) = &item.context_expr {
                    if let Some(info) = raises_context_info(call, source) {
                        out.push(info);
                    }
                }
            }
            for inner in &node.body {
                collect_assertions(inner, source, out);
            }
        }
        Stmt::For(node) => {
            for inner in node.body.iter().chain(&node.orelse) {
                collect_assertions(inner, source, out);
            }
        }
        Stmt::While(node) => {
            for inner in node.body.iter().chain(&node.orelse) {
                collect_assertions(inner, source, out);
            }
        }
        Stmt::If(node) => {
            for inner in &node.body {
                collect_assertions(inner, source, out);
            }
            for clause in &node.elif_else_clauses {
                for inner in &clause.body {
                    collect_assertions(inner, source, out);
                }
            }
        }
        Stmt::Try(node) => {
            for inner in &node.body {
                collect_assertions(inner, source, out);
            }
            for handler in &node.handlers {
                let ast::ExceptHandler::ExceptHandler(h) = handler;
                for inner in &h.body {
                    collect_assertions(inner, source, out);
                }
            }
            for inner in node.orelse.iter().chain(&node.finalbody) {
                collect_assertions(inner, source, out);
            }
        }
        _ => {}
    }
}

/// `assert a == 42` records mechanism `==` and the literal `42`.
/// Truthiness asserts keep only the bare mechanism.
fn assert_statement_info(node: &ast::StmtAssert, source: &str) -> AssertionInfo {
    if let Expr::Compare(cmp) = &*node.test {
        if let (Some(op), Some(comparator)) = (cmp.ops.first(), cmp.comparators.first()) {
            let expected =
                is_literal_expr(comparator).then(|| node_source(source, comparator).to_owned());
            return AssertionInfo {
                mechanism: CompactString::from(cmp_op_label(*op)),
                expected,
            };
        }
    }
    AssertionInfo {
        mechanism: CompactString::from("assert"),
        expected: None,
    }
}

/// unittest-style `self.assertEqual(actual, expected)` and friends.
fn assert_method_info(call: &ast::ExprCall, source: &str) -> Option<AssertionInfo> {
    let Expr::Attribute(attr) = &*call.func else {
        return None;
    };
    let method = attr.attr.id.as_str();
    if !get_assert_method_re().is_match(method) {
        return None;
    }
    let expected = call
        .arguments
        .args
        .get(1)
        .filter(|arg| is_literal_expr(arg))
        .map(|arg| node_source(source, arg).to_owned());
    Some(AssertionInfo {
        mechanism: CompactString::from(method),
        expected,
    })
}

/// `with pytest.raises(ValueError):` and `with self.assertRaises(...)`.
/// The expected exception name is worth preserving even though it is not
/// a literal.
fn raises_context_info(call: &ast::ExprCall, source: &str) -> Option<AssertionInfo> {
    let dotted = dotted_callee(&call.func)?;
    let is_raises = dotted == "pytest.raises"
        || dotted == "raises"
        || dotted.ends_with(".assertRaises")
        || dotted.ends_with(".assertRaisesRegex");
    if !is_raises {
        return None;
    }
    let expected = call
        .arguments
        .args
        .first()
        .map(|arg| node_source(source, arg).to_owned());
    Some(AssertionInfo {
        mechanism: if dotted.contains("assertRaises") {
            CompactString::from("assertRaises")
        } else {
            CompactString::from("pytest.raises")
        },
        expected,
    })
}

fn cmp_op_label(op: ast::CmpOp) -> &'static str {
    match op {
        ast::CmpOp::Eq => "==",
        ast::CmpOp::NotEq => "!=",
        ast::CmpOp::Lt => "<",
        ast::CmpOp::LtE => "<=",
        ast::CmpOp::Gt => ">",
        ast::CmpOp::GtE => ">=",
        ast::CmpOp::Is => "is",
        ast::CmpOp::IsNot => "is not",
        ast::CmpOp::In => "in",
        ast::CmpOp::NotIn => "not in",
    }
}

/// Literals and containers built purely from literals. These are safe to
/// surface in a marker without leaking computation.
fn is_literal_expr(expr: &Expr) -> bool {
    match expr {
        Expr::NumberLiteral(_)
        | Expr::StringLiteral(_)
        | Expr::BytesLiteral(_)
        | Expr::BooleanLiteral(_)
        | Expr::NoneLiteral(_)
        | Expr::EllipsisLiteral(_) => true,
        Expr::UnaryOp(node) => {
            matches!(node.op, ast::UnaryOp::USub | ast::UnaryOp::UAdd)
                && is_literal_expr(&node.operand)
        }
        Expr::List(node) => node.elts.iter().all(is_literal_expr),
        Expr::Tuple(node) => node.elts.iter().all(is_literal_expr),
        Expr::Set(node) => node.elts.iter().all(is_literal_expr),
        Expr::Dict(node) => node.items.iter().all(|item| {
            item.key.as_ref().is_some_and(is_literal_expr) && is_literal_expr(&item.value)
        }),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ruff_python_parser::parse_module;

    fn body_of(source: &str) -> Vec<BodyStmt> {
        let parsed = parse_module(source).unwrap();
        let index = LineIndex::new(source);
        collect_body(&parsed.into_syntax().body, source, &index)
    }

    #[test]
    fn depths_ignore_nested_defs() {
        let source = "def outer():\n    def inner():\n        for i in range(3):\n            if i:\n                pass\n";
        let parsed = parse_module(source).unwrap();
        let module = parsed.into_syntax();
        let Stmt::FunctionDef(outer) = &module.body[0] else {
            panic!("expected function");
        };
        let index = LineIndex::new(source);
        let body = collect_body(&outer.body, source, &index);
        assert_eq!(body[0].control_depth, 0);
        assert_eq!(body[0].loop_depth, 0);
    }

    #[test]
    fn loop_with_branch_reaches_depth_two() {
        let body = body_of("for x in items:\n    if x:\n        total += x\n");
        assert_eq!(body[0].control_depth, 2);
        assert_eq!(body[0].loop_depth, 1);
        assert_eq!(body[0].role, StmtRole::Iterate);
    }

    #[test]
    fn guard_clause_reads_as_validation() {
        let body = body_of("if n < 0:\n    raise ValueError(\"negative\")\n");
        assert_eq!(body[0].role, StmtRole::Validate);
    }

    #[test]
    fn literal_comparison_keeps_expected_value() {
        let body = body_of("assert add(2, 3) == 5\n");
        assert_eq!(body[0].assertions.len(), 1);
        assert_eq!(body[0].assertions[0].mechanism, "==");
        assert_eq!(body[0].assertions[0].expected.as_deref(), Some("5"));
    }

    #[test]
    fn non_literal_comparison_drops_expected_value() {
        let body = body_of("assert f(x) == g(x)\n");
        assert_eq!(body[0].assertions[0].mechanism, "==");
        assert!(body[0].assertions[0].expected.is_none());
    }

    #[test]
    fn raises_context_records_exception_name() {
        let body = body_of("with pytest.raises(ValueError):\n    parse(\"bad\")\n");
        assert_eq!(body[0].assertions.len(), 1);
        assert_eq!(body[0].assertions[0].mechanism, "pytest.raises");
        assert_eq!(
            body[0].assertions[0].expected.as_deref(),
            Some("ValueError")
        );
    }

    #[test]
    fn calls_are_collected_in_order() {
        let body = body_of("result = helper(load(x))\n");
        let names: Vec<&str> = body[0].calls.iter().map(CompactString::as_str).collect();
        assert_eq!(names, ["helper", "load"]);
    }
}
