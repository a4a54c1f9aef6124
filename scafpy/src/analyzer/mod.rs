//! Structural analysis of Python fragments.
//!
//! The entry point is [`analyze_fragment`], broken down into:
//! - `types`: Declaration, Signature, BodyStmt and friends
//! - `body`: per-statement subtree walker (roles, depths, calls, assertions)
//! - `signature`: header extraction and docstrings
//! - `classify`: kind selection with the Test > Algorithm > Function > Class
//!   priority

pub(crate) mod body;
mod classify;
mod signature;

/// Declaration model shared by every downstream stage.
pub mod types;

pub use types::{
    AssertionInfo, BodyStmt, DeclKind, Declaration, Param, ParseError, Signature, StmtRole,
};

pub(crate) use body::node_source;

use ruff_python_ast::{self as ast, Stmt};
use ruff_python_parser::parse_module;
use ruff_text_size::Ranged;

use crate::utils::LineIndex;

/// Parses a fragment and returns its declarations in source order.
///
/// A fragment with no function or class definitions but at least one
/// executable statement yields a single synthetic script declaration
/// covering the loose statements. Invalid Python is a [`ParseError`];
/// nothing downstream ever sees a partially analyzed fragment.
pub fn analyze_fragment(source: &str) -> Result<Vec<Declaration>, ParseError> {
    let parsed = parse_module(source).map_err(|err| ParseError {
        message: err.error.to_string(),
        line: LineIndex::new(source).line_index(err.location.start()),
    })?;
    let module = parsed.into_syntax();
    let index = LineIndex::new(source);

    let mut declarations = Vec::new();
    let mut loose: Vec<&Stmt> = Vec::new();

    for (position, stmt) in module.body.iter().enumerate() {
        match stmt {
            Stmt::FunctionDef(def) => declarations.push(analyze_function(def, source, &index)),
            Stmt::ClassDef(def) => declarations.push(analyze_class(def, source, &index)),
            Stmt::Import(_) | Stmt::ImportFrom(_) => {}
            _ if signature::is_docstring_stmt(&module.body, position) => {}
            other => loose.push(other),
        }
    }

    // Loose statements only form a scaffold subject when the fragment
    // declares nothing; next to declarations they are usage examples and
    // stay verbatim through splicing.
    if declarations.is_empty() {
        if let Some(script) = script_declaration(&loose, source, &index) {
            declarations.push(script);
        }
    }

    Ok(declarations)
}

fn analyze_function(def: &ast::StmtFunctionDef, source: &str, index: &LineIndex) -> Declaration {
    let start = signature::definition_start(def.range().start(), &def.decorator_list);
    let docstring = signature::extract_docstring(&def.body);
    let executable = if docstring.is_some() {
        &def.body[1..]
    } else {
        &def.body[..]
    };
    let body_stmts = body::collect_body(executable, source, index);
    let sig = signature::function_signature(def, source);
    let kind = classify::classify_function(&sig.name, &body_stmts);
    let indent = signature::line_indent(source, start);

    Declaration {
        kind,
        header: signature::header_slice(source, start, &def.body),
        signature: sig,
        docstring,
        body: body_stmts,
        methods: Vec::new(),
        line: index.line_index(start),
        start_byte: start.to_usize(),
        end_byte: def.range().end().to_usize(),
        body_indent: body_indent_of(source, &def.body, &indent),
        indent,
    }
}

/// Indentation of the body block, read from the first body statement.
/// One-liner bodies and empty bodies fall back to a four-space level
/// under the header.
fn body_indent_of(source: &str, body: &[Stmt], header_indent: &str) -> String {
    let measured = body
        .first()
        .map(|stmt| signature::line_indent(source, stmt.range().start()));
    match measured {
        Some(indent) if !indent.is_empty() => indent,
        _ => format!("{header_indent}    "),
    }
}

fn analyze_class(def: &ast::StmtClassDef, source: &str, index: &LineIndex) -> Declaration {
    let start = signature::definition_start(def.range().start(), &def.decorator_list);
    let docstring = signature::extract_docstring(&def.body);

    let mut methods = Vec::new();
    let mut fields: Vec<&Stmt> = Vec::new();
    for (position, stmt) in def.body.iter().enumerate() {
        match stmt {
            Stmt::FunctionDef(method) => methods.push(analyze_function(method, source, index)),
            Stmt::ClassDef(nested) => methods.push(analyze_class(nested, source, index)),
            _ if signature::is_docstring_stmt(&def.body, position) => {}
            other => fields.push(other),
        }
    }

    let body_stmts = body::collect_body(fields.iter().copied(), source, index);
    let sig = signature::class_signature(def, source);
    let kind = classify::classify_class(&sig.name, &methods);
    let indent = signature::line_indent(source, start);

    Declaration {
        kind,
        header: signature::header_slice(source, start, &def.body),
        signature: sig,
        docstring,
        body: body_stmts,
        methods,
        line: index.line_index(start),
        start_byte: start.to_usize(),
        end_byte: def.range().end().to_usize(),
        body_indent: body_indent_of(source, &def.body, &indent),
        indent,
    }
}

fn script_declaration(loose: &[&Stmt], source: &str, index: &LineIndex) -> Option<Declaration> {
    let first = loose.first()?;
    let last = loose.last()?;
    let body_stmts = body::collect_body(loose.iter().copied(), source, index);
    let kind = classify::classify_script(&body_stmts);
    let start = first.range().start();

    Some(Declaration {
        kind,
        signature: Signature::default(),
        header: String::new(),
        docstring: None,
        body: body_stmts,
        methods: Vec::new(),
        line: index.line_index(start),
        start_byte: start.to_usize(),
        end_byte: last.range().end().to_usize(),
        indent: String::new(),
        body_indent: String::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_function_with_assertion_classifies_test() {
        let source = "def test_add():\n    assert add(2, 3) == 5\n";
        let decls = analyze_fragment(source).unwrap();
        assert_eq!(decls.len(), 1);
        assert_eq!(decls[0].kind, DeclKind::Test);
    }

    #[test]
    fn test_named_function_without_assertion_is_not_test() {
        let source = "def test_helper():\n    return build()\n";
        let decls = analyze_fragment(source).unwrap();
        assert_eq!(decls[0].kind, DeclKind::Function);
    }

    #[test]
    fn nested_control_flow_classifies_algorithm() {
        let source = "def bubble(xs):\n    for i in range(len(xs)):\n        for j in range(i):\n            if xs[j] > xs[i]:\n                xs[i], xs[j] = xs[j], xs[i]\n    return xs\n";
        let decls = analyze_fragment(source).unwrap();
        assert_eq!(decls[0].kind, DeclKind::Algorithm);
        assert_eq!(decls[0].max_loop_depth(), 2);
    }

    #[test]
    fn test_priority_beats_algorithm() {
        let source = "def test_table():\n    for case in CASES:\n        if case.enabled:\n            assert run(case) == 0\n";
        let decls = analyze_fragment(source).unwrap();
        assert_eq!(decls[0].kind, DeclKind::Test);
    }

    #[test]
    fn flat_function_classifies_function() {
        let source = "def greet(name: str) -> str:\n    return f\"hi {name}\"\n";
        let decls = analyze_fragment(source).unwrap();
        assert_eq!(decls[0].kind, DeclKind::Function);
    }

    #[test]
    fn class_with_methods_classifies_class() {
        let source = "class Stack:\n    \"\"\"LIFO container.\"\"\"\n\n    def push(self, item):\n        self._items.append(item)\n\n    def pop(self):\n        return self._items.pop()\n";
        let decls = analyze_fragment(source).unwrap();
        assert_eq!(decls[0].kind, DeclKind::Class);
        assert_eq!(decls[0].methods.len(), 2);
        assert_eq!(decls[0].docstring.as_deref(), Some("LIFO container."));
    }

    #[test]
    fn method_with_deep_nesting_is_algorithm_but_class_is_not() {
        let source = "class Sorter:\n    def sort(self, xs):\n        for i in range(len(xs)):\n            for j in range(i):\n                if xs[j] > xs[i]:\n                    xs[i], xs[j] = xs[j], xs[i]\n        return xs\n";
        let decls = analyze_fragment(source).unwrap();
        assert_eq!(decls[0].kind, DeclKind::Class);
        assert_eq!(decls[0].methods[0].kind, DeclKind::Algorithm);
    }

    #[test]
    fn unittest_class_classifies_test() {
        let source = "class TestMath(unittest.TestCase):\n    def test_add(self):\n        self.assertEqual(add(2, 2), 4)\n";
        let decls = analyze_fragment(source).unwrap();
        assert_eq!(decls[0].kind, DeclKind::Test);
        assert_eq!(decls[0].methods[0].kind, DeclKind::Test);
    }

    #[test]
    fn loose_statements_become_script_declaration() {
        let source = "import sys\n\ntotal = 0\nfor line in sys.stdin:\n    if line.strip():\n        total += 1\nprint(total)\n";
        let decls = analyze_fragment(source).unwrap();
        assert_eq!(decls.len(), 1);
        assert!(decls[0].is_script());
        assert_eq!(decls[0].kind, DeclKind::Algorithm);
        assert!(decls[0].start_byte > 0);
    }

    #[test]
    fn defs_with_trailing_usage_yield_only_the_def() {
        let source = "def double(x):\n    return 2 * x\n\nprint(double(4))\n";
        let decls = analyze_fragment(source).unwrap();
        assert_eq!(decls.len(), 1);
        assert_eq!(decls[0].signature.name, "double");
    }

    #[test]
    fn invalid_python_is_a_parse_error() {
        let err = analyze_fragment("def broken(:\n    pass\n").unwrap_err();
        assert!(err.line >= 1);
    }

    #[test]
    fn parse_error_reports_offending_line() {
        let err = analyze_fragment("x = 1\ny = (\n").unwrap_err();
        assert!(err.line >= 2, "line was {}", err.line);
    }

    #[test]
    fn recursion_is_detected() {
        let source =
            "def fact(n):\n    if n <= 1:\n        return 1\n    return n * fact(n - 1)\n";
        let decls = analyze_fragment(source).unwrap();
        assert!(decls[0].is_self_recursive());
    }
}
