//! Header extraction: structured signatures, verbatim header slices,
//! docstrings.

use ruff_python_ast::{self as ast, Expr, Stmt};
use ruff_text_size::{Ranged, TextSize};

use super::body::node_source;
use super::types::{Param, Signature};

/// Structured signature of a function definition. Annotation and default
/// texts are verbatim slices of the fragment.
pub(crate) fn function_signature(def: &ast::StmtFunctionDef, source: &str) -> Signature {
    let mut params = Vec::new();

    for arg in &def.parameters.posonlyargs {
        params.push(regular_param(arg, source));
    }
    for arg in &def.parameters.args {
        params.push(regular_param(arg, source));
    }
    if let Some(vararg) = &def.parameters.vararg {
        params.push(Param {
            name: format!("*{}", vararg.name),
            annotation: vararg.annotation.as_deref().map(|a| annotation_text(a, source)),
            default: None,
        });
    }
    for arg in &def.parameters.kwonlyargs {
        params.push(regular_param(arg, source));
    }
    if let Some(kwarg) = &def.parameters.kwarg {
        params.push(Param {
            name: format!("**{}", kwarg.name),
            annotation: kwarg.annotation.as_deref().map(|a| annotation_text(a, source)),
            default: None,
        });
    }

    Signature {
        name: def.name.id.to_string(),
        params,
        returns: def.returns.as_deref().map(|r| annotation_text(r, source)),
        is_async: def.is_async,
        decorators: decorator_texts(&def.decorator_list, source),
    }
}

/// Class headers carry no parameters or return slot of their own.
pub(crate) fn class_signature(def: &ast::StmtClassDef, source: &str) -> Signature {
    Signature {
        name: def.name.id.to_string(),
        params: Vec::new(),
        returns: None,
        is_async: false,
        decorators: decorator_texts(&def.decorator_list, source),
    }
}

fn regular_param(arg: &ast::ParameterWithDefault, source: &str) -> Param {
    Param {
        name: arg.parameter.name.to_string(),
        annotation: arg
            .parameter
            .annotation
            .as_deref()
            .map(|a| annotation_text(a, source)),
        default: arg.default.as_deref().map(|d| node_source(source, d).to_owned()),
    }
}

fn annotation_text(expr: &Expr, source: &str) -> String {
    node_source(source, expr).to_owned()
}

fn decorator_texts(decorators: &[ast::Decorator], source: &str) -> Vec<String> {
    decorators
        .iter()
        .map(|d| node_source(source, d).to_owned())
        .collect()
}

/// Full extent of a definition, decorators included.
pub(crate) fn definition_start(range_start: TextSize, decorators: &[ast::Decorator]) -> TextSize {
    decorators
        .first()
        .map_or(range_start, |d| range_start.min(d.range().start()))
}

/// Verbatim header lines: from the definition start (decorators included)
/// up to the first body statement, trailing whitespace trimmed.
pub(crate) fn header_slice(source: &str, start: TextSize, body: &[Stmt]) -> String {
    let end = body
        .first()
        .map_or_else(|| source.len(), |stmt| stmt.range().start().to_usize());
    source[start.to_usize()..end].trim_end().to_owned()
}

/// Leading whitespace of the line holding `start`.
pub(crate) fn line_indent(source: &str, start: TextSize) -> String {
    let offset = start.to_usize();
    let line_start = source[..offset].rfind('\n').map_or(0, |p| p + 1);
    source[line_start..offset]
        .chars()
        .take_while(|c| c.is_whitespace())
        .collect()
}

/// A leading string expression is the docstring.
pub(crate) fn extract_docstring(body: &[Stmt]) -> Option<String> {
    let Some(Stmt::Expr(first)) = body.first() else {
        return None;
    };
    if let Expr::StringLiteral(lit) = &*first.value {
        Some(lit.value.to_string())
    } else {
        None
    }
}

/// True for the statement that carries the docstring.
pub(crate) fn is_docstring_stmt(body: &[Stmt], position: usize) -> bool {
    position == 0
        && matches!(
            body.first(),
            Some(Stmt::Expr(first)) if matches!(&*first.value, Expr::StringLiteral(_))
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use ruff_python_parser::parse_module;

    fn first_function(source: &str) -> ast::StmtFunctionDef {
        let parsed = parse_module(source).unwrap();
        let module = parsed.into_syntax();
        match module.body.into_iter().next() {
            Some(Stmt::FunctionDef(def)) => def,
            other => panic!("expected function, got {other:?}"),
        }
    }

    #[test]
    fn annotations_and_defaults_are_verbatim() {
        let source = "def scale(values: list[int], factor: float = 1.0) -> list[float]:\n    pass\n";
        let sig = function_signature(&first_function(source), source);
        assert_eq!(sig.name, "scale");
        assert_eq!(sig.params[0].annotation.as_deref(), Some("list[int]"));
        assert_eq!(sig.params[1].default.as_deref(), Some("1.0"));
        assert_eq!(sig.returns.as_deref(), Some("list[float]"));
    }

    #[test]
    fn receiver_is_excluded_from_annotation_counts() {
        let source = "def area(self, width: int, height: int) -> int:\n    pass\n";
        let sig = function_signature(&first_function(source), source);
        assert_eq!(sig.annotation_counts(), (3, 3));
    }

    #[test]
    fn header_covers_decorators_through_colon() {
        let source = "@staticmethod\ndef ping() -> str:\n    return \"pong\"\n";
        let def = first_function(source);
        let start = definition_start(def.range().start(), &def.decorator_list);
        let header = header_slice(source, start, &def.body);
        assert_eq!(header, "@staticmethod\ndef ping() -> str:");
    }

    #[test]
    fn docstring_is_the_leading_string_expression() {
        let source = "def f():\n    \"\"\"Say hi.\"\"\"\n    return 1\n";
        let def = first_function(source);
        assert_eq!(extract_docstring(&def.body).as_deref(), Some("Say hi."));
        assert!(is_docstring_stmt(&def.body, 0));
        assert!(!is_docstring_stmt(&def.body, 1));
    }
}
