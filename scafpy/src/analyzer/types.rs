//! Core data types produced by structural analysis.
//!
//! A fragment parses into an ordered list of [`Declaration`]s. Everything
//! downstream (conversion, hint generation, verification) reads these and
//! never mutates them.

use compact_str::CompactString;
use serde::Serialize;
use smallvec::SmallVec;

/// Structural category of a declaration.
///
/// Classification applies a fixed priority when several heuristics match:
/// `Test > Algorithm > Function > Class`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DeclKind {
    /// Named per a test convention and asserting at least once.
    Test,
    /// Contains control flow nested two or more levels deep.
    Algorithm,
    /// Any other function or method.
    Function,
    /// A class with its methods analyzed as children.
    Class,
}

impl DeclKind {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Test => "test",
            Self::Algorithm => "algorithm",
            Self::Function => "function",
            Self::Class => "class",
        }
    }
}

impl std::fmt::Display for DeclKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One formal parameter with its annotation and default, both verbatim
/// source slices when present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub annotation: Option<String>,
    pub default: Option<String>,
}

impl Param {
    /// `self` and `cls` receivers are excluded from annotation accounting.
    #[must_use]
    pub fn is_receiver(&self) -> bool {
        self.name == "self" || self.name == "cls"
    }
}

/// Structured view of a declaration header.
#[derive(Debug, Clone, Default)]
pub struct Signature {
    pub name: String,
    pub params: Vec<Param>,
    /// Return annotation, verbatim, when present.
    pub returns: Option<String>,
    pub is_async: bool,
    pub decorators: Vec<String>,
}

impl Signature {
    /// Counts (annotated, total) positions over parameters plus the return
    /// slot. Receivers do not count as positions.
    #[must_use]
    pub fn annotation_counts(&self) -> (usize, usize) {
        let mut annotated = 0;
        let mut total = 0;
        for param in &self.params {
            if param.is_receiver() {
                continue;
            }
            total += 1;
            if param.annotation.is_some() {
                annotated += 1;
            }
        }
        total += 1;
        if self.returns.is_some() {
            annotated += 1;
        }
        (annotated, total)
    }
}

/// Structural role of a body statement, used to label placeholder groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StmtRole {
    Return,
    Iterate,
    Branch,
    HandleErrors,
    Validate,
    Accumulate,
    Call,
    Initialize,
    Import,
    Other,
}

impl StmtRole {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Return => "return",
            Self::Iterate => "iterate",
            Self::Branch => "branch",
            Self::HandleErrors => "handle errors",
            Self::Validate => "validate",
            Self::Accumulate => "accumulate",
            Self::Call => "call",
            Self::Initialize => "initialize",
            Self::Import => "import",
            Self::Other => "statement",
        }
    }
}

/// Assertion observed inside a statement subtree.
///
/// `expected` is the verbatim literal from the comparison when one exists;
/// non-literal expectations keep only the mechanism.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertionInfo {
    pub mechanism: CompactString,
    pub expected: Option<String>,
}

/// One top-level statement of a declaration body, with aggregate facts
/// about its subtree.
#[derive(Debug, Clone)]
pub struct BodyStmt {
    pub role: StmtRole,
    /// Deepest control-flow nesting inside this statement. A plain
    /// statement is 0, a loop is 1, a branch inside that loop is 2.
    /// Nested function and class definitions are not descended into.
    pub control_depth: usize,
    /// Deepest loop-only nesting inside this statement.
    pub loop_depth: usize,
    /// 1-based line of the statement start within the fragment.
    pub line: usize,
    /// Verbatim source slice of the whole statement.
    pub source: String,
    /// Callee names invoked anywhere in the subtree, in source order.
    pub calls: SmallVec<[CompactString; 4]>,
    /// Assertions found in the subtree, in source order.
    pub assertions: SmallVec<[AssertionInfo; 1]>,
}

impl BodyStmt {
    /// True when the statement only carries a docstring or `...` filler.
    #[must_use]
    pub fn is_filler(&self) -> bool {
        self.role == StmtRole::Other && self.assertions.is_empty() && self.calls.is_empty()
    }
}

/// A single analyzed declaration.
///
/// Byte offsets cover the full extent including decorators, so a renderer
/// can splice scaffold text back into the surrounding fragment without
/// touching bytes outside the declaration.
#[derive(Debug, Clone)]
pub struct Declaration {
    pub kind: DeclKind,
    pub signature: Signature,
    /// Verbatim header lines: decorators through the colon.
    pub header: String,
    pub docstring: Option<String>,
    pub body: Vec<BodyStmt>,
    /// Methods of a class, each analyzed as a full declaration.
    pub methods: Vec<Declaration>,
    /// 1-based start line within the fragment.
    pub line: usize,
    pub start_byte: usize,
    pub end_byte: usize,
    /// Leading whitespace of the header line, carried so nested scaffolds
    /// re-indent correctly.
    pub indent: String,
    /// Leading whitespace of the first body statement line. Scaffold text
    /// is stored dedented and re-indented with this at render time.
    pub body_indent: String,
}

impl Declaration {
    /// Maximum loop nesting over the whole body.
    #[must_use]
    pub fn max_loop_depth(&self) -> usize {
        self.body.iter().map(|s| s.loop_depth).max().unwrap_or(0)
    }

    /// Maximum control-flow nesting over the whole body.
    #[must_use]
    pub fn max_control_depth(&self) -> usize {
        self.body.iter().map(|s| s.control_depth).max().unwrap_or(0)
    }

    /// True when the body calls the declaration itself.
    #[must_use]
    pub fn is_self_recursive(&self) -> bool {
        !self.signature.name.is_empty()
            && self
                .body
                .iter()
                .any(|s| s.calls.iter().any(|c| c == self.signature.name.as_str()))
    }

    /// Script-level declarations synthesized from loose statements carry
    /// no name and render without a `def` line.
    #[must_use]
    pub fn is_script(&self) -> bool {
        self.signature.name.is_empty()
    }

    /// Annotation counts aggregated over the declaration and its methods.
    /// Classes and scripts have no return slot of their own.
    #[must_use]
    pub fn annotation_counts(&self) -> (usize, usize) {
        if self.kind == DeclKind::Class {
            return self
                .methods
                .iter()
                .map(Declaration::annotation_counts)
                .fold((0, 0), |(a, t), (ma, mt)| (a + ma, t + mt));
        }
        if self.is_script() {
            return (0, 0);
        }
        self.signature.annotation_counts()
    }
}

/// Failure to parse a fragment as valid Python.
#[derive(Debug, Clone, Serialize)]
pub struct ParseError {
    pub message: String,
    /// 1-based line of the offending token within the fragment.
    pub line: usize,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for ParseError {}
