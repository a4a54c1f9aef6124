//! Kind classification with fixed priority: Test > Algorithm > Function >
//! Class.

use crate::constants::{get_test_class_re, get_test_name_re};

use super::types::{BodyStmt, DeclKind, Declaration};

/// Classifies a function or method from its name and analyzed body.
///
/// Test requires both the naming convention and at least one observed
/// assertion. Algorithm requires control flow nested two levels deep.
pub(crate) fn classify_function(name: &str, body: &[BodyStmt]) -> DeclKind {
    if get_test_name_re().is_match(name) && has_assertions(body) {
        return DeclKind::Test;
    }
    if body.iter().any(|stmt| stmt.control_depth >= 2) {
        return DeclKind::Algorithm;
    }
    DeclKind::Function
}

/// A class is Test when its name matches the convention and any method
/// asserts. A class body is definitions, so Algorithm never applies here;
/// methods carry their own kinds.
pub(crate) fn classify_class(name: &str, methods: &[Declaration]) -> DeclKind {
    if get_test_class_re().is_match(name) && methods.iter().any(|m| has_assertions(&m.body)) {
        return DeclKind::Test;
    }
    DeclKind::Class
}

/// Loose module-level statements have no name to match, so Test never
/// applies; depth decides between Algorithm and Function.
pub(crate) fn classify_script(body: &[BodyStmt]) -> DeclKind {
    if body.iter().any(|stmt| stmt.control_depth >= 2) {
        DeclKind::Algorithm
    } else {
        DeclKind::Function
    }
}

fn has_assertions(body: &[BodyStmt]) -> bool {
    body.iter().any(|stmt| !stmt.assertions.is_empty())
}
