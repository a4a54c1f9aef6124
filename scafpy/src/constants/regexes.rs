use regex::Regex;
use std::sync::OnceLock;

/// Returns the compiled regex for test-style function names.
pub fn get_test_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    #[allow(clippy::expect_used)]
    RE.get_or_init(|| {
        Regex::new(r"^test_|_test$").expect("Invalid test function name regex pattern")
    })
}

/// Returns the compiled regex for test-style class names.
pub fn get_test_class_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    #[allow(clippy::expect_used)]
    RE.get_or_init(|| Regex::new(r"^Test|Test$").expect("Invalid test class name regex pattern"))
}

/// Returns the compiled regex for unittest-style assertion method names.
pub fn get_assert_method_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    #[allow(clippy::expect_used)]
    RE.get_or_init(|| {
        Regex::new(r"^assert[A-Z]\w*$").expect("Invalid assertion method regex pattern")
    })
}

/// Returns the compiled regex for explicit tier markers in document prose,
/// e.g. `<!-- tier: 2 -->`.
pub fn get_tier_marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    #[allow(clippy::expect_used)]
    RE.get_or_init(|| {
        Regex::new(r"(?i)<!--\s*tier:\s*([123])\s*-->").expect("Invalid tier marker regex pattern")
    })
}

/// Returns the compiled regex for content terms (identifier-like words).
pub fn get_term_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    #[allow(clippy::expect_used)]
    RE.get_or_init(|| Regex::new(r"\b[a-zA-Z_]\w*\b").expect("Invalid term regex pattern"))
}
