use crate::constants::{STOPWORDS, TERM_RE};
use ruff_text_size::TextSize;
use rustc_hash::FxHasher;
use std::hash::{Hash, Hasher};

/// A utility struct to convert byte offsets to line numbers.
///
/// The ruff parser works with byte offsets, but declarations and reports
/// want 1-indexed line numbers.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Stores the byte index of the start of each line.
    line_starts: Vec<usize>,
}

impl LineIndex {
    /// Creates a new `LineIndex` by scanning the source code for newlines.
    /// Uses byte iteration since '\n' is always a single byte in UTF-8.
    #[must_use]
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, byte) in source.as_bytes().iter().enumerate() {
            if *byte == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self { line_starts }
    }

    /// Converts a `TextSize` (byte offset) to a 1-indexed line number.
    #[must_use]
    pub fn line_index(&self, offset: TextSize) -> usize {
        let offset = offset.to_usize();
        match self.line_starts.binary_search(&offset) {
            Ok(line) => line + 1,
            Err(line) => line,
        }
    }
}

/// Extracts lowercased content terms from free text, dropping stopwords.
///
/// Shared by the hint-quality check (term overlap with prose context) and
/// the hint templates (topic words from docstrings).
#[must_use]
pub fn content_terms(text: &str) -> Vec<String> {
    TERM_RE()
        .find_iter(text)
        .map(|m| m.as_str().to_ascii_lowercase())
        .filter(|term| term.len() > 1 && !STOPWORDS().contains(&term.as_str()))
        .collect()
}

/// Splits a `snake_case` or `CamelCase` identifier into lowercase words.
#[must_use]
pub fn split_identifier(name: &str) -> Vec<String> {
    let mut words = Vec::new();
    for chunk in name.split('_').filter(|c| !c.is_empty()) {
        let mut current = String::new();
        let mut prev_upper = false;
        for ch in chunk.chars() {
            // Acronym runs ("JSON") stay one word; split on lower-to-upper.
            if ch.is_uppercase() && !current.is_empty() && !prev_upper {
                words.push(current.to_ascii_lowercase());
                current = String::new();
            }
            prev_upper = ch.is_uppercase();
            current.push(ch);
        }
        if !current.is_empty() {
            words.push(current.to_ascii_lowercase());
        }
    }
    words
}

/// Stable structural hash over any hashable value (FxHasher, not
/// cryptographic). Used to tie quality reports and retry guards to the
/// exact content they were computed from.
#[must_use]
pub fn structural_hash<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = FxHasher::default();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Normalizes a path for CLI display.
///
/// - Converts backslashes to forward slashes (cross-platform consistency)
/// - Strips a leading "./" or ".\" prefix (cleaner output)
#[must_use]
pub fn normalize_display_path(path: &std::path::Path) -> String {
    let s = path.to_string_lossy();
    let normalized = s.replace('\\', "/");
    normalized
        .strip_prefix("./")
        .unwrap_or(&normalized)
        .to_owned()
}
