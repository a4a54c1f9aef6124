//! Core unit model shared by every pipeline stage.
//!
//! A [`SourceUnit`] is one fenced code fragment lifted out of an
//! instructional document by the scanner. Units are immutable once
//! discovered; every downstream stage produces new values instead of
//! patching them.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Guidance-verbosity band assigned to a unit by the (external) tier
/// detection step. Tier1 is the most detailed, Tier3 the least.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum Tier {
    /// Most detailed guidance: every hint category is emitted.
    Tier1,
    /// Intermediate guidance (the default when detection is unresolved).
    #[default]
    Tier2,
    /// Minimal guidance: conceptual orientation only.
    Tier3,
}

impl Tier {
    /// Band index, 1-based. Used for tier-distance comparisons.
    #[must_use]
    pub fn band(self) -> u8 {
        match self {
            Self::Tier1 => 1,
            Self::Tier2 => 2,
            Self::Tier3 => 3,
        }
    }

    /// Parses an explicit tier marker value ("1", "2", "3").
    #[must_use]
    pub fn from_marker(value: &str) -> Option<Self> {
        match value.trim() {
            "1" => Some(Self::Tier1),
            "2" => Some(Self::Tier2),
            "3" => Some(Self::Tier3),
            _ => None,
        }
    }

    /// Maps a 1-based band index back to a tier.
    #[must_use]
    pub fn from_band(band: u8) -> Option<Self> {
        match band {
            1 => Some(Self::Tier1),
            2 => Some(Self::Tier2),
            3 => Some(Self::Tier3),
            _ => None,
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Tier{}", self.band())
    }
}

/// Declared language of a fenced code block.
///
/// Only Python fragments enter the conversion pipeline; anything else is
/// preserved byte-for-byte and never touched (fail-closed at the boundary).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LanguageTag {
    /// A Python fragment (fence info `python`, `py` or `python3`).
    Python,
    /// Any other declared language, kept verbatim for reporting.
    Other(CompactString),
}

impl LanguageTag {
    /// Maps a fence info string to a language tag.
    #[must_use]
    pub fn from_fence(info: &str) -> Self {
        let tag = info.split_whitespace().next().unwrap_or("");
        match tag.to_ascii_lowercase().as_str() {
            "python" | "py" | "python3" => Self::Python,
            other => Self::Other(CompactString::from(other)),
        }
    }

    /// Whether the pipeline can process this language.
    #[must_use]
    pub fn is_supported(&self) -> bool {
        matches!(self, Self::Python)
    }
}

impl std::fmt::Display for LanguageTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Python => write!(f, "python"),
            Self::Other(tag) if tag.is_empty() => write!(f, "(none)"),
            Self::Other(tag) => write!(f, "{tag}"),
        }
    }
}

/// One code fragment discovered in an instructional document.
///
/// Immutable once created by the scanner. The `context` string carries the
/// prose surrounding the fragment and is read only by the hint-quality
/// check; the pipeline never alters it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceUnit {
    /// Stable unit id, `<document path>#<fragment ordinal>`.
    pub id: String,
    /// Raw fragment text exactly as it appears between the fences.
    pub fragment: String,
    /// Declared language tag from the opening fence.
    pub language: LanguageTag,
    /// Resolved guidance tier (defaults to Tier2 when unresolved).
    pub tier: Tier,
    /// Surrounding prose, used by the hint-quality check only.
    pub context: String,
}

impl SourceUnit {
    /// Convenience constructor used by tests and programmatic callers.
    #[must_use]
    pub fn new(id: impl Into<String>, fragment: impl Into<String>, tier: Tier) -> Self {
        Self {
            id: id.into(),
            fragment: fragment.into(),
            language: LanguageTag::Python,
            tier,
            context: String::new(),
        }
    }

    /// Builder-style method to attach surrounding prose context.
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    /// Builder-style method to override the declared language.
    #[must_use]
    pub fn with_language(mut self, language: LanguageTag) -> Self {
        self.language = language;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_from_fence() {
        assert_eq!(LanguageTag::from_fence("python"), LanguageTag::Python);
        assert_eq!(LanguageTag::from_fence("py"), LanguageTag::Python);
        assert_eq!(LanguageTag::from_fence("Python3"), LanguageTag::Python);
        assert_eq!(
            LanguageTag::from_fence("rust"),
            LanguageTag::Other(CompactString::from("rust"))
        );
        assert!(!LanguageTag::from_fence("").is_supported());
    }

    #[test]
    fn test_fence_info_extra_attributes() {
        // Some renderers allow attributes after the language tag.
        assert_eq!(
            LanguageTag::from_fence("python title=\"ex\""),
            LanguageTag::Python
        );
    }

    #[test]
    fn test_tier_bands_are_ordered() {
        assert!(Tier::Tier1.band() < Tier::Tier2.band());
        assert!(Tier::Tier2.band() < Tier::Tier3.band());
        assert_eq!(Tier::default(), Tier::Tier2);
    }

    #[test]
    fn test_tier_from_marker() {
        assert_eq!(Tier::from_marker(" 1 "), Some(Tier::Tier1));
        assert_eq!(Tier::from_marker("3"), Some(Tier::Tier3));
        assert_eq!(Tier::from_marker("advanced"), None);
    }
}
