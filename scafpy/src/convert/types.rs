//! Conversion artifacts: hints and scaffolded units.

use compact_str::CompactString;
use serde::Serialize;

use crate::analyzer::DeclKind;
use crate::unit::Tier;

/// What a hint talks about. Ordering is render order: conceptual
/// orientation first, concrete pointers last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum HintCategory {
    /// What problem this solves and why it is shaped this way.
    Conceptual,
    /// How to attack the problem step by step.
    Approach,
    /// Concrete mechanics: constructs, complexity, pitfalls.
    Implementation,
    /// Where to read more.
    Resource,
}

impl HintCategory {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Conceptual => "conceptual",
            Self::Approach => "approach",
            Self::Implementation => "implementation",
            Self::Resource => "resource",
        }
    }

    /// Parses a config-file category name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "conceptual" => Some(Self::Conceptual),
            "approach" => Some(Self::Approach),
            "implementation" => Some(Self::Implementation),
            "resource" => Some(Self::Resource),
            _ => None,
        }
    }
}

impl std::fmt::Display for HintCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One piece of guidance attached to a scaffold.
///
/// `tier_specific` hints exist because of the declared tier band; hints
/// the converter mandates structurally (class collaboration, complexity)
/// carry `false` and stay out of band inference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hint {
    pub category: HintCategory,
    pub text: String,
    pub tier_specific: bool,
}

impl Hint {
    #[must_use]
    pub fn banded(category: HintCategory, text: impl Into<String>) -> Self {
        Self {
            category,
            text: text.into(),
            tier_specific: true,
        }
    }

    #[must_use]
    pub fn structural(category: HintCategory, text: impl Into<String>) -> Self {
        Self {
            category,
            text: text.into(),
            tier_specific: false,
        }
    }
}

/// The converted form of one declaration.
///
/// `placeholder` is the scaffold body text and always parses as Python on
/// its own. `preserved` lists the statements carried over verbatim
/// (test arrange lines, class fields); the leak check exempts exactly
/// those. Class members are nested units sharing the parent's id.
#[derive(Debug, Clone)]
pub struct ScaffoldedUnit {
    /// Owning source unit id; assigned by the pipeline, empty until then.
    pub unit_id: CompactString,
    pub kind: DeclKind,
    pub tier: Tier,
    /// Declaration name; empty for script-level scaffolds.
    pub name: String,
    /// Verbatim header lines, decorators included; empty for scripts.
    pub header: String,
    /// Docstring text without quotes; empty when not applicable.
    pub docstring: String,
    pub hints: Vec<Hint>,
    pub placeholder: String,
    pub preserved: Vec<String>,
    pub members: Vec<ScaffoldedUnit>,
    /// Original indentation of the declaration within its fragment.
    pub indent: String,
    /// Indentation of the body block under the header.
    pub body_indent: String,
}

impl ScaffoldedUnit {
    /// Orders hints for rendering: category order, stable within one
    /// category so generator order survives.
    pub fn sort_hints(&mut self) {
        self.hints.sort_by_key(|hint| hint.category);
        for member in &mut self.members {
            member.sort_hints();
        }
    }

    /// All hints of the unit and its members.
    pub fn all_hints(&self) -> impl Iterator<Item = &Hint> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let unit = stack.pop()?;
            stack.extend(unit.members.iter());
            Some(unit.hints.iter())
        })
        .flatten()
    }

    /// Hash of the rendered scaffold, used to tie quality reports and
    /// status transitions to exact content.
    #[must_use]
    pub fn structural_hash(&self) -> u64 {
        crate::utils::structural_hash(&super::render::declaration_text(self))
    }
}
