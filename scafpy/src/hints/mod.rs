//! Tier-banded hint generation.
//!
//! The generator's one hard contract: for a given tier, the returned
//! list holds at least one hint per required category and nothing in any
//! other category. Texts come from an optional external synthesizer when
//! one is wired in, templates otherwise; a synthesizer failure or timeout
//! silently falls back to templates.

pub mod bands;
mod templates;
pub mod synthesis;

pub use bands::BandTable;
pub use synthesis::{HintSynthesizer, SynthesisRequest, TransientCollaboratorError};

use std::sync::Arc;
use std::time::Duration;

use crate::analyzer::Declaration;
use crate::constants::DEFAULT_COLLABORATOR_TIMEOUT_MS;
use crate::convert::Hint;
use crate::unit::Tier;

use templates::{first_sentence, template_text};

pub struct HintGenerator {
    bands: BandTable,
    synthesizer: Option<Arc<dyn HintSynthesizer>>,
    timeout: Duration,
}

impl Default for HintGenerator {
    fn default() -> Self {
        Self::new(BandTable::default())
    }
}

impl HintGenerator {
    #[must_use]
    pub fn new(bands: BandTable) -> Self {
        Self {
            bands,
            synthesizer: None,
            timeout: Duration::from_millis(DEFAULT_COLLABORATOR_TIMEOUT_MS),
        }
    }

    /// Wires in an external synthesizer. Template fallback stays in place.
    #[must_use]
    pub fn with_synthesizer(mut self, synthesizer: Arc<dyn HintSynthesizer>) -> Self {
        self.synthesizer = Some(synthesizer);
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn bands(&self) -> &BandTable {
        &self.bands
    }

    /// Ordered hints for one declaration at the given tier.
    ///
    /// Synthesized hints are kept only for categories the tier requires;
    /// anything extra is dropped so the band stays structural. Missing
    /// categories are filled from templates.
    #[must_use]
    pub fn generate(&self, decl: &Declaration, tier: Tier) -> Vec<Hint> {
        let required = self.bands.categories(tier);
        let synthesized = self.synthesized(decl, tier);

        let mut hints = Vec::with_capacity(required.len());
        for &category in required {
            let mut found = false;
            if let Some(external) = &synthesized {
                for hint in external.iter().filter(|h| h.category == category) {
                    hints.push(Hint::banded(category, hint.text.clone()));
                    found = true;
                }
            }
            if !found {
                hints.push(Hint::banded(category, template_text(category, decl)));
            }
        }
        hints
    }

    fn synthesized(&self, decl: &Declaration, tier: Tier) -> Option<Vec<Hint>> {
        let synthesizer = self.synthesizer.as_ref()?;
        let request = SynthesisRequest {
            name: decl.signature.name.clone(),
            kind: decl.kind,
            tier,
            param_names: decl
                .signature
                .params
                .iter()
                .filter(|p| !p.is_receiver())
                .map(|p| p.name.clone())
                .collect(),
            docstring_topic: decl
                .docstring
                .as_deref()
                .map(|d| first_sentence(d).to_owned()),
        };
        synthesis::call_bounded(synthesizer, request, self.timeout).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::analyze_fragment;
    use crate::convert::HintCategory;

    fn decl(source: &str) -> Declaration {
        analyze_fragment(source).unwrap().remove(0)
    }

    fn categories(hints: &[Hint]) -> Vec<HintCategory> {
        hints.iter().map(|h| h.category).collect()
    }

    #[test]
    fn tier1_gets_all_four_categories() {
        let generator = HintGenerator::default();
        let hints = generator.generate(&decl("def f(x):\n    return x\n"), Tier::Tier1);
        assert_eq!(
            categories(&hints),
            [
                HintCategory::Conceptual,
                HintCategory::Approach,
                HintCategory::Implementation,
                HintCategory::Resource,
            ]
        );
    }

    #[test]
    fn tier2_gets_conceptual_and_approach_only() {
        let generator = HintGenerator::default();
        let hints = generator.generate(&decl("def f(x):\n    return x\n"), Tier::Tier2);
        assert_eq!(
            categories(&hints),
            [HintCategory::Conceptual, HintCategory::Approach]
        );
    }

    #[test]
    fn tier3_gets_conceptual_only() {
        let generator = HintGenerator::default();
        let hints = generator.generate(&decl("def f(x):\n    return x\n"), Tier::Tier3);
        assert_eq!(categories(&hints), [HintCategory::Conceptual]);
        assert!(hints[0].tier_specific);
    }

    #[test]
    fn synthesizer_extras_outside_the_band_are_dropped() {
        struct Chatty;
        impl HintSynthesizer for Chatty {
            fn synthesize(
                &self,
                _request: &SynthesisRequest,
            ) -> Result<Vec<Hint>, TransientCollaboratorError> {
                Ok(vec![
                    Hint::banded(HintCategory::Conceptual, "custom concept"),
                    Hint::banded(HintCategory::Resource, "custom link"),
                ])
            }
        }

        let generator = HintGenerator::default().with_synthesizer(Arc::new(Chatty));
        let hints = generator.generate(&decl("def f():\n    pass\n"), Tier::Tier3);
        assert_eq!(categories(&hints), [HintCategory::Conceptual]);
        assert_eq!(hints[0].text, "custom concept");
    }

    #[test]
    fn failing_synthesizer_falls_back_to_templates() {
        struct Broken;
        impl HintSynthesizer for Broken {
            fn synthesize(
                &self,
                _request: &SynthesisRequest,
            ) -> Result<Vec<Hint>, TransientCollaboratorError> {
                Err(TransientCollaboratorError::Failed("offline".to_owned()))
            }
        }

        let generator = HintGenerator::default().with_synthesizer(Arc::new(Broken));
        let hints = generator.generate(&decl("def add(a, b):\n    return a + b\n"), Tier::Tier2);
        assert_eq!(
            categories(&hints),
            [HintCategory::Conceptual, HintCategory::Approach]
        );
        assert!(!hints[0].text.is_empty());
    }
}
