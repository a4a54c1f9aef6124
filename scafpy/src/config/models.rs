use std::time::Duration;

use anyhow::anyhow;
use globset::{GlobBuilder, GlobMatcher};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Deserialize;

use crate::constants::DEFAULT_EXCLUDE_FOLDERS;
use crate::convert::HintCategory;
use crate::hints::{BandTable, HintGenerator};
use crate::unit::Tier;
use crate::verify::Verifier;

#[derive(Debug, Deserialize, Default, Clone)]
/// Top-level configuration struct.
pub struct Config {
    #[serde(default)]
    /// The main configuration section for scafpy.
    pub scafpy: ScafpyConfig,
    /// The path to the configuration file this was loaded from.
    /// Set during `load_from_path`, `None` if using defaults or programmatic config.
    #[serde(skip)]
    pub config_file_path: Option<std::path::PathBuf>,
}

#[derive(Debug, Deserialize, Default, Clone)]
/// Configuration options for scafpy.
pub struct ScafpyConfig {
    /// Meaningful-statement budget for placeholders and hints.
    pub max_implementation_lines: Option<usize>,
    /// Annotation coverage floor (0.0-1.0).
    pub min_annotation_coverage: Option<f64>,
    /// Quality score floor for Completed (0.0-1.0).
    pub min_quality_score: Option<f64>,
    /// Timeout for the optional hint synthesizer, in milliseconds.
    #[serde(alias = "collaborator-timeout-ms")]
    pub collaborator_timeout_ms: Option<u64>,
    /// List of folders to exclude from document scanning.
    pub exclude_folders: Option<Vec<String>>,
    /// List of folders to re-include after the defaults excluded them.
    pub include_folders: Option<Vec<String>>,
    /// Hint category lists per tier, overriding the default band table.
    #[serde(alias = "tier-bands")]
    pub tier_bands: Option<TierBandsConfig>,
    /// Per-file tier overrides (glob -> tier band 1..3).
    #[serde(alias = "per-file-tiers")]
    pub per_file_tiers: Option<FxHashMap<String, u8>>,
}

/// Category names per tier as written in the config file.
#[derive(Debug, Deserialize, Clone)]
pub struct TierBandsConfig {
    pub tier1: Option<Vec<String>>,
    pub tier2: Option<Vec<String>>,
    pub tier3: Option<Vec<String>>,
}

impl ScafpyConfig {
    /// Band table with config overrides applied; tiers left out keep
    /// their defaults. Unknown category names and non-monotonic tables
    /// are configuration errors, not silent fallbacks.
    pub fn band_table(&self) -> anyhow::Result<BandTable> {
        let Some(bands) = &self.tier_bands else {
            return Ok(BandTable::default());
        };
        let defaults = BandTable::default();
        let tier1 = parse_band(bands.tier1.as_deref(), &defaults, Tier::Tier1)?;
        let tier2 = parse_band(bands.tier2.as_deref(), &defaults, Tier::Tier2)?;
        let tier3 = parse_band(bands.tier3.as_deref(), &defaults, Tier::Tier3)?;
        BandTable::new(tier1, tier2, tier3).map_err(|err| anyhow!(err))
    }

    /// Folders skipped while scanning: defaults plus user excludes,
    /// minus explicit re-includes.
    #[must_use]
    pub fn exclude_set(&self) -> FxHashSet<String> {
        let mut set: FxHashSet<String> = DEFAULT_EXCLUDE_FOLDERS()
            .iter()
            .map(|folder| (*folder).to_owned())
            .collect();
        if let Some(extra) = &self.exclude_folders {
            set.extend(extra.iter().cloned());
        }
        if let Some(include) = &self.include_folders {
            for folder in include {
                set.remove(folder);
            }
        }
        set
    }

    /// Compiled per-file tier override rules. Invalid globs and tier
    /// numbers are skipped with a warning, matching how malformed
    /// per-file entries behave elsewhere.
    #[must_use]
    pub fn tier_overrides(&self) -> TierOverrides {
        let mut rules = Vec::new();
        if let Some(mapping) = &self.per_file_tiers {
            let mut entries: Vec<(&String, &u8)> = mapping.iter().collect();
            entries.sort();
            for (pattern, band) in entries {
                let Some(tier) = Tier::from_band(*band) else {
                    eprintln!("[WARN] Skipping per-file tier for '{pattern}': no tier band {band}");
                    continue;
                };
                match GlobBuilder::new(pattern).literal_separator(true).build() {
                    Ok(glob) => rules.push(TierOverrideRule {
                        matcher: glob.compile_matcher(),
                        tier,
                    }),
                    Err(err) => {
                        eprintln!("[WARN] Skipping invalid per-file tier glob '{pattern}': {err}");
                    }
                }
            }
        }
        TierOverrides { rules }
    }

    /// Verifier with every configured knob applied.
    pub fn verifier(&self) -> anyhow::Result<Verifier> {
        let mut verifier = Verifier::default().with_bands(self.band_table()?);
        if let Some(limit) = self.max_implementation_lines {
            verifier = verifier.with_max_implementation_lines(limit);
        }
        if let Some(floor) = self.min_annotation_coverage {
            verifier = verifier.with_min_annotation_coverage(floor);
        }
        if let Some(floor) = self.min_quality_score {
            verifier = verifier.with_min_quality_score(floor);
        }
        Ok(verifier)
    }

    /// Hint generator honoring band overrides and the collaborator timeout.
    pub fn hint_generator(&self) -> anyhow::Result<HintGenerator> {
        let mut generator = HintGenerator::new(self.band_table()?);
        if let Some(ms) = self.collaborator_timeout_ms {
            generator = generator.with_timeout(Duration::from_millis(ms));
        }
        Ok(generator)
    }
}

fn parse_band(
    names: Option<&[String]>,
    defaults: &BandTable,
    tier: Tier,
) -> anyhow::Result<Vec<HintCategory>> {
    match names {
        Some(names) => names
            .iter()
            .map(|name| {
                HintCategory::from_name(name)
                    .ok_or_else(|| anyhow!("unknown hint category `{name}` in tier bands"))
            })
            .collect(),
        None => Ok(defaults.categories(tier).to_vec()),
    }
}

pub(crate) struct TierOverrideRule {
    matcher: GlobMatcher,
    tier: Tier,
}

/// Glob rules mapping document paths to forced tiers.
pub struct TierOverrides {
    rules: Vec<TierOverrideRule>,
}

impl TierOverrides {
    /// Forced tier for a document path. When several globs match, the
    /// lexicographically last pattern wins.
    #[must_use]
    pub fn resolve(&self, path: &str) -> Option<Tier> {
        self.rules
            .iter()
            .filter(|rule| rule.matcher.is_match(path))
            .map(|rule| rule.tier)
            .next_back()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub(super) struct PyProject {
    pub(super) tool: ToolConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub(super) struct ToolConfig {
    pub(super) scafpy: ScafpyConfig,
}
