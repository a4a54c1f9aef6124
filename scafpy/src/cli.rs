use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Help text for configuration file options, shown at the bottom of --help.
const CONFIG_HELP: &str = "\
CONFIGURATION FILE (.scafpy.toml):
  Create this file in your project root to set defaults.

  [scafpy]
  # Conversion thresholds
  max_implementation_lines = 5     # Meaningful statements per placeholder or hint
  min_annotation_coverage = 0.95   # Annotated fraction of parameter/return positions
  min_quality_score = 0.80         # Verification score required for completion

  # Hint synthesis
  collaborator_timeout_ms = 2000   # External synthesizer budget before template fallback

  # Path filters
  exclude_folders = [\"drafts\", \"solutions\"]
  include_folders = [\"site\"]        # Force-include these

  # Hint categories required per tier (tier1 is the most guided)
  tier-bands = { tier2 = [\"conceptual\", \"approach\", \"implementation\"] }

  # Per-file tier overrides (glob -> tier band 1..3)
  per-file-tiers = { \"docs/intro/*.md\" = 1, \"docs/advanced/*.md\" = 3 }
";

/// Command line interface configuration using `clap`.
/// This struct defines the arguments and flags accepted by the program.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "ScafPy - Convert runnable Python examples in markdown into scaffolded exercises",
    long_about = None,
    after_help = CONFIG_HELP
)]
pub struct Cli {
    #[command(subcommand)]
    /// The subcommand to execute (e.g., check, init).
    pub command: Option<Commands>,

    /// Paths to convert (markdown files or directories).
    /// Can be a single directory, multiple files, or a mix of both.
    /// When no paths are provided, defaults to the current directory.
    #[arg(default_value = ".")]
    pub paths: Vec<PathBuf>,

    /// Directory for converted documents.
    /// By default each `guide.md` becomes `guide.scaffold.md` beside the source.
    #[arg(long, short = 'o')]
    pub output_dir: Option<PathBuf>,

    /// Force every fragment to this tier band (1 = most guided, 3 = least).
    /// Overrides in-document markers, keyword cues and per-file config.
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=3))]
    pub tier: Option<u8>,

    /// Output raw JSON.
    #[arg(long)]
    pub json: bool,

    /// Enable verbose output for debugging (shows configuration and exclusions).
    #[arg(short, long)]
    pub verbose: bool,

    /// Quiet mode: show only the summary line (no detailed tables).
    #[arg(long)]
    pub quiet: bool,

    /// Set the meaningful-statement budget for placeholders and hints (overrides config).
    #[arg(long)]
    pub max_implementation_lines: Option<usize>,

    /// Set the annotation coverage floor, 0.0-1.0 (overrides config).
    #[arg(long)]
    pub min_annotation_coverage: Option<f64>,

    /// Set the verification score a unit needs to complete, 0.0-1.0 (overrides config).
    #[arg(long)]
    pub min_quality_score: Option<f64>,

    /// Folders to exclude from document scanning.
    #[arg(long, alias = "exclude-folder")]
    pub exclude_folders: Vec<String>,

    /// Folders to force-include in scanning (overrides default exclusions).
    #[arg(long, alias = "include-folder")]
    pub include_folders: Vec<String>,

    /// Exit with code 1 if any unit needs review or errored.
    /// For CI/CD integration.
    #[arg(long)]
    pub fail_on_review: bool,
}

#[derive(Subcommand, Debug)]
/// Available subcommands.
pub enum Commands {
    /// Verify conversion quality without writing any file
    Check {
        /// Paths to check (markdown files or directories)
        #[arg(default_value = ".")]
        paths: Vec<PathBuf>,
    },
    /// Write a starter configuration file
    Init,
}
