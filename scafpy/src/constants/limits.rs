/// Maximum structurally meaningful statements allowed in any placeholder or
/// hint before the leak detector fires.
pub const DEFAULT_MAX_IMPLEMENTATION_LINES: usize = 5;
/// Minimum annotated fraction of parameter + return positions.
pub const DEFAULT_MIN_ANNOTATION_COVERAGE: f64 = 0.95;
/// Minimum weighted quality score required for promotion to Completed.
pub const DEFAULT_MIN_QUALITY_SCORE: f64 = 0.80;
/// Timeout for the optional external hint-synthesis collaborator.
pub const DEFAULT_COLLABORATOR_TIMEOUT_MS: u64 = 2000;
/// Approximate token count of one meaningful statement; the hint-quality
/// check converts `max_implementation_lines` into a token-run budget with it.
pub const TOKENS_PER_STATEMENT: usize = 6;
/// Recursion guard for the body walker on pathologically nested fragments.
pub const MAX_NESTING_DEPTH: usize = 400;

/// Leak detector weight in the aggregate quality score.
pub const CHECK_WEIGHT_LEAK: f64 = 0.40;
/// Annotation coverage weight in the aggregate quality score.
pub const CHECK_WEIGHT_COVERAGE: f64 = 0.20;
/// Hint quality weight in the aggregate quality score.
pub const CHECK_WEIGHT_HINT_QUALITY: f64 = 0.20;
/// Tier consistency weight in the aggregate quality score.
pub const CHECK_WEIGHT_TIER: f64 = 0.20;

/// Default configuration filename.
pub const CONFIG_FILENAME: &str = ".scafpy.toml";
/// Python project configuration filename.
pub const PYPROJECT_FILENAME: &str = "pyproject.toml";
/// Suffix appended to a document stem when writing the scaffolded copy.
pub const SCAFFOLD_FILE_SUFFIX: &str = ".scaffold.md";
