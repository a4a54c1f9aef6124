//! Command implementations behind the CLI: convert, check, init.
//!
//! Each command takes a writer so tests can capture output, and returns
//! the process exit code. File writes happen only in `run_convert`, and
//! only for documents where at least one unit completed.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use colored::Colorize;
use rustc_hash::FxHashMap;

use crate::batch::{BatchRun, BatchRunner};
use crate::config::Config;
use crate::constants::DEFAULT_MIN_ANNOTATION_COVERAGE;
use crate::document::{scan_path, ScannedDocument};
use crate::output;
use crate::progress::ConversionStatus;
use crate::unit::{SourceUnit, Tier};
use crate::utils::normalize_display_path;

/// Options shared by the convert and check commands.
#[derive(Debug, Default)]
pub struct ConvertOptions {
    /// Output raw JSON instead of tables.
    pub json: bool,
    /// Show only the summary line.
    pub quiet: bool,
    /// Narrate configuration and exclusions to stderr.
    pub verbose: bool,
    /// Directory for converted documents (default: beside the source).
    pub output_dir: Option<PathBuf>,
    /// Force every unit to this tier band (1-3), overriding detection.
    pub tier: Option<u8>,
    /// Placeholder/hint statement budget override.
    pub max_implementation_lines: Option<usize>,
    /// Annotation coverage floor override.
    pub min_annotation_coverage: Option<f64>,
    /// Completion score floor override.
    pub min_quality_score: Option<f64>,
    /// Extra folders to skip while scanning.
    pub exclude_folders: Vec<String>,
    /// Folders to re-include after defaults excluded them.
    pub include_folders: Vec<String>,
    /// Exit 1 when any unit lands in needs-review or errors.
    pub fail_on_review: bool,
}

/// Everything a run needs once configuration and scanning are done.
struct ConversionSession {
    documents: Vec<ScannedDocument>,
    units: Vec<SourceUnit>,
    runner: BatchRunner,
    coverage_floor: f64,
}

fn prepare_session(paths: &[PathBuf], options: &ConvertOptions) -> Result<ConversionSession> {
    let config_root = paths.first().map_or_else(|| Path::new("."), PathBuf::as_path);
    let config = Config::load_from_path(config_root);

    if options.verbose {
        match &config.config_file_path {
            Some(path) => eprintln!("[VERBOSE] Loaded configuration from {}", path.display()),
            None => eprintln!("[VERBOSE] No configuration file found, using defaults"),
        }
    }

    let mut exclude = config.scafpy.exclude_set();
    exclude.extend(options.exclude_folders.iter().cloned());
    for folder in &options.include_folders {
        exclude.remove(folder);
    }

    let mut documents = Vec::new();
    for path in paths {
        documents.extend(scan_path(path, &exclude)?);
    }

    let overrides = config.scafpy.tier_overrides();
    let forced = options.tier.and_then(Tier::from_band);
    let mut units = Vec::new();
    for document in &documents {
        let document_tier =
            forced.or_else(|| overrides.resolve(&normalize_display_path(&document.path)));
        let mut document_units = document.units();
        if let Some(tier) = document_tier {
            for unit in &mut document_units {
                unit.tier = tier;
            }
        }
        units.extend(document_units);
    }

    let mut verifier = config.scafpy.verifier()?;
    if let Some(limit) = options.max_implementation_lines {
        verifier = verifier.with_max_implementation_lines(limit);
    }
    if let Some(floor) = options.min_annotation_coverage {
        verifier = verifier.with_min_annotation_coverage(floor);
    }
    if let Some(floor) = options.min_quality_score {
        verifier = verifier.with_min_quality_score(floor);
    }
    let generator = config.scafpy.hint_generator()?;

    let coverage_floor = options
        .min_annotation_coverage
        .or(config.scafpy.min_annotation_coverage)
        .unwrap_or(DEFAULT_MIN_ANNOTATION_COVERAGE);

    Ok(ConversionSession {
        documents,
        units,
        runner: BatchRunner::new(generator, verifier),
        coverage_floor,
    })
}

/// Executes the conversion over every document under `paths`.
///
/// Returns the process exit code: 0 on success, 1 when `fail_on_review`
/// is set and any unit needs attention, or when the run was cancelled.
///
/// # Errors
///
/// Returns an error if scanning, configuration loading, or file writes fail.
pub fn run_convert<W: Write>(
    paths: &[PathBuf],
    options: &ConvertOptions,
    cancel: &AtomicBool,
    writer: &mut W,
) -> Result<i32> {
    let start_time = Instant::now();
    let mut session = prepare_session(paths, options)?;

    if options.verbose && !options.json {
        output::print_exclusion_list(&mut std::io::stderr(), &options.exclude_folders)?;
        eprintln!("[VERBOSE] {} units queued", session.units.len());
    }

    if session.units.is_empty() && !options.json {
        writeln!(writer, "No Python fragments found.")?;
        return Ok(0);
    }

    if !options.json && !options.quiet {
        session.runner.progress_bar = Some(Arc::new(output::create_progress_bar(
            session.units.len() as u64,
        )));
    }
    let run = session.runner.run(&session.units, cancel);
    if let Some(pb) = session.runner.progress_bar.take() {
        pb.finish_and_clear();
    }

    let written = write_scaffolds(&session.documents, &run, options.output_dir.as_deref())?;

    if options.json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&run)?)?;
    } else {
        if options.quiet {
            output::print_report_quiet(writer, &run)?;
        } else {
            output::print_report(writer, &run)?;
            output::print_summary_pills(writer, &run)?;
            output::print_conversion_stats(
                writer,
                &run,
                session.documents.len(),
                session.coverage_floor,
            )?;
        }
        for path in &written {
            writeln!(writer, "  wrote {}", normalize_display_path(path).bold())?;
        }
        writeln!(
            writer,
            "{} in {:.2}s",
            "Conversion completed".green().bold(),
            start_time.elapsed().as_secs_f64()
        )?;
    }

    if run.cancelled {
        return Ok(1);
    }
    let needs_attention = run.snapshot.needs_review > 0 || run.stage_errors.total() > 0;
    if options.fail_on_review && needs_attention {
        return Ok(1);
    }
    Ok(0)
}

/// Verifies every unit without writing any file.
///
/// Exit code 0 only when every unit converted and passed verification.
///
/// # Errors
///
/// Returns an error if scanning or configuration loading fails.
pub fn run_check<W: Write>(
    paths: &[PathBuf],
    options: &ConvertOptions,
    cancel: &AtomicBool,
    writer: &mut W,
) -> Result<i32> {
    let mut session = prepare_session(paths, options)?;

    if session.units.is_empty() && !options.json {
        writeln!(writer, "No Python fragments found.")?;
        return Ok(0);
    }

    let run = session.runner.run(&session.units, cancel);

    let all_converted = !run.cancelled
        && run.outcomes.iter().all(|outcome| {
            matches!(
                outcome.status,
                ConversionStatus::Completed | ConversionStatus::Verified
            )
        });

    if options.json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&run)?)?;
    } else {
        for outcome in &run.outcomes {
            if let Some(report) = &outcome.report {
                output::print_violations(writer, &outcome.unit_id, report)?;
            }
        }
        let errors: Vec<_> = run.errors().collect();
        output::print_conversion_errors(writer, &errors)?;
        writeln!(writer)?;
        if all_converted {
            writeln!(
                writer,
                "{}",
                format!("✓ All {} units pass verification.", run.snapshot.total).green()
            )?;
        } else {
            let failing = run.snapshot.total - run.snapshot.completed;
            writeln!(
                writer,
                "{}",
                format!("✗ {failing} of {} units need attention.", run.snapshot.total)
                    .red()
                    .bold()
            )?;
        }
    }

    Ok(i32::from(!all_converted))
}

fn write_scaffolds(
    documents: &[ScannedDocument],
    run: &BatchRun,
    output_dir: Option<&Path>,
) -> Result<Vec<PathBuf>> {
    let mut replacements: FxHashMap<String, String> = FxHashMap::default();
    for outcome in &run.outcomes {
        if outcome.status == ConversionStatus::Completed {
            if let Some(scaffold) = &outcome.scaffold {
                replacements.insert(outcome.unit_id.clone(), scaffold.clone());
            }
        }
    }

    let mut written = Vec::new();
    for document in documents {
        let touched = document
            .blocks
            .iter()
            .any(|block| replacements.contains_key(&block.unit.id));
        if !touched {
            continue;
        }

        let rendered = document.substituted(&replacements);
        let out_path = document.output_path(output_dir);
        if let Some(parent) = out_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
        }
        fs::write(&out_path, rendered)
            .with_context(|| format!("failed to write {}", out_path.display()))?;
        written.push(out_path);
    }
    Ok(written)
}

const DEFAULT_CONFIG: &str = r#"
[scafpy]
# Conversion thresholds
max_implementation_lines = 5     # Meaningful statements allowed per placeholder or hint
min_annotation_coverage = 0.95   # Annotated fraction of parameter/return positions
min_quality_score = 0.80         # Verification score required for completion

# Hint synthesis
collaborator_timeout_ms = 2000   # External synthesizer budget before template fallback

# Path filters
exclude_folders = ["drafts", "solutions"]
include_folders = []             # Re-include folders the defaults exclude

# Per-file tier overrides (glob -> tier band 1..3)
[scafpy.per_file_tiers]
"docs/intro/**/*.md" = 1
"docs/advanced/**/*.md" = 3
"#;

/// Starter `[tool.scafpy]` table appended to an existing pyproject.toml.
pub const DEFAULT_PYPROJECT_CONFIG: &str = r#"
[tool.scafpy]
# Conversion thresholds
max_implementation_lines = 5     # Meaningful statements allowed per placeholder or hint
min_annotation_coverage = 0.95   # Annotated fraction of parameter/return positions
min_quality_score = 0.80         # Verification score required for completion

# Hint synthesis
collaborator_timeout_ms = 2000   # External synthesizer budget before template fallback

# Path filters
exclude_folders = ["drafts", "solutions"]
include_folders = []             # Re-include folders the defaults exclude

# Per-file tier overrides (glob -> tier band 1..3)
[tool.scafpy.per_file_tiers]
"docs/intro/**/*.md" = 1
"docs/advanced/**/*.md" = 3
"#;

/// Run the init command to write a starter configuration under `root`.
///
/// # Errors
///
/// Returns an error if reading or writing the configuration file fails.
pub fn run_init_in<W: Write>(root: &Path, writer: &mut W) -> Result<()> {
    writeln!(writer, "Initializing scafpy configuration...")?;
    handle_config_file(root, writer)?;
    writeln!(writer, "Initialization complete!")?;
    Ok(())
}

fn handle_config_file<W: Write>(root: &Path, writer: &mut W) -> Result<()> {
    let pyproject_path = root.join("pyproject.toml");
    let scafpy_toml_path = root.join(".scafpy.toml");

    if pyproject_path.exists() {
        let content = fs::read_to_string(&pyproject_path)?;
        if content.contains("[tool.scafpy]") {
            writeln!(
                writer,
                "  • pyproject.toml already contains [tool.scafpy] - skipping."
            )?;
        } else {
            let mut file = fs::OpenOptions::new().append(true).open(&pyproject_path)?;

            // Add a newline before appending if the file doesn't end with one
            if !content.ends_with('\n') {
                writeln!(file)?;
            }

            writeln!(file, "\n{}", DEFAULT_PYPROJECT_CONFIG.trim())?;
            writeln!(writer, "  • Added default configuration to pyproject.toml.")?;
        }
    } else if scafpy_toml_path.exists() {
        writeln!(writer, "  • .scafpy.toml already exists - skipping.")?;
    } else {
        let mut file = fs::File::create(&scafpy_toml_path)?;
        writeln!(file, "{}", DEFAULT_CONFIG.trim())?;
        writeln!(writer, "  • Created .scafpy.toml with default configuration.")?;
    }

    Ok(())
}
