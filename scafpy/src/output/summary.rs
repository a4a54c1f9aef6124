use crate::batch::BatchRun;
use colored::Colorize;
use std::io::Write;

/// Print the main header with box-drawing characters.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_header(writer: &mut impl Write) -> std::io::Result<()> {
    writeln!(writer)?;
    writeln!(
        writer,
        "{}",
        "╔════════════════════════════════════════╗".cyan()
    )?;
    writeln!(
        writer,
        "{}",
        "║  Scaffolded Exercise Conversion        ║".cyan().bold()
    )?;
    writeln!(
        writer,
        "{}",
        "╚════════════════════════════════════════╝".cyan()
    )?;
    writeln!(writer)?;
    Ok(())
}

/// Print status and error counts as colored "pills".
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_summary_pills(writer: &mut impl Write, run: &BatchRun) -> std::io::Result<()> {
    fn pill(label: &str, count: usize) -> String {
        if count == 0 {
            format!("{}: {}", label, count.to_string().green())
        } else {
            format!("{}: {}", label, count.to_string().red().bold())
        }
    }

    fn progress_pill(label: &str, count: usize) -> String {
        if count == 0 {
            format!("{}: {}", label, count.to_string().dimmed())
        } else {
            format!("{}: {}", label, count.to_string().green().bold())
        }
    }

    let snapshot = &run.snapshot;
    writeln!(
        writer,
        "{}  {}  {}  {}",
        progress_pill("Completed", snapshot.completed),
        progress_pill("Verified", snapshot.verified),
        pill("Needs Review", snapshot.needs_review),
        pill("Unreached", snapshot.not_started + snapshot.in_progress),
    )?;

    let errors = &run.stage_errors;
    writeln!(
        writer,
        "{}  {}  {}  {}",
        pill("Analyze Errors", errors.analyze),
        pill("Convert Errors", errors.convert),
        pill("Verify Errors", errors.verify),
        pill("Track Errors", errors.track),
    )?;

    writeln!(writer)?;
    Ok(())
}

/// Print conversion statistics (units, documents, coverage).
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_conversion_stats(
    writer: &mut impl Write,
    run: &BatchRun,
    documents: usize,
    min_annotation_coverage: f64,
) -> std::io::Result<()> {
    writeln!(
        writer,
        "{}",
        format!(
            "Processed {} units across {} documents",
            run.snapshot.total.to_string().bold(),
            documents.to_string().bold()
        )
        .dimmed()
    )?;

    let coverage_color = if run.annotation_coverage >= min_annotation_coverage {
        colored::Color::Green
    } else {
        colored::Color::Red
    };
    writeln!(
        writer,
        "Annotation coverage: {}",
        format!("{:.1}%", run.annotation_coverage * 100.0)
            .color(coverage_color)
            .bold()
    )?;
    writeln!(writer)?;
    Ok(())
}
