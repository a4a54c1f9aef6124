use crate::batch::BatchRun;
use colored::Colorize;
use std::io::Write;

use super::summary::print_header;
use super::tables::{print_conversion_errors, print_outcomes, print_review_queue, print_violations};

/// Print the full report.
///
/// # Errors
///
/// Returns an error if writing to the writer fails.
pub fn print_report(writer: &mut impl Write, run: &BatchRun) -> std::io::Result<()> {
    print_header(writer)?;

    if run.cancelled {
        writeln!(
            writer,
            "{}",
            "Cancelled: remaining units were left untouched.".yellow().bold()
        )?;
    }

    let clean =
        run.snapshot.needs_review == 0 && run.stage_errors.total() == 0 && !run.cancelled;
    if clean {
        writeln!(
            writer,
            "{}",
            format!("✓ All {} units converted.", run.snapshot.completed).green()
        )?;
        return Ok(());
    }

    print_outcomes(writer, "Units", &run.outcomes)?;

    let review: Vec<_> = run.needs_review().collect();
    print_review_queue(writer, "Needs Review", &review)?;
    for outcome in &review {
        if let Some(report) = &outcome.report {
            print_violations(writer, &outcome.unit_id, report)?;
        }
    }

    let errors: Vec<_> = run.errors().collect();
    print_conversion_errors(writer, &errors)?;
    Ok(())
}

/// Print a quiet report (no detailed tables) for CI/CD mode.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_report_quiet(writer: &mut impl Write, run: &BatchRun) -> std::io::Result<()> {
    writeln!(writer)?;
    writeln!(
        writer,
        "\n[SUMMARY] {} completed, {} need review, {} errors",
        run.snapshot.completed,
        run.snapshot.needs_review,
        run.stage_errors.total()
    )?;
    Ok(())
}
