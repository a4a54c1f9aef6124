use crate::batch::{ConversionError, UnitOutcome};
use crate::progress::ConversionStatus;
use crate::verify::QualityReport;
use colored::Colorize;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use std::io::Write;

fn create_table(headers: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers);

    if cfg!(test) {
        table.set_width(120);
    }
    table
}

fn status_color(status: ConversionStatus) -> Color {
    match status {
        ConversionStatus::Completed | ConversionStatus::Verified => Color::Green,
        ConversionStatus::NeedsReview => Color::Yellow,
        ConversionStatus::InProgress => Color::Blue,
        ConversionStatus::NotStarted => Color::White,
    }
}

fn score_text(outcome: &UnitOutcome) -> String {
    outcome
        .score()
        .map_or_else(|| "-".to_owned(), |score| format!("{score:.2}"))
}

/// Print the per-unit outcome table.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_outcomes(
    writer: &mut impl Write,
    title: &str,
    outcomes: &[UnitOutcome],
) -> std::io::Result<()> {
    if outcomes.is_empty() {
        return Ok(());
    }

    writeln!(writer, "\n{}", title.bold().underline())?;
    let mut table = create_table(vec!["Unit", "Status", "Score"]);

    for outcome in outcomes {
        table.add_row(vec![
            Cell::new(&outcome.unit_id).add_attribute(Attribute::Bold),
            Cell::new(outcome.status.label()).fg(status_color(outcome.status)),
            Cell::new(score_text(outcome)),
        ]);
    }

    writeln!(writer, "{table}")?;
    Ok(())
}

/// Print the units flagged for author attention, with remediation.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_review_queue(
    writer: &mut impl Write,
    title: &str,
    outcomes: &[&UnitOutcome],
) -> std::io::Result<()> {
    if outcomes.is_empty() {
        return Ok(());
    }

    writeln!(writer, "\n{}", title.bold().underline())?;
    let mut table = create_table(vec!["Unit", "Score", "Remediation"]);

    for outcome in outcomes {
        table.add_row(vec![
            Cell::new(&outcome.unit_id).add_attribute(Attribute::Bold),
            Cell::new(score_text(outcome)),
            Cell::new(outcome.remediation.join(", ")).fg(Color::Yellow),
        ]);
    }

    writeln!(writer, "{table}")?;
    Ok(())
}

/// Print every violation one unit's report carries.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_violations(
    writer: &mut impl Write,
    unit_id: &str,
    report: &QualityReport,
) -> std::io::Result<()> {
    if report.violations().next().is_none() {
        return Ok(());
    }

    writeln!(writer, "\n{}", unit_id.bold().underline())?;
    let mut table = create_table(vec!["Check", "Violation", "Severity"]);

    for violation in report.violations() {
        let (severity, color) = if violation.critical {
            ("critical", Color::Red)
        } else {
            ("advisory", Color::Yellow)
        };
        table.add_row(vec![
            Cell::new(violation.check.label()).add_attribute(Attribute::Dim),
            Cell::new(&violation.message).add_attribute(Attribute::Bold),
            Cell::new(severity).fg(color),
        ]);
    }

    writeln!(writer, "{table}")?;
    Ok(())
}

/// Print the failures recorded across the batch.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_conversion_errors(
    writer: &mut impl Write,
    errors: &[&ConversionError],
) -> std::io::Result<()> {
    if errors.is_empty() {
        return Ok(());
    }

    writeln!(writer, "\n{}", "Conversion Errors".bold().underline().red())?;
    let mut table = create_table(vec!["Unit", "Stage", "Error"]);

    for error in errors {
        table.add_row(vec![
            Cell::new(&error.unit_id).add_attribute(Attribute::Bold),
            Cell::new(error.stage.label()),
            Cell::new(&error.message).fg(Color::Red),
        ]);
    }

    writeln!(writer, "{table}")?;
    Ok(())
}
