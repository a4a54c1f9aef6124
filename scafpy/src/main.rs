//! Main binary entry point for the `scafpy` conversion tool.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::Ordering;

use clap::Parser;

use scafpy::cli::{Cli, Commands};
use scafpy::commands::{run_check, run_convert, run_init_in, ConvertOptions};
use scafpy::CANCELLED;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // First Ctrl-C requests a cooperative stop between units; the handler
    // stays installed so the flag is simply set again on repeats.
    if let Err(err) = ctrlc::set_handler(|| CANCELLED.store(true, Ordering::SeqCst)) {
        eprintln!("[WARN] Could not install interrupt handler: {err}");
    }

    let mut stdout = std::io::stdout();
    let code = match run(cli, &mut stdout) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            1
        }
    };
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}

fn run(cli: Cli, writer: &mut impl std::io::Write) -> anyhow::Result<i32> {
    let options = ConvertOptions {
        json: cli.json,
        quiet: cli.quiet,
        verbose: cli.verbose,
        output_dir: cli.output_dir,
        tier: cli.tier,
        max_implementation_lines: cli.max_implementation_lines,
        min_annotation_coverage: cli.min_annotation_coverage,
        min_quality_score: cli.min_quality_score,
        exclude_folders: cli.exclude_folders,
        include_folders: cli.include_folders,
        fail_on_review: cli.fail_on_review,
    };

    match cli.command {
        Some(Commands::Check { paths }) => run_check(&paths, &options, &CANCELLED, writer),
        Some(Commands::Init) => {
            let root = cli
                .paths
                .first()
                .cloned()
                .unwrap_or_else(|| PathBuf::from("."));
            run_init_in(&root, writer)?;
            Ok(0)
        }
        None => run_convert(&cli.paths, &options, &CANCELLED, writer),
    }
}
