//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - lists CSV columns
//! - runs the analysis pipeline and prints the summary/plot
//! - writes optional exports
//! - generates synthetic samples

use std::path::PathBuf;

use clap::Parser;
use log::info;

use crate::cli::{AnalyzeArgs, ColumnsArgs, Command, LimitArgs, SampleArgs};
use crate::data::{SampleConfig, generate_sample, write_sample_csv};
use crate::domain::{AnalysisConfig, SourceReference, SpecLimits};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `spc` binary.
pub fn run() -> Result<(), AppError> {
    // SPC_SIGNAL / SPC_LSL / SPC_USL may live in a `.env` file.
    dotenvy::dotenv().ok();

    // We want `spc` and `spc -f data.csv` to behave like `spc tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing. This preserves a clean clap structure while
    // retaining the requested UX.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Columns(args) => handle_columns(args),
        Command::Analyze(args) => handle_analyze(args),
        Command::Sample(args) => handle_sample(args),
        Command::Tui(args) => crate::tui::run(args),
    }
}

fn handle_columns(args: ColumnsArgs) -> Result<(), AppError> {
    let path = crate::cli::picker::validate_csv_path(&args.file)?;
    let columns = crate::io::list_columns(&path)?;
    print!("{}", crate::report::format_columns(&columns));
    Ok(())
}

fn handle_analyze(args: AnalyzeArgs) -> Result<(), AppError> {
    let path = resolve_csv_path(args.file.clone())?;
    let config = analysis_config_from_args(&args, path)?;
    let run = pipeline::run_analysis(&config.source, config.limits);

    println!("{}", crate::report::format_run_summary(&run));

    if config.plot {
        let plot = crate::plot::render_ascii(&run.figure, config.plot_width, config.plot_height);
        println!("{plot}");
    }

    // Optional exports.
    if let Some(path) = &config.export_json {
        crate::io::export::write_report_json(path, &run)?;
        info!("wrote report to '{}'", path.display());
    }
    if let Some(path) = &config.export_svg {
        crate::plot::write_svg(path, &run.figure, config.svg_width, config.svg_height)?;
        info!("wrote figure to '{}'", path.display());
    }

    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let config = SampleConfig {
        count: args.count,
        mu: args.mu,
        sigma: args.sigma,
        seed: args.seed,
        signal: args.signal,
        distribution: args.distribution,
    };
    let dataset = generate_sample(&config)?;
    write_sample_csv(&args.output, &dataset)?;
    println!(
        "Wrote {} rows of `{}` to {}",
        dataset.len(),
        config.signal,
        args.output.display()
    );
    Ok(())
}

/// Use the given path, or ask for one when it was omitted.
pub fn resolve_csv_path(file: Option<PathBuf>) -> Result<PathBuf, AppError> {
    match file {
        Some(path) => crate::cli::picker::validate_csv_path(&path),
        None => crate::cli::picker::prompt_for_csv_path(),
    }
}

/// Validated specification limits from the CLI flags.
pub fn limits_from_args(args: &LimitArgs) -> Result<SpecLimits, AppError> {
    SpecLimits::validated(args.lsl, args.usl)
}

pub fn analysis_config_from_args(
    args: &AnalyzeArgs,
    path: PathBuf,
) -> Result<AnalysisConfig, AppError> {
    Ok(AnalysisConfig {
        source: SourceReference::with_signal(path, args.limits.signal.clone()),
        limits: limits_from_args(&args.limits)?,
        plot: args.plot && !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        export_json: args.export_json.clone(),
        export_svg: args.export_svg.clone(),
        svg_width: args.svg_width,
        svg_height: args.svg_height,
    })
}

/// Rewrite argv so `spc` defaults to `spc tui`.
///
/// Rules:
/// - `spc`                      -> `spc tui`
/// - `spc -f data.csv ...`      -> `spc tui -f data.csv ...`
/// - `spc --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "columns" | "analyze" | "sample" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}
