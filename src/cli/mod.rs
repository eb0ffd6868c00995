//! Command-line parsing for the `spc` capability analyzer.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the statistics code.
//!
//! Signal name and limits can also be set through `SPC_SIGNAL`, `SPC_LSL` and
//! `SPC_USL` (a `.env` file in the working directory is loaded first).

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::data::SampleDistribution;
use crate::domain::{DEFAULT_LSL, DEFAULT_SIGNAL, DEFAULT_USL};

pub mod picker;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "spc",
    version,
    about = "Statistical process control: normality gate and Cp/Cpk for one CSV signal"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the header columns of a CSV file.
    Columns(ColumnsArgs),
    /// Test normality, compute Cp/Cpk, print a summary and optionally plot/export.
    Analyze(AnalyzeArgs),
    /// Write a synthetic `layer,<signal>` CSV.
    Sample(SampleArgs),
    /// Launch the interactive TUI.
    ///
    /// This uses the same underlying pipeline as `spc analyze`, but renders
    /// results in a terminal UI using Ratatui.
    Tui(TuiArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct ColumnsArgs {
    /// CSV file to inspect.
    #[arg(short = 'f', long = "file", value_name = "CSV")]
    pub file: PathBuf,
}

/// Signal selection and specification limits, shared by `analyze` and `tui`.
#[derive(Debug, Parser, Clone)]
pub struct LimitArgs {
    /// Signal column to analyze.
    #[arg(short = 's', long, env = "SPC_SIGNAL", default_value = DEFAULT_SIGNAL)]
    pub signal: String,

    /// Lower specification limit.
    #[arg(long, env = "SPC_LSL", default_value_t = DEFAULT_LSL, allow_negative_numbers = true)]
    pub lsl: f64,

    /// Upper specification limit.
    #[arg(long, env = "SPC_USL", default_value_t = DEFAULT_USL, allow_negative_numbers = true)]
    pub usl: f64,
}

#[derive(Debug, Parser, Clone)]
pub struct AnalyzeArgs {
    /// CSV file to analyze (prompted for when omitted).
    #[arg(short = 'f', long = "file", value_name = "CSV")]
    pub file: Option<PathBuf>,

    #[command(flatten)]
    pub limits: LimitArgs,

    /// Render an ASCII plot in the terminal (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows per panel).
    #[arg(long, default_value_t = 15)]
    pub height: usize,

    /// Export the analysis report to JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,

    /// Export the two-panel figure to SVG.
    #[arg(long = "export-svg", value_name = "SVG")]
    pub export_svg: Option<PathBuf>,

    /// SVG width (pixels).
    #[arg(long, default_value_t = 800)]
    pub svg_width: u32,

    /// SVG height (pixels).
    #[arg(long, default_value_t = 900)]
    pub svg_height: u32,
}

#[derive(Debug, Parser, Clone)]
pub struct SampleArgs {
    /// Output CSV path.
    #[arg(short = 'o', long = "output", value_name = "CSV")]
    pub output: PathBuf,

    /// Number of rows.
    #[arg(short = 'n', long = "count", default_value_t = 1000)]
    pub count: usize,

    /// Mean of the normal distribution.
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub mu: f64,

    /// Standard deviation of the normal distribution.
    #[arg(long, default_value_t = 0.1)]
    pub sigma: f64,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Name of the generated signal column.
    #[arg(long, default_value = DEFAULT_SIGNAL)]
    pub signal: String,

    /// Distribution of the signal column.
    #[arg(long, value_enum, default_value_t = SampleDistribution::Normal)]
    pub distribution: SampleDistribution,
}

#[derive(Debug, Parser, Clone)]
pub struct TuiArgs {
    /// CSV file to open (picked interactively when omitted).
    #[arg(short = 'f', long = "file", value_name = "CSV")]
    pub file: Option<PathBuf>,

    #[command(flatten)]
    pub limits: LimitArgs,

    /// SVG export width (pixels).
    #[arg(long, default_value_t = 800)]
    pub svg_width: u32,

    /// SVG export height (pixels).
    #[arg(long, default_value_t = 900)]
    pub svg_height: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analyze_defaults() {
        let cli = Cli::try_parse_from(["spc", "analyze", "-f", "data.csv"]).unwrap();
        let Command::Analyze(args) = cli.command else {
            panic!("expected analyze");
        };
        assert_eq!(args.file, Some(PathBuf::from("data.csv")));
        assert_eq!(args.limits.signal, DEFAULT_SIGNAL);
        assert_eq!(args.limits.lsl, -1.0);
        assert_eq!(args.limits.usl, 1.0);
        assert!(args.plot && !args.no_plot);
    }

    #[test]
    fn negative_limits_parse() {
        let cli = Cli::try_parse_from([
            "spc", "analyze", "-f", "d.csv", "-s", "power", "--lsl", "-2.5", "--usl", "-0.5",
        ])
        .unwrap();
        let Command::Analyze(args) = cli.command else {
            panic!("expected analyze");
        };
        assert_eq!(args.limits.signal, "power");
        assert_eq!(args.limits.lsl, -2.5);
        assert_eq!(args.limits.usl, -0.5);
    }

    #[test]
    fn sample_distribution_values() {
        let cli = Cli::try_parse_from([
            "spc", "sample", "-o", "out.csv", "--distribution", "uniform-int", "-n", "10",
        ])
        .unwrap();
        let Command::Sample(args) = cli.command else {
            panic!("expected sample");
        };
        assert_eq!(args.distribution, SampleDistribution::UniformInt);
        assert_eq!(args.count, 10);
    }

    #[test]
    fn clap_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
