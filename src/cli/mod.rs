//! Command-line parsing for the conic fitter.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the modeling/math code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::curve::DEFAULT_SAMPLES;
use crate::domain::ModelChoice;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "arcfit", version, about = "Conic-section curve fitter (focus-directrix form)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit points read from a CSV file (columns: x, y, optional err).
    Fit(FitArgs),
    /// Fit the built-in seven-point demonstration arc, or a seeded synthetic
    /// arc with known ground truth.
    Demo(DemoArgs),
}

/// Options shared by every fitting command.
#[derive(Debug, Parser, Clone)]
pub struct CommonArgs {
    /// Which fit variant(s) to run.
    #[arg(long, value_enum, default_value_t = ModelChoice::Both)]
    pub model: ModelChoice,

    /// Bound the focus to within one data-range-width of the observed points.
    #[arg(long)]
    pub restrict_xy: bool,

    /// Bound the orientation to within 45 degrees of its initial estimate.
    #[arg(long)]
    pub restrict_theta: bool,

    /// Samples along each reconstructed curve.
    #[arg(long, default_value_t = DEFAULT_SAMPLES)]
    pub samples: usize,

    /// Print the residual vector of each fit.
    #[arg(long)]
    pub residuals: bool,

    /// Export per-point results to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export the preferred curve (params + sampled grid) to JSON.
    #[arg(long = "export-curve")]
    pub export_curve: Option<PathBuf>,

    /// Write a markdown debug bundle with the residual decomposition tables.
    #[arg(long)]
    pub debug_bundle: bool,
}

/// Options for fitting a CSV file.
#[derive(Debug, Parser, Clone)]
pub struct FitArgs {
    /// Points CSV (columns: x, y, optional err).
    #[arg(short = 'i', long)]
    pub input: PathBuf,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Options for the demo data sources.
#[derive(Debug, Parser, Clone)]
pub struct DemoArgs {
    /// Generate a synthetic noisy arc instead of the built-in seven points.
    #[arg(long)]
    pub synthetic: bool,

    /// RNG seed for the synthetic arc.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Number of synthetic points.
    #[arg(short = 'n', long, default_value_t = 25)]
    pub count: usize,

    /// Radial noise sigma for the synthetic arc (input units).
    #[arg(long, default_value_t = 0.02)]
    pub noise: f64,

    /// Ground-truth eccentricity of the synthetic arc.
    #[arg(long, default_value_t = 1.0)]
    pub eccentricity: f64,

    #[command(flatten)]
    pub common: CommonArgs,
}
