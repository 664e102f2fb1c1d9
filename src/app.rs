//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - reads or synthesizes the input points
//! - runs the fit pipeline
//! - prints reports
//! - writes optional exports and debug bundles

use std::path::Path;

use clap::Parser;

use crate::cli::{Cli, Command, CommonArgs, DemoArgs, FitArgs};
use crate::data::{SampleConfig, demo_points, generate_arc};
use crate::domain::{ConicParams, FitConfig, PointSet};
use crate::error::FitError;

pub mod pipeline;

/// Entry point for the `arcfit` binary.
pub fn run() -> Result<(), FitError> {
    let cli = Cli::parse();
    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::Demo(args) => handle_demo(args),
    }
}

fn handle_fit(args: FitArgs) -> Result<(), FitError> {
    let ingested = crate::io::ingest::read_points_csv(&args.input)?;
    let config = config_from_common(&args.common);
    let source = args.input.display().to_string();
    run_and_render(
        &ingested.points,
        &config,
        &source,
        ingested.row_errors.len(),
        args.common.residuals,
    )
}

fn handle_demo(args: DemoArgs) -> Result<(), FitError> {
    let (points, source) = if args.synthetic {
        let sample = SampleConfig {
            params: ConicParams {
                eccentricity: args.eccentricity,
                ..SampleConfig::default().params
            },
            count: args.count,
            noise: args.noise,
            seed: args.seed,
            ..SampleConfig::default()
        };
        let source = format!(
            "synthetic arc (seed={}, n={}, noise={}, e={})",
            args.seed, args.count, args.noise, args.eccentricity
        );
        (generate_arc(&sample)?, source)
    } else {
        (demo_points(), "built-in seven-point demo arc".to_string())
    };

    let config = config_from_common(&args.common);
    run_and_render(&points, &config, &source, 0, args.common.residuals)
}

fn run_and_render(
    points: &PointSet,
    config: &FitConfig,
    source: &str,
    dropped_rows: usize,
    show_residuals: bool,
) -> Result<(), FitError> {
    let run = pipeline::run_fit(points, config)?;

    print!(
        "{}",
        crate::report::format_points_summary(points, source, dropped_rows)
    );
    for variant in run.variants() {
        print!("{}", crate::report::format_fit_report(variant.label, &variant.fit));
        if show_residuals {
            print!("{}", crate::report::format_residuals(variant.label, &variant.fit));
        }
    }
    if let (Some(parabola), Some(conic)) = (&run.parabola, &run.conic) {
        print!("{}", crate::report::format_comparison(&parabola.fit, &conic.fit));
    }

    let preferred = run.preferred();
    if let Some(path) = &config.export_results {
        crate::io::export::write_results_csv(path, points, &preferred.fit, preferred.label)?;
        println!("\nWrote per-point results to {}", path.display());
    }
    if let Some(path) = &config.export_curve {
        crate::io::export::write_curve_json(path, &preferred.fit, &preferred.curve, preferred.label)?;
        println!("Wrote curve JSON to {}", path.display());
    }
    if config.debug_bundle {
        let fits: Vec<(&str, &crate::domain::FitResult)> = run
            .variants()
            .into_iter()
            .map(|v| (v.label, &v.fit))
            .collect();
        let path = crate::debug::write_debug_bundle(Path::new("debug"), points, &fits)?;
        println!("Wrote debug bundle to {}", path.display());
    }

    Ok(())
}

pub fn config_from_common(args: &CommonArgs) -> FitConfig {
    FitConfig {
        model: args.model,
        restrict_xy: args.restrict_xy,
        restrict_theta: args.restrict_theta,
        curve_samples: args.samples,
        export_results: args.export.clone(),
        export_curve: args.export_curve.clone(),
        debug_bundle: args.debug_bundle,
    }
}
