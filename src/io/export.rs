//! Export per-point results to CSV and fitted curves to JSON.
//!
//! The CSV is meant to be easy to consume in spreadsheets or downstream
//! scripts; the JSON (`domain::CurveFile`) is the portable representation a
//! plotting tool can render without redoing the fit.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::curve::XyConic;
use crate::domain::{CurveFile, CurveGrid, FitResult, PointSet};
use crate::error::FitError;

/// Write per-point residuals to a CSV file.
pub fn write_results_csv(
    path: &Path,
    points: &PointSet,
    fit: &FitResult,
    label: &str,
) -> Result<(), FitError> {
    let mut file = File::create(path).map_err(|e| {
        FitError::io(format!("Failed to create export CSV '{}'", path.display()), e)
    })?;

    writeln!(file, "index,x,y,err,residual,model")
        .map_err(|e| FitError::io("Failed to write export CSV header", e))?;

    for i in 0..points.len() {
        let err = points
            .err()
            .map(|e| format!("{:.10}", e[i]))
            .unwrap_or_default();
        writeln!(
            file,
            "{},{:.10},{:.10},{},{:.10},{}",
            i,
            points.x()[i],
            points.y()[i],
            err,
            fit.residuals[i],
            label,
        )
        .map_err(|e| FitError::io("Failed to write export CSV row", e))?;
    }

    Ok(())
}

/// Write a curve JSON file for a fit and its reconstruction.
pub fn write_curve_json(
    path: &Path,
    fit: &FitResult,
    curve: &XyConic,
    label: &str,
) -> Result<(), FitError> {
    let file = File::create(path).map_err(|e| {
        FitError::io(format!("Failed to create curve JSON '{}'", path.display()), e)
    })?;

    let out = CurveFile {
        tool: "arcfit".to_string(),
        generated: chrono::Utc::now().to_rfc3339(),
        model: label.to_string(),
        params: fit.params,
        quality: fit.quality.clone(),
        converged: fit.converged,
        termination: fit.termination.clone(),
        has_stats: fit.stats.is_some(),
        grid: CurveGrid {
            x_pts: curve.x_pts().to_vec(),
            y_pts: curve.y_pts().to_vec(),
        },
        apex: curve.apex(),
        mirror: curve.mirror(),
    };

    serde_json::to_writer_pretty(file, &out)
        .map_err(|e| FitError::io("Failed to write curve JSON", e))?;

    Ok(())
}

/// Read back a curve JSON file.
pub fn read_curve_json(path: &Path) -> Result<CurveFile, FitError> {
    let file = File::open(path).map_err(|e| {
        FitError::io(format!("Failed to open curve JSON '{}'", path.display()), e)
    })?;
    serde_json::from_reader(file)
        .map_err(|e| FitError::io(format!("Failed to parse curve JSON '{}'", path.display()), e))
}
