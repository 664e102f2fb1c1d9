//! Debug bundle writer: residual decomposition tables for inspection.
//!
//! The residual of each point splits into the radius from the focus `r`, the
//! directrix distance `d`, and the scaled product `e·d`; looking at the raw
//! vectors is the quickest way to see *why* a fit went where it went (all
//! residuals negative means every point is inside the conic, i.e. `r0` is
//! overestimated, and so on).
//!
//! Collection is an explicit, opt-in call (`--debug-bundle`); nothing in the
//! model prints, and the fast fitting path never pays for it.

use std::fs::{File, create_dir_all};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::domain::{FitResult, PointSet};
use crate::error::FitError;
use crate::models::conic::residual_parts;

/// Write a markdown bundle for a run into `dir`, returning the file path.
pub fn write_debug_bundle(
    dir: &Path,
    points: &PointSet,
    fits: &[(&str, &FitResult)],
) -> Result<PathBuf, FitError> {
    create_dir_all(dir).map_err(|e| FitError::io("Failed to create debug dir", e))?;

    let ts = Local::now().format("%Y%m%d_%H%M%S");
    let path = dir.join(format!("arcfit_debug_{ts}.md"));
    let mut file =
        File::create(&path).map_err(|e| FitError::io("Failed to create debug file", e))?;

    let w = |file: &mut File, line: &str| -> Result<(), FitError> {
        writeln!(file, "{line}").map_err(|e| FitError::io("Failed to write debug bundle", e))
    };

    w(&mut file, "# arcfit debug bundle")?;
    w(&mut file, &format!("- generated: {}", Local::now().to_rfc3339()))?;
    w(&mut file, &format!("- points: {}", points.len()))?;

    w(&mut file, "\n## Input points")?;
    w(&mut file, "| # | x | y | err |")?;
    w(&mut file, "| - | - | - | - |")?;
    for i in 0..points.len() {
        let err = points
            .err()
            .map(|e| format!("{:.6}", e[i]))
            .unwrap_or_else(|| "-".to_string());
        w(
            &mut file,
            &format!("| {i} | {:.6} | {:.6} | {err} |", points.x()[i], points.y()[i]),
        )?;
    }

    for (label, fit) in fits {
        w(&mut file, &format!("\n## Fit: {label}"))?;
        w(
            &mut file,
            &format!(
                "- converged: {} ({}), evaluations: {}",
                fit.converged, fit.termination, fit.n_eval
            ),
        )?;
        let q = &fit.quality;
        w(
            &mut file,
            &format!(
                "- chi-square: {:.6}, reduced: {:.6}, dof: {}",
                q.chisqr, q.redchi, q.nfree
            ),
        )?;
        let p = fit.params.to_array();
        w(&mut file, "\n| parameter | value | vary | bound |")?;
        w(&mut file, "| - | - | - | - |")?;
        for (i, spec) in fit.specs.iter().enumerate() {
            w(
                &mut file,
                &format!(
                    "| {} | {:.6} | {} | {} |",
                    spec.name,
                    p[i],
                    spec.vary,
                    spec.bound.describe()
                ),
            )?;
        }

        let parts = residual_parts(&fit.params, points.x(), points.y(), points.err());
        w(&mut file, "\n### Residual decomposition")?;
        w(&mut file, "| # | r | d | e*d | residual |")?;
        w(&mut file, "| - | - | - | - | - |")?;
        for i in 0..points.len() {
            let d = parts
                .d
                .as_ref()
                .map(|d| format!("{:.6}", d[i]))
                .unwrap_or_else(|| "-".to_string());
            w(
                &mut file,
                &format!(
                    "| {i} | {:.6} | {d} | {:.6} | {:.6} |",
                    parts.r[i], parts.ed[i], parts.residual[i]
                ),
            )?;
        }
    }

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::demo_points;
    use crate::fit::{FitOptions, fit_conic_to_xy};

    #[test]
    fn bundle_contains_the_decomposition_tables() {
        let points = demo_points();
        let fit = fit_conic_to_xy(&points, &FitOptions::default()).unwrap();

        let dir = std::env::temp_dir().join(format!("arcfit-debug-{}", std::process::id()));
        let path = write_debug_bundle(&dir, &points, &[("parabola", &fit)]).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_dir_all(&dir).ok();

        assert!(contents.contains("## Fit: parabola"));
        assert!(contents.contains("Residual decomposition"));
        // One decomposition row per point.
        assert_eq!(contents.matches("| r |").count(), 1);
        assert!(contents.contains("| 6 |"));
    }

    #[test]
    fn collecting_diagnostics_does_not_change_residuals() {
        let points = demo_points();
        let fit = fit_conic_to_xy(&points, &FitOptions::default()).unwrap();
        let parts = residual_parts(&fit.params, points.x(), points.y(), points.err());
        assert_eq!(parts.residual, fit.residuals);
    }
}
