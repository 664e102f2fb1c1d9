//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

use crate::domain::{FitResult, PointSet};

/// Format the dataset summary line(s).
pub fn format_points_summary(points: &PointSet, source: &str, dropped_rows: usize) -> String {
    let mut out = String::new();
    out.push_str("=== arcfit - conic section fit ===\n");
    out.push_str(&format!("Source: {source}\n"));

    let (x_lo, x_hi) = points.x_range().unwrap_or((f64::NAN, f64::NAN));
    let (y_lo, y_hi) = points.y_range().unwrap_or((f64::NAN, f64::NAN));
    out.push_str(&format!(
        "Points: n={} | x=[{x_lo:.3}, {x_hi:.3}] | y=[{y_lo:.3}, {y_hi:.3}] | errors: {}\n",
        points.len(),
        if points.err().is_some() { "per-point" } else { "none (unit weights)" },
    ));
    if dropped_rows > 0 {
        out.push_str(&format!("  ({dropped_rows} input row(s) dropped during ingest)\n"));
    }
    out
}

/// Format one fit: convergence, statistics, parameter table, correlations.
pub fn format_fit_report(label: &str, fit: &FitResult) -> String {
    let mut out = String::new();

    let status = if fit.converged { "converged" } else { "DID NOT CONVERGE" };
    out.push_str(&format!(
        "\n[{label}] {status} after {} residual evaluations ({})\n",
        fit.n_eval, fit.termination
    ));
    let q = &fit.quality;
    out.push_str(&format!(
        "  n={} varied={} dof={} | chi-square={:.6} reduced={:.6} | aic={:.3} bic={:.3}\n",
        q.ndata, q.nvarys, q.nfree, q.chisqr, q.redchi, q.aic, q.bic
    ));

    out.push_str("  Parameters:\n");
    let values = fit.params.to_array();
    for (i, spec) in fit.specs.iter().enumerate() {
        let stderr = fit.stats.as_ref().and_then(|s| s.stderr[i]);
        let uncertainty = match (spec.vary, stderr) {
            (false, _) => "  (fixed)".to_string(),
            (true, Some(se)) => format!(" ± {se:<12.6}"),
            (true, None) => "  (stderr unavailable)".to_string(),
        };
        out.push_str(&format!(
            "    {:<13} = {:>12.6}{uncertainty}  bound: {}\n",
            spec.name,
            values[i],
            spec.bound.describe()
        ));
    }

    match &fit.stats {
        Some(stats) => {
            out.push_str("  Correlations (free parameters):\n");
            out.push_str("    ");
            out.push_str(&format!("{:<13}", ""));
            for name in &stats.free_names {
                out.push_str(&format!("{name:>13}"));
            }
            out.push('\n');
            for (r, name) in stats.free_names.iter().enumerate() {
                out.push_str(&format!("    {name:<13}"));
                for c in 0..stats.free_names.len() {
                    out.push_str(&format!("{:>13.3}", stats.correl[r][c]));
                }
                out.push('\n');
            }
        }
        None => {
            out.push_str(
                "  Uncertainties unavailable: the curvature matrix is singular or\n  ill-conditioned at the solution.\n",
            );
        }
    }

    out
}

/// Compare the parabola and free-eccentricity fits side by side.
///
/// Raw chi-square can only improve with the extra parameter; the reduced
/// chi-square tells you whether the improvement was worth a degree of
/// freedom.
pub fn format_comparison(parabola: &FitResult, conic: &FitResult) -> String {
    let mut out = String::new();
    out.push_str("\nModel comparison (parabola vs general conic):\n");
    out.push_str(&format!(
        "  chi-square: {:.6} vs {:.6}\n",
        parabola.quality.chisqr, conic.quality.chisqr
    ));
    out.push_str(&format!(
        "  reduced   : {:.6} vs {:.6}\n",
        parabola.quality.redchi, conic.quality.redchi
    ));
    out.push_str(&format!(
        "  bic       : {:.3} vs {:.3}\n",
        parabola.quality.bic, conic.quality.bic
    ));
    out.push_str(&format!(
        "  fitted eccentricity: {:.6}\n",
        conic.params.eccentricity
    ));
    if conic.quality.redchi < parabola.quality.redchi {
        out.push_str("  The free eccentricity earns its degree of freedom here.\n");
    } else {
        out.push_str(
            "  Little justification for the general conic: the raw improvement does\n  not survive the lost degree of freedom.\n",
        );
    }
    out
}

/// Format the residual vector for quick inspection.
pub fn format_residuals(label: &str, fit: &FitResult) -> String {
    let mut out = String::new();
    out.push_str(&format!("  Residuals [{label}]: "));
    out.push_str(&fmt_vec(&fit.residuals));
    out.push('\n');
    out
}

fn fmt_vec(values: &[f64]) -> String {
    let parts: Vec<String> = values.iter().map(|v| format!("{v:.4}")).collect();
    format!("[{}]", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::demo_points;
    use crate::fit::{FitOptions, fit_conic_to_xy};

    #[test]
    fn fit_report_mentions_every_parameter() {
        let fit = fit_conic_to_xy(&demo_points(), &FitOptions::default()).unwrap();
        let report = format_fit_report("parabola", &fit);
        for name in crate::domain::ConicParams::NAMES {
            assert!(report.contains(name), "missing {name} in:\n{report}");
        }
        assert!(report.contains("(fixed)"), "eccentricity should read as fixed");
        assert!(report.contains("chi-square"));
    }

    #[test]
    fn comparison_reports_both_chisquares() {
        let points = demo_points();
        let parabola = fit_conic_to_xy(&points, &FitOptions::default()).unwrap();
        let conic = fit_conic_to_xy(
            &points,
            &FitOptions { only_parabola: false, ..FitOptions::default() },
        )
        .unwrap();
        let text = format_comparison(&parabola, &conic);
        assert!(text.contains("chi-square"));
        assert!(text.contains("eccentricity"));
    }

    #[test]
    fn points_summary_counts_dropped_rows() {
        let text = format_points_summary(&demo_points(), "demo", 2);
        assert!(text.contains("n=7"));
        assert!(text.contains("2 input row(s) dropped"));
    }
}
