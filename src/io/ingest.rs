//! CSV ingest and normalization.
//!
//! This module turns a point-list CSV into a validated `PointSet` that is
//! safe to fit. Upstream concerns (region files, sky-to-pixel projection)
//! are external collaborators: whatever produces the CSV owns them, and by
//! the time data arrives here it is plain planar coordinates.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 4)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Separation of concerns**: no fitting logic here

use std::path::Path;

use crate::domain::PointSet;
use crate::error::FitError;

/// A row-level problem encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    /// 1-based data-row number (excluding the header).
    pub line: usize,
    pub message: String,
}

/// Points read from a CSV plus the rows that had to be dropped.
#[derive(Debug, Clone)]
pub struct IngestedPoints {
    pub points: PointSet,
    pub row_errors: Vec<RowError>,
    /// Total data rows seen, including dropped ones.
    pub n_rows: usize,
}

/// Read `(x, y[, err])` points from a CSV file.
///
/// Required columns: `x` and `y` (header names, case-insensitive). An
/// optional `err` column supplies per-point measurement errors; when present
/// it must be finite and positive on every kept row.
pub fn read_points_csv(path: &Path) -> Result<IngestedPoints, FitError> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| FitError::io(format!("Failed to open points CSV '{}'", path.display()), e))?;

    let headers = reader
        .headers()
        .map_err(|e| FitError::io("Failed to read CSV header", e))?
        .clone();
    let col = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
    };
    let x_col = col("x").ok_or_else(|| FitError::io("Invalid CSV schema", "missing 'x' column"))?;
    let y_col = col("y").ok_or_else(|| FitError::io("Invalid CSV schema", "missing 'y' column"))?;
    let err_col = col("err");

    let mut x = Vec::new();
    let mut y = Vec::new();
    let mut err = Vec::new();
    let mut row_errors = Vec::new();
    let mut n_rows = 0usize;

    for (idx, record) in reader.records().enumerate() {
        let line = idx + 1;
        n_rows += 1;
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError { line, message: format!("unreadable row: {e}") });
                continue;
            }
        };

        let parse = |col: usize, name: &str| -> Result<f64, String> {
            let raw = record.get(col).ok_or_else(|| format!("missing '{name}' field"))?;
            let value: f64 = raw
                .trim()
                .parse()
                .map_err(|_| format!("'{name}' is not a number: {raw:?}"))?;
            if !value.is_finite() {
                return Err(format!("'{name}' is not finite"));
            }
            Ok(value)
        };

        let xi = parse(x_col, "x");
        let yi = parse(y_col, "y");
        let ei = err_col.map(|c| parse(c, "err"));
        match (xi, yi, ei) {
            (Ok(xv), Ok(yv), None) => {
                x.push(xv);
                y.push(yv);
            }
            (Ok(xv), Ok(yv), Some(Ok(ev))) if ev > 0.0 => {
                x.push(xv);
                y.push(yv);
                err.push(ev);
            }
            (Ok(_), Ok(_), Some(Ok(ev))) => {
                row_errors.push(RowError { line, message: format!("'err' must be > 0, got {ev}") });
            }
            (xr, yr, er) => {
                let message = [xr.err(), yr.err(), er.and_then(|r| r.err())]
                    .into_iter()
                    .flatten()
                    .collect::<Vec<_>>()
                    .join("; ");
                row_errors.push(RowError { line, message });
            }
        }
    }

    let points = match err_col {
        Some(_) => PointSet::with_errors(x, y, err),
        None => PointSet::new(x, y),
    }?;

    Ok(IngestedPoints { points, row_errors, n_rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("arcfit-ingest-{name}-{}.csv", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn reads_plain_points() {
        let path = write_temp("plain", "x,y\n1.0,2.0\n3.0,4.0\n");
        let ingested = read_points_csv(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(ingested.points.len(), 2);
        assert_eq!(ingested.points.x(), &[1.0, 3.0]);
        assert!(ingested.points.err().is_none());
        assert!(ingested.row_errors.is_empty());
    }

    #[test]
    fn reads_errors_and_skips_bad_rows() {
        let path = write_temp(
            "errs",
            "x,y,err\n1.0,2.0,0.1\nnot_a_number,2.0,0.1\n3.0,4.0,0.2\n5.0,6.0,-1.0\n",
        );
        let ingested = read_points_csv(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(ingested.points.len(), 2);
        assert_eq!(ingested.points.err(), Some(&[0.1, 0.2][..]));
        assert_eq!(ingested.n_rows, 4);
        assert_eq!(ingested.row_errors.len(), 2);
        assert_eq!(ingested.row_errors[0].line, 2);
    }

    #[test]
    fn missing_required_column_is_an_error() {
        let path = write_temp("schema", "x,z\n1.0,2.0\n");
        let err = read_points_csv(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(matches!(err, FitError::Io { .. }));
        assert!(err.to_string().contains("'y'"));
    }
}
