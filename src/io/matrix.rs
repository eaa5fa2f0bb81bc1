//! Covmat text files.
//!
//! Format: a `# p1 p2 ... pN` header followed by N rows of N whitespace-separated
//! numbers. When reading, blank lines and `#` lines are ignored, so the header
//! is optional for the numeric part.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use nalgebra::DMatrix;

use crate::error::AppError;

/// Parse whitespace-separated numeric text into a square matrix.
///
/// `source` is only used in error messages.
pub fn parse_matrix(text: &str, source: &str) -> Result<DMatrix<f64>, AppError> {
    let mut rows: Vec<Vec<f64>> = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim_start_matches('\u{feff}').trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let row = line
            .split_whitespace()
            .map(|tok| {
                tok.parse::<f64>().map_err(|_| {
                    AppError::data(format!("{source}:{}: '{tok}' is not a number.", idx + 1))
                })
            })
            .collect::<Result<Vec<f64>, AppError>>()?;
        rows.push(row);
    }

    let n = rows.len();
    if n == 0 {
        return Err(AppError::data(format!("{source}: no matrix rows found.")));
    }
    if let Some(bad) = rows.iter().find(|r| r.len() != n) {
        return Err(AppError::data(format!(
            "{source}: expected a square matrix with {n} columns per row, found a row with {}.",
            bad.len()
        )));
    }

    let flat: Vec<f64> = rows.into_iter().flatten().collect();
    Ok(DMatrix::from_row_slice(n, n, &flat))
}

/// Read a covmat file as a square matrix.
pub fn read_matrix(path: &Path) -> Result<DMatrix<f64>, AppError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        AppError::data(format!("Failed to read covmat '{}': {e}", path.display()))
    })?;
    parse_matrix(&text, &path.display().to_string())
}

/// Rows and columns `indices` of `matrix`, in that order.
///
/// # Panics
/// Panics if an index is out of bounds. Callers derive indices from the
/// header of the same file, after checking the matrix size against it.
pub fn slice_matrix(matrix: &DMatrix<f64>, indices: &[usize]) -> DMatrix<f64> {
    matrix.select_rows(indices).select_columns(indices)
}

/// Render a matrix in covmat file format.
pub fn format_matrix(params: &[String], matrix: &DMatrix<f64>) -> String {
    let mut out = format!("# {}\n", params.join(" "));
    for i in 0..matrix.nrows() {
        let row: Vec<String> = matrix.row(i).iter().map(|v| format!("{v:.6e}")).collect();
        out.push_str(&row.join(" "));
        out.push('\n');
    }
    out
}

/// Write a matrix in covmat file format.
pub fn write_matrix(path: &Path, params: &[String], matrix: &DMatrix<f64>) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::data(format!("Failed to create covmat '{}': {e}", path.display()))
    })?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(format_matrix(params, matrix).as_bytes())
        .and_then(|()| writer.flush())
        .map_err(|e| AppError::data(format!("Failed to write covmat '{}': {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    const COVMAT: &str = "# a b c\n1.0 0.1 0.2\n0.1 2.0 0.3\n\n0.2 0.3 3.0\n";

    #[test]
    fn parses_square_matrix_and_skips_header() {
        let m = parse_matrix(COVMAT, "test").unwrap();
        assert_eq!(m.shape(), (3, 3));
        assert_eq!(m[(1, 1)], 2.0);
        assert_eq!(m[(2, 1)], 0.3);
    }

    #[test]
    fn single_value_is_one_by_one() {
        let m = parse_matrix("# a\n0.25\n", "test").unwrap();
        assert_eq!(m.shape(), (1, 1));
        assert_eq!(m[(0, 0)], 0.25);
    }

    #[test]
    fn rejects_non_square_and_non_numeric() {
        let err = parse_matrix("# a b\n1 2\n3 4\n5 6\n", "test").unwrap_err();
        assert_eq!(err.exit_code(), 4);
        assert!(parse_matrix("1 x\n2 3\n", "test").is_err());
        assert!(parse_matrix("# only a header\n", "test").is_err());
    }

    #[test]
    fn slicing_keeps_requested_order() {
        let m = parse_matrix(COVMAT, "test").unwrap();
        let s = slice_matrix(&m, &[2, 0]);
        assert_eq!(s.shape(), (2, 2));
        assert_eq!(s[(0, 0)], 3.0);
        assert_eq!(s[(0, 1)], 0.2);
        assert_eq!(s[(1, 0)], 0.2);
        assert_eq!(s[(1, 1)], 1.0);
    }

    #[test]
    fn written_file_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.covmat");
        let m = parse_matrix(COVMAT, "test").unwrap();
        let params: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();

        write_matrix(&path, &params, &m).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("# a b c\n"));
        let back = read_matrix(&path).unwrap();
        assert!((back - m).abs().max() < 1e-12);
    }
}
