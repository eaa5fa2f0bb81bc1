//! Formatted terminal output.
//!
//! We keep formatting code in one place so the selection code stays free of
//! presentation concerns.

use crate::db::{CacheRead, DatabaseLoad, LoadOrigin};
use crate::domain::SelectionResult;
use crate::io::format_matrix;

/// Format the chosen covmat: location, parameter mapping, and matrix.
pub fn format_selection(result: &SelectionResult) -> String {
    let mut out = String::new();

    out.push_str("=== covmat - best covariance matrix ===\n");
    out.push_str(&format!("Folder: {}\n", result.directory.display()));
    out.push_str(&format!("File: {}\n", result.file_name));
    out.push_str(&format!("Declared: {} parameter(s)\n", result.declared_params.len()));

    out.push_str("\nParameters (model -> covmat):\n");
    let width = result.params.iter().map(|m| m.target.len()).max().unwrap_or(0);
    for m in &result.params {
        if m.target == m.declared {
            out.push_str(&format!("  {:<width$}\n", m.target));
        } else {
            out.push_str(&format!("  {:<width$} -> {}\n", m.target, m.declared));
        }
    }

    if let Some(covmat) = &result.covmat {
        out.push_str(&format!("\nCovmat ({}x{}):\n", covmat.nrows(), covmat.ncols()));
        out.push_str(&format_matrix(&result.target_params(), covmat));
    }

    out
}

/// Format the candidate database as one line per record.
pub fn format_database(load: &DatabaseLoad) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "=== covmat database {} ===\n",
        &load.fingerprint.as_str()[..12.min(load.fingerprint.as_str().len())]
    ));
    out.push_str(&format!("Source: {}\n", origin_label(&load.origin)));
    out.push_str(&format!("Records: {}\n", load.records.len()));
    if let LoadOrigin::Scan { skipped, .. } = load.origin {
        out.push_str(&format!("Skipped: {skipped}\n"));
    }
    out.push('\n');

    for r in &load.records {
        out.push_str(&format!(
            "{} [{}] {}\n",
            r.path().display(),
            r.declared_params.len(),
            r.declared_params.join(" ")
        ));
    }

    out
}

fn origin_label(origin: &LoadOrigin) -> String {
    match origin {
        LoadOrigin::Memory => "memory".to_string(),
        LoadOrigin::Disk => "cache file".to_string(),
        LoadOrigin::Scan { cache_read: None, .. } => "scan (cache disabled)".to_string(),
        LoadOrigin::Scan { cache_read: Some(read), .. } => match read {
            CacheRead::Missing => "scan (no cache file)".to_string(),
            CacheRead::Stale { records, files } => {
                format!("scan (cache stale: {records} records, {files} files)")
            }
            CacheRead::Unreadable(e) => format!("scan (cache unreadable: {e})"),
            CacheRead::Corrupt(e) => format!("scan (cache corrupt: {e})"),
            CacheRead::Valid(_) => "scan".to_string(),
        },
    }
}
