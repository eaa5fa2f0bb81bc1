//! Directory scan: turn covmat files into `CandidateRecord`s.
//!
//! A file is a candidate if its first line, stripped, starts with `#`. The rest
//! of that line is the whitespace-separated list of parameter names. Anything
//! else (directories, binary files, files without a header) is skipped and
//! reported in `ScanReport::skipped`; it is never an error.

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use crate::domain::CandidateRecord;

/// Extension used by the file-count staleness check.
pub const COVMAT_EXTENSION: &str = ".covmat";

const HEADER_MARKER: char = '#';
const BYTE_ORDER_MARK: char = '\u{feff}';

/// First lines longer than this are not headers.
const MAX_HEADER_BYTES: u64 = 1024 * 1024;

/// Why a directory entry did not become a candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NotAFile,
    Unreadable(String),
    NotUtf8,
    MissingMarker,
    /// First line longer than `MAX_HEADER_BYTES`.
    HeaderTooLong,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    pub path: PathBuf,
    pub reason: SkipReason,
}

/// Result of scanning a directory list.
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    pub records: Vec<CandidateRecord>,
    pub skipped: Vec<SkippedEntry>,
    /// Input directories that could not be listed.
    pub unreadable_dirs: Vec<PathBuf>,
}

/// Parse a header line into parameter names.
pub fn parse_header_line(line: &str) -> Result<Vec<String>, SkipReason> {
    let line = line.trim_start_matches(BYTE_ORDER_MARK).trim();
    if !line.starts_with(HEADER_MARKER) {
        return Err(SkipReason::MissingMarker);
    }
    Ok(line
        .trim_start_matches(HEADER_MARKER)
        .split_whitespace()
        .map(str::to_string)
        .collect())
}

/// Read only the first line of `path` and parse it as a header.
pub fn read_header(path: &Path) -> Result<Vec<String>, SkipReason> {
    let meta = fs::metadata(path).map_err(|e| SkipReason::Unreadable(e.to_string()))?;
    if !meta.is_file() {
        return Err(SkipReason::NotAFile);
    }

    let file = File::open(path).map_err(|e| SkipReason::Unreadable(e.to_string()))?;
    let mut reader = BufReader::new(file.take(MAX_HEADER_BYTES));
    let mut buf = Vec::new();
    reader
        .read_until(b'\n', &mut buf)
        .map_err(|e| SkipReason::Unreadable(e.to_string()))?;
    if buf.len() as u64 >= MAX_HEADER_BYTES && buf.last() != Some(&b'\n') {
        return Err(SkipReason::HeaderTooLong);
    }

    let line = String::from_utf8(buf).map_err(|_| SkipReason::NotUtf8)?;
    parse_header_line(&line)
}

/// Scan every directory (non-recursively), in the order given.
///
/// Entries within a directory are visited in file-name order so that the
/// database, and therefore any seeded tie-break, does not depend on the
/// filesystem's listing order.
pub fn scan_directories(directories: &[PathBuf]) -> ScanReport {
    let mut report = ScanReport::default();

    for dir in directories {
        let names = match list_file_names(dir) {
            Ok(names) => names,
            Err(err) => {
                tracing::debug!(
                    target: "covmat.db",
                    dir = %dir.display(),
                    error = %err,
                    "cannot list covmat directory"
                );
                report.unreadable_dirs.push(dir.clone());
                continue;
            }
        };

        for name in names {
            let path = dir.join(&name);
            match read_header(&path) {
                Ok(params) => report.records.push(CandidateRecord {
                    directory: dir.clone(),
                    file_name: name,
                    declared_params: params,
                }),
                Err(reason) => {
                    tracing::debug!(
                        target: "covmat.db",
                        path = %path.display(),
                        reason = ?reason,
                        "skipping file"
                    );
                    report.skipped.push(SkippedEntry { path, reason });
                }
            }
        }
    }

    report
}

/// Number of `*.covmat` files currently present across `directories`.
///
/// Directories that cannot be listed count as empty.
pub fn count_covmat_files(directories: &[PathBuf]) -> usize {
    directories
        .iter()
        .filter_map(|dir| list_file_names(dir).ok())
        .flatten()
        .filter(|name| name.ends_with(COVMAT_EXTENSION))
        .count()
}

/// Sorted entry names of `dir`. Names that are not valid UTF-8 are dropped.
fn list_file_names(dir: &Path) -> io::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let Ok(entry) = entry else {
            continue;
        };
        if let Ok(name) = entry.file_name().into_string() {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}
