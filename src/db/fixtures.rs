//! On-disk fixtures shared by tests.

use std::path::{Path, PathBuf};

/// Write a covmat file with the given header and an identity matrix body.
pub(crate) fn write_covmat(dir: &Path, name: &str, params: &[&str]) -> PathBuf {
    let n = params.len();
    let mut text = format!("# {}\n", params.join(" "));
    for i in 0..n {
        let row: Vec<String> = (0..n)
            .map(|j| if i == j { "1.0".to_string() } else { "0.0".to_string() })
            .collect();
        text.push_str(&row.join(" "));
        text.push('\n');
    }
    write_raw(dir, name, text.as_bytes())
}

pub(crate) fn write_raw(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}
