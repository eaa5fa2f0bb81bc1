//! Cache keys for directory lists.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// SHA-256 of a directory list's textual form, as lowercase hex.
///
/// The digest is taken over the list exactly as given: the same directories
/// in a different order produce a different fingerprint.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn from_bytes(bytes: impl AsRef<[u8]>) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes.as_ref());
        Self(hex::encode(hasher.finalize()))
    }

    pub fn for_directories(directories: &[PathBuf]) -> Self {
        Self::from_bytes(directory_list_repr(directories))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `['dir_a', 'dir_b']`
fn directory_list_repr(directories: &[PathBuf]) -> String {
    let quoted: Vec<String> = directories
        .iter()
        .map(|d| format!("'{}'", d.display()))
        .collect();
    format!("[{}]", quoted.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_list_same_fingerprint() {
        let a = vec![PathBuf::from("/p/covmats"), PathBuf::from("/p/bk18")];
        let b = vec![PathBuf::from("/p/covmats"), PathBuf::from("/p/bk18")];
        assert_eq!(Fingerprint::for_directories(&a), Fingerprint::for_directories(&b));
        assert_eq!(Fingerprint::for_directories(&a).as_str().len(), 64);
    }

    #[test]
    fn order_changes_fingerprint() {
        let a = vec![PathBuf::from("/p/covmats"), PathBuf::from("/p/bk18")];
        let b = vec![PathBuf::from("/p/bk18"), PathBuf::from("/p/covmats")];
        assert_ne!(Fingerprint::for_directories(&a), Fingerprint::for_directories(&b));
    }

    #[test]
    fn repr_looks_like_a_list() {
        let dirs = vec![PathBuf::from("a"), PathBuf::from("b")];
        assert_eq!(directory_list_repr(&dirs), "['a', 'b']");
        assert_eq!(directory_list_repr(&[]), "[]");
    }
}
