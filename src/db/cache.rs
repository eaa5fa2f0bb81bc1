//! Two-tier covmat database cache.
//!
//! Tier 1 is an in-process map keyed by directory-list fingerprint. Tier 2 is a
//! JSON blob per fingerprint in the cache directory. A blob is trusted only if
//! the number of `*.covmat` files currently in the source directories equals
//! the number of records it holds; anything else triggers a full rescan.

use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::db::fingerprint::Fingerprint;
use crate::db::scan::{count_covmat_files, scan_directories};
use crate::domain::CandidateRecord;
use crate::error::AppError;

pub const DATABASE_FILE_PREFIX: &str = "covmats_database_";
pub const DATABASE_FILE_SUFFIX: &str = ".json";

/// Overrides the cache directory.
pub const CACHE_DIR_ENV: &str = "COVMAT_CACHE_DIR";

const CACHE_DIR_NAME: &str = "covmat-select";

/// Outcome of reading a persisted database blob.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheRead {
    Valid(Vec<CandidateRecord>),
    Missing,
    Unreadable(String),
    Corrupt(String),
    /// Record count disagrees with the number of covmat files on disk.
    Stale { records: usize, files: usize },
}

/// Where the records returned by `DatabaseCache::load_report` came from.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOrigin {
    Memory,
    Disk,
    Scan {
        /// Why the persisted blob was not used (`None` when caching was off).
        cache_read: Option<CacheRead>,
        skipped: usize,
    },
}

#[derive(Debug, Clone)]
pub struct DatabaseLoad {
    pub fingerprint: Fingerprint,
    pub records: Vec<CandidateRecord>,
    pub origin: LoadOrigin,
}

/// Covmat database cache.
///
/// Owned by the `Selector`; the in-process tier lives as long as this value.
#[derive(Debug, Clone)]
pub struct DatabaseCache {
    cache_dir: PathBuf,
    loaded: HashMap<Fingerprint, Vec<CandidateRecord>>,
}

impl DatabaseCache {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            loaded: HashMap::new(),
        }
    }

    /// Cache rooted at `COVMAT_CACHE_DIR`, or the platform default.
    pub fn from_env() -> Self {
        Self::new(cache_dir_from_env())
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn database_path(&self, fingerprint: &Fingerprint) -> PathBuf {
        self.cache_dir
            .join(format!("{DATABASE_FILE_PREFIX}{fingerprint}{DATABASE_FILE_SUFFIX}"))
    }

    /// Candidate records for `directories`.
    pub fn load(&mut self, directories: &[PathBuf], allow_cache: bool) -> Vec<CandidateRecord> {
        self.load_report(directories, allow_cache).records
    }

    /// Like `load`, but also says which tier answered.
    pub fn load_report(&mut self, directories: &[PathBuf], allow_cache: bool) -> DatabaseLoad {
        let fingerprint = Fingerprint::for_directories(directories);

        let mut cache_read = None;
        if allow_cache {
            // An empty memo is a miss: files may have been added since.
            if let Some(records) = self.loaded.get(&fingerprint).filter(|r| !r.is_empty()) {
                tracing::debug!(target: "covmat.db", %fingerprint, "using in-memory covmat database");
                return DatabaseLoad {
                    fingerprint,
                    records: records.clone(),
                    origin: LoadOrigin::Memory,
                };
            }

            match self.read_persisted(&fingerprint, directories) {
                CacheRead::Valid(records) => {
                    tracing::debug!(target: "covmat.db", %fingerprint, "loaded cached covmat database");
                    self.loaded.insert(fingerprint.clone(), records.clone());
                    return DatabaseLoad {
                        fingerprint,
                        records,
                        origin: LoadOrigin::Disk,
                    };
                }
                other => {
                    tracing::info!(
                        target: "covmat.db",
                        outcome = ?other,
                        "no usable cached covmat database; rebuilding"
                    );
                    cache_read = Some(other);
                }
            }
        }

        let report = scan_directories(directories);
        let records = report.records;

        if allow_cache {
            match self.persist(&fingerprint, &records) {
                Ok(path) => tracing::info!(
                    target: "covmat.db",
                    path = %path.display(),
                    records = records.len(),
                    "cached covmat database"
                ),
                Err(err) => tracing::warn!(
                    target: "covmat.db",
                    error = %err,
                    "failed to persist covmat database"
                ),
            }
            self.loaded.insert(fingerprint.clone(), records.clone());
        }

        DatabaseLoad {
            fingerprint,
            records,
            origin: LoadOrigin::Scan {
                cache_read,
                skipped: report.skipped.len(),
            },
        }
    }

    /// Read and validate the persisted blob for `fingerprint`.
    pub fn read_persisted(&self, fingerprint: &Fingerprint, directories: &[PathBuf]) -> CacheRead {
        let path = self.database_path(fingerprint);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return CacheRead::Missing,
            Err(err) => return CacheRead::Unreadable(err.to_string()),
        };

        let records: Vec<CandidateRecord> = match serde_json::from_slice(&bytes) {
            Ok(records) => records,
            Err(err) => return CacheRead::Corrupt(err.to_string()),
        };

        let files = count_covmat_files(directories);
        if files != records.len() {
            return CacheRead::Stale {
                records: records.len(),
                files,
            };
        }

        CacheRead::Valid(records)
    }

    /// Write the whole database for `fingerprint`, replacing any previous blob.
    ///
    /// The blob is written to a temporary file in the cache directory and then
    /// renamed into place, so readers never see a partial write.
    pub fn persist(
        &self,
        fingerprint: &Fingerprint,
        records: &[CandidateRecord],
    ) -> Result<PathBuf, AppError> {
        let path = self.database_path(fingerprint);
        let bytes = serde_json::to_vec(records).map_err(|e| write_error(&path, e))?;
        fs::create_dir_all(&self.cache_dir).map_err(|e| write_error(&path, e))?;
        let mut tmp =
            tempfile::NamedTempFile::new_in(&self.cache_dir).map_err(|e| write_error(&path, e))?;
        tmp.write_all(&bytes).map_err(|e| write_error(&path, e))?;
        tmp.as_file().sync_all().map_err(|e| write_error(&path, e))?;
        tmp.persist(&path).map_err(|e| write_error(&path, e.error))?;
        Ok(path)
    }

    /// Number of fingerprints held in memory.
    pub fn memoized(&self) -> usize {
        self.loaded.len()
    }

    /// Forget every in-memory database. Persisted blobs are kept.
    pub fn clear_memory(&mut self) {
        self.loaded.clear();
    }

    /// Delete every persisted database blob in the cache directory.
    ///
    /// Returns how many files were removed.
    pub fn clear_persisted(&self) -> Result<usize, AppError> {
        let entries = match fs::read_dir(&self.cache_dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(err) => {
                return Err(AppError::data(format!(
                    "Failed to list cache dir '{}': {err}",
                    self.cache_dir.display()
                )));
            }
        };

        let mut removed = 0;
        for entry in entries.flatten() {
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if !(name.starts_with(DATABASE_FILE_PREFIX) && name.ends_with(DATABASE_FILE_SUFFIX)) {
                continue;
            }
            fs::remove_file(entry.path()).map_err(|e| {
                AppError::data(format!("Failed to remove '{}': {e}", entry.path().display()))
            })?;
            removed += 1;
        }
        Ok(removed)
    }
}

fn write_error(path: &Path, err: impl std::fmt::Display) -> AppError {
    AppError::data(format!("Failed to write covmat database '{}': {err}", path.display()))
}

/// `COVMAT_CACHE_DIR`, else `$XDG_CACHE_HOME/covmat-select`, else
/// `$HOME/.cache/covmat-select`, else a directory under the system temp dir.
pub fn cache_dir_from_env() -> PathBuf {
    if let Some(dir) = non_empty_env(CACHE_DIR_ENV) {
        return dir;
    }
    if let Some(xdg) = non_empty_env("XDG_CACHE_HOME") {
        return xdg.join(CACHE_DIR_NAME);
    }
    if let Some(home) = non_empty_env("HOME").or_else(|| non_empty_env("USERPROFILE")) {
        return home.join(".cache").join(CACHE_DIR_NAME);
    }
    std::env::temp_dir().join(CACHE_DIR_NAME)
}

fn non_empty_env(key: &str) -> Option<PathBuf> {
    std::env::var_os(key)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}
