//! Shared selection pipeline used by the CLI commands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! model description -> covmat directories -> database -> ranking -> load + slice

use std::path::{Path, PathBuf};

use crate::data::{covmat_package_folders, resolve_packages_path};
use crate::db::{DatabaseCache, DatabaseLoad};
use crate::domain::{ModelInfo, SelectConfig, SelectionQuery, SelectionResult};
use crate::error::AppError;
use crate::io::{read_matrix, read_model_json, slice_matrix};
use crate::select::Selector;

/// Build a selector whose cache lives in the configured (or default) directory.
pub fn selector_for(config: &SelectConfig) -> Selector {
    let cache = match &config.cache_dir {
        Some(dir) => DatabaseCache::new(dir),
        None => DatabaseCache::from_env(),
    };
    Selector::new(cache)
}

/// Directories to search: explicit ones if given, else the installed package folders.
pub fn candidate_directories(config: &SelectConfig, model: &ModelInfo) -> Result<Vec<PathBuf>, AppError> {
    if !config.covmat_dirs.is_empty() {
        return Ok(config.covmat_dirs.clone());
    }
    let packages_path = resolve_packages_path(config.packages_path.as_deref(), model)?;
    Ok(covmat_package_folders(&packages_path))
}

/// Run `best` end to end: read the model, pick a covmat, load and slice it.
pub fn run_best(config: &SelectConfig) -> Result<Option<SelectionResult>, AppError> {
    let model_path = config
        .model_path
        .as_deref()
        .ok_or_else(|| AppError::config("A model description is required (--model)."))?;
    let model = read_model_json(model_path)?;
    let directories = candidate_directories(config, &model)?;
    let query = SelectionQuery::from_model(&model, directories);

    let mut selector = selector_for(config);
    best_covmat(&mut selector, &query, config.seed, config.allow_cache)
}

/// Load the candidate database for the configured directories.
pub fn run_database(config: &SelectConfig) -> Result<DatabaseLoad, AppError> {
    let model = match config.model_path.as_deref() {
        Some(path) => read_model_json(path)?,
        None => ModelInfo::default(),
    };
    let directories = candidate_directories(config, &model)?;
    let mut selector = selector_for(config);
    Ok(selector.cache_mut().load_report(&directories, config.allow_cache))
}

/// Pick the best covmat for `query` and attach the matrix restricted to the
/// matched parameters.
///
/// `Ok(None)` means no covmat is available; only unreadable or malformed
/// matrix files are errors.
pub fn best_covmat(
    selector: &mut Selector,
    query: &SelectionQuery,
    seed: Option<u64>,
    allow_cache: bool,
) -> Result<Option<SelectionResult>, AppError> {
    let Some(result) = selector.best_match(query, seed, allow_cache) else {
        return Ok(None);
    };
    attach_covmat(result).map(Some)
}

/// Load the chosen file and slice rows/columns down to `result.params`.
pub fn attach_covmat(mut result: SelectionResult) -> Result<SelectionResult, AppError> {
    let path = result.path();
    let full = read_matrix(&path)?;
    let n = result.declared_params.len();
    if full.nrows() != n {
        return Err(AppError::data(format!(
            "Covmat '{}' declares {n} parameters but holds a {}x{} matrix.",
            path.display(),
            full.nrows(),
            full.ncols()
        )));
    }

    let indices = declared_indices(&result, &path)?;
    result.covmat = Some(slice_matrix(&full, &indices));
    Ok(result)
}

fn declared_indices(result: &SelectionResult, path: &Path) -> Result<Vec<usize>, AppError> {
    result
        .params
        .iter()
        .map(|m| {
            result
                .declared_params
                .iter()
                .position(|d| *d == m.declared)
                .ok_or_else(|| {
                    AppError::data(format!(
                        "Parameter '{}' not declared in '{}'.",
                        m.declared,
                        path.display()
                    ))
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures::write_raw;
    use crate::domain::{LikelihoodInfo, ParamInfo};

    const COVMAT: &str = "# a b c\n1.0 0.1 0.2\n0.1 2.0 0.3\n0.2 0.3 3.0\n";

    fn config_for(dir: &Path, cache: &Path) -> SelectConfig {
        SelectConfig {
            covmat_dirs: vec![dir.to_path_buf()],
            cache_dir: Some(cache.to_path_buf()),
            allow_cache: true,
            seed: Some(0),
            ..SelectConfig::default()
        }
    }

    #[test]
    fn slices_matrix_in_model_order_through_renames() {
        let dir = tempfile::tempdir().unwrap();
        let cache = tempfile::tempdir().unwrap();
        write_raw(dir.path(), "base_lowl.covmat", COVMAT.as_bytes());

        let mut selector = Selector::new(DatabaseCache::new(cache.path()));
        let query = SelectionQuery {
            directories: vec![dir.path().to_path_buf()],
            params: vec![
                ParamInfo::sampled("C").with_renames(["c"]),
                ParamInfo::sampled("a"),
                ParamInfo::sampled("unknown"),
            ],
            likelihoods: vec![LikelihoodInfo::new("lowl")],
            context: None,
        };

        let result = best_covmat(&mut selector, &query, Some(0), true).unwrap().unwrap();
        assert_eq!(result.target_params(), vec!["C".to_string(), "a".to_string()]);
        assert_eq!(result.params[0].declared, "c");

        let covmat = result.covmat.unwrap();
        assert_eq!(covmat.shape(), (2, 2));
        assert_eq!(covmat[(0, 0)], 3.0);
        assert_eq!(covmat[(0, 1)], 0.2);
        assert_eq!(covmat[(1, 1)], 1.0);
    }

    #[test]
    fn size_mismatch_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let cache = tempfile::tempdir().unwrap();
        write_raw(dir.path(), "bad.covmat", b"# a b c\n1.0 0.0\n0.0 1.0\n");

        let mut selector = Selector::new(DatabaseCache::new(cache.path()));
        let query = SelectionQuery {
            directories: vec![dir.path().to_path_buf()],
            params: vec![ParamInfo::sampled("a")],
            ..SelectionQuery::default()
        };

        let err = best_covmat(&mut selector, &query, Some(0), false).unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn run_best_reads_model_and_selects() {
        let dir = tempfile::tempdir().unwrap();
        let cache = tempfile::tempdir().unwrap();
        write_raw(dir.path(), "base_lowl.covmat", COVMAT.as_bytes());
        write_raw(dir.path(), "base_lowl_highl.covmat", COVMAT.as_bytes());
        let model = write_raw(
            dir.path(),
            "model.json",
            br#"{
                "params": [
                    {"name": "b", "prior": {"min": 0, "max": 1}},
                    {"name": "c", "value": 1.0}
                ],
                "likelihoods": [{"name": "lowl"}]
            }"#,
        );

        let mut config = config_for(dir.path(), cache.path());
        config.model_path = Some(model);

        let result = run_best(&config).unwrap().unwrap();
        assert_eq!(result.file_name, "base_lowl.covmat");
        assert_eq!(result.target_params(), vec!["b".to_string()]);
        assert_eq!(result.covmat.unwrap()[(0, 0)], 2.0);
    }

    #[test]
    fn run_best_without_overlap_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let cache = tempfile::tempdir().unwrap();
        write_raw(dir.path(), "base.covmat", COVMAT.as_bytes());
        let model = write_raw(
            dir.path(),
            "model.json",
            br#"{"params": [{"name": "zeta", "prior": {"min": 0, "max": 1}}]}"#,
        );

        let mut config = config_for(dir.path(), cache.path());
        config.model_path = Some(model);
        assert!(run_best(&config).unwrap().is_none());
    }

    #[test]
    fn run_best_requires_model() {
        let dir = tempfile::tempdir().unwrap();
        let cache = tempfile::tempdir().unwrap();
        let config = config_for(dir.path(), cache.path());
        assert_eq!(run_best(&config).unwrap_err().exit_code(), 2);
    }

    #[test]
    fn run_database_lists_records() {
        let dir = tempfile::tempdir().unwrap();
        let cache = tempfile::tempdir().unwrap();
        write_raw(dir.path(), "base.covmat", COVMAT.as_bytes());
        write_raw(dir.path(), "notes.txt", b"hello\n");

        let load = run_database(&config_for(dir.path(), cache.path())).unwrap();
        assert_eq!(load.records.len(), 1);
        assert_eq!(load.records[0].declared_params.len(), 3);
    }
}
