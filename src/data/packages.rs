//! Packages path resolution and covmat directory discovery.

use std::path::{Path, PathBuf};

use crate::domain::ModelInfo;
use crate::error::AppError;

/// Environment variable holding the packages installation path.
pub const PACKAGES_PATH_ENV: &str = "COVMAT_PACKAGES_PATH";

/// Covmat directories relative to the packages path, in search order.
pub const COVMAT_FOLDERS: [&[&str]; 2] = [
    &["data", "planck_supp_data_and_covmats", "covmats"],
    &["data", "bicep_keck_2018", "BK18_cosmomc", "planck_covmats"],
];

/// Resolve the packages path: explicit flag, then the model description, then
/// `COVMAT_PACKAGES_PATH` (a `.env` file is honoured).
pub fn resolve_packages_path(explicit: Option<&Path>, model: &ModelInfo) -> Result<PathBuf, AppError> {
    dotenvy::dotenv().ok();
    let from_env = std::env::var_os(PACKAGES_PATH_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from);
    pick_packages_path(explicit, model, from_env)
}

fn pick_packages_path(
    explicit: Option<&Path>,
    model: &ModelInfo,
    from_env: Option<PathBuf>,
) -> Result<PathBuf, AppError> {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| model.packages_path.clone())
        .or(from_env)
        .ok_or_else(|| {
            AppError::config(format!(
                "Needs a path to the external packages' installation \
                 (use --packages-path, `packages_path` in the model, or {PACKAGES_PATH_ENV})."
            ))
        })
}

/// Covmat directories that actually exist under `packages_path`.
pub fn covmat_package_folders(packages_path: &Path) -> Vec<PathBuf> {
    COVMAT_FOLDERS
        .iter()
        .map(|parts| parts.iter().fold(packages_path.to_path_buf(), |p, part| p.join(part)))
        .filter(|dir| dir.is_dir())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_path_wins() {
        let model = ModelInfo {
            packages_path: Some(PathBuf::from("/from/model")),
            ..ModelInfo::default()
        };
        let got = pick_packages_path(Some(Path::new("/explicit")), &model, Some("/env".into())).unwrap();
        assert_eq!(got, PathBuf::from("/explicit"));

        let got = pick_packages_path(None, &model, Some("/env".into())).unwrap();
        assert_eq!(got, PathBuf::from("/from/model"));

        let got = pick_packages_path(None, &ModelInfo::default(), Some("/env".into())).unwrap();
        assert_eq!(got, PathBuf::from("/env"));
    }

    #[test]
    fn missing_packages_path_is_a_config_error() {
        let err = pick_packages_path(None, &ModelInfo::default(), None).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn only_existing_folders_are_returned() {
        let root = tempfile::tempdir().unwrap();
        assert!(covmat_package_folders(root.path()).is_empty());

        let bk18 = root
            .path()
            .join("data")
            .join("bicep_keck_2018")
            .join("BK18_cosmomc")
            .join("planck_covmats");
        std::fs::create_dir_all(&bk18).unwrap();
        assert_eq!(covmat_package_folders(root.path()), vec![bk18.clone()]);

        let planck = root
            .path()
            .join("data")
            .join("planck_supp_data_and_covmats")
            .join("covmats");
        std::fs::create_dir_all(&planck).unwrap();
        assert_eq!(covmat_package_folders(root.path()), vec![planck, bk18]);
    }
}
