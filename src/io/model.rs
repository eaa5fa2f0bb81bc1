//! Model description JSON.
//!
//! A model description lists the model's parameters (with priors or fixed
//! values, and optional renames) and the likelihoods it uses. The schema is
//! `domain::ModelInfo`.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::domain::ModelInfo;
use crate::error::AppError;

/// Read a model description file.
pub fn read_model_json(path: &Path) -> Result<ModelInfo, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::config(format!("Failed to open model description '{}': {e}", path.display()))
    })?;
    let model: ModelInfo = serde_json::from_reader(BufReader::new(file)).map_err(|e| {
        AppError::config(format!("Invalid model description '{}': {e}", path.display()))
    })?;
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_model_description() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(
            &path,
            r#"{
                "packages_path": "/opt/packages",
                "params": [
                    {"name": "omegabh2", "prior": {"min": 0.005, "max": 0.1}, "renames": "omegab"},
                    {"name": "mnu", "value": 0.06}
                ],
                "likelihoods": [{"name": "planck_2018_lowl.TT", "aliases": ["lowl"]}]
            }"#,
        )
        .unwrap();

        let model = read_model_json(&path).unwrap();
        assert_eq!(model.packages_path.as_deref(), Some(Path::new("/opt/packages")));
        assert_eq!(model.params.len(), 2);
        assert_eq!(model.sampled_params().len(), 1);
        assert_eq!(model.likelihoods[0].aliases, vec!["lowl".to_string()]);
    }

    #[test]
    fn bad_model_description_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert_eq!(read_model_json(&path).unwrap_err().exit_code(), 2);
        assert_eq!(read_model_json(&dir.path().join("missing.json")).unwrap_err().exit_code(), 2);
    }
}
