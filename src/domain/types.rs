//! Shared domain types.
//!
//! Records and model descriptions are serializable so they can be persisted in
//! the database cache and read back from model description files.

use std::path::PathBuf;

use nalgebra::DMatrix;
use serde::{Deserialize, Deserializer, Serialize};

/// One covariance matrix file found in a source directory.
///
/// `declared_params` is the header line of the file, split on whitespace, in
/// file order. The position of a name in this list is its row/column index in
/// the matrix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub directory: PathBuf,
    pub file_name: String,
    pub declared_params: Vec<String>,
}

impl CandidateRecord {
    pub fn path(&self) -> PathBuf {
        self.directory.join(&self.file_name)
    }
}

/// A model parameter, as listed in the model description.
///
/// Only sampled parameters take part in covmat selection. A parameter is
/// sampled if it has a `prior`, unless `sampled` says otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamInfo {
    pub name: String,
    /// Alternative names the parameter may appear under in a covmat header.
    #[serde(default, deserialize_with = "one_or_many")]
    pub renames: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prior: Option<serde_json::Value>,
    /// Fixed value (fixed parameters are never sampled).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sampled: Option<bool>,
}

impl ParamInfo {
    /// A sampled parameter with no renames.
    pub fn sampled(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            renames: Vec::new(),
            prior: None,
            value: None,
            sampled: Some(true),
        }
    }

    pub fn with_renames<I, S>(mut self, renames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.renames = renames.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_sampled(&self) -> bool {
        self.sampled.unwrap_or(self.prior.is_some())
    }

    /// Canonical name followed by every rename.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.renames.iter().map(String::as_str))
    }
}

/// A likelihood used by the model, plus keywords it may appear as in covmat file names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikelihoodInfo {
    pub name: String,
    #[serde(default, deserialize_with = "one_or_many")]
    pub aliases: Vec<String>,
}

impl LikelihoodInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
        }
    }

    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases = aliases.into_iter().map(Into::into).collect();
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }
}

/// A resolved model description (see `io::model`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packages_path: Option<PathBuf>,
    #[serde(default)]
    pub params: Vec<ParamInfo>,
    #[serde(default)]
    pub likelihoods: Vec<LikelihoodInfo>,
}

impl ModelInfo {
    /// Sampled parameters, in model order.
    pub fn sampled_params(&self) -> Vec<ParamInfo> {
        self.params.iter().filter(|p| p.is_sampled()).cloned().collect()
    }
}

/// Everything the selector needs for one call.
#[derive(Debug, Clone, Default)]
pub struct SelectionQuery {
    pub directories: Vec<PathBuf>,
    pub params: Vec<ParamInfo>,
    pub likelihoods: Vec<LikelihoodInfo>,
    /// Prefix for warnings (e.g. the name of the batch job asking).
    pub context: Option<String>,
}

impl SelectionQuery {
    /// Build a query from a model description; non-sampled parameters are dropped.
    pub fn from_model(model: &ModelInfo, directories: Vec<PathBuf>) -> Self {
        Self {
            directories,
            params: model.sampled_params(),
            likelihoods: model.likelihoods.clone(),
            context: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

/// A target parameter and the name it was found under in the covmat header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamMapping {
    pub target: String,
    pub declared: String,
}

/// The chosen covmat.
///
/// `covmat` is only filled in by `app::pipeline::best_covmat`, which loads the
/// file and slices it down to `params` (in that order).
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionResult {
    pub directory: PathBuf,
    pub file_name: String,
    pub declared_params: Vec<String>,
    pub params: Vec<ParamMapping>,
    pub covmat: Option<DMatrix<f64>>,
}

impl SelectionResult {
    pub fn path(&self) -> PathBuf {
        self.directory.join(&self.file_name)
    }

    /// Target parameter names, in mapping order.
    pub fn target_params(&self) -> Vec<String> {
        self.params.iter().map(|m| m.target.clone()).collect()
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus environment defaults).
#[derive(Debug, Clone, Default)]
pub struct SelectConfig {
    /// Model description file (required by `best`).
    pub model_path: Option<PathBuf>,
    pub packages_path: Option<PathBuf>,
    /// Explicit covmat directories; when non-empty they replace the ones
    /// derived from the packages path.
    pub covmat_dirs: Vec<PathBuf>,
    /// Database cache directory (`None` = environment default).
    pub cache_dir: Option<PathBuf>,
    pub allow_cache: bool,
    pub seed: Option<u64>,
    /// Write the sliced covmat here.
    pub export: Option<PathBuf>,
}

/// Accept either `"name"` or `["a", "b"]`; missing or `null` means empty.
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(s)) => vec![s],
        Some(OneOrMany::Many(v)) => v,
    })
}
