//! Alias sets for parameters and likelihoods.

use std::collections::{BTreeSet, HashSet};

use regex::Regex;

use crate::domain::{LikelihoodInfo, ParamInfo, ParamMapping};

/// Characters that may delimit a likelihood keyword inside a file name.
const NAME_DELIMITERS: &str = r"[_.]";

/// Every canonical name and rename of `params`.
pub fn param_alias_set(params: &[ParamInfo]) -> HashSet<&str> {
    params.iter().flat_map(ParamInfo::names).collect()
}

/// Every canonical name and alias of `likelihoods`.
pub fn likelihood_alias_set(likelihoods: &[LikelihoodInfo]) -> BTreeSet<&str> {
    likelihoods.iter().flat_map(LikelihoodInfo::names).collect()
}

/// One pattern per likelihood alias, each matching the alias only when it is
/// delimited by `_` or `.` on both sides (`cmb` matches `x_cmb.covmat` but not
/// `x_cmbx.covmat`).
#[derive(Debug, Clone)]
pub struct LikelihoodPatterns {
    patterns: Vec<Regex>,
}

impl LikelihoodPatterns {
    pub fn new<'a>(aliases: impl IntoIterator<Item = &'a str>) -> Self {
        let patterns = aliases
            .into_iter()
            .filter_map(|alias| {
                let source = format!("{NAME_DELIMITERS}{}{NAME_DELIMITERS}", regex::escape(alias));
                match Regex::new(&source) {
                    Ok(re) => Some(re),
                    Err(err) => {
                        tracing::debug!(
                            target: "covmat.select",
                            alias,
                            error = %err,
                            "ignoring likelihood alias"
                        );
                        None
                    }
                }
            })
            .collect();
        Self { patterns }
    }

    pub fn from_likelihoods(likelihoods: &[LikelihoodInfo]) -> Self {
        Self::new(likelihood_alias_set(likelihoods))
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// How many aliases occur in `file_name`.
    pub fn count_matches(&self, file_name: &str) -> usize {
        self.patterns.iter().filter(|re| re.is_match(file_name)).count()
    }
}

/// Resolve each target parameter to the name it is declared under.
///
/// The parameter's own name wins; otherwise the first declared rename. Targets
/// with no declared name are left out. Output follows `params` order.
pub fn translate_params(params: &[ParamInfo], declared: &[String]) -> Vec<ParamMapping> {
    params
        .iter()
        .filter_map(|p| {
            p.names()
                .find(|name| declared.iter().any(|d| d == name))
                .map(|name| ParamMapping {
                    target: p.name.clone(),
                    declared: name.to_string(),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alias_set_includes_renames() {
        let params = vec![
            ParamInfo::sampled("H0").with_renames(["h0", "hubble"]),
            ParamInfo::sampled("tau"),
        ];
        let set = param_alias_set(&params);
        assert_eq!(set.len(), 4);
        assert!(set.contains("hubble"));
    }

    #[test]
    fn likelihood_keywords_need_delimiters() {
        let patterns = LikelihoodPatterns::new(["cmb"]);
        assert_eq!(patterns.count_matches("base_cmb.covmat"), 1);
        assert_eq!(patterns.count_matches("base.cmb_lensing.covmat"), 1);
        assert_eq!(patterns.count_matches("base_cmbx.covmat"), 0);
        assert_eq!(patterns.count_matches("cmb_base.covmat"), 0);
    }

    #[test]
    fn likelihood_keywords_are_literal() {
        let patterns = LikelihoodPatterns::new(["planck.TT"]);
        assert_eq!(patterns.count_matches("x_planck.TT.covmat"), 1);
        assert_eq!(patterns.count_matches("x_planckxTT.covmat"), 0);
    }

    #[test]
    fn each_alias_counts_once() {
        let likes = vec![
            LikelihoodInfo::new("planck_2018_lowl.TT").with_aliases(["lowl"]),
            LikelihoodInfo::new("bao").with_aliases(["lowl"]),
        ];
        let patterns = LikelihoodPatterns::from_likelihoods(&likes);
        assert_eq!(patterns.len(), 3);
        assert_eq!(patterns.count_matches("base_lowl_bao.covmat"), 2);
    }

    #[test]
    fn translation_prefers_own_name_then_first_rename() {
        let params = vec![
            ParamInfo::sampled("omegabh2").with_renames(["omegab", "ombh2"]),
            ParamInfo::sampled("H0").with_renames(["h0"]),
            ParamInfo::sampled("missing"),
            ParamInfo::sampled("tau").with_renames(["t"]),
        ];
        let declared: Vec<String> = ["tau", "t", "ombh2", "omegab"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let mapping = translate_params(&params, &declared);
        assert_eq!(
            mapping,
            vec![
                ParamMapping { target: "omegabh2".into(), declared: "omegab".into() },
                ParamMapping { target: "tau".into(), declared: "tau".into() },
            ]
        );
    }
}
