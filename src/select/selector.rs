//! Staged covmat ranking.
//!
//! Selection rules, applied in order, each keeping only the best-scoring subset:
//! 1. Most parameters shared with the target set (must share at least one)
//! 2. Most likelihood keywords found in the file name (no minimum)
//! 3. Fewest declared parameters
//! 4. Fewest tokens in the file name (`_` and `-` count as separators)
//!
//! Anything still tied after that is picked at random from the supplied RNG.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::db::DatabaseCache;
use crate::domain::{CandidateRecord, SelectionQuery, SelectionResult};
use crate::select::aliases::{LikelihoodPatterns, param_alias_set, translate_params};
use crate::select::score::select_best;

/// Why ranking produced no candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankFailure {
    EmptyDatabase,
    NoParameterOverlap,
}

/// Run the ranking stages over `database`.
///
/// Returns every candidate that survives all stages (never empty on success).
pub fn rank_candidates<'a>(
    database: &'a [CandidateRecord],
    query: &SelectionQuery,
) -> Result<Vec<&'a CandidateRecord>, RankFailure> {
    if database.is_empty() {
        return Err(RankFailure::EmptyDatabase);
    }

    let param_aliases = param_alias_set(&query.params);
    let by_params = select_best(
        database.iter().collect::<Vec<&CandidateRecord>>(),
        |c| shared_param_count(c, &param_aliases),
        Some(0),
    );
    if by_params.is_empty() {
        return Err(RankFailure::NoParameterOverlap);
    }

    let patterns = LikelihoodPatterns::from_likelihoods(&query.likelihoods);
    let by_likes = select_best(by_params, |c| patterns.count_matches(&c.file_name), None);
    log_stage("params + likes", &by_likes);

    let by_param_count = select_best(by_likes, |c| -(c.declared_params.len() as i64), None);
    log_stage("params + likes + fewest params", &by_param_count);

    let by_name = select_best(by_param_count, |c| -(name_token_count(&c.file_name) as i64), None);
    log_stage("params + likes + fewest params + shortest name", &by_name);

    Ok(by_name)
}

/// Number of distinct declared parameters that appear in the target alias set.
fn shared_param_count(candidate: &CandidateRecord, aliases: &HashSet<&str>) -> usize {
    candidate
        .declared_params
        .iter()
        .map(String::as_str)
        .collect::<HashSet<_>>()
        .intersection(aliases)
        .count()
}

/// `base_plikHM-TT.covmat` has 3 tokens.
fn name_token_count(file_name: &str) -> usize {
    file_name
        .split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .count()
}

fn log_stage(stage: &str, survivors: &[&CandidateRecord]) {
    if tracing::enabled!(target: "covmat.select", tracing::Level::DEBUG) {
        let names: Vec<&str> = survivors.iter().map(|c| c.file_name.as_str()).collect();
        tracing::debug!(target: "covmat.select", stage, ?names, "ranking stage survivors");
    }
}

/// Uniform index in `0..len` from `rng`. `len` must be non-zero.
pub fn pick_index<R: Rng + ?Sized>(rng: &mut R, len: usize) -> usize {
    rng.gen_range(0..len)
}

/// Picks the best covmat for a query, loading candidates through its own cache.
#[derive(Debug, Clone)]
pub struct Selector {
    cache: DatabaseCache,
}

impl Selector {
    pub fn new(cache: DatabaseCache) -> Self {
        Self { cache }
    }

    pub fn cache_mut(&mut self) -> &mut DatabaseCache {
        &mut self.cache
    }

    /// Best covmat for `query`, or `None` if no candidate shares a parameter.
    ///
    /// A `seed` makes the final tie-break reproducible; `None` draws from OS entropy.
    pub fn best_match(
        &mut self,
        query: &SelectionQuery,
        seed: Option<u64>,
        allow_cache: bool,
    ) -> Option<SelectionResult> {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.best_match_with_rng(query, &mut rng, allow_cache)
    }

    /// Same as `best_match`, drawing the tie-break from `rng`.
    pub fn best_match_with_rng<R: Rng + ?Sized>(
        &mut self,
        query: &SelectionQuery,
        rng: &mut R,
        allow_cache: bool,
    ) -> Option<SelectionResult> {
        let database = self.cache.load(&query.directories, allow_cache);
        let prefix = query
            .context
            .as_deref()
            .map(|c| format!("{c}: "))
            .unwrap_or_default();

        let survivors = match rank_candidates(&database, query) {
            Ok(survivors) => survivors,
            Err(RankFailure::EmptyDatabase) => {
                tracing::warn!(
                    target: "covmat.select",
                    directories = ?query.directories,
                    "{prefix}no covariance matrices found"
                );
                return None;
            }
            Err(RankFailure::NoParameterOverlap) => {
                tracing::warn!(
                    target: "covmat.select",
                    "{prefix}no covariance matrix found including at least one of the given parameters"
                );
                return None;
            }
        };

        if survivors.len() > 1 {
            let names: Vec<&str> = survivors.iter().map(|c| c.file_name.as_str()).collect();
            tracing::warn!(
                target: "covmat.select",
                ?names,
                "{prefix}more than one possible best covmat; picking one at random"
            );
        }

        let winner = survivors[pick_index(rng, survivors.len())].clone();
        let params = translate_params(&query.params, &winner.declared_params);
        Some(SelectionResult {
            directory: winner.directory,
            file_name: winner.file_name,
            declared_params: winner.declared_params,
            params,
            covmat: None,
        })
    }
}
