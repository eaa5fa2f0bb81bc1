//! Command-line parsing for the covmat selector.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! database and ranking code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "covmat", version, about = "Pick the best pre-computed covariance matrix for a model")]
pub struct Cli {
    /// More log output (-v: info, -vv: debug, -vvv: trace). `RUST_LOG` overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors (wins over -v).
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Select the best covmat for a model, print it, and optionally export it.
    Best(BestArgs),
    /// List the covmat database for the configured directories.
    Db(DbArgs),
    /// Delete every cached covmat database file.
    ClearCache(CacheArgs),
}

/// Where candidate covmats come from and how the database is cached.
#[derive(Debug, Args, Clone)]
pub struct SourceArgs {
    /// Packages installation path (falls back to the model and COVMAT_PACKAGES_PATH).
    #[arg(long, value_name = "DIR")]
    pub packages_path: Option<PathBuf>,

    /// Search this covmat directory instead of the installed ones (repeatable).
    #[arg(long = "covmat-dir", value_name = "DIR")]
    pub covmat_dirs: Vec<PathBuf>,

    /// Do not read or write the database cache.
    #[arg(long)]
    pub no_cache: bool,

    #[command(flatten)]
    pub cache: CacheArgs,
}

#[derive(Debug, Args, Clone)]
pub struct CacheArgs {
    /// Database cache directory (default: COVMAT_CACHE_DIR or the user cache dir).
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct BestArgs {
    /// Model description (JSON) listing parameters and likelihoods.
    #[arg(short, long, value_name = "JSON")]
    pub model: PathBuf,

    /// Seed for the random tie-break between equally good covmats.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Write the sliced covmat to this file.
    #[arg(long, value_name = "FILE")]
    pub export: Option<PathBuf>,

    #[command(flatten)]
    pub source: SourceArgs,
}

#[derive(Debug, Args, Clone)]
pub struct DbArgs {
    /// Model description; only its `packages_path` is used.
    #[arg(short, long, value_name = "JSON")]
    pub model: Option<PathBuf>,

    #[command(flatten)]
    pub source: SourceArgs,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_best_with_repeated_dirs() {
        let cli = Cli::parse_from([
            "covmat",
            "best",
            "--model",
            "m.json",
            "--covmat-dir",
            "a",
            "--covmat-dir",
            "b",
            "--seed",
            "3",
            "--no-cache",
            "-vv",
        ]);
        assert_eq!(cli.verbose, 2);
        let Command::Best(args) = cli.command else {
            panic!("expected best");
        };
        assert_eq!(args.source.covmat_dirs, vec![PathBuf::from("a"), PathBuf::from("b")]);
        assert_eq!(args.seed, Some(3));
        assert!(args.source.no_cache);
    }

    #[test]
    fn clear_cache_takes_cache_dir() {
        let cli = Cli::parse_from(["covmat", "clear-cache", "--cache-dir", "/tmp/c"]);
        let Command::ClearCache(args) = cli.command else {
            panic!("expected clear-cache");
        };
        assert_eq!(args.cache_dir, Some(PathBuf::from("/tmp/c")));
    }
}
