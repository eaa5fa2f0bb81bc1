//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - installs the log subscriber
//! - runs covmat selection / database listing
//! - prints reports and writes optional exports

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{BestArgs, CacheArgs, Command, DbArgs, SourceArgs};
use crate::db::DatabaseCache;
use crate::domain::SelectConfig;
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `covmat` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Command::Best(args) => handle_best(args),
        Command::Db(args) => handle_db(args),
        Command::ClearCache(args) => handle_clear_cache(args),
    }
}

fn handle_best(args: BestArgs) -> Result<(), AppError> {
    let config = best_config_from_args(&args);
    let Some(result) = pipeline::run_best(&config)? else {
        return Err(AppError::no_covmat("No covariance matrix found for the given model."));
    };

    println!("{}", crate::report::format_selection(&result));

    if let (Some(path), Some(covmat)) = (&config.export, &result.covmat) {
        crate::io::write_matrix(path, &result.target_params(), covmat)?;
        tracing::info!(target: "covmat.select", path = %path.display(), "wrote covmat");
    }

    Ok(())
}

fn handle_db(args: DbArgs) -> Result<(), AppError> {
    let mut config = config_from_source(&args.source);
    config.model_path = args.model;
    let load = pipeline::run_database(&config)?;
    println!("{}", crate::report::format_database(&load));
    Ok(())
}

fn handle_clear_cache(args: CacheArgs) -> Result<(), AppError> {
    let cache = match args.cache_dir {
        Some(dir) => DatabaseCache::new(dir),
        None => DatabaseCache::from_env(),
    };
    let removed = cache.clear_persisted()?;
    println!(
        "Removed {removed} cached database file(s) from {}",
        cache.cache_dir().display()
    );
    Ok(())
}

pub fn best_config_from_args(args: &BestArgs) -> SelectConfig {
    SelectConfig {
        model_path: Some(args.model.clone()),
        seed: args.seed,
        export: args.export.clone(),
        ..config_from_source(&args.source)
    }
}

fn config_from_source(source: &SourceArgs) -> SelectConfig {
    SelectConfig {
        model_path: None,
        packages_path: source.packages_path.clone(),
        covmat_dirs: source.covmat_dirs.clone(),
        cache_dir: source.cache.cache_dir.clone(),
        allow_cache: !source.no_cache,
        seed: None,
        export: None,
    }
}

/// Log to stderr. `RUST_LOG`, when set, takes precedence over `-v`/`-q`.
fn init_logging(verbose: u8, quiet: bool) {
    let filter = std::env::var("RUST_LOG")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .and_then(|v| EnvFilter::try_new(v).ok())
        .unwrap_or_else(|| EnvFilter::new(level_directive(verbose, quiet)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn level_directive(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}
