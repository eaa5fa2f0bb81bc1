//! `covmat-select` library crate.
//!
//! Picks the pre-computed covariance matrix that best fits a model's sampled
//! parameters and likelihoods, from a cached database of covmat files.
//!
//! The binary (`covmat`) is a thin wrapper around this library so that core
//! logic is testable without spawning processes.

pub mod app;
pub mod cli;
pub mod data;
pub mod db;
pub mod domain;
pub mod error;
pub mod io;
pub mod report;
pub mod select;
