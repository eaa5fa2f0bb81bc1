//! Domain types used throughout the selection pipeline.
//!
//! This module defines:
//!
//! - candidate records as stored in the covmat database (`CandidateRecord`)
//! - the model description consumed by the selector (`ModelInfo`, `ParamInfo`, `LikelihoodInfo`)
//! - selection inputs/outputs (`SelectionQuery`, `SelectionResult`, `ParamMapping`)

pub mod types;

pub use types::*;
