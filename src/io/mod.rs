//! Input/output helpers.
//!
//! - covmat text files: read, slice, write (`matrix`)
//! - model description JSON (`model`)

pub mod matrix;
pub mod model;

pub use matrix::*;
pub use model::*;
