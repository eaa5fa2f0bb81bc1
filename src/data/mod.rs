//! Installation layout: where covmat directories live under a packages path.

pub mod packages;

pub use packages::*;
