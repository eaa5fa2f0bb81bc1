//! Covariance matrix database.
//!
//! - directory-list fingerprints used as cache keys (`fingerprint`)
//! - header parsing + directory scan (`scan`)
//! - in-process and on-disk database cache (`cache`)

pub mod cache;
pub mod fingerprint;
pub mod scan;

#[cfg(test)]
pub(crate) mod fixtures;

pub use cache::*;
pub use fingerprint::*;
pub use scan::*;
