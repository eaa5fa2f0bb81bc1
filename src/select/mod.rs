//! Best-covmat selection.
//!
//! Responsibilities:
//!
//! - generic "keep the best-scoring subset" reduction (`score`)
//! - parameter / likelihood alias sets and parameter translation (`aliases`)
//! - the staged ranking and random tie-break (`selector`)

pub mod aliases;
pub mod score;
pub mod selector;

pub use aliases::*;
pub use score::*;
pub use selector::*;
