//! Reporting utilities: formatted terminal output for selections and databases.

pub mod format;

pub use format::*;
