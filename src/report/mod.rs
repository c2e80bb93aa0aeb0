//! Terminal formatting for tables, matches and build summaries.

pub mod format;

pub use format::*;
