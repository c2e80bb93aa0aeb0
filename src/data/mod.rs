//! Statement data access.
//!
//! - `fetch`: HTTP + HTML table extraction
//! - `cache`: per-URL memoization of fetch results

pub mod cache;
pub mod fetch;

pub use cache::FetchCache;
pub use fetch::{StatementClient, parse_first_table};
