//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - catalog rows and statement references (`CatalogEntry`, `StatementRefs`)
//! - resolver outputs (`MatchResult`, `Suggestion`)
//! - scraped and reshaped tables (`RawTable`, `LongRow`, `TrendPoint`)

pub mod types;

pub use types::*;
