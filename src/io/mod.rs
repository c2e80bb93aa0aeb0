//! Output helpers.
//!
//! - workbook export of both statements (`export`)

pub mod export;

pub use export::*;
