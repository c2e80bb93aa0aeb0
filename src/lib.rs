//! `ledgerview` library crate.
//!
//! The binary (`lv`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the resolver, normalizer and catalog builder are reusable on their own
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod plot;
pub mod report;
pub mod resolve;
pub mod table;
pub mod tui;
