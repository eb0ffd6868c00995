//! `spc-capability` library crate.
//!
//! The binary (`spc`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the analysis is reusable by other callers (each holds its own `SourceReference`)
//! - code stays easy to navigate as the project grows

pub mod analysis;
pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod plot;
pub mod report;
pub mod tui;

#[cfg(test)]
mod test_support;
