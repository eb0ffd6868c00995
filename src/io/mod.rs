//! Input/output helpers.
//!
//! - CSV ingest, fail-soft load, header listing (`ingest`)
//! - JSON report export (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
