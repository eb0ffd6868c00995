//! Domain types used throughout the analysis.
//!
//! This module defines:
//!
//! - the source handle passed between callers (`SourceReference`)
//! - the loaded measurement series (`Dataset`, `Record`)
//! - analysis outcomes (`NormalityVerdict`, `CapabilityIndices`)
//! - caller-supplied settings (`SpecLimits`, `AnalysisConfig`)

pub mod types;

pub use types::*;
