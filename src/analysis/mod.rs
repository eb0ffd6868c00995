//! Normality gate and process-capability computation.
//!
//! Flow for one dataset:
//!
//! ```text
//! Dataset ──▶ normality (Shapiro–Wilk, α = 0.05) ──▶ capability (Cp, Cpk)
//! ```
//!
//! Capability indices are only reported for data that passes the gate.

pub mod capability;
pub mod normality;

pub use capability::*;
pub use normality::*;
