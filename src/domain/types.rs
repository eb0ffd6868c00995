//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - held in memory for one analysis session
//! - exported to JSON reports
//! - handed back and forth by an outer caller (CLI, TUI) without hidden state

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Signal column analyzed when the caller does not name one.
pub const DEFAULT_SIGNAL: &str = "mean_ir_pwr";

/// Record-index column every source must carry.
pub const LAYER_COLUMN: &str = "layer";

/// Significance level of the normality test. Not configurable.
pub const NORMALITY_ALPHA: f64 = 0.05;

/// Default lower specification limit.
pub const DEFAULT_LSL: f64 = -1.0;

/// Default upper specification limit.
pub const DEFAULT_USL: f64 = 1.0;

/// Where to load a series from, plus which column to extract.
///
/// Immutable once built: callers that need another signal build a new reference
/// with [`SourceReference::with_signal`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceReference {
    path: PathBuf,
    signal: String,
}

impl SourceReference {
    /// Reference `path` with the default signal column.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_signal(path, DEFAULT_SIGNAL)
    }

    pub fn with_signal(path: impl Into<PathBuf>, signal: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            signal: signal.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn signal(&self) -> &str {
        &self.signal
    }
}

/// One row of a loaded dataset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub layer: f64,
    pub value: f64,
}

/// An ordered `(layer, signal)` series.
///
/// A dataset either carries both columns for every row or nothing at all:
/// loaders never hand out partially filled rows. A dataset created by
/// [`Dataset::empty`] has no columns, the same shape a failed load produces.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    signal: Option<String>,
    records: Vec<Record>,
}

impl Dataset {
    pub fn new(signal: impl Into<String>, records: Vec<Record>) -> Self {
        Self {
            signal: Some(signal.into()),
            records,
        }
    }

    /// Dataset with no columns and no rows.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Name of the signal column, if the dataset has columns at all.
    pub fn signal(&self) -> Option<&str> {
        self.signal.as_deref()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Column names in `(layer, signal)` order; empty when there are no columns.
    pub fn column_names(&self) -> Vec<&str> {
        match &self.signal {
            Some(signal) => vec![LAYER_COLUMN, signal.as_str()],
            None => Vec::new(),
        }
    }

    /// Values of the named column, or `None` if the dataset does not carry it.
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        if self.signal.as_deref() == Some(name) {
            return Some(self.records.iter().map(|r| r.value).collect());
        }
        if name == LAYER_COLUMN && self.signal.is_some() {
            return Some(self.records.iter().map(|r| r.layer).collect());
        }
        None
    }

    /// `(layer, value)` pairs in row order.
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.records.iter().map(|r| (r.layer, r.value)).collect()
    }
}

/// Outcome of the normality gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalityVerdict {
    Normal,
    NotNormal,
}

impl NormalityVerdict {
    /// `1` for normal, `0` otherwise.
    pub fn as_flag(self) -> u8 {
        match self {
            NormalityVerdict::Normal => 1,
            NormalityVerdict::NotNormal => 0,
        }
    }

    pub fn is_normal(self) -> bool {
        self == NormalityVerdict::Normal
    }

    pub fn display_name(self) -> &'static str {
        match self {
            NormalityVerdict::Normal => "normal",
            NormalityVerdict::NotNormal => "not normal",
        }
    }
}

/// Lower/upper specification limits.
///
/// [`SpecLimits::new`] accepts any pair, including inverted limits (which yield
/// a negative Cp). Outer callers go through [`SpecLimits::validated`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpecLimits {
    pub lower: f64,
    pub upper: f64,
}

impl Default for SpecLimits {
    fn default() -> Self {
        Self {
            lower: DEFAULT_LSL,
            upper: DEFAULT_USL,
        }
    }
}

impl SpecLimits {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    /// Build limits, rejecting non-finite values and `lower >= upper`.
    pub fn validated(lower: f64, upper: f64) -> Result<Self, AppError> {
        if !(lower.is_finite() && upper.is_finite()) {
            return Err(AppError::usage(format!(
                "Specification limits must be finite (got lsl={lower}, usl={upper})."
            )));
        }
        if lower >= upper {
            return Err(AppError::usage(format!(
                "Lower specification limit must be below the upper one (got lsl={lower}, usl={upper})."
            )));
        }
        Ok(Self { lower, upper })
    }

    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

/// Capability indices for a normal series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapabilityIndices {
    /// `(USL - LSL) / 6σ`
    pub cp: f64,
    /// `min(cpu, cpl)`
    pub cpk: f64,
    /// `(USL - μ) / 3σ`
    pub cpu: f64,
    /// `(μ - LSL) / 3σ`
    pub cpl: f64,
    pub mean: f64,
    /// Population standard deviation (divisor `n`).
    pub sigma: f64,
}

/// Resolved settings for one `spc analyze` run.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub source: SourceReference,
    pub limits: SpecLimits,
    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
    pub export_json: Option<PathBuf>,
    pub export_svg: Option<PathBuf>,
    pub svg_width: u32,
    pub svg_height: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_reference_defaults_signal() {
        let source = SourceReference::new("data.csv");
        assert_eq!(source.signal(), DEFAULT_SIGNAL);
        assert_eq!(source.path(), Path::new("data.csv"));
    }

    #[test]
    fn dataset_columns_follow_layer_signal_order() {
        let ds = Dataset::new(
            "power",
            vec![
                Record { layer: 1.0, value: 0.5 },
                Record { layer: 2.0, value: 0.7 },
            ],
        );
        assert_eq!(ds.column_names(), vec!["layer", "power"]);
        assert_eq!(ds.column("power"), Some(vec![0.5, 0.7]));
        assert_eq!(ds.column("layer"), Some(vec![1.0, 2.0]));
        assert_eq!(ds.column("other"), None);
    }

    #[test]
    fn empty_dataset_has_no_columns() {
        let ds = Dataset::empty();
        assert!(ds.is_empty());
        assert!(ds.column_names().is_empty());
        assert_eq!(ds.column(LAYER_COLUMN), None);
    }

    #[test]
    fn verdict_flags() {
        assert_eq!(NormalityVerdict::Normal.as_flag(), 1);
        assert_eq!(NormalityVerdict::NotNormal.as_flag(), 0);
    }

    #[test]
    fn validated_limits_reject_inverted_and_non_finite() {
        assert!(SpecLimits::validated(-1.0, 1.0).is_ok());
        assert_eq!(SpecLimits::validated(1.0, -1.0).unwrap_err().exit_code(), 2);
        assert!(SpecLimits::validated(0.5, 0.5).is_err());
        assert!(SpecLimits::validated(f64::NAN, 1.0).is_err());
        assert_eq!(SpecLimits::default(), SpecLimits::new(-1.0, 1.0));
    }
}
