//! Owned two-panel figure model.
//!
//! [`build_graph`] derives everything a renderer needs (bins, points, mean
//! markers) from a dataset. Renderers only read a [`Figure`]; none of them
//! hold state between calls.

use serde::Serialize;
use u_numflow::stats;

use crate::domain::{Dataset, LAYER_COLUMN};

/// Number of equal-width histogram bins.
pub const HISTOGRAM_BINS: usize = 10;

/// One histogram bin covering `[lower, upper)`; the last bin also includes `upper`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Distribution panel: histogram of the signal plus a vertical mean line.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HistogramPanel {
    pub bins: Vec<HistogramBin>,
    pub mean: Option<f64>,
}

impl HistogramPanel {
    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// `(first bin lower edge, last bin upper edge)`.
    pub fn range(&self) -> Option<(f64, f64)> {
        Some((self.bins.first()?.lower, self.bins.last()?.upper))
    }

    pub fn max_count(&self) -> usize {
        self.bins.iter().map(|b| b.count).max().unwrap_or(0)
    }

    /// Index of the bin `value` falls into, or `None` if it is outside the range.
    pub fn bin_index(&self, value: f64) -> Option<usize> {
        let (lo, hi) = self.range()?;
        if !(value >= lo && value <= hi) {
            return None;
        }
        let n = self.bins.len();
        let idx = ((value - lo) / (hi - lo) * n as f64).floor() as usize;
        Some(idx.min(n - 1))
    }
}

/// Trend panel: `(layer, value)` scatter plus a horizontal mean line.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrendPanel {
    pub points: Vec<(f64, f64)>,
    pub mean: Option<f64>,
}

impl TrendPanel {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn layer_range(&self) -> Option<(f64, f64)> {
        let layers: Vec<f64> = self.points.iter().map(|&(x, _)| x).collect();
        finite_range(&layers)
    }

    /// Value range over the points and the mean line.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        let mut values: Vec<f64> = self.points.iter().map(|&(_, y)| y).collect();
        values.extend(self.mean);
        finite_range(&values)
    }
}

/// Histogram on top, trend below.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Figure {
    pub signal: String,
    pub histogram: HistogramPanel,
    pub trend: TrendPanel,
}

impl Figure {
    /// Both panels empty (the shape produced for an empty dataset).
    pub fn is_empty(&self) -> bool {
        self.histogram.is_empty() && self.trend.is_empty()
    }
}

/// Build the two-panel figure for `signal`.
///
/// Never fails: an empty dataset, or one without the signal column, yields a
/// figure with two empty panels.
pub fn build_graph(dataset: &Dataset, signal: &str) -> Figure {
    let mut figure = Figure {
        signal: signal.to_string(),
        ..Figure::default()
    };
    let (Some(values), Some(layers)) = (dataset.column(signal), dataset.column(LAYER_COLUMN))
    else {
        return figure;
    };

    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let mu = stats::mean(&finite);

    figure.histogram = HistogramPanel {
        bins: histogram_bins(&finite, HISTOGRAM_BINS),
        mean: mu,
    };
    figure.trend = TrendPanel {
        points: layers.into_iter().zip(values).collect(),
        mean: mu,
    };
    figure
}

/// Equal-width bins over `[min, max]` of `values` (all assumed finite).
///
/// A constant series gets the range `[v - 0.5, v + 0.5]`.
pub fn histogram_bins(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    let Some((mut lo, mut hi)) = finite_range(values) else {
        return Vec::new();
    };
    if bins == 0 {
        return Vec::new();
    }
    if hi <= lo {
        lo -= 0.5;
        hi += 0.5;
    }

    let step = (hi - lo) / bins as f64;
    let mut out: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            lower: lo + step * i as f64,
            upper: if i + 1 == bins { hi } else { lo + step * (i + 1) as f64 },
            count: 0,
        })
        .collect();

    for &v in values {
        let idx = (((v - lo) / (hi - lo)) * bins as f64).floor();
        let idx = (idx.max(0.0) as usize).min(bins - 1);
        out[idx].count += 1;
    }
    out
}

/// `(min, max)` over the finite values; `None` if there are none.
fn finite_range(values: &[f64]) -> Option<(f64, f64)> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    Some((stats::min(&finite)?, stats::max(&finite)?))
}
