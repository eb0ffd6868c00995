//! Two-panel figure (histogram + trend) and its renderers.
//!
//! - [`figure`]: the owned figure model built from a dataset
//! - [`ascii`]: fixed-size text grid for terminal output
//! - [`chart`]: Plotters drawing, shared by the SVG export and the TUI
//! - [`svg`]: SVG string/file export

pub mod ascii;
pub mod chart;
pub mod figure;
pub mod svg;

pub use ascii::render_ascii;
pub use chart::{FigureTheme, PointMarker, draw_figure};
pub use figure::{Figure, HISTOGRAM_BINS, HistogramBin, HistogramPanel, TrendPanel, build_graph};
pub use svg::{render_svg, write_svg};
