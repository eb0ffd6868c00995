//! Plotters drawing of the two-panel figure.
//!
//! [`draw_figure`] is generic over the drawing backend, so the same code
//! renders to an SVG string and into the Ratatui buffer. Only the
//! [`FigureTheme`] differs between the two.

use plotters::coord::Shift;
use plotters::prelude::*;

use crate::plot::figure::{Figure, HistogramPanel, TrendPanel};

/// How trend points are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointMarker {
    Circle(u32),
    /// One backend pixel.
    Pixel,
}

/// Colors and sizes for one backend.
#[derive(Debug, Clone, Copy)]
pub struct FigureTheme {
    pub background: Option<RGBColor>,
    pub foreground: RGBColor,
    pub bar: RGBColor,
    pub point: RGBColor,
    pub mean: RGBColor,
    pub marker: PointMarker,
    pub font_size: u32,
    pub margin: u32,
    pub label_area: (u32, u32),
}

impl FigureTheme {
    /// White page, blue half-transparent data, red mean lines.
    pub fn svg() -> Self {
        Self {
            background: Some(WHITE),
            foreground: BLACK,
            bar: RGBColor(31, 119, 180),
            point: RGBColor(31, 119, 180),
            mean: RED,
            marker: PointMarker::Circle(3),
            font_size: 14,
            margin: 10,
            label_area: (50, 35),
        }
    }

    /// High-contrast palette for low-resolution terminal cells.
    pub fn terminal() -> Self {
        Self {
            background: None,
            foreground: WHITE,
            bar: RGBColor(0, 255, 255),
            point: WHITE,
            mean: RGBColor(255, 0, 0),
            // `plotters-ratatui-backend` maps circle radii from pixels to
            // normalized canvas units, which produces huge circles.
            marker: PointMarker::Pixel,
            font_size: 10,
            margin: 1,
            label_area: (6, 3),
        }
    }
}

/// Draw the histogram in the top half of `root` and the trend in the bottom half.
pub fn draw_figure<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    figure: &Figure,
    theme: &FigureTheme,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    if let Some(background) = theme.background {
        root.fill(&background)?;
    }
    let panels = root.split_evenly((2, 1));
    draw_histogram(&panels[0], &figure.histogram, &figure.signal, theme)?;
    draw_trend(&panels[1], &figure.trend, &figure.signal, theme)?;
    Ok(())
}

fn draw_histogram<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    panel: &HistogramPanel,
    signal: &str,
    theme: &FigureTheme,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    // An empty panel still gets axes over a unit range.
    let (x0, x1) = panel.range().unwrap_or((0.0, 1.0));
    let y1 = (panel.max_count().max(1) as f64) * 1.05;

    let mut chart = ChartBuilder::on(area)
        .margin(theme.margin)
        .set_label_area_size(LabelAreaPosition::Left, theme.label_area.0)
        .set_label_area_size(LabelAreaPosition::Bottom, theme.label_area.1)
        .build_cartesian_2d(x0..x1, 0.0..y1)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_desc(signal)
        .y_desc("count")
        .x_labels(5)
        .y_labels(5)
        .x_label_formatter(&|v| format!("{v:.2}"))
        .y_label_formatter(&|v| format!("{v:.0}"))
        .label_style(("sans-serif", theme.font_size).into_font().color(&theme.foreground))
        .axis_style(&theme.foreground)
        .draw()?;

    chart.draw_series(panel.bins.iter().filter(|b| b.count > 0).map(|b| {
        Rectangle::new(
            [(b.lower, 0.0), (b.upper, b.count as f64)],
            theme.bar.mix(0.5).filled(),
        )
    }))?;

    if let Some(mu) = panel.mean {
        chart.draw_series(LineSeries::new(
            [(mu, 0.0), (mu, y1)],
            theme.mean.stroke_width(2),
        ))?;
    }
    Ok(())
}

fn draw_trend<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    panel: &TrendPanel,
    signal: &str,
    theme: &FigureTheme,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    let (x0, x1) = widen(panel.layer_range().unwrap_or((0.0, 1.0)));
    let (y0, y1) = pad(widen(panel.value_range().unwrap_or((0.0, 1.0))));

    let mut chart = ChartBuilder::on(area)
        .margin(theme.margin)
        .set_label_area_size(LabelAreaPosition::Left, theme.label_area.0)
        .set_label_area_size(LabelAreaPosition::Bottom, theme.label_area.1)
        .build_cartesian_2d(x0..x1, y0..y1)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_desc("layer")
        .y_desc(signal)
        .x_labels(5)
        .y_labels(5)
        .x_label_formatter(&|v| format!("{v:.0}"))
        .y_label_formatter(&|v| format!("{v:.2}"))
        .label_style(("sans-serif", theme.font_size).into_font().color(&theme.foreground))
        .axis_style(&theme.foreground)
        .draw()?;

    let points = panel
        .points
        .iter()
        .copied()
        .filter(|(x, y)| x.is_finite() && y.is_finite());
    match theme.marker {
        PointMarker::Circle(radius) => {
            chart.draw_series(
                points.map(|p| Circle::new(p, radius, theme.point.mix(0.5).filled())),
            )?;
        }
        PointMarker::Pixel => {
            chart.draw_series(points.map(|p| Pixel::new(p, theme.point)))?;
        }
    }

    if let Some(mu) = panel.mean {
        chart.draw_series(LineSeries::new(
            [(x0, mu), (x1, mu)],
            theme.mean.stroke_width(2),
        ))?;
    }
    Ok(())
}

fn widen((min, max): (f64, f64)) -> (f64, f64) {
    if max > min { (min, max) } else { (min - 0.5, max + 0.5) }
}

fn pad((min, max): (f64, f64)) -> (f64, f64) {
    let span = max - min;
    (min - span * 0.05, max + span * 0.05)
}
