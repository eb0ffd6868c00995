//! ASCII rendering of the two-panel figure for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - histogram bars: `#`
//! - histogram mean: `|` column
//! - trend points: `o`
//! - trend mean: `-` row

use crate::plot::figure::{Figure, HistogramPanel, TrendPanel};

/// Render both panels, histogram first, each `width` x `height` cells.
pub fn render_ascii(figure: &Figure, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let mut out = render_histogram(&figure.histogram, &figure.signal, width, height);
    out.push('\n');
    out.push_str(&render_trend(&figure.trend, &figure.signal, width, height));
    out
}

fn render_histogram(panel: &HistogramPanel, signal: &str, width: usize, height: usize) -> String {
    let Some((lo, hi)) = panel.range() else {
        return format!("Histogram: `{signal}` (no data)\n");
    };
    let peak = panel.max_count().max(1);

    let mut grid = vec![vec![' '; width]; height];

    for col in 0..width {
        // Sample the bin under the centre of each column.
        let x = lo + (col as f64 + 0.5) / width as f64 * (hi - lo);
        let count = panel
            .bin_index(x)
            .map(|idx| panel.bins[idx].count)
            .unwrap_or(0);
        let bar = ((count as f64 / peak as f64) * height as f64).round() as usize;
        for row in grid.iter_mut().skip(height - bar.min(height)) {
            row[col] = '#';
        }
    }

    if let Some(mu) = panel.mean {
        let col = map_x(mu, lo, hi, width);
        for row in grid.iter_mut() {
            row[col] = '|';
        }
    }

    let mut out = format!(
        "Histogram: `{signal}` | range=[{lo:.3}, {hi:.3}] | peak={} | mean={}\n",
        panel.max_count(),
        fmt_mean(panel.mean)
    );
    push_grid(&mut out, grid);
    out
}

fn render_trend(panel: &TrendPanel, signal: &str, width: usize, height: usize) -> String {
    let (Some((x_min, x_max)), Some((y_min, y_max))) = (panel.layer_range(), panel.value_range())
    else {
        return format!("Trend: `{signal}` vs layer (no data)\n");
    };
    let (x_min, x_max) = widen_if_flat(x_min, x_max);
    let (y_min, y_max) = widen_if_flat(y_min, y_max);
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Draw the mean first so points can overlay it.
    if let Some(mu) = panel.mean {
        let row = map_y(mu, y_min, y_max, height);
        draw_line(&mut grid, 0, row, width - 1, row, '-');
    }

    for &(x, y) in &panel.points {
        if !(x.is_finite() && y.is_finite()) {
            continue;
        }
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        grid[row][col] = 'o';
    }

    let mut out = format!(
        "Trend: `{signal}` vs layer | layer=[{x_min:.3}, {x_max:.3}] | y=[{y_min:.2}, {y_max:.2}] | mean={}\n",
        fmt_mean(panel.mean)
    );
    push_grid(&mut out, grid);
    out
}

fn push_grid(out: &mut String, grid: Vec<Vec<char>>) {
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
}

fn fmt_mean(mean: Option<f64>) -> String {
    mean.map(|m| format!("{m:.3}")).unwrap_or_else(|| "-".to_string())
}

fn widen_if_flat(min: f64, max: f64) -> (f64, f64) {
    if max > min { (min, max) } else { (min - 0.5, max + 0.5) }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plot::figure::{HISTOGRAM_BINS, histogram_bins};

    #[test]
    fn histogram_golden_snapshot() {
        let panel = HistogramPanel {
            bins: histogram_bins(&[0.0, 0.0, 1.0, 2.0], HISTOGRAM_BINS),
            mean: Some(0.75),
        };
        let txt = render_histogram(&panel, "x", 10, 4);
        let expected = concat!(
            "Histogram: `x` | range=[0.000, 2.000] | peak=2 | mean=0.750\n",
            "#  |      \n",
            "#  |      \n",
            "#  |  #  #\n",
            "#  |  #  #\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn trend_golden_snapshot() {
        let panel = TrendPanel {
            points: vec![(1.0, 0.0), (2.0, 1.0), (3.0, 2.0)],
            mean: Some(1.0),
        };
        let txt = render_trend(&panel, "x", 10, 5);
        let expected = concat!(
            "Trend: `x` vs layer | layer=[1.000, 3.000] | y=[-0.10, 2.10] | mean=1.000\n",
            "         o\n",
            "          \n",
            "-----o----\n",
            "          \n",
            "o         \n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn empty_figure_renders_placeholders() {
        let txt = render_ascii(&Figure::default(), 20, 5);
        assert!(txt.contains("Histogram: `` (no data)"));
        assert!(txt.contains("Trend: `` vs layer (no data)"));
    }

    #[test]
    fn single_point_does_not_panic() {
        let figure = Figure {
            signal: "s".to_string(),
            histogram: HistogramPanel {
                bins: histogram_bins(&[1.0], HISTOGRAM_BINS),
                mean: Some(1.0),
            },
            trend: TrendPanel {
                points: vec![(1.0, 1.0)],
                mean: Some(1.0),
            },
        };
        let txt = render_ascii(&figure, 12, 6);
        assert!(txt.contains('o'));
        assert!(txt.contains('|'));
    }
}
