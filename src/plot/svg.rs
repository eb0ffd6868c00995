//! SVG export of the two-panel figure.

use std::path::Path;

use plotters::prelude::*;

use crate::error::AppError;
use crate::plot::chart::{FigureTheme, draw_figure};
use crate::plot::figure::Figure;

/// Render `figure` as a standalone SVG document.
pub fn render_svg(figure: &Figure, width: u32, height: u32) -> Result<String, AppError> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (width.max(120), height.max(120)))
            .into_drawing_area();
        draw_figure(&root, figure, &FigureTheme::svg())
            .map_err(|e| AppError::runtime(format!("Failed to draw figure: {e}")))?;
        root.present()
            .map_err(|e| AppError::runtime(format!("Failed to finish SVG: {e}")))?;
    }
    Ok(svg)
}

/// Render `figure` and write it to `path`.
pub fn write_svg(path: &Path, figure: &Figure, width: u32, height: u32) -> Result<(), AppError> {
    let svg = render_svg(figure, width, height)?;
    std::fs::write(path, svg).map_err(|e| {
        AppError::usage(format!("Failed to write SVG '{}': {e}", path.display()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Dataset, Record};
    use crate::plot::figure::build_graph;
    use crate::test_support::unique_temp_dir;

    #[test]
    fn renders_both_panels() {
        let records = (1..=20)
            .map(|i| Record {
                layer: f64::from(i),
                value: f64::from(i % 7),
            })
            .collect();
        let figure = build_graph(&Dataset::new("power", records), "power");

        let svg = render_svg(&figure, 640, 480).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("</svg>"));
        assert!(svg.contains("<rect"));
        assert!(svg.contains("<circle"));
        assert!(svg.contains("power"));
    }

    #[test]
    fn empty_figure_still_renders() {
        let figure = build_graph(&Dataset::empty(), "power");
        let svg = render_svg(&figure, 320, 240).unwrap();
        assert!(svg.contains("</svg>"));
        assert!(!svg.contains("<circle"));
    }

    #[test]
    fn writes_file() {
        let dir = unique_temp_dir("svg");
        let path = dir.join("figure.svg");
        write_svg(&path, &Figure::default(), 320, 240).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("<svg"));
    }
}
