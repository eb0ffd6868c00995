//! Plotters-powered two-panel figure widget for Ratatui.
//!
//! We render Plotters output into the Ratatui buffer using
//! `plotters-ratatui-backend`, with the same drawing code as the SVG export.

use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::plot::{Figure, FigureTheme, draw_figure};

/// Render-only view of a [`Figure`].
pub struct FigureChart<'a> {
    pub figure: &'a Figure,
}

impl<'a> Widget for FigureChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Each panel gets half the height; below this Plotters cannot lay out axes.
        if area.width < 20 || area.height < 12 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let figure = self.figure;
        let theme = FigureTheme::terminal();
        let widget = widget_fn(move |root| {
            draw_figure(&root, figure, &theme)?;
            Ok(())
        });

        widget.render(area, buf);
    }
}
