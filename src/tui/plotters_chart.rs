//! Plotters-powered monthly value chart widget for Ratatui.
//!
//! Why Plotters instead of Ratatui's built-in `Chart` widget?
//! - nicer axis + mesh rendering
//! - less manual work for ticks/labels
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::domain::SeriesPoint;

/// A render-only line chart over evenly spaced months.
///
/// All series and bounds are computed outside the render call (see
/// `SeriesChart::from_points`), so `render()` only draws.
pub struct SeriesChart<'a> {
    /// `(month index, total value)` pairs.
    pub points: Vec<(f64, f64)>,
    /// `YYYY-MM` label per month index.
    pub months: Vec<String>,
    pub y_bounds: [f64; 2],
    pub y_label: &'a str,
    pub fmt_y: fn(f64) -> String,
}

impl<'a> SeriesChart<'a> {
    pub fn from_points(series: &[SeriesPoint], y_label: &'a str, fmt_y: fn(f64) -> String) -> Self {
        let points: Vec<(f64, f64)> = series
            .iter()
            .enumerate()
            .map(|(i, p)| (i as f64, p.total_value))
            .collect();
        let months = series.iter().map(|p| p.bucket.to_string()).collect();

        let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
        for &(_, y) in &points {
            y_min = y_min.min(y);
            y_max = y_max.max(y);
        }
        if !y_min.is_finite() || !y_max.is_finite() {
            y_min = 0.0;
            y_max = 1.0;
        }
        // Anchor at zero so bar-like magnitudes read correctly.
        y_min = y_min.min(0.0);
        if y_max <= y_min {
            y_max = y_min + 1.0;
        }
        let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);

        Self {
            points,
            months,
            y_bounds: [y_min, y_max + pad],
            y_label,
            fmt_y,
        }
    }

    fn month_label(&self, x: f64) -> String {
        let idx = x.round();
        if (x - idx).abs() > 0.25 || idx < 0.0 {
            return String::new();
        }
        self.months.get(idx as usize).cloned().unwrap_or_default()
    }
}

impl<'a> Widget for SeriesChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a chart.
        // In that case, we render a small hint rather than panicking.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }
        if self.points.is_empty() {
            return;
        }

        let x0 = -0.5;
        let x1 = self.points.len() as f64 - 0.5;
        let y0 = self.y_bounds[0];
        let y1 = self.y_bounds[1];

        if !(y0.is_finite() && y1.is_finite()) || y1 <= y0 {
            return;
        }

        let x_labels = self.months.len().clamp(1, 6);
        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 10)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc("month")
                .y_desc(self.y_label)
                .x_labels(x_labels)
                .y_labels(5)
                .x_label_formatter(&|v| self.month_label(*v))
                .y_label_formatter(&|v| (self.fmt_y)(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            let line_color = RGBColor(0, 255, 255); // cyan
            let marker_color = RGBColor(255, 255, 0); // yellow

            chart.draw_series(LineSeries::new(self.points.iter().copied(), &line_color))?;

            // `Circle` radii are mis-scaled by the ratatui backend; a `Pixel` is a
            // clean dot in a terminal cell.
            chart.draw_series(
                self.points
                    .iter()
                    .map(|&(x, y)| Pixel::new((x, y), marker_color)),
            )?;

            Ok(())
        });

        widget.render(area, buf);
    }
}
