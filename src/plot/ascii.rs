//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal or a CI log
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - horizontal bars: `#` (negative values use `-`)
//! - monthly series: `o` markers joined by a `.` line

use crate::domain::{RankedRow, SeriesPoint};

const MAX_LABEL: usize = 28;

/// Render a horizontal bar chart, one row per ranking entry.
pub fn render_bar_chart(rows: &[RankedRow], width: usize, fmt_value: fn(f64) -> String) -> String {
    if rows.is_empty() {
        return "(no data)\n".to_string();
    }

    let width = width.max(5);
    let label_width = rows
        .iter()
        .map(|r| r.key.chars().count())
        .max()
        .unwrap_or(0)
        .min(MAX_LABEL);
    let max_abs = rows
        .iter()
        .map(|r| r.value.abs())
        .filter(|v| v.is_finite())
        .fold(0.0, f64::max);

    let mut out = String::new();
    for r in rows {
        let len = if max_abs > 0.0 {
            ((r.value.abs() / max_abs) * width as f64).round() as usize
        } else {
            0
        };
        let ch = if r.value < 0.0 { '-' } else { '#' };
        let bar: String = std::iter::repeat_n(ch, len.min(width)).collect();
        out.push_str(&format!(
            "{:<label_width$} |{bar:<width$}| {}\n",
            truncate(&r.key, label_width),
            fmt_value(r.value),
        ));
    }
    out
}

/// Render a monthly series as a line plot (months evenly spaced on x).
pub fn render_series_plot(points: &[SeriesPoint], width: usize, height: usize) -> String {
    if points.is_empty() {
        return "(no data)\n".to_string();
    }

    let width = width.max(10);
    let height = height.max(5);

    let (y_min, y_max) = y_range(points).unwrap_or_else(|| {
        let v = points[0].total_value;
        (v - 1.0, v + 1.0)
    });
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];
    let n = points.len();

    let coords: Vec<(usize, usize)> = points
        .iter()
        .enumerate()
        .map(|(i, p)| (map_x(i, n, width), map_y(p.total_value, y_min, y_max, height)))
        .collect();

    for pair in coords.windows(2) {
        draw_line(&mut grid, pair[0].0, pair[0].1, pair[1].0, pair[1].1, '.');
    }
    for &(x, y) in &coords {
        grid[y][x] = 'o';
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: months=[{}, {}] | value=[{y_min:.2}, {y_max:.2}]\n",
        points[0].bucket,
        points[n - 1].bucket,
    ));
    for row in grid {
        out.push_str(row.into_iter().collect::<String>().trim_end());
        out.push('\n');
    }
    out
}

fn y_range(points: &[SeriesPoint]) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for p in points {
        min_y = min_y.min(p.total_value);
        max_y = max_y.max(p.total_value);
    }
    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(i: usize, n: usize, width: usize) -> usize {
    if n < 2 {
        return 0;
    }
    let u = i as f64 / (n as f64 - 1.0);
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

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MonthBucket;

    fn fmt2(v: f64) -> String {
        format!("{v:.2}")
    }

    #[test]
    fn bar_chart_golden_snapshot_small() {
        let rows = vec![
            RankedRow { key: "Acme".to_string(), value: 100.0 },
            RankedRow { key: "Beta".to_string(), value: 50.0 },
            RankedRow { key: "Gamma".to_string(), value: -25.0 },
        ];
        let txt = render_bar_chart(&rows, 10, fmt2);
        let expected = concat!(
            "Acme  |##########| 100.00\n",
            "Beta  |#####     | 50.00\n",
            "Gamma |---       | -25.00\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn empty_inputs_render_no_data() {
        assert_eq!(render_bar_chart(&[], 10, fmt2), "(no data)\n");
        assert_eq!(render_series_plot(&[], 10, 5), "(no data)\n");
    }

    #[test]
    fn series_plot_marks_every_month() {
        let points = vec![
            SeriesPoint {
                bucket: MonthBucket { year: 2024, month: 1 },
                month_end: MonthBucket { year: 2024, month: 1 }.last_day(),
                total_value: 100.0,
            },
            SeriesPoint {
                bucket: MonthBucket { year: 2024, month: 2 },
                month_end: MonthBucket { year: 2024, month: 2 }.last_day(),
                total_value: 300.0,
            },
            SeriesPoint {
                bucket: MonthBucket { year: 2024, month: 4 },
                month_end: MonthBucket { year: 2024, month: 4 }.last_day(),
                total_value: 200.0,
            },
        ];
        let txt = render_series_plot(&points, 20, 6);
        let lines: Vec<_> = txt.lines().collect();
        assert_eq!(lines.len(), 7);
        assert!(lines[0].starts_with("Plot: months=[2024-01, 2024-04]"));
        let markers: usize = lines[1..].iter().map(|l| l.matches('o').count()).sum();
        assert_eq!(markers, 3);
        // Max value sits on the top row, min value on the bottom row.
        assert!(lines[1].contains('o'));
        assert!(lines[6].starts_with('o'));
    }

    #[test]
    fn single_point_series_does_not_panic() {
        let points = vec![SeriesPoint {
            bucket: MonthBucket { year: 2024, month: 1 },
            month_end: MonthBucket { year: 2024, month: 1 }.last_day(),
            total_value: 42.0,
        }];
        let txt = render_series_plot(&points, 10, 5);
        let markers: usize = txt.lines().skip(1).map(|l| l.matches('o').count()).sum();
        assert_eq!(markers, 1);
    }
}
