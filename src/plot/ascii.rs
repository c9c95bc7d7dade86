//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - bar chart: one `#` bar per article, scaled to the largest total
//! - line chart: hourly totals `o` joined by `-` segments

use crate::domain::{ArticleTotal, HourTotal};

/// Horizontal bar chart of article totals (in the given order).
pub fn render_bar_chart(series: &[ArticleTotal], width: usize) -> String {
    let bar_width = width.max(10);
    let label_width = series.iter().map(|a| a.article.chars().count()).max().unwrap_or(0);
    let max = series
        .iter()
        .map(|a| a.total_sales)
        .filter(|v| v.is_finite())
        .fold(0.0_f64, f64::max);

    let mut out = String::from("Total sales by article\n");
    for a in series {
        let len = if max > 0.0 && a.total_sales > 0.0 {
            ((a.total_sales / max) * bar_width as f64).round() as usize
        } else {
            0
        };
        out.push_str(&format!(
            "{:<label_width$} |{} {:.2}\n",
            a.article,
            "#".repeat(len.min(bar_width)),
            a.total_sales
        ));
    }
    out
}

/// Line chart of hourly totals; x is real time, so gaps between hours show.
pub fn render_line_chart(series: &[HourTotal], width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let points: Vec<(f64, f64)> = series
        .iter()
        .map(|h| (h.hour.and_utc().timestamp() as f64, h.total_sales))
        .collect();

    let (t_min, t_max) = x_range(&points).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = y_range(&points).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Segments first so points overlay them.
    let cells: Vec<(usize, usize)> = points
        .iter()
        .map(|&(t, y)| (map_x(t, t_min, t_max, width), map_y(y, y_min, y_max, height)))
        .collect();
    for pair in cells.windows(2) {
        draw_line(&mut grid, pair[0].0, pair[0].1, pair[1].0, pair[1].1, '-');
    }
    for &(x, y) in &cells {
        grid[y][x] = 'o';
    }

    let first = series.first().map(HourTotal::label).unwrap_or_default();
    let last = series.last().map(HourTotal::label).unwrap_or_default();

    let mut out = String::new();
    out.push_str(&format!(
        "Total sales over time: [{first} .. {last}] | y=[{y_min:.2}, {y_max:.2}]\n"
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out
}

fn x_range(points: &[(f64, f64)]) -> Option<(f64, f64)> {
    let mut min_t = f64::INFINITY;
    let mut max_t = f64::NEG_INFINITY;
    for &(t, _) in points {
        min_t = min_t.min(t);
        max_t = max_t.max(t);
    }
    if !(min_t.is_finite() && max_t.is_finite()) {
        return None;
    }
    if max_t > min_t {
        Some((min_t, max_t))
    } else {
        // Single hour: centre it.
        Some((min_t - 1.0, max_t + 1.0))
    }
}

fn y_range(points: &[(f64, f64)]) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for &(_, y) in points {
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }
    if min_y.is_finite() && max_y.is_finite() {
        Some((min_y, max_y))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = if span > 0.0 { span * frac } else { min.abs().max(1.0) * frac };
    (min - pad, max + pad)
}

fn map_x(t: f64, t_min: f64, t_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((t - t_min) / (t_max - t_min)).clamp(0.0, 1.0);
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
