//! ASCII/Unicode plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - historical prices: `o`, joined by `.`
//! - predicted price: dashed `-` reference line

use crate::domain::TrendSeries;
use crate::plot::svg::day_number;
use crate::report::{TrendSink, format_price};

/// Renders into a string kept for the caller to print.
#[derive(Debug, Clone)]
pub struct AsciiSink {
    pub width: usize,
    pub height: usize,
    pub output: Option<String>,
}

impl AsciiSink {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            output: None,
        }
    }
}

impl TrendSink for AsciiSink {
    fn draw(&mut self, series: &TrendSeries) -> Result<(), String> {
        self.output = Some(render_ascii_trend(series, self.width, self.height));
        Ok(())
    }
}

/// Render the trend series on a `width` x `height` grid.
pub fn render_ascii_trend(series: &TrendSeries, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (t_min, t_max) = date_range(series).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = y_range(series);
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Reference line first so history overlays it.
    let ref_row = map_y(series.reference, y_min, y_max, height);
    for (x, cell) in grid[ref_row].iter_mut().enumerate() {
        if x % 2 == 0 {
            *cell = '-';
        }
    }

    let cells: Vec<(usize, usize)> = series
        .points
        .iter()
        .map(|p| {
            (
                map_x(day_number(p.date), t_min, t_max, width),
                map_y(p.price, y_min, y_max, height),
            )
        })
        .collect();

    for pair in cells.windows(2) {
        draw_line(&mut grid, pair[0], pair[1], '.');
    }
    for &(x, y) in &cells {
        grid[y][x] = 'o';
    }

    let (first, last) = match (series.points.first(), series.points.last()) {
        (Some(a), Some(b)) => (a.date.to_string(), b.date.to_string()),
        _ => ("-".to_string(), "-".to_string()),
    };

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: {} | dates=[{first}, {last}] | y=[{y_min:.2}, {y_max:.2}] | predicted={}\n",
        series.title,
        format_price(series.reference)
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

fn date_range(series: &TrendSeries) -> Option<(f64, f64)> {
    let first = day_number(series.points.first()?.date);
    let last = day_number(series.points.last()?.date);
    if last > first {
        Some((first, last))
    } else {
        // Single day: center it.
        Some((first - 1.0, first + 1.0))
    }
}

fn y_range(series: &TrendSeries) -> (f64, f64) {
    let mut min_y = series.reference;
    let mut max_y = series.reference;
    for p in &series.points {
        min_y = min_y.min(p.price);
        max_y = max_y.max(p.price);
    }
    if max_y > min_y {
        (min_y, max_y)
    } else {
        (min_y - 1.0, max_y + 1.0)
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
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

/// Integer line drawing (Bresenham-ish). Only fills empty cells.
fn draw_line(grid: &mut [Vec<char>], from: (usize, usize), to: (usize, usize), ch: char) {
    let (mut x0, mut y0) = (from.0 as isize, from.1 as isize);
    let (x1, y1) = (to.0 as isize, to.1 as isize);

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
