//! Plotters SVG chart for the HTML page.

use chrono::{Datelike, NaiveDate};
use plotters::coord::Shift;
use plotters::prelude::*;

use crate::domain::TrendSeries;
use crate::report::TrendSink;

pub const DEFAULT_SVG_SIZE: (u32, u32) = (1000, 400);

/// Renders into an SVG string kept for the caller to embed.
#[derive(Debug, Clone)]
pub struct SvgSink {
    pub size: (u32, u32),
    pub output: Option<String>,
}

impl Default for SvgSink {
    fn default() -> Self {
        Self {
            size: DEFAULT_SVG_SIZE,
            output: None,
        }
    }
}

impl TrendSink for SvgSink {
    fn draw(&mut self, series: &TrendSeries) -> Result<(), String> {
        self.output = Some(render_svg_trend(series, self.size)?);
        Ok(())
    }
}

/// Render the trend as a standalone `<svg>` document.
pub fn render_svg_trend(series: &TrendSeries, size: (u32, u32)) -> Result<String, String> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
        draw_trend(&root, series).map_err(|e| format!("Failed to draw SVG chart: {e}"))?;
        root.present()
            .map_err(|e| format!("Failed to finish SVG chart: {e}"))?;
    }
    Ok(svg)
}

fn draw_trend(
    root: &DrawingArea<SVGBackend<'_>, Shift>,
    series: &TrendSeries,
) -> Result<(), DrawingAreaErrorKind<std::io::Error>> {
    root.fill(&WHITE)?;

    let points: Vec<(f64, f64)> = series
        .points
        .iter()
        .map(|p| (day_number(p.date), p.price))
        .collect();
    let (x_bounds, y_bounds) = chart_bounds(&points, series.reference);

    let mut chart = ChartBuilder::on(root)
        .caption(&series.title, ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(x_bounds[0]..x_bounds[1], y_bounds[0]..y_bounds[1])?;

    chart
        .configure_mesh()
        .x_desc("Date")
        .y_desc(&series.y_label)
        .x_labels(6)
        .y_labels(6)
        .x_label_formatter(&|v| fmt_day(*v))
        .y_label_formatter(&|v| format!("{v:.0}"))
        .draw()?;

    chart
        .draw_series(LineSeries::new(points.iter().copied(), &BLUE))?
        .label("Historical Price")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLUE));
    chart.draw_series(
        points
            .iter()
            .map(|&(x, y)| Circle::new((x, y), 3, BLUE.filled())),
    )?;

    chart
        .draw_series(LineSeries::new(
            [(x_bounds[0], series.reference), (x_bounds[1], series.reference)],
            &RED,
        ))?
        .label("Predicted Price")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &RED));

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    Ok(())
}

pub(crate) fn day_number(date: NaiveDate) -> f64 {
    f64::from(date.num_days_from_ce())
}

pub(crate) fn fmt_day(v: f64) -> String {
    NaiveDate::from_num_days_from_ce_opt(v.round() as i32)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// X/Y bounds covering history and the reference line, padded by 5%.
pub(crate) fn chart_bounds(points: &[(f64, f64)], reference: f64) -> ([f64; 2], [f64; 2]) {
    let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut y_min, mut y_max) = (reference, reference);
    for &(x, y) in points {
        x_min = x_min.min(x);
        x_max = x_max.max(x);
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }

    if !x_min.is_finite() || !x_max.is_finite() {
        x_min = 0.0;
        x_max = 1.0;
    } else if x_max <= x_min {
        // Single day: show a month either side.
        x_min -= 30.0;
        x_max += 30.0;
    }

    if !y_min.is_finite() || !y_max.is_finite() || y_max <= y_min {
        y_min -= 1.0;
        y_max += 1.0;
    }
    if !y_min.is_finite() || !y_max.is_finite() {
        y_min = 0.0;
        y_max = 1.0;
    }

    let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);
    ([x_min, x_max], [y_min - pad, y_max + pad])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TrendPoint;

    #[test]
    fn single_day_bounds_are_widened() {
        let d = day_number(NaiveDate::from_ymd_opt(2023, 6, 1).unwrap());
        let (x, y) = chart_bounds(&[(d, 1000.0)], 1200.0);
        assert_eq!(x, [d - 30.0, d + 30.0]);
        assert!((y[0] - 990.0).abs() < 1e-9);
        assert!((y[1] - 1210.0).abs() < 1e-9);
    }

    #[test]
    fn day_numbers_round_trip_to_labels() {
        let d = NaiveDate::from_ymd_opt(2023, 6, 1).unwrap();
        assert_eq!(fmt_day(day_number(d)), "2023-06-01");
    }

    #[test]
    fn renders_svg_document() {
        let series = TrendSeries {
            title: "Maize - Dodoma Central, Dodoma".to_string(),
            y_label: "Price (TZS)".to_string(),
            points: vec![TrendPoint {
                date: NaiveDate::from_ymd_opt(2023, 6, 1).unwrap(),
                price: 1000.0,
            }],
            reference: 1200.0,
        };
        let mut sink = SvgSink::default();
        sink.draw(&series).unwrap();
        let svg = sink.output.unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Predicted Price"));
    }
}
