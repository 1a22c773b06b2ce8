//! Historical trend for the selected commodity/region/market.
//!
//! Purely presentational: rows are filtered and sorted into a new series; the
//! dataset is never mutated. Drawing goes through [`TrendSink`] so the same
//! logic feeds the terminal plot, the SVG chart and the TUI widget.

use crate::domain::{Field, PriceRecord, Selection, TrendPoint, TrendSeries};
use crate::error::PredictError;

pub const NO_HISTORY_MESSAGE: &str = "No historical data available for selected filters.";

/// Something that can draw a trend series.
pub trait TrendSink {
    fn draw(&mut self, series: &TrendSeries) -> Result<(), String>;
}

/// Keeps the last series for a front-end that draws later (the TUI).
#[derive(Debug, Default)]
pub struct CaptureSink {
    pub series: Option<TrendSeries>,
}

impl TrendSink for CaptureSink {
    fn draw(&mut self, series: &TrendSeries) -> Result<(), String> {
        self.series = Some(series.clone());
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendOutcome {
    Rendered { points: usize },
    NoHistory,
}

/// Matching rows with a date and a price, oldest first.
pub fn history(records: &[PriceRecord], selection: &Selection) -> Vec<TrendPoint> {
    let mut points: Vec<TrendPoint> = records
        .iter()
        .filter(|r| selection.matches_history(r))
        .filter_map(|r| {
            Some(TrendPoint {
                date: r.date?,
                price: r.price?,
            })
        })
        .collect();
    // Stable: same-day rows keep file order.
    points.sort_by_key(|p| p.date);
    points
}

/// Chart title: `<commodity> - <market>, <region>`.
pub fn trend_title(selection: &Selection) -> String {
    format!(
        "{} - {}, {}",
        selection.get(Field::Commodity),
        selection.get(Field::Market),
        selection.get(Field::Admin1)
    )
}

/// Build the series, or `None` when there is nothing to plot.
pub fn trend_series(
    records: &[PriceRecord],
    selection: &Selection,
    predicted: f64,
    currency: &str,
) -> Option<TrendSeries> {
    let points = history(records, selection);
    if points.is_empty() {
        return None;
    }
    Some(TrendSeries {
        title: trend_title(selection),
        y_label: format!("Price ({currency})"),
        points,
        reference: predicted,
    })
}

/// Filter, sort and hand the series to `sink`. The sink is not called when
/// there is no history.
pub fn render_trend(
    records: &[PriceRecord],
    selection: &Selection,
    predicted: f64,
    currency: &str,
    sink: &mut dyn TrendSink,
) -> Result<TrendOutcome, PredictError> {
    let Some(series) = trend_series(records, selection, predicted, currency) else {
        tracing::info!(title = %trend_title(selection), "no historical data for selection");
        return Ok(TrendOutcome::NoHistory);
    };

    sink.draw(&series).map_err(PredictError::Chart)?;
    Ok(TrendOutcome::Rendered {
        points: series.points.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crate::domain::Categories;

    #[derive(Default)]
    struct CountingSink {
        calls: usize,
        last: Option<TrendSeries>,
    }

    impl TrendSink for CountingSink {
        fn draw(&mut self, series: &TrendSeries) -> Result<(), String> {
            self.calls += 1;
            self.last = Some(series.clone());
            Ok(())
        }
    }

    fn row(line: usize, market: &str, date: Option<(i32, u32, u32)>, price: f64) -> PriceRecord {
        let mut categories = Categories::default();
        categories.set(Field::Commodity, Some("Maize".to_string()));
        categories.set(Field::Admin1, Some("Dodoma".to_string()));
        categories.set(Field::Market, Some(market.to_string()));
        PriceRecord {
            line,
            categories,
            price: Some(price),
            date: date.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
        }
    }

    fn selection() -> Selection {
        Selection::default()
            .with(Field::Commodity, "Maize")
            .with(Field::Admin1, "Dodoma")
            .with(Field::Market, "Dodoma Central")
    }

    #[test]
    fn no_matching_rows_never_reaches_the_sink() {
        let records = vec![row(2, "Kibaigwa", Some((2023, 6, 1)), 900.0)];
        let mut sink = CountingSink::default();
        let outcome = render_trend(&records, &selection(), 1200.0, "TZS", &mut sink).unwrap();
        assert_eq!(outcome, TrendOutcome::NoHistory);
        assert_eq!(sink.calls, 0);
    }

    #[test]
    fn series_is_sorted_by_date_regardless_of_row_order() {
        let records = vec![
            row(2, "Dodoma Central", Some((2023, 9, 1)), 1300.0),
            row(3, "Dodoma Central", Some((2023, 1, 1)), 900.0),
            row(4, "Dodoma Central", None, 5000.0),
            row(5, "Dodoma Central", Some((2023, 5, 1)), 1100.0),
        ];
        let mut sink = CountingSink::default();
        let outcome = render_trend(&records, &selection(), 1200.0, "TZS", &mut sink).unwrap();
        assert_eq!(outcome, TrendOutcome::Rendered { points: 3 });
        assert_eq!(sink.calls, 1);

        let series = sink.last.unwrap();
        let prices: Vec<f64> = series.points.iter().map(|p| p.price).collect();
        assert_eq!(prices, vec![900.0, 1100.0, 1300.0]);
        assert_eq!(series.title, "Maize - Dodoma Central, Dodoma");
        assert_eq!(series.y_label, "Price (TZS)");
        assert_eq!(series.reference, 1200.0);
    }

    #[test]
    fn undated_only_history_counts_as_missing() {
        let records = vec![row(2, "Dodoma Central", None, 1000.0)];
        let mut sink = CountingSink::default();
        let outcome = render_trend(&records, &selection(), 1.0, "TZS", &mut sink).unwrap();
        assert_eq!(outcome, TrendOutcome::NoHistory);
        assert_eq!(sink.calls, 0);
    }

    #[test]
    fn sink_failure_is_a_chart_error() {
        struct FailingSink;
        impl TrendSink for FailingSink {
            fn draw(&mut self, _: &TrendSeries) -> Result<(), String> {
                Err("backend closed".to_string())
            }
        }

        let records = vec![row(2, "Dodoma Central", Some((2023, 6, 1)), 1000.0)];
        let err = render_trend(&records, &selection(), 1.0, "TZS", &mut FailingSink).unwrap_err();
        assert_eq!(err, PredictError::Chart("backend closed".to_string()));
    }
}
