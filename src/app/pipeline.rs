//! Shared prediction pipeline used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! validate date -> encode -> scale + predict -> trend
//!
//! Any failure returns straight to the caller; nothing partial is produced.

use nalgebra::DVector;

use crate::app::state::AppState;
use crate::domain::{DateInput, PredictionRequest, Selection, UnknownCategory};
use crate::encode::encode;
use crate::error::PredictError;
use crate::io::Artifacts;
use crate::report::{
    NO_HISTORY_MESSAGE, TrendOutcome, TrendSink, prediction_message, render_trend,
    unknown_category_notice,
};

/// A successful model call.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub request: PredictionRequest,
    pub price: f64,
    pub unknown: Vec<UnknownCategory>,
}

/// All outputs of one submission.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionOutcome {
    pub prediction: Prediction,
    /// `Predicted Market Price: ...`
    pub message: String,
    /// Non-blocking notices (unknown categories, missing history).
    pub notices: Vec<String>,
    pub trend: TrendOutcome,
}

/// Encode, scale and predict one request.
pub fn predict(artifacts: &Artifacts, request: &PredictionRequest) -> Result<Prediction, PredictError> {
    let encoded = encode(request, &artifacts.schema);
    let row = DVector::from_vec(encoded.vector.values);

    let scaled = artifacts.scaler.transform(&row)?;
    let price = artifacts.model.predict(&scaled)?;

    tracing::info!(
        date = %request.date,
        week = request.week,
        price,
        unknown = encoded.unknown.len(),
        "prediction"
    );

    Ok(Prediction {
        request: request.clone(),
        price,
        unknown: encoded.unknown,
    })
}

/// Execute one submission end to end and hand the trend to `sink`.
pub fn run_prediction(
    state: &AppState,
    selection: &Selection,
    date: DateInput,
    sink: &mut dyn TrendSink,
) -> Result<PredictionOutcome, PredictError> {
    let request = PredictionRequest::new(selection.clone(), date)?;
    let prediction = predict(&state.artifacts, &request)?;

    let currency = &state.settings.currency;
    let trend = render_trend(
        &state.dataset.records,
        selection,
        prediction.price,
        currency,
        sink,
    )?;

    let mut notices = Vec::new();
    if let Some(notice) = unknown_category_notice(&prediction.unknown) {
        notices.push(notice);
    }
    if trend == TrendOutcome::NoHistory {
        notices.push(NO_HISTORY_MESSAGE.to_string());
    }

    Ok(PredictionOutcome {
        message: prediction_message(prediction.price, currency),
        prediction,
        notices,
        trend,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::NaiveDate;

    use crate::cli::CommonArgs;
    use crate::config::Settings;
    use crate::domain::{Categories, Field, PriceRecord, TrendSeries};
    use crate::encode::{ColumnSchema, encoded_columns};
    use crate::io::Dataset;
    use crate::models::{FeatureScaler, ModelError, PriceModel, Regressor, Scaler};
    use crate::report::CaptureSink;

    struct CountingModel {
        calls: Arc<AtomicUsize>,
        value: f64,
    }

    impl PriceModel for CountingModel {
        fn predict(&self, _: &DVector<f64>) -> Result<f64, ModelError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.value)
        }
    }

    fn settings() -> Settings {
        Settings::resolve(&CommonArgs::default(), |_| None)
    }

    fn selection() -> Selection {
        Selection::default()
            .with(Field::Admin1, "Dodoma")
            .with(Field::Admin2, "Dodoma Urban")
            .with(Field::Market, "Dodoma Central")
            .with(Field::Category, "cereals and tubers")
            .with(Field::Commodity, "Maize")
            .with(Field::Unit, "KG")
            .with(Field::PriceFlag, "actual")
            .with(Field::PriceType, "Wholesale")
    }

    fn dataset() -> Dataset {
        let mut categories = Categories::default();
        for (field, value) in selection().iter() {
            categories.set(field, Some(value.to_string()));
        }
        let records = vec![PriceRecord {
            line: 2,
            categories,
            price: Some(1000.0),
            date: NaiveDate::from_ymd_opt(2023, 6, 1),
        }];
        Dataset {
            records,
            ..Dataset::default()
        }
    }

    fn schema_for(selection: &Selection) -> ColumnSchema {
        let request = PredictionRequest::new(selection.clone(), DateInput::default()).unwrap();
        let probe = ColumnSchema::new(Vec::new(), "=");
        ColumnSchema::new(encoded_columns(&request, &probe), "=")
    }

    fn state(model: Box<dyn PriceModel>, scaler: Box<dyn FeatureScaler>) -> AppState {
        let artifacts = Artifacts {
            model,
            scaler,
            schema: schema_for(&selection()),
        };
        AppState::from_parts(settings(), artifacts, dataset())
    }

    #[test]
    fn end_to_end_constant_model() {
        let state = state(
            Box::new(Regressor::Constant { value: 1200.0 }),
            Box::new(Scaler::Identity),
        );
        let mut sink = CaptureSink::default();
        let outcome =
            run_prediction(&state, &selection(), DateInput::new(2024, 5, 17), &mut sink).unwrap();

        assert_eq!(outcome.message, "Predicted Market Price: 1,200.00 TZS");
        assert_eq!(outcome.trend, TrendOutcome::Rendered { points: 1 });
        assert!(outcome.notices.is_empty());

        let series: TrendSeries = sink.series.unwrap();
        assert_eq!(series.points.len(), 1);
        assert_eq!(series.points[0].date, NaiveDate::from_ymd_opt(2023, 6, 1).unwrap());
        assert_eq!(series.points[0].price, 1000.0);
        assert_eq!(series.reference, 1200.0);
    }

    #[test]
    fn invalid_date_never_calls_the_model() {
        let calls = Arc::new(AtomicUsize::new(0));
        let state = state(
            Box::new(CountingModel {
                calls: Arc::clone(&calls),
                value: 1.0,
            }),
            Box::new(Scaler::Identity),
        );
        let mut sink = CaptureSink::default();
        let err = run_prediction(&state, &selection(), DateInput::new(2024, 2, 30), &mut sink)
            .unwrap_err();

        assert!(matches!(err, PredictError::InvalidDate { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(sink.series.is_none());
    }

    #[test]
    fn scaler_shape_mismatch_is_a_prediction_error() {
        let state = state(
            Box::new(Regressor::Constant { value: 1.0 }),
            Box::new(Scaler::Standard {
                mean: vec![0.0; 3],
                scale: vec![1.0; 3],
            }),
        );
        let mut sink = CaptureSink::default();
        let err = run_prediction(&state, &selection(), DateInput::default(), &mut sink).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Prediction error: scaler expects 3 features, got 12"
        );
        assert!(sink.series.is_none());
    }

    #[test]
    fn unknown_market_and_missing_history_are_notices() {
        let state = state(
            Box::new(Regressor::Constant { value: 800.0 }),
            Box::new(Scaler::Identity),
        );
        let other = selection().with(Field::Market, "Kibaigwa");
        let mut sink = CaptureSink::default();
        let outcome = run_prediction(&state, &other, DateInput::default(), &mut sink).unwrap();

        assert_eq!(outcome.trend, TrendOutcome::NoHistory);
        assert_eq!(
            outcome.prediction.unknown,
            vec![UnknownCategory {
                field: Field::Market,
                value: "Kibaigwa".to_string()
            }]
        );
        assert_eq!(outcome.notices.len(), 2);
        assert_eq!(outcome.notices[1], NO_HISTORY_MESSAGE);
        assert!(sink.series.is_none());
    }

    #[test]
    fn linear_model_sees_schema_ordered_features() {
        let schema = schema_for(&selection());
        // Weight only the `week` column.
        let coef: Vec<f64> = schema
            .columns()
            .iter()
            .map(|c| if c == "week" { 10.0 } else { 0.0 })
            .collect();
        let state = state(
            Box::new(Regressor::Linear {
                coef,
                intercept: 5.0,
            }),
            Box::new(Scaler::Identity),
        );
        let request = PredictionRequest::new(selection(), DateInput::new(2024, 3, 15)).unwrap();
        let prediction = predict(&state.artifacts, &request).unwrap();
        assert_eq!(prediction.price, 115.0);
    }
}
