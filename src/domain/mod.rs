//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - categorical attributes (`Field`, `Categories`, `Selection`)
//! - dataset rows (`PriceRecord`)
//! - request/encoding types (`DateInput`, `PredictionRequest`, `EncodedFeatureVector`)
//! - trend chart data (`TrendSeries`)

pub mod types;

pub use types::*;
