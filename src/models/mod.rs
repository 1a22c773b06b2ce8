//! Model and scaler artifacts behind narrow traits.
//!
//! The pipeline only ever sees [`FeatureScaler::transform`] and
//! [`PriceModel::predict`]; the concrete, serde-loadable implementations live in
//! `scaler` and `regressor`.

use nalgebra::DVector;
use thiserror::Error;

pub mod regressor;
pub mod scaler;

pub use regressor::*;
pub use scaler::*;

/// Failure inside scaling or inference.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("{stage} expects {expected} features, got {got}")]
    ShapeMismatch {
        stage: &'static str,
        expected: usize,
        got: usize,
    },
    #[error("{stage} produced a non-finite value")]
    NonFinite { stage: &'static str },
    #[error("{0}")]
    Other(String),
}

/// Feature scaling fitted at training time.
pub trait FeatureScaler: Send + Sync {
    fn transform(&self, row: &DVector<f64>) -> Result<DVector<f64>, ModelError>;
}

/// A regression model returning one price per input row.
pub trait PriceModel: Send + Sync {
    fn predict(&self, row: &DVector<f64>) -> Result<f64, ModelError>;
}

pub(crate) fn ensure_width(
    stage: &'static str,
    expected: usize,
    row: &DVector<f64>,
) -> Result<(), ModelError> {
    if row.len() != expected {
        return Err(ModelError::ShapeMismatch {
            stage,
            expected,
            got: row.len(),
        });
    }
    Ok(())
}
