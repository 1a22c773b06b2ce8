//! Regression models.
//!
//! Serialized as JSON tagged by `kind`:
//!
//! ```text
//! {"kind": "linear", "coef": [..], "intercept": 12.5}
//! {"kind": "constant", "value": 1200.0}
//! ```

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use super::{ModelError, PriceModel, ensure_width};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Regressor {
    /// `coef · x + intercept`
    Linear { coef: Vec<f64>, intercept: f64 },
    /// Always predicts `value` (mean/dummy regressor).
    Constant { value: f64 },
}

impl Regressor {
    /// Number of features the model was fitted on (`None` for constant).
    pub fn width(&self) -> Option<usize> {
        match self {
            Regressor::Linear { coef, .. } => Some(coef.len()),
            Regressor::Constant { .. } => None,
        }
    }
}

impl PriceModel for Regressor {
    fn predict(&self, row: &DVector<f64>) -> Result<f64, ModelError> {
        let y = match self {
            Regressor::Linear { coef, intercept } => {
                ensure_width("model", coef.len(), row)?;
                DVector::from_column_slice(coef).dot(row) + intercept
            }
            Regressor::Constant { value } => *value,
        };

        if !y.is_finite() {
            return Err(ModelError::NonFinite { stage: "model" });
        }
        Ok(y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_model_is_dot_plus_intercept() {
        let model = Regressor::Linear {
            coef: vec![2.0, -1.0, 0.5],
            intercept: 100.0,
        };
        let y = model
            .predict(&DVector::from_column_slice(&[1.0, 4.0, 2.0]))
            .unwrap();
        assert!((y - 99.0).abs() < 1e-12);
    }

    #[test]
    fn constant_model_ignores_input() {
        let model = Regressor::Constant { value: 1200.0 };
        let y = model.predict(&DVector::from_column_slice(&[0.0; 7])).unwrap();
        assert_eq!(y, 1200.0);
    }

    #[test]
    fn linear_model_rejects_wrong_width() {
        let model = Regressor::Linear {
            coef: vec![1.0, 1.0],
            intercept: 0.0,
        };
        let err = model.predict(&DVector::from_column_slice(&[1.0, 2.0, 3.0])).unwrap_err();
        assert_eq!(err.to_string(), "model expects 2 features, got 3");
    }
}
