//! Feature scalers.
//!
//! Serialized as JSON tagged by `kind`:
//!
//! ```text
//! {"kind": "standard", "mean": [..], "scale": [..]}
//! {"kind": "min_max", "min": [..], "scale": [..]}
//! {"kind": "identity"}
//! ```

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use super::{FeatureScaler, ModelError, ensure_width};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Scaler {
    /// `(x - mean) / scale`
    Standard { mean: Vec<f64>, scale: Vec<f64> },
    /// `x * scale + min`
    MinMax { min: Vec<f64>, scale: Vec<f64> },
    Identity,
}

impl Scaler {
    /// Number of features the scaler was fitted on (`None` for identity).
    pub fn width(&self) -> Option<usize> {
        match self {
            Scaler::Standard { mean, .. } => Some(mean.len()),
            Scaler::MinMax { min, .. } => Some(min.len()),
            Scaler::Identity => None,
        }
    }
}

impl FeatureScaler for Scaler {
    fn transform(&self, row: &DVector<f64>) -> Result<DVector<f64>, ModelError> {
        let out = match self {
            Scaler::Standard { mean, scale } => {
                if mean.len() != scale.len() {
                    return Err(ModelError::Other(format!(
                        "standard scaler has {} means but {} scales",
                        mean.len(),
                        scale.len()
                    )));
                }
                ensure_width("scaler", mean.len(), row)?;
                let mean = DVector::from_column_slice(mean);
                // Constant training columns are stored with scale 0; leave them unscaled.
                let scale = DVector::from_iterator(
                    scale.len(),
                    scale.iter().map(|&s| if s == 0.0 { 1.0 } else { s }),
                );
                (row - mean).component_div(&scale)
            }
            Scaler::MinMax { min, scale } => {
                if min.len() != scale.len() {
                    return Err(ModelError::Other(format!(
                        "min-max scaler has {} offsets but {} scales",
                        min.len(),
                        scale.len()
                    )));
                }
                ensure_width("scaler", min.len(), row)?;
                row.component_mul(&DVector::from_column_slice(scale)) + DVector::from_column_slice(min)
            }
            Scaler::Identity => row.clone(),
        };

        if out.iter().any(|v| !v.is_finite()) {
            return Err(ModelError::NonFinite { stage: "scaler" });
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_scaler_centers_and_scales() {
        let scaler = Scaler::Standard {
            mean: vec![10.0, 0.5, 3.0],
            scale: vec![2.0, 0.5, 0.0],
        };
        let row = DVector::from_column_slice(&[14.0, 1.0, 3.0]);
        let out = scaler.transform(&row).unwrap();
        assert!((out[0] - 2.0).abs() < 1e-12);
        assert!((out[1] - 1.0).abs() < 1e-12);
        assert!(out[2].abs() < 1e-12);
    }

    #[test]
    fn min_max_scaler_maps_into_range() {
        let scaler = Scaler::MinMax {
            min: vec![-0.2],
            scale: vec![0.1],
        };
        let out = scaler.transform(&DVector::from_column_slice(&[7.0])).unwrap();
        assert!((out[0] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn width_mismatch_is_an_error() {
        let scaler = Scaler::Standard {
            mean: vec![0.0, 0.0],
            scale: vec![1.0, 1.0],
        };
        let err = scaler.transform(&DVector::from_column_slice(&[1.0])).unwrap_err();
        assert_eq!(
            err,
            ModelError::ShapeMismatch {
                stage: "scaler",
                expected: 2,
                got: 1
            }
        );
    }

    #[test]
    fn parses_tagged_json() {
        let scaler: Scaler = serde_json::from_str(r#"{"kind":"identity"}"#).unwrap();
        assert_eq!(scaler, Scaler::Identity);

        let scaler: Scaler =
            serde_json::from_str(r#"{"kind":"standard","mean":[1.0],"scale":[2.0]}"#).unwrap();
        assert_eq!(scaler.width(), Some(1));
    }
}
