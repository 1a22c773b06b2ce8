//! Single-row one-hot encoding and schema alignment.
//!
//! Encoding happens in two explicit steps:
//! 1. `sparse_features`: numeric features plus one indicator per categorical
//!    field, named `field<sep>value`.
//! 2. `align`: dense vector in schema order; absent columns are 0 and encoded
//!    columns unknown to the schema are dropped (and reported).

use crate::domain::{EncodedFeatureVector, Field, PredictionRequest, UnknownCategory};
use crate::encode::ColumnSchema;

/// One (feature name, value) pair produced by encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseFeature {
    pub name: String,
    pub value: f64,
    /// Set for indicator columns.
    pub field: Option<Field>,
}

/// Result of encoding one request against the schema.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedRow {
    pub vector: EncodedFeatureVector,
    /// Selections whose field has a one-hot group in the schema, but not this value.
    pub unknown: Vec<UnknownCategory>,
    /// Numeric features absent from the schema.
    pub dropped_numeric: Vec<String>,
}

/// Encode the request as sparse features, numeric columns first.
pub fn sparse_features(request: &PredictionRequest, schema: &ColumnSchema) -> Vec<SparseFeature> {
    let mut out: Vec<SparseFeature> = request
        .numeric_features()
        .into_iter()
        .map(|(name, value)| SparseFeature {
            name: name.to_string(),
            value,
            field: None,
        })
        .collect();

    for (field, value) in request.selection.iter() {
        out.push(SparseFeature {
            name: schema.indicator(field, value),
            value: 1.0,
            field: Some(field),
        });
    }
    out
}

/// Names of the columns encoding produces for `request`.
pub fn encoded_columns(request: &PredictionRequest, schema: &ColumnSchema) -> Vec<String> {
    sparse_features(request, schema)
        .into_iter()
        .map(|f| f.name)
        .collect()
}

/// Map sparse features onto the schema, defaulting absent columns to zero.
pub fn align(schema: &ColumnSchema, features: &[SparseFeature], request: &PredictionRequest) -> EncodedRow {
    let mut values = vec![0.0; schema.len()];
    let mut unknown = Vec::new();
    let mut dropped_numeric = Vec::new();

    for feature in features {
        match schema.position(&feature.name) {
            Some(idx) => values[idx] = feature.value,
            None => match feature.field {
                Some(field) if schema.has_group(field) => {
                    let value = request.selection.get(field).to_string();
                    tracing::warn!(
                        field = field.column(),
                        %value,
                        column = %feature.name,
                        "category not seen in training; its one-hot group is all zero"
                    );
                    unknown.push(UnknownCategory { field, value });
                }
                Some(field) => {
                    tracing::debug!(field = field.column(), "field is not a model feature; dropped");
                }
                None => {
                    tracing::debug!(column = %feature.name, "numeric feature not in training schema; dropped");
                    dropped_numeric.push(feature.name.clone());
                }
            },
        }
    }

    EncodedRow {
        vector: EncodedFeatureVector {
            columns: schema.columns().to_vec(),
            values,
        },
        unknown,
        dropped_numeric,
    }
}

/// Encode a request and align it to the schema in one step.
pub fn encode(request: &PredictionRequest, schema: &ColumnSchema) -> EncodedRow {
    let features = sparse_features(request, schema);
    align(schema, &features, request)
}
