//! Locating and loading the model, scaler and column-schema artifacts.
//!
//! Each artifact is looked up by logical file name over a fixed search path;
//! the first existing candidate wins. A missing artifact is a configuration
//! error: no partially-loaded state is returned.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use crate::encode::{ColumnSchema, RawSchema};
use crate::error::AppError;
use crate::models::{FeatureScaler, PriceModel, Regressor, Scaler};

pub const MODEL_FILE: &str = "finalized_model.json";
pub const SCALER_FILE: &str = "scaler.json";
pub const COLUMNS_FILE: &str = "model_columns.json";

/// Subdirectories searched after the bare name.
const SEARCH_SUBDIRS: [&str; 3] = ["models", "artifacts", "food"];

/// Loaded, immutable model artifacts.
pub struct Artifacts {
    pub model: Box<dyn PriceModel>,
    pub scaler: Box<dyn FeatureScaler>,
    pub schema: ColumnSchema,
}

impl std::fmt::Debug for Artifacts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Artifacts")
            .field("schema_len", &self.schema.len())
            .finish_non_exhaustive()
    }
}

/// Ordered candidate paths for one artifact.
///
/// Order: each configured directory, the bare name, then the fixed subdirectories.
pub fn candidate_paths(name: &str, extra_dirs: &[PathBuf]) -> Vec<PathBuf> {
    let mut out: Vec<PathBuf> = extra_dirs.iter().map(|d| d.join(name)).collect();
    out.push(PathBuf::from(name));
    out.extend(SEARCH_SUBDIRS.iter().map(|d| Path::new(d).join(name)));
    out
}

/// First existing candidate for `name`.
pub fn locate(name: &str, extra_dirs: &[PathBuf]) -> Result<PathBuf, AppError> {
    let candidates = candidate_paths(name, extra_dirs);
    if let Some(found) = candidates.iter().find(|p| p.is_file()) {
        tracing::debug!(artifact = name, path = %found.display(), "resolved artifact");
        return Ok(found.clone());
    }

    let tried: Vec<String> = candidates.iter().map(|p| p.display().to_string()).collect();
    Err(AppError::config(format!(
        "Error loading model files: `{name}` not found (tried: {})",
        tried.join(", ")
    )))
}

/// Locate and deserialize one JSON artifact.
pub fn load_json<T: DeserializeOwned>(name: &str, extra_dirs: &[PathBuf]) -> Result<T, AppError> {
    let path = locate(name, extra_dirs)?;
    read_json(&path)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::config(format!("Error loading model files: '{}': {e}", path.display()))
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| {
        AppError::config(format!(
            "Error loading model files: '{}' is not a valid artifact: {e}",
            path.display()
        ))
    })
}

/// Load model, scaler and schema.
pub fn load_artifacts(extra_dirs: &[PathBuf]) -> Result<Artifacts, AppError> {
    let model: Regressor = load_json(MODEL_FILE, extra_dirs)?;
    let scaler: Scaler = load_json(SCALER_FILE, extra_dirs)?;
    let schema: ColumnSchema = load_json::<RawSchema>(COLUMNS_FILE, extra_dirs)?.into();

    // Width mismatches surface as prediction errors; flag them early in the log.
    for (artifact, width) in [("model", model.width()), ("scaler", scaler.width())] {
        if let Some(width) = width {
            if width != schema.len() {
                tracing::warn!(artifact, width, schema_len = schema.len(), "artifact width differs from column schema");
            }
        }
    }

    tracing::info!(columns = schema.len(), prefix_sep = schema.prefix_sep(), "loaded model artifacts");

    Ok(Artifacts {
        model: Box::new(model),
        scaler: Box::new(scaler),
        schema,
    })
}
