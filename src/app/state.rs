//! Application state built once at startup and borrowed by every request.

use crate::config::Settings;
use crate::data::OptionCatalog;
use crate::error::AppError;
use crate::io::{Artifacts, Dataset, load_artifacts, load_dataset};

/// Loaded artifacts, dataset and derived catalog. Read-only after construction.
#[derive(Debug)]
pub struct AppState {
    pub settings: Settings,
    pub artifacts: Artifacts,
    pub dataset: Dataset,
    pub catalog: OptionCatalog,
}

impl AppState {
    /// Load everything. Any failure is a fatal configuration error.
    pub fn load(settings: Settings) -> Result<Self, AppError> {
        let artifacts = load_artifacts(&settings.artifact_dirs)?;
        let dataset = load_dataset(&settings.data_path)?;
        Ok(Self::from_parts(settings, artifacts, dataset))
    }

    pub fn from_parts(settings: Settings, artifacts: Artifacts, dataset: Dataset) -> Self {
        let catalog = OptionCatalog::from_records(&dataset.records);
        let empty = catalog.empty_fields();
        if !empty.is_empty() {
            let names: Vec<&str> = empty.iter().map(|f| f.column()).collect();
            tracing::warn!(fields = ?names, "dataset has no values for some selectors");
        }
        Self {
            settings,
            artifacts,
            dataset,
            catalog,
        }
    }
}
