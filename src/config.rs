//! Runtime settings: command-line flags first, then `.env`/environment, then defaults.

use std::path::PathBuf;

use crate::cli::CommonArgs;

pub const DEFAULT_DATA_FILE: &str = "Export.csv";
pub const DEFAULT_BACKGROUND: &str = "back.jfif";
pub const DEFAULT_CURRENCY: &str = "TZS";

pub const ENV_DATA: &str = "FOOD_PRICE_DATA";
pub const ENV_ARTIFACT_DIR: &str = "FOOD_PRICE_ARTIFACT_DIR";
pub const ENV_BACKGROUND: &str = "FOOD_PRICE_BACKGROUND";
pub const ENV_CURRENCY: &str = "FOOD_PRICE_CURRENCY";
pub const ENV_LOG: &str = "FOOD_PRICE_LOG";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub data_path: PathBuf,
    /// Searched before the built-in artifact locations.
    pub artifact_dirs: Vec<PathBuf>,
    pub background: PathBuf,
    pub currency: String,
    /// Log destination while the TUI owns the terminal; no file when unset.
    pub log_file: Option<PathBuf>,
}

impl Settings {
    /// Resolve settings from CLI flags and the process environment (`.env` included).
    pub fn from_env(args: &CommonArgs) -> Self {
        dotenvy::dotenv().ok();
        Self::resolve(args, |key| std::env::var(key).ok())
    }

    /// Resolve with an explicit environment lookup.
    pub fn resolve(args: &CommonArgs, env: impl Fn(&str) -> Option<String>) -> Self {
        let env = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let artifact_dirs = if args.artifact_dirs.is_empty() {
            env(ENV_ARTIFACT_DIR)
                .map(|v| std::env::split_paths(&v).collect())
                .unwrap_or_default()
        } else {
            args.artifact_dirs.clone()
        };

        Self {
            data_path: args
                .data
                .clone()
                .or_else(|| env(ENV_DATA).map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE)),
            artifact_dirs,
            background: args
                .background
                .clone()
                .or_else(|| env(ENV_BACKGROUND).map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_BACKGROUND)),
            currency: args
                .currency
                .clone()
                .or_else(|| env(ENV_CURRENCY))
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            log_file: args
                .log_file
                .clone()
                .or_else(|| env(ENV_LOG).map(PathBuf::from)),
        }
    }
}
