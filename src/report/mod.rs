//! Reporting utilities: prediction messages, catalog listings and the trend series.

pub mod format;
pub mod trend;

pub use format::*;
pub use trend::*;
