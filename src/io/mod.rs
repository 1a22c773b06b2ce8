//! Input/output helpers.
//!
//! - CSV ingest + validation (`ingest`)
//! - model/scaler/schema artifacts (`artifacts`)
//! - optional HTML page export (`export`)

pub mod artifacts;
pub mod export;
pub mod ingest;

pub use artifacts::*;
pub use export::*;
pub use ingest::*;
