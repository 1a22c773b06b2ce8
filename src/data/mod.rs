//! Data derived from the loaded dataset.

pub mod catalog;

pub use catalog::*;
