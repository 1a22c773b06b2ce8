//! Trend chart renderers: terminal ASCII and SVG.

pub mod ascii;
pub mod svg;

pub use ascii::*;
pub use svg::*;
