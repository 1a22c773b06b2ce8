//! `food-price` library crate.
//!
//! The binary (`fp`) is a thin wrapper around this library so that:
//!
//! - the form -> features -> prediction -> trend flow is testable without a terminal
//! - model/scaler artifacts stay behind narrow traits and can be swapped
//! - front-ends (TUI, one-shot CLI, HTML page) share one pipeline

pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod encode;
pub mod error;
pub mod io;
pub mod models;
pub mod plot;
pub mod report;
pub mod tui;
