//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and resolves settings
//! - sets up logging
//! - loads artifacts + dataset once into `AppState`
//! - dispatches to the TUI or the one-shot commands

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, PredictArgs};
use crate::config::Settings;
use crate::data::OptionCatalog;
use crate::domain::{Field, TrendSeries};
use crate::error::AppError;
use crate::io::Dataset;
use crate::plot::{AsciiSink, SvgSink};
use crate::report::TrendSink;

pub mod pipeline;
pub mod state;

pub use state::AppState;

pub const APP_TITLE: &str = "Tanzania Food Price Prediction System";

/// Entry point for the `fp` binary.
pub fn run() -> Result<(), AppError> {
    // We want `fp` and `fp --data x.csv` to behave like `fp tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);
    let settings = Settings::from_env(&cli.common);

    // The TUI owns the terminal: log to a file only when one was configured.
    match (&cli.command, &settings.log_file) {
        (Command::Tui, Some(path)) => init_tracing(LogTarget::File(path))?,
        (Command::Tui, None) => {}
        _ => init_tracing(LogTarget::Stderr)?,
    }

    // Listing options needs only the dataset, not the model artifacts.
    if let Command::Options(args) = &cli.command {
        let dataset = crate::io::load_dataset(&settings.data_path)?;
        print!("{}", options_report(&dataset, args.field));
        return Ok(());
    }

    let state = AppState::load(settings)?;

    match cli.command {
        Command::Tui => crate::tui::run(&state),
        Command::Predict(args) => handle_predict(&state, &args),
        Command::Options(args) => {
            print!("{}", options_report(&state.dataset, args.field));
            Ok(())
        }
    }
}

enum LogTarget<'a> {
    Stderr,
    File(&'a Path),
}

fn init_tracing(target: LogTarget<'_>) -> Result<(), AppError> {
    let filter = |default: &str| {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
    };

    let result = match target {
        LogTarget::Stderr => tracing_subscriber::fmt()
            .with_env_filter(filter("warn"))
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init(),
        LogTarget::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| {
                    AppError::new(4, format!("Failed to open log file '{}': {e}", path.display()))
                })?;
            tracing_subscriber::fmt()
                .with_env_filter(filter("info"))
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .try_init()
        }
    };

    result.map_err(|e| AppError::new(4, format!("Failed to initialize logging: {e}")))
}

fn handle_predict(state: &AppState, args: &PredictArgs) -> Result<(), AppError> {
    let selection = args.selection(state.catalog.default_selection());
    for (field, value) in selection.iter() {
        if !state.catalog.contains(field, value) {
            tracing::warn!(field = field.column(), %value, "value not present in the dataset");
        }
    }

    let mut sink = CliSinks {
        ascii: (!args.no_plot).then(|| AsciiSink::new(args.width, args.height)),
        svg: args.html.as_ref().map(|_| SvgSink::default()),
    };
    let outcome = pipeline::run_prediction(state, &selection, args.date_input(), &mut sink)?;

    println!("{}", outcome.message);
    for notice in &outcome.notices {
        println!("{notice}");
    }

    if let Some(plot) = sink.ascii.and_then(|a| a.output) {
        println!();
        println!("{plot}");
    }

    if let Some(path) = &args.html {
        let chart_svg = sink.svg.and_then(|s| s.output);
        let page = crate::io::HtmlPage {
            title: APP_TITLE,
            message: &outcome.message,
            notices: &outcome.notices,
            chart_svg: chart_svg.as_deref(),
            background: crate::io::load_background(&state.settings.background),
        };
        crate::io::write_html(path, &page)?;
    }

    Ok(())
}

/// Fans one trend out to the terminal plot and/or the HTML chart.
struct CliSinks {
    ascii: Option<AsciiSink>,
    svg: Option<SvgSink>,
}

impl TrendSink for CliSinks {
    fn draw(&mut self, series: &TrendSeries) -> Result<(), String> {
        if let Some(ascii) = &mut self.ascii {
            ascii.draw(series)?;
        }
        if let Some(svg) = &mut self.svg {
            svg.draw(series)?;
        }
        Ok(())
    }
}

/// Load summary followed by the option catalog (all fields, or one).
fn options_report(dataset: &Dataset, field: Option<Field>) -> String {
    let catalog = OptionCatalog::from_records(&dataset.records);
    let mut out = crate::report::format_load_summary(&dataset.summary);
    out.push_str(&crate::report::format_catalog(&catalog, field));
    out
}

/// Rewrite argv so `fp` defaults to `fp tui`.
///
/// Rules:
/// - `fp`                      -> `fp tui`
/// - `fp --data x.csv ...`     -> `fp tui --data x.csv ...`
/// - `fp --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "tui" | "predict" | "options");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}
