//! Command-line parsing for the food price dashboard.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the encoding/prediction code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{DateInput, Field, Selection};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "fp", version, about = "Market food price prediction dashboard")]
pub struct Cli {
    #[command(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Launch the interactive dashboard (default).
    Tui,
    /// Predict one price and print the historical trend.
    Predict(PredictArgs),
    /// List the selectable values of each categorical field.
    Options(OptionsArgs),
}

/// Where inputs live. Unset values fall back to the environment, then defaults.
#[derive(Debug, Clone, Default, Args)]
pub struct CommonArgs {
    /// Price dataset CSV [env: FOOD_PRICE_DATA] [default: Export.csv].
    #[arg(long, global = true, value_name = "CSV")]
    pub data: Option<PathBuf>,

    /// Extra directory searched for model artifacts (repeatable)
    /// [env: FOOD_PRICE_ARTIFACT_DIR].
    #[arg(long = "artifact-dir", global = true, value_name = "DIR")]
    pub artifact_dirs: Vec<PathBuf>,

    /// Background image for the HTML page [env: FOOD_PRICE_BACKGROUND] [default: back.jfif].
    #[arg(long, global = true, value_name = "IMAGE")]
    pub background: Option<PathBuf>,

    /// Currency label for prices [env: FOOD_PRICE_CURRENCY] [default: TZS].
    #[arg(long, global = true)]
    pub currency: Option<String>,

    /// Log file used while the dashboard is open [env: FOOD_PRICE_LOG]; no log when unset.
    #[arg(long, global = true, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

/// Options for a one-shot prediction.
///
/// Omitted categorical values default to the first option of that field.
#[derive(Debug, Clone, Parser)]
pub struct PredictArgs {
    /// Region (admin1).
    #[arg(long)]
    pub region: Option<String>,

    /// District (admin2).
    #[arg(long)]
    pub district: Option<String>,

    #[arg(long)]
    pub market: Option<String>,

    #[arg(long)]
    pub category: Option<String>,

    #[arg(long)]
    pub commodity: Option<String>,

    #[arg(long)]
    pub unit: Option<String>,

    #[arg(long = "price-flag")]
    pub price_flag: Option<String>,

    #[arg(long = "price-type")]
    pub price_type: Option<String>,

    #[arg(long, default_value_t = 2024, value_parser = clap::value_parser!(i32).range(2000..=2050))]
    pub year: i32,

    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=12))]
    pub month: u32,

    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=31))]
    pub day: u32,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Also write a standalone HTML page (prediction + SVG chart).
    #[arg(long, value_name = "HTML")]
    pub html: Option<PathBuf>,
}

impl PredictArgs {
    /// Overlay the given flags on `defaults`.
    pub fn selection(&self, defaults: Selection) -> Selection {
        let given = [
            (Field::Admin1, &self.region),
            (Field::Admin2, &self.district),
            (Field::Market, &self.market),
            (Field::Category, &self.category),
            (Field::Commodity, &self.commodity),
            (Field::Unit, &self.unit),
            (Field::PriceFlag, &self.price_flag),
            (Field::PriceType, &self.price_type),
        ];

        let mut selection = defaults;
        for (field, value) in given {
            if let Some(value) = value {
                selection.set(field, value.trim());
            }
        }
        selection
    }

    pub fn date_input(&self) -> DateInput {
        DateInput::new(self.year, self.month, self.day)
    }
}

/// Options for listing the catalog.
#[derive(Debug, Clone, Parser)]
pub struct OptionsArgs {
    /// Only list this field.
    #[arg(long, value_enum)]
    pub field: Option<Field>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predict_flags_override_defaults() {
        let cli = Cli::parse_from([
            "fp",
            "predict",
            "--commodity",
            "Maize",
            "--price-type",
            "Retail",
            "--month",
            "2",
            "--day",
            "30",
        ]);
        let Command::Predict(args) = cli.command else {
            panic!("expected predict");
        };

        let defaults = Selection::default()
            .with(Field::Commodity, "Beans")
            .with(Field::Market, "Arusha");
        let selection = args.selection(defaults);
        assert_eq!(selection.get(Field::Commodity), "Maize");
        assert_eq!(selection.get(Field::PriceType), "Retail");
        assert_eq!(selection.get(Field::Market), "Arusha");
        // Range-valid components are accepted even if the date is impossible.
        assert_eq!(args.date_input(), DateInput::new(2024, 2, 30));
    }

    #[test]
    fn out_of_range_components_are_rejected() {
        assert!(Cli::try_parse_from(["fp", "predict", "--month", "13"]).is_err());
        assert!(Cli::try_parse_from(["fp", "predict", "--year", "1999"]).is_err());
    }

    #[test]
    fn common_flags_are_global() {
        let cli = Cli::parse_from(["fp", "options", "--data", "x.csv", "--field", "price-flag"]);
        assert_eq!(cli.common.data, Some(PathBuf::from("x.csv")));
        let Command::Options(args) = cli.command else {
            panic!("expected options");
        };
        assert_eq!(args.field, Some(Field::PriceFlag));
    }
}
