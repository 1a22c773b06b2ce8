//! Shared domain types.
//!
//! These types are intentionally kept lightweight so they can be:
//!
//! - filled from the CSV loader and from the input form alike
//! - passed by reference through the prediction pipeline
//! - rendered by any front-end (TUI, CLI, HTML)

use chrono::{Datelike, NaiveDate};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::PredictError;

/// Categorical market attributes shared by dataset rows and prediction requests.
///
/// Declaration order is the column order used for one-hot encoding.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Admin1,
    Admin2,
    Market,
    Category,
    Commodity,
    Unit,
    PriceFlag,
    PriceType,
}

impl Field {
    pub const ALL: [Field; 8] = [
        Field::Admin1,
        Field::Admin2,
        Field::Market,
        Field::Category,
        Field::Commodity,
        Field::Unit,
        Field::PriceFlag,
        Field::PriceType,
    ];

    /// CSV column name (and one-hot prefix).
    pub fn column(self) -> &'static str {
        match self {
            Field::Admin1 => "admin1",
            Field::Admin2 => "admin2",
            Field::Market => "market",
            Field::Category => "category",
            Field::Commodity => "commodity",
            Field::Unit => "unit",
            Field::PriceFlag => "priceflag",
            Field::PriceType => "pricetype",
        }
    }

    /// Label shown next to the selector.
    pub fn display_name(self) -> &'static str {
        match self {
            Field::Admin1 => "Region",
            Field::Admin2 => "District",
            Field::Market => "Market",
            Field::Category => "Category",
            Field::Commodity => "Commodity",
            Field::Unit => "Unit",
            Field::PriceFlag => "Price Flag",
            Field::PriceType => "Price Type",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

pub const PRICE_COLUMN: &str = "price";
pub const DATE_COLUMN: &str = "date";

/// Columns that must be present in the dataset header.
pub const REQUIRED_COLUMNS: [&str; 10] = [
    "admin1",
    "admin2",
    "market",
    "category",
    "commodity",
    "unit",
    "priceflag",
    "pricetype",
    PRICE_COLUMN,
    DATE_COLUMN,
];

/// One optional value per categorical [`Field`] (a dataset row may have gaps).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Categories {
    values: [Option<String>; 8],
}

impl Categories {
    pub fn get(&self, field: Field) -> Option<&str> {
        self.values[field.index()].as_deref()
    }

    pub fn set(&mut self, field: Field, value: Option<String>) {
        self.values[field.index()] = value;
    }
}

/// One row of the price dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceRecord {
    /// 1-based line number in the source file.
    pub line: usize,
    pub categories: Categories,
    /// `None` when the cell was empty or not a finite number.
    pub price: Option<f64>,
    /// `None` when the cell could not be parsed as a date.
    pub date: Option<NaiveDate>,
}

impl PriceRecord {
    pub fn get(&self, field: Field) -> Option<&str> {
        self.categories.get(field)
    }
}

/// The concrete value chosen for every categorical field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    values: [String; 8],
}

impl Selection {
    pub fn get(&self, field: Field) -> &str {
        &self.values[field.index()]
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        self.values[field.index()] = value.into();
    }

    pub fn with(mut self, field: Field, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        Field::ALL.into_iter().map(|f| (f, self.get(f)))
    }

    /// Whether a dataset row carries the same commodity, region and market.
    pub fn matches_history(&self, record: &PriceRecord) -> bool {
        [Field::Commodity, Field::Admin1, Field::Market]
            .into_iter()
            .all(|f| record.get(f) == Some(self.get(f)))
    }
}

pub const YEAR_RANGE: (i32, i32) = (2000, 2050);
pub const MONTH_RANGE: (u32, u32) = (1, 12);
pub const DAY_RANGE: (u32, u32) = (1, 31);

/// Raw year/month/day as entered; not yet known to be a calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateInput {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl Default for DateInput {
    fn default() -> Self {
        Self {
            year: 2024,
            month: 1,
            day: 1,
        }
    }
}

impl DateInput {
    pub fn new(year: i32, month: u32, day: u32) -> Self {
        Self { year, month, day }
    }

    /// Clamp each component to its widget range. Does not make the date valid.
    pub fn clamped(self) -> Self {
        Self {
            year: self.year.clamp(YEAR_RANGE.0, YEAR_RANGE.1),
            month: self.month.clamp(MONTH_RANGE.0, MONTH_RANGE.1),
            day: self.day.clamp(DAY_RANGE.0, DAY_RANGE.1),
        }
    }

    pub fn to_date(self) -> Result<NaiveDate, PredictError> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day).ok_or(PredictError::InvalidDate {
            year: self.year,
            month: self.month,
            day: self.day,
        })
    }
}

/// A validated prediction request. Built per submission, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRequest {
    pub selection: Selection,
    pub date: NaiveDate,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    /// ISO-8601 week number of `date`.
    pub week: u32,
}

impl PredictionRequest {
    pub fn new(selection: Selection, input: DateInput) -> Result<Self, PredictError> {
        let date = input.to_date()?;
        Ok(Self {
            selection,
            date,
            year: input.year,
            month: input.month,
            day: input.day,
            week: date.iso_week().week(),
        })
    }

    /// Numeric (non-categorical) features in encoding order.
    pub fn numeric_features(&self) -> [(&'static str, f64); 4] {
        [
            ("year", f64::from(self.year)),
            ("month", f64::from(self.month)),
            ("day", f64::from(self.day)),
            ("week", f64::from(self.week)),
        ]
    }
}

/// Dense model input, one value per training-time column, in schema order.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedFeatureVector {
    pub columns: Vec<String>,
    pub values: Vec<f64>,
}

impl EncodedFeatureVector {
    pub fn get(&self, column: &str) -> Option<f64> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|idx| self.values[idx])
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A selected category the model never saw; encoded as an all-zero group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCategory {
    pub field: Field,
    pub value: String,
}

/// One point of the historical trend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub price: f64,
}

/// Everything a chart needs: ordered history plus the predicted reference line.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendSeries {
    pub title: String,
    pub y_label: String,
    pub points: Vec<TrendPoint>,
    pub reference: f64,
}
