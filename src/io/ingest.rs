//! CSV ingest for the market price dataset.
//!
//! This module is responsible for turning a price export CSV into a list of
//! `PriceRecord`s that the catalog, the form and the trend chart can share.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear error + exit code 2)
//! - **Lenient rows**: malformed rows are skipped and reported, never fatal
//! - **Lenient cells**: bad dates/prices become missing, the row is kept
//! - **Separation of concerns**: no encoding or plotting here

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use csv::StringRecord;

use crate::domain::{Categories, DATE_COLUMN, Field, PRICE_COLUMN, PriceRecord, REQUIRED_COLUMNS};
use crate::error::AppError;

/// A row-level problem encountered during ingest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Counters describing what the loader kept and skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub rows_read: usize,
    pub rows_kept: usize,
    pub rows_skipped: usize,
    /// HXL hashtag rows (`#date,#adm1+name,...`) that follow some exports' header.
    pub tag_rows: usize,
    pub undated: usize,
    pub date_min: Option<NaiveDate>,
    pub date_max: Option<NaiveDate>,
}

/// The loaded dataset, read-only after load.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub records: Vec<PriceRecord>,
    pub summary: LoadSummary,
    pub row_errors: Vec<RowError>,
}

/// Load the dataset from a CSV file.
pub fn load_dataset(path: &Path) -> Result<Dataset, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::config(format!("Error loading CSV file '{}': {e}", path.display()))
    })?;
    let dataset = read_dataset(file)?;

    tracing::info!(
        path = %path.display(),
        rows_read = dataset.summary.rows_read,
        rows_kept = dataset.summary.rows_kept,
        rows_skipped = dataset.summary.rows_skipped,
        undated = dataset.summary.undated,
        "loaded price dataset"
    );
    Ok(dataset)
}

/// Read the dataset from any CSV source.
pub fn read_dataset<R: Read>(source: R) -> Result<Dataset, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader
        .headers()
        .map_err(|e| AppError::config(format!("Failed to read CSV headers: {e}")))?
        .clone();

    let header_map = build_header_map(&headers);
    ensure_required_columns_exist(&header_map)?;

    let columns = ColumnIndex::resolve(&header_map)?;

    let mut records = Vec::new();
    let mut row_errors = Vec::new();
    let mut summary = LoadSummary::default();

    for (idx, result) in reader.records().enumerate() {
        // +2 because:
        // - records() starts at line 1 after headers
        // - CSV is 1-based line numbers
        let line = idx + 2;
        summary.rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                summary.rows_skipped += 1;
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        if record.len() != headers.len() {
            summary.rows_skipped += 1;
            tracing::debug!(line, fields = record.len(), expected = headers.len(), "skipping malformed row");
            row_errors.push(RowError {
                line,
                message: format!(
                    "Expected {} fields, saw {}",
                    headers.len(),
                    record.len()
                ),
            });
            continue;
        }

        if is_tag_row(&record) {
            summary.tag_rows += 1;
            continue;
        }

        let row = parse_row(&record, &columns, line);
        match row.date {
            Some(d) => {
                summary.date_min = Some(summary.date_min.map_or(d, |m| m.min(d)));
                summary.date_max = Some(summary.date_max.map_or(d, |m| m.max(d)));
            }
            None => summary.undated += 1,
        }
        records.push(row);
    }

    summary.rows_kept = records.len();
    if summary.rows_skipped > 0 {
        tracing::warn!(skipped = summary.rows_skipped, "skipped malformed CSV rows");
    }

    Ok(Dataset {
        records,
        summary,
        row_errors,
    })
}

/// Column positions for every field we read.
struct ColumnIndex {
    categories: [usize; 8],
    price: usize,
    date: usize,
}

impl ColumnIndex {
    fn resolve(header_map: &HashMap<String, usize>) -> Result<Self, AppError> {
        let lookup = |name: &str| {
            header_map
                .get(name)
                .copied()
                .ok_or_else(|| AppError::config(format!("Missing required column: `{name}`")))
        };

        let mut categories = [0usize; 8];
        for field in Field::ALL {
            categories[field.index()] = lookup(field.column())?;
        }

        Ok(Self {
            categories,
            price: lookup(PRICE_COLUMN)?,
            date: lookup(DATE_COLUMN)?,
        })
    }
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    let mut map = HashMap::new();
    for (idx, name) in headers.iter().enumerate() {
        // First occurrence wins for duplicated headers.
        map.entry(normalize_header_name(name)).or_insert(idx);
    }
    map
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header. If we don't strip it, schema validation will incorrectly
    // report missing columns.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn ensure_required_columns_exist(header_map: &HashMap<String, usize>) -> Result<(), AppError> {
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|c| !header_map.contains_key(*c))
        .collect();

    if missing.is_empty() {
        return Ok(());
    }
    Err(AppError::config(format!(
        "Missing columns in CSV: [{}]",
        missing.join(", ")
    )))
}

fn is_tag_row(record: &StringRecord) -> bool {
    let mut non_empty = record.iter().filter(|s| !s.is_empty()).peekable();
    non_empty.peek().is_some() && non_empty.all(|s| s.starts_with('#'))
}

fn parse_row(record: &StringRecord, columns: &ColumnIndex, line: usize) -> PriceRecord {
    let mut categories = Categories::default();
    for field in Field::ALL {
        let value = get_optional(record, columns.categories[field.index()]).map(str::to_string);
        categories.set(field, value);
    }

    PriceRecord {
        line,
        categories,
        price: parse_opt_f64(get_optional(record, columns.price)),
        date: get_optional(record, columns.date).and_then(parse_date),
    }
}

fn get_optional(record: &StringRecord, idx: usize) -> Option<&str> {
    record.get(idx).map(str::trim).filter(|s| !s.is_empty())
}

/// Parse a date cell; unparseable values become `None`.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    // ISO first; the slash/dash variants show up in spreadsheet round-trips.
    // Month-first before day-first, matching the usual dataframe default.
    const DATE_FMTS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%m-%Y"];
    const DATETIME_FMTS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

    for fmt in DATE_FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    for fmt in DATETIME_FMTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    None
}

fn parse_opt_f64(s: Option<&str>) -> Option<f64> {
    let s = s?;
    let v = s.replace(',', "").parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}
