//! Formatted terminal output.
//!
//! We keep formatting code in one place so output changes stay localized and
//! the pipeline stays free of presentation details.

use crate::data::OptionCatalog;
use crate::domain::{Field, UnknownCategory};
use crate::io::ingest::LoadSummary;

/// Format with thousands separators and two decimals (`1200` -> `1,200.00`).
pub fn format_price(v: f64) -> String {
    if !v.is_finite() {
        return format!("{v}");
    }

    let fixed = format!("{:.2}", v.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if v < 0.0 { "-" } else { "" };
    format!("{sign}{grouped}.{frac_part}")
}

/// `Predicted Market Price: 1,200.00 TZS`
pub fn prediction_message(predicted: f64, currency: &str) -> String {
    format!("Predicted Market Price: {} {currency}", format_price(predicted))
}

/// Notice shown when selections were unknown to the model.
pub fn unknown_category_notice(unknown: &[UnknownCategory]) -> Option<String> {
    if unknown.is_empty() {
        return None;
    }
    let parts: Vec<String> = unknown
        .iter()
        .map(|u| format!("{}={}", u.field.display_name(), u.value))
        .collect();
    Some(format!(
        "Not seen in training (encoded as absent): {}",
        parts.join(", ")
    ))
}

/// Option catalog listing, for all fields or one.
pub fn format_catalog(catalog: &OptionCatalog, field: Option<Field>) -> String {
    let fields: Vec<Field> = match field {
        Some(f) => vec![f],
        None => Field::ALL.to_vec(),
    };

    let mut out = String::new();
    for f in fields {
        let options = catalog.options(f);
        out.push_str(&format!("{} ({}, {} options):\n", f.display_name(), f.column(), options.len()));
        for value in options {
            out.push_str(&format!("  {value}\n"));
        }
    }
    out
}

/// One-paragraph dataset summary.
pub fn format_load_summary(summary: &LoadSummary) -> String {
    let range = match (summary.date_min, summary.date_max) {
        (Some(a), Some(b)) => format!("{a} .. {b}"),
        _ => "-".to_string(),
    };
    format!(
        "Rows: read={} kept={} skipped={} tag_rows={} undated={} | dates: {range}\n",
        summary.rows_read, summary.rows_kept, summary.rows_skipped, summary.tag_rows, summary.undated
    )
}
