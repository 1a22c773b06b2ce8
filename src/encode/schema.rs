//! Training-time column schema.

use std::collections::HashMap;

use serde::Deserialize;

use crate::domain::Field;

/// Separator between field and value in indicator column names (`admin1=Dodoma`).
pub const DEFAULT_PREFIX_SEP: &str = "=";

/// Ordered list of columns the model and scaler were fitted on.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSchema {
    columns: Vec<String>,
    prefix_sep: String,
    index: HashMap<String, usize>,
}

/// On-disk shape: a bare array, or an object that also names the separator.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawSchema {
    Columns(Vec<String>),
    Described {
        columns: Vec<String>,
        #[serde(default = "default_prefix_sep")]
        prefix_sep: String,
    },
}

fn default_prefix_sep() -> String {
    DEFAULT_PREFIX_SEP.to_string()
}

impl From<RawSchema> for ColumnSchema {
    fn from(value: RawSchema) -> Self {
        match value {
            RawSchema::Columns(columns) => ColumnSchema::new(columns, DEFAULT_PREFIX_SEP),
            RawSchema::Described {
                columns,
                prefix_sep,
            } => ColumnSchema::new(columns, prefix_sep),
        }
    }
}

impl ColumnSchema {
    /// Duplicate names keep their first position.
    pub fn new(columns: Vec<String>, prefix_sep: impl Into<String>) -> Self {
        let mut index = HashMap::with_capacity(columns.len());
        for (idx, name) in columns.iter().enumerate() {
            index.entry(name.clone()).or_insert(idx);
        }
        Self {
            columns,
            prefix_sep: prefix_sep.into(),
            index,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn prefix_sep(&self) -> &str {
        &self.prefix_sep
    }

    pub fn position(&self, column: &str) -> Option<usize> {
        self.index.get(column).copied()
    }

    /// Indicator column name for one categorical value.
    pub fn indicator(&self, field: Field, value: &str) -> String {
        format!("{}{}{}", field.column(), self.prefix_sep, value)
    }

    /// Whether any training column belongs to `field`'s one-hot group.
    pub fn has_group(&self, field: Field) -> bool {
        let prefix = format!("{}{}", field.column(), self.prefix_sep);
        self.columns.iter().any(|c| c.starts_with(&prefix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_array_uses_default_separator() {
        let raw: RawSchema = serde_json::from_str(r#"["year", "admin1=Dodoma"]"#).unwrap();
        let schema = ColumnSchema::from(raw);
        assert_eq!(schema.prefix_sep(), "=");
        assert_eq!(schema.position("admin1=Dodoma"), Some(1));
        assert_eq!(schema.indicator(Field::Admin1, "Arusha"), "admin1=Arusha");
    }

    #[test]
    fn described_schema_keeps_its_separator() {
        let raw: RawSchema =
            serde_json::from_str(r#"{"columns": ["year", "admin1_Dodoma"], "prefix_sep": "_"}"#)
                .unwrap();
        let schema = ColumnSchema::from(raw);
        assert_eq!(schema.indicator(Field::Admin1, "Dodoma"), "admin1_Dodoma");
        assert!(schema.has_group(Field::Admin1));
        assert!(!schema.has_group(Field::Market));
    }
}
