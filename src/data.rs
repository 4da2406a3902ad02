use std::borrow::Cow;
use std::fmt;

use crate::metadata::{ColumnMeta, ColumnType};

/// A cell as captured from the raw source, before any parsing.
///
/// CSV fields arrive as text (or empty), spreadsheet cells arrive already
/// typed. Keeping the distinction lets the value parsers stringify numbers
/// deterministically instead of trusting whatever the source formatter did.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Text(String),
    Number(f64),
    Empty,
}

impl RawCell {
    pub fn from_field(field: &str) -> Self {
        if field.is_empty() {
            RawCell::Empty
        } else {
            RawCell::Text(field.to_string())
        }
    }

    /// Stringifies the cell, or `None` for an absent value.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            RawCell::Text(s) => Some(Cow::Borrowed(s.as_str())),
            RawCell::Number(n) => Some(Cow::Owned(format_float(*n))),
            RawCell::Empty => None,
        }
    }
}

/// A typed cell after normalization. Missing or unparseable data is
/// represented by `Option::None` around this, never by a sentinel.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Number(f64),
}

impl Value {
    pub fn as_display(&self) -> String {
        match self {
            Value::Text(s) => s.clone(),
            Value::Number(n) => format_float(*n),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Text(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

/// Integral floats render without a fractional part so CSV round-trips
/// stay byte-identical across reruns.
pub fn format_float(value: f64) -> String {
    if value.fract() == 0.0 && value.is_finite() {
        (value as i64).to_string()
    } else {
        value.to_string()
    }
}

/// The raw record set for one partition: ordered source labels plus rows of
/// untyped cells. Immutable once captured.
#[derive(Debug, Clone)]
pub struct RawFrame {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<RawCell>>,
}

impl RawFrame {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

/// The typed dataset for one partition: column metadata (name + datatype)
/// plus rows of nullable typed cells.
#[derive(Debug, Clone)]
pub struct TypedFrame {
    pub columns: Vec<ColumnMeta>,
    pub rows: Vec<Vec<Option<Value>>>,
}

impl TypedFrame {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Renders rows as display strings, empty string for nulls. Used by the
    /// CSV writers and the preview table.
    pub fn display_rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| cell.as_ref().map(Value::as_display).unwrap_or_default())
                    .collect()
            })
            .collect()
    }
}

/// Convenience constructor used by the transform and aggregate stages.
pub fn column_meta(name: impl Into<String>, datatype: ColumnType) -> ColumnMeta {
    ColumnMeta {
        name: name.into(),
        datatype,
    }
}
