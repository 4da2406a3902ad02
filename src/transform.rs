//! Schema normalizer: raw capture -> typed dataset.
//!
//! Applies, in order: label snake-casing, synonym resolution, price
//! derivation, whitelist numeric parsing, and compound-field expansion.
//! This stage never fails on data content; unparseable cells become null
//! and unrecognized columns pass through as text.

use anyhow::Result;
use log::{debug, info};

use crate::data::{RawCell, RawFrame, TypedFrame, Value, column_meta};
use crate::metadata::ColumnType;
use crate::parse;
use crate::resolve;
use crate::text;

/// Plain numeric attributes parsed in place when present.
pub const NUMERIC_FIELDS: &[&str] = &[
    "lunghezza",
    "larghezza",
    "altezza",
    "cilindri",
    "cilindrata_cm3",
    "peso_kg",
    "autonomia_km",
    "capacita_batteria_kwh",
    "velocita_max_kmh",
];

/// Compound fields expanded into `_min`/`_max` pairs.
pub const PAIRED_FIELDS: &[(&str, &str, &str)] = &[
    ("posti", "posti_min", "posti_max"),
    ("bagagliaio", "bagagliaio_min", "bagagliaio_max"),
];

/// Power fields in `"cv/kw"` form, expanded with a per-variant prefix.
pub const POWER_FIELDS: &[(&str, &str)] = &[
    ("potenza_cv_kw", ""),
    ("potenza_termico_cv_kw", "termico_"),
    ("potenza_omologata_cv_kw", "omologata_"),
];

pub fn normalize(frame: &RawFrame) -> Result<TypedFrame> {
    let mut labels: Vec<String> = frame.columns.iter().map(|c| text::snake_label(c)).collect();

    let mapping = resolve::build_column_mapping(&labels)?;
    for (idx, canonical) in &mapping {
        debug!("Renaming column '{}' -> '{}'", labels[*idx], canonical);
        labels[*idx] = canonical.to_string();
    }
    if !mapping.is_empty() {
        info!("Resolved {} synonym column(s)", mapping.len());
    }

    let numeric_indices: Vec<usize> = NUMERIC_FIELDS
        .iter()
        .filter_map(|field| labels.iter().position(|l| l == field))
        .collect();
    let price_index = labels.iter().position(|l| l == "prezzo");
    let paired: Vec<(usize, &str, &str)> = PAIRED_FIELDS
        .iter()
        .filter_map(|(src, min, max)| {
            labels.iter().position(|l| l == src).map(|i| (i, *min, *max))
        })
        .collect();
    let powers: Vec<(usize, &str)> = POWER_FIELDS
        .iter()
        .filter_map(|(src, prefix)| labels.iter().position(|l| l == src).map(|i| (i, *prefix)))
        .collect();

    let mut columns = Vec::with_capacity(labels.len() + 1 + 2 * (paired.len() + powers.len()));
    for (idx, label) in labels.iter().enumerate() {
        let datatype = if numeric_indices.contains(&idx) {
            ColumnType::Float
        } else {
            ColumnType::Text
        };
        columns.push(column_meta(label.clone(), datatype));
    }
    if price_index.is_some() {
        columns.push(column_meta("prezzo_eur", ColumnType::Float));
    }
    for (_, min, max) in &paired {
        columns.push(column_meta(*min, ColumnType::Float));
        columns.push(column_meta(*max, ColumnType::Float));
    }
    for (_, prefix) in &powers {
        columns.push(column_meta(format!("{prefix}potenza_cv"), ColumnType::Float));
        columns.push(column_meta(format!("{prefix}potenza_kw"), ColumnType::Float));
    }

    let mut rows = Vec::with_capacity(frame.rows.len());
    for raw_row in &frame.rows {
        let mut row: Vec<Option<Value>> = Vec::with_capacity(columns.len());
        for (idx, _) in labels.iter().enumerate() {
            let cell = raw_row.get(idx).unwrap_or(&RawCell::Empty);
            if numeric_indices.contains(&idx) {
                row.push(parse::parse_number(cell).map(Value::Number));
            } else {
                row.push(cell.as_text().map(|t| Value::Text(t.into_owned())));
            }
        }
        if let Some(idx) = price_index {
            let cell = raw_row.get(idx).unwrap_or(&RawCell::Empty);
            row.push(parse::parse_price(cell).map(Value::Number));
        }
        for (idx, _, _) in &paired {
            let cell = raw_row.get(*idx).unwrap_or(&RawCell::Empty);
            let (min, max) = parse::parse_pair_slash(cell);
            row.push(min.map(Value::Number));
            row.push(max.map(Value::Number));
        }
        for (idx, _) in &powers {
            let cell = raw_row.get(*idx).unwrap_or(&RawCell::Empty);
            let (cv, kw) = parse::parse_pair_slash(cell);
            row.push(cv.map(Value::Number));
            row.push(kw.map(Value::Number));
        }
        rows.push(row);
    }

    info!(
        "Normalized {} row(s) into {} column(s)",
        rows.len(),
        columns.len()
    );
    Ok(TypedFrame { columns, rows })
}
