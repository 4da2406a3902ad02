//! Brand aggregation: typed dataset -> per-brand summary statistics.
//!
//! The one hard-stop in the core lives here: without the three identity
//! columns the statistics are meaningless, so their absence aborts the
//! partition before any aggregate artifact is produced.

use anyhow::Result;
use log::{info, warn};

use crate::data::{TypedFrame, Value, column_meta};
use crate::error::PipelineError;
use crate::metadata::ColumnType;

/// Identity columns that must exist in the typed dataset.
pub const REQUIRED_FIELDS: &[&str] = &["marca", "modello", "versione"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reducer {
    Count,
    Mean,
    Min,
    Max,
}

/// One planned output column. The plan is declarative and filtered by
/// column presence, so the gold schema only ever contains aggregates whose
/// source column actually survived normalization.
struct AggSpec {
    output: &'static str,
    source: &'static str,
    reducer: Reducer,
}

fn build_plan(frame: &TypedFrame) -> Vec<AggSpec> {
    let mut plan = vec![AggSpec {
        output: "n_versioni",
        source: "versione",
        reducer: Reducer::Count,
    }];
    if frame.has_column("prezzo_eur") {
        plan.push(AggSpec {
            output: "prezzo_medio",
            source: "prezzo_eur",
            reducer: Reducer::Mean,
        });
        plan.push(AggSpec {
            output: "prezzo_min",
            source: "prezzo_eur",
            reducer: Reducer::Min,
        });
        plan.push(AggSpec {
            output: "prezzo_max",
            source: "prezzo_eur",
            reducer: Reducer::Max,
        });
    }
    if frame.has_column("capacita_batteria_kwh") {
        plan.push(AggSpec {
            output: "batteria_media_kwh",
            source: "capacita_batteria_kwh",
            reducer: Reducer::Mean,
        });
    }
    plan
}

struct BrandGroup {
    brand: String,
    row_indices: Vec<usize>,
}

pub fn aggregate(frame: &TypedFrame, ds: &str) -> Result<TypedFrame> {
    for &field in REQUIRED_FIELDS {
        if !frame.has_column(field) {
            return Err(PipelineError::MissingRequiredField {
                field,
                ds: ds.to_string(),
                available: frame.column_names(),
            }
            .into());
        }
    }

    let plan = build_plan(frame);
    let Some(marca_idx) = frame.column_index("marca") else {
        return Err(PipelineError::MissingRequiredField {
            field: "marca",
            ds: ds.to_string(),
            available: frame.column_names(),
        }
        .into());
    };

    // Group rows by exact brand value, preserving first-seen order. Rows
    // with a missing brand carry no usable identity and are dropped.
    let mut groups: Vec<BrandGroup> = Vec::new();
    let mut dropped = 0usize;
    for (row_idx, row) in frame.rows.iter().enumerate() {
        let brand = match row.get(marca_idx).and_then(|c| c.as_ref()) {
            Some(Value::Text(s)) if s.is_empty() => {
                dropped += 1;
                continue;
            }
            Some(value) => value.as_display(),
            None => {
                dropped += 1;
                continue;
            }
        };
        match groups.iter_mut().find(|g| g.brand == brand) {
            Some(group) => group.row_indices.push(row_idx),
            None => groups.push(BrandGroup {
                brand,
                row_indices: vec![row_idx],
            }),
        }
    }
    if dropped > 0 {
        warn!("Dropped {dropped} row(s) with missing brand for partition dt={ds}");
    }

    let mut columns = vec![column_meta("marca", ColumnType::Text)];
    for spec in &plan {
        columns.push(column_meta(spec.output, ColumnType::Float));
    }

    let mut rows: Vec<Vec<Option<Value>>> = Vec::with_capacity(groups.len());
    for group in &groups {
        let mut row: Vec<Option<Value>> = Vec::with_capacity(columns.len());
        row.push(Some(Value::Text(group.brand.clone())));
        for spec in &plan {
            row.push(reduce(frame, group, spec).map(Value::Number));
        }
        rows.push(row);
    }

    // Sort descending by the first non-count aggregate if the plan has one,
    // otherwise by the count. Stable, so equal keys keep first-seen order;
    // null keys sort last.
    let sort_column = if plan.len() > 1 { 2 } else { 1 };
    rows.sort_by(|a, b| {
        let ka = a[sort_column].as_ref().and_then(Value::as_number);
        let kb = b[sort_column].as_ref().and_then(Value::as_number);
        match (ka, kb) {
            (Some(x), Some(y)) => y.total_cmp(&x),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        }
    });

    info!(
        "Aggregated {} brand(s) across {} column(s) for partition dt={ds}",
        rows.len(),
        columns.len()
    );
    Ok(TypedFrame { columns, rows })
}

fn reduce(frame: &TypedFrame, group: &BrandGroup, spec: &AggSpec) -> Option<f64> {
    if spec.reducer == Reducer::Count {
        return Some(group.row_indices.len() as f64);
    }
    let source_idx = frame.column_index(spec.source)?;
    let values: Vec<f64> = group
        .row_indices
        .iter()
        .filter_map(|row_idx| {
            frame.rows[*row_idx]
                .get(source_idx)
                .and_then(|c| c.as_ref())
                .and_then(Value::as_number)
        })
        .collect();
    if values.is_empty() {
        return None;
    }
    match spec.reducer {
        Reducer::Count => unreachable!(),
        Reducer::Mean => Some(values.iter().sum::<f64>() / values.len() as f64),
        Reducer::Min => values.iter().copied().reduce(f64::min),
        Reducer::Max => values.iter().copied().reduce(f64::max),
    }
}
