//! Raw source selection and reading.
//!
//! The raw export arrives either as delimited text or as a spreadsheet.
//! Both converge on the same in-memory `RawFrame` so the capture stage and
//! everything downstream are format-agnostic.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use calamine::{Data, Reader, open_workbook_auto};
use encoding_rs::Encoding;
use log::info;

use crate::data::{RawCell, RawFrame};
use crate::error::PipelineError;
use crate::io_utils;

const RAW_CANDIDATES: &[&str] = &["auto_dati.csv", "auto_dati.xlsx"];

/// Picks the raw input file under `data_root/raw`, preferring CSV.
pub fn pick_raw_source(data_root: &Path) -> Result<PathBuf> {
    let raw_dir = data_root.join("raw");
    for candidate in RAW_CANDIDATES {
        let path = raw_dir.join(candidate);
        if path.is_file() {
            return Ok(path);
        }
    }
    Err(PipelineError::MissingRawSource { dir: raw_dir }.into())
}

/// Reads a raw source into a frame, dispatching on the file extension.
/// Anything other than `.csv`/`.tsv`/`.xlsx` is a fatal format error.
pub fn read_raw_source(
    path: &Path,
    delimiter: Option<u8>,
    encoding: &'static Encoding,
) -> Result<RawFrame> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("csv") | Some("tsv") => {
            let delimiter = io_utils::resolve_input_delimiter(path, delimiter);
            let frame = io_utils::read_raw_frame(path, delimiter, encoding)
                .with_context(|| format!("Reading raw CSV source {path:?}"))?;
            info!(
                "Read {} row(s), {} column(s) from CSV source {:?}",
                frame.rows.len(),
                frame.columns.len(),
                path
            );
            Ok(frame)
        }
        Some("xlsx") => {
            let frame = read_xlsx_frame(path)
                .with_context(|| format!("Reading raw spreadsheet source {path:?}"))?;
            info!(
                "Read {} row(s), {} column(s) from spreadsheet source {:?}",
                frame.rows.len(),
                frame.columns.len(),
                path
            );
            Ok(frame)
        }
        _ => Err(PipelineError::UnsupportedFormat {
            path: path.to_path_buf(),
        }
        .into()),
    }
}

fn read_xlsx_frame(path: &Path) -> Result<RawFrame> {
    let mut workbook =
        open_workbook_auto(path).with_context(|| format!("Opening workbook {path:?}"))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| anyhow!("Workbook {path:?} has no worksheets"))?
        .with_context(|| format!("Reading first worksheet of {path:?}"))?;

    let mut rows = range.rows();
    let header_row = rows
        .next()
        .ok_or_else(|| anyhow!("Worksheet in {path:?} is empty"))?;
    let columns: Vec<String> = header_row.iter().map(|cell| cell.to_string()).collect();

    let mut frame = RawFrame::new(columns);
    for row in rows {
        let mut cells: Vec<RawCell> = row.iter().map(convert_cell).collect();
        cells.resize(frame.columns.len(), RawCell::Empty);
        cells.truncate(frame.columns.len());
        frame.rows.push(cells);
    }
    Ok(frame)
}

fn convert_cell(cell: &Data) -> RawCell {
    match cell {
        Data::Empty => RawCell::Empty,
        Data::Float(f) => RawCell::Number(*f),
        Data::Int(i) => RawCell::Number(*i as f64),
        Data::String(s) if s.is_empty() => RawCell::Empty,
        Data::String(s) => RawCell::Text(s.clone()),
        Data::Error(_) => RawCell::Empty,
        other => RawCell::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::UTF_8;

    #[test]
    fn pick_raw_source_reports_missing_directory() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = pick_raw_source(dir.path()).expect_err("no raw file");
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::MissingRawSource { .. })
        ));
    }

    #[test]
    fn pick_raw_source_prefers_csv() {
        let dir = tempfile::tempdir().expect("temp dir");
        let raw_dir = dir.path().join("raw");
        std::fs::create_dir_all(&raw_dir).expect("mkdir");
        std::fs::write(raw_dir.join("auto_dati.xlsx"), b"stub").expect("write");
        std::fs::write(raw_dir.join("auto_dati.csv"), "marca\nFiat\n").expect("write");
        let picked = pick_raw_source(dir.path()).expect("picked");
        assert!(picked.ends_with("auto_dati.csv"));
    }

    #[test]
    fn read_raw_source_rejects_unknown_extensions() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("auto_dati.parquet");
        std::fs::write(&path, b"stub").expect("write");
        let err = read_raw_source(&path, None, UTF_8).expect_err("unsupported");
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn convert_cell_maps_spreadsheet_values() {
        assert_eq!(convert_cell(&Data::Empty), RawCell::Empty);
        assert_eq!(convert_cell(&Data::Float(33500.0)), RawCell::Number(33500.0));
        assert_eq!(convert_cell(&Data::Int(5)), RawCell::Number(5.0));
        assert_eq!(
            convert_cell(&Data::String("nd".into())),
            RawCell::Text("nd".into())
        );
        assert_eq!(convert_cell(&Data::String(String::new())), RawCell::Empty);
        assert_eq!(
            convert_cell(&Data::Bool(true)),
            RawCell::Text("true".into())
        );
    }
}
