//! I/O utilities for CSV reading, writing, encoding, and delimiter
//! resolution. All CSV traffic in the pipeline flows through here: raw
//! source reads honor an optional delimiter and input encoding, while lake
//! artifacts are always UTF-8, comma-delimited, and fully quoted so reruns
//! of a partition are byte-for-byte identical.

use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::Path,
};

use anyhow::{Context, Result, anyhow};
use csv::QuoteStyle;
use encoding_rs::{Encoding, UTF_8};

use crate::data::{RawCell, RawFrame, TypedFrame, Value};
use crate::metadata::{ColumnType, SilverSchema};

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'"))
    } else {
        Ok(UTF_8)
    }
}

pub fn resolve_input_delimiter(path: &Path, provided: Option<u8>) -> u8 {
    provided.unwrap_or_else(|| match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => DEFAULT_TSV_DELIMITER,
        _ => DEFAULT_CSV_DELIMITER,
    })
}

pub fn open_csv_reader(path: &Path, delimiter: u8) -> Result<csv::Reader<BufReader<File>>> {
    let file = File::open(path).with_context(|| format!("Opening input file {path:?}"))?;
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(true)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(true);
    Ok(builder.from_reader(BufReader::new(file)))
}

pub fn create_csv_writer(path: &Path) -> Result<csv::Writer<BufWriter<File>>> {
    let file = File::create(path).with_context(|| format!("Creating output file {path:?}"))?;
    let mut builder = csv::WriterBuilder::new();
    builder
        .delimiter(DEFAULT_CSV_DELIMITER)
        .quote_style(QuoteStyle::Always)
        .double_quote(true);
    Ok(builder.from_writer(BufWriter::new(file)))
}

fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> Result<String> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        Err(anyhow!(
            "Failed to decode text with encoding {}",
            encoding.name()
        ))
    } else {
        Ok(text.into_owned())
    }
}

fn decode_record(record: &csv::ByteRecord, encoding: &'static Encoding) -> Result<Vec<String>> {
    record
        .iter()
        .map(|field| decode_bytes(field, encoding))
        .collect()
}

/// Reads a delimited file into a raw frame, decoding with `encoding`.
/// Short rows are padded with empty cells to the header width.
pub fn read_raw_frame(path: &Path, delimiter: u8, encoding: &'static Encoding) -> Result<RawFrame> {
    let mut reader = open_csv_reader(path, delimiter)?;
    let headers = reader
        .byte_headers()
        .with_context(|| format!("Reading headers from {path:?}"))?
        .clone();
    let columns = decode_record(&headers, encoding)
        .with_context(|| format!("Decoding headers from {path:?}"))?;

    let mut frame = RawFrame::new(columns);
    for (row_idx, record) in reader.byte_records().enumerate() {
        let record = record.with_context(|| format!("Reading row {} of {path:?}", row_idx + 2))?;
        let decoded = decode_record(&record, encoding)
            .with_context(|| format!("Decoding row {} of {path:?}", row_idx + 2))?;
        let mut row: Vec<RawCell> = decoded.iter().map(|f| RawCell::from_field(f)).collect();
        row.resize(frame.columns.len(), RawCell::Empty);
        frame.rows.push(row);
    }
    Ok(frame)
}

/// Writes a raw frame verbatim as a UTF-8 lake artifact.
pub fn write_raw_frame(path: &Path, frame: &RawFrame) -> Result<()> {
    let mut writer = create_csv_writer(path)?;
    writer
        .write_record(&frame.columns)
        .with_context(|| format!("Writing headers to {path:?}"))?;
    for row in &frame.rows {
        let fields: Vec<String> = row
            .iter()
            .map(|cell| cell.as_text().map(|t| t.into_owned()).unwrap_or_default())
            .collect();
        writer
            .write_record(&fields)
            .with_context(|| format!("Writing row to {path:?}"))?;
    }
    writer.flush().with_context(|| format!("Flushing {path:?}"))?;
    Ok(())
}

/// Writes a typed frame as CSV; nulls become empty cells and rely on the
/// sidecar schema for read-back typing.
pub fn write_typed_frame(path: &Path, frame: &TypedFrame) -> Result<()> {
    let mut writer = create_csv_writer(path)?;
    writer
        .write_record(frame.column_names())
        .with_context(|| format!("Writing headers to {path:?}"))?;
    for row in frame.display_rows() {
        writer
            .write_record(&row)
            .with_context(|| format!("Writing row to {path:?}"))?;
    }
    writer.flush().with_context(|| format!("Flushing {path:?}"))?;
    Ok(())
}

/// Reads a typed frame back using the sidecar schema for per-column typing.
/// A cell that fails its declared type degrades to null rather than failing
/// the read.
pub fn read_typed_frame(path: &Path, schema: &SilverSchema) -> Result<TypedFrame> {
    let mut reader = open_csv_reader(path, DEFAULT_CSV_DELIMITER)?;
    let headers = reader
        .headers()
        .with_context(|| format!("Reading headers from {path:?}"))?
        .clone();
    let header_names: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    if header_names != schema.column_names() {
        return Err(anyhow!(
            "Artifact {path:?} does not match its sidecar schema (headers {header_names:?})"
        ));
    }

    let mut rows = Vec::new();
    for (row_idx, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Reading row {} of {path:?}", row_idx + 2))?;
        let mut row: Vec<Option<Value>> = Vec::with_capacity(schema.columns.len());
        for (col_idx, meta) in schema.columns.iter().enumerate() {
            let field = record.get(col_idx).unwrap_or("");
            let value = if field.is_empty() {
                None
            } else {
                match meta.datatype {
                    ColumnType::Text => Some(Value::Text(field.to_string())),
                    ColumnType::Float => field.parse::<f64>().ok().map(Value::Number),
                }
            };
            row.push(value);
        }
        rows.push(row);
    }
    Ok(TypedFrame {
        columns: schema.columns.clone(),
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::column_meta;
    use std::path::PathBuf;

    #[test]
    fn resolve_input_delimiter_prefers_extension() {
        assert_eq!(
            resolve_input_delimiter(&PathBuf::from("x.tsv"), None),
            DEFAULT_TSV_DELIMITER
        );
        assert_eq!(
            resolve_input_delimiter(&PathBuf::from("x.csv"), None),
            DEFAULT_CSV_DELIMITER
        );
        assert_eq!(resolve_input_delimiter(&PathBuf::from("x.tsv"), Some(b';')), b';');
    }

    #[test]
    fn resolve_encoding_defaults_to_utf8() {
        assert_eq!(resolve_encoding(None).expect("utf-8"), UTF_8);
        assert!(resolve_encoding(Some("latin1")).is_ok());
        assert!(resolve_encoding(Some("no-such-encoding")).is_err());
    }

    #[test]
    fn typed_frame_round_trips_through_csv_and_sidecar() {
        let frame = TypedFrame {
            columns: vec![
                column_meta("marca", ColumnType::Text),
                column_meta("prezzo_eur", ColumnType::Float),
            ],
            rows: vec![
                vec![Some(Value::Text("Fiat".into())), Some(Value::Number(34995.5))],
                vec![Some(Value::Text("Lancia".into())), None],
            ],
        };
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("auto_clean.csv");
        write_typed_frame(&path, &frame).expect("write");
        let schema = SilverSchema::from_frame(&frame);
        let loaded = read_typed_frame(&path, &schema).expect("read");
        assert_eq!(loaded.rows, frame.rows);
        assert_eq!(loaded.columns, frame.columns);
    }

    #[test]
    fn raw_frame_pads_short_rows() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("raw.csv");
        std::fs::write(&path, "a,b,c\n1,2\n").expect("write fixture");
        let frame = read_raw_frame(&path, DEFAULT_CSV_DELIMITER, UTF_8).expect("read");
        assert_eq!(frame.columns, vec!["a", "b", "c"]);
        assert_eq!(
            frame.rows[0],
            vec![
                RawCell::Text("1".into()),
                RawCell::Text("2".into()),
                RawCell::Empty
            ]
        );
    }
}
