use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about = "Staged ELT for vehicle listing exports", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the full bronze -> silver -> gold pipeline for one partition
    Run(RunArgs),
    /// Capture the raw source into the bronze layer
    Ingest(IngestArgs),
    /// Normalize the bronze capture into the typed silver dataset
    Transform(TransformArgs),
    /// Aggregate the silver dataset into gold brand statistics
    Aggregate(AggregateArgs),
}

#[derive(Debug, Args)]
pub struct PartitionArgs {
    /// Partition key (date-like, e.g. 2024-06-01); defaults to today
    #[arg(long)]
    pub ds: Option<String>,
    /// Root directory holding the raw input data
    #[arg(long = "data-root", default_value = "data")]
    pub data_root: PathBuf,
    /// Root directory of the staged lake
    #[arg(long = "lake-root", default_value = "lake")]
    pub lake_root: PathBuf,
}

#[derive(Debug, Args)]
pub struct SourceArgs {
    /// Explicit raw input file (.csv or .xlsx); overrides data-root discovery
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of a CSV input (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub partition: PartitionArgs,
    #[command(flatten)]
    pub source: SourceArgs,
    /// Render the gold brand statistics as an ASCII table on stdout
    #[arg(long = "table")]
    pub table: bool,
}

#[derive(Debug, Args)]
pub struct IngestArgs {
    #[command(flatten)]
    pub partition: PartitionArgs,
    #[command(flatten)]
    pub source: SourceArgs,
}

#[derive(Debug, Args)]
pub struct TransformArgs {
    #[command(flatten)]
    pub partition: PartitionArgs,
}

#[derive(Debug, Args)]
pub struct AggregateArgs {
    #[command(flatten)]
    pub partition: PartitionArgs,
    /// Render the gold brand statistics as an ASCII table on stdout
    #[arg(long = "table")]
    pub table: bool,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
