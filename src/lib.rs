pub mod aggregate;
pub mod cli;
pub mod data;
pub mod error;
pub mod ingest;
pub mod io_utils;
pub mod metadata;
pub mod parse;
pub mod pipeline;
pub mod resolve;
pub mod table;
pub mod text;
pub mod transform;

use std::{env, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::{LevelFilter, info};

use crate::cli::{AggregateArgs, Cli, Commands, IngestArgs, PartitionArgs, RunArgs, SourceArgs, TransformArgs};
use crate::data::TypedFrame;
use crate::pipeline::{PipelineConfig, SourceOptions};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("auto_elt", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => handle_run(&args),
        Commands::Ingest(args) => handle_ingest(&args),
        Commands::Transform(args) => handle_transform(&args),
        Commands::Aggregate(args) => handle_aggregate(&args),
    }
}

fn handle_run(args: &RunArgs) -> Result<()> {
    let config = pipeline_config(&args.partition);
    let source = source_options(&args.source)?;
    info!("Running full pipeline for partition dt={}", config.ds);
    let stats = pipeline::run_partition(&config, &source)?;
    if args.table {
        print_stats(&stats);
    }
    info!(
        "DONE -> gold brand_stats (dt={}, {} brand(s))",
        config.ds,
        stats.rows.len()
    );
    Ok(())
}

fn handle_ingest(args: &IngestArgs) -> Result<()> {
    let config = pipeline_config(&args.partition);
    let source = source_options(&args.source)?;
    config.ensure_dirs()?;
    let bronze = pipeline::ingest_bronze(&config, &source)?;
    info!("Bronze capture written to {:?}", bronze);
    Ok(())
}

fn handle_transform(args: &TransformArgs) -> Result<()> {
    let config = pipeline_config(&args.partition);
    config.ensure_dirs()?;
    let silver = pipeline::transform_silver(&config)?;
    info!("Silver dataset written to {:?}", silver);
    Ok(())
}

fn handle_aggregate(args: &AggregateArgs) -> Result<()> {
    let config = pipeline_config(&args.partition);
    config.ensure_dirs()?;
    let stats = pipeline::aggregate_gold(&config)?;
    if args.table {
        print_stats(&stats);
    }
    info!("Gold brand stats written to {:?}", config.gold_path());
    Ok(())
}

fn pipeline_config(args: &PartitionArgs) -> PipelineConfig {
    let ds = args
        .ds
        .clone()
        .unwrap_or_else(|| chrono::Local::now().date_naive().to_string());
    PipelineConfig {
        ds,
        data_root: args.data_root.clone(),
        lake_root: args.lake_root.clone(),
    }
}

fn source_options(args: &SourceArgs) -> Result<SourceOptions> {
    Ok(SourceOptions {
        input: args.input.clone(),
        delimiter: args.delimiter,
        encoding: io_utils::resolve_encoding(args.input_encoding.as_deref())?,
    })
}

fn print_stats(stats: &TypedFrame) {
    table::print_table(&stats.column_names(), &stats.display_rows());
}
