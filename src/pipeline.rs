//! Staged pipeline driver.
//!
//! One partition (`dt=<ds>`) owns three artifacts in strict dependency
//! order: bronze capture, silver typed dataset, gold brand aggregate. Each
//! stage reads the previous stage's materialized artifact rather than
//! in-memory state, so any stage can be re-inspected or replayed on its
//! own. A rerun with the same `ds` replaces the partition wholesale.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use encoding_rs::Encoding;
use log::info;

use crate::aggregate;
use crate::data::TypedFrame;
use crate::error::PipelineError;
use crate::ingest;
use crate::io_utils;
use crate::metadata::{self, SilverSchema};
use crate::transform;

/// Explicit pipeline configuration: partition key and storage roots.
/// Passed into every stage; nothing is read from ambient globals.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub ds: String,
    pub data_root: PathBuf,
    pub lake_root: PathBuf,
}

impl PipelineConfig {
    pub fn bronze_dir(&self) -> PathBuf {
        self.lake_root
            .join("bronze")
            .join("auto")
            .join(format!("dt={}", self.ds))
    }

    pub fn silver_dir(&self) -> PathBuf {
        self.lake_root
            .join("silver")
            .join("auto")
            .join(format!("dt={}", self.ds))
    }

    pub fn gold_dir(&self) -> PathBuf {
        self.lake_root
            .join("gold")
            .join("brand_stats")
            .join(format!("dt={}", self.ds))
    }

    pub fn bronze_path(&self) -> PathBuf {
        self.bronze_dir().join("auto_raw.csv")
    }

    pub fn silver_path(&self) -> PathBuf {
        self.silver_dir().join("auto_clean.csv")
    }

    pub fn silver_schema_path(&self) -> PathBuf {
        metadata::sidecar_path(&self.silver_path())
    }

    pub fn gold_path(&self) -> PathBuf {
        self.gold_dir().join("brand_stats.csv")
    }

    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in [self.bronze_dir(), self.silver_dir(), self.gold_dir()] {
            fs::create_dir_all(&dir)
                .with_context(|| format!("Creating partition directory {dir:?}"))?;
        }
        Ok(())
    }
}

/// How to locate and decode the raw source for the capture stage.
#[derive(Debug, Clone)]
pub struct SourceOptions {
    /// Explicit raw file; when unset the `data_root/raw` candidates are
    /// probed in order.
    pub input: Option<PathBuf>,
    pub delimiter: Option<u8>,
    pub encoding: &'static Encoding,
}

/// Capture stage: raw source -> bronze artifact (verbatim copy).
pub fn ingest_bronze(config: &PipelineConfig, source: &SourceOptions) -> Result<PathBuf> {
    let raw_path = match &source.input {
        Some(path) => path.clone(),
        None => ingest::pick_raw_source(&config.data_root)?,
    };
    let frame = ingest::read_raw_source(&raw_path, source.delimiter, source.encoding)?;
    let bronze = config.bronze_path();
    io_utils::write_raw_frame(&bronze, &frame)
        .with_context(|| format!("Writing bronze capture for dt={}", config.ds))?;
    info!(
        "Captured {:?} -> {:?} ({} row(s))",
        raw_path,
        bronze,
        frame.rows.len()
    );
    Ok(bronze)
}

/// Transform stage: bronze capture -> silver typed dataset + sidecar.
pub fn transform_silver(config: &PipelineConfig) -> Result<PathBuf> {
    let bronze = config.bronze_path();
    require_artifact("bronze", &bronze, &config.ds)?;

    let frame = io_utils::read_raw_frame(
        &bronze,
        io_utils::DEFAULT_CSV_DELIMITER,
        encoding_rs::UTF_8,
    )
    .with_context(|| format!("Reading bronze capture for dt={}", config.ds))?;

    let typed = transform::normalize(&frame)?;

    let silver = config.silver_path();
    io_utils::write_typed_frame(&silver, &typed)
        .with_context(|| format!("Writing silver dataset for dt={}", config.ds))?;
    SilverSchema::from_frame(&typed)
        .save(&config.silver_schema_path())
        .with_context(|| format!("Writing silver sidecar for dt={}", config.ds))?;
    info!("Materialized silver dataset {:?}", silver);
    Ok(silver)
}

/// Aggregate stage: silver dataset -> gold brand statistics. Returns the
/// aggregate frame so callers can render it without re-reading the artifact.
pub fn aggregate_gold(config: &PipelineConfig) -> Result<TypedFrame> {
    let silver = config.silver_path();
    let sidecar = config.silver_schema_path();
    require_artifact("silver", &silver, &config.ds)?;
    require_artifact("silver", &sidecar, &config.ds)?;

    let schema = SilverSchema::load(&sidecar)?;
    let typed = io_utils::read_typed_frame(&silver, &schema)
        .with_context(|| format!("Reading silver dataset for dt={}", config.ds))?;

    let stats = aggregate::aggregate(&typed, &config.ds)?;

    let gold = config.gold_path();
    io_utils::write_typed_frame(&gold, &stats)
        .with_context(|| format!("Writing gold brand stats for dt={}", config.ds))?;
    info!("Materialized gold brand stats {:?}", gold);
    Ok(stats)
}

/// Runs all three stages for one partition in dependency order.
pub fn run_partition(config: &PipelineConfig, source: &SourceOptions) -> Result<TypedFrame> {
    config.ensure_dirs()?;
    ingest_bronze(config, source)?;
    transform_silver(config)?;
    aggregate_gold(config)
}

fn require_artifact(stage: &'static str, path: &Path, ds: &str) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(PipelineError::MissingInputArtifact {
            stage,
            ds: ds.to_string(),
            path: path.to_path_buf(),
        }
        .into())
    }
}
