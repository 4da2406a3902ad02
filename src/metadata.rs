//! Silver sidecar schema.
//!
//! The typed dataset is persisted as CSV plus a YAML sidecar describing each
//! column's name and datatype. The sidecar is what makes the artifact
//! self-describing: a blank cell in a `float` column reads back as null
//! rather than as an empty string.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::TypedFrame;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Text,
    Float,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMeta {
    pub name: String,
    pub datatype: ColumnType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SilverSchema {
    pub columns: Vec<ColumnMeta>,
}

impl SilverSchema {
    pub fn from_frame(frame: &TypedFrame) -> Self {
        Self {
            columns: frame.columns.clone(),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let yaml = serde_yaml::to_string(self)
            .with_context(|| format!("Serializing schema for {path:?}"))?;
        fs::write(path, yaml).with_context(|| format!("Writing schema to {path:?}"))?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let yaml =
            fs::read_to_string(path).with_context(|| format!("Reading schema from {path:?}"))?;
        serde_yaml::from_str(&yaml).with_context(|| format!("Parsing schema from {path:?}"))
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }
}

/// Derives the sidecar path from the CSV artifact path:
/// `auto_clean.csv` -> `auto_clean-schema.yml`.
pub fn sidecar_path(csv_path: &Path) -> PathBuf {
    let stem = csv_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("artifact");
    csv_path.with_file_name(format!("{stem}-schema.yml"))
}
