#![allow(dead_code)]

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::{TempDir, tempdir};

/// A messy-but-realistic raw export: synonym labels, accents, Italian
/// numerics, paired cells, and free-text null markers.
pub const MESSY_EXPORT: &str = "\
\"Brand\",\"Model\",\"Allestimento\",\"Prezzo Listino (€)\",\"Capacità batteria kWh\",\"posti\"\n\
\"Fiat\",\"500e\",\"Icon\",\"34.995,50 €\",\"42\",\"4\"\n\
\"Fiat\",\"Panda\",\"Base\",\"15.900 €\",\"nd\",\"4/5\"\n\
\"Tesla\",\"Model 3\",\"RWD\",\"42.490 €\",\"57,5\",\"5\"\n\
\"Tesla\",\"Model 3\",\"LR\",\"nd\",\"75\",\"5\"\n";

/// Scratch directory holding a `data/raw` source tree and a lake root,
/// cleaned up automatically on drop.
pub struct LakeWorkspace {
    temp_dir: TempDir,
}

impl LakeWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn data_root(&self) -> PathBuf {
        self.temp_dir.path().join("data")
    }

    pub fn lake_root(&self) -> PathBuf {
        self.temp_dir.path().join("lake")
    }

    /// Writes `contents` as the discoverable raw CSV source and returns its
    /// path.
    pub fn write_raw_csv(&self, contents: &str) -> PathBuf {
        self.write(&self.data_root().join("raw").join("auto_dati.csv"), contents)
    }

    /// Writes `contents` into an arbitrary file under the workspace.
    pub fn write(&self, path: &Path, contents: &str) -> PathBuf {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dirs");
        }
        let mut file = File::create(path).expect("create file");
        file.write_all(contents.as_bytes()).expect("write contents");
        path.to_path_buf()
    }

    pub fn bronze_path(&self, ds: &str) -> PathBuf {
        self.lake_root()
            .join("bronze")
            .join("auto")
            .join(format!("dt={ds}"))
            .join("auto_raw.csv")
    }

    pub fn silver_path(&self, ds: &str) -> PathBuf {
        self.lake_root()
            .join("silver")
            .join("auto")
            .join(format!("dt={ds}"))
            .join("auto_clean.csv")
    }

    pub fn gold_path(&self, ds: &str) -> PathBuf {
        self.lake_root()
            .join("gold")
            .join("brand_stats")
            .join(format!("dt={ds}"))
            .join("brand_stats.csv")
    }
}
