use std::path::PathBuf;

use thiserror::Error;

/// Fatal pipeline conditions. Everything here aborts the run for the
/// affected partition; rerunning with the same `ds` (a wholesale replace)
/// is the recovery mechanism. Unparseable cell values are deliberately
/// absent: they resolve to null, never to an error.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(
        "required column '{field}' could not be resolved for partition dt={ds}; \
         available columns: {}",
        .available.join(", ")
    )]
    MissingRequiredField {
        field: &'static str,
        ds: String,
        available: Vec<String>,
    },

    #[error("missing {stage} artifact for partition dt={ds}: {path:?} (run the earlier stage first)")]
    MissingInputArtifact {
        stage: &'static str,
        ds: String,
        path: PathBuf,
    },

    #[error("unsupported raw source format {path:?}; expected a .csv or .xlsx file")]
    UnsupportedFormat { path: PathBuf },

    #[error("no raw source found under {dir:?}; expected auto_dati.csv or auto_dati.xlsx")]
    MissingRawSource { dir: PathBuf },
}
