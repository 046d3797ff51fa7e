use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// The corpus had no rows, or no row produced a single indexable term.
    #[error("corpus is empty or has no indexable ingredient terms")]
    EmptyCorpus,

    #[error("index bundle is corrupt: {0}")]
    CorruptIndex(String),

    #[error("cannot read corpus {path}: {reason}")]
    CorpusFormat { path: PathBuf, reason: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("serialization error: {0}")]
    Bincode(#[from] bincode::Error),
}

