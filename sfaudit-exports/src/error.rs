use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Cannot read export directory {path}: {source}")]
    Directory {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error in {file}: {source}")]
    CsvError { file: String, source: csv::Error },

    #[error("Export {0} has no header row")]
    MissingHeader(String),
}

pub type Result<T> = std::result::Result<T, LoadError>;
