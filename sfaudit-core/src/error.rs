use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Workbook error: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Export error: {0}")]
    Export(#[from] sfaudit_exports::LoadError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

#[derive(Error, Debug, PartialEq)]
pub enum CatalogError {
    #[error("Duplicate issue id: {0}")]
    DuplicateId(String),

    #[error("Issue {id} has {field} score {score}, expected 1-10")]
    ScoreOutOfRange {
        id: String,
        field: &'static str,
        score: u8,
    },
}

pub type Result<T> = std::result::Result<T, AuditError>;
