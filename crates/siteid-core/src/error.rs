use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid facility id '{0}': expected SITE-<REGION>-<SEQ>")]
    InvalidFacilityId(String),

    #[error("year {0} cannot be written as ORD-<YEAR>; expected 1000..=9999")]
    InvalidYear(i32),

    #[error("record not found: {0}")]
    RecordNotFound(String),

    #[error("unsupported snapshot format '{0}': use .json, .yaml or .yml")]
    UnsupportedSnapshotFormat(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
