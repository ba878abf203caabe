//! Error types shared by the engine, the store and the JSON import/export.
use thiserror::Error;

/// Failures raised by the scheduling and aggregation logic.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("invalid attempt: {0}")]
    InvalidAttempt(String),

    #[error("invalid record: {0}")]
    InvalidRecord(String),

    #[error("date out of range")]
    DateOutOfRange,
}

pub type EngineResult<T> = Result<T, EngineError>;

/// Failures raised by the SQLite store and JSON files.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

pub type StoreResult<T> = Result<T, StoreError>;
