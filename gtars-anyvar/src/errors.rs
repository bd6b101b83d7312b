use gtars_vrs::VrsError;
use thiserror::Error;

/// Errors raised by object stores.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Object store is read-only")]
    ReadOnly,

    #[error("Object store does not support '{0}'")]
    Unsupported(&'static str),

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum AnyVarError {
    #[error("Unsupported format ({0})")]
    UnsupportedFormat(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid {format} definition: {reason}")]
    InvalidDefinition { format: &'static str, reason: String },

    #[error("Reference cycle detected at {0}")]
    Cycle(String),

    #[error("{id} refers to a {found}, expected a {expected}")]
    TypeMismatch {
        id: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error(transparent)]
    Translation(#[from] VrsError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type AnyVarResult<T> = Result<T, AnyVarError>;
