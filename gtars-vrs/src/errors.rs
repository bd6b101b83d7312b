use thiserror::Error;

use crate::normalize::NormalizeError;

#[derive(Error, Debug)]
pub enum VrsError {
    #[error("Unable to parse {format} expression: {expression}")]
    ParseError {
        format: &'static str,
        expression: String,
    },

    #[error("Unsupported variant: {0}")]
    UnsupportedVariant(String),

    #[error("Unable to resolve sequence identifier: {0}")]
    SequenceNotFound(String),

    #[error("Interval {start}-{end} is out of range for {identifier} (length {length})")]
    OutOfRange {
        identifier: String,
        start: u64,
        end: u64,
        length: u64,
    },

    #[error("Reference mismatch on {identifier} at {start}-{end}: expression says {expected}, reference has {found}")]
    ReferenceMismatch {
        identifier: String,
        start: u64,
        end: u64,
        expected: String,
        found: String,
    },

    #[error("Invalid GA4GH identifier: {0}")]
    InvalidIdentifier(String),

    #[error(transparent)]
    Normalize(#[from] NormalizeError),
}

pub type VrsResult<T> = std::result::Result<T, VrsError>;
