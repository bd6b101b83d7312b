//! Input formats accepted by [`AnyVar::translate`](crate::AnyVar::translate).

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::errors::AnyVarError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// A structured mapping of VRS Allele fields.
    Ga4gh,
    Beacon,
    Hgvs,
    Gnomad,
    Spdi,
}

impl Format {
    pub const ALL: [Format; 5] = [
        Format::Ga4gh,
        Format::Beacon,
        Format::Hgvs,
        Format::Gnomad,
        Format::Spdi,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Ga4gh => "ga4gh",
            Format::Beacon => "beacon",
            Format::Hgvs => "hgvs",
            Format::Gnomad => "gnomad",
            Format::Spdi => "spdi",
        }
    }
}

impl FromStr for Format {
    type Err = AnyVarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Format::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| AnyVarError::UnsupportedFormat(s.to_string()))
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A variation definition: an expression string, or a structured mapping
/// for the `ga4gh` format.
#[derive(Debug, Clone, PartialEq)]
pub enum Definition {
    Text(String),
    Structured(Value),
}

impl Definition {
    /// The definition as an expression string, if it is one.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Definition::Text(s) => Some(s),
            Definition::Structured(Value::String(s)) => Some(s),
            Definition::Structured(_) => None,
        }
    }
}

impl From<&str> for Definition {
    fn from(s: &str) -> Self {
        Definition::Text(s.to_string())
    }
}

impl From<String> for Definition {
    fn from(s: String) -> Self {
        Definition::Text(s)
    }
}

impl From<Value> for Definition {
    fn from(value: Value) -> Self {
        Definition::Structured(value)
    }
}
