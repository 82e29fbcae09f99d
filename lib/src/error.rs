//! Error taxonomy for the airgrab Merkle pipeline.
//!
//! Encoding and construction errors are fatal to a build. `NotFound` is a
//! per-query outcome and leaves the loaded tree usable.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AirgrabError>;

/// Why a single input record could not be turned into a leaf.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid allocation: {0}")]
    InvalidAllocation(String),

    #[error("inconsistent allocation components: components sum to {components}, declared total is {total}")]
    InconsistentComponents { components: String, total: String },

    #[error("duplicate address {address} (first seen at row {first_row})")]
    DuplicateAddress { address: String, first_row: usize },

    #[error("missing column: {0}")]
    MissingColumn(String),

    #[error("malformed csv: {0}")]
    MalformedCsv(String),
}

/// Where in the snapshot an encoding error happened.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordLocation {
    /// 1-based data row, header excluded.
    pub row: Option<usize>,
    pub address: Option<String>,
}

impl RecordLocation {
    pub fn row(row: usize) -> Self {
        Self { row: Some(row), address: None }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }
}

impl fmt::Display for RecordLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.row, &self.address) {
            (Some(row), Some(addr)) => write!(f, "row {row} ({addr})"),
            (Some(row), None) => write!(f, "row {row}"),
            (None, Some(addr)) => write!(f, "{addr}"),
            (None, None) => f.write_str("input"),
        }
    }
}

#[derive(Debug, Error)]
pub enum AirgrabError {
    #[error("encoding error at {location}: {source}")]
    Encoding {
        location: RecordLocation,
        #[source]
        source: EncodingError,
    },

    #[error("empty snapshot: no records to commit")]
    EmptySnapshot,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("io error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AirgrabError {
    pub fn encoding(location: RecordLocation, source: EncodingError) -> Self {
        Self::Encoding { location, source }
    }

    pub fn serialization<M: Into<String>>(message: M) -> Self {
        Self::Serialization(message.into())
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    /// True for errors a query-serving caller should report as "not eligible".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<EncodingError> for AirgrabError {
    fn from(source: EncodingError) -> Self {
        Self::encoding(RecordLocation::default(), source)
    }
}
