use serde::{Deserialize, Serialize};

use crate::record::StationRecord;

/// Lanczos window half-width used when a group has to be resampled.
pub const DEFAULT_INTERPOLATION_WINDOW: usize = 20;

/// Shared configuration for the reconciliation stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    pub interpolation_window: usize,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            interpolation_window: DEFAULT_INTERPOLATION_WINDOW,
        }
    }
}

/// Common error type for group construction and metadata export.
#[derive(thiserror::Error, Debug)]
pub enum StreamError {
    #[error("record {0} is not a station record and no inventory was supplied")]
    InvalidRecordType(String),
    #[error("inconsistent stream identity: expected {expected}, found {found}")]
    InconsistentStreamIdentity { expected: String, found: String },
    #[error("group has no identity")]
    NoIdentity,
    #[error("group has stations from multiple networks: {0:?}")]
    MultiNetworkGroup(Vec<String>),
    #[error("metadata serialization failed: {0}")]
    MetadataSerialization(#[from] serde_json::Error),
    #[error("parameter {0} not found in group")]
    ParamNotFound(String),
    #[error("cache entry {0} not found")]
    CacheEntryNotFound(String),
    #[error("missing metadata: {0}")]
    MissingMetadata(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub type StreamResult<T> = Result<T, StreamError>;

/// A single group-level invariant check.
///
/// Checks never raise: a failing check returns the reason that every member
/// of the group gets marked with.
pub trait ConsistencyCheck {
    fn name(&self) -> &'static str;
    fn inspect(&self, records: &[StationRecord]) -> Option<String>;
}
