use thiserror::Error;

/// Errors returned by hashing, banding and the cluster merge pipeline.
#[derive(Debug, Error)]
pub enum Error {
    /// A hash, band or pipeline parameter is out of range or inconsistent.
    #[error("invalid configuration {name}: {message}")]
    Configuration {
        /// Parameter name.
        name: &'static str,
        /// Human-readable explanation.
        message: String,
    },

    /// A label was inserted twice into one cluster's member mapping.
    #[error("duplicate label {label} in cluster members")]
    DuplicateLabel {
        /// Debug rendering of the offending label.
        label: String,
    },

    /// Two sketches of incompatible shape were compared.
    #[error("cannot compare sketches: expected length {expected}, found {found}")]
    DistanceComputation {
        /// Length of the first sketch.
        expected: usize,
        /// Length of the second sketch.
        found: usize,
    },

    /// A record is missing a field the pipeline needs.
    #[error("malformed record: {0}")]
    MalformedRecord(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn config(name: &'static str, message: impl Into<String>) -> Self {
        Error::Configuration {
            name,
            message: message.into(),
        }
    }
}

/// Result type used by this crate.
pub type Result<T> = std::result::Result<T, Error>;
