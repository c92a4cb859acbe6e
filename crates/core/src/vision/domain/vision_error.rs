use thiserror::Error;

/// Failures at the vision service boundary.
///
/// Only `InvalidArgument` is meant to reach the caller as a hard failure.
/// Service-side failures during recognition are recovered locally as an
/// "UNKNOWN" caption, and `PreconditionFailed` is reported and skipped.
#[derive(Error, Debug)]
pub enum VisionError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("{operation} failed: {message}")]
    Service { operation: String, message: String },
    #[error("{operation} request failed: {source}")]
    Transport {
        operation: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{operation} request could not be encoded: {source}")]
    Encode {
        operation: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{operation} returned an unreadable response: {source}")]
    Decode {
        operation: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("enrollment needs exactly one face in the frame, found {found}")]
    PreconditionFailed { found: usize },
    #[error("no face was indexed into collection '{collection_id}'")]
    NothingIndexed { collection_id: String },
}

impl VisionError {
    pub fn service(operation: &str, message: impl Into<String>) -> Self {
        Self::Service {
            operation: operation.to_string(),
            message: message.into(),
        }
    }
}
