//! Centralized error types for mailrecord.

use thiserror::Error;

/// All errors produced by the mailrecord library.
///
/// Only the strict document-parsing entry points return these. Tolerated
/// failures (malformed persisted blobs, unparseable optional URIs) are
/// handled in place: the codec logs and substitutes absence, per the
/// provider contract. Precondition violations (truncated binary streams,
/// unknown projection columns) panic instead of erroring.
#[derive(Error, Debug)]
pub enum RecordError {
    /// The document text is not valid JSON.
    #[error("Malformed record document: {0}")]
    MalformedDocument(#[from] serde_json::Error),

    /// The document parsed, but its top-level value has the wrong shape.
    #[error("Record document is not a JSON {expected}")]
    UnexpectedShape {
        /// `"object"` or `"array"`.
        expected: &'static str,
    },
}

/// Convenience alias for `Result<T, RecordError>`.
pub type Result<T> = std::result::Result<T, RecordError>;
