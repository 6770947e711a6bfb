//! Error types for conversion, sources, and the group-reduce engine.

use std::io;

use thiserror::Error;

/// Boxed error returned by caller-supplied key and merge functions.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A raw fragment could not be turned into a time series.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConversionError {
    /// A structural field such as `timestamps` or `values` is absent.
    #[error("fragment is missing required field `{0}`")]
    MissingField(&'static str),
    /// A declared attribute is absent from the fragment.
    #[error("fragment is missing required attribute `{0}`")]
    MissingAttribute(String),
    /// The timestamp and value arrays have different lengths.
    #[error("fragment has {timestamps} timestamps but {values} values")]
    LengthMismatch {
        /// Number of timestamps in the fragment.
        timestamps: usize,
        /// Number of values in the fragment.
        values: usize,
    },
}

/// Failure reported by a raw series source.
///
/// The engine never inspects these; they are passed through unchanged.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Reading from the backend failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// A document could not be decoded.
    #[error("failed to decode document at line {line}: {message}")]
    Decode {
        /// 1-based line (or record) number of the offending document.
        line: usize,
        /// Decoder message.
        message: String,
    },
    /// The query filter could not be parsed.
    #[error("invalid query `{query}`: {reason}")]
    InvalidQuery {
        /// The filter expression as given.
        query: String,
        /// Why it was rejected.
        reason: String,
    },
    /// Any other backend-specific failure.
    #[error("backend error: {0}")]
    Backend(String),
}

/// Failure of one group-reduce run.
///
/// The first error encountered ends the run and discards all accumulated groups.
#[derive(Debug, Error)]
pub enum GroupError {
    /// The source failed while producing a fragment.
    #[error(transparent)]
    Source(#[from] SourceError),
    /// A fragment could not be converted.
    #[error(transparent)]
    Conversion(#[from] ConversionError),
    /// The key function failed for the series at the given arrival position.
    #[error("key function failed for series #{position}: {source}")]
    KeyFunction {
        /// 0-based arrival position of the series.
        position: usize,
        /// Error returned by the key function.
        source: BoxError,
    },
    /// The merge function failed while folding into a group.
    #[error("merge failed for group {key}: {source}")]
    Merge {
        /// `Debug` rendering of the offending group key.
        key: String,
        /// Error returned by the merge function.
        source: BoxError,
    },
    /// A new distinct group would exceed the configured bound.
    #[error("group limit of {limit} exceeded")]
    CapacityExceeded {
        /// Configured maximum number of distinct groups.
        limit: usize,
    },
}

/// Error returned by the client facade.
#[derive(Debug, Error)]
pub enum ChronixError {
    /// The source rejected the query before producing anything.
    #[error(transparent)]
    Source(#[from] SourceError),
    /// Grouping or merging failed.
    #[error(transparent)]
    Group(#[from] GroupError),
}
