//! Error types shared by the operation model and its consumers.
//!
//! Caller bugs (nested mutations, ill-formed ops handed to a trusted path)
//! panic at the point of violation. The enums here cover the conditions a
//! caller may want to inspect: a mismatched merge chain, an op that is not
//! well-formed, a rendering that cannot be completed, and an op that cannot be
//! applied to a particular document.

use thiserror::Error;

/// Chaining two update maps failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MergeError {
    #[error("mismatched old value for {key:?}: earlier update ends at {earlier_new:?}, later update starts from {later_old:?}")]
    MismatchedOldValue {
        key: String,
        earlier_new: Option<String>,
        later_old: Option<String>,
    },
}

/// Structural problems found by [`check_well_formed`](crate::check_well_formed).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WellFormednessError {
    #[error("component {index}: retain must be at least 1")]
    ZeroRetain { index: usize },

    #[error("component {index}: character run must not be empty")]
    EmptyCharacters { index: usize },

    #[error("component {index}: element end without a matching element start")]
    UnmatchedElementEnd { index: usize },

    #[error("component {index}: delete element end without a matching delete element start")]
    UnmatchedDeleteElementEnd { index: usize },

    #[error("component {index}: {component} is not allowed inside an inserted element")]
    InsideInsertion { index: usize, component: &'static str },

    #[error("component {index}: {component} is not allowed inside a deleted element")]
    InsideDeletion { index: usize, component: &'static str },

    #[error("component {index}: annotation {key:?} ended but never started")]
    EndOfUnknownAnnotation { index: usize, key: String },

    #[error("{depth} element(s) left open at the end of the operation")]
    UnclosedElements { depth: usize },

    #[error("annotation(s) {keys:?} left open at the end of the operation")]
    UnclosedAnnotations { keys: Vec<String> },
}

/// Canonical XML rendering could not be completed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("element end without a matching element start")]
    UnmatchedElementEnd,

    #[error("{0} element(s) left open")]
    UnclosedElements(usize),

    #[error("component {0} cannot appear in a document initialization")]
    UnexpectedComponent(&'static str),
}

/// An operation could not be applied to its target.
///
/// These are per-operation failures: a caller applying a batch decides
/// whether to skip the failed operation or stop.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OperationError {
    #[error("operation is ill-formed: {0}")]
    IllFormed(#[from] WellFormednessError),

    #[error("operation reaches item {required} but the document has {length} item(s)")]
    DocumentTooShort { required: usize, length: usize },

    #[error("item {position}: {reason}")]
    Mismatch { position: usize, reason: String },

    #[error("attribute {key:?} has value {actual:?}, update expected {expected:?}")]
    AttributeMismatch {
        key: String,
        expected: Option<String>,
        actual: Option<String>,
    },

    #[error("mutation is not applicable: {0}")]
    InvalidMutation(String),

    #[error("attempt to add a duplicate participant {0:?}")]
    DuplicateParticipant(String),

    #[error("attempt to remove participant {0:?} who is not on the wavelet")]
    MissingParticipant(String),
}
