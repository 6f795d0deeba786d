//! Path-qualified match diagnostics.
//!
//! A match session records at most one diagnostic: the most recent failure
//! along the failing path. Exploratory probes (unordered-array lookahead)
//! record nothing.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchError {
    /// Root-relative location of the failure, e.g. `(ROOT).items[2].id`.
    pub path: String,
    pub kind: MatchErrorKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchErrorKind {
    /// The pattern wanted an array, the target is something else.
    NotAnArray,
    /// The pattern wanted an object, the target is something else.
    NotAnObject,
    /// Target array has fewer elements than the pattern.
    TooFewElements { expected: usize, actual: usize },
    /// Target array has more elements than a strict pattern.
    TooManyElements { expected: usize, actual: usize },
    /// No remaining target element matches an unordered pattern element.
    ElementNotFound { pattern: String },
    /// A pattern key is absent from the target object.
    MissingKey { key: String },
    /// A target key is absent from a strict pattern.
    ExtraKey { key: String },
    /// Ordered object keys differ as a sequence.
    KeyOrderMismatch {
        expected: Vec<String>,
        actual: Vec<String>,
    },
    /// A scalar, regex, type, or literal comparison failed.
    LeafMismatch { pattern: String, value: String },
    /// A repeated capture name bound inconsistent values.
    CaptureConflict {
        name: String,
        previous: String,
        value: String,
    },
}

impl fmt::Display for MatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = &self.path;
        match &self.kind {
            MatchErrorKind::NotAnArray => write!(f, "{path} is not an array"),
            MatchErrorKind::NotAnObject => write!(f, "{path} is not an object"),
            MatchErrorKind::TooFewElements { expected, actual } => write!(
                f,
                "{path} contains too few elements ({expected} expected but was {actual})",
            ),
            MatchErrorKind::TooManyElements { expected, actual } => write!(
                f,
                "{path} contains too many elements ({expected} expected but was {actual})",
            ),
            MatchErrorKind::ElementNotFound { pattern } => {
                write!(f, "{path} does not contain an element matching {pattern}")
            }
            MatchErrorKind::MissingKey { key } => {
                write!(f, "{path} does not contain the key {key}")
            }
            MatchErrorKind::ExtraKey { key } => {
                write!(f, "{path} contains an extra key {key}")
            }
            MatchErrorKind::KeyOrderMismatch { expected, actual } => write!(
                f,
                "Incorrect key-ordering at {path} ({expected:?} expected but was {actual:?})",
            ),
            MatchErrorKind::LeafMismatch { pattern, value } => {
                write!(f, "At {path}: expected {pattern} to match {value}")
            }
            MatchErrorKind::CaptureConflict {
                name,
                previous,
                value,
            } => write!(
                f,
                "At {path}: expected capture {name:?} with value {previous} to match {value}",
            ),
        }
    }
}

impl std::error::Error for MatchError {}
