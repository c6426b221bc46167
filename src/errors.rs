use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::types::RecordId;

/// Malformed input: an identifier that fits no declared shape, or a sidecar
/// document that cannot be decoded.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The id matches no declared shape.
    #[error("identifier '{id}' is not valid: {reason}")]
    Identifier {
        /// Raw identifier as found.
        id: String,
        /// Why it was rejected.
        reason: String,
    },
    /// The sidecar is not a JSON array of objects, or a recognized field has
    /// the wrong type.
    #[error("sidecar {} is malformed: {reason}", path.display())]
    Sidecar {
        /// Sidecar location.
        path: PathBuf,
        /// Decoding failure.
        reason: String,
    },
    /// No identifier can be read off a discovered path.
    #[error("cannot derive an identifier from path {}", path.display())]
    Path {
        /// Offending path.
        path: PathBuf,
    },
    /// Two sidecars describe the same object.
    #[error("identifier '{0}' appears more than once")]
    DuplicateId(RecordId),
}

/// Error type for loading, matching, resolving, and writing signatures.
#[derive(Debug, Error)]
pub enum SignatureError {
    /// Malformed identifier or sidecar.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// Immediate signatures loop back on themselves.
    #[error("signature chain starting at '{start}' revisits '{repeated}'")]
    Cycle {
        /// Record the walk started from.
        start: RecordId,
        /// First record visited twice.
        repeated: RecordId,
    },
    /// Inconsistent model declarations.
    #[error("schema error: {0}")]
    Schema(String),
    /// Reading or writing a sidecar failed.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// Directory traversal failed.
    #[error(transparent)]
    Walk(#[from] walkdir::Error),
}

impl SignatureError {
    /// True for malformed identifiers or sidecar documents.
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse(_))
    }

    /// True when a signature chain loops back on itself.
    pub fn is_cycle(&self) -> bool {
        matches!(self, Self::Cycle { .. })
    }
}
