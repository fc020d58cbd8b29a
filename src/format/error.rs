//! Error types for session file operations.

use std::path::PathBuf;
use thiserror::Error;

use crate::error::AnnotationError;
use pxlabel_plane::PlaneError;

/// Errors that can occur while saving or loading a session.
#[derive(Error, Debug)]
pub enum FormatError {
    /// I/O error during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Label plane array could not be read
    #[error("Failed to read label plane: {0}")]
    NpyRead(#[from] ndarray_npy::ReadNpyError),

    /// Label plane array could not be written
    #[error("Failed to write label plane: {0}")]
    NpyWrite(#[from] ndarray_npy::WriteNpyError),

    /// The two arrays of a stored plane disagree
    #[error("Invalid label plane: {0}")]
    Plane(#[from] PlaneError),

    /// Identity image encoding or writing failed
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Stored records rejected by the record store
    #[error("Invalid records: {0}")]
    Records(#[from] AnnotationError),

    /// Invalid file structure or content
    #[error("Invalid format: {message}")]
    InvalidFormat {
        /// Description of the format error
        message: String,
    },

    /// Plane files for a frame are missing
    #[error("No stored plane for frame {frame} in {dir:?}")]
    PlaneNotFound {
        /// Directory searched
        dir: PathBuf,
        /// The requested frame
        frame: usize,
    },

    /// Version mismatch between expected and found
    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch {
        /// Expected version string
        expected: String,
        /// Found version string
        found: String,
    },
}

impl FormatError {
    /// Create an invalid format error with a message.
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }
}
