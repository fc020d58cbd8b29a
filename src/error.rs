//! Error types for annotation engine operations.
//!
//! Most lookups in the engine return `Option` instead of failing: a missing
//! record is an ordinary outcome while reconciling a stroke. The variants below
//! cover the requests that cannot be honored at all.

use thiserror::Error;

use crate::model::{ClassId, ObjectId};
use pxlabel_plane::FrameNumber;

/// Errors raised by the catalog, the record store and stroke application.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnnotationError {
    /// Class id outside `[1, count]`
    #[error("Class {class_id} is out of range (catalog holds {count} classes)")]
    ClassOutOfRange {
        /// The rejected class id
        class_id: ClassId,
        /// Number of classes available
        count: usize,
    },

    /// Object id negative or above the supported maximum
    #[error("Object id {object_id} is out of range")]
    ObjectOutOfRange {
        /// The rejected object id
        object_id: ObjectId,
    },

    /// The stroke mask did not cover any pixel of the frame
    #[error("Stroke does not touch any pixel of the frame")]
    EmptyStroke,

    /// The requested frame is not available
    #[error("Frame {frame} is not loaded")]
    NoFrame {
        /// The missing frame
        frame: FrameNumber,
    },
}

/// Result alias for annotation engine operations.
pub type Result<T> = std::result::Result<T, AnnotationError>;
