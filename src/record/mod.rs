//! The annotation record store and its reverse indexes.

mod store;

pub use store::AnnotationRecord;

use thiserror::Error;

use crate::model::RecordId;
use pxlabel_plane::FrameNumber;

/// Broken index invariant found by [`AnnotationRecord::check_indexes`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    /// Frame index entry pointing at a missing record or one of another frame
    #[error("Frame index for frame {frame} points at record {id}, which is not in that frame")]
    StaleFrameEntry { frame: FrameNumber, id: RecordId },

    /// Object index entry pointing at a missing record or another object
    #[error("Object index [{class_index}][{object_index}] points at unrelated record {id}")]
    StaleObjectEntry {
        class_index: usize,
        object_index: usize,
        id: RecordId,
    },

    /// Record listed zero or several times in the frame index
    #[error("Record {id} appears {count} times in the frame index")]
    FrameEntryCount { id: RecordId, count: usize },

    /// Record listed zero or several times in the object index
    #[error("Record {id} appears {count} times in the object index")]
    ObjectEntryCount { id: RecordId, count: usize },
}
