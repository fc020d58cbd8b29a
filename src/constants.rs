//! Global constants for the pxlabel engine

/// Largest object id a multi-instance class may use.
///
/// The object index grows one slot per id, so ids are capped to keep a single
/// corrupt value from allocating an unbounded index.
pub const MAX_OBJECT_ID: i32 = 1 << 20;

/// Number of digits the frame number is zero-filled to in file names.
pub const FRAME_NUMBER_FILL: usize = 6;

/// Extension used for saved label planes.
pub const PLANE_FILE_EXTENSION: &str = "npy";
