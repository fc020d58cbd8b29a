//! Dense per-pixel label planes for the pxlabel annotation engine.
//!
//! Each frame carries two co-registered grids of the same size as the image:
//! a class id (`i16`, 0 = none) and an object id (`i32`) per pixel. The
//! [`PlaneBuffer`] keeps a bounded window of recent frames for video sources.

pub mod buffer;
pub mod error;
pub mod plane;

pub use buffer::{DEFAULT_BUFFER_LEN, PlaneBuffer};
pub use error::{PlaneError, Result};
pub use plane::{CLASS_NONE, LabelPlane, OBJECT_NONE};

/// Index of a frame within an image sequence (0 for still images).
pub type FrameNumber = usize;
