//! pxlabel - pixel-level annotation engine
//!
//! Users paint (class, object) labels over the frames of an image or video.
//! The engine keeps an indexed record of every annotated object with its
//! bounding box, and keeps that record consistent with the label planes as
//! strokes add or erase pixels.
//!
//! The main entry point is [`AnnotationSession`]. The lower layers can be
//! used directly:
//!
//! - [`record::AnnotationRecord`]: records with frame and object indexes
//! - [`reconcile`]: bounding-box maintenance after a stroke
//! - [`stroke`]: paint and erase over one frame
//! - [`format`] and [`export`]: saving sessions and identity images

pub mod config;
pub mod constants;
pub mod error;
pub mod export;
pub mod format;
pub mod model;
pub mod reconcile;
pub mod record;
pub mod session;
pub mod stroke;

pub use config::{SessionConfig, SourceInfo};
pub use error::{AnnotationError, Result};
pub use model::{AnnotationObject, ClassCatalog, ClassId, ClassProperty, ObjectId, PixelRect};
pub use session::AnnotationSession;

pub use pxlabel_plane::{FrameNumber, LabelPlane, PlaneBuffer};
