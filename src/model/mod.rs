//! Data models for the annotation engine.

mod class;
mod object;

pub use class::{ClassCatalog, ClassProperty, EncodingPolicy, IdentityRange, default_classes};
pub use object::{AnnotationObject, ClassId, ObjectId, PixelRect, RecordId};
