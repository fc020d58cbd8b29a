//! Identity images: one color per annotated object.
//!
//! Uniform classes are painted with the low end of their identity range.
//! Multi-instance classes encode the object id as a mixed-radix number whose
//! digits are the per-channel offsets from the low end, the radix of each
//! channel being the width of its range. Ids beyond the range capacity wrap.

use std::collections::HashMap;
use std::path::Path;

use image::{Rgb, RgbImage};
use ndarray::Zip;

use crate::format::FormatError;
use crate::model::{ClassCatalog, ClassId, ClassProperty, EncodingPolicy, ObjectId};
use crate::record::AnnotationRecord;
use pxlabel_plane::{FrameNumber, LabelPlane};

/// Identity color of an object of class `property`.
pub fn identity_color(property: &ClassProperty, object_id: ObjectId) -> [u8; 3] {
    let range = &property.identity_range;
    match property.encoding {
        EncodingPolicy::Uniform => range.min,
        EncodingPolicy::MultiInstance => {
            let mut remaining = u32::try_from(object_id).unwrap_or_default();
            let mut color = range.min;
            for (channel, value) in color.iter_mut().enumerate() {
                let radix = u32::from(range.max[channel].saturating_sub(range.min[channel])) + 1;
                let digit = remaining % radix;
                remaining /= radix;
                *value = value.saturating_add(digit as u8);
            }
            color
        }
    }
}

/// Render the identity image of `frame`.
///
/// Pixels without a label, or whose object has no record in `frame`, are
/// black.
pub fn render_identity_image(
    catalog: &ClassCatalog,
    record: &AnnotationRecord,
    plane: &LabelPlane,
    frame: FrameNumber,
) -> Result<RgbImage, FormatError> {
    let colors: HashMap<(ClassId, ObjectId), [u8; 3]> = record
        .frame_objects(frame)
        .into_iter()
        .filter_map(|(class_id, object_id)| {
            let property = catalog.get(class_id).ok()?;
            Some(((class_id, object_id), identity_color(property, object_id)))
        })
        .collect();

    let width = u32::try_from(plane.width())
        .map_err(|_| FormatError::invalid_format("plane too wide for an image"))?;
    let height = u32::try_from(plane.height())
        .map_err(|_| FormatError::invalid_format("plane too tall for an image"))?;
    let mut image = RgbImage::new(width, height);

    Zip::indexed(plane.classes())
        .and(plane.object_ids())
        .for_each(|(row, col), &class_id, &object_id| {
            if let Some(&color) = colors.get(&(class_id, object_id)) {
                // Both fit in u32: the image was created with these dimensions
                image.put_pixel(col as u32, row as u32, Rgb(color));
            }
        });

    Ok(image)
}

/// Render the identity image of `frame` and write it to `path` as PNG.
pub fn save_identity_image(
    path: &Path,
    catalog: &ClassCatalog,
    record: &AnnotationRecord,
    plane: &LabelPlane,
    frame: FrameNumber,
) -> Result<(), FormatError> {
    let image = render_identity_image(catalog, record, plane, frame)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    image.save_with_format(path, image::ImageFormat::Png)?;
    log::info!("Saved identity image of frame {} to {:?}", frame, path);
    Ok(())
}
