//! Paint and erase strokes over one frame.
//!
//! A stroke writes labels into the frame's [`LabelPlane`], collects the
//! pre-existing objects whose pixels it overwrote, reconciles those, and
//! finally records the painted object. Each call runs to completion; there
//! is no partial stroke.

use ndarray::ArrayView2;

use crate::error::{AnnotationError, Result};
use crate::model::{
    AnnotationObject, ClassCatalog, ClassId, EncodingPolicy, ObjectId, PixelRect, RecordId,
};
use crate::reconcile::{AffectedObjects, ReconcileSummary, reconcile};
use crate::record::AnnotationRecord;
use pxlabel_plane::{CLASS_NONE, FrameNumber, LabelPlane};

#[cfg(test)]
mod tests;

/// Pixels covered by one stroke.
///
/// Cells greater than zero are part of the stroke. The mask is placed with
/// its top-left cell at `(offset_x, offset_y)` in plane coordinates; the
/// offset may be negative and cells falling outside the plane are ignored.
#[derive(Debug, Clone, Copy)]
pub struct StrokeMask<'a> {
    cells: ArrayView2<'a, u8>,
    offset_x: isize,
    offset_y: isize,
}

impl<'a> StrokeMask<'a> {
    pub fn new(cells: ArrayView2<'a, u8>, offset_x: isize, offset_y: isize) -> Self {
        Self {
            cells,
            offset_x,
            offset_y,
        }
    }

    /// A mask placed at the plane origin.
    pub fn at_origin(cells: ArrayView2<'a, u8>) -> Self {
        Self::new(cells, 0, 0)
    }

    /// Plane coordinates `(col, row)` of every set cell inside a
    /// `width` x `height` plane, in row-major order.
    pub fn pixels(&self, width: usize, height: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.cells
            .indexed_iter()
            .filter(|&(_, &cell)| cell > 0)
            .filter_map(move |((row, col), _)| {
                let col = col.checked_add_signed(self.offset_x)?;
                let row = row.checked_add_signed(self.offset_y)?;
                (col < width && row < height).then_some((col, row))
            })
    }
}

/// The frame a stroke is applied to.
pub struct FrameTarget<'a> {
    pub record: &'a mut AnnotationRecord,
    pub plane: &'a mut LabelPlane,
    pub frame: FrameNumber,
}

/// Result of a paint stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaintOutcome {
    /// Record of the painted object (new or extended).
    pub record_id: RecordId,
    /// Object id the pixels were labeled with.
    pub object_id: ObjectId,
    /// Tight box of the pixels written by this stroke alone.
    pub bounding_box: PixelRect,
    /// What happened to the objects the stroke painted over.
    pub reconcile: ReconcileSummary,
}

/// Label the pixels of `mask` with `class_id`.
///
/// For multi-instance classes a stroke starting on a pixel of the same class
/// extends that object; otherwise the first free object id is used. Objects
/// painted over are reconciled before the new record is stored, so the
/// returned record id is valid once this returns.
pub fn paint(
    target: FrameTarget<'_>,
    catalog: &ClassCatalog,
    mask: &StrokeMask<'_>,
    class_id: ClassId,
    start: Option<(usize, usize)>,
) -> Result<PaintOutcome> {
    let FrameTarget {
        record,
        plane,
        frame,
    } = target;

    let property = catalog.get(class_id)?;
    let object_id = match property.encoding {
        EncodingPolicy::Uniform => 0,
        EncodingPolicy::MultiInstance => start
            .and_then(|(col, row)| plane.get(col, row))
            .filter(|&(existing, _)| existing == class_id)
            .map(|(_, existing)| existing)
            .or_else(|| record.first_available_object_id(class_id))
            .ok_or(AnnotationError::ClassOutOfRange {
                class_id,
                count: catalog.len(),
            })?,
    };

    // Nothing is written for a triple the store would refuse.
    record.validate(&AnnotationObject::new(
        frame,
        class_id,
        object_id,
        PixelRect::default(),
    ))?;

    let (width, height) = (plane.width(), plane.height());
    let mut affected = AffectedObjects::new();
    let mut extent: Option<PixelRect> = None;

    for (col, row) in mask.pixels(width, height) {
        if let Some((old_class, old_object)) = plane.get(col, row) {
            if old_class != CLASS_NONE && (old_class, old_object) != (class_id, object_id) {
                affected.touch(old_class, old_object, col, row);
            }
        }
        plane.set(col, row, class_id, object_id);

        let pixel = PixelRect::unit(col, row);
        extent = Some(extent.map_or(pixel, |rect| rect.union(&pixel)));
    }

    let bounding_box = extent.ok_or(AnnotationError::EmptyStroke)?;
    let reconcile = reconcile(record, plane, frame, &affected);
    let record_id =
        record.add_or_update(AnnotationObject::new(frame, class_id, object_id, bounding_box))?;

    log::debug!(
        "Painted class {} object {} in frame {} over {:?} (record {})",
        class_id,
        object_id,
        frame,
        bounding_box,
        record_id
    );

    Ok(PaintOutcome {
        record_id,
        object_id,
        bounding_box,
        reconcile,
    })
}

/// Remove every label under `mask` and reconcile the objects that lost pixels.
pub fn erase(target: FrameTarget<'_>, mask: &StrokeMask<'_>) -> ReconcileSummary {
    let FrameTarget {
        record,
        plane,
        frame,
    } = target;

    let (width, height) = (plane.width(), plane.height());
    let mut affected = AffectedObjects::new();

    for (col, row) in mask.pixels(width, height) {
        if let Some((old_class, old_object)) = plane.get(col, row) {
            if old_class != CLASS_NONE {
                affected.touch(old_class, old_object, col, row);
            }
        }
        plane.clear_pixel(col, row);
    }

    reconcile(record, plane, frame, &affected)
}
