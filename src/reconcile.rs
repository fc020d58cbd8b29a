//! Reconciliation of records with the label plane after a stroke.
//!
//! A stroke that overwrites or erases pixels of existing objects may shrink
//! them or wipe them out entirely. For every touched object the reconciler
//! decides whether its bounding box can still be trusted, rescans it
//! otherwise, and drops records that no longer own any pixel.

use std::collections::HashMap;

use ndarray::{Zip, s};

use crate::model::{ClassId, ObjectId, PixelRect, RecordId};
use crate::record::AnnotationRecord;
use pxlabel_plane::{FrameNumber, LabelPlane};

/// An existing object whose pixels were touched by a stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AffectedObject {
    pub class_id: ClassId,
    pub object_id: ObjectId,
    /// Smallest rectangle covering the touched pixels (not the whole object).
    pub touched: PixelRect,
}

/// Objects touched during one stroke, in the order they were first seen.
#[derive(Debug, Clone, Default)]
pub struct AffectedObjects {
    objects: Vec<AffectedObject>,
    positions: HashMap<(ClassId, ObjectId), usize>,
}

impl AffectedObjects {
    pub fn new() -> Self {
        Self::default()
    }

    /// Note that a pixel of `(class_id, object_id)` was touched.
    pub fn touch(&mut self, class_id: ClassId, object_id: ObjectId, col: usize, row: usize) {
        let pixel = PixelRect::unit(col, row);
        match self.positions.get(&(class_id, object_id)) {
            Some(&index) => {
                let entry = &mut self.objects[index];
                entry.touched = entry.touched.union(&pixel);
            }
            None => {
                self.positions.insert((class_id, object_id), self.objects.len());
                self.objects.push(AffectedObject {
                    class_id,
                    object_id,
                    touched: pixel,
                });
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &AffectedObject> + '_ {
        self.objects.iter()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

/// Outcome counts of one reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReconcileSummary {
    /// Touched strictly inside their box: nothing to rescan.
    pub untouched: usize,
    /// Rescanned and given a (possibly identical) tighter box.
    pub resized: usize,
    /// Fully erased and removed from the record.
    pub removed: usize,
    /// No record for the pair in this frame.
    pub missing: usize,
}

/// Bring the records of `frame` back in line with `plane` after a stroke.
///
/// Records to delete are collected first and removed together at the end, so
/// the ids resolved for the remaining pairs stay valid during the pass.
pub fn reconcile(
    record: &mut AnnotationRecord,
    plane: &LabelPlane,
    frame: FrameNumber,
    affected: &AffectedObjects,
) -> ReconcileSummary {
    let mut summary = ReconcileSummary::default();
    let mut erased: Vec<RecordId> = Vec::new();

    for object in affected.iter() {
        let Some(id) = record.lookup(frame, object.class_id, object.object_id) else {
            log::warn!(
                "No record for class {} object {} in frame {}",
                object.class_id,
                object.object_id,
                frame
            );
            summary.missing += 1;
            continue;
        };
        let Some(original) = record.get(id).map(|o| o.bounding_box) else {
            summary.missing += 1;
            continue;
        };

        // An edit that stays clear of every edge cannot have moved any edge.
        let common = original.intersection(&object.touched);
        if original.strictly_contains(&common) {
            summary.untouched += 1;
            continue;
        }

        // Objects may have holes, so the whole previous extent is rescanned.
        match scan_extent(plane, &original, object.class_id, object.object_id) {
            Some(extent) => {
                record.update_bounding_box(id, extent);
                summary.resized += 1;
            }
            None => erased.push(id),
        }
    }

    summary.removed = record.remove_many(erased);

    if !affected.is_empty() {
        log::debug!(
            "Reconciled {} objects in frame {}: {} untouched, {} resized, {} removed",
            affected.len(),
            frame,
            summary.untouched,
            summary.resized,
            summary.removed
        );
    }
    summary
}

/// Tight bounding box of the pixels labeled `(class_id, object_id)` within
/// `area`, or `None` when there are none. The area is clipped to the plane.
pub fn scan_extent(
    plane: &LabelPlane,
    area: &PixelRect,
    class_id: ClassId,
    object_id: ObjectId,
) -> Option<PixelRect> {
    let bottom = area.bottom.min(plane.height());
    let right = area.right.min(plane.width());
    if area.top >= bottom || area.left >= right {
        return None;
    }

    let window = s![area.top..bottom, area.left..right];
    let classes = plane.classes();
    let object_ids = plane.object_ids();

    // (min_col, min_row, max_col, max_row) relative to the window
    let mut extent: Option<(usize, usize, usize, usize)> = None;
    Zip::indexed(classes.slice(window))
        .and(object_ids.slice(window))
        .for_each(|(row, col), &class, &object| {
            if class != class_id || object != object_id {
                return;
            }
            extent = Some(match extent {
                None => (col, row, col, row),
                Some((min_col, min_row, max_col, max_row)) => (
                    min_col.min(col),
                    min_row.min(row),
                    max_col.max(col),
                    max_row.max(row),
                ),
            });
        });

    extent.map(|(min_col, min_row, max_col, max_row)| {
        PixelRect::from_inclusive(
            area.left + min_col,
            area.top + min_row,
            area.left + max_col,
            area.top + max_row,
        )
    })
}
