//! Annotation object records and their pixel rectangles.

use serde::{Deserialize, Serialize};

use pxlabel_plane::FrameNumber;

/// Class identifier. Classes are numbered from 1; 0 means "no class".
pub type ClassId = i16;

/// Instance identifier within a class.
pub type ObjectId = i32;

/// Storage position of a record in the [`AnnotationRecord`](crate::record::AnnotationRecord).
pub type RecordId = usize;

/// Axis-aligned pixel rectangle.
///
/// `left`/`top` are inclusive, `right`/`bottom` are exclusive, so a single
/// pixel at `(3, 5)` is `{ left: 3, top: 5, right: 4, bottom: 6 }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PixelRect {
    pub left: usize,
    pub top: usize,
    pub right: usize,
    pub bottom: usize,
}

impl PixelRect {
    pub fn new(left: usize, top: usize, right: usize, bottom: usize) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// The 1x1 rectangle covering a single pixel.
    pub fn unit(col: usize, row: usize) -> Self {
        Self::new(col, row, col + 1, row + 1)
    }

    /// Build a rectangle from inclusive min/max pixel coordinates.
    pub fn from_inclusive(min_col: usize, min_row: usize, max_col: usize, max_row: usize) -> Self {
        Self::new(min_col, min_row, max_col + 1, max_row + 1)
    }

    pub fn width(&self) -> usize {
        self.right.saturating_sub(self.left)
    }

    pub fn height(&self) -> usize {
        self.bottom.saturating_sub(self.top)
    }

    pub fn area(&self) -> usize {
        self.width() * self.height()
    }

    /// True when the rectangle covers no pixel.
    pub fn is_empty(&self) -> bool {
        self.right <= self.left || self.bottom <= self.top
    }

    /// Check if a pixel lies inside the rectangle.
    pub fn contains(&self, col: usize, row: usize) -> bool {
        col >= self.left && col < self.right && row >= self.top && row < self.bottom
    }

    /// Smallest rectangle covering both. An empty operand is ignored.
    pub fn union(&self, other: &PixelRect) -> PixelRect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        PixelRect::new(
            self.left.min(other.left),
            self.top.min(other.top),
            self.right.max(other.right),
            self.bottom.max(other.bottom),
        )
    }

    /// Overlap of both rectangles, or an empty rectangle when they are disjoint.
    pub fn intersection(&self, other: &PixelRect) -> PixelRect {
        let rect = PixelRect::new(
            self.left.max(other.left),
            self.top.max(other.top),
            self.right.min(other.right),
            self.bottom.min(other.bottom),
        );
        if rect.is_empty() {
            PixelRect::default()
        } else {
            rect
        }
    }

    /// True when `inner` stays clear of every edge of `self`.
    ///
    /// Touching an edge (or being empty) is not strict containment.
    pub fn strictly_contains(&self, inner: &PixelRect) -> bool {
        !inner.is_empty()
            && inner.left > self.left
            && inner.top > self.top
            && inner.right < self.right
            && inner.bottom < self.bottom
    }
}

/// One annotated object instance in one frame.
///
/// The `(frame, class_id, object_id)` triple identifies the record; the
/// bounding box is the only mutable part once the record exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationObject {
    /// Frame the object was painted in.
    pub frame: FrameNumber,
    /// Class of the object (1-based).
    pub class_id: ClassId,
    /// Instance id within the class; always 0 for uniform classes.
    pub object_id: ObjectId,
    /// Tight bounding box of the object's pixels.
    pub bounding_box: PixelRect,
}

impl AnnotationObject {
    pub fn new(
        frame: FrameNumber,
        class_id: ClassId,
        object_id: ObjectId,
        bounding_box: PixelRect,
    ) -> Self {
        Self {
            frame,
            class_id,
            object_id,
            bounding_box,
        }
    }

    /// Check whether this record describes the given triple.
    #[inline]
    pub fn is(&self, frame: FrameNumber, class_id: ClassId, object_id: ObjectId) -> bool {
        self.frame == frame && self.class_id == class_id && self.object_id == object_id
    }
}
