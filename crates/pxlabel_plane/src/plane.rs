use ndarray::{Array2, ArrayView2};

use crate::error::{PlaneError, Result};

/// Class value of an unlabeled pixel.
pub const CLASS_NONE: i16 = 0;

/// Object value written alongside [`CLASS_NONE`].
pub const OBJECT_NONE: i32 = 0;

/// Class and object labels for every pixel of one frame.
///
/// Both grids are stored row-major with shape `(height, width)`. Public
/// accessors take `(col, row)` so callers can think in image coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelPlane {
    classes: Array2<i16>,
    object_ids: Array2<i32>,
}

impl LabelPlane {
    /// Create an unlabeled plane.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            classes: Array2::zeros((height, width)),
            object_ids: Array2::zeros((height, width)),
        }
    }

    /// Build a plane from existing grids, e.g. ones read back from disk.
    pub fn from_arrays(classes: Array2<i16>, object_ids: Array2<i32>) -> Result<Self> {
        if classes.dim() != object_ids.dim() {
            return Err(PlaneError::ShapeMismatch {
                classes: classes.dim(),
                object_ids: object_ids.dim(),
            });
        }
        Ok(Self {
            classes,
            object_ids,
        })
    }

    pub fn width(&self) -> usize {
        self.classes.ncols()
    }

    pub fn height(&self) -> usize {
        self.classes.nrows()
    }

    /// Check whether `(col, row)` lies inside the plane.
    #[inline]
    pub fn contains(&self, col: usize, row: usize) -> bool {
        col < self.width() && row < self.height()
    }

    /// Labels at a pixel, or `None` outside the plane.
    #[inline]
    pub fn get(&self, col: usize, row: usize) -> Option<(i16, i32)> {
        let class_id = *self.classes.get((row, col))?;
        let object_id = *self.object_ids.get((row, col))?;
        Some((class_id, object_id))
    }

    /// Write labels at a pixel. Returns `false` outside the plane.
    #[inline]
    pub fn set(&mut self, col: usize, row: usize, class_id: i16, object_id: i32) -> bool {
        if !self.contains(col, row) {
            return false;
        }
        self.classes[(row, col)] = class_id;
        self.object_ids[(row, col)] = object_id;
        true
    }

    /// Reset a pixel to unlabeled.
    #[inline]
    pub fn clear_pixel(&mut self, col: usize, row: usize) -> bool {
        self.set(col, row, CLASS_NONE, OBJECT_NONE)
    }

    /// Reset every pixel to unlabeled.
    pub fn clear(&mut self) {
        self.classes.fill(CLASS_NONE);
        self.object_ids.fill(OBJECT_NONE);
    }

    pub fn classes(&self) -> ArrayView2<'_, i16> {
        self.classes.view()
    }

    pub fn object_ids(&self) -> ArrayView2<'_, i32> {
        self.object_ids.view()
    }

    /// True when no pixel carries a class.
    pub fn is_blank(&self) -> bool {
        self.classes.iter().all(|&c| c == CLASS_NONE)
    }
}
