use crate::FrameNumber;
use crate::error::{PlaneError, Result};
use crate::plane::LabelPlane;

/// Number of frames kept when no explicit length is configured.
pub const DEFAULT_BUFFER_LEN: usize = 100;

/// Ring buffer holding the label planes of the most recent frames.
///
/// Frames are read strictly in order: frame `n + 1` can only be added once
/// frame `n` is the newest. When the buffer is full the oldest frame is
/// evicted and can no longer be reached.
#[derive(Debug, Clone)]
pub struct PlaneBuffer {
    slots: Vec<Option<LabelPlane>>,
    newest: Option<FrameNumber>,
    dimensions: Option<(usize, usize)>,
}

impl PlaneBuffer {
    /// Create an empty buffer. A zero capacity is bumped to one frame.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity.max(1)],
            newest: None,
            dimensions: None,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// `(width, height)` of the planes, once a source has been opened.
    pub fn dimensions(&self) -> Option<(usize, usize)> {
        self.dimensions
    }

    /// Drop every frame and start over with a blank frame 0.
    pub fn reset(&mut self, width: usize, height: usize) {
        self.clear();
        self.dimensions = Some((width, height));
        self.slots[0] = Some(LabelPlane::new(width, height));
        self.newest = Some(0);
        log::debug!(
            "Plane buffer reset to {}x{} ({} frames)",
            width,
            height,
            self.capacity()
        );
    }

    /// Drop every frame, including the dimensions.
    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
        self.newest = None;
        self.dimensions = None;
    }

    /// Append a blank frame after the newest one and return its number.
    ///
    /// Returns `None` when no source has been opened yet.
    pub fn push_frame(&mut self) -> Option<FrameNumber> {
        let (width, height) = self.dimensions?;
        let frame = self.newest.map_or(0, |n| n + 1);
        let slot = frame % self.capacity();
        if self.slots[slot].is_some() && frame >= self.capacity() {
            log::trace!("Evicting frame {} from plane buffer", frame - self.capacity());
        }
        self.slots[slot] = Some(LabelPlane::new(width, height));
        self.newest = Some(frame);
        Some(frame)
    }

    pub fn newest(&self) -> Option<FrameNumber> {
        self.newest
    }

    /// Oldest frame still reachable.
    pub fn oldest(&self) -> Option<FrameNumber> {
        self.newest.map(|n| n.saturating_sub(self.capacity() - 1))
    }

    /// Check whether a frame is currently buffered.
    pub fn holds(&self, frame: FrameNumber) -> bool {
        match (self.oldest(), self.newest) {
            (Some(oldest), Some(newest)) => frame >= oldest && frame <= newest,
            _ => false,
        }
    }

    pub fn get(&self, frame: FrameNumber) -> Option<&LabelPlane> {
        if !self.holds(frame) {
            return None;
        }
        self.slots[frame % self.capacity()].as_ref()
    }

    pub fn get_mut(&mut self, frame: FrameNumber) -> Option<&mut LabelPlane> {
        if !self.holds(frame) {
            return None;
        }
        let slot = frame % self.capacity();
        self.slots[slot].as_mut()
    }

    /// Replace the plane of a buffered frame, e.g. with one loaded from disk.
    pub fn replace(&mut self, frame: FrameNumber, plane: LabelPlane) -> Result<()> {
        let current = self
            .get_mut(frame)
            .ok_or(PlaneError::FrameNotBuffered(frame))?;
        *current = plane;
        Ok(())
    }
}

impl Default for PlaneBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER_LEN)
    }
}
