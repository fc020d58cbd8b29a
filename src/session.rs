//! Annotation session: one opened image or video and everything drawn on it.

use std::path::PathBuf;

use crate::config::{SessionConfig, SourceInfo};
use crate::error::{AnnotationError, Result};
use crate::export::save_identity_image;
use crate::format::{FormatError, SessionSummary, planes};
use crate::model::{AnnotationObject, ClassCatalog, ClassId, ClassProperty, RecordId};
use crate::reconcile::ReconcileSummary;
use crate::record::AnnotationRecord;
use crate::stroke::{self, FrameTarget, PaintOutcome, StrokeMask};
use pxlabel_plane::{CLASS_NONE, FrameNumber, LabelPlane, PlaneBuffer};

/// State of the file being annotated.
///
/// The session owns the class catalog, the record store and the label planes
/// of the buffered frames. Strokes always apply to the current frame.
#[derive(Debug, Clone)]
pub struct AnnotationSession {
    catalog: ClassCatalog,
    record: AnnotationRecord,
    planes: PlaneBuffer,
    current_frame: FrameNumber,
    source: Option<SourceInfo>,
    /// Save the current state before leaving a frame, with these settings.
    auto_save: Option<SessionConfig>,
}

impl AnnotationSession {
    /// Create a session with no file opened.
    pub fn new(catalog: ClassCatalog, buffer_len: usize) -> Self {
        let record = AnnotationRecord::with_class_capacity(catalog.len());
        Self {
            catalog,
            record,
            planes: PlaneBuffer::new(buffer_len),
            current_frame: 0,
            source: None,
            auto_save: None,
        }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(config.catalog(), config.buffer_len)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn catalog(&self) -> &ClassCatalog {
        &self.catalog
    }

    pub fn record(&self) -> &AnnotationRecord {
        &self.record
    }

    pub fn source(&self) -> Option<&SourceInfo> {
        self.source.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.source.is_some()
    }

    pub fn current_frame(&self) -> FrameNumber {
        self.current_frame
    }

    /// Label plane of a buffered frame.
    pub fn plane(&self, frame: FrameNumber) -> Option<&LabelPlane> {
        self.planes.get(frame)
    }

    pub fn current_plane(&self) -> Option<&LabelPlane> {
        self.planes.get(self.current_frame)
    }

    /// Register a new class. The store accepts it right away.
    pub fn add_class(&mut self, property: ClassProperty) -> ClassId {
        log::info!("Adding class '{}' ({})", property.name, property.encoding.name());
        let class_id = self.catalog.add_class(property);
        self.record.set_class_capacity(Some(self.catalog.len()));
        class_id
    }

    // ========================================================================
    // File lifecycle
    // ========================================================================

    /// Start annotating a new image or video of `width` x `height` pixels.
    ///
    /// Records of a previously opened file are dropped.
    pub fn open(&mut self, source: SourceInfo, width: usize, height: usize) {
        log::info!(
            "Opening {}{} ({}x{})",
            source.directory,
            source.file_name,
            width,
            height
        );
        self.record.clear();
        self.planes.reset(width, height);
        self.current_frame = 0;
        self.source = Some(source);
    }

    /// Drop the opened file, its records and its planes.
    pub fn close(&mut self) {
        if let Some(source) = self.source.take() {
            log::info!("Closing {}{}", source.directory, source.file_name);
        }
        self.record.clear();
        self.planes.clear();
        self.current_frame = 0;
    }

    /// Save the current state, then drop the opened file.
    ///
    /// The session stays open when saving fails.
    pub fn close_and_save(
        &mut self,
        config: &SessionConfig,
    ) -> std::result::Result<(), FormatError> {
        self.save_current_state(config)?;
        self.close();
        Ok(())
    }

    /// Save before every frame change, or stop doing so with `None`.
    pub fn set_auto_save(&mut self, config: Option<SessionConfig>) {
        self.auto_save = config;
    }

    /// Write the summary, and the identity image and label planes of the
    /// current frame, where `config`'s naming rules place them.
    ///
    /// Does nothing when no file is open.
    pub fn save_current_state(
        &self,
        config: &SessionConfig,
    ) -> std::result::Result<(), FormatError> {
        let Some(source) = &self.source else {
            log::debug!("No file open, nothing to save");
            return Ok(());
        };

        let summary_path = PathBuf::from(config.naming.summary_file_name(source));
        SessionSummary::capture(self, config).save(&summary_path)?;

        let frame = self.current_frame;
        if let Some(plane) = self.current_plane() {
            let image_path = PathBuf::from(config.naming.image_file_name(source, frame));
            save_identity_image(&image_path, &self.catalog, &self.record, plane, frame)?;
            if let Some(dir) = image_path.parent() {
                planes::save_plane(dir, frame, plane)?;
            }
        }
        Ok(())
    }

    fn save_before_leaving(&self) {
        let Some(config) = &self.auto_save else {
            return;
        };
        if let Err(e) = self.save_current_state(config) {
            log::warn!("Failed to save frame {}: {}", self.current_frame, e);
        }
    }

    /// Rebuild the record store from saved records.
    ///
    /// On error the current records are left untouched.
    pub fn load_records<I>(&mut self, objects: I) -> Result<()>
    where
        I: IntoIterator<Item = AnnotationObject>,
    {
        self.record.replace_all(objects)?;
        log::info!(
            "Loaded {} records over {} frames",
            self.record.len(),
            self.record.frame_count()
        );
        Ok(())
    }

    /// Install a stored label plane for a buffered frame.
    pub fn replace_plane(&mut self, frame: FrameNumber, plane: LabelPlane) -> Result<()> {
        self.planes
            .replace(frame, plane)
            .map_err(|_| AnnotationError::NoFrame { frame })
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// Move to the following frame.
    ///
    /// Inside the buffer this only moves the cursor; at the newest frame a new
    /// blank plane is appended, evicting the oldest one if the buffer is full.
    /// Returns `false` when no file is open.
    pub fn next_frame(&mut self) -> bool {
        if self.source.is_none() {
            return false;
        }
        self.save_before_leaving();
        match self.planes.newest() {
            Some(newest) if self.current_frame < newest => {
                self.current_frame += 1;
                true
            }
            _ => match self.planes.push_frame() {
                Some(frame) => {
                    self.current_frame = frame;
                    true
                }
                None => false,
            },
        }
    }

    /// Jump to a frame still held in the buffer.
    pub fn goto_frame(&mut self, frame: FrameNumber) -> bool {
        if !self.planes.holds(frame) {
            log::debug!("Frame {} is not buffered", frame);
            return false;
        }
        self.save_before_leaving();
        self.current_frame = frame;
        true
    }

    /// Whether the previous frame is still buffered.
    pub fn can_go_previous(&self) -> bool {
        self.planes
            .oldest()
            .is_some_and(|oldest| self.current_frame > oldest)
    }

    pub fn previous_frame(&mut self) -> bool {
        self.can_go_previous() && self.goto_frame(self.current_frame - 1)
    }

    // ========================================================================
    // Strokes
    // ========================================================================

    /// Paint `mask` with `class_id` on the current frame.
    pub fn paint(
        &mut self,
        mask: &StrokeMask<'_>,
        class_id: ClassId,
        start: Option<(usize, usize)>,
    ) -> Result<PaintOutcome> {
        let frame = self.current_frame;
        let plane = self
            .planes
            .get_mut(frame)
            .ok_or(AnnotationError::NoFrame { frame })?;
        let target = FrameTarget {
            record: &mut self.record,
            plane,
            frame,
        };
        stroke::paint(target, &self.catalog, mask, class_id, start)
    }

    /// Erase every label under `mask` on the current frame.
    pub fn erase(&mut self, mask: &StrokeMask<'_>) -> Result<ReconcileSummary> {
        let frame = self.current_frame;
        let plane = self
            .planes
            .get_mut(frame)
            .ok_or(AnnotationError::NoFrame { frame })?;
        let target = FrameTarget {
            record: &mut self.record,
            plane,
            frame,
        };
        Ok(stroke::erase(target, mask))
    }

    /// Wipe the current frame: its labels and its records.
    pub fn clear_current_frame(&mut self) -> usize {
        if let Some(plane) = self.planes.get_mut(self.current_frame) {
            plane.clear();
        }
        let removed = self.record.clear_frame(self.current_frame);
        log::info!("Cleared frame {} ({} objects)", self.current_frame, removed);
        removed
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Record of the object under a pixel of the current frame.
    pub fn object_at(&self, col: usize, row: usize) -> Option<RecordId> {
        let (class_id, object_id) = self.current_plane()?.get(col, row)?;
        if class_id == CLASS_NONE {
            return None;
        }
        self.record.lookup(self.current_frame, class_id, object_id)
    }

    /// Records of a frame, in index order.
    pub fn frame_contents(&self, frame: FrameNumber) -> Vec<&AnnotationObject> {
        self.record
            .frame_record_ids(frame)
            .iter()
            .filter_map(|&id| self.record.get(id))
            .collect()
    }
}

impl Default for AnnotationSession {
    fn default() -> Self {
        Self::from_config(&SessionConfig::default())
    }
}
