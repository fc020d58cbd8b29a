//! Indexed storage of annotation records.

use crate::constants::MAX_OBJECT_ID;
use crate::error::{AnnotationError, Result};
use crate::model::{AnnotationObject, ClassId, ObjectId, PixelRect, RecordId};
use crate::record::IndexError;
use pxlabel_plane::FrameNumber;

/// Every annotated object of a session, with reverse indexes by frame and by
/// (class, object).
///
/// Records are stored densely; a [`RecordId`] is the record's position in
/// [`records`](Self::records). Both indexes hold positions and are rewritten
/// whenever a removal shifts records down, so an id obtained before a removal
/// of a lower id is stale afterwards. Use [`remove_many`](Self::remove_many)
/// to drop several records at once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationRecord {
    /// All records, in insertion order.
    records: Vec<AnnotationObject>,
    /// frame -> record ids in that frame.
    frames_index: Vec<Vec<RecordId>>,
    /// class - 1 -> object id -> record ids of that object across frames.
    objects_index: Vec<Vec<Vec<RecordId>>>,
    /// Largest accepted class id, `None` for no limit.
    class_capacity: Option<usize>,
}

impl AnnotationRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that rejects class ids above `capacity`.
    pub fn with_class_capacity(capacity: usize) -> Self {
        Self {
            class_capacity: Some(capacity),
            ..Self::default()
        }
    }

    /// Change the largest accepted class id. Existing records are kept.
    pub fn set_class_capacity(&mut self, capacity: Option<usize>) {
        self.class_capacity = capacity;
    }

    pub fn class_capacity(&self) -> Option<usize> {
        self.class_capacity
    }

    /// Rebuild a store from serialized records, in order.
    ///
    /// Records are appended as-is: duplicated triples are not merged, matching
    /// what was saved.
    pub fn from_objects<I>(objects: I) -> Result<Self>
    where
        I: IntoIterator<Item = AnnotationObject>,
    {
        let mut record = Self::new();
        record.replace_all(objects)?;
        Ok(record)
    }

    /// Replace every record with `objects`, keeping the class capacity.
    ///
    /// On error the store is left untouched.
    pub fn replace_all<I>(&mut self, objects: I) -> Result<()>
    where
        I: IntoIterator<Item = AnnotationObject>,
    {
        let mut rebuilt = Self {
            class_capacity: self.class_capacity,
            ..Self::default()
        };
        for object in objects {
            rebuilt.validate(&object)?;
            rebuilt.push_indexed(object);
        }
        log::debug!(
            "Rebuilt annotation record with {} objects over {} frames",
            rebuilt.len(),
            rebuilt.frame_count()
        );
        *self = rebuilt;
        Ok(())
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// All records in storage order.
    pub fn records(&self) -> &[AnnotationObject] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = (RecordId, &AnnotationObject)> + '_ {
        self.records.iter().enumerate()
    }

    pub fn get(&self, id: RecordId) -> Option<&AnnotationObject> {
        self.records.get(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of frames the frame index currently spans.
    pub fn frame_count(&self) -> usize {
        self.frames_index.len()
    }

    /// Record ids belonging to a frame (empty when the frame has none).
    pub fn frame_record_ids(&self, frame: FrameNumber) -> &[RecordId] {
        self.frames_index
            .get(frame)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Record ids of one object across all frames.
    pub fn object_record_ids(&self, class_id: ClassId, object_id: ObjectId) -> &[RecordId] {
        self.object_bucket(class_id, object_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The (class, object) pairs present in a frame, in index order.
    pub fn frame_objects(&self, frame: FrameNumber) -> Vec<(ClassId, ObjectId)> {
        self.frame_record_ids(frame)
            .iter()
            .filter_map(|&id| self.records.get(id))
            .map(|object| (object.class_id, object.object_id))
            .collect()
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// Find the record for a (frame, class, object) triple.
    ///
    /// Scans the frame bucket: frames hold far fewer records than an object
    /// accumulates over a long video.
    pub fn lookup(
        &self,
        frame: FrameNumber,
        class_id: ClassId,
        object_id: ObjectId,
    ) -> Option<RecordId> {
        self.frame_record_ids(frame).iter().copied().find(|&id| {
            self.records
                .get(id)
                .is_some_and(|object| object.is(frame, class_id, object_id))
        })
    }

    /// First object id of a class with no record in any frame.
    ///
    /// Ids vacated by a full removal are handed out again before new ones.
    /// Returns `None` for class ids below 1.
    pub fn first_available_object_id(&self, class_id: ClassId) -> Option<ObjectId> {
        let class_index = class_slot(class_id)?;
        let next = match self.objects_index.get(class_index) {
            None => 0,
            Some(objects) => objects
                .iter()
                .position(Vec::is_empty)
                .unwrap_or(objects.len()),
        };
        ObjectId::try_from(next).ok()
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Insert a record, or grow the bounding box of an existing one.
    ///
    /// A record with the same (frame, class, object) triple is updated with the
    /// union of both boxes and its id is returned; no index grows in that case.
    pub fn add_or_update(&mut self, object: AnnotationObject) -> Result<RecordId> {
        self.validate(&object)?;

        if let Some(id) = self.lookup(object.frame, object.class_id, object.object_id) {
            let merged = self.records[id].bounding_box.union(&object.bounding_box);
            self.records[id].bounding_box = merged;
            log::trace!("Merged object into record {}: {:?}", id, merged);
            return Ok(id);
        }

        let id = self.push_indexed(object);
        log::trace!(
            "New record {} (frame {}, class {}, object {})",
            id,
            object.frame,
            object.class_id,
            object.object_id
        );
        Ok(id)
    }

    /// Replace the bounding box of a record.
    ///
    /// Stale ids are ignored and reported by returning `false`.
    pub fn update_bounding_box(&mut self, id: RecordId, bounding_box: PixelRect) -> bool {
        match self.records.get_mut(id) {
            Some(object) => {
                object.bounding_box = bounding_box;
                true
            }
            None => false,
        }
    }

    /// Remove a record and shift every higher id down by one.
    ///
    /// Out-of-range ids are ignored.
    pub fn remove(&mut self, id: RecordId) -> Option<AnnotationObject> {
        if id >= self.records.len() {
            return None;
        }
        let removed = self.records.remove(id);

        if let Some(bucket) = self.frames_index.get_mut(removed.frame) {
            remove_entry(bucket, id);
        }
        if let Some(bucket) = self.object_bucket_mut(removed.class_id, removed.object_id) {
            remove_entry(bucket, id);
        }

        // Records from `id` onwards moved down one slot; each owns exactly one
        // entry in each index, still holding its old position.
        for position in id..self.records.len() {
            let moved = self.records[position];
            if let Some(bucket) = self.frames_index.get_mut(moved.frame) {
                rewrite_entry(bucket, position + 1, position);
            }
            if let Some(bucket) = self.object_bucket_mut(moved.class_id, moved.object_id) {
                rewrite_entry(bucket, position + 1, position);
            }
        }

        log::debug!(
            "Removed record {} (frame {}, class {}, object {})",
            id,
            removed.frame,
            removed.class_id,
            removed.object_id
        );
        Some(removed)
    }

    /// Remove several records given by their current ids.
    ///
    /// Ids are removed from highest to lowest so that none of them is shifted
    /// before its turn. Duplicates and stale ids are ignored. Returns the
    /// number of records removed.
    pub fn remove_many<I>(&mut self, ids: I) -> usize
    where
        I: IntoIterator<Item = RecordId>,
    {
        let mut ids: Vec<RecordId> = ids.into_iter().collect();
        ids.sort_unstable();
        ids.dedup();
        ids.into_iter()
            .rev()
            .filter(|&id| self.remove(id).is_some())
            .count()
    }

    /// Remove every record of a frame. Returns the number removed.
    pub fn clear_frame(&mut self, frame: FrameNumber) -> usize {
        let ids = self.frame_record_ids(frame).to_vec();
        self.remove_many(ids)
    }

    /// Drop every record and both indexes.
    pub fn clear(&mut self) {
        self.records.clear();
        self.frames_index.clear();
        self.objects_index.clear();
    }

    // ========================================================================
    // Consistency
    // ========================================================================

    /// Verify that each record appears exactly once in each index, at its
    /// own position, and that no index entry points elsewhere.
    pub fn check_indexes(&self) -> std::result::Result<(), IndexError> {
        let mut in_frames = vec![0usize; self.records.len()];
        let mut in_objects = vec![0usize; self.records.len()];

        for (frame, bucket) in self.frames_index.iter().enumerate() {
            for &id in bucket {
                match self.records.get(id) {
                    Some(object) if object.frame == frame => in_frames[id] += 1,
                    _ => return Err(IndexError::StaleFrameEntry { frame, id }),
                }
            }
        }

        for (class_index, objects) in self.objects_index.iter().enumerate() {
            for (object_index, bucket) in objects.iter().enumerate() {
                for &id in bucket {
                    let matches = self.records.get(id).is_some_and(|object| {
                        class_slot(object.class_id) == Some(class_index)
                            && object_slot(object.object_id) == Some(object_index)
                    });
                    if !matches {
                        return Err(IndexError::StaleObjectEntry {
                            class_index,
                            object_index,
                            id,
                        });
                    }
                    in_objects[id] += 1;
                }
            }
        }

        for (id, (&frames, &objects)) in in_frames.iter().zip(&in_objects).enumerate() {
            if frames != 1 {
                return Err(IndexError::FrameEntryCount { id, count: frames });
            }
            if objects != 1 {
                return Err(IndexError::ObjectEntryCount { id, count: objects });
            }
        }
        Ok(())
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Check that `object` fits the class capacity and the object id range.
    pub(crate) fn validate(&self, object: &AnnotationObject) -> Result<()> {
        let out_of_range = || AnnotationError::ClassOutOfRange {
            class_id: object.class_id,
            count: self.class_capacity.unwrap_or(self.objects_index.len()),
        };
        let class_index = class_slot(object.class_id).ok_or_else(out_of_range)?;
        if self
            .class_capacity
            .is_some_and(|capacity| class_index >= capacity)
        {
            return Err(out_of_range());
        }
        if object_slot(object.object_id).is_none() {
            return Err(AnnotationError::ObjectOutOfRange {
                object_id: object.object_id,
            });
        }
        Ok(())
    }

    /// Append a validated record and index it, without looking for a match.
    fn push_indexed(&mut self, object: AnnotationObject) -> RecordId {
        let id = self.records.len();
        self.records.push(object);

        if self.frames_index.len() <= object.frame {
            self.frames_index.resize_with(object.frame + 1, Vec::new);
        }
        self.frames_index[object.frame].push(id);

        // Both slots were checked by `validate`.
        if let (Some(class_index), Some(object_index)) =
            (class_slot(object.class_id), object_slot(object.object_id))
        {
            if self.objects_index.len() <= class_index {
                self.objects_index.resize_with(class_index + 1, Vec::new);
            }
            let objects = &mut self.objects_index[class_index];
            if objects.len() <= object_index {
                objects.resize_with(object_index + 1, Vec::new);
            }
            objects[object_index].push(id);
        }
        id
    }

    fn object_bucket(&self, class_id: ClassId, object_id: ObjectId) -> Option<&Vec<RecordId>> {
        self.objects_index
            .get(class_slot(class_id)?)?
            .get(object_slot(object_id)?)
    }

    fn object_bucket_mut(
        &mut self,
        class_id: ClassId,
        object_id: ObjectId,
    ) -> Option<&mut Vec<RecordId>> {
        self.objects_index
            .get_mut(class_slot(class_id)?)?
            .get_mut(object_slot(object_id)?)
    }
}

/// Position of a class in the object index (classes start at 1).
fn class_slot(class_id: ClassId) -> Option<usize> {
    usize::try_from(class_id).ok()?.checked_sub(1)
}

/// Position of an object id in a class's object list.
fn object_slot(object_id: ObjectId) -> Option<usize> {
    if object_id > MAX_OBJECT_ID {
        return None;
    }
    usize::try_from(object_id).ok()
}

fn remove_entry(bucket: &mut Vec<RecordId>, id: RecordId) {
    if let Some(pos) = bucket.iter().position(|&entry| entry == id) {
        bucket.remove(pos);
    }
}

fn rewrite_entry(bucket: &mut [RecordId], from: RecordId, to: RecordId) {
    if let Some(entry) = bucket.iter_mut().find(|entry| **entry == from) {
        *entry = to;
    }
}
