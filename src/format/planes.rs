//! Label plane storage as NumPy arrays.
//!
//! Each frame is stored as two `.npy` files next to each other:
//! `<frame>_classes.npy` (int16) and `<frame>_objects.npy` (int32), both of
//! shape `(height, width)`.

use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor, Read, Write};
use std::path::{Path, PathBuf};

use ndarray::Array2;
use ndarray_npy::{ReadNpyExt, WriteNpyExt};

use crate::constants::{FRAME_NUMBER_FILL, PLANE_FILE_EXTENSION};
use crate::format::error::FormatError;
use pxlabel_plane::{FrameNumber, LabelPlane};

/// Paths of the class and object arrays of `frame` inside `dir`.
pub fn plane_paths(dir: &Path, frame: FrameNumber) -> (PathBuf, PathBuf) {
    let stem = format!("{:0width$}", frame, width = FRAME_NUMBER_FILL);
    (
        dir.join(format!("{stem}_classes.{PLANE_FILE_EXTENSION}")),
        dir.join(format!("{stem}_objects.{PLANE_FILE_EXTENSION}")),
    )
}

/// Write both arrays of a plane.
pub fn write_plane<W1: Write, W2: Write>(
    plane: &LabelPlane,
    classes: W1,
    object_ids: W2,
) -> Result<(), FormatError> {
    plane.classes().write_npy(classes)?;
    plane.object_ids().write_npy(object_ids)?;
    Ok(())
}

/// Read a plane back from its two arrays.
pub fn read_plane<R1: Read, R2: Read>(classes: R1, object_ids: R2) -> Result<LabelPlane, FormatError> {
    let classes = Array2::<i16>::read_npy(classes)?;
    let object_ids = Array2::<i32>::read_npy(object_ids)?;
    Ok(LabelPlane::from_arrays(classes, object_ids)?)
}

/// Encode a plane to in-memory `.npy` buffers.
pub fn plane_to_bytes(plane: &LabelPlane) -> Result<(Vec<u8>, Vec<u8>), FormatError> {
    let mut classes = Vec::new();
    let mut object_ids = Vec::new();
    write_plane(plane, &mut classes, &mut object_ids)?;
    Ok((classes, object_ids))
}

/// Decode a plane from in-memory `.npy` buffers.
pub fn plane_from_bytes(classes: &[u8], object_ids: &[u8]) -> Result<LabelPlane, FormatError> {
    read_plane(Cursor::new(classes), Cursor::new(object_ids))
}

/// Store the plane of `frame` in `dir`, creating it if needed.
pub fn save_plane(dir: &Path, frame: FrameNumber, plane: &LabelPlane) -> Result<(), FormatError> {
    std::fs::create_dir_all(dir)?;
    let (classes_path, objects_path) = plane_paths(dir, frame);
    let mut classes = BufWriter::new(File::create(&classes_path)?);
    let mut object_ids = BufWriter::new(File::create(&objects_path)?);
    write_plane(plane, &mut classes, &mut object_ids)?;
    classes.flush()?;
    object_ids.flush()?;
    log::debug!("Saved plane of frame {} to {:?}", frame, dir);
    Ok(())
}

/// Whether both arrays of `frame` exist in `dir`.
pub fn has_plane(dir: &Path, frame: FrameNumber) -> bool {
    let (classes_path, objects_path) = plane_paths(dir, frame);
    classes_path.is_file() && objects_path.is_file()
}

/// Load the plane of `frame` from `dir`.
pub fn load_plane(dir: &Path, frame: FrameNumber) -> Result<LabelPlane, FormatError> {
    if !has_plane(dir, frame) {
        return Err(FormatError::PlaneNotFound {
            dir: dir.to_path_buf(),
            frame,
        });
    }
    let (classes_path, objects_path) = plane_paths(dir, frame);
    let plane = read_plane(
        BufReader::new(File::open(classes_path)?),
        BufReader::new(File::open(objects_path)?),
    )?;
    log::debug!(
        "Loaded {}x{} plane of frame {} from {:?}",
        plane.width(),
        plane.height(),
        frame,
        dir
    );
    Ok(plane)
}
