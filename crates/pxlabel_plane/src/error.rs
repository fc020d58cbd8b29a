use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlaneError {
    #[error("Class grid is {classes:?} but object grid is {object_ids:?}")]
    ShapeMismatch {
        classes: (usize, usize),
        object_ids: (usize, usize),
    },

    #[error("Frame {0} is not held by the buffer")]
    FrameNotBuffered(usize),
}

pub type Result<T> = std::result::Result<T, PlaneError>;
