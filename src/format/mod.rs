//! Saving and loading annotation sessions.
//!
//! A saved session consists of:
//!
//! - **Summary JSON**: the configuration (classes, naming rules) and every
//!   record in storage order, written by [`SessionSummary`]
//! - **Label planes**: one pair of `.npy` arrays per frame (class ids and
//!   object ids), written by [`planes`]
//!
//! Identity images are produced separately by [`crate::export`].

mod error;
pub mod planes;
mod summary;

#[cfg(test)]
mod tests;

pub use error::FormatError;
pub use summary::SessionSummary;
