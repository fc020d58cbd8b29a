//! Unit tests for session file formats.
//!
//! These tests cover summary versioning and round trips, and label plane
//! storage in memory and on disk.

mod summary_tests;
