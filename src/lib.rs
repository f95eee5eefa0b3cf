//! Line-range engine for partial commits and discards of unified-diff hunks.
//!
//! [`hunks`] turns hunk text and a selection of lines into the hunk headers
//! a patch-applying backend understands, and answers containment and lock
//! questions about hunks. [`selection`] builds per-file commit payloads on
//! top of it.

pub mod config;
pub mod hunks;
pub mod logging;
pub mod selection;
