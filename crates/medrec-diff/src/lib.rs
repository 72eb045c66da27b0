//! Diff engine for medrec.
//!
//! Computes structural diffs between entry snapshots, keyed by dotted field
//! path, and line-level renderings of changed free-text fields.
//!
//! # Key Types
//!
//! - [`VersionDiff`] / [`FieldChange`] -- path-keyed structural diff
//! - [`LineDiff`] / [`DiffHunk`] / [`DiffLine`] -- line-level text diff for display

pub mod error;
pub mod text_diff;
pub mod version_diff;

pub use error::{DiffError, DiffResult};
pub use text_diff::{diff_text, word_changes, DiffHunk, DiffLine, LineDiff};
pub use version_diff::{
    compute_diff, deserialize_present, diff_entries, values_equal, FieldChange, VersionDiff,
};
