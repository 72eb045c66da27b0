//! Conflict detection for medrec.
//!
//! Compares two structural diffs that share a base to find fields edited
//! independently on both sides. Conflicts are a display concept: nothing
//! here merges or patches entries.

pub mod conflict;

pub use conflict::{find_conflicts, three_way, ConflictMarker, ThreeWayDiff};
