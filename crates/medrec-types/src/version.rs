use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entry::Entry;
use crate::error::TypeError;
use crate::ids::{EntryId, VersionId};

/// An immutable snapshot of one entry at one edit point.
///
/// Versions are append-only: they are never mutated or deleted. The
/// embedded `entry_data` is present when a version is loaded for preview
/// or restore and omitted from history listings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryVersion {
    pub id: VersionId,
    pub entry_id: EntryId,
    pub editor_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Optional on the wire; ordering and display rely on it being present.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_data: Option<Entry>,
}

impl EntryVersion {
    /// Record the given entry state as a new version.
    pub fn snapshot(
        entry: &Entry,
        editor_id: impl Into<String>,
        change_reason: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: VersionId::new(),
            entry_id: entry.id,
            editor_id: editor_id.into(),
            change_reason,
            created_at: now,
            updated_at: Some(now),
            entry_data: Some(entry.clone()),
        }
    }

    /// A copy without the embedded entry payload, for history listings.
    pub fn summary(&self) -> Self {
        Self {
            entry_data: None,
            ..self.clone()
        }
    }

    /// The update timestamp, or an error if the record lacks one.
    pub fn require_updated_at(&self) -> Result<DateTime<Utc>, TypeError> {
        self.updated_at.ok_or(TypeError::MissingField("updatedAt"))
    }
}

/// Sort versions newest first by `updatedAt`.
///
/// The sort is stable, so callers passing versions in append order should
/// reverse them first to break timestamp ties in favour of the later append.
pub fn sort_newest_first(versions: &mut [EntryVersion]) {
    versions.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
}
