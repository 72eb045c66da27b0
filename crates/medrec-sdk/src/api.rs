use async_trait::async_trait;
use medrec_diff::VersionDiff;
use medrec_protocol::RestoreRequest;
use medrec_types::{Entry, EntryId, EntryVersion, PatientId, VersionId, VersionRef};

use crate::error::ClientResult;

/// Entry version history as seen by a client.
#[async_trait]
pub trait VersionApi: Send + Sync {
    /// Version summaries, newest first. An entry without history yields an
    /// empty list rather than an error.
    async fn list_versions(
        &self,
        patient: PatientId,
        entry: EntryId,
    ) -> ClientResult<Vec<EntryVersion>>;

    /// A version including its entry snapshot.
    async fn get_version(
        &self,
        patient: PatientId,
        entry: EntryId,
        version: VersionId,
    ) -> ClientResult<EntryVersion>;

    /// Structural diff from `from` to `to`, computed by the server.
    async fn get_version_diff(
        &self,
        patient: PatientId,
        entry: EntryId,
        from: VersionRef,
        to: VersionRef,
    ) -> ClientResult<VersionDiff>;

    async fn create_version(
        &self,
        patient: PatientId,
        entry: EntryId,
        editor_id: &str,
        change_reason: Option<&str>,
    ) -> ClientResult<EntryVersion>;

    /// Restore `version` as the live entry. Always records a new version.
    async fn restore_version(
        &self,
        patient: PatientId,
        entry: EntryId,
        version: VersionId,
        request: RestoreRequest,
    ) -> ClientResult<Entry>;

    /// The newest version, or `None` without history. A version lacking
    /// `updatedAt` is a [`ClientError::Validation`](crate::ClientError::Validation).
    async fn get_latest_version(
        &self,
        patient: PatientId,
        entry: EntryId,
    ) -> ClientResult<Option<EntryVersion>>;

    async fn get_latest_version_id(
        &self,
        patient: PatientId,
        entry: EntryId,
    ) -> ClientResult<Option<VersionId>> {
        Ok(self
            .get_latest_version(patient, entry)
            .await?
            .map(|version| version.id))
    }
}
