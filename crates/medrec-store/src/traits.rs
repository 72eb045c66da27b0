use medrec_types::{
    Diagnosis, Entry, EntryId, EntryVersion, NewEntry, NewPatient, Patient, PatientId, VersionId,
    VersionRef,
};

use crate::error::StoreResult;

/// Live patient records.
///
/// Every entry operation is scoped by patient: an entry id that exists but
/// belongs to another patient is reported as not found.
pub trait PatientStore: Send + Sync {
    /// All patients, in insertion order.
    fn list_patients(&self) -> StoreResult<Vec<Patient>>;

    fn get_patient(&self, patient: &PatientId) -> StoreResult<Patient>;

    /// Validate and insert a new patient with no entries.
    fn add_patient(&self, patient: NewPatient) -> StoreResult<Patient>;

    /// Validate and append a new entry to a patient's record.
    fn add_entry(&self, patient: &PatientId, entry: NewEntry) -> StoreResult<Entry>;

    fn get_entry(&self, patient: &PatientId, entry: &EntryId) -> StoreResult<Entry>;

    /// Replace an entry's content, keeping its id and `createdAt`.
    ///
    /// The entry type must not change. This does not record a version;
    /// callers snapshot with [`VersionStore::create_version`].
    fn update_entry(
        &self,
        patient: &PatientId,
        entry: &EntryId,
        content: NewEntry,
    ) -> StoreResult<Entry>;

    fn list_diagnoses(&self) -> StoreResult<Vec<Diagnosis>>;
}

/// Append-only version history per entry.
pub trait VersionStore: Send + Sync {
    /// Version summaries (no `entryData`), newest first by `updatedAt`,
    /// ties broken in favour of the later append. Empty when the entry has
    /// no history.
    fn list_versions(&self, patient: &PatientId, entry: &EntryId)
        -> StoreResult<Vec<EntryVersion>>;

    /// A single version including its entry snapshot.
    fn get_version(
        &self,
        patient: &PatientId,
        entry: &EntryId,
        version: &VersionId,
    ) -> StoreResult<EntryVersion>;

    /// Snapshot the live entry as a new version.
    fn create_version(
        &self,
        patient: &PatientId,
        entry: &EntryId,
        editor_id: &str,
        change_reason: Option<String>,
    ) -> StoreResult<EntryVersion>;

    /// Make a recorded version the live entry and append a version
    /// recording the restore.
    ///
    /// The live entry keeps its id and `createdAt`; `updatedAt` becomes
    /// now. Without a reason the new version says
    /// `Restored from version <id>`.
    fn restore_version(
        &self,
        patient: &PatientId,
        entry: &EntryId,
        version: &VersionId,
        editor_id: &str,
        change_reason: Option<String>,
    ) -> StoreResult<Entry>;

    /// The newest version summary, if any.
    fn latest_version(
        &self,
        patient: &PatientId,
        entry: &EntryId,
    ) -> StoreResult<Option<EntryVersion>> {
        Ok(self.list_versions(patient, entry)?.into_iter().next())
    }

    /// Entry snapshot addressed by a [`VersionRef`]: the live entry for
    /// `Current`, the recorded data otherwise.
    fn resolve_snapshot(
        &self,
        patient: &PatientId,
        entry: &EntryId,
        reference: &VersionRef,
    ) -> StoreResult<Entry>;
}
