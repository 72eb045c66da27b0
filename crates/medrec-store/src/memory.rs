use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use medrec_types::{
    sort_newest_first, Diagnosis, Entry, EntryId, EntryVersion, NewEntry, NewPatient, Patient,
    PatientId, VersionId, VersionRef,
};

use crate::error::{StoreError, StoreResult};
use crate::seed::SeedData;
use crate::traits::{PatientStore, VersionStore};

/// In-memory store, suitable for development and testing.
///
/// All data lives behind a single `RwLock`. Writes are serialised; there is
/// no optimistic concurrency check between readers and later writers.
pub struct InMemoryStore {
    inner: RwLock<StoreState>,
}

#[derive(Default)]
struct StoreState {
    patients: Vec<Patient>,
    diagnoses: Vec<Diagnosis>,
    /// Versions per entry, in append order.
    versions: HashMap<EntryId, Vec<EntryVersion>>,
}

impl StoreState {
    fn patient(&self, id: &PatientId) -> StoreResult<&Patient> {
        self.patients
            .iter()
            .find(|p| p.id == *id)
            .ok_or(StoreError::PatientNotFound(*id))
    }

    fn patient_mut(&mut self, id: &PatientId) -> StoreResult<&mut Patient> {
        self.patients
            .iter_mut()
            .find(|p| p.id == *id)
            .ok_or(StoreError::PatientNotFound(*id))
    }

    fn entry(&self, patient: &PatientId, entry: &EntryId) -> StoreResult<&Entry> {
        self.patient(patient)?
            .entries
            .iter()
            .find(|e| e.id == *entry)
            .ok_or(StoreError::EntryNotFound {
                patient: *patient,
                entry: *entry,
            })
    }

    fn entry_mut(&mut self, patient: &PatientId, entry: &EntryId) -> StoreResult<&mut Entry> {
        self.patient_mut(patient)?
            .entries
            .iter_mut()
            .find(|e| e.id == *entry)
            .ok_or(StoreError::EntryNotFound {
                patient: *patient,
                entry: *entry,
            })
    }

    fn version(&self, entry: &EntryId, version: &VersionId) -> StoreResult<&EntryVersion> {
        self.versions
            .get(entry)
            .and_then(|history| history.iter().find(|v| v.id == *version))
            .ok_or(StoreError::VersionNotFound {
                entry: *entry,
                version: *version,
            })
    }
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(StoreState::default()),
        }
    }

    /// Create a store pre-populated with seed data. Seeded entries start
    /// without history.
    pub fn from_seed(seed: SeedData) -> Self {
        tracing::debug!(
            patients = seed.patients.len(),
            diagnoses = seed.diagnoses.len(),
            "seeding in-memory store"
        );
        Self {
            inner: RwLock::new(StoreState {
                patients: seed.patients,
                diagnoses: seed.diagnoses,
                versions: HashMap::new(),
            }),
        }
    }

    /// Total number of recorded versions across all entries.
    pub fn version_count(&self) -> StoreResult<usize> {
        Ok(self.read()?.versions.values().map(Vec::len).sum())
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, StoreState>> {
        self.inner.read().map_err(|_| StoreError::LockPoisoned)
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, StoreState>> {
        self.inner.write().map_err(|_| StoreError::LockPoisoned)
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PatientStore for InMemoryStore {
    fn list_patients(&self) -> StoreResult<Vec<Patient>> {
        Ok(self.read()?.patients.clone())
    }

    fn get_patient(&self, patient: &PatientId) -> StoreResult<Patient> {
        self.read()?.patient(patient).cloned()
    }

    fn add_patient(&self, patient: NewPatient) -> StoreResult<Patient> {
        patient.validate()?;
        let patient = patient.into_patient();
        self.write()?.patients.push(patient.clone());
        tracing::debug!(patient = %patient.id, "patient added");
        Ok(patient)
    }

    fn add_entry(&self, patient: &PatientId, entry: NewEntry) -> StoreResult<Entry> {
        entry.validate()?;
        let entry = entry.into_entry(Utc::now());
        self.write()?.patient_mut(patient)?.entries.push(entry.clone());
        tracing::debug!(%patient, entry = %entry.id, kind = %entry.kind(), "entry added");
        Ok(entry)
    }

    fn get_entry(&self, patient: &PatientId, entry: &EntryId) -> StoreResult<Entry> {
        self.read()?.entry(patient, entry).cloned()
    }

    fn update_entry(
        &self,
        patient: &PatientId,
        entry: &EntryId,
        content: NewEntry,
    ) -> StoreResult<Entry> {
        content.validate()?;
        let mut state = self.write()?;
        let live = state.entry_mut(patient, entry)?;
        if live.kind() != content.kind() {
            return Err(StoreError::TypeMismatch {
                entry: *entry,
                expected: live.kind(),
                actual: content.kind(),
            });
        }
        *live = live.with_content(content, Utc::now());
        tracing::debug!(%patient, %entry, "entry updated");
        Ok(live.clone())
    }

    fn list_diagnoses(&self) -> StoreResult<Vec<Diagnosis>> {
        Ok(self.read()?.diagnoses.clone())
    }
}

impl VersionStore for InMemoryStore {
    fn list_versions(
        &self,
        patient: &PatientId,
        entry: &EntryId,
    ) -> StoreResult<Vec<EntryVersion>> {
        let state = self.read()?;
        state.entry(patient, entry)?;

        let mut versions: Vec<EntryVersion> = state
            .versions
            .get(entry)
            .map(|history| history.iter().rev().map(EntryVersion::summary).collect())
            .unwrap_or_default();
        sort_newest_first(&mut versions);
        Ok(versions)
    }

    fn get_version(
        &self,
        patient: &PatientId,
        entry: &EntryId,
        version: &VersionId,
    ) -> StoreResult<EntryVersion> {
        let state = self.read()?;
        state.entry(patient, entry)?;
        state.version(entry, version).cloned()
    }

    fn create_version(
        &self,
        patient: &PatientId,
        entry: &EntryId,
        editor_id: &str,
        change_reason: Option<String>,
    ) -> StoreResult<EntryVersion> {
        let mut state = self.write()?;
        let live = state.entry(patient, entry)?;
        let version = EntryVersion::snapshot(live, editor_id, change_reason, Utc::now());
        state
            .versions
            .entry(*entry)
            .or_default()
            .push(version.clone());
        tracing::debug!(%entry, version = %version.id, editor = editor_id, "version recorded");
        Ok(version)
    }

    fn restore_version(
        &self,
        patient: &PatientId,
        entry: &EntryId,
        version: &VersionId,
        editor_id: &str,
        change_reason: Option<String>,
    ) -> StoreResult<Entry> {
        let mut state = self.write()?;
        state.entry(patient, entry)?;
        let snapshot = state
            .version(entry, version)?
            .entry_data
            .clone()
            .ok_or(StoreError::MissingSnapshot(*version))?;

        let now = Utc::now();
        let live = state.entry_mut(patient, entry)?;
        if live.kind() != snapshot.kind() {
            return Err(StoreError::TypeMismatch {
                entry: *entry,
                expected: live.kind(),
                actual: snapshot.kind(),
            });
        }
        *live = live.restored_from(&snapshot, now);
        let restored = live.clone();

        let reason = change_reason.unwrap_or_else(|| format!("Restored from version {version}"));
        let record = EntryVersion::snapshot(&restored, editor_id, Some(reason), now);
        tracing::debug!(%entry, from = %version, version = %record.id, "version restored");
        state.versions.entry(*entry).or_default().push(record);
        Ok(restored)
    }

    fn resolve_snapshot(
        &self,
        patient: &PatientId,
        entry: &EntryId,
        reference: &VersionRef,
    ) -> StoreResult<Entry> {
        let state = self.read()?;
        let live = state.entry(patient, entry)?;
        match reference {
            VersionRef::Current => Ok(live.clone()),
            VersionRef::Version(id) => state
                .version(entry, id)?
                .entry_data
                .clone()
                .ok_or(StoreError::MissingSnapshot(*id)),
        }
    }
}
