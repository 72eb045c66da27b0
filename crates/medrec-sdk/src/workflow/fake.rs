//! In-process [`VersionApi`] for workflow tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use medrec_diff::VersionDiff;
use medrec_protocol::RestoreRequest;
use medrec_types::{
    Entry, EntryDetails, EntryId, EntryVersion, HealthCheckRating, NewEntry, PatientId, VersionId,
    VersionRef,
};
use tokio::sync::oneshot;

use super::EntryTarget;
use crate::api::VersionApi;
use crate::error::{ClientError, ClientResult};

pub(crate) fn target() -> EntryTarget {
    EntryTarget::new(
        "01890a5d-ac96-774b-bcce-b302099a8057".parse::<PatientId>().unwrap(),
        "01890a5d-ac96-774b-bcce-b302099a8058".parse::<EntryId>().unwrap(),
    )
}

pub(crate) fn entry(rating: HealthCheckRating) -> Entry {
    NewEntry {
        description: "Yearly control visit".into(),
        date: "2019-10-20".parse().unwrap(),
        specialist: "MD House".into(),
        diagnosis_codes: None,
        details: EntryDetails::HealthCheck {
            health_check_rating: rating,
        },
    }
    .into_entry(Utc::now())
}

pub(crate) fn version(target: EntryTarget) -> EntryVersion {
    let mut data = entry(HealthCheckRating::Healthy);
    data.id = target.entry;
    EntryVersion::snapshot(&data, "house", None, Utc::now())
}

fn copy_error(e: &ClientError) -> ClientError {
    match e {
        ClientError::Network(m) => ClientError::Network(m.clone()),
        ClientError::Api {
            status,
            code,
            message,
        } => ClientError::Api {
            status: *status,
            code: code.clone(),
            message: message.clone(),
        },
        ClientError::Validation(m) => ClientError::Validation(m.clone()),
        ClientError::Decode(m) => ClientError::Decode(m.clone()),
        ClientError::Config(m) => ClientError::Config(m.clone()),
    }
}

type DiffGate = oneshot::Receiver<ClientResult<VersionDiff>>;
type VersionGate = oneshot::Receiver<ClientResult<EntryVersion>>;

/// Scripted responses. Diff, preview and restore requests can be held on a gate so
/// tests decide the order in which responses arrive.
#[derive(Default)]
pub(crate) struct FakeApi {
    versions: Mutex<Vec<EntryVersion>>,
    failure: Mutex<Option<ClientError>>,
    diffs: Mutex<HashMap<(VersionRef, VersionRef), VersionDiff>>,
    diff_gates: Mutex<HashMap<VersionRef, DiffGate>>,
    version_gates: Mutex<HashMap<VersionId, VersionGate>>,
    restore_gates: Mutex<HashMap<VersionId, oneshot::Receiver<()>>>,
    restored: Mutex<Vec<(VersionId, RestoreRequest)>>,
}

impl FakeApi {
    pub(crate) fn set_versions(&self, versions: Vec<EntryVersion>) {
        *self.versions.lock().unwrap() = versions;
    }

    /// Make every call fail with `error` until cleared.
    pub(crate) fn fail_with(&self, error: ClientError) {
        *self.failure.lock().unwrap() = Some(error);
    }

    pub(crate) fn clear_failure(&self) {
        *self.failure.lock().unwrap() = None;
    }

    pub(crate) fn set_diff(&self, from: VersionRef, to: VersionRef, diff: VersionDiff) {
        self.diffs.lock().unwrap().insert((from, to), diff);
    }

    /// Hold diffs requested from `from` until the returned sender fires.
    pub(crate) fn gate_diff(&self, from: VersionRef) -> oneshot::Sender<ClientResult<VersionDiff>> {
        let (tx, rx) = oneshot::channel();
        self.diff_gates.lock().unwrap().insert(from, rx);
        tx
    }

    pub(crate) fn gate_version(
        &self,
        version: VersionId,
    ) -> oneshot::Sender<ClientResult<EntryVersion>> {
        let (tx, rx) = oneshot::channel();
        self.version_gates.lock().unwrap().insert(version, rx);
        tx
    }

    /// Hold restores of `version` until the returned sender fires.
    pub(crate) fn gate_restore(&self, version: VersionId) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.restore_gates.lock().unwrap().insert(version, rx);
        tx
    }

    pub(crate) fn restored(&self) -> Vec<(VersionId, RestoreRequest)> {
        self.restored.lock().unwrap().clone()
    }

    fn check(&self) -> ClientResult<()> {
        match self.failure.lock().unwrap().as_ref() {
            Some(e) => Err(copy_error(e)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl VersionApi for FakeApi {
    async fn list_versions(
        &self,
        _patient: PatientId,
        _entry: EntryId,
    ) -> ClientResult<Vec<EntryVersion>> {
        self.check()?;
        Ok(self
            .versions
            .lock()
            .unwrap()
            .iter()
            .map(EntryVersion::summary)
            .collect())
    }

    async fn get_version(
        &self,
        _patient: PatientId,
        entry: EntryId,
        version: VersionId,
    ) -> ClientResult<EntryVersion> {
        self.check()?;
        let gate = self.version_gates.lock().unwrap().remove(&version);
        if let Some(gate) = gate {
            return gate.await.unwrap();
        }
        self.versions
            .lock()
            .unwrap()
            .iter()
            .find(|v| v.id == version && v.entry_id == entry)
            .cloned()
            .ok_or_else(|| ClientError::Api {
                status: 404,
                code: "NOT_FOUND".into(),
                message: format!("version {version} not found"),
            })
    }

    async fn get_version_diff(
        &self,
        _patient: PatientId,
        _entry: EntryId,
        from: VersionRef,
        to: VersionRef,
    ) -> ClientResult<VersionDiff> {
        self.check()?;
        let gate = self.diff_gates.lock().unwrap().remove(&from);
        if let Some(gate) = gate {
            return gate.await.unwrap();
        }
        Ok(self
            .diffs
            .lock()
            .unwrap()
            .get(&(from, to))
            .cloned()
            .unwrap_or_default())
    }

    async fn create_version(
        &self,
        _patient: PatientId,
        entry: EntryId,
        editor_id: &str,
        change_reason: Option<&str>,
    ) -> ClientResult<EntryVersion> {
        self.check()?;
        let mut data = self::entry(HealthCheckRating::Healthy);
        data.id = entry;
        let version = EntryVersion::snapshot(
            &data,
            editor_id,
            change_reason.map(str::to_string),
            Utc::now(),
        );
        self.versions.lock().unwrap().insert(0, version.clone());
        Ok(version)
    }

    async fn restore_version(
        &self,
        _patient: PatientId,
        entry: EntryId,
        version: VersionId,
        request: RestoreRequest,
    ) -> ClientResult<Entry> {
        self.check()?;
        let gate = self.restore_gates.lock().unwrap().remove(&version);
        if let Some(gate) = gate {
            gate.await.unwrap();
        }
        let snapshot = self
            .versions
            .lock()
            .unwrap()
            .iter()
            .find(|v| v.id == version)
            .and_then(|v| v.entry_data.clone());
        let Some(mut restored) = snapshot else {
            return Err(ClientError::Api {
                status: 404,
                code: "NOT_FOUND".into(),
                message: format!("version {version} not found"),
            });
        };
        restored.id = entry;
        restored.updated_at = Utc::now();

        let reason = request
            .change_reason
            .clone()
            .unwrap_or_else(|| format!("Restored from version {version}"));
        let record = EntryVersion::snapshot(
            &restored,
            request.editor_id.clone().unwrap_or_else(|| "anonymous".into()),
            Some(reason),
            restored.updated_at,
        );
        self.versions.lock().unwrap().insert(0, record);
        self.restored.lock().unwrap().push((version, request));
        Ok(restored)
    }

    async fn get_latest_version(
        &self,
        patient: PatientId,
        entry: EntryId,
    ) -> ClientResult<Option<EntryVersion>> {
        Ok(self.list_versions(patient, entry).await?.into_iter().next())
    }
}
