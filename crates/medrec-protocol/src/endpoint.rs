use medrec_types::{EntryId, PatientId, VersionId};

/// Route templates as registered on the server.
pub mod endpoints {
    pub const HEALTH: &str = "/api/health";
    pub const DIAGNOSES: &str = "/api/diagnoses";
    pub const PATIENTS: &str = "/api/patients";
    pub const PATIENT: &str = "/api/patients/:patient_id";
    pub const ENTRIES: &str = "/api/patients/:patient_id/entries";
    pub const ENTRY: &str = "/api/patients/:patient_id/entries/:entry_id";
    pub const VERSIONS: &str = "/api/patients/:patient_id/entries/:entry_id/versions";
    pub const VERSION_DIFF: &str = "/api/patients/:patient_id/entries/:entry_id/versions/diff";
    pub const LATEST_VERSION: &str =
        "/api/patients/:patient_id/entries/:entry_id/versions/latest";
    pub const VERSION: &str = "/api/patients/:patient_id/entries/:entry_id/versions/:version_id";
    pub const RESTORE_VERSION: &str =
        "/api/patients/:patient_id/entries/:entry_id/versions/:version_id/restore";
}

/// Concrete request paths, relative to the server's base URL.
pub mod paths {
    use super::*;

    pub fn patient(patient: &PatientId) -> String {
        format!("{}/{patient}", super::endpoints::PATIENTS)
    }

    pub fn entries(patient: &PatientId) -> String {
        format!("{}/entries", self::patient(patient))
    }

    pub fn entry(patient: &PatientId, entry: &EntryId) -> String {
        format!("{}/{entry}", entries(patient))
    }

    pub fn versions(patient: &PatientId, entry: &EntryId) -> String {
        format!("{}/versions", self::entry(patient, entry))
    }

    pub fn version_diff(patient: &PatientId, entry: &EntryId) -> String {
        format!("{}/diff", versions(patient, entry))
    }

    pub fn latest_version(patient: &PatientId, entry: &EntryId) -> String {
        format!("{}/latest", versions(patient, entry))
    }

    pub fn version(patient: &PatientId, entry: &EntryId, version: &VersionId) -> String {
        format!("{}/{version}", versions(patient, entry))
    }

    pub fn restore_version(patient: &PatientId, entry: &EntryId, version: &VersionId) -> String {
        format!("{}/restore", self::version(patient, entry, version))
    }
}

/// Health check response.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".into(),
            version: env!("CARGO_PKG_VERSION").into(),
        }
    }
}
