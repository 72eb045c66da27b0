//! Initial data loaded into a store at startup.

use std::path::Path;

use medrec_types::{Diagnosis, Patient};
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Patients and diagnoses in their wire format.
///
/// ```json
/// { "diagnoses": [ { "code": "M24.2", "name": "Disorder of ligament" } ],
///   "patients": [ { "id": "...", "name": "...", "entries": [] } ] }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub diagnoses: Vec<Diagnosis>,
    #[serde(default)]
    pub patients: Vec<Patient>,
}

impl SeedData {
    pub fn from_json(json: &str) -> StoreResult<Self> {
        serde_json::from_str(json).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    pub fn from_file(path: impl AsRef<Path>) -> StoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}
