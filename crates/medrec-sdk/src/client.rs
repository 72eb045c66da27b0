use async_trait::async_trait;
use medrec_diff::VersionDiff;
use medrec_protocol::{
    endpoints, paths, CreateVersionRequest, DiffResponse, ErrorBody, HealthResponse,
    RestoreRequest,
};
use medrec_types::{
    sort_newest_first, Diagnosis, Entry, EntryId, EntryVersion, NewEntry, NewPatient,
    NonSensitivePatient, Patient, PatientId, VersionId, VersionRef,
};
use reqwest::header::AUTHORIZATION;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::api::VersionApi;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// HTTP client for a medrec server.
#[derive(Clone, Debug)]
pub struct MedrecClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl MedrecClient {
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::Config(e.to_string()))?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub async fn health(&self) -> ClientResult<HealthResponse> {
        self.send(self.request(Method::GET, endpoints::HEALTH)).await
    }

    pub async fn list_diagnoses(&self) -> ClientResult<Vec<Diagnosis>> {
        self.send(self.request(Method::GET, endpoints::DIAGNOSES))
            .await
    }

    pub async fn list_patients(&self) -> ClientResult<Vec<NonSensitivePatient>> {
        self.send(self.request(Method::GET, endpoints::PATIENTS)).await
    }

    pub async fn get_patient(&self, patient: PatientId) -> ClientResult<Patient> {
        self.send(self.request(Method::GET, &paths::patient(&patient)))
            .await
    }

    pub async fn add_patient(&self, patient: &NewPatient) -> ClientResult<Patient> {
        self.send(self.request(Method::POST, endpoints::PATIENTS).json(patient))
            .await
    }

    pub async fn add_entry(&self, patient: PatientId, entry: &NewEntry) -> ClientResult<Entry> {
        self.send(
            self.request(Method::POST, &paths::entries(&patient))
                .json(entry),
        )
        .await
    }

    pub async fn get_entry(&self, patient: PatientId, entry: EntryId) -> ClientResult<Entry> {
        self.send(self.request(Method::GET, &paths::entry(&patient, &entry)))
            .await
    }

    pub async fn update_entry(
        &self,
        patient: PatientId,
        entry: EntryId,
        content: &NewEntry,
    ) -> ClientResult<Entry> {
        self.send(
            self.request(Method::PUT, &paths::entry(&patient, &entry))
                .json(content),
        )
        .await
    }

    /// Edit an entry and record the result as a new version.
    ///
    /// This is the one-version-per-edit path; [`update_entry`](Self::update_entry)
    /// alone leaves the history untouched. If the version cannot be recorded
    /// the edit has still been applied and the error is returned.
    pub async fn edit_entry(
        &self,
        patient: PatientId,
        entry: EntryId,
        content: &NewEntry,
        editor_id: &str,
        change_reason: Option<&str>,
    ) -> ClientResult<(Entry, EntryVersion)> {
        if editor_id.trim().is_empty() {
            return Err(ClientError::Validation("editorId is required".into()));
        }
        let updated = self.update_entry(patient, entry, content).await?;
        let version = self
            .create_version(patient, entry, editor_id, change_reason)
            .await?;
        tracing::debug!(%entry, version = %version.id, "entry edited");
        Ok((updated, version))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{path}", self.config.base_url.trim_end_matches('/'));
        let builder = self.http.request(method, url);
        match self.config.auth.header_value() {
            Some(value) => builder.header(AUTHORIZATION, value),
            None => builder,
        }
    }

    /// Send a request and decode a successful JSON response.
    ///
    /// Transport failures (no response at all) become
    /// [`ClientError::Network`]; error statuses become [`ClientError::Api`]
    /// carrying the server's code.
    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ClientResult<T> {
        let response = builder.send().await.map_err(|e| {
            tracing::warn!(error = %e, "request failed without a response");
            ClientError::Network(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(api_error(status.as_u16(), &body));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }
}

fn api_error(status: u16, body: &str) -> ClientError {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody { code, error }) => ClientError::Api {
            status,
            code,
            message: error,
        },
        Err(_) => ClientError::Api {
            status,
            code: "UNKNOWN".into(),
            message: if body.is_empty() {
                format!("HTTP {status}")
            } else {
                body.to_string()
            },
        },
    }
}

#[async_trait]
impl VersionApi for MedrecClient {
    async fn list_versions(
        &self,
        patient: PatientId,
        entry: EntryId,
    ) -> ClientResult<Vec<EntryVersion>> {
        let result = self
            .send::<Vec<EntryVersion>>(
                self.request(Method::GET, &paths::versions(&patient, &entry)),
            )
            .await;
        let mut versions = match result {
            Ok(versions) => versions,
            Err(e) if e.is_no_versions() => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };
        for version in &versions {
            version.require_updated_at()?;
        }
        sort_newest_first(&mut versions);
        Ok(versions)
    }

    async fn get_version(
        &self,
        patient: PatientId,
        entry: EntryId,
        version: VersionId,
    ) -> ClientResult<EntryVersion> {
        self.send(self.request(Method::GET, &paths::version(&patient, &entry, &version)))
            .await
    }

    async fn get_version_diff(
        &self,
        patient: PatientId,
        entry: EntryId,
        from: VersionRef,
        to: VersionRef,
    ) -> ClientResult<VersionDiff> {
        let response: DiffResponse = self
            .send(
                self.request(Method::GET, &paths::version_diff(&patient, &entry))
                    .query(&[("version1", from.to_string()), ("version2", to.to_string())]),
            )
            .await?;
        Ok(response.diff)
    }

    async fn create_version(
        &self,
        patient: PatientId,
        entry: EntryId,
        editor_id: &str,
        change_reason: Option<&str>,
    ) -> ClientResult<EntryVersion> {
        let body = CreateVersionRequest {
            editor_id: editor_id.to_string(),
            change_reason: change_reason.map(str::to_string),
        };
        self.send(
            self.request(Method::POST, &paths::versions(&patient, &entry))
                .json(&body),
        )
        .await
    }

    async fn restore_version(
        &self,
        patient: PatientId,
        entry: EntryId,
        version: VersionId,
        request: RestoreRequest,
    ) -> ClientResult<Entry> {
        self.send(
            self.request(
                Method::PUT,
                &paths::restore_version(&patient, &entry, &version),
            )
            .json(&request),
        )
        .await
    }

    async fn get_latest_version(
        &self,
        patient: PatientId,
        entry: EntryId,
    ) -> ClientResult<Option<EntryVersion>> {
        let result = self
            .send::<EntryVersion>(
                self.request(Method::GET, &paths::latest_version(&patient, &entry)),
            )
            .await;
        match result {
            Ok(version) => {
                version.require_updated_at()?;
                Ok(Some(version))
            }
            Err(e) if e.is_no_versions() => Ok(None),
            Err(e) => Err(e),
        }
    }
}
