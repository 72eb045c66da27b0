use axum::body::Bytes;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;

use medrec_diff::diff_entries;
use medrec_protocol::{
    CreateVersionRequest, DiffQuery, DiffResponse, HealthResponse, RestoreRequest,
};
use medrec_store::{PatientStore, VersionStore};
use medrec_types::{
    Diagnosis, Entry, EntryId, EntryVersion, NewEntry, NewPatient, NonSensitivePatient, Patient,
    PatientId, VersionId,
};

use crate::auth::Identity;
use crate::error::{ServerError, ServerResult};
use crate::state::AppState;

type EntryPath = Result<Path<(PatientId, EntryId)>, PathRejection>;
type VersionPath = Result<Path<(PatientId, EntryId, VersionId)>, PathRejection>;

/// Health check handler.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}

pub async fn list_diagnoses(State(state): State<AppState>) -> ServerResult<Json<Vec<Diagnosis>>> {
    Ok(Json(state.store.list_diagnoses()?))
}

/// Patients without `ssn` or entries.
pub async fn list_patients(
    State(state): State<AppState>,
) -> ServerResult<Json<Vec<NonSensitivePatient>>> {
    let patients = state.store.list_patients()?;
    Ok(Json(patients.iter().map(Patient::non_sensitive).collect()))
}

pub async fn add_patient(
    State(state): State<AppState>,
    payload: Result<Json<NewPatient>, JsonRejection>,
) -> ServerResult<(StatusCode, Json<Patient>)> {
    let Json(patient) = payload?;
    let patient = state.store.add_patient(patient)?;
    tracing::info!(patient = %patient.id, "patient created");
    Ok((StatusCode::CREATED, Json(patient)))
}

pub async fn get_patient(
    State(state): State<AppState>,
    path: Result<Path<PatientId>, PathRejection>,
) -> ServerResult<Json<Patient>> {
    let Path(patient) = path?;
    Ok(Json(state.store.get_patient(&patient)?))
}

pub async fn add_entry(
    State(state): State<AppState>,
    path: Result<Path<PatientId>, PathRejection>,
    payload: Result<Json<NewEntry>, JsonRejection>,
) -> ServerResult<(StatusCode, Json<Entry>)> {
    let Path(patient) = path?;
    let Json(entry) = payload?;
    let entry = state.store.add_entry(&patient, entry)?;
    tracing::info!(%patient, entry = %entry.id, "entry created");
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn get_entry(State(state): State<AppState>, path: EntryPath) -> ServerResult<Json<Entry>> {
    let Path((patient, entry)) = path?;
    Ok(Json(state.store.get_entry(&patient, &entry)?))
}

pub async fn update_entry(
    State(state): State<AppState>,
    path: EntryPath,
    payload: Result<Json<NewEntry>, JsonRejection>,
) -> ServerResult<Json<Entry>> {
    let Path((patient, entry)) = path?;
    let Json(content) = payload?;
    Ok(Json(state.store.update_entry(&patient, &entry, content)?))
}

/// History summaries, newest first. An empty history is `NO_VERSIONS`.
pub async fn list_versions(
    State(state): State<AppState>,
    path: EntryPath,
) -> ServerResult<Json<Vec<EntryVersion>>> {
    let Path((patient, entry)) = path?;
    let versions = state.store.list_versions(&patient, &entry)?;
    if versions.is_empty() {
        return Err(ServerError::NoVersions(entry));
    }
    Ok(Json(versions))
}

pub async fn create_version(
    State(state): State<AppState>,
    path: EntryPath,
    payload: Result<Json<CreateVersionRequest>, JsonRejection>,
) -> ServerResult<(StatusCode, Json<EntryVersion>)> {
    let Path((patient, entry)) = path?;
    let Json(request) = payload?;
    if request.editor_id.trim().is_empty() {
        return Err(ServerError::Validation("editorId is required".into()));
    }
    let version =
        state
            .store
            .create_version(&patient, &entry, &request.editor_id, request.change_reason)?;
    tracing::info!(%entry, version = %version.id, editor = %version.editor_id, "version created");
    Ok((StatusCode::CREATED, Json(version)))
}

/// Structural diff from `version1` to `version2`.
pub async fn version_diff(
    State(state): State<AppState>,
    path: EntryPath,
    query: Result<Query<DiffQuery>, QueryRejection>,
) -> ServerResult<Json<DiffResponse>> {
    let Path((patient, entry)) = path?;
    let Query(query) = query?;
    let old = state.store.resolve_snapshot(&patient, &entry, &query.version1)?;
    let new = state.store.resolve_snapshot(&patient, &entry, &query.version2)?;
    let diff = diff_entries(Some(&old), Some(&new))?;
    tracing::debug!(%entry, from = %query.version1, to = %query.version2, changes = diff.len(), "diff computed");
    Ok(Json(DiffResponse { diff }))
}

pub async fn latest_version(
    State(state): State<AppState>,
    path: EntryPath,
) -> ServerResult<Json<EntryVersion>> {
    let Path((patient, entry)) = path?;
    state
        .store
        .latest_version(&patient, &entry)?
        .map(Json)
        .ok_or(ServerError::NoVersions(entry))
}

pub async fn get_version(
    State(state): State<AppState>,
    path: VersionPath,
) -> ServerResult<Json<EntryVersion>> {
    let Path((patient, entry, version)) = path?;
    Ok(Json(state.store.get_version(&patient, &entry, &version)?))
}

/// Restore a version as the live entry. The body is optional; the editor
/// defaults to the caller's identity.
pub async fn restore_version(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    path: VersionPath,
    body: Bytes,
) -> ServerResult<Json<Entry>> {
    let Path((patient, entry, version)) = path?;
    let request: RestoreRequest = if body.iter().all(u8::is_ascii_whitespace) {
        RestoreRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ServerError::Validation(format!("invalid restore body: {e}")))?
    };

    let editor = request.editor_id.unwrap_or(identity.name);
    let restored =
        state
            .store
            .restore_version(&patient, &entry, &version, &editor, request.change_reason)?;
    tracing::info!(%entry, from = %version, %editor, "version restored");
    Ok(Json(restored))
}
