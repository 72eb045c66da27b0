use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use medrec_protocol::{ErrorBody, ErrorCode};
use medrec_store::StoreError;
use medrec_types::EntryId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("{0}")]
    NotFound(String),

    /// The entry exists but its history is empty.
    #[error("no versions recorded for entry {0}")]
    NoVersions(EntryId),

    #[error("{0}")]
    Validation(String),

    #[error("authentication failed: {0}")]
    AuthFailed(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("diff error: {0}")]
    Diff(#[from] medrec_diff::DiffError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServerError {
    /// The wire error code this error is reported with.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound(_) => ErrorCode::NotFound,
            Self::NoVersions(_) => ErrorCode::NoVersions,
            Self::Validation(_) => ErrorCode::Validation,
            Self::AuthFailed(_) => ErrorCode::Unauthorized,
            Self::Store(e) => match e {
                StoreError::PatientNotFound(_)
                | StoreError::EntryNotFound { .. }
                | StoreError::VersionNotFound { .. } => ErrorCode::NotFound,
                StoreError::TypeMismatch { .. } => ErrorCode::TypeMismatch,
                StoreError::Invalid(_) => ErrorCode::Validation,
                StoreError::MissingSnapshot(_)
                | StoreError::Serialization(_)
                | StoreError::Io(_)
                | StoreError::LockPoisoned => ErrorCode::Internal,
            },
            Self::Diff(_) | Self::Config(_) | Self::Io(_) | Self::Internal(_) => {
                ErrorCode::Internal
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let code = self.code();
        let status =
            StatusCode::from_u16(code.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!(%code, error = %self, "request failed");
        } else {
            tracing::warn!(%code, error = %self, "request rejected");
        }
        (status, Json(ErrorBody::new(code, self.to_string()))).into_response()
    }
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for ServerError {
    fn from(rejection: PathRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ServerError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

pub type ServerResult<T> = Result<T, ServerError>;
