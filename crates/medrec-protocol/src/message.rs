use std::fmt;
use std::str::FromStr;

use medrec_diff::VersionDiff;
use medrec_types::VersionRef;
use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;

/// Body of `POST .../versions`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVersionRequest {
    pub editor_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_reason: Option<String>,
}

/// Optional body of `PUT .../versions/{v}/restore`.
///
/// A missing editor falls back to the authenticated identity; a missing
/// reason to `Restored from version <id>`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_reason: Option<String>,
}

/// Query of `GET .../versions/diff`. Either side may be `current`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffQuery {
    pub version1: VersionRef,
    pub version2: VersionRef,
}

/// Response of `GET .../versions/diff`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DiffResponse {
    pub diff: VersionDiff,
}

/// Machine-readable error codes carried in [`ErrorBody::code`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NotFound,
    /// The entry exists but has no recorded versions.
    NoVersions,
    Validation,
    TypeMismatch,
    Unauthorized,
    Internal,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::NoVersions => "NO_VERSIONS",
            Self::Validation => "VALIDATION",
            Self::TypeMismatch => "TYPE_MISMATCH",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Internal => "INTERNAL",
        }
    }

    /// HTTP status code the server answers with.
    pub fn status(&self) -> u16 {
        match self {
            Self::NotFound | Self::NoVersions => 404,
            Self::Validation => 400,
            Self::TypeMismatch => 409,
            Self::Unauthorized => 401,
            Self::Internal => 500,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ErrorCode {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NOT_FOUND" => Ok(Self::NotFound),
            "NO_VERSIONS" => Ok(Self::NoVersions),
            "VALIDATION" => Ok(Self::Validation),
            "TYPE_MISMATCH" => Ok(Self::TypeMismatch),
            "UNAUTHORIZED" => Ok(Self::Unauthorized),
            "INTERNAL" => Ok(Self::Internal),
            other => Err(ProtocolError::UnknownErrorCode(other.to_string())),
        }
    }
}

/// Error response body: `{ "code": "...", "error": "..." }`.
///
/// `code` stays a plain string so that clients tolerate codes added by
/// newer servers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub error: String,
}

impl ErrorBody {
    pub fn new(code: ErrorCode, error: impl Into<String>) -> Self {
        Self {
            code: code.as_str().to_string(),
            error: error.into(),
        }
    }

    pub fn error_code(&self) -> Result<ErrorCode, ProtocolError> {
        self.code.parse()
    }

    pub fn is(&self, code: ErrorCode) -> bool {
        self.code == code.as_str()
    }
}
