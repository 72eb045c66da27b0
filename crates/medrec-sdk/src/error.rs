use medrec_protocol::ErrorCode;
use medrec_types::TypeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// No HTTP response was received.
    #[error("network error, possibly CORS or server unreachable: {0}")]
    Network(String),

    /// The server answered with an error body.
    #[error("{message} ({code}, HTTP {status})")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    /// The response decoded but violates an expected invariant.
    #[error("invalid response: {0}")]
    Validation(String),

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("invalid client configuration: {0}")]
    Config(String),
}

impl ClientError {
    /// The server's error code, for [`ClientError::Api`].
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Api { code, .. } => code.parse().ok(),
            _ => None,
        }
    }

    pub fn is_no_versions(&self) -> bool {
        self.code() == Some(ErrorCode::NoVersions)
    }

    pub fn is_not_found(&self) -> bool {
        self.code() == Some(ErrorCode::NotFound)
    }

    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

impl From<TypeError> for ClientError {
    fn from(e: TypeError) -> Self {
        Self::Validation(e.to_string())
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn api(code: &str) -> ClientError {
        ClientError::Api {
            status: 404,
            code: code.into(),
            message: "x".into(),
        }
    }

    #[test]
    fn classifies_codes() {
        assert!(api("NO_VERSIONS").is_no_versions());
        assert!(!api("NOT_FOUND").is_no_versions());
        assert!(api("NOT_FOUND").is_not_found());
        assert_eq!(api("SOMETHING_NEW").code(), None);
    }

    #[test]
    fn network_message() {
        let e = ClientError::Network("connection refused".into());
        assert!(e.is_network());
        assert!(e
            .to_string()
            .starts_with("network error, possibly CORS or server unreachable"));
    }

    #[test]
    fn missing_field_is_validation() {
        let e = ClientError::from(TypeError::MissingField("updatedAt"));
        assert!(matches!(e, ClientError::Validation(m) if m.contains("updatedAt")));
    }
}
