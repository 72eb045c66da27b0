use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("unknown error code: {0}")]
    UnknownErrorCode(String),

    #[error("malformed authorization header")]
    MalformedAuthorization,

    #[error("unsupported authorization scheme: {0}")]
    UnsupportedScheme(String),
}

pub type ProtocolResult<T> = Result<T, ProtocolError>;
