use crate::error::{ProtocolError, ProtocolResult};

const BEARER: &str = "Bearer";

/// How a client authenticates to the server.
///
/// Carried explicitly in the client configuration. Obtaining and refreshing
/// tokens is the caller's concern.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum AuthMethod {
    Bearer(String),
    #[default]
    Anonymous,
}

impl AuthMethod {
    pub fn is_authenticated(&self) -> bool {
        !matches!(self, Self::Anonymous)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Bearer(_) => "bearer-token",
            Self::Anonymous => "anonymous",
        }
    }

    /// Value for the `Authorization` header, if any.
    pub fn header_value(&self) -> Option<String> {
        match self {
            Self::Bearer(token) => Some(format!("{BEARER} {token}")),
            Self::Anonymous => None,
        }
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header value.
pub fn parse_bearer(header: &str) -> ProtocolResult<&str> {
    let (scheme, token) = header
        .trim()
        .split_once(' ')
        .ok_or(ProtocolError::MalformedAuthorization)?;
    if !scheme.eq_ignore_ascii_case(BEARER) {
        return Err(ProtocolError::UnsupportedScheme(scheme.to_string()));
    }
    let token = token.trim();
    if token.is_empty() {
        return Err(ProtocolError::MalformedAuthorization);
    }
    Ok(token)
}
