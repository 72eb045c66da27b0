use std::collections::BTreeMap;

use async_trait::async_trait;
use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;

use crate::error::{ServerError, ServerResult};
use crate::state::AppState;

/// The caller of a request. Its name is the default editor recorded on
/// restores.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
}

impl Identity {
    pub fn anonymous() -> Self {
        Self {
            name: "anonymous".into(),
        }
    }

    pub fn user(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Clone, Debug)]
pub enum Credentials {
    Bearer(String),
    Anonymous,
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn authenticate(&self, credentials: &Credentials) -> ServerResult<Identity>;
}

/// Accepts every caller. Used when no API tokens are configured.
pub struct AllowAllAuth;

#[async_trait]
impl AuthProvider for AllowAllAuth {
    async fn authenticate(&self, credentials: &Credentials) -> ServerResult<Identity> {
        match credentials {
            Credentials::Bearer(token) => {
                let prefix: String = token.chars().take(8).collect();
                Ok(Identity::user(format!("bearer:{prefix}")))
            }
            Credentials::Anonymous => Ok(Identity::anonymous()),
        }
    }
}

/// Static bearer tokens, each mapped to an editor name.
pub struct TokenAuth {
    tokens: BTreeMap<String, String>,
}

impl TokenAuth {
    pub fn new(tokens: BTreeMap<String, String>) -> Self {
        Self { tokens }
    }
}

#[async_trait]
impl AuthProvider for TokenAuth {
    async fn authenticate(&self, credentials: &Credentials) -> ServerResult<Identity> {
        match credentials {
            Credentials::Bearer(token) => self
                .tokens
                .get(token)
                .map(Identity::user)
                .ok_or_else(|| ServerError::AuthFailed("unknown token".into())),
            Credentials::Anonymous => Err(ServerError::AuthFailed("missing bearer token".into())),
        }
    }
}

/// Middleware resolving the caller and storing its [`Identity`] in the
/// request extensions.
pub async fn require_identity(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> ServerResult<Response> {
    let credentials = match request.headers().get(AUTHORIZATION) {
        Some(value) => {
            let value = value
                .to_str()
                .map_err(|_| ServerError::AuthFailed("non-ascii authorization header".into()))?;
            let token = medrec_protocol::parse_bearer(value)
                .map_err(|e| ServerError::AuthFailed(e.to_string()))?;
            Credentials::Bearer(token.to_string())
        }
        None => Credentials::Anonymous,
    };

    let identity = state.auth.authenticate(&credentials).await?;
    tracing::debug!(identity = %identity.name, "request authenticated");
    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}
