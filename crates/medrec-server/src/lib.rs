//! HTTP API server for medrec.
//!
//! Serves patients, their medical entries, the diagnosis catalogue, and the
//! append-only version history of every entry. Errors are answered as
//! `{ "code", "error" }` bodies; an entry without history answers
//! `NO_VERSIONS`.

pub mod auth;
pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;
pub mod state;

pub use auth::{AllowAllAuth, AuthProvider, Credentials, Identity, TokenAuth};
pub use config::{ServerConfig, BIND_ADDR_ENV};
pub use error::{ServerError, ServerResult};
pub use server::MedrecServer;
pub use state::{AppState, RecordStore};
