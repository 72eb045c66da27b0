//! HTTP protocol for medrec.
//!
//! Defines the endpoint paths, request and response bodies, and error codes
//! exchanged between the medrec server and its clients. All bodies are JSON
//! with camelCase field names.

pub mod auth;
pub mod endpoint;
pub mod error;
pub mod message;

pub use auth::{parse_bearer, AuthMethod};
pub use endpoint::{endpoints, paths, HealthResponse};
pub use error::{ProtocolError, ProtocolResult};
pub use message::{
    CreateVersionRequest, DiffQuery, DiffResponse, ErrorBody, ErrorCode, RestoreRequest,
};
