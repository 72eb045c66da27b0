//! Client SDK for medrec.
//!
//! [`MedrecClient`] talks to a medrec server over HTTP. Version history
//! access goes through the [`VersionApi`] trait so that the
//! [`workflow`] types can run against any backend.
//!
//! The workflows publish their state through `tokio::sync::watch` channels.
//! Each operation updates state synchronously when called and applies its
//! result only if no newer operation has started since.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod workflow;

pub use api::VersionApi;
pub use client::MedrecClient;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use workflow::{
    BrowserState, DiffRequest, DiffState, DiffWorkflow, EntryTarget, HistoryState,
    RestoreState, RestoreWorkflow, VersionBrowser, VersionHistory,
};

// Re-export key types
pub use medrec_diff::{FieldChange, VersionDiff};
pub use medrec_merge::{ConflictMarker, ThreeWayDiff};
pub use medrec_protocol::{AuthMethod, RestoreRequest};
pub use medrec_types::{Entry, EntryId, EntryVersion, PatientId, VersionId, VersionRef};
