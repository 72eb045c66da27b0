//! Foundation types for medrec.
//!
//! This crate provides the data model shared by the store, the HTTP server
//! and the client SDK. Every other medrec crate depends on `medrec-types`.
//!
//! # Key Types
//!
//! - [`Patient`] / [`NonSensitivePatient`] -- a patient and its public projection
//! - [`Entry`] / [`EntryDetails`] -- a medical entry, tagged by [`EntryKind`]
//! - [`EntryVersion`] -- an immutable snapshot of an entry at one edit
//! - [`PatientId`], [`EntryId`], [`VersionId`] -- UUID v7 identifiers
//! - [`VersionRef`] -- a concrete version or the live entry

pub mod entry;
pub mod error;
pub mod ids;
pub mod patient;
pub mod version;

pub use entry::{
    Discharge, Entry, EntryDetails, EntryKind, HealthCheckRating, NewEntry, SickLeave,
};
pub use error::TypeError;
pub use ids::{EntryId, PatientId, VersionId, VersionRef};
pub use patient::{Diagnosis, Gender, NewPatient, NonSensitivePatient, Patient};
pub use version::{sort_newest_first, EntryVersion};
