//! Storage backends for medrec.
//!
//! The store owns patients, their entries, and the version history of every
//! entry. Two traits split the surface: [`PatientStore`] for the live
//! records and [`VersionStore`] for history. [`InMemoryStore`] implements
//! both.
//!
//! # Design Rules
//!
//! - Versions are append-only. Nothing here mutates or deletes a recorded
//!   version; a restore appends a new one.
//! - An entry's `type` never changes. Updates and restores that would
//!   change it fail with [`StoreError::TypeMismatch`].
//! - History listings are newest first and carry no entry payload.
//! - An empty history is an empty `Vec`, not an error. Mapping it to a
//!   wire-level error is the HTTP layer's business.

pub mod error;
pub mod memory;
pub mod seed;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::InMemoryStore;
pub use seed::SeedData;
pub use traits::{PatientStore, VersionStore};
