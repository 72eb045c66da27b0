use medrec_types::{EntryId, EntryKind, PatientId, TypeError, VersionId};

/// Errors from store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("patient not found: {0}")]
    PatientNotFound(PatientId),

    #[error("entry {entry} not found for patient {patient}")]
    EntryNotFound { patient: PatientId, entry: EntryId },

    #[error("version {version} not found for entry {entry}")]
    VersionNotFound { entry: EntryId, version: VersionId },

    /// An update or restore would change the entry's type.
    #[error("entry {entry} is {expected}, refusing to replace it with {actual}")]
    TypeMismatch {
        entry: EntryId,
        expected: EntryKind,
        actual: EntryKind,
    },

    /// A version was recorded without its entry snapshot.
    #[error("version {0} has no entry data")]
    MissingSnapshot(VersionId),

    /// Submitted data failed validation.
    #[error("invalid input: {0}")]
    Invalid(#[from] TypeError),

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store lock poisoned")]
    LockPoisoned,
}

impl StoreError {
    /// Returns `true` for the "no such patient/entry/version" family.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::PatientNotFound(_) | Self::EntryNotFound { .. } | Self::VersionNotFound { .. }
        )
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
