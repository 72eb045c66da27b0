use std::future::Future;
use std::sync::Arc;

use medrec_diff::VersionDiff;
use medrec_merge::{ConflictMarker, ThreeWayDiff};
use medrec_types::{EntryId, PatientId, VersionRef};
use tokio::sync::watch;

use super::Guarded;
use crate::api::VersionApi;
use crate::error::ClientResult;

/// Which versions to compare.
///
/// `version_a` is the candidate being inspected, `version_b` what it is
/// compared with (usually [`VersionRef::Current`]). With a `base`, the
/// workflow also fetches `base -> version_a` and reports paths where the
/// two diffs started from different values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DiffRequest {
    pub patient: PatientId,
    pub entry: EntryId,
    pub version_a: VersionRef,
    pub version_b: VersionRef,
    pub base: Option<VersionRef>,
}

/// Published state of a [`DiffWorkflow`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DiffState {
    pub diff: Option<VersionDiff>,
    pub conflicts: Vec<ConflictMarker>,
    pub loading: bool,
    pub error: Option<String>,
}

impl DiffState {
    /// The loaded diff and its conflicts, once a fetch has succeeded.
    pub fn result(&self) -> Option<ThreeWayDiff> {
        self.diff.clone().map(|diff| ThreeWayDiff {
            diff,
            conflicts: self.conflicts.clone(),
        })
    }
}

pub struct DiffWorkflow {
    api: Arc<dyn VersionApi>,
    state: Guarded<DiffState>,
}

impl DiffWorkflow {
    pub fn new(api: Arc<dyn VersionApi>) -> Self {
        Self {
            api,
            state: Guarded::new(DiffState::default()),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<DiffState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> DiffState {
        self.state.snapshot()
    }

    /// Fetch the diff `version_a -> version_b`, plus conflicts against
    /// `base` when one is given. The previous diff is dropped at once and
    /// any earlier fetch still in flight is superseded.
    pub fn fetch_diff(&self, request: DiffRequest) -> impl Future<Output = ()> + Send + '_ {
        let ticket = self.state.begin(|state| {
            state.diff = None;
            state.conflicts.clear();
            state.loading = true;
            state.error = None;
        });

        async move {
            let result = self.load(request).await;
            self.state.finish(ticket, |state| {
                state.loading = false;
                match result {
                    Ok(ThreeWayDiff { diff, conflicts }) => {
                        state.diff = Some(diff);
                        state.conflicts = conflicts;
                        state.error = None;
                    }
                    Err(e) => {
                        tracing::warn!(entry = %request.entry, error = %e, "loading diff failed");
                        state.diff = None;
                        state.conflicts.clear();
                        state.error = Some(e.to_string());
                    }
                }
            });
        }
    }

    /// Drop the current diff and supersede any fetch in flight.
    pub fn clear(&self) {
        self.state.begin(|state| *state = DiffState::default());
    }

    pub fn detach(&self) {
        self.state.detach();
    }

    async fn load(&self, request: DiffRequest) -> ClientResult<ThreeWayDiff> {
        let DiffRequest {
            patient,
            entry,
            version_a,
            version_b,
            base,
        } = request;

        let diff = self
            .api
            .get_version_diff(patient, entry, version_a, version_b)
            .await?;
        let base_diff = match base {
            Some(base) => Some(
                self.api
                    .get_version_diff(patient, entry, base, version_a)
                    .await?,
            ),
            None => None,
        };
        Ok(ThreeWayDiff::from_diffs(diff, base_diff.as_ref()))
    }
}
