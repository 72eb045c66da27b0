use std::future::Future;
use std::sync::Arc;

use medrec_protocol::RestoreRequest;
use medrec_types::{EntryVersion, VersionId, VersionRef};
use tokio::sync::watch;

use super::{DiffRequest, DiffWorkflow, EntryTarget, Guarded, RestoreWorkflow, VersionHistory};
use crate::api::VersionApi;

/// Selection and preview published by a [`VersionBrowser`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BrowserState {
    pub selected: Option<VersionId>,
    /// The selected version including its entry snapshot.
    pub preview: Option<EntryVersion>,
    pub preview_loading: bool,
    pub preview_error: Option<String>,
}

/// History, diff and restore for one entry, tied together by a selected
/// version.
pub struct VersionBrowser {
    api: Arc<dyn VersionApi>,
    target: EntryTarget,
    history: VersionHistory,
    diff: DiffWorkflow,
    restore: RestoreWorkflow,
    state: Guarded<BrowserState>,
}

impl VersionBrowser {
    pub fn new(api: Arc<dyn VersionApi>, target: EntryTarget) -> Self {
        Self {
            history: VersionHistory::new(api.clone(), Some(target)),
            diff: DiffWorkflow::new(api.clone()),
            restore: RestoreWorkflow::new(api.clone()),
            api,
            target,
            state: Guarded::new(BrowserState::default()),
        }
    }

    pub fn target(&self) -> EntryTarget {
        self.target
    }

    pub fn history(&self) -> &VersionHistory {
        &self.history
    }

    pub fn diff(&self) -> &DiffWorkflow {
        &self.diff
    }

    pub fn restore(&self) -> &RestoreWorkflow {
        &self.restore
    }

    pub fn subscribe(&self) -> watch::Receiver<BrowserState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> BrowserState {
        self.state.snapshot()
    }

    /// Select a version and compare it with the live entry.
    ///
    /// The previous preview is discarded immediately and any preview load
    /// in flight is superseded.
    pub fn select_version(&self, version: VersionId) -> impl Future<Output = ()> + Send + '_ {
        self.state.begin(|state| {
            state.selected = Some(version);
            state.preview = None;
            state.preview_loading = false;
            state.preview_error = None;
        });
        self.diff.fetch_diff(DiffRequest {
            patient: self.target.patient,
            entry: self.target.entry,
            version_a: VersionRef::Version(version),
            version_b: VersionRef::Current,
            base: None,
        })
    }

    /// Load the selected version's snapshot. A result arriving after the
    /// selection changed is discarded.
    pub fn load_preview(&self) -> impl Future<Output = ()> + Send + '_ {
        let selected = self.state.snapshot().selected;
        let ticket = self.state.begin(|state| {
            if selected.is_some() {
                state.preview_loading = true;
                state.preview_error = None;
            }
        });

        async move {
            let Some(version) = selected else {
                return;
            };
            let result = self
                .api
                .get_version(self.target.patient, self.target.entry, version)
                .await;
            self.state.finish(ticket, |state| {
                if state.selected != Some(version) {
                    return;
                }
                state.preview_loading = false;
                match result {
                    Ok(loaded) => state.preview = Some(loaded),
                    Err(e) => state.preview_error = Some(e.to_string()),
                }
            });
        }
    }

    /// Restore the selected version. On success the history is reloaded
    /// and the selection cleared, unless the user picked another version
    /// while the restore was running; on failure the selection stays so the
    /// user can retry. Resolves to `true` on success.
    pub fn restore_selected(&self, request: RestoreRequest) -> impl Future<Output = bool> + Send + '_ {
        let selected = self.state.snapshot().selected;
        let restore = selected.map(|version| {
            (
                version,
                self.restore.restore_version(self.target, version, request),
            )
        });

        async move {
            let Some((version, restore)) = restore else {
                return false;
            };
            if restore.await.is_none() {
                return false;
            }
            if self.state.snapshot().selected == Some(version) {
                self.state.begin(|state| *state = BrowserState::default());
                self.diff.clear();
            }
            self.history.refresh().await;
            true
        }
    }

    /// Stop publishing updates from this browser and its parts.
    pub fn detach(&self) {
        self.state.detach();
        self.history.detach();
        self.diff.detach();
        self.restore.detach();
    }
}
