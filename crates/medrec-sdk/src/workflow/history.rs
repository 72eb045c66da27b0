use std::future::Future;
use std::sync::{Arc, Mutex};

use medrec_types::EntryVersion;
use tokio::sync::watch;

use super::{EntryTarget, Guarded};
use crate::api::VersionApi;

/// Published state of a [`VersionHistory`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HistoryState {
    /// Newest first.
    pub versions: Vec<EntryVersion>,
    pub loading: bool,
    pub error: Option<String>,
}

/// Version list of one entry.
pub struct VersionHistory {
    api: Arc<dyn VersionApi>,
    target: Mutex<Option<EntryTarget>>,
    state: Guarded<HistoryState>,
}

impl VersionHistory {
    pub fn new(api: Arc<dyn VersionApi>, target: Option<EntryTarget>) -> Self {
        Self {
            api,
            target: Mutex::new(target),
            state: Guarded::new(HistoryState::default()),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<HistoryState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> HistoryState {
        self.state.snapshot()
    }

    pub fn target(&self) -> Option<EntryTarget> {
        *self.target.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Switch to another entry, or to none. In-flight loads are dropped;
    /// without an entry the state resets to empty with no error.
    pub fn set_entry(&self, target: Option<EntryTarget>) {
        *self.target.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = target;
        self.state.begin(|state| {
            if target.is_none() {
                *state = HistoryState::default();
            }
        });
    }

    /// Reload the version list. Without an entry this only resets state.
    pub fn refresh(&self) -> impl Future<Output = ()> + Send + '_ {
        let target = self.target();
        let ticket = self.state.begin(|state| match target {
            Some(_) => {
                state.loading = true;
                state.error = None;
            }
            None => *state = HistoryState::default(),
        });

        async move {
            let Some(target) = target else {
                return;
            };
            let result = self.api.list_versions(target.patient, target.entry).await;
            self.state.finish(ticket, |state| {
                state.loading = false;
                match result {
                    Ok(versions) => {
                        state.versions = versions;
                        state.error = None;
                    }
                    Err(e) => {
                        tracing::warn!(entry = %target.entry, error = %e, "loading version history failed");
                        state.error = Some(e.to_string());
                    }
                }
            });
        }
    }

    /// Stop publishing state updates.
    pub fn detach(&self) {
        self.state.detach();
    }
}
