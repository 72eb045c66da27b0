use std::future::Future;
use std::sync::Arc;

use medrec_protocol::RestoreRequest;
use medrec_types::{Entry, VersionId};
use tokio::sync::watch;

use super::{EntryTarget, Guarded};
use crate::api::VersionApi;

/// Published state of a [`RestoreWorkflow`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RestoreState {
    pub restored_entry: Option<Entry>,
    pub loading: bool,
    pub error: Option<String>,
    /// `true` only after the latest restore succeeded.
    pub success: bool,
}

pub struct RestoreWorkflow {
    api: Arc<dyn VersionApi>,
    state: Guarded<RestoreState>,
}

impl RestoreWorkflow {
    pub fn new(api: Arc<dyn VersionApi>) -> Self {
        Self {
            api,
            state: Guarded::new(RestoreState::default()),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<RestoreState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> RestoreState {
        self.state.snapshot()
    }

    /// Restore `version` as the live entry.
    ///
    /// `success` drops to `false` as soon as this is called. Every call
    /// issues a request, and the server records a new version for each.
    /// Resolves to the restored entry when the request succeeded.
    pub fn restore_version(
        &self,
        target: EntryTarget,
        version: VersionId,
        request: RestoreRequest,
    ) -> impl Future<Output = Option<Entry>> + Send + '_ {
        let ticket = self.state.begin(|state| {
            state.loading = true;
            state.error = None;
            state.success = false;
        });

        async move {
            let result = self
                .api
                .restore_version(target.patient, target.entry, version, request)
                .await;
            let restored = match &result {
                Ok(entry) => Some(entry.clone()),
                Err(_) => None,
            };
            self.state.finish(ticket, |state| {
                state.loading = false;
                match result {
                    Ok(entry) => {
                        tracing::info!(entry = %entry.id, from = %version, "entry restored");
                        state.restored_entry = Some(entry);
                        state.success = true;
                    }
                    Err(e) => {
                        tracing::warn!(entry = %target.entry, from = %version, error = %e, "restore failed");
                        state.error = Some(e.to_string());
                    }
                }
            });
            restored
        }
    }

    pub fn reset(&self) {
        self.state.begin(|state| *state = RestoreState::default());
    }

    pub fn detach(&self) {
        self.state.detach();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::fake::{target, version, FakeApi};
    use crate::ClientError;

    #[tokio::test]
    async fn success_flag_resets_on_each_call() {
        let api = Arc::new(FakeApi::default());
        let v = version(target());
        api.set_versions(vec![v.clone()]);
        let workflow = RestoreWorkflow::new(api.clone());

        let restored = workflow
            .restore_version(target(), v.id, RestoreRequest::default())
            .await;
        assert!(restored.is_some());
        assert!(workflow.snapshot().success);

        let pending = workflow.restore_version(target(), v.id, RestoreRequest::default());
        let state = workflow.snapshot();
        assert!(!state.success);
        assert!(state.loading);
        pending.await;
        assert!(workflow.snapshot().success);

        assert_eq!(api.restored().len(), 2);
    }

    #[tokio::test]
    async fn restored_entry_is_published() {
        let api = Arc::new(FakeApi::default());
        let v = version(target());
        api.set_versions(vec![v.clone()]);
        let workflow = RestoreWorkflow::new(api);

        workflow
            .restore_version(
                target(),
                v.id,
                RestoreRequest {
                    editor_id: Some("cuddy".into()),
                    change_reason: None,
                },
            )
            .await;
        let state = workflow.snapshot();
        assert_eq!(state.restored_entry.map(|e| e.id), Some(target().entry));
        assert_eq!(state.error, None);
    }

    #[tokio::test]
    async fn failure_sets_error_and_keeps_success_false() {
        let api = Arc::new(FakeApi::default());
        api.fail_with(ClientError::Api {
            status: 409,
            code: "TYPE_MISMATCH".into(),
            message: "entry type differs".into(),
        });
        let workflow = RestoreWorkflow::new(api);

        let restored = workflow
            .restore_version(target(), VersionId::new(), RestoreRequest::default())
            .await;
        assert!(restored.is_none());
        let state = workflow.snapshot();
        assert!(!state.success);
        assert!(!state.loading);
        assert!(state.error.unwrap().contains("TYPE_MISMATCH"));
    }

    #[tokio::test]
    async fn reset_clears_state() {
        let api = Arc::new(FakeApi::default());
        let v = version(target());
        api.set_versions(vec![v.clone()]);
        let workflow = RestoreWorkflow::new(api);
        workflow
            .restore_version(target(), v.id, RestoreRequest::default())
            .await;
        workflow.reset();
        assert_eq!(workflow.snapshot(), RestoreState::default());
    }
}
