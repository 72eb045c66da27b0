//! Entry version workflows.
//!
//! Each workflow owns a state value published on a `watch` channel. An
//! operation changes the state synchronously when it is called (setting
//! `loading`, clearing stale data) and returns a future that performs the
//! request. The result is applied only while the operation is still the
//! latest one started on that workflow, so a slow earlier response never
//! overwrites a later one. After [`detach`](VersionHistory::detach) no
//! further updates are published.

mod browser;
mod diff;
mod history;
mod restore;

#[cfg(test)]
pub(crate) mod fake;

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use medrec_types::{EntryId, PatientId};
use tokio::sync::watch;

pub use browser::{BrowserState, VersionBrowser};
pub use diff::{DiffRequest, DiffState, DiffWorkflow};
pub use history::{HistoryState, VersionHistory};
pub use restore::{RestoreState, RestoreWorkflow};

/// The entry a workflow operates on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EntryTarget {
    pub patient: PatientId,
    pub entry: EntryId,
}

impl EntryTarget {
    pub fn new(patient: PatientId, entry: EntryId) -> Self {
        Self { patient, entry }
    }
}

/// Identifies one started operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Ticket(u64);

/// Published state plus the generation counter guarding it.
pub(crate) struct Guarded<S> {
    tx: watch::Sender<S>,
    generation: AtomicU64,
    detached: AtomicBool,
}

impl<S: Clone> Guarded<S> {
    pub(crate) fn new(initial: S) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self {
            tx,
            generation: AtomicU64::new(0),
            detached: AtomicBool::new(false),
        }
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<S> {
        self.tx.subscribe()
    }

    pub(crate) fn snapshot(&self) -> S {
        self.tx.borrow().clone()
    }

    /// Start a new operation: supersede every earlier one and apply its
    /// initial state change.
    pub(crate) fn begin(&self, start: impl FnOnce(&mut S)) -> Ticket {
        let ticket = Ticket(self.generation.fetch_add(1, Ordering::SeqCst) + 1);
        if !self.is_detached() {
            self.tx.send_modify(start);
        }
        ticket
    }

    /// Apply a result if `ticket` is still the latest operation.
    pub(crate) fn finish(&self, ticket: Ticket, apply: impl FnOnce(&mut S)) -> bool {
        self.tx.send_if_modified(|state| {
            if self.is_current(ticket) {
                apply(state);
                true
            } else {
                false
            }
        })
    }

    pub(crate) fn is_current(&self, ticket: Ticket) -> bool {
        !self.is_detached() && self.generation.load(Ordering::SeqCst) == ticket.0
    }

    pub(crate) fn detach(&self) {
        self.detached.store(true, Ordering::SeqCst);
    }

    pub(crate) fn is_detached(&self) -> bool {
        self.detached.load(Ordering::SeqCst)
    }
}
