//! Process-wide report state: the active analysis mode and the selected
//! term.
//!
//! The store is the single owner of both values. Dependents (the data
//! aggregator, the section registry) subscribe through a watch channel
//! instead of reading ambient globals.

use tokio::sync::watch;

use crate::api::Term;
use crate::models::{AnalysisMode, ReportOptions};

/// Snapshot of the mutable report state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportState {
    pub mode: AnalysisMode,
    pub term: Option<Term>,
}

/// Typed store with explicit mutation entry points and a subscription
/// contract for dependents.
#[derive(Debug)]
pub struct StateStore {
    tx: watch::Sender<ReportState>,
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StateStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ReportState::default());
        Self { tx }
    }

    pub fn snapshot(&self) -> ReportState {
        self.tx.borrow().clone()
    }

    /// Subscribe to state changes. Receivers observe the latest value
    /// only; intermediate states may be skipped.
    pub fn subscribe(&self) -> watch::Receiver<ReportState> {
        self.tx.subscribe()
    }

    /// Set the active mode directly. No notification when unchanged.
    pub fn set_mode(&self, mode: AnalysisMode) {
        self.tx.send_if_modified(|state| {
            if state.mode == mode {
                false
            } else {
                state.mode = mode;
                true
            }
        });
    }

    /// Derive and set the mode from the upload screen's report options.
    pub fn set_options(&self, options: ReportOptions) {
        self.set_mode(AnalysisMode::from_options(options));
    }

    /// Set or clear the selected term.
    pub fn set_term(&self, term: Option<Term>) {
        self.tx.send_if_modified(|state| {
            if state.term == term {
                false
            } else {
                state.term = term;
                true
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mutations_notify_subscribers() {
        let store = StateStore::new();
        let mut rx = store.subscribe();

        store.set_options(ReportOptions {
            census: true,
            comparison: false,
        });
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().mode, AnalysisMode::CensusDay);

        store.set_term(Some(Term::new("Term 1")));
        rx.changed().await.unwrap();
        assert_eq!(
            rx.borrow_and_update().term.as_ref().map(|t| t.as_str().to_string()),
            Some("Term 1".to_string())
        );
    }

    #[tokio::test]
    async fn unchanged_values_do_not_notify() {
        let store = StateStore::new();
        let mut rx = store.subscribe();

        store.set_mode(AnalysisMode::Default);
        store.set_term(None);
        assert!(!rx.has_changed().unwrap());
    }
}
