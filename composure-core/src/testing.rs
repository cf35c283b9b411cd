//! Test utilities for composure applications
//!
//! - [`ActionLog`]: shared recorder of every action a reducer observed
//! - [`recording`]: wrap a reducer so it records before delegating
//! - [`settle`]: give spawned effect units a chance to deliver
//!
//! # Example
//!
//! ```ignore
//! use composure::testing::{recording, settle, ActionLog};
//!
//! let log = ActionLog::new();
//! let store = Store::new(AppState::default(), recording(&log, app_reducer()));
//!
//! store.send(AppAction::Refresh);
//! settle().await;
//!
//! assert!(log.snapshot().contains(&AppAction::DidRefresh));
//! ```

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::action::Action;
use crate::reducer::{from_fn, Reducer};

/// Shared, thread-safe record of observed actions.
pub struct ActionLog<A> {
    entries: Arc<Mutex<Vec<A>>>,
}

impl<A> Clone for ActionLog<A> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<A> Default for ActionLog<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> ActionLog<A> {
    /// Create an empty log.
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Append an action.
    pub fn record(&self, action: A) {
        self.entries.lock().push(action);
    }

    /// Copy out everything recorded so far, in order.
    pub fn snapshot(&self) -> Vec<A>
    where
        A: Clone,
    {
        self.entries.lock().clone()
    }

    /// Number of recorded actions.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

/// Wrap a reducer so every action it observes lands in `log` first.
pub fn recording<S, A>(log: &ActionLog<A>, inner: impl Reducer<S, A>) -> impl Reducer<S, A>
where
    A: Action,
{
    let log = log.clone();
    from_fn(move |state: &mut S, action: A, path: &crate::identity::IdentityPath| {
        log.record(action.clone());
        inner.reduce(state, action, path)
    })
}

/// Yield long enough for already-spawned effect units to deliver.
///
/// Coarse by design; tests asserting timing should sleep explicitly.
pub async fn settle() {
    tokio::task::yield_now().await;
    tokio::time::sleep(Duration::from_millis(25)).await;
}
