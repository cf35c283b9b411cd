//! Store - serialized action processing and effect execution
//!
//! The [`Store`] owns the application state and the composed root reducer.
//! [`Store::send`] runs the reducer under a single-writer lock and then
//! executes the returned [`Effect`]: tasks are spawned on tokio and
//! registered under their cancellation tag, cancellations abort every
//! registered unit whose tag equals or extends the target, and completed
//! units feed their actions back into the same serialized path.
//!
//! Effects never touch state directly; they only emit actions. A unit must
//! claim its registry entry (under the same lock) before its action is
//! delivered, so a cancellation that raced with a just-completing unit
//! always wins: the late action is discarded.
//!
//! Reducers must not call [`Store::send`] re-entrantly from inside
//! `reduce`; enqueue follow-up work as an effect instead.
//!
//! # Example
//!
//! ```ignore
//! use composure::{Effect, Store};
//! use composure::reducer::from_fn;
//!
//! let store = Store::new(AppState::default(), from_fn(app_reducer));
//! store.send(AppAction::RefreshAll);
//! let loading = store.with_state(|state| state.loading);
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::AbortHandle;
use tokio_util::sync::CancellationToken;

#[cfg(feature = "streams")]
use tokio_stream::StreamExt;

use crate::action::Action;
use crate::effect::{Effect, Operation};
use crate::identity::IdentityPath;
use crate::reducer::Reducer;

/// A running effect unit: its cancellation tag and abort handle.
struct Unit {
    id: Option<IdentityPath>,
    abort: AbortHandle,
}

/// Everything guarded by the single-writer lock.
struct Cell<S> {
    state: S,
    units: HashMap<u64, Unit>,
}

struct StoreInner<S, A: Action> {
    cell: Mutex<Cell<S>>,
    reducer: Box<dyn Reducer<S, A>>,
    changes: watch::Sender<u64>,
    shutdown: CancellationToken,
    next_unit: AtomicU64,
}

/// Centralized state container executing reducer-emitted effects.
///
/// Cheap to clone; all clones share the same state, reducer, and effect
/// registry. Spawning effect units requires a tokio runtime.
pub struct Store<S, A: Action> {
    inner: Arc<StoreInner<S, A>>,
}

impl<S, A: Action> Clone for Store<S, A> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<S, A> Store<S, A>
where
    S: Send + 'static,
    A: Action,
{
    /// Create a new store with the given initial state and root reducer.
    pub fn new<R>(state: S, reducer: R) -> Self
    where
        R: Reducer<S, A> + 'static,
    {
        let (changes, _) = watch::channel(0);
        Self {
            inner: Arc::new(StoreInner {
                cell: Mutex::new(Cell {
                    state,
                    units: HashMap::new(),
                }),
                reducer: Box::new(reducer),
                changes,
                shutdown: CancellationToken::new(),
                next_unit: AtomicU64::new(0),
            }),
        }
    }

    /// Send an action to the store.
    ///
    /// Runs the reducer under exclusive access and executes the returned
    /// effect. Concurrent sends serialize on the store's lock; state never
    /// exposes a partially-applied action.
    pub fn send(&self, action: A) {
        StoreInner::process(&self.inner, action);
    }

    /// Read the current state through a closure.
    pub fn with_state<R>(&self, read: impl FnOnce(&S) -> R) -> R {
        read(&self.inner.cell.lock().state)
    }

    /// Clone the current state.
    pub fn state(&self) -> S
    where
        S: Clone,
    {
        self.with_state(S::clone)
    }

    /// Observe state changes.
    ///
    /// The watch value is a version counter bumped after every processed
    /// action; a UI layer awaits `changed()` and re-reads the state.
    pub fn changes(&self) -> watch::Receiver<u64> {
        self.inner.changes.subscribe()
    }

    /// Whether any effect unit tagged at or under `id` is still running.
    pub fn is_running(&self, id: &IdentityPath) -> bool {
        self.inner
            .cell
            .lock()
            .units
            .values()
            .any(|unit| unit.id.as_ref().is_some_and(|tag| tag.starts_with(id)))
    }

    /// Number of currently-registered effect units.
    pub fn task_count(&self) -> usize {
        self.inner.cell.lock().units.len()
    }

    /// Cancel all running effect units and drop any further actions.
    pub fn shutdown(&self) {
        self.inner.shutdown.cancel();
        let mut cell = self.inner.cell.lock();
        for (_, unit) in cell.units.drain() {
            unit.abort.abort();
        }
    }
}

impl<S, A> StoreInner<S, A>
where
    S: Send + 'static,
    A: Action,
{
    fn process(this: &Arc<Self>, action: A) {
        if this.shutdown.is_cancelled() {
            tracing::debug!(action = action.name(), "store shut down, dropping action");
            return;
        }
        let mut cell = this.cell.lock();
        Self::reduce_and_apply(this, &mut cell, action);
        drop(cell);
        this.notify();
    }

    fn reduce_and_apply(this: &Arc<Self>, cell: &mut Cell<S>, action: A) {
        tracing::trace!(action = action.name(), "reducing");
        let effect = this
            .reducer
            .reduce(&mut cell.state, action, &IdentityPath::root());
        Self::apply(this, cell, effect);
    }

    fn apply(this: &Arc<Self>, cell: &mut Cell<S>, effect: Effect<A>) {
        for operation in effect.into_operations() {
            match operation {
                Operation::Cancel { id } => Self::cancel_matching(cell, &id),
                Operation::Task { id, future } => {
                    let unit = this.next_unit.fetch_add(1, Ordering::Relaxed);
                    let weak = Arc::downgrade(this);
                    let shutdown = this.shutdown.clone();
                    let handle = tokio::spawn(async move {
                        let action = tokio::select! {
                            biased;
                            _ = shutdown.cancelled() => return,
                            action = future => action,
                        };
                        Self::deliver(&weak, unit, action);
                    });
                    cell.units.insert(
                        unit,
                        Unit {
                            id,
                            abort: handle.abort_handle(),
                        },
                    );
                }
                #[cfg(feature = "streams")]
                Operation::Stream { id, stream } => {
                    let unit = this.next_unit.fetch_add(1, Ordering::Relaxed);
                    let weak = Arc::downgrade(this);
                    let shutdown = this.shutdown.clone();
                    let handle = tokio::spawn(async move {
                        let mut stream = stream;
                        loop {
                            let item = tokio::select! {
                                biased;
                                _ = shutdown.cancelled() => return,
                                item = stream.next() => item,
                            };
                            let Some(action) = item else {
                                // Stream ended on its own; deregister.
                                if let Some(inner) = weak.upgrade() {
                                    inner.cell.lock().units.remove(&unit);
                                }
                                return;
                            };
                            if !Self::emit(&weak, unit, action) {
                                return;
                            }
                        }
                    });
                    cell.units.insert(
                        unit,
                        Unit {
                            id,
                            abort: handle.abort_handle(),
                        },
                    );
                }
            }
        }
    }

    /// Deliver a one-shot unit's action, claiming its registry entry first.
    ///
    /// A unit whose entry was already removed by a cancellation discards
    /// its action: cancellation wins the race.
    fn deliver(weak: &Weak<Self>, unit: u64, action: A) {
        let Some(this) = weak.upgrade() else {
            return;
        };
        let mut cell = this.cell.lock();
        if cell.units.remove(&unit).is_none() {
            tracing::trace!(action = action.name(), "unit cancelled, discarding action");
            return;
        }
        Self::reduce_and_apply(&this, &mut cell, action);
        drop(cell);
        this.notify();
    }

    /// Deliver one stream emission while the unit stays registered.
    ///
    /// Returns false once the unit has been cancelled or the store dropped.
    #[cfg(feature = "streams")]
    fn emit(weak: &Weak<Self>, unit: u64, action: A) -> bool {
        let Some(this) = weak.upgrade() else {
            return false;
        };
        let mut cell = this.cell.lock();
        if !cell.units.contains_key(&unit) {
            tracing::trace!(action = action.name(), "unit cancelled, discarding emission");
            return false;
        }
        Self::reduce_and_apply(&this, &mut cell, action);
        drop(cell);
        this.notify();
        true
    }

    fn cancel_matching(cell: &mut Cell<S>, target: &IdentityPath) {
        let matched: Vec<u64> = cell
            .units
            .iter()
            .filter(|(_, unit)| {
                unit.id
                    .as_ref()
                    .is_some_and(|tag| tag.starts_with(target))
            })
            .map(|(unit, _)| *unit)
            .collect();
        if matched.is_empty() {
            tracing::trace!(id = %target, "cancellation matched no running units");
            return;
        }
        tracing::debug!(id = %target, count = matched.len(), "cancelling effect units");
        for unit in matched {
            if let Some(entry) = cell.units.remove(&unit) {
                entry.abort.abort();
            }
        }
    }

    fn notify(&self) {
        self.changes.send_modify(|version| *version = version.wrapping_add(1));
    }
}

impl<S, A: Action> Drop for StoreInner<S, A> {
    fn drop(&mut self) {
        // Abort everything still running when the last handle goes away.
        self.shutdown.cancel();
        for (_, unit) in self.cell.get_mut().units.drain() {
            unit.abort.abort();
        }
    }
}
