//! Effects - declarative descriptions of asynchronous work
//!
//! An [`Effect`] is a value describing zero or more asynchronous units that
//! will eventually feed actions back into the store, plus any cancellations
//! to perform. Effects are returned from reducers and executed by the
//! [`Store`]; constructing one does nothing until it is handed over.
//!
//! The unit's output type is the action type itself, so a failing
//! collaborator call has to be converted into a result-style action
//! (`DidLoad`/`DidError`) inside the unit - there is no channel through
//! which an error could escape the effect machinery.
//!
//! # Example
//!
//! ```ignore
//! use composure::{Action, Effect};
//!
//! fn load(client: ApiClient) -> Effect<AppAction> {
//!     Effect::task(async move {
//!         match client.fetch().await {
//!             Ok(data) => AppAction::DidLoad(data),
//!             Err(e) => AppAction::DidError(e.to_string()),
//!         }
//!     })
//! }
//! ```
//!
//! [`Store`]: crate::Store

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

#[cfg(feature = "streams")]
use tokio_stream::{Stream, StreamExt};

use crate::action::Action;
use crate::identity::IdentityPath;

/// Boxed future producing exactly one action.
pub(crate) type ActionFuture<A> = Pin<Box<dyn Future<Output = A> + Send>>;

/// Boxed stream producing any number of actions, in order.
#[cfg(feature = "streams")]
pub(crate) type ActionStream<A> = Pin<Box<dyn Stream<Item = A> + Send>>;

/// One unit of an effect: something to run, or something to cancel.
pub(crate) enum Operation<A> {
    /// Run a future; feed its action back into the store when it completes.
    Task {
        id: Option<IdentityPath>,
        future: ActionFuture<A>,
    },
    /// Drain a stream; feed each emitted action back in order.
    #[cfg(feature = "streams")]
    Stream {
        id: Option<IdentityPath>,
        stream: ActionStream<A>,
    },
    /// Cancel every running unit whose tag equals or extends `id`.
    Cancel { id: IdentityPath },
}

/// A set of asynchronous units and cancellations produced by one reduce call.
///
/// Units run concurrently once the store executes the effect; there is no
/// ordering across units, but a single unit's emissions are delivered in
/// order and none are dropped.
pub struct Effect<A> {
    operations: Vec<Operation<A>>,
}

impl<A: Action> Effect<A> {
    /// The no-op effect.
    pub fn none() -> Self {
        Self {
            operations: Vec::new(),
        }
    }

    /// Wrap one asynchronous unit producing a single action.
    ///
    /// The unit starts when the store executes the effect. If it is
    /// cancelled before completion, its action is never delivered.
    pub fn task<F>(future: F) -> Self
    where
        F: Future<Output = A> + Send + 'static,
    {
        Self {
            operations: vec![Operation::Task {
                id: None,
                future: Box::pin(future),
            }],
        }
    }

    /// Wrap a long-lived unit emitting any number of actions.
    ///
    /// Each item is delivered in order as it is produced. The unit ends when
    /// the stream ends or when it is cancelled.
    #[cfg(feature = "streams")]
    pub fn stream<S>(stream: S) -> Self
    where
        S: Stream<Item = A> + Send + 'static,
    {
        Self {
            operations: vec![Operation::Stream {
                id: None,
                stream: Box::pin(stream),
            }],
        }
    }

    /// An effect that, when executed, cancels every running unit whose tag
    /// equals `id` or structurally extends it.
    ///
    /// Cancelling an unknown or already-finished tag is a no-op.
    pub fn cancel(id: IdentityPath) -> Self {
        Self {
            operations: vec![Operation::Cancel { id }],
        }
    }

    /// Combine effects; all constituent units run concurrently.
    pub fn merge<I>(effects: I) -> Self
    where
        I: IntoIterator<Item = Effect<A>>,
    {
        let mut operations = Vec::new();
        for effect in effects {
            operations.extend(effect.operations);
        }
        Self { operations }
    }

    /// Combine with another effect.
    pub fn merged(mut self, other: Effect<A>) -> Self {
        self.operations.extend(other.operations);
        self
    }

    /// Tag this effect's untagged units with a cancellation ID.
    ///
    /// Units already tagged by deeper scoping keep their tags; combinators
    /// only ever produce deeper tags that extend the outer one, so subtree
    /// cancellation still reaches them.
    #[must_use]
    pub fn cancellable(mut self, id: IdentityPath) -> Self {
        for operation in &mut self.operations {
            match operation {
                Operation::Task { id: tag, .. } => {
                    if tag.is_none() {
                        *tag = Some(id.clone());
                    }
                }
                #[cfg(feature = "streams")]
                Operation::Stream { id: tag, .. } => {
                    if tag.is_none() {
                        *tag = Some(id.clone());
                    }
                }
                Operation::Cancel { .. } => {}
            }
        }
        self
    }

    /// Re-parent the actions this effect will eventually emit.
    ///
    /// Used when embedding a child feature's effect into the parent action
    /// space. Cancellations pass through unchanged.
    pub fn map<B, F>(self, transform: F) -> Effect<B>
    where
        B: Action,
        F: Fn(A) -> B + Send + Sync + 'static,
    {
        let transform = Arc::new(transform);
        let operations = self
            .operations
            .into_iter()
            .map(|operation| match operation {
                Operation::Task { id, future } => {
                    let transform = transform.clone();
                    Operation::Task {
                        id,
                        future: Box::pin(async move { transform(future.await) }),
                    }
                }
                #[cfg(feature = "streams")]
                Operation::Stream { id, stream } => {
                    let transform = transform.clone();
                    Operation::Stream {
                        id,
                        stream: Box::pin(stream.map(move |action| transform(action))),
                    }
                }
                Operation::Cancel { id } => Operation::Cancel { id },
            })
            .collect();
        Effect { operations }
    }

    /// Whether this effect does nothing.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub(crate) fn into_operations(self) -> Vec<Operation<A>> {
        self.operations
    }
}

impl<A: Action> Default for Effect<A> {
    fn default() -> Self {
        Self::none()
    }
}

impl<A> fmt::Debug for Effect<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tasks = 0;
        let mut cancels = 0;
        #[cfg(feature = "streams")]
        let mut streams = 0;
        for operation in &self.operations {
            match operation {
                Operation::Task { .. } => tasks += 1,
                #[cfg(feature = "streams")]
                Operation::Stream { .. } => streams += 1,
                Operation::Cancel { .. } => cancels += 1,
            }
        }
        let mut out = f.debug_struct("Effect");
        out.field("tasks", &tasks);
        #[cfg(feature = "streams")]
        out.field("streams", &streams);
        out.field("cancels", &cancels);
        out.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    enum TestAction {
        Done(u32),
    }

    impl Action for TestAction {
        fn name(&self) -> &'static str {
            "Done"
        }
    }

    #[derive(Clone, Debug, PartialEq)]
    enum Wrapped {
        Child(TestAction),
    }

    impl Action for Wrapped {
        fn name(&self) -> &'static str {
            "Child"
        }
    }

    fn tag_of<A>(operation: &Operation<A>) -> Option<&IdentityPath> {
        match operation {
            Operation::Task { id, .. } => id.as_ref(),
            #[cfg(feature = "streams")]
            Operation::Stream { id, .. } => id.as_ref(),
            Operation::Cancel { .. } => None,
        }
    }

    #[test]
    fn test_none_is_empty() {
        assert!(Effect::<TestAction>::none().is_empty());
        assert!(!Effect::task(async { TestAction::Done(1) }).is_empty());
    }

    #[test]
    fn test_merge_keeps_every_unit() {
        let merged = Effect::merge([
            Effect::task(async { TestAction::Done(1) }),
            Effect::none(),
            Effect::task(async { TestAction::Done(2) }),
            Effect::cancel(IdentityPath::root().descend("timer")),
        ]);
        assert_eq!(merged.operations.len(), 3);
    }

    #[test]
    fn test_cancellable_tags_untagged_units_only() {
        let inner = IdentityPath::root().keyed("rows", 1_u64).descend("timer");
        let outer = IdentityPath::root().keyed("rows", 1_u64);

        let effect = Effect::task(async { TestAction::Done(1) })
            .cancellable(inner.clone())
            .merged(Effect::task(async { TestAction::Done(2) }))
            .cancellable(outer.clone());

        let tags: Vec<_> = effect.operations.iter().map(tag_of).collect();
        assert_eq!(tags, vec![Some(&inner), Some(&outer)]);
    }

    #[test]
    fn test_cancellable_skips_cancel_operations() {
        let target = IdentityPath::root().descend("timer");
        let effect =
            Effect::<TestAction>::cancel(target.clone()).cancellable(IdentityPath::root());

        match &effect.operations[0] {
            Operation::Cancel { id } => assert_eq!(id, &target),
            _ => panic!("expected cancel operation"),
        }
    }

    #[tokio::test]
    async fn test_map_transforms_eventual_action() {
        let effect = Effect::task(async { TestAction::Done(7) }).map(Wrapped::Child);

        let mut operations = effect.into_operations();
        match operations.remove(0) {
            Operation::Task { future, .. } => {
                assert_eq!(future.await, Wrapped::Child(TestAction::Done(7)));
            }
            _ => panic!("expected task operation"),
        }
    }

    #[test]
    fn test_map_preserves_tags_and_cancels() {
        let tag = IdentityPath::root().keyed("rows", 2_u64);
        let target = IdentityPath::root().descend("refresh");

        let effect = Effect::task(async { TestAction::Done(1) })
            .cancellable(tag.clone())
            .merged(Effect::cancel(target.clone()))
            .map(Wrapped::Child);

        match &effect.operations[0] {
            Operation::Task { id, .. } => assert_eq!(id.as_ref(), Some(&tag)),
            _ => panic!("expected task operation"),
        }
        match &effect.operations[1] {
            Operation::Cancel { id } => assert_eq!(id, &target),
            _ => panic!("expected cancel operation"),
        }
    }

    #[cfg(feature = "streams")]
    #[tokio::test]
    async fn test_stream_unit_preserves_emission_order() {
        let effect = Effect::stream(tokio_stream::iter(vec![
            TestAction::Done(1),
            TestAction::Done(2),
            TestAction::Done(3),
        ]));

        let mut operations = effect.into_operations();
        match operations.remove(0) {
            Operation::Stream { mut stream, .. } => {
                let mut seen = Vec::new();
                while let Some(action) = stream.next().await {
                    seen.push(action);
                }
                assert_eq!(
                    seen,
                    vec![TestAction::Done(1), TestAction::Done(2), TestAction::Done(3)]
                );
            }
            _ => panic!("expected stream operation"),
        }
    }
}
