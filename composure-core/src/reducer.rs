//! Reducer trait and composition combinators
//!
//! A reducer is the unit of feature logic: it mutates state in place for one
//! action and returns an [`Effect`] describing any asynchronous follow-up
//! work. Reducers stay synchronous and fast; anything that suspends belongs
//! in the returned effect.
//!
//! Independently-authored reducers compose:
//! - [`Reducer::and`] runs two reducers against the same state and action,
//!   merging their effects (both always run, no short-circuit);
//! - [`Scoped`] lifts a (child state, child action) reducer into a parent
//!   domain through a lens and a partial action mapping;
//! - [`Reducer::for_each`] applies a child reducer element-wise over a
//!   [`KeyedList`](crate::KeyedList) - see [`ForEach`](crate::ForEach).
//!
//! # Example
//!
//! ```ignore
//! use composure::reducer::from_fn;
//! use composure::{Effect, Reducer};
//!
//! let counter = from_fn(|state: &mut i64, action: CounterAction, _path| {
//!     match action {
//!         CounterAction::Increment => *state += 1,
//!         CounterAction::Decrement => *state -= 1,
//!     }
//!     Effect::none()
//! });
//! ```

use std::sync::Arc;

use crate::action::Action;
use crate::effect::Effect;
use crate::identity::IdentityPath;

/// A unit of feature logic: `(state, action) -> (state mutated in place, effect)`.
///
/// `path` is the ambient identity path for the current scope; combinators
/// extend it as they descend into child domains, and reducers use it to mint
/// cancellation IDs rooted at their own scope (`path.descend("timer")`).
pub trait Reducer<S, A: Action>: Send + Sync {
    /// Process one action under exclusive access to the state.
    fn reduce(&self, state: &mut S, action: A, path: &IdentityPath) -> Effect<A>;

    /// Sequentially combine with another reducer over the same domain.
    ///
    /// Both reducers always observe the action, in order; their effects are
    /// merged. This lets a cross-cutting concern ride along with core logic.
    fn and<R>(self, other: R) -> Combined<Self, R>
    where
        Self: Sized,
        R: Reducer<S, A>,
    {
        Combined {
            first: self,
            second: other,
        }
    }

    /// Apply a child reducer to elements of a keyed collection, with
    /// identity-scoped effect cancellation for removed elements.
    ///
    /// See [`ForEach`](crate::ForEach) for the full contract.
    fn for_each<K, CS, CA, C, EL, EX, EM>(
        self,
        label: &'static str,
        elements: EL,
        extract: EX,
        embed: EM,
        child: C,
    ) -> crate::ForEach<Self, C, S, A, K, CS, CA>
    where
        Self: Sized,
        C: Reducer<CS, CA>,
        K: Clone + Eq + std::hash::Hash + std::fmt::Debug + Send + Sync + 'static,
        CA: Action,
        EL: Fn(&mut S) -> &mut crate::KeyedList<K, CS> + Send + Sync + 'static,
        EX: Fn(A) -> Option<(K, CA)> + Send + Sync + 'static,
        EM: Fn(K, CA) -> A + Send + Sync + 'static,
    {
        crate::ForEach::new(label, self, child, elements, extract, embed)
    }
}

/// Adapter implementing [`Reducer`] for a plain function or closure.
pub struct FnReducer<F> {
    function: F,
}

/// Build a reducer from `Fn(&mut S, A, &IdentityPath) -> Effect<A>`.
pub fn from_fn<F>(function: F) -> FnReducer<F> {
    FnReducer { function }
}

impl<S, A, F> Reducer<S, A> for FnReducer<F>
where
    A: Action,
    F: Fn(&mut S, A, &IdentityPath) -> Effect<A> + Send + Sync,
{
    fn reduce(&self, state: &mut S, action: A, path: &IdentityPath) -> Effect<A> {
        (self.function)(state, action, path)
    }
}

/// Two reducers run in sequence against the same state and action.
pub struct Combined<R1, R2> {
    first: R1,
    second: R2,
}

impl<S, A, R1, R2> Reducer<S, A> for Combined<R1, R2>
where
    A: Action,
    R1: Reducer<S, A>,
    R2: Reducer<S, A>,
{
    fn reduce(&self, state: &mut S, action: A, path: &IdentityPath) -> Effect<A> {
        let first = self.first.reduce(state, action.clone(), path);
        let second = self.second.reduce(state, action, path);
        first.merged(second)
    }
}

/// A child-domain reducer lifted into its parent's domain.
///
/// The lens gives the child exclusive access to its slice of the parent
/// state for the duration of one call; the action mapping is partial, so an
/// action that does not concern the child skips it entirely (treated as
/// [`Effect::none`], not an error). The child runs under
/// `path.descend(label)` and its effect is re-embedded into the parent
/// action space.
pub struct Scoped<C, S, A, CS, CA> {
    label: &'static str,
    child: C,
    lens: Box<dyn Fn(&mut S) -> &mut CS + Send + Sync>,
    extract: Box<dyn Fn(A) -> Option<CA> + Send + Sync>,
    embed: Arc<dyn Fn(CA) -> A + Send + Sync>,
}

impl<C, S, A, CS, CA> Scoped<C, S, A, CS, CA>
where
    A: Action,
    CA: Action,
    C: Reducer<CS, CA>,
{
    /// Lift `child` into the parent domain.
    pub fn new<L, EX, EM>(label: &'static str, lens: L, extract: EX, embed: EM, child: C) -> Self
    where
        L: Fn(&mut S) -> &mut CS + Send + Sync + 'static,
        EX: Fn(A) -> Option<CA> + Send + Sync + 'static,
        EM: Fn(CA) -> A + Send + Sync + 'static,
    {
        Self {
            label,
            child,
            lens: Box::new(lens),
            extract: Box::new(extract),
            embed: Arc::new(embed),
        }
    }
}

impl<C, S, A, CS, CA> Reducer<S, A> for Scoped<C, S, A, CS, CA>
where
    A: Action,
    CA: Action,
    C: Reducer<CS, CA>,
{
    fn reduce(&self, state: &mut S, action: A, path: &IdentityPath) -> Effect<A> {
        let Some(child_action) = (self.extract)(action) else {
            return Effect::none();
        };
        let child_path = path.descend(self.label);
        let child_state = (self.lens)(state);
        let effect = self.child.reduce(child_state, child_action, &child_path);
        let embed = self.embed.clone();
        effect.map(move |child_action| embed(child_action))
    }
}
