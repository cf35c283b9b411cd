//! Element-wise reducer composition over a keyed collection
//!
//! [`ForEach`] combines a parent reducer with a child reducer applied to
//! elements of a [`KeyedList`] inside the parent state. For each action it:
//!
//! 1. routes a matching `(key, child action)` to the element's child reducer
//!    first, under an identity path extended with `(label, key)`, and tags
//!    the child's effect with that path;
//! 2. runs the parent reducer (always, matching action or not);
//! 3. diffs the collection's key set from before/after the parent ran and
//!    emits one cancellation per removed key, tearing down the removed
//!    element's entire effect subtree.
//!
//! The child runs before the parent so it can still react to an action even
//! when the parent is about to remove its state in the same step. Removal is
//! detected by diffing rather than an explicit hook because the parent may
//! remove elements through arbitrary state mutation.
//!
//! An action addressed to a key that is no longer present is a logic error,
//! not a fault: an ancestor may already have removed the element before the
//! action was processed. It is logged via `tracing` and otherwise ignored.

use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

use crate::action::Action;
use crate::effect::Effect;
use crate::identity::IdentityPath;
use crate::keyed::KeyedList;
use crate::reducer::Reducer;

/// Parent/child reducer combination over a keyed collection.
///
/// Built with [`Reducer::for_each`]:
///
/// ```ignore
/// let app = from_fn(parent_reducer).for_each(
///     "todos",
///     |state: &mut AppState| &mut state.todos,
///     |action| match action {
///         AppAction::Todo(key, child) => Some((key, child)),
///         _ => None,
///     },
///     AppAction::Todo,
///     from_fn(todo_reducer),
/// );
/// ```
pub struct ForEach<P, C, S, A, K, CS, CA> {
    label: &'static str,
    parent: P,
    child: C,
    elements: Box<dyn Fn(&mut S) -> &mut KeyedList<K, CS> + Send + Sync>,
    extract: Box<dyn Fn(A) -> Option<(K, CA)> + Send + Sync>,
    embed: Arc<dyn Fn(K, CA) -> A + Send + Sync>,
}

impl<P, C, S, A, K, CS, CA> ForEach<P, C, S, A, K, CS, CA>
where
    A: Action,
    CA: Action,
    K: Clone + Eq + Hash + Debug + Send + Sync + 'static,
    P: Reducer<S, A>,
    C: Reducer<CS, CA>,
{
    pub(crate) fn new<EL, EX, EM>(
        label: &'static str,
        parent: P,
        child: C,
        elements: EL,
        extract: EX,
        embed: EM,
    ) -> Self
    where
        EL: Fn(&mut S) -> &mut KeyedList<K, CS> + Send + Sync + 'static,
        EX: Fn(A) -> Option<(K, CA)> + Send + Sync + 'static,
        EM: Fn(K, CA) -> A + Send + Sync + 'static,
    {
        Self {
            label,
            parent,
            child,
            elements: Box::new(elements),
            extract: Box::new(extract),
            embed: Arc::new(embed),
        }
    }

    fn reduce_element(&self, state: &mut S, key: K, child_action: CA, path: &IdentityPath) -> Effect<A> {
        let elements = (self.elements)(state);
        let Some(child_state) = elements.get_mut(&key) else {
            // An ancestor may have removed the element before this action
            // was processed; warn and move on.
            tracing::warn!(
                collection = self.label,
                key = ?key,
                action = child_action.name(),
                "action addressed to missing element"
            );
            return Effect::none();
        };

        let element_path = path.keyed(self.label, key.clone());
        let effect = self.child.reduce(child_state, child_action, &element_path);
        let embed = self.embed.clone();
        effect
            .map(move |child_action| embed(key.clone(), child_action))
            .cancellable(element_path)
    }
}

impl<P, C, S, A, K, CS, CA> Reducer<S, A> for ForEach<P, C, S, A, K, CS, CA>
where
    A: Action,
    CA: Action,
    K: Clone + Eq + Hash + Debug + Send + Sync + 'static,
    P: Reducer<S, A>,
    C: Reducer<CS, CA>,
{
    fn reduce(&self, state: &mut S, action: A, path: &IdentityPath) -> Effect<A> {
        // Child first: it must still see the action even if the parent is
        // about to remove its state in this same step.
        let element_effect = match (self.extract)(action.clone()) {
            Some((key, child_action)) => self.reduce_element(state, key, child_action, path),
            None => Effect::none(),
        };

        // Key-set snapshot after the child ran, before the parent runs.
        let ids_before: Vec<K> = (self.elements)(state).keys().cloned().collect();

        let parent_effect = self.parent.reduce(state, action, path);

        let elements = (self.elements)(state);
        let mut cancellations = Effect::none();
        for key in ids_before {
            if !elements.contains_key(&key) {
                tracing::debug!(collection = self.label, key = ?key, "element removed, cancelling its effects");
                cancellations = cancellations.merged(Effect::cancel(path.keyed(self.label, key)));
            }
        }

        Effect::merge([element_effect, parent_effect, cancellations])
    }
}
