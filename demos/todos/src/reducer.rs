//! Reducers - row logic composed over the keyed collection
//!
//! The row reducer only knows about a single [`Todo`]; `for_each` applies it
//! to whichever row an action addresses and tags the row's timer with the
//! row's identity. Removing a row from the collection cancels its timer
//! without the row reducer being involved.

use std::time::Duration;

use composure::prelude::*;
use tokio_stream::wrappers::IntervalStream;
use tokio_stream::StreamExt;
use tracing::info;

use crate::action::{AppAction, TodoAction};
use crate::state::{AppState, Todo};

/// Tick interval for row timers.
pub const TICK: Duration = Duration::from_millis(200);

/// Handles one row's actions.
pub fn todo_reducer(todo: &mut Todo, action: TodoAction, path: &IdentityPath) -> Effect<TodoAction> {
    match action {
        TodoAction::TimerStart => {
            todo.running = true;
            let ticks = IntervalStream::new(tokio::time::interval(TICK))
                .skip(1) // interval fires immediately; first tick comes after TICK
                .map(|_| TodoAction::TimerTick);
            Effect::stream(ticks).cancellable(path.descend("timer"))
        }
        TodoAction::TimerTick => {
            todo.ticks += 1;
            Effect::none()
        }
        TodoAction::TimerStop => {
            todo.running = false;
            Effect::cancel(path.descend("timer"))
        }
    }
}

/// Handles collection membership; rows handle themselves.
pub fn app_reducer(state: &mut AppState, action: AppAction, _path: &IdentityPath) -> Effect<AppAction> {
    match action {
        AppAction::TodoAdd { label } => {
            let key = state.next_key;
            state.next_key += 1;
            info!(key, label = %label, "row added");
            state.todos.insert(key, Todo::new(label));
            Effect::none()
        }
        AppAction::TodoRemove(key) => {
            if state.todos.remove(&key).is_some() {
                info!(key, "row removed");
            }
            Effect::none()
        }
        AppAction::Todo(..) => Effect::none(),
    }
}

/// The composed application reducer.
pub fn reducer() -> impl Reducer<AppState, AppAction> {
    from_fn(app_reducer).for_each(
        "todos",
        |state| &mut state.todos,
        |action| match action {
            AppAction::Todo(key, child) => Some((key, child)),
            _ => None,
        },
        AppAction::Todo,
        from_fn(todo_reducer),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_assigns_sequential_keys() {
        let mut state = AppState::default();
        let reducer = reducer();

        reducer.reduce(
            &mut state,
            AppAction::TodoAdd { label: "a".into() },
            &IdentityPath::root(),
        );
        reducer.reduce(
            &mut state,
            AppAction::TodoAdd { label: "b".into() },
            &IdentityPath::root(),
        );

        assert_eq!(state.todos.keys().copied().collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(state.next_key, 2);
    }

    #[test]
    fn test_remove_absent_row_is_noop() {
        let mut state = AppState::default();
        let reducer = reducer();

        let effect = reducer.reduce(&mut state, AppAction::TodoRemove(9), &IdentityPath::root());
        assert!(effect.is_empty());
    }

    #[tokio::test]
    async fn test_tick_increments_addressed_row_only() {
        let mut state = AppState::default();
        let reducer = reducer();
        reducer.reduce(
            &mut state,
            AppAction::TodoAdd { label: "a".into() },
            &IdentityPath::root(),
        );
        reducer.reduce(
            &mut state,
            AppAction::TodoAdd { label: "b".into() },
            &IdentityPath::root(),
        );

        reducer.reduce(
            &mut state,
            AppAction::Todo(1, TodoAction::TimerTick),
            &IdentityPath::root(),
        );

        assert_eq!(state.todos.get(&0).map(|todo| todo.ticks), Some(0));
        assert_eq!(state.todos.get(&1).map(|todo| todo.ticks), Some(1));
    }
}
