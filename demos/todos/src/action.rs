//! Actions

use composure::Action;

/// Actions for a single todo row.
#[derive(Action, Clone, Debug)]
pub enum TodoAction {
    TimerStart,
    TimerTick,
    TimerStop,
}

/// Top-level actions.
#[derive(Action, Clone, Debug)]
pub enum AppAction {
    /// An action addressed to one row.
    Todo(u64, TodoAction),
    TodoAdd { label: String },
    TodoRemove(u64),
}
