//! Application state

use composure::KeyedList;
use serde::Serialize;

/// One todo row with its own timer.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Todo {
    pub label: String,
    pub ticks: u32,
    pub running: bool,
}

impl Todo {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ticks: 0,
            running: false,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct AppState {
    /// Rows in insertion order, addressed by key.
    pub todos: KeyedList<u64, Todo>,
    /// Key for the next added row.
    pub next_key: u64,
}
