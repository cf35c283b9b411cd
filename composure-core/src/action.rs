//! Action trait for type-safe state mutations

use std::fmt::Debug;

/// Marker trait for actions that can be sent to the store
///
/// Actions describe something that happened: user input, an effect
/// completing, a timer firing, or a child feature's own action. They
/// should be:
/// - Clone: actions may be logged, replayed, or re-embedded by combinators
/// - Debug: for debugging and logging
/// - Send + 'static: effect units deliver actions across tasks
///
/// Use `#[derive(Action)]` from `composure-macros` to auto-implement this trait.
pub trait Action: Clone + Debug + Send + 'static {
    /// Get the action name for logging and filtering
    fn name(&self) -> &'static str;
}
