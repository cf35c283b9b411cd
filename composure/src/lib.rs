//! composure: composable state management with cancellable effects
//!
//! Like Redux/Elm, but with an effect system: reducers are pure transition
//! functions that mutate state in place and return declarative descriptions
//! of async work. Child features compose into parents, including
//! element-wise over keyed collections, and removing a collection element
//! cancels exactly the effects that belong to it.
//!
//! # Example
//! ```ignore
//! use composure::prelude::*;
//!
//! #[derive(Action, Clone, Debug)]
//! enum AppAction {
//!     Todo(u64, TodoAction),
//!     TodoRemove(u64),
//! }
//!
//! let app = from_fn(app_reducer).for_each(
//!     "todos",
//!     |state: &mut AppState| &mut state.todos,
//!     |action| match action {
//!         AppAction::Todo(key, child) => Some((key, child)),
//!         _ => None,
//!     },
//!     AppAction::Todo,
//!     from_fn(todo_reducer),
//! );
//!
//! let store = Store::new(AppState::default(), app);
//! ```

// Re-export everything from core
pub use composure_core::*;

// Re-export derive macros
pub use composure_macros::Action;

/// Prelude for convenient imports
pub mod prelude {
    // Traits
    pub use composure_core::{Action, Reducer};

    // Reducer composition
    pub use composure_core::{from_fn, Combined, FnReducer, ForEach, Scoped};

    // Effects and identity
    pub use composure_core::{Effect, IdentityPath, KeyToken};

    // State containers
    pub use composure_core::{KeyedList, Store};

    // Derive macros
    pub use composure_macros::Action;
}
