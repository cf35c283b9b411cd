//! Core traits and types for composure
//!
//! This crate provides the foundational abstractions for building
//! applications with centralized state management, following a Redux/Elm-
//! inspired architecture with composable reducers and cancellable effects.
//!
//! # Core Concepts
//!
//! - **Action**: events that describe state changes
//! - **Reducer**: pure transition logic `(state, action) -> effect`,
//!   composed with [`Reducer::and`], [`Scoped`], and [`Reducer::for_each`]
//! - **Effect**: declarative description of async work and cancellations
//! - **IdentityPath**: structural ID scoping effects to collection elements
//! - **KeyedList**: ordered keyed collection of child states
//! - **Store**: serialized action processing and effect execution
//!
//! # Basic Example
//!
//! ```ignore
//! use composure::prelude::*;
//!
//! #[derive(Action, Clone, Debug)]
//! enum AppAction {
//!     Increment,
//!     Fetch,
//!     DidFetch(String),
//! }
//!
//! #[derive(Default)]
//! struct AppState {
//!     counter: i32,
//!     data: Option<String>,
//! }
//!
//! let reducer = from_fn(|state: &mut AppState, action: AppAction, _path| {
//!     match action {
//!         AppAction::Increment => {
//!             state.counter += 1;
//!             Effect::none()
//!         }
//!         AppAction::Fetch => Effect::task(async {
//!             AppAction::DidFetch(load_remote().await)
//!         }),
//!         AppAction::DidFetch(data) => {
//!             state.data = Some(data);
//!             Effect::none()
//!         }
//!     }
//! });
//!
//! let store = Store::new(AppState::default(), reducer);
//! store.send(AppAction::Increment);
//! ```
//!
//! # Child Features over Collections
//!
//! A child feature written against its own (state, action) pair is applied
//! element-wise over a [`KeyedList`] with [`Reducer::for_each`]. Effects the
//! child launches are tagged with the element's [`IdentityPath`]; when the
//! parent removes the element, the store cancels the element's entire effect
//! subtree and any late completions are discarded.

pub mod action;
pub mod effect;
pub mod foreach;
pub mod identity;
pub mod keyed;
pub mod reducer;
pub mod store;
pub mod testing;

// Core trait exports
pub use action::Action;
pub use effect::Effect;
pub use foreach::ForEach;
pub use identity::{IdentityPath, IdentityStep, KeyToken};
pub use keyed::KeyedList;
pub use reducer::{from_fn, Combined, FnReducer, Reducer, Scoped};
pub use store::Store;

// Testing exports
pub use testing::{recording, settle, ActionLog};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::action::Action;
    pub use crate::effect::Effect;
    pub use crate::foreach::ForEach;
    pub use crate::identity::{IdentityPath, KeyToken};
    pub use crate::keyed::KeyedList;
    pub use crate::reducer::{from_fn, Combined, FnReducer, Reducer, Scoped};
    pub use crate::store::Store;
}
