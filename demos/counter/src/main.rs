//! Counter - minimal composure example
//!
//! Demonstrates the core pattern in one file:
//! - State: what the app knows
//! - Actions: what can happen
//! - Reducer: how state changes, and which effects follow
//! - Store: where state lives and effects run
//!
//! The autosave effect is debounced: every change cancels the pending save
//! and schedules a new one, so a burst of changes produces a single save.

use std::time::Duration;

use composure::prelude::*;
use tracing::info;

// ============================================================================
// State - What the app knows
// ============================================================================

#[derive(Clone, Debug, Default)]
struct AppState {
    count: i64,
    saved_count: Option<i64>,
}

// ============================================================================
// Actions - What can happen
// ============================================================================

#[derive(Action, Clone, Debug)]
enum AppAction {
    Increment,
    Decrement,
    DidSave(i64),
}

// ============================================================================
// Reducer - How state changes (pure function, returns follow-up effects)
// ============================================================================

fn reducer(state: &mut AppState, action: AppAction, path: &IdentityPath) -> Effect<AppAction> {
    match action {
        AppAction::Increment => {
            state.count += 1;
            schedule_save(state.count, path)
        }
        AppAction::Decrement => {
            state.count -= 1;
            schedule_save(state.count, path)
        }
        AppAction::DidSave(count) => {
            info!(count, "autosaved");
            state.saved_count = Some(count);
            Effect::none()
        }
    }
}

/// Cancel the pending save, then schedule a fresh one.
fn schedule_save(count: i64, path: &IdentityPath) -> Effect<AppAction> {
    let id = path.descend("autosave");
    Effect::cancel(id.clone()).merged(
        Effect::task(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            AppAction::DidSave(count)
        })
        .cancellable(id),
    )
}

// ============================================================================
// Main - drive a scripted burst of changes
// ============================================================================

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,composure_core=debug")),
        )
        .init();

    let store = Store::new(AppState::default(), from_fn(reducer));

    // A burst of changes, faster than the debounce window.
    for _ in 0..5 {
        store.send(AppAction::Increment);
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    store.send(AppAction::Decrement);
    info!(
        count = store.with_state(|state| state.count),
        "burst done, waiting for autosave"
    );

    tokio::time::sleep(Duration::from_millis(300)).await;

    let state = store.state();
    info!(count = state.count, saved = ?state.saved_count, "final state");
    store.shutdown();
}
