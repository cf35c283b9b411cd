//! Todos - keyed-collection composure example
//!
//! A scripted run showing element-wise reducer composition:
//! rows are added, their timers start ticking, one row is removed while its
//! timer is still running, and the removal cancels exactly that row's timer.
//!
//! Run with `RUST_LOG=debug` to watch the store cancel the removed row's
//! effect units.

mod action;
mod reducer;
mod state;

use std::error::Error;
use std::time::Duration;

use clap::Parser;
use composure::prelude::*;
use tracing::info;

use action::{AppAction, TodoAction};
use state::AppState;

#[derive(Parser)]
#[command(about = "Keyed todo rows with per-row timer effects")]
struct Args {
    /// Number of rows to create
    #[arg(long, default_value_t = 3)]
    rows: u64,

    /// How long to let the timers run, in milliseconds
    #[arg(long, default_value_t = 1000)]
    run_ms: u64,

    /// Row key to remove mid-run
    #[arg(long, default_value_t = 1)]
    remove: u64,

    /// Dump the final state as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let store = Store::new(AppState::default(), reducer::reducer());

    for row in 0..args.rows {
        store.send(AppAction::TodoAdd {
            label: format!("todo #{row}"),
        });
        store.send(AppAction::Todo(row, TodoAction::TimerStart));
    }

    tokio::time::sleep(Duration::from_millis(args.run_ms / 2)).await;

    // Remove one row mid-run; its timer is cancelled, siblings keep ticking.
    store.send(AppAction::TodoRemove(args.remove));
    let removed_timer = IdentityPath::root()
        .keyed("todos", args.remove)
        .descend("timer");
    info!(
        row = args.remove,
        timer_running = store.is_running(&removed_timer),
        "after removal"
    );

    tokio::time::sleep(Duration::from_millis(args.run_ms / 2)).await;

    for key in store.with_state(|state| state.todos.keys().copied().collect::<Vec<_>>()) {
        store.send(AppAction::Todo(key, TodoAction::TimerStop));
    }

    let state = store.state();
    for (key, todo) in state.todos.iter() {
        info!(key, label = %todo.label, ticks = todo.ticks, "row");
    }
    if args.json {
        println!("{}", serde_json::to_string_pretty(&state)?);
    }

    store.shutdown();
    Ok(())
}
