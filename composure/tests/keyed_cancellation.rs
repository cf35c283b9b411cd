//! End-to-end tests: element effects are torn down when their element is
//! removed, including effects launched by nested descendants.

use std::time::Duration;

use composure::prelude::*;
use composure::testing::settle;

#[derive(Action, Clone, Debug, PartialEq)]
enum RowAction {
    Start,
    Tick,
    Item(u32, ItemAction),
    ItemAdd(u32),
    ItemRemove(u32),
}

#[derive(Action, Clone, Debug, PartialEq)]
enum ItemAction {
    Start,
    Tick,
}

#[derive(Action, Clone, Debug, PartialEq)]
enum AppAction {
    Row(u64, RowAction),
    Add(u64),
    Remove(u64),
}

#[derive(Clone, Debug, Default, PartialEq)]
struct Item {
    ticks: u32,
}

#[derive(Clone, Debug, Default, PartialEq)]
struct Row {
    ticks: u32,
    items: KeyedList<u32, Item>,
}

#[derive(Clone, Debug, Default)]
struct AppState {
    rows: KeyedList<u64, Row>,
}

fn item_reducer() -> impl Reducer<Item, ItemAction> {
    from_fn(|item: &mut Item, action: ItemAction, path: &IdentityPath| match action {
        ItemAction::Start => Effect::task(async {
            tokio::time::sleep(Duration::from_millis(60)).await;
            ItemAction::Tick
        })
        .cancellable(path.descend("timer")),
        ItemAction::Tick => {
            item.ticks += 1;
            Effect::none()
        }
    })
}

fn row_reducer() -> impl Reducer<Row, RowAction> {
    from_fn(|row: &mut Row, action: RowAction, path: &IdentityPath| match action {
        RowAction::Start => Effect::task(async {
            tokio::time::sleep(Duration::from_millis(60)).await;
            RowAction::Tick
        })
        .cancellable(path.descend("timer")),
        RowAction::Tick => {
            row.ticks += 1;
            Effect::none()
        }
        RowAction::ItemAdd(key) => {
            row.items.insert(key, Item::default());
            Effect::none()
        }
        RowAction::ItemRemove(key) => {
            row.items.remove(&key);
            Effect::none()
        }
        RowAction::Item(..) => Effect::none(),
    })
    .for_each(
        "items",
        |row| &mut row.items,
        |action| match action {
            RowAction::Item(key, child) => Some((key, child)),
            _ => None,
        },
        RowAction::Item,
        item_reducer(),
    )
}

fn app_reducer() -> impl Reducer<AppState, AppAction> {
    from_fn(|state: &mut AppState, action: AppAction, _path: &IdentityPath| {
        match action {
            AppAction::Add(key) => {
                state.rows.insert(key, Row::default());
            }
            AppAction::Remove(key) => {
                state.rows.remove(&key);
            }
            AppAction::Row(..) => {}
        }
        Effect::none()
    })
    .for_each(
        "rows",
        |state| &mut state.rows,
        |action| match action {
            AppAction::Row(key, child) => Some((key, child)),
            _ => None,
        },
        AppAction::Row,
        row_reducer(),
    )
}

fn row_timer(key: u64) -> IdentityPath {
    IdentityPath::root().keyed("rows", key).descend("timer")
}

#[tokio::test]
async fn test_removed_row_timer_is_cancelled_sibling_survives() {
    let store = Store::new(AppState::default(), app_reducer());
    for key in [1, 2, 3] {
        store.send(AppAction::Add(key));
    }
    store.send(AppAction::Row(1, RowAction::Start));
    store.send(AppAction::Row(2, RowAction::Start));
    assert!(store.is_running(&row_timer(2)));

    store.send(AppAction::Remove(2));
    assert!(!store.is_running(&row_timer(2)));
    assert!(store.is_running(&row_timer(1)));

    tokio::time::sleep(Duration::from_millis(120)).await;

    // Row 1's timer completed; row 2's never delivered; row 3 untouched.
    let rows = store.with_state(|state| state.rows.clone());
    assert_eq!(rows.get(&1).map(|row| row.ticks), Some(1));
    assert!(!rows.contains_key(&2));
    assert_eq!(rows.get(&3).map(|row| row.ticks), Some(0));
}

fn item_timer(row: u64, item: u32) -> IdentityPath {
    IdentityPath::root()
        .keyed("rows", row)
        .keyed("items", item)
        .descend("timer")
}

#[tokio::test]
async fn test_row_removal_cancels_grandchild_timer() {
    let store = Store::new(AppState::default(), app_reducer());
    store.send(AppAction::Add(1));
    store.send(AppAction::Add(2));
    store.send(AppAction::Row(1, RowAction::ItemAdd(7)));
    store.send(AppAction::Row(2, RowAction::ItemAdd(8)));
    store.send(AppAction::Row(1, RowAction::Item(7, ItemAction::Start)));
    store.send(AppAction::Row(2, RowAction::Item(8, ItemAction::Start)));
    assert!(store.is_running(&item_timer(1, 7)));

    // Removing the whole row cancels the nested item's timer too; the other
    // row's item keeps running.
    store.send(AppAction::Remove(1));
    assert!(!store.is_running(&item_timer(1, 7)));
    assert!(store.is_running(&item_timer(2, 8)));

    tokio::time::sleep(Duration::from_millis(120)).await;
    assert_eq!(store.task_count(), 0);
    let ticks = store.with_state(|state| {
        state
            .rows
            .get(&2)
            .and_then(|row| row.items.get(&8))
            .map(|item| item.ticks)
    });
    assert_eq!(ticks, Some(1));
}

#[tokio::test]
async fn test_item_removal_cancels_only_that_item() {
    let store = Store::new(AppState::default(), app_reducer());
    store.send(AppAction::Add(1));
    store.send(AppAction::Row(1, RowAction::ItemAdd(7)));
    store.send(AppAction::Row(1, RowAction::ItemAdd(8)));
    store.send(AppAction::Row(1, RowAction::Item(7, ItemAction::Start)));
    store.send(AppAction::Row(1, RowAction::Item(8, ItemAction::Start)));

    store.send(AppAction::Row(1, RowAction::ItemRemove(7)));
    assert!(!store.is_running(&item_timer(1, 7)));
    assert!(store.is_running(&item_timer(1, 8)));
}

#[tokio::test]
async fn test_action_for_missing_row_is_ignored() {
    let store = Store::new(AppState::default(), app_reducer());
    store.send(AppAction::Add(1));

    store.send(AppAction::Row(9, RowAction::Tick));
    settle().await;

    assert_eq!(store.task_count(), 0);
    assert_eq!(
        store.with_state(|state| state.rows.get(&1).cloned()),
        Some(Row::default())
    );
}
