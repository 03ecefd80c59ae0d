use std::{fs, sync::Arc, time::Duration};
use tokio::time::sleep;

use tourney_clock::{
    services::{store::CLOCK_KEY, FileStore, MemoryStore, StateStore},
    state::AppState,
};

fn surface(store: &Arc<FileStore>, passive: bool) -> AppState {
    AppState::new(Arc::clone(store) as Arc<dyn StateStore>, passive)
}

#[test]
fn test_display_follows_control_surface() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileStore::new(dir.path()));

    let control = surface(&store, false);
    let display = surface(&store, true);

    assert!(!display.sync_from_store().unwrap());

    control.with_engine("next", |engine| engine.advance()).unwrap();
    control
        .update_tournament("tournament", |info| info.current_players = 9)
        .unwrap();

    assert!(display.sync_from_store().unwrap());
    let snapshot = display.snapshot().unwrap();
    assert_eq!(snapshot.level_index, 1);
    assert_eq!(display.get_tournament().unwrap().current_players, 9);
}

#[test]
fn test_fresh_instance_reproduces_position() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileStore::new(dir.path()));

    let first = surface(&store, false);
    first
        .with_engine("setup", |engine| {
            engine.advance();
            engine.advance();
        })
        .unwrap();
    let before = first.snapshot().unwrap();
    assert!(before.is_on_break);

    let second = surface(&store, false);
    let after = second.snapshot().unwrap();
    assert_eq!(after.configuration_index, before.configuration_index);
    assert_eq!(after.level_index, before.level_index);
    assert_eq!(after.remaining_seconds, before.remaining_seconds);
    assert_eq!(after.is_on_break, before.is_on_break);
    assert_eq!(after.is_running, before.is_running);
}

#[test]
fn test_malformed_record_replaced_with_defaults() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("tournamentTimer.json"), "{\"timers\": \"oops\"").unwrap();
    let store = Arc::new(FileStore::new(dir.path()));

    let state = surface(&store, false);
    let snapshot = state.snapshot().unwrap();
    assert_eq!(snapshot.configurations.len(), 1);
    assert_eq!(snapshot.configurations[0].id, "default");

    let raw = store.load(CLOCK_KEY).unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["timers"][0]["id"], "default");
}

#[test]
fn test_external_wipe_forces_defaults_on_next_start() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileStore::new(dir.path()));

    let first = surface(&store, false);
    first
        .with_engine("create", |engine| engine.create_configuration())
        .unwrap();
    assert_eq!(first.snapshot().unwrap().configurations.len(), 2);

    store.remove(CLOCK_KEY).unwrap();
    let second = surface(&store, false);
    assert_eq!(second.snapshot().unwrap().configurations.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_remote_stop_halts_running_driver() {
    let store: Arc<dyn StateStore> = Arc::new(MemoryStore::new());
    let driver = Arc::new(AppState::new(Arc::clone(&store), false));
    let remote = AppState::new(Arc::clone(&store), false);

    assert!(driver.start().unwrap());
    sleep(Duration::from_millis(1500)).await;

    assert!(remote.sync_from_store().unwrap());
    remote.stop().unwrap();

    sleep(Duration::from_secs(10)).await;
    assert!(!driver.is_driving());
    let snapshot = driver.snapshot().unwrap();
    assert!(!snapshot.is_running);
    assert_eq!(snapshot.remaining_seconds, 119);

    let raw = store.load(CLOCK_KEY).unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["isRunning"], false);
    assert_eq!(value["timeRemaining"], 119);
}

#[tokio::test(start_paused = true)]
async fn test_remote_advance_survives_running_driver() {
    let store: Arc<dyn StateStore> = Arc::new(MemoryStore::new());
    let driver = Arc::new(AppState::new(Arc::clone(&store), false));
    let remote = AppState::new(Arc::clone(&store), false);

    assert!(driver.start().unwrap());
    sleep(Duration::from_millis(1500)).await;

    remote.sync_from_store().unwrap();
    remote.with_engine("next", |engine| engine.advance()).unwrap();

    sleep(Duration::from_secs(2)).await;
    let snapshot = driver.snapshot().unwrap();
    assert_eq!(snapshot.level_index, 1);
    assert_eq!(snapshot.remaining_seconds, 118);
    assert!(driver.is_driving());
}
