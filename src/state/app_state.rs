//! Main application state management

use std::{
    sync::{Arc, Mutex},
    time::Instant,
};
use chrono::{DateTime, Utc};
use tokio::{sync::broadcast, task::JoinHandle};
use tracing::{debug, info, warn};

use crate::{
    engine::{ClockEngine, ClockEvent, ClockSnapshot},
    services::store::{StateStore, PRIZES_KEY, TOURNAMENT_KEY},
    tasks::countdown_task,
};
use super::TournamentInfo;

/// Capacity of the clock event channel
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Shared handle to one clock instance, its countdown driver and the
/// tournament metadata
#[derive(Debug)]
pub struct AppState {
    /// The clock state machine
    pub engine: Mutex<ClockEngine>,
    /// Tournament metadata record
    pub tournament: Mutex<TournamentInfo>,
    /// Shared record storage
    pub store: Arc<dyn StateStore>,
    /// Clock events for observers
    pub event_tx: broadcast::Sender<ClockEvent>,
    /// Passive instances display the clock but never drive or command it
    pub passive: bool,
    /// Server metadata
    pub start_time: Instant,
    /// Last action tracking
    pub last_action: Mutex<Option<String>>,
    pub last_action_time: Mutex<Option<DateTime<Utc>>>,
    /// Running countdown driver, at most one
    countdown: Mutex<Option<JoinHandle<()>>>,
}

impl AppState {
    /// Load the clock and tournament records from the store
    pub fn new(store: Arc<dyn StateStore>, passive: bool) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let engine = ClockEngine::load(Arc::clone(&store), event_tx.clone());
        let tournament = load_tournament(store.as_ref());

        Self {
            engine: Mutex::new(engine),
            tournament: Mutex::new(tournament),
            store,
            event_tx,
            passive,
            start_time: Instant::now(),
            last_action: Mutex::new(None),
            last_action_time: Mutex::new(None),
            countdown: Mutex::new(None),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ClockEvent> {
        self.event_tx.subscribe()
    }

    /// Run an operator command against the engine.
    ///
    /// The countdown driver is cancelled whenever the command leaves the
    /// clock stopped.
    pub fn with_engine<F, R>(&self, action: &str, command: F) -> Result<R, String>
    where
        F: FnOnce(&mut ClockEngine) -> R,
    {
        let mut engine = self.engine.lock()
            .map_err(|e| format!("Failed to lock clock engine: {}", e))?;

        let result = command(&mut *engine);
        let running = engine.is_running();
        drop(engine);

        if !running {
            self.halt_countdown();
        }
        self.record_action(action);
        Ok(result)
    }

    fn record_action(&self, action: &str) {
        debug!("Clock action: {}", action);
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Start the clock and its countdown driver. Passive instances refuse.
    pub fn start(self: &Arc<Self>) -> Result<bool, String> {
        if self.passive {
            warn!("Ignoring start on a passive instance");
            return Ok(false);
        }
        let started = self.with_engine("start", |engine| engine.start())?;
        if started {
            self.spawn_countdown();
        }
        Ok(started)
    }

    pub fn stop(&self) -> Result<(), String> {
        self.with_engine("stop", |engine| engine.stop())
    }

    /// One countdown step. Returns whether the clock is still running.
    ///
    /// Commands another surface wrote since the last step are picked up
    /// first, so a remote stop ends the countdown instead of being
    /// overwritten.
    pub fn tick(&self) -> Result<bool, String> {
        let mut engine = self.engine.lock()
            .map_err(|e| format!("Failed to lock clock engine: {}", e))?;

        let changed = engine.sync_from_store();
        if engine.is_running() {
            engine.tick();
        } else {
            debug!("Clock stopped by another surface");
        }
        let running = engine.is_running();
        drop(engine);

        if changed {
            self.reload_tournament()?;
        }
        Ok(running)
    }

    /// Resume driving a clock that was persisted as running
    pub fn resume_if_running(self: &Arc<Self>) -> Result<bool, String> {
        if self.passive {
            return Ok(false);
        }
        let running = self.engine.lock()
            .map(|engine| engine.is_running())
            .map_err(|e| format!("Failed to lock clock engine: {}", e))?;
        if running {
            info!("Clock record says running, resuming countdown");
            self.spawn_countdown();
        }
        Ok(running)
    }

    /// Spawn the countdown driver, replacing any previous one
    fn spawn_countdown(self: &Arc<Self>) {
        let handle = tokio::spawn(countdown_task(Arc::clone(self)));
        match self.countdown.lock() {
            Ok(mut slot) => {
                if let Some(previous) = slot.replace(handle) {
                    previous.abort();
                }
            }
            Err(e) => {
                warn!("Failed to lock countdown handle, cancelling new driver: {}", e);
                handle.abort();
            }
        }
    }

    fn halt_countdown(&self) {
        match self.countdown.lock() {
            Ok(mut slot) => {
                if let Some(handle) = slot.take() {
                    handle.abort();
                    debug!("Countdown driver cancelled");
                }
            }
            Err(e) => warn!("Failed to lock countdown handle: {}", e),
        }
    }

    /// Whether a countdown driver is currently alive
    pub fn is_driving(&self) -> bool {
        self.countdown
            .lock()
            .map(|slot| slot.as_ref().map(|h| !h.is_finished()).unwrap_or(false))
            .unwrap_or(false)
    }

    /// Re-read both records after being told the store changed
    pub fn reload(&self) -> Result<bool, String> {
        let reloaded = self.with_engine("reload", |engine| engine.reload())?;
        self.reload_tournament()?;
        Ok(reloaded)
    }

    /// Reload only the records another writer changed
    pub fn sync_from_store(&self) -> Result<bool, String> {
        let mut engine = self.engine.lock()
            .map_err(|e| format!("Failed to lock clock engine: {}", e))?;
        let changed = engine.sync_from_store();
        let running = engine.is_running();
        drop(engine);

        if changed {
            if !running {
                self.halt_countdown();
            }
            self.reload_tournament()?;
        }
        Ok(changed)
    }

    pub fn snapshot(&self) -> Result<ClockSnapshot, String> {
        self.engine.lock()
            .map(|engine| engine.snapshot())
            .map_err(|e| format!("Failed to lock clock engine: {}", e))
    }

    /// Wipe every stored record and restore defaults
    pub fn wipe(&self) -> Result<(), String> {
        self.with_engine("wipe", |engine| engine.wipe())?;
        for key in [TOURNAMENT_KEY, PRIZES_KEY] {
            if let Err(e) = self.store.remove(key) {
                warn!("Failed to remove {} record: {:#}", key, e);
            }
        }
        let mut tournament = self.tournament.lock()
            .map_err(|e| format!("Failed to lock tournament info: {}", e))?;
        *tournament = TournamentInfo::default();
        Ok(())
    }

    pub fn get_tournament(&self) -> Result<TournamentInfo, String> {
        self.tournament.lock()
            .map(|info| info.clone())
            .map_err(|e| format!("Failed to lock tournament info: {}", e))
    }

    /// Apply an edit to the tournament record and persist it
    pub fn update_tournament<F, R>(&self, action: &str, updater: F) -> Result<(R, TournamentInfo), String>
    where
        F: FnOnce(&mut TournamentInfo) -> R,
    {
        let mut info = self.tournament.lock()
            .map_err(|e| format!("Failed to lock tournament info: {}", e))?;
        let result = updater(&mut *info);
        let updated = info.clone();
        drop(info);

        save_tournament(self.store.as_ref(), &updated);
        self.record_action(action);
        Ok((result, updated))
    }

    fn reload_tournament(&self) -> Result<(), String> {
        let loaded = load_tournament(self.store.as_ref());
        let mut info = self.tournament.lock()
            .map_err(|e| format!("Failed to lock tournament info: {}", e))?;
        *info = loaded;
        Ok(())
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}

/// Read the tournament record, preferring the mirrored reward list
fn load_tournament(store: &dyn StateStore) -> TournamentInfo {
    let mut info = match store.load(TOURNAMENT_KEY) {
        Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!("Tournament record is malformed, using defaults: {}", e);
            TournamentInfo::default()
        }),
        Ok(None) => TournamentInfo::default(),
        Err(e) => {
            warn!("Failed to read tournament record: {:#}", e);
            TournamentInfo::default()
        }
    };

    if let Ok(Some(raw)) = store.load(PRIZES_KEY) {
        if let Ok(rewards) = serde_json::from_str::<Vec<String>>(&raw) {
            info.rewards = rewards;
        }
    }
    info
}

fn save_tournament(store: &dyn StateStore, info: &TournamentInfo) {
    let records = serde_json::to_string(info)
        .and_then(|data| Ok((data, serde_json::to_string(&info.rewards)?)));

    match records {
        Ok((data, prizes)) => {
            if let Err(e) = store.save(TOURNAMENT_KEY, &data) {
                warn!("Failed to persist tournament record: {:#}", e);
            }
            if let Err(e) = store.save(PRIZES_KEY, &prizes) {
                warn!("Failed to persist reward list: {:#}", e);
            }
        }
        Err(e) => warn!("Failed to encode tournament record: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::store::MemoryStore;

    #[test]
    fn test_tournament_roundtrip_through_store() {
        let store: Arc<dyn StateStore> = Arc::new(MemoryStore::new());
        let state = AppState::new(Arc::clone(&store), false);

        let (_, info) = state
            .update_tournament("tournament", |info| {
                info.name = "Sunday Major".to_string();
                info.add_reward("Trophy");
            })
            .unwrap();
        assert_eq!(info.rewards.len(), 4);

        let other = AppState::new(store, true);
        let loaded = other.get_tournament().unwrap();
        assert_eq!(loaded.name, "Sunday Major");
        assert_eq!(loaded.rewards.last().map(String::as_str), Some("Trophy"));
    }

    #[test]
    fn test_prize_list_overrides_record() {
        let store = MemoryStore::new();
        store.save(TOURNAMENT_KEY, r#"{"name":"A","rewards":["x"]}"#).unwrap();
        store.save(PRIZES_KEY, r#"["y","z"]"#).unwrap();
        let info = load_tournament(&store);
        assert_eq!(info.name, "A");
        assert_eq!(info.rewards, vec!["y".to_string(), "z".to_string()]);
    }

    #[test]
    fn test_wipe_resets_everything() {
        let store: Arc<dyn StateStore> = Arc::new(MemoryStore::new());
        let state = AppState::new(Arc::clone(&store), false);
        state.update_tournament("tournament", |info| info.total_entries = 40).unwrap();
        state.with_engine("create", |engine| engine.create_configuration()).unwrap();

        state.wipe().unwrap();
        assert_eq!(state.get_tournament().unwrap(), TournamentInfo::default());
        assert_eq!(store.load(TOURNAMENT_KEY).unwrap(), None);
        assert_eq!(state.snapshot().unwrap().configurations.len(), 1);
    }

    #[test]
    fn test_last_action_recorded() {
        let state = AppState::new(Arc::new(MemoryStore::new()), false);
        state.with_engine("next", |engine| engine.advance()).unwrap();
        let (action, time) = state.get_last_action();
        assert_eq!(action.as_deref(), Some("next"));
        assert!(time.is_some());
    }
}
