//! The clock engine: level/break state machine over the shared record

use std::{cmp::Ordering, sync::Arc};
use chrono::Utc;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::{
    services::{
        record::{self, Decoded},
        store::{StateStore, CLOCK_KEY},
    },
    state::{ClockState, Configuration, Level, Settings},
    utils::format::format_mm_ss,
};
use super::{AlertKind, ClockEvent};

/// Seconds left on a break after the operator cuts it short
pub const BREAK_CUT_SECONDS: u32 = 30;

/// Derived run state of the clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    RunningLevel,
    RunningBreak,
    /// Stopped at zero on the last level
    Finished,
}

/// Single-owner state machine over one clock record.
///
/// Every mutating operation broadcasts its events and then writes the whole
/// record back to the store. Other engines sharing the store only see the
/// change once they reload; conflicting writes resolve last-write-wins.
#[derive(Debug)]
pub struct ClockEngine {
    state: ClockState,
    store: Arc<dyn StateStore>,
    events: broadcast::Sender<ClockEvent>,
    /// Raw record this engine last read or wrote
    last_record: Option<String>,
}

impl ClockEngine {
    /// Build an engine from the persisted record, synthesizing and saving
    /// defaults when nothing usable is stored.
    pub fn load(store: Arc<dyn StateStore>, events: broadcast::Sender<ClockEvent>) -> Self {
        let mut engine = Self {
            state: ClockState::synthesized(Settings::default()),
            store,
            events,
            last_record: None,
        };

        match engine.store.load(CLOCK_KEY) {
            Ok(Some(raw)) => engine.apply_record(raw),
            Ok(None) => {
                info!("No clock record found, creating the default structure");
                engine.persist();
            }
            Err(e) => error!("Failed to read clock record, using defaults: {:#}", e),
        }
        engine
    }

    /// Replace the in-memory state with the stored record.
    ///
    /// An absent record leaves the current state untouched.
    pub fn reload(&mut self) -> bool {
        match self.store.load(CLOCK_KEY) {
            Ok(Some(raw)) => {
                self.apply_record(raw);
                true
            }
            Ok(None) => {
                debug!("Clock record absent, keeping current state");
                false
            }
            Err(e) => {
                warn!("Failed to reload clock record: {:#}", e);
                false
            }
        }
    }

    /// Reload only when another writer changed the record since we last
    /// touched it.
    pub fn sync_from_store(&mut self) -> bool {
        match self.store.load(CLOCK_KEY) {
            Ok(Some(raw)) if self.last_record.as_deref() != Some(raw.as_str()) => {
                debug!("Clock record changed externally, reloading");
                self.apply_record(raw);
                true
            }
            Ok(_) => false,
            Err(e) => {
                warn!("Failed to poll clock record: {:#}", e);
                false
            }
        }
    }

    fn apply_record(&mut self, raw: String) {
        match record::decode(&raw) {
            Decoded::Valid { state, .. } => {
                self.state = state;
                self.last_record = Some(raw);
            }
            Decoded::Empty { settings } => {
                info!("Clock record has no usable configuration, creating the default structure");
                self.state = ClockState::synthesized(settings);
                self.persist();
            }
        }
    }

    /// Write the whole record back. Failures are logged and otherwise ignored.
    fn persist(&mut self) {
        let raw = match record::encode(&self.state, Utc::now()) {
            Ok(raw) => raw,
            Err(e) => {
                error!("Failed to encode clock record: {}", e);
                return;
            }
        };

        match self.store.save(CLOCK_KEY, &raw) {
            Ok(()) => self.last_record = Some(raw),
            Err(e) => warn!("Failed to persist clock record: {:#}", e),
        }
    }

    fn emit(&self, event: ClockEvent) {
        // no subscribers is fine
        self.events.send(event).ok();
    }

    fn alert(&self, kind: AlertKind) {
        self.emit(ClockEvent::Alert { kind });
    }

    fn emit_level_change(&self) {
        self.emit(ClockEvent::LevelChanged {
            level_index: self.state.active_level_index,
            is_on_break: self.state.is_on_break,
        });
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ClockEvent> {
        self.events.subscribe()
    }

    // ----- operator commands -----

    /// Start counting down. Returns false if the clock was already running.
    pub fn start(&mut self) -> bool {
        if self.state.is_running || self.state.active_configuration().is_none() {
            return false;
        }
        if self.state.remaining_seconds == 0 {
            self.state.remaining_seconds = self.state.active_level_seconds();
        }
        self.state.is_running = true;
        info!(
            level = self.state.active_level_index,
            remaining = self.state.remaining_seconds,
            "Clock started"
        );
        self.persist();
        true
    }

    pub fn stop(&mut self) {
        if self.state.is_running {
            info!(remaining = self.state.remaining_seconds, "Clock stopped");
        }
        self.state.is_running = false;
        self.persist();
    }

    /// Stop and rewind the active level to its full length
    pub fn reset(&mut self) {
        self.state.is_running = false;
        self.state.is_on_break = false;
        self.state.remaining_seconds = self.state.active_level_seconds();
        info!(level = self.state.active_level_index, "Clock reset");
        self.persist();
    }

    /// Move to the next phase: out of a break, into a break, to the next
    /// level, or into the finished state after the last level.
    pub fn advance(&mut self) {
        let Some(cfg) = self.state.active_configuration() else {
            self.stop();
            return;
        };
        let upcoming_break = cfg.break_after(self.state.active_level_index).copied();

        if self.state.is_on_break {
            self.state.is_on_break = false;
            self.state.active_level_index += 1;
            self.state.remaining_seconds = self.state.active_level_seconds();
            info!(level = self.state.active_level_index, "Break over");
        } else if self.state.is_last_level() {
            self.state.is_running = false;
            self.state.is_on_break = false;
            self.state.remaining_seconds = 0;
            info!("Last level complete, clock finished");
        } else if let Some(b) = upcoming_break {
            self.state.is_on_break = true;
            self.state.remaining_seconds = b.duration_seconds();
            info!(
                after_level = self.state.active_level_index,
                minutes = b.duration_minutes,
                "Break started"
            );
        } else {
            self.state.active_level_index += 1;
            self.state.is_on_break = false;
            self.state.remaining_seconds = self.state.active_level_seconds();
            info!(level = self.state.active_level_index, "Level advanced");
        }

        self.emit_level_change();
        self.persist();
    }

    /// Step back one level, dropping any break. Never re-enters the break
    /// between the previous level and this one.
    pub fn retreat(&mut self) -> bool {
        if self.state.active_level_index == 0 {
            return false;
        }
        self.state.active_level_index -= 1;
        self.state.is_on_break = false;
        self.state.remaining_seconds = self.state.active_level_seconds();
        info!(level = self.state.active_level_index, "Level retreated");
        self.emit_level_change();
        self.persist();
        true
    }

    /// Jump to the start of another configuration. Always stops the clock.
    pub fn select_configuration(&mut self, index: usize) -> bool {
        if index >= self.state.configurations.len() {
            return false;
        }
        self.state.active_configuration_index = index;
        self.state.active_level_index = 0;
        self.state.is_on_break = false;
        self.state.remaining_seconds = self.state.active_level_seconds();
        self.state.is_running = false;
        info!(configuration = index, "Configuration selected");
        self.persist();
        true
    }

    /// One countdown step; call once per elapsed second.
    pub fn tick(&mut self) {
        if !self.state.is_running {
            return;
        }

        if self.state.remaining_seconds > 0 {
            self.state.remaining_seconds -= 1;
            let remaining = self.state.remaining_seconds;

            if (1..=3).contains(&remaining) {
                self.alert(AlertKind::Pip);
            }
            if remaining == 60 && self.state.settings.one_minute_warning {
                self.alert(AlertKind::OneMinuteWarning);
            }
            self.emit(ClockEvent::TimeUpdated {
                remaining_seconds: remaining,
            });

            if remaining > 0 {
                self.persist();
                return;
            }
        }

        debug!(level = self.state.active_level_index, "Countdown reached zero");
        if self.state.settings.level_change_sound {
            self.alert(AlertKind::LevelEnd);
        }
        self.advance();
    }

    /// Shorten the current break to its last few seconds
    pub fn cut_break(&mut self) -> bool {
        if !self.state.is_on_break {
            return false;
        }
        self.state.remaining_seconds = BREAK_CUT_SECONDS;
        info!("Break cut to {} seconds", BREAK_CUT_SECONDS);
        self.emit(ClockEvent::TimeUpdated {
            remaining_seconds: BREAK_CUT_SECONDS,
        });
        self.persist();
        true
    }

    // ----- structure editing -----

    /// Append a configuration. Rejected without levels or with a zero-length
    /// level; its breaks are re-validated.
    pub fn add_configuration(&mut self, configuration: Configuration) -> Option<usize> {
        if configuration.levels.is_empty() || configuration.levels.iter().any(|l| l.duration == 0) {
            return None;
        }

        let mut cfg = Configuration {
            breaks: Vec::new(),
            ..configuration.clone()
        };
        for b in &configuration.breaks {
            cfg.set_break(b.after_level_index, b.duration_minutes);
        }

        info!(id = %cfg.id, name = %cfg.name, "Configuration added");
        self.state.configurations.push(cfg);
        self.persist();
        Some(self.state.configurations.len() - 1)
    }

    /// Create a fresh configuration and make it active
    pub fn create_configuration(&mut self) -> usize {
        let base = format!("timer_{}", Utc::now().timestamp_millis());
        let mut id = base.clone();
        let mut suffix = 1;
        while self.state.configurations.iter().any(|c| c.id == id) {
            id = format!("{}_{}", base, suffix);
            suffix += 1;
        }

        let index = self
            .add_configuration(Configuration::new_default(id))
            .unwrap_or(self.state.active_configuration_index);
        self.select_configuration(index);
        index
    }

    fn edit_configuration<F>(&mut self, index: usize, edit: F) -> bool
    where
        F: FnOnce(&mut Configuration) -> bool,
    {
        let changed = match self.state.configurations.get_mut(index) {
            Some(cfg) => edit(cfg),
            None => false,
        };
        if changed {
            self.persist();
        }
        changed
    }

    pub fn rename_configuration(&mut self, index: usize, name: &str) -> bool {
        self.edit_configuration(index, |cfg| {
            cfg.rename(name);
            true
        })
    }

    pub fn add_level(&mut self, index: usize) -> bool {
        self.edit_configuration(index, |cfg| {
            cfg.add_level();
            true
        })
    }

    pub fn update_level(&mut self, index: usize, level_index: usize, level: Level) -> bool {
        self.edit_configuration(index, |cfg| cfg.update_level(level_index, level))
    }

    /// Delete a level. In the active configuration the position follows the
    /// level it was on; deleting that level itself restarts the one sliding
    /// into its place.
    pub fn delete_level(&mut self, index: usize, level_index: usize) -> bool {
        let Some(cfg) = self.state.configurations.get_mut(index) else {
            return false;
        };
        if !cfg.delete_level(level_index) {
            return false;
        }

        if index == self.state.active_configuration_index {
            let replaced = match level_index.cmp(&self.state.active_level_index) {
                Ordering::Less => {
                    self.state.active_level_index -= 1;
                    false
                }
                Ordering::Equal => {
                    // its break went with it
                    self.state.is_on_break = false;
                    true
                }
                Ordering::Greater => false,
            };
            let repaired = self.state.repair_position();
            if (replaced || repaired) && !self.state.is_on_break {
                self.state.remaining_seconds = self.state.active_level_seconds();
            }
            self.emit_level_change();
        }
        self.persist();
        true
    }

    pub fn set_break(&mut self, index: usize, after_level_index: usize, minutes: u32) -> bool {
        self.edit_configuration(index, |cfg| cfg.set_break(after_level_index, minutes))
    }

    pub fn remove_break(&mut self, index: usize, after_level_index: usize) -> bool {
        self.edit_configuration(index, |cfg| cfg.remove_break(after_level_index))
    }

    pub fn update_settings(&mut self, settings: Settings) {
        self.state.settings = settings;
        self.persist();
    }

    /// Drop the stored record and start over from the default structure
    pub fn wipe(&mut self) {
        if let Err(e) = self.store.remove(CLOCK_KEY) {
            warn!("Failed to remove clock record: {:#}", e);
        }
        self.state = ClockState::synthesized(Settings::default());
        info!("Clock data wiped, default structure restored");
        self.emit_level_change();
        self.persist();
    }

    // ----- queries -----

    pub fn state(&self) -> &ClockState {
        &self.state
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running
    }

    pub fn phase(&self) -> Phase {
        match (self.state.is_running, self.state.is_on_break) {
            (true, true) => Phase::RunningBreak,
            (true, false) => Phase::RunningLevel,
            (false, false) if self.state.remaining_seconds == 0 && self.state.is_last_level() => {
                Phase::Finished
            }
            (false, _) => Phase::Idle,
        }
    }

    pub fn current_level(&self) -> Option<&Level> {
        self.state.active_level()
    }

    pub fn next_level(&self) -> Option<&Level> {
        self.state
            .active_configuration()
            .and_then(|cfg| cfg.level(self.state.active_level_index + 1))
    }

    pub fn formatted_time(&self) -> String {
        format_mm_ss(self.state.remaining_seconds)
    }

    /// Drives the warning display; breaks never warn
    pub fn is_under_one_minute(&self) -> bool {
        self.state.remaining_seconds <= 60 && !self.state.is_on_break
    }

    /// Whole minutes until the next break starts, `None` when no break is
    /// left. During a break this looks past the current one.
    pub fn next_break_minutes(&self) -> Option<u32> {
        let cfg = self.state.active_configuration()?;
        let last = cfg.last_level_index();

        let (start, partial) = if self.state.is_on_break {
            (self.state.active_level_index + 1, 0)
        } else {
            (
                self.state.active_level_index,
                self.state.remaining_seconds.div_ceil(60),
            )
        };

        let mut minutes = partial;
        for (i, level) in cfg.levels.iter().enumerate().skip(start) {
            if i > start || partial == 0 {
                minutes = minutes.saturating_add(level.duration);
            }
            // a break after the last level is never entered
            if i < last && cfg.break_after(i).is_some() {
                return Some(minutes);
            }
        }
        None
    }
}
