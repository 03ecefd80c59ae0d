//! Clock state: configurations, active position and display settings

use serde::{Deserialize, Serialize};

use super::{Configuration, Level};

/// Levels in the synthesized demo structure
const DEFAULT_LEVELS: usize = 8;
/// Level length in minutes for the synthesized demo structure
const DEFAULT_LEVEL_MINUTES: u32 = 2;

/// Alert and display preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Alert when a level has one minute left
    pub one_minute_warning: bool,
    /// Alert when a level or break runs out
    pub level_change_sound: bool,
    /// Background color while on break (display only)
    pub break_color: String,
    /// Background color during play (display only)
    pub normal_color: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            one_minute_warning: true,
            level_change_sound: true,
            break_color: "#FFD700".to_string(),
            normal_color: "#87CEEB".to_string(),
        }
    }
}

/// The full clock record shared by every engine instance
///
/// Once built through [`ClockState::synthesized`] or record normalization it
/// holds at least one configuration and the active indices point inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockState {
    pub configurations: Vec<Configuration>,
    pub active_configuration_index: usize,
    pub active_level_index: usize,
    pub remaining_seconds: u32,
    pub is_on_break: bool,
    pub is_running: bool,
    pub settings: Settings,
}

/// Demo structure used when nothing usable is persisted
pub fn default_configuration() -> Configuration {
    let mut cfg = Configuration::doubling("default", "Demo Timer", DEFAULT_LEVELS, DEFAULT_LEVEL_MINUTES);
    cfg.set_break(1, 1);
    cfg
}

impl ClockState {
    /// Fresh state positioned at the start of the demo structure
    pub fn synthesized(settings: Settings) -> Self {
        let configuration = default_configuration();
        let remaining_seconds = configuration.levels[0].duration_seconds();

        Self {
            configurations: vec![configuration],
            active_configuration_index: 0,
            active_level_index: 0,
            remaining_seconds,
            is_on_break: false,
            is_running: false,
            settings,
        }
    }

    pub fn active_configuration(&self) -> Option<&Configuration> {
        self.configurations.get(self.active_configuration_index)
    }

    pub fn active_level(&self) -> Option<&Level> {
        self.active_configuration()
            .and_then(|cfg| cfg.level(self.active_level_index))
    }

    /// Full length of the active level, 0 if there is none
    pub fn active_level_seconds(&self) -> u32 {
        self.active_level()
            .map(Level::duration_seconds)
            .unwrap_or(0)
    }

    pub fn is_last_level(&self) -> bool {
        self.active_configuration()
            .map(|cfg| self.active_level_index >= cfg.last_level_index())
            .unwrap_or(true)
    }

    /// Pull the active position back inside the structure.
    ///
    /// Returns true when anything had to change.
    pub fn repair_position(&mut self) -> bool {
        let mut repaired = false;

        if self.active_configuration_index >= self.configurations.len() {
            self.active_configuration_index = 0;
            self.active_level_index = 0;
            self.is_on_break = false;
            repaired = true;
        }

        let last = self
            .active_configuration()
            .map(Configuration::last_level_index)
            .unwrap_or(0);
        if self.active_level_index > last {
            self.active_level_index = last;
            repaired = true;
        }

        // a break can only be left towards a following level
        if self.is_on_break && self.active_level_index >= last {
            self.is_on_break = false;
            repaired = true;
        }

        repaired
    }
}
