//! Serializable view of a clock for displays and the control surface

use serde::Serialize;

use crate::state::{Configuration, Level, Settings};
use super::{ClockEngine, Phase};

/// Everything a display needs to render one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClockSnapshot {
    pub phase: Phase,
    pub configuration_index: usize,
    pub configuration_name: String,
    pub level_index: usize,
    pub remaining_seconds: u32,
    pub formatted_time: String,
    pub is_on_break: bool,
    pub is_running: bool,
    pub under_one_minute: bool,
    pub current_level: Option<Level>,
    pub next_level: Option<Level>,
    pub next_break_minutes: Option<u32>,
    pub settings: Settings,
    pub configurations: Vec<Configuration>,
}

impl ClockEngine {
    pub fn snapshot(&self) -> ClockSnapshot {
        let state = self.state();

        ClockSnapshot {
            phase: self.phase(),
            configuration_index: state.active_configuration_index,
            configuration_name: state
                .active_configuration()
                .map(|cfg| cfg.name.clone())
                .unwrap_or_default(),
            level_index: state.active_level_index,
            remaining_seconds: state.remaining_seconds,
            formatted_time: self.formatted_time(),
            is_on_break: state.is_on_break,
            is_running: state.is_running,
            under_one_minute: self.is_under_one_minute(),
            current_level: self.current_level().copied(),
            next_level: self.next_level().copied(),
            next_break_minutes: self.next_break_minutes(),
            settings: state.settings.clone(),
            configurations: state.configurations.clone(),
        }
    }
}
