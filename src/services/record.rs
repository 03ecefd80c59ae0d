//! Persisted clock record: encoding and load-time normalization
//!
//! Decoding never fails as a whole. Every field falls back to its default on
//! its own, malformed configurations, levels and breaks are dropped, and the
//! result satisfies the clock invariants (at least one level per
//! configuration, sorted unique breaks inside the level range, active indices
//! in range).

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

use crate::state::{Break, ClockState, Configuration, Level, Settings};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ClockRecord<'a> {
    timers: &'a [Configuration],
    current_timer_index: usize,
    current_level_index: usize,
    time_remaining: u32,
    is_break: bool,
    is_running: bool,
    settings: &'a Settings,
    /// Write time in milliseconds, informational only
    last_updated: i64,
}

/// Outcome of reading a raw record
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    /// A usable state; `repaired` is set when anything had to be dropped or clamped
    Valid { state: ClockState, repaired: bool },
    /// No usable configuration; defaults must be synthesized
    Empty { settings: Settings },
}

/// Serialize the state into the shared record format
pub fn encode(state: &ClockState, now: DateTime<Utc>) -> serde_json::Result<String> {
    serde_json::to_string(&ClockRecord {
        timers: &state.configurations,
        current_timer_index: state.active_configuration_index,
        current_level_index: state.active_level_index,
        time_remaining: state.remaining_seconds,
        is_break: state.is_on_break,
        is_running: state.is_running,
        settings: &state.settings,
        last_updated: now.timestamp_millis(),
    })
}

/// Parse a raw record, repairing whatever can be repaired
pub fn decode(raw: &str) -> Decoded {
    let root = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => map,
        Ok(_) => {
            warn!("Clock record is not an object, ignoring it");
            return Decoded::Empty { settings: Settings::default() };
        }
        Err(e) => {
            warn!("Clock record is not valid JSON: {}", e);
            return Decoded::Empty { settings: Settings::default() };
        }
    };

    let settings = decode_settings(root.get("settings"));
    let mut dropped = 0usize;

    let configurations: Vec<Configuration> = match root.get("timers") {
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| {
                let cfg = decode_configuration(i, item, &mut dropped);
                if cfg.is_none() {
                    dropped += 1;
                }
                cfg
            })
            .collect(),
        _ => Vec::new(),
    };

    if configurations.is_empty() {
        return Decoded::Empty { settings };
    }

    let remaining = unsigned(root.get("timeRemaining")).unwrap_or(0);
    let mut state = ClockState {
        configurations,
        active_configuration_index: index(root.get("currentTimerIndex")),
        active_level_index: index(root.get("currentLevelIndex")),
        remaining_seconds: u32::try_from(remaining).unwrap_or(u32::MAX),
        is_on_break: truthy(root.get("isBreak")),
        is_running: truthy(root.get("isRunning")),
        settings,
    };

    let clamped = state.repair_position();
    if dropped > 0 || clamped {
        warn!(dropped, clamped, "Clock record needed repair");
    }

    Decoded::Valid {
        state,
        repaired: dropped > 0 || clamped,
    }
}

fn decode_settings(value: Option<&Value>) -> Settings {
    let mut settings = Settings::default();
    let Some(Value::Object(map)) = value else {
        return settings;
    };

    if let Some(flag) = map.get("oneMinuteWarning").and_then(Value::as_bool) {
        settings.one_minute_warning = flag;
    }
    if let Some(flag) = map.get("levelChangeSound").and_then(Value::as_bool) {
        settings.level_change_sound = flag;
    }
    if let Some(color) = map.get("breakColor").and_then(Value::as_str) {
        settings.break_color = color.to_string();
    }
    if let Some(color) = map.get("normalColor").and_then(Value::as_str) {
        settings.normal_color = color.to_string();
    }
    settings
}

fn decode_configuration(position: usize, value: &Value, dropped: &mut usize) -> Option<Configuration> {
    let map = value.as_object()?;

    let levels: Vec<Level> = match map.get("levels") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| {
                let level = decode_level(item);
                if level.is_none() {
                    *dropped += 1;
                }
                level
            })
            .collect(),
        _ => Vec::new(),
    };
    if levels.is_empty() {
        return None;
    }

    let id = match map.get("id") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => format!("timer_{}", position),
    };
    let name = map
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let mut cfg = Configuration {
        id,
        name,
        levels,
        breaks: Vec::new(),
    };

    // set_break validates the range, collapses duplicates and sorts
    if let Some(Value::Array(items)) = map.get("breaks") {
        for item in items {
            let accepted = decode_break(item)
                .map(|b| cfg.set_break(b.after_level_index, b.duration_minutes))
                .unwrap_or(false);
            if !accepted {
                *dropped += 1;
            }
        }
    }

    Some(cfg)
}

fn decode_level(value: &Value) -> Option<Level> {
    let map = value.as_object()?;
    let duration = positive_minutes(map, "duration")?;

    Some(Level {
        duration,
        small_blind: unsigned(map.get("sb")).unwrap_or(0),
        big_blind: unsigned(map.get("bb")).unwrap_or(0),
        ante: unsigned(map.get("ante")).unwrap_or(0),
    })
}

fn decode_break(value: &Value) -> Option<Break> {
    let map = value.as_object()?;
    let after = usize::try_from(unsigned(map.get("level"))?).ok()?;
    let minutes = positive_minutes(map, "duration")?;
    Some(Break::new(after, minutes))
}

fn positive_minutes(map: &Map<String, Value>, field: &str) -> Option<u32> {
    unsigned(map.get(field))
        .and_then(|n| u32::try_from(n).ok())
        .filter(|&n| n > 0)
}

/// Non-negative number, fractions truncated
fn unsigned(value: Option<&Value>) -> Option<u64> {
    let number = value?.as_number()?;
    if let Some(n) = number.as_u64() {
        return Some(n);
    }
    number
        .as_f64()
        .filter(|f| f.is_finite() && *f >= 0.0)
        .map(|f| f.trunc() as u64)
}

fn index(value: Option<&Value>) -> usize {
    unsigned(value)
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(0)
}

/// Loose truthiness, matching records written by older surfaces
fn truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(false),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
        Some(Value::Null) | None => false,
    }
}
