//! Blind structure: levels, breaks and named configurations

use serde::{Deserialize, Serialize};

/// Number of levels in a freshly created configuration
const NEW_CONFIGURATION_LEVELS: usize = 6;
/// Level length in minutes for a freshly created configuration
const NEW_CONFIGURATION_MINUTES: u32 = 20;

/// A single timed step of the structure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    /// Length of the level in minutes
    pub duration: u32,
    #[serde(rename = "sb")]
    pub small_blind: u64,
    #[serde(rename = "bb")]
    pub big_blind: u64,
    pub ante: u64,
}

impl Level {
    pub fn new(duration: u32, small_blind: u64, big_blind: u64, ante: u64) -> Self {
        Self {
            duration,
            small_blind,
            big_blind,
            ante,
        }
    }

    /// Full length of the level in seconds
    pub fn duration_seconds(&self) -> u32 {
        self.duration.saturating_mul(60)
    }

    /// The level that follows this one in a doubling structure
    pub fn doubled(&self) -> Self {
        Self {
            duration: self.duration,
            small_blind: self.small_blind.saturating_mul(2),
            big_blind: self.big_blind.saturating_mul(2),
            ante: self.ante.saturating_mul(2),
        }
    }
}

/// A pause scheduled right after a level completes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Break {
    #[serde(rename = "level")]
    pub after_level_index: usize,
    #[serde(rename = "duration")]
    pub duration_minutes: u32,
}

impl Break {
    pub fn new(after_level_index: usize, duration_minutes: u32) -> Self {
        Self {
            after_level_index,
            duration_minutes,
        }
    }

    pub fn duration_seconds(&self) -> u32 {
        self.duration_minutes.saturating_mul(60)
    }
}

/// A named clock definition
///
/// Holds at least one level. Breaks are kept sorted by `after_level_index`
/// with at most one break per index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    pub id: String,
    pub name: String,
    pub levels: Vec<Level>,
    #[serde(default)]
    pub breaks: Vec<Break>,
}

impl Configuration {
    /// Build a doubling structure starting at 1/2 with a 2 ante
    pub fn doubling(id: impl Into<String>, name: impl Into<String>, levels: usize, minutes: u32) -> Self {
        let mut structure = Vec::with_capacity(levels);
        let mut level = Level::new(minutes, 1, 2, 2);
        for _ in 0..levels.max(1) {
            structure.push(level);
            level = level.doubled();
        }

        Self {
            id: id.into(),
            name: name.into(),
            levels: structure,
            breaks: Vec::new(),
        }
    }

    /// A fresh configuration for real play: six 20 minute levels, no breaks
    pub fn new_default(id: impl Into<String>) -> Self {
        Self::doubling(id, "New Timer", NEW_CONFIGURATION_LEVELS, NEW_CONFIGURATION_MINUTES)
    }

    pub fn level(&self, index: usize) -> Option<&Level> {
        self.levels.get(index)
    }

    pub fn last_level_index(&self) -> usize {
        self.levels.len().saturating_sub(1)
    }

    /// Break scheduled right after the given level, if any
    pub fn break_after(&self, level_index: usize) -> Option<&Break> {
        self.breaks
            .iter()
            .find(|b| b.after_level_index == level_index)
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Append a level copying the last duration and doubling the blinds
    pub fn add_level(&mut self) {
        let next = match self.levels.last() {
            Some(last) => last.doubled(),
            None => Level::new(NEW_CONFIGURATION_MINUTES, 1, 2, 2),
        };
        self.levels.push(next);
    }

    /// Replace the level at `index`. Returns false when out of range or the
    /// new duration is zero.
    pub fn update_level(&mut self, index: usize, level: Level) -> bool {
        if level.duration == 0 {
            return false;
        }
        match self.levels.get_mut(index) {
            Some(slot) => {
                *slot = level;
                true
            }
            None => false,
        }
    }

    /// Remove the level at `index` and keep break indices consistent.
    ///
    /// Refuses to remove the last remaining level. A break right after the
    /// removed level goes away with it; later breaks shift down by one.
    pub fn delete_level(&mut self, index: usize) -> bool {
        if self.levels.len() <= 1 || index >= self.levels.len() {
            return false;
        }

        self.levels.remove(index);
        self.breaks.retain(|b| b.after_level_index != index);
        for b in self.breaks.iter_mut() {
            if b.after_level_index > index {
                b.after_level_index -= 1;
            }
        }
        true
    }

    /// Schedule a break after `after_level_index`, overwriting the duration of
    /// an existing break at the same index.
    pub fn set_break(&mut self, after_level_index: usize, duration_minutes: u32) -> bool {
        if duration_minutes == 0 || after_level_index >= self.levels.len() {
            return false;
        }

        match self
            .breaks
            .iter_mut()
            .find(|b| b.after_level_index == after_level_index)
        {
            Some(existing) => existing.duration_minutes = duration_minutes,
            None => self.breaks.push(Break::new(after_level_index, duration_minutes)),
        }
        self.breaks.sort_by_key(|b| b.after_level_index);
        true
    }

    pub fn remove_break(&mut self, after_level_index: usize) -> bool {
        let before = self.breaks.len();
        self.breaks.retain(|b| b.after_level_index != after_level_index);
        self.breaks.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(levels: usize) -> Configuration {
        Configuration::doubling("t", "test", levels, 10)
    }

    #[test]
    fn test_doubling_structure() {
        let cfg = Configuration::doubling("d", "demo", 4, 2);
        assert_eq!(cfg.levels.len(), 4);
        assert_eq!(cfg.levels[0], Level::new(2, 1, 2, 2));
        assert_eq!(cfg.levels[3], Level::new(2, 8, 16, 16));
    }

    #[test]
    fn test_new_default_has_six_twenty_minute_levels() {
        let cfg = Configuration::new_default("timer_1");
        assert_eq!(cfg.levels.len(), 6);
        assert!(cfg.levels.iter().all(|l| l.duration == 20));
        assert!(cfg.breaks.is_empty());
    }

    #[test]
    fn test_set_break_twice_keeps_latest_duration() {
        let mut cfg = flat(4);
        assert!(cfg.set_break(1, 5));
        assert!(cfg.set_break(1, 15));
        assert_eq!(cfg.breaks, vec![Break::new(1, 15)]);
    }

    #[test]
    fn test_set_break_keeps_sorted() {
        let mut cfg = flat(5);
        cfg.set_break(3, 10);
        cfg.set_break(0, 5);
        cfg.set_break(2, 7);
        let order: Vec<usize> = cfg.breaks.iter().map(|b| b.after_level_index).collect();
        assert_eq!(order, vec![0, 2, 3]);
    }

    #[test]
    fn test_set_break_rejects_invalid() {
        let mut cfg = flat(3);
        assert!(!cfg.set_break(3, 10));
        assert!(!cfg.set_break(1, 0));
        assert!(cfg.breaks.is_empty());
    }

    #[test]
    fn test_delete_level_drops_and_shifts_breaks() {
        let mut cfg = flat(5);
        cfg.set_break(0, 5);
        cfg.set_break(2, 10);
        cfg.set_break(4, 15);

        assert!(cfg.delete_level(2));
        assert_eq!(cfg.levels.len(), 4);
        assert_eq!(cfg.breaks, vec![Break::new(0, 5), Break::new(3, 15)]);
    }

    #[test]
    fn test_delete_last_remaining_level_refused() {
        let mut cfg = flat(1);
        assert!(!cfg.delete_level(0));
        assert_eq!(cfg.levels.len(), 1);
    }

    #[test]
    fn test_delete_level_out_of_range() {
        let mut cfg = flat(2);
        assert!(!cfg.delete_level(2));
        assert_eq!(cfg.levels.len(), 2);
    }

    #[test]
    fn test_add_level_doubles_last() {
        let mut cfg = flat(2);
        cfg.add_level();
        assert_eq!(cfg.levels[2], Level::new(10, 4, 8, 8));
    }

    #[test]
    fn test_update_level() {
        let mut cfg = flat(2);
        assert!(cfg.update_level(1, Level::new(15, 3, 6, 6)));
        assert_eq!(cfg.levels[1].duration, 15);
        assert!(!cfg.update_level(5, Level::new(15, 3, 6, 6)));
        assert!(!cfg.update_level(0, Level::new(0, 3, 6, 6)));
    }

    #[test]
    fn test_remove_break() {
        let mut cfg = flat(3);
        cfg.set_break(1, 10);
        assert!(cfg.remove_break(1));
        assert!(!cfg.remove_break(1));
    }
}
