//! Tournament metadata shown next to the clock

use serde::{Deserialize, Serialize};

/// Companion record edited from the control surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TournamentInfo {
    pub name: String,
    pub current_players: u64,
    pub total_entries: u64,
    pub initial_stack: u64,
    pub entry_fee: u64,
    pub rewards: Vec<String>,
}

impl Default for TournamentInfo {
    fn default() -> Self {
        Self {
            name: "Demo Tournament".to_string(),
            current_players: 0,
            total_entries: 0,
            initial_stack: 10_000,
            entry_fee: 0,
            rewards: vec![
                "100,000".to_string(),
                "60,000".to_string(),
                "40,000".to_string(),
            ],
        }
    }
}

impl TournamentInfo {
    pub fn prize_pool(&self) -> u64 {
        self.entry_fee.saturating_mul(self.total_entries)
    }

    /// Chips in play divided by remaining players, 0 with nobody left
    pub fn average_stack(&self) -> u64 {
        if self.current_players == 0 {
            return 0;
        }
        self.initial_stack.saturating_mul(self.total_entries) / self.current_players
    }

    pub fn add_reward(&mut self, reward: impl Into<String>) {
        self.rewards.push(reward.into());
    }

    pub fn remove_reward(&mut self, index: usize) -> bool {
        if index < self.rewards.len() {
            self.rewards.remove(index);
            true
        } else {
            false
        }
    }
}
