//! API request and response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    engine::ClockSnapshot,
    state::TournamentInfo,
};

/// API response structure for clock commands
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse {
    /// `ok` when the command changed something, `ignored` for a no-op
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub clock: ClockSnapshot,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(status: String, message: String, clock: ClockSnapshot) -> Self {
        Self {
            status,
            message,
            timestamp: Utc::now(),
            clock,
        }
    }

    /// The command was applied
    pub fn ok(message: String, clock: ClockSnapshot) -> Self {
        Self::new("ok".to_string(), message, clock)
    }

    /// The command had nothing to do
    pub fn ignored(message: String, clock: ClockSnapshot) -> Self {
        Self::new("ignored".to_string(), message, clock)
    }

    pub fn from_outcome(applied: bool, message: String, clock: ClockSnapshot) -> Self {
        if applied {
            Self::ok(message, clock)
        } else {
            Self::ignored(message, clock)
        }
    }
}

/// Status response for displays
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub clock: ClockSnapshot,
    pub driving: bool,
    pub passive: bool,
    pub uptime: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Tournament metadata with derived figures
#[derive(Debug, Clone, Serialize)]
pub struct TournamentResponse {
    pub status: String,
    #[serde(flatten)]
    pub info: TournamentInfo,
    pub prize_pool: u64,
    pub average_stack: u64,
}

impl TournamentResponse {
    pub fn new(applied: bool, info: TournamentInfo) -> Self {
        Self {
            status: if applied { "ok" } else { "ignored" }.to_string(),
            prize_pool: info.prize_pool(),
            average_stack: info.average_stack(),
            info,
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Body of PUT /configurations/:index/name
#[derive(Debug, Clone, Deserialize)]
pub struct RenameRequest {
    pub name: String,
}

/// Body of PUT /configurations/:index/breaks/:after
#[derive(Debug, Clone, Deserialize)]
pub struct BreakRequest {
    pub minutes: u32,
}

/// Body of POST /tournament/rewards
#[derive(Debug, Clone, Deserialize)]
pub struct RewardRequest {
    pub reward: String,
}
