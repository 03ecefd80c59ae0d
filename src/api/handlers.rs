//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use tracing::{error, info};

use crate::state::{AppState, Level, Settings, TournamentInfo};
use super::responses::{
    ApiResponse, BreakRequest, HealthResponse, RenameRequest, RewardRequest, StatusResponse,
    TournamentResponse,
};

type CommandResult = Result<Json<ApiResponse>, StatusCode>;

fn internal_error(e: String) -> StatusCode {
    error!("Request failed: {}", e);
    StatusCode::INTERNAL_SERVER_ERROR
}

/// Answer a command with the clock as it stands afterwards
fn respond(state: &AppState, applied: bool, message: &str) -> CommandResult {
    let clock = state.snapshot().map_err(internal_error)?;
    Ok(Json(ApiResponse::from_outcome(applied, message.to_string(), clock)))
}

/// Handle POST /start - Start the countdown
pub async fn start_handler(State(state): State<Arc<AppState>>) -> CommandResult {
    let started = state.start().map_err(internal_error)?;
    if started {
        info!("Start endpoint called - clock running");
    }
    respond(&state, started, if started { "Clock started" } else { "Clock already running" })
}

/// Handle POST /stop - Stop the countdown
pub async fn stop_handler(State(state): State<Arc<AppState>>) -> CommandResult {
    state.stop().map_err(internal_error)?;
    info!("Stop endpoint called - clock stopped");
    respond(&state, true, "Clock stopped")
}

/// Handle POST /reset - Rewind the active level
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> CommandResult {
    state.with_engine("reset", |engine| engine.reset()).map_err(internal_error)?;
    respond(&state, true, "Level reset")
}

/// Handle POST /next - Advance to the next level or break
pub async fn next_handler(State(state): State<Arc<AppState>>) -> CommandResult {
    state.with_engine("next", |engine| engine.advance()).map_err(internal_error)?;
    respond(&state, true, "Advanced")
}

/// Handle POST /previous - Go back one level
pub async fn previous_handler(State(state): State<Arc<AppState>>) -> CommandResult {
    let moved = state
        .with_engine("previous", |engine| engine.retreat())
        .map_err(internal_error)?;
    respond(&state, moved, if moved { "Moved back one level" } else { "Already at the first level" })
}

/// Handle POST /break-cut - Cut the current break short
pub async fn break_cut_handler(State(state): State<Arc<AppState>>) -> CommandResult {
    let cut = state
        .with_engine("break-cut", |engine| engine.cut_break())
        .map_err(internal_error)?;
    respond(&state, cut, if cut { "Break cut short" } else { "Not on a break" })
}

/// Handle POST /reload - Re-read the persisted records
pub async fn reload_handler(State(state): State<Arc<AppState>>) -> CommandResult {
    let reloaded = state.reload().map_err(internal_error)?;
    respond(&state, reloaded, if reloaded { "Records reloaded" } else { "No clock record stored" })
}

/// Handle POST /wipe - Delete all records and restore defaults
pub async fn wipe_handler(State(state): State<Arc<AppState>>) -> CommandResult {
    state.wipe().map_err(internal_error)?;
    info!("Wipe endpoint called - all records reset");
    respond(&state, true, "All data wiped")
}

/// Handle POST /configurations - Create and select a fresh configuration
pub async fn create_configuration_handler(State(state): State<Arc<AppState>>) -> CommandResult {
    let index = state
        .with_engine("create-configuration", |engine| engine.create_configuration())
        .map_err(internal_error)?;
    respond(&state, true, &format!("Configuration {} created", index))
}

/// Handle POST /configurations/:index/select - Jump to a configuration
pub async fn select_configuration_handler(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
) -> CommandResult {
    let selected = state
        .with_engine("select-configuration", |engine| engine.select_configuration(index))
        .map_err(internal_error)?;
    respond(&state, selected, &format!("Select configuration {}", index))
}

/// Handle PUT /configurations/:index/name - Rename a configuration
pub async fn rename_configuration_handler(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
    Json(body): Json<RenameRequest>,
) -> CommandResult {
    let renamed = state
        .with_engine("rename-configuration", |engine| engine.rename_configuration(index, &body.name))
        .map_err(internal_error)?;
    respond(&state, renamed, &format!("Rename configuration {}", index))
}

/// Handle POST /configurations/:index/levels - Append a level
pub async fn add_level_handler(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
) -> CommandResult {
    let added = state
        .with_engine("add-level", |engine| engine.add_level(index))
        .map_err(internal_error)?;
    respond(&state, added, &format!("Add level to configuration {}", index))
}

/// Handle PUT /configurations/:index/levels/:level - Replace a level
pub async fn update_level_handler(
    State(state): State<Arc<AppState>>,
    Path((index, level_index)): Path<(usize, usize)>,
    Json(level): Json<Level>,
) -> CommandResult {
    let updated = state
        .with_engine("update-level", |engine| engine.update_level(index, level_index, level))
        .map_err(internal_error)?;
    respond(&state, updated, &format!("Update level {} of configuration {}", level_index + 1, index))
}

/// Handle DELETE /configurations/:index/levels/:level - Delete a level
pub async fn delete_level_handler(
    State(state): State<Arc<AppState>>,
    Path((index, level_index)): Path<(usize, usize)>,
) -> CommandResult {
    let deleted = state
        .with_engine("delete-level", |engine| engine.delete_level(index, level_index))
        .map_err(internal_error)?;
    respond(&state, deleted, &format!("Delete level {} of configuration {}", level_index + 1, index))
}

/// Handle PUT /configurations/:index/breaks/:after - Schedule a break
pub async fn set_break_handler(
    State(state): State<Arc<AppState>>,
    Path((index, after)): Path<(usize, usize)>,
    Json(body): Json<BreakRequest>,
) -> CommandResult {
    let set = state
        .with_engine("set-break", |engine| engine.set_break(index, after, body.minutes))
        .map_err(internal_error)?;
    respond(&state, set, &format!("{} minute break after level {}", body.minutes, after + 1))
}

/// Handle DELETE /configurations/:index/breaks/:after - Remove a break
pub async fn remove_break_handler(
    State(state): State<Arc<AppState>>,
    Path((index, after)): Path<(usize, usize)>,
) -> CommandResult {
    let removed = state
        .with_engine("remove-break", |engine| engine.remove_break(index, after))
        .map_err(internal_error)?;
    respond(&state, removed, &format!("Remove break after level {}", after + 1))
}

/// Handle PUT /settings - Replace alert and display settings
pub async fn settings_handler(
    State(state): State<Arc<AppState>>,
    Json(settings): Json<Settings>,
) -> CommandResult {
    state
        .with_engine("settings", |engine| engine.update_settings(settings))
        .map_err(internal_error)?;
    respond(&state, true, "Settings updated")
}

/// Handle GET /status - Return the clock as displays see it
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, StatusCode> {
    let clock = state.snapshot().map_err(internal_error)?;
    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        clock,
        driving: state.is_driving(),
        passive: state.passive,
        uptime: state.get_uptime(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /tournament - Return tournament metadata
pub async fn get_tournament_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TournamentResponse>, StatusCode> {
    let info = state.get_tournament().map_err(internal_error)?;
    Ok(Json(TournamentResponse::new(true, info)))
}

/// Handle PUT /tournament - Replace tournament metadata
pub async fn put_tournament_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<TournamentInfo>,
) -> Result<Json<TournamentResponse>, StatusCode> {
    let (_, info) = state
        .update_tournament("tournament", |info| *info = body)
        .map_err(internal_error)?;
    Ok(Json(TournamentResponse::new(true, info)))
}

/// Handle POST /tournament/rewards - Append a reward
pub async fn add_reward_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RewardRequest>,
) -> Result<Json<TournamentResponse>, StatusCode> {
    let applied = !body.reward.trim().is_empty();
    let (_, info) = state
        .update_tournament("add-reward", |info| {
            if applied {
                info.add_reward(body.reward.trim());
            }
        })
        .map_err(internal_error)?;
    Ok(Json(TournamentResponse::new(applied, info)))
}

/// Handle DELETE /tournament/rewards/:index - Remove a reward
pub async fn remove_reward_handler(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
) -> Result<Json<TournamentResponse>, StatusCode> {
    let (removed, info) = state
        .update_tournament("remove-reward", |info| info.remove_reward(index))
        .map_err(internal_error)?;
    Ok(Json(TournamentResponse::new(removed, info)))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
