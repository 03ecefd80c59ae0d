//! HTTP API module
//!
//! This module contains all HTTP endpoint handlers and response structures.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router. Passive instances only expose the read endpoints.
pub fn create_router(state: Arc<AppState>) -> Router {
    let tournament = if state.passive {
        get(get_tournament_handler)
    } else {
        get(get_tournament_handler).put(put_tournament_handler)
    };

    let mut router = Router::new()
        .route("/status", get(status_handler))
        .route("/tournament", tournament)
        .route("/health", get(health_handler));

    if !state.passive {
        router = router.merge(control_routes());
    }

    router
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn control_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/start", post(start_handler))
        .route("/stop", post(stop_handler))
        .route("/reset", post(reset_handler))
        .route("/next", post(next_handler))
        .route("/previous", post(previous_handler))
        .route("/break-cut", post(break_cut_handler))
        .route("/reload", post(reload_handler))
        .route("/wipe", post(wipe_handler))
        .route("/configurations", post(create_configuration_handler))
        .route("/configurations/:index/select", post(select_configuration_handler))
        .route("/configurations/:index/name", put(rename_configuration_handler))
        .route("/configurations/:index/levels", post(add_level_handler))
        .route(
            "/configurations/:index/levels/:level",
            put(update_level_handler).delete(delete_level_handler),
        )
        .route(
            "/configurations/:index/breaks/:after",
            put(set_break_handler).delete(remove_break_handler),
        )
        .route("/settings", put(settings_handler))
        .route("/tournament/rewards", post(add_reward_handler))
        .route("/tournament/rewards/:index", delete(remove_reward_handler))
}
