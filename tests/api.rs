use std::sync::Arc;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use tourney_clock::{
    api::create_router,
    services::MemoryStore,
    state::AppState,
};

fn app(passive: bool) -> (Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(Arc::new(MemoryStore::new()), passive));
    (create_router(Arc::clone(&state)), state)
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_status_shows_default_structure() {
    let (app, _) = app(false);
    let (status, body) = call(&app, "GET", "/status", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["clock"]["formatted_time"], "02:00");
    assert_eq!(body["clock"]["phase"], "idle");
    assert_eq!(body["clock"]["current_level"]["bb"], 2);
    assert_eq!(body["clock"]["next_level"]["bb"], 4);
    assert_eq!(body["clock"]["next_break_minutes"], 4);
    assert_eq!(body["passive"], false);
}

#[tokio::test]
async fn test_previous_at_first_level_is_ignored() {
    let (app, _) = app(false);
    let (status, body) = call(&app, "POST", "/previous", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ignored");
    assert_eq!(body["clock"]["level_index"], 0);
}

#[tokio::test]
async fn test_break_flow() {
    let (app, _) = app(false);

    let (_, body) = call(&app, "PUT", "/configurations/0/breaks/0", Some(json!({"minutes": 5}))).await;
    assert_eq!(body["status"], "ok");

    let (_, body) = call(&app, "POST", "/next", None).await;
    assert_eq!(body["clock"]["is_on_break"], true);
    assert_eq!(body["clock"]["level_index"], 0);
    assert_eq!(body["clock"]["remaining_seconds"], 300);

    let (_, body) = call(&app, "POST", "/break-cut", None).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["clock"]["formatted_time"], "00:30");

    let (_, body) = call(&app, "POST", "/next", None).await;
    assert_eq!(body["clock"]["is_on_break"], false);
    assert_eq!(body["clock"]["level_index"], 1);

    let (_, body) = call(&app, "POST", "/break-cut", None).await;
    assert_eq!(body["status"], "ignored");
}

#[tokio::test]
async fn test_start_and_stop() {
    let (app, state) = app(false);

    let (_, body) = call(&app, "POST", "/start", None).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["clock"]["phase"], "running_level");
    assert!(state.is_driving());

    let (_, body) = call(&app, "POST", "/start", None).await;
    assert_eq!(body["status"], "ignored");

    let (_, body) = call(&app, "POST", "/stop", None).await;
    assert_eq!(body["clock"]["is_running"], false);
    assert!(!state.is_driving());
}

#[tokio::test]
async fn test_configuration_management() {
    let (app, _) = app(false);

    let (_, body) = call(&app, "POST", "/configurations", None).await;
    assert_eq!(body["clock"]["configuration_index"], 1);
    assert_eq!(body["clock"]["formatted_time"], "20:00");

    let (_, body) = call(&app, "PUT", "/configurations/1/name", Some(json!({"name": "Main Event"}))).await;
    assert_eq!(body["clock"]["configuration_name"], "Main Event");

    let (_, body) = call(&app, "POST", "/configurations/1/levels", None).await;
    assert_eq!(body["clock"]["configurations"][1]["levels"].as_array().unwrap().len(), 7);

    let level = json!({"duration": 30, "sb": 50, "bb": 100, "ante": 100});
    let (_, body) = call(&app, "PUT", "/configurations/1/levels/0", Some(level)).await;
    assert_eq!(body["clock"]["configurations"][1]["levels"][0]["sb"], 50);

    let (_, body) = call(&app, "POST", "/configurations/9/select", None).await;
    assert_eq!(body["status"], "ignored");
    assert_eq!(body["clock"]["configuration_index"], 1);

    let (_, body) = call(&app, "POST", "/configurations/0/select", None).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["clock"]["configuration_index"], 0);
}

#[tokio::test]
async fn test_delete_level_keeps_breaks_consistent() {
    let (app, _) = app(false);

    // default structure has a break after level index 1
    let (_, body) = call(&app, "DELETE", "/configurations/0/levels/1", None).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["clock"]["configurations"][0]["breaks"], json!([]));

    let (_, body) = call(&app, "DELETE", "/configurations/0/levels/40", None).await;
    assert_eq!(body["status"], "ignored");
}

#[tokio::test]
async fn test_settings_update() {
    let (app, _) = app(false);
    let settings = json!({"oneMinuteWarning": false, "breakColor": "#123456"});
    let (_, body) = call(&app, "PUT", "/settings", Some(settings)).await;

    assert_eq!(body["clock"]["settings"]["oneMinuteWarning"], false);
    assert_eq!(body["clock"]["settings"]["levelChangeSound"], true);
    assert_eq!(body["clock"]["settings"]["breakColor"], "#123456");
}

#[tokio::test]
async fn test_tournament_endpoints() {
    let (app, _) = app(false);

    let info = json!({
        "name": "Friday Deepstack",
        "currentPlayers": 8,
        "totalEntries": 10,
        "initialStack": 20000,
        "entryFee": 5000,
        "rewards": ["Trophy"]
    });
    let (_, body) = call(&app, "PUT", "/tournament", Some(info)).await;
    assert_eq!(body["name"], "Friday Deepstack");
    assert_eq!(body["prize_pool"], 50_000);
    assert_eq!(body["average_stack"], 25_000);

    let (_, body) = call(&app, "POST", "/tournament/rewards", Some(json!({"reward": "Cap"}))).await;
    assert_eq!(body["rewards"], json!(["Trophy", "Cap"]));

    let (_, body) = call(&app, "DELETE", "/tournament/rewards/5", None).await;
    assert_eq!(body["status"], "ignored");

    let (_, body) = call(&app, "DELETE", "/tournament/rewards/0", None).await;
    assert_eq!(body["rewards"], json!(["Cap"]));
}

#[tokio::test]
async fn test_passive_router_is_read_only() {
    let (app, _) = app(true);

    let (status, _) = call(&app, "GET", "/status", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = call(&app, "POST", "/start", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(&app, "PUT", "/tournament", Some(json!({"name": "x"}))).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_health() {
    let (app, _) = app(false);
    let (status, body) = call(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}
