// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use workout_tracker::config::Config;
use workout_tracker::db::{MemoryStorage, SlotStorage};
use workout_tracker::routes::create_router;
use workout_tracker::services::{
    CommandBuffer, ControllerConfig, WorkoutController, WorkoutRepository,
};
use workout_tracker::AppState;

/// Create a test app backed by in-memory storage.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (Router, Arc<AppState>) {
    create_test_app_with_storage(Arc::new(MemoryStorage::new()))
}

/// Create a test app on top of existing storage (e.g. to simulate a restart).
#[allow(dead_code)]
pub fn create_test_app_with_storage(storage: Arc<dyn SlotStorage>) -> (Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(Config::test_default(), storage));
    (create_router(state.clone()), state)
}

/// Build a controller with a command buffer on the given storage.
#[allow(dead_code)]
pub fn test_controller(storage: Arc<dyn SlotStorage>) -> WorkoutController<CommandBuffer> {
    WorkoutController::load(
        WorkoutRepository::new(storage),
        CommandBuffer::new(),
        ControllerConfig::default(),
    )
}

/// Send a request and decode the JSON response (Null for an empty body).
#[allow(dead_code)]
pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

/// Names of the commands in a response, in order.
#[allow(dead_code)]
pub fn command_names(response: &Value) -> Vec<String> {
    response["commands"]
        .as_array()
        .map(|commands| {
            commands
                .iter()
                .filter_map(|c| c["command"].as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}
