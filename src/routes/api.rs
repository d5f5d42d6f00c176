// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout API: one endpoint per page event.
//!
//! Mutating endpoints answer with the render commands the page must apply.

use crate::error::{AppError, Result};
use crate::models::{Coordinates, WorkoutId, WorkoutKind};
use crate::services::{
    CommandBuffer, RenderCommand, WorkoutController, WorkoutSubmission, WorkoutView,
};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// Workout API routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/session", get(get_session))
        .route("/api/position", post(position_acquired))
        .route("/api/position/denied", post(position_denied))
        .route("/api/map/click", post(map_clicked))
        .route("/api/form/cancel", post(cancel_form))
        .route(
            "/api/workouts",
            get(list_workouts).post(submit_workout).delete(reset_workouts),
        )
        .route("/api/workouts/sort", post(toggle_sort))
        .route("/api/workouts/{id}", get(get_workout).delete(delete_workout))
        .route("/api/workouts/{id}/edit", post(edit_workout))
        .route("/api/workouts/{id}/select", post(select_workout))
}

/// Run one event against the controller and collect the render commands.
///
/// Commands are drained even when the event fails so they never leak into
/// the next response.
fn dispatch<T>(
    state: &AppState,
    event: impl FnOnce(&mut WorkoutController<CommandBuffer>) -> Result<T>,
) -> Result<(T, Vec<RenderCommand>)> {
    let mut controller = state.controller()?;
    let outcome = event(&mut controller);
    let commands = controller.drain_commands();
    outcome.map(|value| (value, commands))
}

// ─── Responses ───────────────────────────────────────────────

/// Render commands for the page.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CommandsResponse {
    pub commands: Vec<RenderCommand>,
}

impl From<Vec<RenderCommand>> for CommandsResponse {
    fn from(commands: Vec<RenderCommand>) -> Self {
        Self { commands }
    }
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CreatedResponse {
    pub id: String,
    pub commands: Vec<RenderCommand>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SortResponse {
    pub sorted: bool,
    pub commands: Vec<RenderCommand>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct WorkoutsResponse {
    /// Top-to-bottom list order
    pub workouts: Vec<WorkoutView>,
    pub sorted: bool,
    pub total: u32,
}

// ─── Session & Geolocation ───────────────────────────────────

/// Everything needed to draw the page after a (re)load.
async fn get_session(State(state): State<Arc<AppState>>) -> Result<Json<CommandsResponse>> {
    let ((), commands) = dispatch(&state, |c| {
        c.replay();
        Ok(())
    })?;
    Ok(Json(commands.into()))
}

/// A point on the map, in degrees.
#[derive(Debug, Deserialize, Validate)]
struct PointRequest {
    #[validate(range(min = -90.0, max = 90.0))]
    lat: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    lng: f64,
}

impl PointRequest {
    fn coordinates(&self) -> Result<Coordinates> {
        self.validate()
            .map_err(|e| AppError::BadRequest(format!("Invalid coordinates: {}", e)))?;
        Ok(Coordinates::new(self.lat, self.lng))
    }
}

async fn position_acquired(
    State(state): State<Arc<AppState>>,
    Json(point): Json<PointRequest>,
) -> Result<Json<CommandsResponse>> {
    let coords = point.coordinates()?;
    let ((), commands) = dispatch(&state, |c| {
        c.on_position_acquired(coords);
        Ok(())
    })?;
    Ok(Json(commands.into()))
}

async fn position_denied(State(state): State<Arc<AppState>>) -> Result<Json<CommandsResponse>> {
    let ((), commands) = dispatch(&state, |c| {
        c.on_position_denied();
        Ok(())
    })?;
    Ok(Json(commands.into()))
}

// ─── Form ────────────────────────────────────────────────────

async fn map_clicked(
    State(state): State<Arc<AppState>>,
    Json(point): Json<PointRequest>,
) -> Result<Json<CommandsResponse>> {
    let coords = point.coordinates()?;
    tracing::debug!(lat = coords.lat, lng = coords.lng, "Map clicked");
    let ((), commands) = dispatch(&state, |c| c.begin_create(coords))?;
    Ok(Json(commands.into()))
}

async fn cancel_form(State(state): State<Arc<AppState>>) -> Result<Json<CommandsResponse>> {
    let ((), commands) = dispatch(&state, |c| {
        c.cancel();
        Ok(())
    })?;
    Ok(Json(commands.into()))
}

/// Submitted form fields. Empty inputs arrive as missing or `null`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WorkoutForm {
    kind: WorkoutKind,
    distance_km: Option<f64>,
    duration_min: Option<f64>,
    cadence_spm: Option<f64>,
    elevation_gain_m: Option<f64>,
}

impl WorkoutForm {
    /// Missing numbers become NaN so they fail validation as non-numbers.
    fn into_submission(self) -> WorkoutSubmission {
        let extra = match self.kind {
            WorkoutKind::Running => self.cadence_spm,
            WorkoutKind::Cycling => self.elevation_gain_m,
        };
        WorkoutSubmission {
            kind: self.kind,
            distance_km: self.distance_km.unwrap_or(f64::NAN),
            duration_min: self.duration_min.unwrap_or(f64::NAN),
            extra: extra.unwrap_or(f64::NAN),
        }
    }
}

async fn submit_workout(
    State(state): State<Arc<AppState>>,
    Json(form): Json<WorkoutForm>,
) -> Result<(StatusCode, Json<CreatedResponse>)> {
    let submission = form.into_submission();
    let (id, commands) = dispatch(&state, |c| c.submit(submission))?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            id: id.to_string(),
            commands,
        }),
    ))
}

// ─── Workouts ────────────────────────────────────────────────

/// List workouts in display order (read-only, no render commands).
async fn list_workouts(State(state): State<Arc<AppState>>) -> Result<Json<WorkoutsResponse>> {
    let controller = state.controller()?;
    let workouts: Vec<WorkoutView> = controller
        .display_order()
        .into_iter()
        .map(WorkoutView::from)
        .collect();

    Ok(Json(WorkoutsResponse {
        total: workouts.len() as u32,
        workouts,
        sorted: controller.is_sorted(),
    }))
}

async fn get_workout(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<WorkoutView>> {
    let id = WorkoutId::from(id);
    let controller = state.controller()?;
    let workout = controller
        .store()
        .find_by_id(&id)
        .ok_or_else(|| AppError::NotFound(format!("Workout {} not found", id)))?;
    Ok(Json(WorkoutView::from(workout)))
}

async fn edit_workout(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<CommandsResponse>> {
    let id = WorkoutId::from(id);
    let ((), commands) = dispatch(&state, |c| c.edit(&id))?;
    Ok(Json(commands.into()))
}

async fn select_workout(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<CommandsResponse>> {
    let id = WorkoutId::from(id);
    let ((), commands) = dispatch(&state, |c| c.select(&id))?;
    Ok(Json(commands.into()))
}

async fn delete_workout(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<CommandsResponse>> {
    let id = WorkoutId::from(id);
    let ((), commands) = dispatch(&state, |c| c.delete(&id))?;
    Ok(Json(commands.into()))
}

async fn toggle_sort(State(state): State<Arc<AppState>>) -> Result<Json<SortResponse>> {
    let (sorted, commands) = dispatch(&state, |c| Ok(c.toggle_sort()))?;
    Ok(Json(SortResponse { sorted, commands }))
}

async fn reset_workouts(State(state): State<Arc<AppState>>) -> Result<Json<CommandsResponse>> {
    tracing::info!("Reset requested");
    let ((), commands) = dispatch(&state, |c| {
        c.reset();
        Ok(())
    })?;
    Ok(Json(commands.into()))
}
