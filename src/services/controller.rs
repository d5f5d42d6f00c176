// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout controller.
//!
//! Turns user intent (map clicks, form submissions, edit/delete/sort/reset
//! requests) into store changes, persistence writes and render calls:
//! 1. Validate the input
//! 2. Build the workout and update the store
//! 3. Tell the presenter what changed
//! 4. Save the full list

use crate::error::{AppError, Result};
use crate::models::{Coordinates, Workout, WorkoutId, WorkoutKind, WorkoutMetrics};
use crate::services::persistence::WorkoutRepository;
use crate::services::presenter::{CommandBuffer, Presenter, RenderCommand};
use crate::services::store::WorkoutStore;
use chrono::{FixedOffset, Offset, Utc};

/// Records needed before sorting does anything.
const MIN_RECORDS_TO_SORT: usize = 2;

const POSITION_DENIED_MESSAGE: &str = "Could not get your position";
const SAVE_FAILED_MESSAGE: &str = "Could not save your workouts";

/// Settings injected into the controller at construction.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Zoom level used when the map is centered or panned.
    pub map_zoom: u8,
    /// Offset of the user's local time, for workout descriptions.
    pub utc_offset: FixedOffset,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            map_zoom: 13,
            utc_offset: Utc.fix(),
        }
    }
}

/// Raw form input. `extra` is the cadence for running and the elevation
/// gain for cycling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkoutSubmission {
    pub kind: WorkoutKind,
    pub distance_km: f64,
    pub duration_min: f64,
    pub extra: f64,
}

impl WorkoutSubmission {
    /// Check the numeric inputs.
    ///
    /// Every field must be finite. Distance and duration must be positive,
    /// as must cadence for running. Elevation gain may be negative.
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        let extra_field = match self.kind {
            WorkoutKind::Running => "cadenceSpm",
            WorkoutKind::Cycling => "elevationGainM",
        };
        let fields = [
            ("distanceKm", self.distance_km),
            ("durationMin", self.duration_min),
            (extra_field, self.extra),
        ];

        if let Some(&(field, _)) = fields.iter().find(|(_, value)| !value.is_finite()) {
            return Err(ValidationError::NotFinite { field });
        }

        let must_be_positive = match self.kind {
            WorkoutKind::Running => &fields[..],
            WorkoutKind::Cycling => &fields[..2],
        };
        if let Some(&(field, _)) = must_be_positive.iter().find(|(_, value)| *value <= 0.0) {
            return Err(ValidationError::NotPositive { field });
        }

        Ok(())
    }
}

/// The inputs a stored workout was built from.
impl From<&Workout> for WorkoutSubmission {
    fn from(workout: &Workout) -> Self {
        let extra = match *workout.metrics() {
            WorkoutMetrics::Running { cadence_spm, .. } => cadence_spm,
            WorkoutMetrics::Cycling {
                elevation_gain_m, ..
            } => elevation_gain_m,
        };
        Self {
            kind: workout.kind(),
            distance_km: workout.distance_km(),
            duration_min: workout.duration_min(),
            extra,
        }
    }
}

/// Rejected form input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Inputs must be positive numbers ({field} is not a number)")]
    NotFinite { field: &'static str },

    #[error("Inputs must be positive numbers ({field} must be greater than zero)")]
    NotPositive { field: &'static str },
}

/// Whether the input form is open, and for what.
#[derive(Debug, Clone, PartialEq)]
pub enum FormState {
    Closed,
    AwaitingInput {
        coords: Coordinates,
        /// Workout that the submission will replace (edit flow).
        replacing: Option<WorkoutId>,
    },
}

/// Map availability, driven by the geolocation callbacks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MapState {
    /// Position not known yet.
    Pending,
    Ready { center: Coordinates },
    /// Position denied; the app runs list-only.
    Unavailable,
}

/// Orchestrates workouts between the store, persistence and the page.
pub struct WorkoutController<P: Presenter> {
    store: WorkoutStore,
    repository: WorkoutRepository,
    presenter: P,
    config: ControllerConfig,
    form: FormState,
    map: MapState,
    sorted: bool,
}

impl<P: Presenter> WorkoutController<P> {
    /// Build the controller from saved workouts and render their list entries.
    ///
    /// Missing or unreadable saved data starts an empty list.
    pub fn load(repository: WorkoutRepository, presenter: P, config: ControllerConfig) -> Self {
        let mut store = WorkoutStore::new();
        if let Some(workouts) = repository.load() {
            store.replace_all(workouts);
        }

        let mut controller = Self {
            store,
            repository,
            presenter,
            config,
            form: FormState::Closed,
            map: MapState::Pending,
            sorted: false,
        };
        controller.render_list();

        tracing::info!(count = controller.store.len(), "Workout controller ready");
        controller
    }

    // ─── Geolocation ─────────────────────────────────────────────

    /// Initialise the map around the user's position and draw all markers.
    pub fn on_position_acquired(&mut self, coords: Coordinates) {
        let was_ready = matches!(self.map, MapState::Ready { .. });
        self.map = MapState::Ready { center: coords };

        self.presenter.init_map(coords, self.config.map_zoom);
        if was_ready {
            self.presenter.clear_markers();
        }
        for workout in self.store.iter() {
            self.presenter.render_map_marker(workout);
        }

        tracing::info!(
            lat = coords.lat,
            lng = coords.lng,
            markers = self.store.len(),
            "Map ready"
        );
    }

    /// Report the missing position once and continue without the map.
    pub fn on_position_denied(&mut self) {
        if self.map != MapState::Pending {
            return;
        }
        self.map = MapState::Unavailable;
        self.presenter.notify(POSITION_DENIED_MESSAGE);
        tracing::warn!("Position unavailable, continuing without map");
    }

    // ─── Form ────────────────────────────────────────────────────

    /// Open the form for a new workout at a clicked map point.
    pub fn begin_create(&mut self, coords: Coordinates) -> Result<()> {
        if !matches!(self.map, MapState::Ready { .. }) {
            return Err(AppError::MapUnavailable);
        }
        self.open_form(coords, None);
        Ok(())
    }

    /// Close the form without creating anything.
    pub fn cancel(&mut self) {
        if self.form == FormState::Closed {
            return;
        }
        if let FormState::AwaitingInput {
            replacing: Some(id),
            ..
        } = &self.form
        {
            tracing::debug!(id = %id, "Edit abandoned, original kept");
        }
        self.form = FormState::Closed;
        self.presenter.hide_form();
    }

    /// Create a workout from the form (or replace the one being edited).
    ///
    /// Invalid input leaves everything as it was, including the open form.
    pub fn submit(&mut self, submission: WorkoutSubmission) -> Result<WorkoutId> {
        let (coords, replacing) = match &self.form {
            FormState::Closed => return Err(AppError::NoPendingWorkout),
            FormState::AwaitingInput { coords, replacing } => (*coords, replacing.clone()),
        };

        if let Err(e) = submission.validate() {
            tracing::info!(kind = %submission.kind, error = %e, "Rejected workout input");
            return Err(e.into());
        }

        let now = Utc::now();
        let id = self.store.next_free_id(now);
        let local = now.with_timezone(&self.config.utc_offset);
        let workout = match submission.kind {
            WorkoutKind::Running => Workout::running(
                id.clone(),
                local,
                coords,
                submission.distance_km,
                submission.duration_min,
                submission.extra,
            ),
            WorkoutKind::Cycling => Workout::cycling(
                id.clone(),
                local,
                coords,
                submission.distance_km,
                submission.duration_min,
                submission.extra,
            ),
        };

        let map_ready = matches!(self.map, MapState::Ready { .. });
        match replacing {
            Some(old_id) => {
                self.store
                    .replace(&old_id, workout.clone())
                    .ok_or_else(|| {
                        AppError::NotFound(format!("Workout {} not found", old_id))
                    })?;
                if map_ready {
                    self.presenter.remove_map_marker(&old_id);
                }
                // The replacement keeps the old position, so redraw the list
                self.render_list();
                tracing::info!(old_id = %old_id, id = %id, kind = %workout.kind(), "Workout replaced");
            }
            None => {
                self.store
                    .append(workout.clone())
                    .map_err(|e| AppError::Internal(e.into()))?;
                if self.sorted {
                    self.render_list();
                } else {
                    self.presenter.render_list_entry(&workout);
                }
                tracing::info!(id = %id, kind = %workout.kind(), "Workout created");
            }
        }

        if map_ready {
            self.presenter.render_map_marker(&workout);
        }
        self.form = FormState::Closed;
        self.presenter.hide_form();
        self.persist();

        Ok(id)
    }

    // ─── List actions ────────────────────────────────────────────

    /// Remove a workout from the store, storage and page.
    pub fn delete(&mut self, id: &WorkoutId) -> Result<()> {
        self.store
            .remove(id)
            .ok_or_else(|| AppError::NotFound(format!("Workout {} not found", id)))?;

        // A pending edit of this workout becomes a plain create
        if let FormState::AwaitingInput { replacing, .. } = &mut self.form {
            if replacing.as_ref() == Some(id) {
                *replacing = None;
            }
        }

        self.presenter.remove_list_entry(id);
        if matches!(self.map, MapState::Ready { .. }) {
            self.presenter.remove_map_marker(id);
        }
        self.persist();

        tracing::info!(id = %id, remaining = self.store.len(), "Workout deleted");
        Ok(())
    }

    /// Open the form at a workout's location to replace it.
    ///
    /// The original stays in place until the replacement is submitted.
    pub fn edit(&mut self, id: &WorkoutId) -> Result<()> {
        let coords = self
            .store
            .find_by_id(id)
            .map(Workout::coords)
            .ok_or_else(|| AppError::NotFound(format!("Workout {} not found", id)))?;

        self.open_form(coords, Some(id.clone()));
        tracing::debug!(id = %id, "Editing workout");
        Ok(())
    }

    /// Pan the map to a workout.
    pub fn select(&mut self, id: &WorkoutId) -> Result<()> {
        let coords = self
            .store
            .find_by_id(id)
            .map(Workout::coords)
            .ok_or_else(|| AppError::NotFound(format!("Workout {} not found", id)))?;

        if matches!(self.map, MapState::Ready { .. }) {
            self.presenter.pan_to(coords, self.config.map_zoom);
        }
        Ok(())
    }

    /// Switch between insertion order and longest-first.
    ///
    /// Does nothing with fewer than two workouts. Returns the sorted flag.
    pub fn toggle_sort(&mut self) -> bool {
        if self.store.len() < MIN_RECORDS_TO_SORT {
            return self.sorted;
        }
        self.sorted = !self.sorted;
        self.render_list();
        tracing::debug!(sorted = self.sorted, "Sort toggled");
        self.sorted
    }

    /// Delete everything: store, storage, list and markers.
    pub fn reset(&mut self) {
        let count = self.store.len();
        self.store.clear();
        if let Err(e) = self.repository.clear() {
            tracing::error!(error = %e, "Failed to clear saved workouts");
            self.presenter.notify(SAVE_FAILED_MESSAGE);
        }

        self.presenter.clear_list();
        self.presenter.clear_markers();
        if self.form != FormState::Closed {
            self.form = FormState::Closed;
            self.presenter.hide_form();
        }
        self.sorted = false;

        tracing::info!(removed = count, "All workouts reset");
    }

    /// Emit everything needed to rebuild the page from scratch.
    pub fn replay(&mut self) {
        if let MapState::Ready { center } = self.map {
            self.presenter.init_map(center, self.config.map_zoom);
            self.presenter.clear_markers();
            for workout in self.store.iter() {
                self.presenter.render_map_marker(workout);
            }
        }
        self.render_list();
        match self.form {
            FormState::AwaitingInput { coords, .. } => self.presenter.show_form(coords),
            FormState::Closed => self.presenter.hide_form(),
        }
    }

    // ─── Accessors ───────────────────────────────────────────────

    pub fn store(&self) -> &WorkoutStore {
        &self.store
    }

    pub fn form_state(&self) -> &FormState {
        &self.form
    }

    pub fn map_state(&self) -> MapState {
        self.map
    }

    pub fn is_sorted(&self) -> bool {
        self.sorted
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    /// Workouts as the list shows them, top to bottom.
    pub fn display_order(&self) -> Vec<&Workout> {
        display_order(&self.store, self.sorted)
    }

    // ─── Internals ───────────────────────────────────────────────

    fn open_form(&mut self, coords: Coordinates, replacing: Option<WorkoutId>) {
        if let FormState::AwaitingInput {
            replacing: Some(previous),
            ..
        } = &self.form
        {
            tracing::debug!(id = %previous, "Edit abandoned, original kept");
        }
        self.form = FormState::AwaitingInput { coords, replacing };
        self.presenter.show_form(coords);
    }

    /// Redraw the whole list in display order.
    fn render_list(&mut self) {
        self.presenter.clear_list();
        // Each entry is inserted at the top, so draw bottom-up
        for workout in display_order(&self.store, self.sorted).into_iter().rev() {
            self.presenter.render_list_entry(workout);
        }
    }

    fn persist(&mut self) {
        if let Err(e) = self.repository.save(&self.store) {
            tracing::error!(error = %e, "Failed to save workouts");
            self.presenter.notify(SAVE_FAILED_MESSAGE);
        }
    }
}

fn display_order(store: &WorkoutStore, sorted: bool) -> Vec<&Workout> {
    if sorted {
        store.sorted_by_duration_desc()
    } else {
        // Newest entries sit at the top
        store.iter().rev().collect()
    }
}

impl WorkoutController<CommandBuffer> {
    /// Take the render commands produced since the last drain.
    pub fn drain_commands(&mut self) -> Vec<RenderCommand> {
        self.presenter.drain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running(distance_km: f64, duration_min: f64, cadence: f64) -> WorkoutSubmission {
        WorkoutSubmission {
            kind: WorkoutKind::Running,
            distance_km,
            duration_min,
            extra: cadence,
        }
    }

    fn cycling(distance_km: f64, duration_min: f64, elevation: f64) -> WorkoutSubmission {
        WorkoutSubmission {
            kind: WorkoutKind::Cycling,
            distance_km,
            duration_min,
            extra: elevation,
        }
    }

    #[test]
    fn test_validate_accepts_positive_running() {
        assert_eq!(running(5.0, 30.0, 150.0).validate(), Ok(()));
    }

    #[test]
    fn test_validate_rejects_bad_running_input() {
        assert_eq!(
            running(0.0, 30.0, 150.0).validate(),
            Err(ValidationError::NotPositive {
                field: "distanceKm"
            })
        );
        assert_eq!(
            running(5.0, -1.0, 150.0).validate(),
            Err(ValidationError::NotPositive {
                field: "durationMin"
            })
        );
        assert_eq!(
            running(5.0, 30.0, f64::NAN).validate(),
            Err(ValidationError::NotFinite {
                field: "cadenceSpm"
            })
        );
        assert_eq!(
            running(f64::INFINITY, 30.0, 150.0).validate(),
            Err(ValidationError::NotFinite {
                field: "distanceKm"
            })
        );
    }

    #[test]
    fn test_validate_cycling_allows_negative_elevation() {
        assert_eq!(cycling(20.0, 60.0, -100.0).validate(), Ok(()));
        assert_eq!(cycling(20.0, 60.0, 0.0).validate(), Ok(()));
        assert_eq!(
            cycling(20.0, 60.0, f64::NAN).validate(),
            Err(ValidationError::NotFinite {
                field: "elevationGainM"
            })
        );
        assert_eq!(
            cycling(20.0, 0.0, 10.0).validate(),
            Err(ValidationError::NotPositive {
                field: "durationMin"
            })
        );
    }

    #[test]
    fn test_finiteness_is_checked_before_sign() {
        // Both problems present: the non-finite field wins
        assert_eq!(
            running(-1.0, 30.0, f64::NAN).validate(),
            Err(ValidationError::NotFinite {
                field: "cadenceSpm"
            })
        );
    }

    #[test]
    fn test_validation_message() {
        let err = running(0.0, 30.0, 150.0).validate().unwrap_err();
        assert!(err.to_string().starts_with("Inputs must be positive numbers"));
    }
}
