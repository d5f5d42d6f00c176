// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Presentation collaborator: what the page should draw.
//!
//! The controller never touches the page directly. It calls a [`Presenter`],
//! and the HTTP layer uses a [`CommandBuffer`] so the commands can be sent
//! back to the browser, which applies them to the list and the map.

use crate::models::{Coordinates, Workout, WorkoutId, WorkoutKind, WorkoutMetrics};
use crate::time_utils::format_utc_rfc3339;
use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// A labelled value shown in a list entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MetricView {
    pub icon: String,
    pub value: String,
    pub unit: String,
}

impl MetricView {
    fn new(icon: &str, value: String, unit: &str) -> Self {
        Self {
            icon: icon.to_string(),
            value,
            unit: unit.to_string(),
        }
    }
}

/// List entry for one workout.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct WorkoutView {
    pub id: String,
    pub kind: WorkoutKind,
    pub description: String,
    pub created_at: String,
    pub coords: [f64; 2],
    /// Distance, duration, derived metric, then the kind-specific input.
    pub details: Vec<MetricView>,
}

impl From<&Workout> for WorkoutView {
    fn from(workout: &Workout) -> Self {
        let kind = workout.kind();
        let mut details = vec![
            MetricView::new(kind.icon(), format_number(workout.distance_km()), "km"),
            MetricView::new("⏱", format_number(workout.duration_min()), "min"),
        ];
        match *workout.metrics() {
            WorkoutMetrics::Running {
                cadence_spm,
                pace_min_per_km,
            } => {
                details.push(MetricView::new("⚡️", format!("{pace_min_per_km:.1}"), "min/km"));
                details.push(MetricView::new("🦶🏼", format_number(cadence_spm), "spm"));
            }
            WorkoutMetrics::Cycling {
                elevation_gain_m,
                speed_km_per_h,
            } => {
                details.push(MetricView::new("⚡️", format!("{speed_km_per_h:.1}"), "km/h"));
                details.push(MetricView::new("⛰", format_number(elevation_gain_m), "m"));
            }
        }

        Self {
            id: workout.id().to_string(),
            kind,
            description: workout.description().to_string(),
            created_at: format_utc_rfc3339(workout.created_at()),
            coords: workout.coords().into(),
            details,
        }
    }
}

/// Map marker for one workout, with its popup text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MarkerView {
    pub id: String,
    pub kind: WorkoutKind,
    pub coords: [f64; 2],
    pub popup: String,
}

impl From<&Workout> for MarkerView {
    fn from(workout: &Workout) -> Self {
        let kind = workout.kind();
        Self {
            id: workout.id().to_string(),
            kind,
            coords: workout.coords().into(),
            popup: format!("{} {}", kind.icon(), workout.description()),
        }
    }
}

/// One instruction for the page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum RenderCommand {
    /// Center the map and enable clicks on it.
    InitMap { center: [f64; 2], zoom: u8 },
    /// Insert an entry at the top of the list.
    RenderListEntry { entry: WorkoutView },
    RenderMapMarker { marker: MarkerView },
    RemoveListEntry { id: String },
    RemoveMapMarker { id: String },
    ClearList,
    ClearMarkers,
    /// Show the input form for a workout at `coords`.
    ShowForm { coords: [f64; 2] },
    /// Hide the form and clear its inputs.
    HideForm,
    PanTo { coords: [f64; 2], zoom: u8 },
    /// Non-blocking message banner.
    Notice { message: String },
}

/// Receives rendering requests from the controller.
pub trait Presenter: Send {
    fn init_map(&mut self, center: Coordinates, zoom: u8);
    fn render_list_entry(&mut self, workout: &Workout);
    fn render_map_marker(&mut self, workout: &Workout);
    fn remove_list_entry(&mut self, id: &WorkoutId);
    fn remove_map_marker(&mut self, id: &WorkoutId);
    fn clear_list(&mut self);
    fn clear_markers(&mut self);
    fn show_form(&mut self, coords: Coordinates);
    fn hide_form(&mut self);
    fn pan_to(&mut self, coords: Coordinates, zoom: u8);
    fn notify(&mut self, message: &str);
}

/// Presenter that records commands until they are drained.
#[derive(Debug, Default)]
pub struct CommandBuffer {
    commands: Vec<RenderCommand>,
}

impl CommandBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands recorded so far.
    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    /// Take every recorded command, leaving the buffer empty.
    pub fn drain(&mut self) -> Vec<RenderCommand> {
        std::mem::take(&mut self.commands)
    }

    fn push(&mut self, command: RenderCommand) {
        self.commands.push(command);
    }
}

impl Presenter for CommandBuffer {
    fn init_map(&mut self, center: Coordinates, zoom: u8) {
        self.push(RenderCommand::InitMap {
            center: center.into(),
            zoom,
        });
    }

    fn render_list_entry(&mut self, workout: &Workout) {
        self.push(RenderCommand::RenderListEntry {
            entry: workout.into(),
        });
    }

    fn render_map_marker(&mut self, workout: &Workout) {
        self.push(RenderCommand::RenderMapMarker {
            marker: workout.into(),
        });
    }

    fn remove_list_entry(&mut self, id: &WorkoutId) {
        self.push(RenderCommand::RemoveListEntry { id: id.to_string() });
    }

    fn remove_map_marker(&mut self, id: &WorkoutId) {
        self.push(RenderCommand::RemoveMapMarker { id: id.to_string() });
    }

    fn clear_list(&mut self) {
        self.push(RenderCommand::ClearList);
    }

    fn clear_markers(&mut self) {
        self.push(RenderCommand::ClearMarkers);
    }

    fn show_form(&mut self, coords: Coordinates) {
        self.push(RenderCommand::ShowForm {
            coords: coords.into(),
        });
    }

    fn hide_form(&mut self) {
        self.push(RenderCommand::HideForm);
    }

    fn pan_to(&mut self, coords: Coordinates, zoom: u8) {
        self.push(RenderCommand::PanTo {
            coords: coords.into(),
            zoom,
        });
    }

    fn notify(&mut self, message: &str) {
        self.push(RenderCommand::Notice {
            message: message.to_string(),
        });
    }
}

/// Whole numbers print without a fractional part ("5", not "5.0").
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}
