// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout record model: running and cycling variants with their derived metrics.

use crate::time_utils::format_month_day;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Number of trailing millisecond digits kept in a workout id.
const ID_DIGITS: usize = 10;

/// Opaque workout identifier, derived from the creation time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkoutId(String);

impl WorkoutId {
    /// Build an id from a millisecond timestamp, keeping the last 10 digits.
    pub fn from_millis(millis: i64) -> Self {
        let digits = millis.to_string();
        let start = digits.len().saturating_sub(ID_DIGITS);
        Self(digits[start..].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkoutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for WorkoutId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for WorkoutId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A (latitude, longitude) pair, stored as `[lat, lng]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl From<[f64; 2]> for Coordinates {
    fn from([lat, lng]: [f64; 2]) -> Self {
        Self { lat, lng }
    }
}

impl From<Coordinates> for [f64; 2] {
    fn from(coords: Coordinates) -> Self {
        [coords.lat, coords.lng]
    }
}

/// Workout discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum WorkoutKind {
    Running,
    Cycling,
}

impl WorkoutKind {
    /// Capitalized name used in descriptions.
    pub fn label(self) -> &'static str {
        match self {
            WorkoutKind::Running => "Running",
            WorkoutKind::Cycling => "Cycling",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            WorkoutKind::Running => "🏃‍♂️",
            WorkoutKind::Cycling => "🚴‍♂️",
        }
    }
}

impl fmt::Display for WorkoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkoutKind::Running => f.write_str("running"),
            WorkoutKind::Cycling => f.write_str("cycling"),
        }
    }
}

/// Variant-specific input and derived metric.
///
/// Serialized inline with the `kind` discriminant so stored records come
/// back as the right variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum WorkoutMetrics {
    #[serde(rename_all = "camelCase")]
    Running {
        cadence_spm: f64,
        pace_min_per_km: f64,
    },
    #[serde(rename_all = "camelCase")]
    Cycling {
        elevation_gain_m: f64,
        speed_km_per_h: f64,
    },
}

/// A workout record.
///
/// Everything except the click counter is fixed at construction. Derived
/// values are never recomputed, including after a storage round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workout {
    id: WorkoutId,
    created_at: DateTime<Utc>,
    coords: Coordinates,
    distance_km: f64,
    duration_min: f64,
    description: String,
    #[serde(default)]
    clicks: u32,
    #[serde(flatten)]
    metrics: WorkoutMetrics,
}

impl Workout {
    /// Create a running workout; pace is `duration / distance`.
    ///
    /// The description uses the calendar date in `created_at`'s own zone.
    pub fn running<Tz: TimeZone>(
        id: WorkoutId,
        created_at: DateTime<Tz>,
        coords: Coordinates,
        distance_km: f64,
        duration_min: f64,
        cadence_spm: f64,
    ) -> Self
    where
        Tz::Offset: fmt::Display,
    {
        let metrics = WorkoutMetrics::Running {
            cadence_spm,
            pace_min_per_km: duration_min / distance_km,
        };
        Self::build(id, created_at, coords, distance_km, duration_min, metrics)
    }

    /// Create a cycling workout; speed is `distance / (duration / 60)`.
    pub fn cycling<Tz: TimeZone>(
        id: WorkoutId,
        created_at: DateTime<Tz>,
        coords: Coordinates,
        distance_km: f64,
        duration_min: f64,
        elevation_gain_m: f64,
    ) -> Self
    where
        Tz::Offset: fmt::Display,
    {
        let metrics = WorkoutMetrics::Cycling {
            elevation_gain_m,
            speed_km_per_h: distance_km / (duration_min / 60.0),
        };
        Self::build(id, created_at, coords, distance_km, duration_min, metrics)
    }

    fn build<Tz: TimeZone>(
        id: WorkoutId,
        created_at: DateTime<Tz>,
        coords: Coordinates,
        distance_km: f64,
        duration_min: f64,
        metrics: WorkoutMetrics,
    ) -> Self
    where
        Tz::Offset: fmt::Display,
    {
        let mut workout = Self {
            id,
            created_at: created_at.with_timezone(&Utc),
            coords,
            distance_km,
            duration_min,
            description: String::new(),
            clicks: 0,
            metrics,
        };
        workout.description = format!(
            "{} on {}",
            workout.kind().label(),
            format_month_day(&created_at)
        );
        workout
    }

    pub fn id(&self) -> &WorkoutId {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn coords(&self) -> Coordinates {
        self.coords
    }

    pub fn distance_km(&self) -> f64 {
        self.distance_km
    }

    pub fn duration_min(&self) -> f64 {
        self.duration_min
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn clicks(&self) -> u32 {
        self.clicks
    }

    pub fn metrics(&self) -> &WorkoutMetrics {
        &self.metrics
    }

    pub fn kind(&self) -> WorkoutKind {
        match self.metrics {
            WorkoutMetrics::Running { .. } => WorkoutKind::Running,
            WorkoutMetrics::Cycling { .. } => WorkoutKind::Cycling,
        }
    }

    /// Pace in min/km (running only).
    pub fn pace_min_per_km(&self) -> Option<f64> {
        match self.metrics {
            WorkoutMetrics::Running {
                pace_min_per_km, ..
            } => Some(pace_min_per_km),
            WorkoutMetrics::Cycling { .. } => None,
        }
    }

    /// Speed in km/h (cycling only).
    pub fn speed_km_per_h(&self) -> Option<f64> {
        match self.metrics {
            WorkoutMetrics::Cycling { speed_km_per_h, .. } => Some(speed_km_per_h),
            WorkoutMetrics::Running { .. } => None,
        }
    }

    /// Count an interaction with this workout.
    pub fn register_click(&mut self) {
        self.clicks = self.clicks.saturating_add(1);
    }
}
