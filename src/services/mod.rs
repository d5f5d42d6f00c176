// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod controller;
pub mod persistence;
pub mod presenter;
pub mod store;

pub use controller::{
    ControllerConfig, FormState, MapState, ValidationError, WorkoutController, WorkoutSubmission,
};
pub use persistence::{PersistenceError, WorkoutRepository};
pub use presenter::{CommandBuffer, MarkerView, Presenter, RenderCommand, WorkoutView};
pub use store::{StoreError, WorkoutStore};
