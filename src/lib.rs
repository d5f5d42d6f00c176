// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout Tracker: log runs and rides on a map
//!
//! This crate provides the workout model, storage and controller behind a
//! map-based workout log, plus the HTTP API the browser page talks to.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::SlotStorage;
use error::{AppError, Result};
use services::{CommandBuffer, WorkoutController, WorkoutRepository};
use std::sync::{Arc, Mutex, MutexGuard};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    /// One controller for the single user; the mutex serializes events.
    pub controller: Mutex<WorkoutController<CommandBuffer>>,
}

impl AppState {
    /// Load saved workouts from `storage` and build the controller.
    pub fn new(config: Config, storage: Arc<dyn SlotStorage>) -> Self {
        let repository = WorkoutRepository::new(storage);
        let mut controller =
            WorkoutController::load(repository, CommandBuffer::new(), config.controller_config());
        // Startup rendering is replayed per page load
        controller.drain_commands();

        Self {
            config,
            controller: Mutex::new(controller),
        }
    }

    /// Lock the controller for one event.
    pub fn controller(&self) -> Result<MutexGuard<'_, WorkoutController<CommandBuffer>>> {
        self.controller.lock().map_err(|_| {
            AppError::Internal(anyhow::anyhow!("Workout controller lock poisoned"))
        })
    }
}
