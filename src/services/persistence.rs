// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Saving and restoring the workout list in a storage slot.

use crate::db::{slots, SlotStorage, StorageError};
use crate::models::Workout;
use crate::services::controller::WorkoutSubmission;
use crate::services::store::WorkoutStore;
use std::sync::Arc;

/// Reads and writes the full workout sequence as one JSON array.
#[derive(Clone)]
pub struct WorkoutRepository {
    storage: Arc<dyn SlotStorage>,
    slot: String,
}

impl WorkoutRepository {
    /// Repository on the default `workouts` slot.
    pub fn new(storage: Arc<dyn SlotStorage>) -> Self {
        Self::with_slot(storage, slots::WORKOUTS)
    }

    pub fn with_slot(storage: Arc<dyn SlotStorage>, slot: impl Into<String>) -> Self {
        Self {
            storage,
            slot: slot.into(),
        }
    }

    pub fn slot(&self) -> &str {
        &self.slot
    }

    /// Overwrite the slot with every workout in store order.
    pub fn save(&self, store: &WorkoutStore) -> Result<(), PersistenceError> {
        let json = serde_json::to_string(store.as_slice())?;
        self.storage.write(&self.slot, &json)?;
        tracing::debug!(slot = %self.slot, count = store.len(), "Workouts saved");
        Ok(())
    }

    /// Load saved workouts.
    ///
    /// Returns `None` when the slot is absent, unreadable or does not parse;
    /// callers start with an empty store in that case. Individual records
    /// whose inputs would be rejected by the form are dropped.
    pub fn load(&self) -> Option<Vec<Workout>> {
        let raw = match self.storage.read(&self.slot) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::debug!(slot = %self.slot, "No saved workouts");
                return None;
            }
            Err(e) => {
                tracing::warn!(slot = %self.slot, error = %e, "Failed to read saved workouts");
                return None;
            }
        };

        match serde_json::from_str::<Vec<Workout>>(&raw) {
            Ok(workouts) => {
                let workouts: Vec<Workout> = workouts
                    .into_iter()
                    .filter(|workout| match WorkoutSubmission::from(workout).validate() {
                        Ok(()) => true,
                        Err(e) => {
                            tracing::warn!(
                                id = %workout.id(),
                                error = %e,
                                "Dropping invalid saved workout"
                            );
                            false
                        }
                    })
                    .collect();
                tracing::info!(slot = %self.slot, count = workouts.len(), "Loaded saved workouts");
                Some(workouts)
            }
            Err(e) => {
                tracing::warn!(slot = %self.slot, error = %e, "Ignoring corrupt saved workouts");
                None
            }
        }
    }

    /// Remove the slot entirely.
    pub fn clear(&self) -> Result<(), PersistenceError> {
        self.storage.remove(&self.slot)?;
        tracing::debug!(slot = %self.slot, "Saved workouts cleared");
        Ok(())
    }
}

/// Errors from persistence writes.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Failed to serialize workouts: {0}")]
    Serialize(#[from] serde_json::Error),
}
