// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory ordered collection of workouts.

use crate::models::{Workout, WorkoutId};
use chrono::{DateTime, Utc};
use std::collections::HashSet;

/// Workouts in insertion order, which is also the default display order.
#[derive(Debug, Default, Clone)]
pub struct WorkoutStore {
    workouts: Vec<Workout>,
}

impl WorkoutStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a workout at the end.
    pub fn append(&mut self, workout: Workout) -> Result<(), StoreError> {
        if self.find_by_id(workout.id()).is_some() {
            return Err(StoreError::DuplicateId(workout.id().clone()));
        }
        self.workouts.push(workout);
        Ok(())
    }

    /// Remove the workout at `position`. Out of range is a no-op.
    pub fn remove_at(&mut self, position: usize) -> Option<Workout> {
        if position < self.workouts.len() {
            Some(self.workouts.remove(position))
        } else {
            None
        }
    }

    /// Remove the workout with `id`, if present.
    pub fn remove(&mut self, id: &WorkoutId) -> Option<Workout> {
        let position = self.position_of(id)?;
        self.remove_at(position)
    }

    /// Swap the workout with `id` for `replacement`, keeping its position.
    ///
    /// Returns the old workout, or `None` (store unchanged) if `id` is absent
    /// or `replacement` carries an id used by another workout.
    pub fn replace(&mut self, id: &WorkoutId, replacement: Workout) -> Option<Workout> {
        let position = self.position_of(id)?;
        if replacement.id() != id && self.find_by_id(replacement.id()).is_some() {
            return None;
        }
        Some(std::mem::replace(&mut self.workouts[position], replacement))
    }

    /// Workouts ordered by duration, longest first. Ties keep insertion order.
    pub fn sorted_by_duration_desc(&self) -> Vec<&Workout> {
        let mut sorted: Vec<&Workout> = self.workouts.iter().collect();
        // sort_by is stable
        sorted.sort_by(|a, b| b.duration_min().total_cmp(&a.duration_min()));
        sorted
    }

    pub fn find_by_id(&self, id: &WorkoutId) -> Option<&Workout> {
        self.workouts.iter().find(|w| w.id() == id)
    }

    pub fn position_of(&self, id: &WorkoutId) -> Option<usize> {
        self.workouts.iter().position(|w| w.id() == id)
    }

    /// Replace the whole collection. Later duplicates of an id are dropped.
    pub fn replace_all(&mut self, workouts: Vec<Workout>) {
        let mut seen = HashSet::new();
        self.workouts = workouts
            .into_iter()
            .filter(|w| {
                let fresh = seen.insert(w.id().clone());
                if !fresh {
                    tracing::warn!(id = %w.id(), "Dropping workout with duplicate id");
                }
                fresh
            })
            .collect();
    }

    pub fn clear(&mut self) {
        self.workouts.clear();
    }

    /// First free id derived from `now`, stepping forward one millisecond
    /// at a time past ids already in the store.
    pub fn next_free_id(&self, now: DateTime<Utc>) -> WorkoutId {
        let mut millis = now.timestamp_millis();
        loop {
            let id = WorkoutId::from_millis(millis);
            if self.find_by_id(&id).is_none() {
                return id;
            }
            millis += 1;
        }
    }

    pub fn len(&self) -> usize {
        self.workouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workouts.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Workout> {
        self.workouts.iter()
    }

    pub fn as_slice(&self) -> &[Workout] {
        &self.workouts
    }
}

/// Errors from store mutations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Workout id already in store: {0}")]
    DuplicateId(WorkoutId),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Coordinates;
    use chrono::TimeZone;

    fn make_workout(id: &str, duration: f64) -> Workout {
        Workout::running(
            WorkoutId::from(id),
            Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap(),
            Coordinates::new(10.0, 20.0),
            5.0,
            duration,
            150.0,
        )
    }

    fn ids<'a>(workouts: impl IntoIterator<Item = &'a Workout>) -> Vec<&'a str> {
        workouts.into_iter().map(|w| w.id().as_str()).collect()
    }

    #[test]
    fn test_append_rejects_duplicate_id() {
        let mut store = WorkoutStore::new();
        store.append(make_workout("a", 10.0)).unwrap();

        let err = store.append(make_workout("a", 20.0)).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateId(_)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_remove_at_out_of_range_is_noop() {
        let mut store = WorkoutStore::new();
        store.append(make_workout("a", 10.0)).unwrap();

        assert!(store.remove_at(1).is_none());
        assert_eq!(store.len(), 1);

        let removed = store.remove_at(0).unwrap();
        assert_eq!(removed.id().as_str(), "a");
        assert!(store.is_empty());
    }

    #[test]
    fn test_sort_is_stable_and_leaves_store_order() {
        let mut store = WorkoutStore::new();
        store.append(make_workout("first", 10.0)).unwrap();
        store.append(make_workout("second", 10.0)).unwrap();
        store.append(make_workout("short", 5.0)).unwrap();
        store.append(make_workout("long", 45.0)).unwrap();

        let sorted = store.sorted_by_duration_desc();
        assert_eq!(ids(sorted), vec!["long", "first", "second", "short"]);
        assert_eq!(ids(store.iter()), vec!["first", "second", "short", "long"]);
    }

    #[test]
    fn test_iter_runs_in_both_directions() {
        let mut store = WorkoutStore::new();
        store.append(make_workout("old", 10.0)).unwrap();
        store.append(make_workout("new", 20.0)).unwrap();

        assert_eq!(ids(store.iter().rev()), vec!["new", "old"]);
    }

    #[test]
    fn test_replace_keeps_position() {
        let mut store = WorkoutStore::new();
        store.append(make_workout("a", 10.0)).unwrap();
        store.append(make_workout("b", 20.0)).unwrap();
        store.append(make_workout("c", 30.0)).unwrap();

        let old = store
            .replace(&WorkoutId::from("b"), make_workout("b2", 25.0))
            .unwrap();
        assert_eq!(old.id().as_str(), "b");
        assert_eq!(ids(store.iter()), vec!["a", "b2", "c"]);

        // Unknown id leaves the store alone
        assert!(store
            .replace(&WorkoutId::from("zzz"), make_workout("d", 1.0))
            .is_none());
        // Replacement colliding with another workout is refused
        assert!(store
            .replace(&WorkoutId::from("a"), make_workout("c", 1.0))
            .is_none());
        assert_eq!(ids(store.iter()), vec!["a", "b2", "c"]);
    }

    #[test]
    fn test_replace_all_drops_duplicates() {
        let mut store = WorkoutStore::new();
        store.replace_all(vec![
            make_workout("a", 10.0),
            make_workout("b", 20.0),
            make_workout("a", 30.0),
        ]);

        assert_eq!(ids(store.iter()), vec!["a", "b"]);
        assert_eq!(
            store.find_by_id(&WorkoutId::from("a")).unwrap().duration_min(),
            10.0
        );
    }

    #[test]
    fn test_next_free_id_skips_taken_ids() {
        let now = Utc.timestamp_millis_opt(1_776_159_000_123).unwrap();
        let mut store = WorkoutStore::new();

        let first = store.next_free_id(now);
        assert_eq!(first.as_str(), "6159000123");

        store
            .append(Workout::cycling(
                first.clone(),
                now,
                Coordinates::new(0.0, 0.0),
                1.0,
                1.0,
                0.0,
            ))
            .unwrap();
        assert_eq!(store.next_free_id(now).as_str(), "6159000124");
    }
}
