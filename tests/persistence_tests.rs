// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workouts surviving a restart on file storage.

use std::sync::Arc;
use workout_tracker::db::{slots, FileStorage, SlotStorage};
use workout_tracker::models::{Coordinates, WorkoutKind};
use workout_tracker::services::WorkoutSubmission;

mod common;

fn submission(kind: WorkoutKind, distance_km: f64, duration_min: f64, extra: f64) -> WorkoutSubmission {
    WorkoutSubmission {
        kind,
        distance_km,
        duration_min,
        extra,
    }
}

#[test]
fn test_workouts_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let coords = Coordinates::new(10.0, 20.0);

    let (run_id, ride_id) = {
        let storage = Arc::new(FileStorage::open(dir.path()).unwrap());
        let mut controller = common::test_controller(storage);
        controller.on_position_acquired(coords);

        controller.begin_create(coords).unwrap();
        let run_id = controller
            .submit(submission(WorkoutKind::Running, 5.0, 30.0, 150.0))
            .unwrap();
        controller.begin_create(coords).unwrap();
        let ride_id = controller
            .submit(submission(WorkoutKind::Cycling, 20.0, 60.0, 100.0))
            .unwrap();
        (run_id, ride_id)
    };

    assert!(dir.path().join("workouts.json").exists());

    let storage = Arc::new(FileStorage::open(dir.path()).unwrap());
    let controller = common::test_controller(storage);
    let store = controller.store();
    assert_eq!(store.len(), 2);
    assert_eq!(store.as_slice()[0].id(), &run_id);
    assert_eq!(store.as_slice()[1].id(), &ride_id);

    let run = store.find_by_id(&run_id).unwrap();
    assert_eq!(run.kind(), WorkoutKind::Running);
    assert_eq!(run.pace_min_per_km(), Some(6.0));
    assert_eq!(run.coords(), coords);

    let ride = store.find_by_id(&ride_id).unwrap();
    assert_eq!(ride.speed_km_per_h(), Some(20.0));
    assert!(ride.description().starts_with("Cycling on "));
}

#[test]
fn test_reset_removes_slot_file() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(FileStorage::open(dir.path()).unwrap());
    let coords = Coordinates::new(1.0, 2.0);

    let mut controller = common::test_controller(storage.clone());
    controller.on_position_acquired(coords);
    controller.begin_create(coords).unwrap();
    controller
        .submit(submission(WorkoutKind::Running, 3.0, 20.0, 170.0))
        .unwrap();
    assert!(storage.read(slots::WORKOUTS).unwrap().is_some());

    controller.reset();
    assert!(storage.read(slots::WORKOUTS).unwrap().is_none());
    assert!(!dir.path().join("workouts.json").exists());

    let reloaded = common::test_controller(storage);
    assert!(reloaded.store().is_empty());
}

#[test]
fn test_corrupt_file_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("workouts.json"), "[{\"id\": ").unwrap();

    let storage = Arc::new(FileStorage::open(dir.path()).unwrap());
    let controller = common::test_controller(storage);
    assert!(controller.store().is_empty());
}

#[test]
fn test_records_without_clicks_load() {
    let dir = tempfile::tempdir().unwrap();
    let saved = r#"[{
        "id": "1234567890",
        "createdAt": "2026-04-14T08:30:00Z",
        "coords": [10.0, 20.0],
        "distanceKm": 5,
        "durationMin": 30,
        "description": "Running on April 14",
        "kind": "running",
        "cadenceSpm": 150,
        "paceMinPerKm": 6
    }]"#;
    std::fs::write(dir.path().join("workouts.json"), saved).unwrap();

    let storage = Arc::new(FileStorage::open(dir.path()).unwrap());
    let controller = common::test_controller(storage);
    let workout = controller.store().find_by_id(&"1234567890".into()).unwrap();

    assert_eq!(workout.clicks(), 0);
    assert_eq!(workout.kind(), WorkoutKind::Running);
    assert_eq!(workout.pace_min_per_km(), Some(6.0));
    assert_eq!(workout.description(), "Running on April 14");
}

#[test]
fn test_out_of_range_records_are_dropped_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let saved = r#"[
        {
            "id": "1111111111",
            "createdAt": "2026-04-14T08:30:00Z",
            "coords": [10.0, 20.0],
            "distanceKm": -5,
            "durationMin": 0,
            "description": "Running on April 14",
            "kind": "running",
            "cadenceSpm": -1,
            "paceMinPerKm": 0
        },
        {
            "id": "2222222222",
            "createdAt": "2026-04-14T09:30:00Z",
            "coords": [10.0, 20.0],
            "distanceKm": 20,
            "durationMin": 60,
            "description": "Cycling on April 14",
            "kind": "cycling",
            "elevationGainM": -30,
            "speedKmPerH": 20
        }
    ]"#;
    std::fs::write(dir.path().join("workouts.json"), saved).unwrap();

    let storage = Arc::new(FileStorage::open(dir.path()).unwrap());
    let controller = common::test_controller(storage);
    let store = controller.store();

    assert_eq!(store.len(), 1);
    assert!(store.find_by_id(&"1111111111".into()).is_none());
    assert_eq!(
        store.find_by_id(&"2222222222".into()).unwrap().kind(),
        WorkoutKind::Cycling
    );
}
