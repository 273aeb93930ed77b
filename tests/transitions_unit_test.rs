//! Unit tests for material status transition derivation.
//!
//! Run with: cargo test --test transitions_unit_test

use turbine_sync::sync::transitions::{Direction, StatusObservation, derive_transitions};

fn obs(material: &str, plant: &str, status: &str, timestamp: &str) -> StatusObservation {
    StatusObservation {
        material: material.to_string(),
        plant: plant.to_string(),
        description: Some(format!("{material} description")),
        status: status.to_string(),
        timestamp: timestamp.to_string(),
    }
}

#[test]
fn single_observation_yields_zero_step_none() {
    let transitions = derive_transitions(&[obs("M1", "15S1", "Z3", "2024-01-01 10:00:00")]);

    assert_eq!(transitions.len(), 1);
    let t = &transitions[0];
    assert_eq!(t.prev_status, "Z3");
    assert_eq!(t.status, "Z3");
    assert_eq!(t.transition_count, 0);
    assert_eq!(t.direction, Direction::None);
}

#[test]
fn steps_follow_timestamp_order_not_input_order() {
    let transitions = derive_transitions(&[
        obs("M1", "15S1", "Z5", "2024-03-01 00:00:00"),
        obs("M1", "15S1", "Z1", "2024-01-01 00:00:00"),
        obs("M1", "15S1", "Z4", "2024-02-01T00:00:00Z"),
    ]);

    assert_eq!(transitions.len(), 2);

    let forward_big = transitions
        .iter()
        .find(|t| t.prev_status == "Z1")
        .expect("Z1 -> Z4");
    assert_eq!(forward_big.status, "Z4");
    assert_eq!(forward_big.transition_count, 3);
    assert_eq!(forward_big.direction, Direction::Forward);

    let forward_small = transitions
        .iter()
        .find(|t| t.prev_status == "Z4")
        .expect("Z4 -> Z5");
    assert_eq!(forward_small.transition_count, 1);
    assert_eq!(forward_small.direction, Direction::Forward);
}

#[test]
fn backward_steps_use_lifecycle_order() {
    // ZI sits after Z9 in the lifecycle
    let transitions = derive_transitions(&[
        obs("M2", "20A1", "ZI", "2024-01-01"),
        obs("M2", "20A1", "Z8", "2024-01-02"),
    ]);

    assert_eq!(transitions.len(), 1);
    assert_eq!(transitions[0].direction, Direction::Backward);
    assert_eq!(transitions[0].transition_count, 2);
}

#[test]
fn repeated_pairs_are_aggregated() {
    let transitions = derive_transitions(&[
        obs("M3", "15S1", "Z1", "2024-01-01"),
        obs("M3", "15S1", "Z2", "2024-01-02"),
        obs("M3", "15S1", "Z1", "2024-01-03"),
        obs("M3", "15S1", "Z2", "2024-01-04"),
    ]);

    let up: Vec<_> = transitions.iter().filter(|t| t.prev_status == "Z1").collect();
    assert_eq!(up.len(), 1);
    assert_eq!(up[0].transition_count, 2);

    let down: Vec<_> = transitions.iter().filter(|t| t.prev_status == "Z2").collect();
    assert_eq!(down.len(), 1);
    assert_eq!(down[0].transition_count, 1);
    assert_eq!(down[0].direction, Direction::Backward);
}

#[test]
fn plants_are_tracked_separately() {
    let transitions = derive_transitions(&[
        obs("M4", "15S1", "Z1", "2024-01-01"),
        obs("M4", "20A1", "Z6", "2024-01-02"),
    ]);

    assert_eq!(transitions.len(), 2);
    assert!(transitions.iter().all(|t| t.direction == Direction::None));
}

#[test]
fn unknown_status_and_blank_fields_are_ignored() {
    let transitions = derive_transitions(&[
        obs("M5", "15S1", "Z1", "2024-01-01"),
        obs("M5", "15S1", "XX", "2024-01-02"),
        obs("M5", "15S1", "Z2", ""),
        obs("", "15S1", "Z2", "2024-01-03"),
    ]);

    assert_eq!(transitions.len(), 1);
    assert_eq!(transitions[0].status, "Z1");
    assert_eq!(transitions[0].transition_count, 0);
}

#[test]
fn empty_input_yields_nothing() {
    assert!(derive_transitions(&[]).is_empty());
}
