// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn happy_path_transitions_are_legal() {
    assert!(JobState::Idle.can_transition_to(JobState::Mounting));
    assert!(JobState::Mounting.can_transition_to(JobState::Starting));
    assert!(JobState::Starting.can_transition_to(JobState::Running));
    assert!(JobState::Running.can_transition_to(JobState::Succeeded));
    assert!(JobState::Running.can_transition_to(JobState::Failed));
}

#[test]
fn surface_error_reachable_from_any_in_flight_state() {
    for state in [JobState::Mounting, JobState::Starting, JobState::Running] {
        assert!(state.can_transition_to(JobState::SurfaceError));
    }
}

#[test]
fn terminal_states_accept_no_further_transitions() {
    for state in [JobState::Succeeded, JobState::Failed, JobState::SurfaceError] {
        assert!(state.is_terminal());
        for next in [JobState::Idle, JobState::Mounting, JobState::Starting, JobState::Running] {
            assert!(!state.can_transition_to(next));
        }
    }
}

#[test]
fn skipping_a_stage_is_illegal() {
    assert!(!JobState::Idle.can_transition_to(JobState::Running));
    assert!(!JobState::Mounting.can_transition_to(JobState::Running));
}
