use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workout::{Haptic, Phase};

/// Every state change and every cue the engine produces is an Event.
/// The runner dispatches cues to the feedback device; the CLI prints the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    WorkoutStarted {
        routine_id: String,
        exercise_count: usize,
        at: DateTime<Utc>,
    },
    /// `start` found no routine to run (empty catalog).
    StartSkipped {
        reason: String,
        at: DateTime<Utc>,
    },
    ExerciseStarted {
        exercise_index: usize,
        exercise_name: String,
        duration_secs: u32,
        at: DateTime<Utc>,
    },
    HalfwayReached {
        exercise_index: usize,
        at: DateTime<Utc>,
    },
    ExerciseSkipped {
        exercise_index: usize,
        time_remaining: u32,
        at: DateTime<Utc>,
    },
    ExerciseCompleted {
        exercise_index: usize,
        total_progress: f64,
        at: DateTime<Utc>,
    },
    RestStarted {
        next_exercise_index: usize,
        next_exercise_name: String,
        duration_secs: u32,
        at: DateTime<Utc>,
    },
    WorkoutCompleted {
        routine_id: String,
        elapsed_secs: u64,
        auto_start_run: bool,
        at: DateTime<Utc>,
    },
    WorkoutCancelled {
        at: DateTime<Utc>,
    },
    /// Text for the speech synthesizer.
    Spoken {
        text: String,
    },
    /// Pulse for the haptic engine.
    Haptic {
        kind: Haptic,
    },
    StateSnapshot {
        phase: Phase,
        routine_id: Option<String>,
        exercise_index: usize,
        exercise_name: Option<String>,
        time_remaining: u32,
        exercise_progress: f64,
        total_progress: f64,
        elapsed_secs: u64,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Whether this event is a cue meant for the feedback device.
    pub fn is_cue(&self) -> bool {
        matches!(self, Event::Spoken { .. } | Event::Haptic { .. })
    }
}
