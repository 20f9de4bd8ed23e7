//! Workout engine implementation.
//!
//! The engine is a tick-driven state machine. It does not use internal
//! threads - the caller is responsible for calling `tick()` once per second.
//!
//! ## State Transitions
//!
//! ```text
//! NotStarted -> Preparing -> Exercising <-> Resting -> Completed
//!      ^                                                   |
//!      +------------------------ cancel -------------------+
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = WorkoutEngine::new(Catalog::builtin());
//! engine.start(Some("basic_warmup"));
//! // Once per second:
//! for event in engine.tick() { /* dispatch */ }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::feedback::{FeedbackPolicy, Haptic};
use crate::catalog::{Catalog, Exercise, Routine};
use crate::events::Event;
use crate::storage::Config;

/// Seconds before the end of an exercise when the spoken countdown fires.
const COUNTDOWN_SPOKEN_AT: u32 = 5;
/// Final seconds of an exercise that get a click each.
const COUNTDOWN_CLICKS_FROM: u32 = 3;
/// Final seconds of a rest period that get a click each.
const REST_CLICKS_FROM: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    NotStarted,
    Preparing,
    Exercising,
    Resting,
    Completed,
}

/// The repeating tick source currently driving the session.
/// Exercise and rest ticks are mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActiveTick {
    Idle,
    Exercise,
    Rest,
}

/// Core workout engine.
#[derive(Debug, Clone)]
pub struct WorkoutEngine {
    catalog: Catalog,
    default_routine_id: Option<String>,
    policy: FeedbackPolicy,
    preparation_delay_secs: u32,

    phase: Phase,
    routine: Option<Routine>,
    exercise_index: usize,
    time_remaining: u32,
    exercise_progress: f64,
    total_progress: f64,
    started_at: Option<DateTime<Utc>>,
    elapsed_secs: u64,
    tracking_elapsed: bool,
    active_tick: ActiveTick,
    /// Ticks left before the deferred first exercise starts.
    /// `cancel()` leaves this armed.
    pending_start: Option<u32>,

    events: Vec<Event>,
}

impl WorkoutEngine {
    /// Create an idle engine over `catalog` with default settings.
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            default_routine_id: None,
            policy: FeedbackPolicy::default(),
            preparation_delay_secs: 1,
            phase: Phase::NotStarted,
            routine: None,
            exercise_index: 0,
            time_remaining: 0,
            exercise_progress: 0.0,
            total_progress: 0.0,
            started_at: None,
            elapsed_secs: 0,
            tracking_elapsed: false,
            active_tick: ActiveTick::Idle,
            pending_start: None,
            events: Vec::new(),
        }
    }

    /// Engine wired to the user's settings.
    pub fn from_config(catalog: Catalog, config: &Config) -> Self {
        Self::new(catalog)
            .with_policy(FeedbackPolicy::from_config(config))
            .with_default_routine(config.settings.default_routine_id.clone())
            .with_preparation_delay(config.workout.preparation_delay_secs)
    }

    pub fn with_policy(mut self, policy: FeedbackPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_default_routine(mut self, id: Option<String>) -> Self {
        self.default_routine_id = id;
        self
    }

    /// Ticks between `start` and the first exercise. Zero starts immediately.
    pub fn with_preparation_delay(mut self, secs: u32) -> Self {
        self.preparation_delay_secs = secs;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn routine(&self) -> Option<&Routine> {
        self.routine.as_ref()
    }

    pub fn exercise_index(&self) -> usize {
        self.exercise_index
    }

    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    /// 0.0 .. 1.0 progress within the current exercise or rest period.
    pub fn exercise_progress(&self) -> f64 {
        self.exercise_progress
    }

    /// 0.0 .. 1.0 completed exercises over total exercises.
    pub fn total_progress(&self) -> f64 {
        self.total_progress
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    pub fn active_tick(&self) -> ActiveTick {
        self.active_tick
    }

    pub fn has_pending_start(&self) -> bool {
        self.pending_start.is_some()
    }

    pub fn current_exercise(&self) -> Option<&Exercise> {
        self.routine.as_ref()?.exercises.get(self.exercise_index)
    }

    pub fn next_exercise(&self) -> Option<&Exercise> {
        self.routine.as_ref()?.exercises.get(self.exercise_index + 1)
    }

    /// `"1/2"` style position within the routine.
    pub fn position(&self) -> String {
        let total = self.routine.as_ref().map_or(0, |r| r.exercises.len());
        format!("{}/{}", self.exercise_index + 1, total)
    }

    pub fn formatted_time_remaining(&self) -> String {
        format_clock(u64::from(self.time_remaining))
    }

    pub fn formatted_elapsed(&self) -> String {
        format_clock(self.elapsed_secs)
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            phase: self.phase,
            routine_id: self.routine.as_ref().map(|r| r.id.clone()),
            exercise_index: self.exercise_index,
            exercise_name: self.current_exercise().map(|e| e.name.clone()),
            time_remaining: self.time_remaining,
            exercise_progress: self.exercise_progress,
            total_progress: self.total_progress,
            elapsed_secs: self.elapsed_secs,
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin a workout. No-op unless the engine is `NotStarted`.
    ///
    /// An unknown or missing `routine_id` falls back to the configured
    /// default routine, then to the first routine in the catalog.
    pub fn start(&mut self, routine_id: Option<&str>) -> Vec<Event> {
        if self.phase != Phase::NotStarted {
            return Vec::new();
        }

        let routine = routine_id
            .and_then(|id| self.catalog.get_routine(id))
            .or_else(|| self.catalog.default_routine(self.default_routine_id.as_deref()))
            .cloned();
        let Some(routine) = routine else {
            warn!("no routine available to start");
            self.events.push(Event::StartSkipped {
                reason: "no warmup routines available".into(),
                at: Utc::now(),
            });
            return self.take_events();
        };

        debug!(routine = %routine.id, "workout preparing");
        self.events.push(Event::WorkoutStarted {
            routine_id: routine.id.clone(),
            exercise_count: routine.exercises.len(),
            at: Utc::now(),
        });
        self.routine = Some(routine);
        self.phase = Phase::Preparing;
        self.exercise_index = 0;
        self.started_at = Some(Utc::now());
        self.elapsed_secs = 0;
        self.tracking_elapsed = true;

        if self.preparation_delay_secs == 0 {
            self.enter_exercise();
        } else {
            self.pending_start = Some(self.preparation_delay_secs);
        }
        self.take_events()
    }

    /// Load the exercise at the current index, or complete the workout when
    /// the routine is exhausted.
    pub fn run_current_exercise(&mut self) -> Vec<Event> {
        self.enter_exercise();
        self.take_events()
    }

    /// Count the current exercise as done and move on to rest or completion.
    pub fn complete_current_exercise(&mut self) -> Vec<Event> {
        self.finish_exercise();
        self.take_events()
    }

    pub fn start_rest_period(&mut self) -> Vec<Event> {
        self.enter_rest();
        self.take_events()
    }

    /// Treat the running exercise as expired. Only valid while exercising.
    pub fn skip_to_next_exercise(&mut self) -> Vec<Event> {
        if self.phase != Phase::Exercising {
            return Vec::new();
        }
        self.active_tick = ActiveTick::Idle;
        self.pulse(Haptic::Click);
        self.events.push(Event::ExerciseSkipped {
            exercise_index: self.exercise_index,
            time_remaining: self.time_remaining,
            at: Utc::now(),
        });
        self.finish_exercise();
        self.take_events()
    }

    pub fn complete_workout(&mut self) -> Vec<Event> {
        self.finish_workout();
        self.take_events()
    }

    /// Stop every tick source and return to `NotStarted` with zeroed
    /// progress. A pending preparation start is not disarmed.
    pub fn cancel(&mut self) -> Vec<Event> {
        self.active_tick = ActiveTick::Idle;
        self.tracking_elapsed = false;
        self.phase = Phase::NotStarted;
        self.exercise_index = 0;
        self.time_remaining = 0;
        self.total_progress = 0.0;
        self.exercise_progress = 0.0;
        self.elapsed_secs = 0;
        debug!("workout cancelled");
        self.events.push(Event::WorkoutCancelled { at: Utc::now() });
        self.take_events()
    }

    /// Advance one second.
    pub fn tick(&mut self) -> Vec<Event> {
        if self.tracking_elapsed {
            self.elapsed_secs += 1;
        }

        if let Some(left) = self.pending_start {
            if left <= 1 {
                self.pending_start = None;
                self.enter_exercise();
                return self.take_events();
            }
            self.pending_start = Some(left - 1);
        }

        match self.active_tick {
            ActiveTick::Exercise => self.exercise_tick(),
            ActiveTick::Rest => self.rest_tick(),
            ActiveTick::Idle => {}
        }
        self.take_events()
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn enter_exercise(&mut self) {
        let Some(exercise) = self.current_exercise().cloned() else {
            self.finish_workout();
            return;
        };

        self.time_remaining = exercise.duration_secs;
        self.exercise_progress = 0.0;
        self.phase = Phase::Exercising;
        debug!(index = self.exercise_index, name = %exercise.name, "exercise started");
        self.events.push(Event::ExerciseStarted {
            exercise_index: self.exercise_index,
            exercise_name: exercise.name.clone(),
            duration_secs: exercise.duration_secs,
            at: Utc::now(),
        });
        self.speak(&exercise.audio_instructions);
        self.pulse(Haptic::Start);
        self.active_tick = ActiveTick::Exercise;
    }

    fn exercise_tick(&mut self) {
        let Some(exercise) = self.current_exercise().cloned() else {
            self.finish_workout();
            return;
        };

        self.time_remaining = self.time_remaining.saturating_sub(1);
        self.exercise_progress = progress(self.time_remaining, exercise.duration_secs);

        // Exact equality: odd durations still hit `duration / 2` on a
        // one-second cadence, but a coarser driver could step over it.
        if self.time_remaining == exercise.duration_secs / 2 {
            if let Some(cue) = &exercise.halfway_cue {
                self.events.push(Event::HalfwayReached {
                    exercise_index: self.exercise_index,
                    at: Utc::now(),
                });
                self.pulse(Haptic::Notification);
                self.speak(cue);
            }
        }

        self.countdown(self.time_remaining);

        if self.time_remaining == 0 {
            self.active_tick = ActiveTick::Idle;
            self.pulse(Haptic::Success);
            self.finish_exercise();
        }
    }

    fn countdown(&mut self, seconds_left: u32) {
        if !self.policy.allows_countdown() {
            return;
        }
        match seconds_left {
            COUNTDOWN_SPOKEN_AT => self.speak(&format!("{seconds_left} seconds left")),
            1..=COUNTDOWN_CLICKS_FROM => self.pulse(Haptic::Click),
            _ => {}
        }
    }

    fn finish_exercise(&mut self) {
        let Some(total) = self.routine.as_ref().map(|r| r.exercises.len()) else {
            return;
        };

        self.pulse(Haptic::Success);
        let finished = self.exercise_index;
        self.exercise_index += 1;
        if total > 0 {
            self.total_progress = self.exercise_index as f64 / total as f64;
        }
        self.events.push(Event::ExerciseCompleted {
            exercise_index: finished,
            total_progress: self.total_progress,
            at: Utc::now(),
        });

        if self.exercise_index < total {
            self.enter_rest();
        } else {
            self.finish_workout();
        }
    }

    fn enter_rest(&mut self) {
        let Some((rest, next)) = self.routine.as_ref().and_then(|r| {
            r.exercises
                .get(self.exercise_index)
                .map(|e| (r.rest_duration_secs, e.name.clone()))
        }) else {
            self.finish_workout();
            return;
        };

        self.phase = Phase::Resting;
        self.time_remaining = rest;
        self.exercise_progress = 0.0;
        debug!(next = %next, rest, "rest started");
        self.events.push(Event::RestStarted {
            next_exercise_index: self.exercise_index,
            next_exercise_name: next.clone(),
            duration_secs: rest,
            at: Utc::now(),
        });
        self.speak(&format!("Next: {next}"));
        self.active_tick = ActiveTick::Rest;
    }

    fn rest_tick(&mut self) {
        let rest = self.routine.as_ref().map_or(0, |r| r.rest_duration_secs);

        self.time_remaining = self.time_remaining.saturating_sub(1);
        self.exercise_progress = progress(self.time_remaining, rest);

        if (1..=REST_CLICKS_FROM).contains(&self.time_remaining) {
            self.pulse(Haptic::Click);
        }

        if self.time_remaining == 0 {
            self.active_tick = ActiveTick::Idle;
            self.pulse(Haptic::Start);
            self.enter_exercise();
        }
    }

    fn finish_workout(&mut self) {
        self.active_tick = ActiveTick::Idle;
        self.tracking_elapsed = false;
        self.phase = Phase::Completed;
        self.total_progress = 1.0;

        let (routine_id, auto_start_run) = self
            .routine
            .as_ref()
            .map(|r| (r.id.clone(), r.auto_start_run))
            .unwrap_or_default();
        debug!(routine = %routine_id, elapsed = self.elapsed_secs, "workout completed");
        self.events.push(Event::WorkoutCompleted {
            routine_id,
            elapsed_secs: self.elapsed_secs,
            auto_start_run,
            at: Utc::now(),
        });

        self.speak("Warmup completed! Great job!");
        self.pulse(Haptic::Success);
        if auto_start_run {
            // Run tracking itself lives outside the warmup engine.
            self.speak("Starting run tracking");
        }
    }

    fn speak(&mut self, text: &str) {
        if self.policy.allows_speech() {
            self.events.push(Event::Spoken { text: text.to_string() });
        }
    }

    fn pulse(&mut self, kind: Haptic) {
        if self.policy.allows_haptics() {
            self.events.push(Event::Haptic { kind });
        }
    }

    fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}

/// `1 - remaining/total`, or complete when there is no duration to measure.
fn progress(remaining: u32, total: u32) -> f64 {
    if total == 0 {
        return 1.0;
    }
    1.0 - f64::from(remaining) / f64::from(total)
}

/// `m:ss`.
pub fn format_clock(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}
