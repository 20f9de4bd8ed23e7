//! Drives a [`WorkoutEngine`] in real time.
//!
//! One `tokio::time::interval` supplies the once-per-period tick and an mpsc
//! channel carries user commands; after every engine call the runner plays
//! the emitted cues and republishes the widget status.

use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use super::engine::{Phase, WorkoutEngine};
use super::feedback::Feedback;
use crate::events::Event;
use crate::widget::{StatusMirror, WidgetStatus};

/// User input delivered to a running workout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerCommand {
    /// End the current exercise early.
    Skip,
    /// Abandon the workout.
    Cancel,
    /// Dismiss the completion screen, returning to `NotStarted`.
    Acknowledge,
}

/// Play every cue in `events` on `feedback`, in order.
pub fn dispatch<F: Feedback + ?Sized>(events: &[Event], feedback: &mut F) {
    for event in events {
        match event {
            Event::Spoken { text } => feedback.speak(text),
            Event::Haptic { kind } => feedback.haptic(*kind),
            _ => {}
        }
    }
}

pub struct TickRunner<F, M> {
    engine: WorkoutEngine,
    feedback: F,
    mirror: M,
    period: Duration,
}

impl<F: Feedback, M: StatusMirror> TickRunner<F, M> {
    pub fn new(engine: WorkoutEngine, feedback: F, mirror: M) -> Self {
        Self {
            engine,
            feedback,
            mirror,
            period: Duration::from_secs(1),
        }
    }

    /// Wall-clock length of one engine second.
    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    pub fn engine(&self) -> &WorkoutEngine {
        &self.engine
    }

    pub fn into_parts(self) -> (WorkoutEngine, F, M) {
        (self.engine, self.feedback, self.mirror)
    }

    /// Play cues, republish status, and hand each event to `observer`.
    pub fn apply(&mut self, events: Vec<Event>, observer: &mut impl FnMut(&WorkoutEngine, &Event)) {
        dispatch(&events, &mut self.feedback);
        self.mirror.publish(&WidgetStatus::from_engine(&self.engine));
        for event in &events {
            observer(&self.engine, event);
        }
    }

    fn handle(&mut self, command: RunnerCommand, observer: &mut impl FnMut(&WorkoutEngine, &Event)) {
        let events = match command {
            RunnerCommand::Skip => self.engine.skip_to_next_exercise(),
            RunnerCommand::Cancel => self.engine.cancel(),
            RunnerCommand::Acknowledge if self.engine.phase() == Phase::Completed => {
                self.engine.cancel()
            }
            RunnerCommand::Acknowledge => {
                debug!(phase = ?self.engine.phase(), "acknowledge ignored before completion");
                return;
            }
        };
        self.apply(events, observer);
    }

    /// Start `routine_id` and tick until the workout ends.
    ///
    /// Commands arrive on `commands`. While any sender is alive a completed
    /// workout waits for [`RunnerCommand::Acknowledge`]; once the channel is
    /// closed the run returns as soon as the workout completes. If `stop`
    /// resolves first the workout is cancelled.
    ///
    /// Returns the phase the engine ended in.
    pub async fn run<S>(
        &mut self,
        routine_id: Option<&str>,
        stop: S,
        commands: &mut mpsc::Receiver<RunnerCommand>,
        mut observer: impl FnMut(&WorkoutEngine, &Event),
    ) -> Phase
    where
        S: Future<Output = ()>,
    {
        let events = self.engine.start(routine_id);
        self.apply(events, &mut observer);
        if self.engine.phase() == Phase::NotStarted {
            return Phase::NotStarted;
        }

        tokio::pin!(stop);
        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick of an interval completes immediately.
        interval.tick().await;

        let mut listening = true;
        loop {
            let phase = self.engine.phase();
            if phase == Phase::NotStarted || (phase == Phase::Completed && !listening) {
                break;
            }
            tokio::select! {
                _ = &mut stop => {
                    let events = self.engine.cancel();
                    self.apply(events, &mut observer);
                    break;
                }
                command = commands.recv(), if listening => match command {
                    Some(command) => self.handle(command, &mut observer),
                    None => listening = false,
                },
                _ = interval.tick(), if phase != Phase::Completed => {
                    let events = self.engine.tick();
                    self.apply(events, &mut observer);
                }
            }
        }
        self.engine.phase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, Exercise, Routine};
    use crate::widget::{MemoryMirror, WidgetState};
    use crate::workout::{Haptic, RecordingFeedback};

    fn closed_channel() -> mpsc::Receiver<RunnerCommand> {
        let (_tx, rx) = mpsc::channel(1);
        rx
    }

    fn short_catalog() -> Catalog {
        let exercise = |id: &str| Exercise {
            id: id.into(),
            name: id.into(),
            description: String::new(),
            duration_secs: 2,
            animation: "lunges".into(),
            audio_instructions: format!("Go {id}"),
            halfway_cue: Some("Half".into()),
        };
        Catalog::from_routines(vec![Routine {
            id: "short".into(),
            name: "Short".into(),
            description: String::new(),
            exercises: vec![exercise("a"), exercise("b")],
            rest_duration_secs: 1,
            auto_start_run: false,
        }])
        .unwrap()
    }

    #[test]
    fn dispatch_plays_only_cues() {
        let mut feedback = RecordingFeedback::default();
        let events = vec![
            Event::WorkoutCancelled { at: chrono::Utc::now() },
            Event::Spoken { text: "hi".into() },
            Event::Haptic { kind: Haptic::Click },
        ];
        dispatch(&events, &mut feedback);
        assert_eq!(feedback.spoken, ["hi"]);
        assert_eq!(feedback.haptics, [Haptic::Click]);
    }

    #[tokio::test]
    async fn runs_to_completion_and_mirrors_status() {
        let engine = WorkoutEngine::new(short_catalog());
        let mut runner = TickRunner::new(engine, RecordingFeedback::default(), MemoryMirror::default())
            .with_period(Duration::from_millis(1));

        let mut seen = Vec::new();
        let phase = runner
            .run(None, std::future::pending(), &mut closed_channel(), |_, event| {
                seen.push(event.clone())
            })
            .await;
        assert_eq!(phase, Phase::Completed);

        let (engine, feedback, mirror) = runner.into_parts();
        assert_eq!(engine.total_progress(), 1.0);
        assert_eq!(feedback.spoken.first().map(String::as_str), Some("Go a"));
        assert_eq!(
            feedback.spoken.last().map(String::as_str),
            Some("Warmup completed! Great job!")
        );

        let states: Vec<WidgetState> = mirror.history.iter().map(|s| s.status).collect();
        assert_eq!(states.first(), Some(&WidgetState::NotRunning));
        assert!(states.contains(&WidgetState::Resting));
        assert_eq!(states.last(), Some(&WidgetState::Completed));

        let started = seen
            .iter()
            .filter(|e| matches!(e, Event::ExerciseStarted { .. }))
            .count();
        assert_eq!(started, 2);
    }

    #[tokio::test]
    async fn stop_signal_cancels_workout() {
        let engine = WorkoutEngine::new(Catalog::builtin());
        let mut runner = TickRunner::new(engine, RecordingFeedback::default(), MemoryMirror::default())
            .with_period(Duration::from_millis(5));

        let stop = tokio::time::sleep(Duration::from_millis(20));
        let phase = runner
            .run(Some("advanced_warmup"), stop, &mut closed_channel(), |_, _| {})
            .await;
        assert_eq!(phase, Phase::NotStarted);

        let (engine, _, mirror) = runner.into_parts();
        assert_eq!(engine.total_progress(), 0.0);
        assert_eq!(mirror.history.last().map(|s| s.status), Some(WidgetState::NotRunning));
    }

    #[tokio::test]
    async fn empty_catalog_returns_without_ticking() {
        let engine = WorkoutEngine::new(Catalog::from_routines(Vec::new()).unwrap());
        let mut runner = TickRunner::new(engine, RecordingFeedback::default(), MemoryMirror::default());
        let mut skipped = false;
        let phase = runner
            .run(None, std::future::pending(), &mut closed_channel(), |_, event| {
                skipped |= matches!(event, Event::StartSkipped { .. });
            })
            .await;
        assert_eq!(phase, Phase::NotStarted);
        assert!(skipped);
    }

    #[tokio::test]
    async fn skip_command_moves_to_rest() {
        let engine = WorkoutEngine::new(short_catalog()).with_preparation_delay(0);
        let mut runner = TickRunner::new(engine, RecordingFeedback::default(), MemoryMirror::default())
            .with_period(Duration::from_secs(3600));
        let (tx, mut rx) = mpsc::channel(4);

        let mut after_skip = None;
        let run = runner.run(None, std::future::pending(), &mut rx, |engine, event| {
            if matches!(event, Event::ExerciseSkipped { .. }) {
                after_skip = Some((engine.phase(), engine.exercise_index()));
            }
        });
        let send = async {
            tx.send(RunnerCommand::Skip).await.unwrap();
            tx.send(RunnerCommand::Cancel).await.unwrap();
        };
        let (phase, ()) = tokio::join!(run, send);

        assert_eq!(phase, Phase::NotStarted);
        assert_eq!(after_skip, Some((Phase::Resting, 1)));
    }

    #[tokio::test]
    async fn acknowledge_resets_completed_workout() {
        let engine = WorkoutEngine::new(short_catalog());
        let mut runner = TickRunner::new(engine, RecordingFeedback::default(), MemoryMirror::default())
            .with_period(Duration::from_millis(1));
        let (tx, mut rx) = mpsc::channel(4);

        // Ignored while the workout is still running.
        tx.send(RunnerCommand::Acknowledge).await.unwrap();

        let mut completed = false;
        let phase = runner
            .run(None, std::future::pending(), &mut rx, |_, event| {
                if matches!(event, Event::WorkoutCompleted { .. }) {
                    completed = true;
                    tx.try_send(RunnerCommand::Acknowledge).unwrap();
                }
            })
            .await;

        assert!(completed);
        assert_eq!(phase, Phase::NotStarted);
        let (_, _, mirror) = runner.into_parts();
        let states: Vec<WidgetState> = mirror.history.iter().map(|s| s.status).collect();
        assert_eq!(
            &states[states.len() - 2..],
            [WidgetState::Completed, WidgetState::NotRunning]
        );
    }
}
