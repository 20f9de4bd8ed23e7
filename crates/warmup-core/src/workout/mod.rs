mod engine;
mod feedback;
mod runner;

pub use engine::{format_clock, ActiveTick, Phase, WorkoutEngine};
pub use feedback::{Feedback, FeedbackPolicy, Haptic, RecordingFeedback};
pub use runner::{dispatch, RunnerCommand, TickRunner};
