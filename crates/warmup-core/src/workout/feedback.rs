//! Spoken and haptic cues.
//!
//! The engine decides *which* cues to emit and applies the user's settings
//! through [`FeedbackPolicy`]; a [`Feedback`] implementation only plays what
//! it is handed.

use serde::{Deserialize, Serialize};

use crate::storage::Config;

/// Pulse kinds understood by the haptic device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Haptic {
    Start,
    Success,
    Click,
    Notification,
}

/// Which cues survive the user's audio/haptics settings.
///
/// Speech is dropped when audio is disabled. Haptics only honor
/// `haptics_enabled` when `gate_haptics` is set; otherwise pulses always
/// play, matching the watch app's historical behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackPolicy {
    pub audio_enabled: bool,
    pub haptics_enabled: bool,
    pub gate_haptics: bool,
}

impl Default for FeedbackPolicy {
    fn default() -> Self {
        Self {
            audio_enabled: true,
            haptics_enabled: true,
            gate_haptics: false,
        }
    }
}

impl FeedbackPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            audio_enabled: config.settings.audio_enabled,
            haptics_enabled: config.settings.haptics_enabled,
            gate_haptics: config.workout.gate_haptics,
        }
    }

    pub fn allows_speech(&self) -> bool {
        self.audio_enabled
    }

    pub fn allows_haptics(&self) -> bool {
        !self.gate_haptics || self.haptics_enabled
    }

    /// The final-seconds countdown during an exercise is an audio feature:
    /// its clicks are skipped along with the spoken "5 seconds left".
    pub fn allows_countdown(&self) -> bool {
        self.audio_enabled
    }
}

/// Output device for cues.
pub trait Feedback {
    fn speak(&mut self, text: &str);
    fn haptic(&mut self, kind: Haptic);
}

/// Records every cue; handy for tests and dry runs.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecordingFeedback {
    pub spoken: Vec<String>,
    pub haptics: Vec<Haptic>,
}

impl Feedback for RecordingFeedback {
    fn speak(&mut self, text: &str) {
        self.spoken.push(text.to_string());
    }

    fn haptic(&mut self, kind: Haptic) {
        self.haptics.push(kind);
    }
}
