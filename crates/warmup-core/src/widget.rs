//! Widget status mirror.
//!
//! The app projects its workout session into a [`WidgetStatus`] and writes it
//! as JSON into a shared container directory; the widget re-reads that file
//! on its own schedule. Latest write wins.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::deep_link::START_URL;
use crate::error::CoreError;
use crate::storage::{shared_container_dir, shared_container_path};
use crate::workout::{format_clock, Phase, WorkoutEngine};

/// File name inside the shared container.
pub const STATUS_FILE_NAME: &str = "workout_state.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WidgetState {
    NotRunning,
    Exercising,
    Resting,
    Completed,
}

impl From<Phase> for WidgetState {
    fn from(phase: Phase) -> Self {
        match phase {
            Phase::NotStarted | Phase::Preparing => WidgetState::NotRunning,
            Phase::Exercising => WidgetState::Exercising,
            Phase::Resting => WidgetState::Resting,
            Phase::Completed => WidgetState::Completed,
        }
    }
}

/// Point-in-time projection of the workout session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetStatus {
    pub status: WidgetState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_exercise_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_remaining: Option<u32>,
    pub total_progress: f64,
}

impl WidgetStatus {
    pub fn from_engine(engine: &WorkoutEngine) -> Self {
        let phase = engine.phase();
        let current_exercise_name = match phase {
            Phase::Exercising => engine.current_exercise().map(|e| e.name.clone()),
            _ => None,
        };
        let time_remaining = match phase {
            Phase::Exercising | Phase::Resting if engine.time_remaining() > 0 => {
                Some(engine.time_remaining())
            }
            _ => None,
        };
        Self {
            status: phase.into(),
            current_exercise_name,
            time_remaining,
            total_progress: engine.total_progress(),
        }
    }

    /// What the widget shows when no file has been written yet.
    pub fn not_running() -> Self {
        Self {
            status: WidgetState::NotRunning,
            current_exercise_name: None,
            time_remaining: None,
            total_progress: 0.0,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.status, WidgetState::Exercising | WidgetState::Resting)
    }

    /// How often a reader should re-read the file.
    pub fn refresh_interval(&self) -> Duration {
        if self.is_active() {
            Duration::from_secs(15)
        } else {
            Duration::from_secs(60)
        }
    }

    /// Read the latest snapshot, or `None` if it is missing or unreadable.
    pub fn load(path: &Path) -> Option<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "no widget status to read");
                return None;
            }
        };
        match serde_json::from_str(&content) {
            Ok(status) => Some(status),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "error loading workout state");
                None
            }
        }
    }

    /// At-a-glance text lines, as the watch face widget would render them.
    pub fn summary(&self) -> Vec<String> {
        let mut lines = vec!["Runner's Warmup".to_string()];
        match self.status {
            WidgetState::NotRunning => {
                lines.push("No active workout".into());
                lines.push(format!("Start Workout: {START_URL}"));
            }
            WidgetState::Completed => {
                lines.push("Workout Completed".into());
                lines.push("Great job!".into());
            }
            WidgetState::Exercising | WidgetState::Resting => {
                if let Some(name) = &self.current_exercise_name {
                    lines.push(name.clone());
                }
                if let Some(secs) = self.time_remaining {
                    lines.push(format_clock(u64::from(secs)));
                }
                lines.push(format!("Progress: {:.0}%", self.total_progress * 100.0));
                lines.push(
                    if self.status == WidgetState::Exercising {
                        "Exercising"
                    } else {
                        "Resting"
                    }
                    .into(),
                );
            }
        }
        lines
    }
}

/// Sink for status snapshots.
pub trait StatusMirror {
    /// Persist `status`. Failures must not reach the caller.
    fn publish(&mut self, status: &WidgetStatus);
}

/// Writes snapshots to a JSON file, skipping writes when nothing changed.
#[derive(Debug, Clone)]
pub struct FileStatusMirror {
    path: PathBuf,
    last: Option<WidgetStatus>,
}

impl FileStatusMirror {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            last: None,
        }
    }

    /// Mirror into `<data_dir>/<container_id>/workout_state.json`.
    ///
    /// # Errors
    ///
    /// Returns an error if the container directory cannot be created.
    pub fn for_container(container_id: &str) -> Result<Self, CoreError> {
        Ok(Self::new(shared_container_dir(container_id)?.join(STATUS_FILE_NAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, status: &WidgetStatus) -> Result<(), CoreError> {
        let data = serde_json::to_vec(status)?;
        std::fs::write(&self.path, data)?;
        Ok(())
    }
}

impl StatusMirror for FileStatusMirror {
    fn publish(&mut self, status: &WidgetStatus) {
        if self.last.as_ref() == Some(status) {
            return;
        }
        match self.write(status) {
            Ok(()) => self.last = Some(status.clone()),
            Err(e) => warn!(path = %self.path.display(), error = %e, "error saving workout state"),
        }
    }
}

/// Keeps every published snapshot in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryMirror {
    pub history: Vec<WidgetStatus>,
}

impl StatusMirror for MemoryMirror {
    fn publish(&mut self, status: &WidgetStatus) {
        if self.history.last() != Some(status) {
            self.history.push(status.clone());
        }
    }
}

/// Location of the status file for `container_id`. Nothing is created.
pub fn status_path(container_id: &str) -> PathBuf {
    shared_container_path(container_id).join(STATUS_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    fn engine() -> WorkoutEngine {
        WorkoutEngine::new(Catalog::builtin())
    }

    #[test]
    fn preparing_collapses_into_not_running() {
        let mut engine = engine();
        engine.start(Some("advanced_warmup"));
        assert_eq!(engine.phase(), Phase::Preparing);
        let status = WidgetStatus::from_engine(&engine);
        assert_eq!(status, WidgetStatus::not_running());
    }

    #[test]
    fn exercising_carries_name_and_time() {
        let mut engine = engine();
        engine.start(Some("advanced_warmup"));
        engine.tick();
        let status = WidgetStatus::from_engine(&engine);
        assert_eq!(status.status, WidgetState::Exercising);
        assert_eq!(status.current_exercise_name.as_deref(), Some("Jumping Jacks"));
        assert_eq!(status.time_remaining, Some(30));
        assert_eq!(status.total_progress, 0.0);
        assert!(status.is_active());
        assert_eq!(status.refresh_interval(), Duration::from_secs(15));
    }

    #[test]
    fn resting_omits_exercise_name() {
        let mut engine = engine();
        engine.start(Some("advanced_warmup"));
        engine.tick();
        engine.skip_to_next_exercise();
        let status = WidgetStatus::from_engine(&engine);
        assert_eq!(status.status, WidgetState::Resting);
        assert!(status.current_exercise_name.is_none());
        assert_eq!(status.time_remaining, Some(20));
        assert_eq!(status.total_progress, 0.5);
    }

    #[test]
    fn completed_has_no_time_remaining() {
        let mut engine = engine();
        engine.start(Some("basic_warmup"));
        engine.tick();
        engine.skip_to_next_exercise();
        let status = WidgetStatus::from_engine(&engine);
        assert_eq!(status.status, WidgetState::Completed);
        assert!(status.time_remaining.is_none());
        assert_eq!(status.total_progress, 1.0);
        assert!(!status.is_active());
    }

    #[test]
    fn json_uses_camel_case_and_omits_nulls() {
        let status = WidgetStatus {
            status: WidgetState::Exercising,
            current_exercise_name: Some("Jumping Jacks".into()),
            time_remaining: Some(15),
            total_progress: 0.4,
        };
        let json: serde_json::Value = serde_json::to_value(&status).unwrap();
        assert_eq!(json["status"], "exercising");
        assert_eq!(json["currentExerciseName"], "Jumping Jacks");
        assert_eq!(json["timeRemaining"], 15);
        assert_eq!(json["totalProgress"], 0.4);

        let idle = serde_json::to_value(WidgetStatus::not_running()).unwrap();
        assert_eq!(idle["status"], "notRunning");
        assert!(idle.get("timeRemaining").is_none());

        let parsed: WidgetStatus =
            serde_json::from_str(r#"{"status":"resting","timeRemaining":null,"totalProgress":0.5}"#)
                .unwrap();
        assert_eq!(parsed.status, WidgetState::Resting);
        assert!(parsed.time_remaining.is_none());
    }

    #[test]
    fn file_mirror_overwrites_and_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(STATUS_FILE_NAME);
        let mut mirror = FileStatusMirror::new(&path);

        let mut engine = engine();
        engine.start(Some("basic_warmup"));
        engine.tick();
        mirror.publish(&WidgetStatus::from_engine(&engine));
        assert_eq!(
            WidgetStatus::load(&path).unwrap().status,
            WidgetState::Exercising
        );

        engine.cancel();
        mirror.publish(&WidgetStatus::from_engine(&engine));
        assert_eq!(WidgetStatus::load(&path).unwrap(), WidgetStatus::not_running());
    }

    #[test]
    fn file_mirror_swallows_write_failures() {
        let dir = tempfile::tempdir().unwrap();
        let mut mirror = FileStatusMirror::new(dir.path().join("missing").join(STATUS_FILE_NAME));
        mirror.publish(&WidgetStatus::not_running());
        assert!(WidgetStatus::load(mirror.path()).is_none());
    }

    #[test]
    fn load_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(STATUS_FILE_NAME);
        std::fs::write(&path, "not json").unwrap();
        assert!(WidgetStatus::load(&path).is_none());
    }

    #[test]
    fn memory_mirror_skips_duplicates() {
        let mut mirror = MemoryMirror::default();
        mirror.publish(&WidgetStatus::not_running());
        mirror.publish(&WidgetStatus::not_running());
        assert_eq!(mirror.history.len(), 1);
    }

    #[test]
    fn summary_offers_start_link_when_idle() {
        let lines = WidgetStatus::not_running().summary();
        assert_eq!(lines[1], "No active workout");
        assert!(lines[2].ends_with("warmupapp://start"));

        let active = WidgetStatus {
            status: WidgetState::Resting,
            current_exercise_name: None,
            time_remaining: Some(75),
            total_progress: 0.5,
        };
        assert_eq!(
            active.summary(),
            ["Runner's Warmup", "1:15", "Progress: 50%", "Resting"]
        );
    }
}
