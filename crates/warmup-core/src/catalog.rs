//! Built-in warmup routines.
//!
//! The catalog is static: three routines are compiled in and never mutated.
//! Lookups by id return `None` instead of failing; callers fall back to the
//! default routine.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Duration in seconds. Always positive.
    pub duration_secs: u32,
    /// Animation/icon key, e.g. `jumping_jacks`.
    pub animation: String,
    /// Spoken when the exercise starts.
    pub audio_instructions: String,
    /// Spoken once the exercise is half done.
    #[serde(default)]
    pub halfway_cue: Option<String>,
}

impl Exercise {
    /// Fallback exercise used by every built-in routine.
    pub fn jumping_jacks() -> Self {
        Self {
            id: "default_exercise".into(),
            name: "Jumping Jacks".into(),
            description: "Stand with feet together, arms at sides, then jump while spreading legs and raising arms".into(),
            duration_secs: 30,
            animation: "jumping_jacks".into(),
            audio_instructions: "Do jumping jacks for 30 seconds".into(),
            halfway_cue: Some("Halfway there, keep going!".into()),
        }
    }

    /// Symbol name shown next to the exercise.
    pub fn icon(&self) -> &'static str {
        match self.animation.as_str() {
            "jumping_jacks" => "figure.mixed.cardio",
            "high_knees" => "figure.run",
            "leg_swings" => "figure.walk",
            "lunges" => "figure.walk.motion",
            "arm_circles" => "figure.gymnastics",
            _ => "figure.run",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Routine {
    pub id: String,
    pub name: String,
    pub description: String,
    pub exercises: Vec<Exercise>,
    /// Rest between consecutive exercises, in seconds.
    pub rest_duration_secs: u32,
    /// Whether a run should start once the warmup completes.
    pub auto_start_run: bool,
}

impl Routine {
    /// Check the invariants every routine must hold.
    ///
    /// # Errors
    ///
    /// Returns an error if the routine has no exercises or an exercise has
    /// a zero duration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.exercises.is_empty() {
            return Err(ValidationError::EmptyCollection(format!(
                "routine '{}' has no exercises",
                self.id
            )));
        }
        if let Some(ex) = self.exercises.iter().find(|e| e.duration_secs == 0) {
            return Err(ValidationError::InvalidValue {
                field: format!("{}.{}.duration_secs", self.id, ex.id),
                message: "must be positive".into(),
            });
        }
        Ok(())
    }

    /// Exercise time plus the rest gaps between exercises.
    pub fn total_duration_secs(&self) -> u32 {
        let exercise_time = self
            .exercises
            .iter()
            .fold(0u32, |acc, e| acc.saturating_add(e.duration_secs));
        let gaps = u32::try_from(self.exercises.len().saturating_sub(1)).unwrap_or(u32::MAX);
        exercise_time.saturating_add(self.rest_duration_secs.saturating_mul(gaps))
    }

    /// `"2m 5s"`, or `"45s"` under a minute.
    pub fn formatted_total(&self) -> String {
        let total = self.total_duration_secs();
        let (minutes, seconds) = (total / 60, total % 60);
        if minutes > 0 {
            format!("{minutes}m {seconds}s")
        } else {
            format!("{seconds}s")
        }
    }

    pub fn icon(&self) -> &'static str {
        if self.id.contains("quick") {
            "figure.walk"
        } else if self.id.contains("advanced") {
            "figure.run"
        } else {
            "figure.mixed.cardio"
        }
    }
}

/// Ordered collection of routines.
#[derive(Debug, Clone)]
pub struct Catalog {
    routines: Vec<Routine>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Catalog {
    /// The three compiled-in routines: quick, basic, advanced.
    pub fn builtin() -> Self {
        Self {
            routines: vec![quick_warmup(), basic_warmup(), advanced_warmup()],
        }
    }

    /// Build a catalog from arbitrary routines, keeping their order.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure among `routines`.
    pub fn from_routines(routines: Vec<Routine>) -> Result<Self, ValidationError> {
        for routine in &routines {
            routine.validate()?;
        }
        Ok(Self { routines })
    }

    pub fn list_routines(&self) -> &[Routine] {
        &self.routines
    }

    pub fn get_routine(&self, id: &str) -> Option<&Routine> {
        self.routines.iter().find(|r| r.id == id)
    }

    /// The routine named by `default_id` if it exists, otherwise the first
    /// entry. `None` only for an empty catalog.
    pub fn default_routine(&self, default_id: Option<&str>) -> Option<&Routine> {
        default_id
            .and_then(|id| self.get_routine(id))
            .or_else(|| self.routines.first())
    }

    pub fn is_empty(&self) -> bool {
        self.routines.is_empty()
    }
}

fn basic_warmup() -> Routine {
    Routine {
        id: "basic_warmup".into(),
        name: "Basic Warmup".into(),
        description: "A standard warmup routine for runners".into(),
        exercises: vec![Exercise::jumping_jacks()],
        rest_duration_secs: 15,
        auto_start_run: false,
    }
}

fn quick_warmup() -> Routine {
    Routine {
        id: "quick_warmup".into(),
        name: "Quick Warmup".into(),
        description: "A quick warmup for when you're short on time".into(),
        exercises: vec![Exercise::jumping_jacks()],
        rest_duration_secs: 10,
        auto_start_run: true,
    }
}

fn advanced_warmup() -> Routine {
    Routine {
        id: "advanced_warmup".into(),
        name: "Advanced Warmup".into(),
        description: "A comprehensive warmup for serious runners".into(),
        exercises: vec![Exercise::jumping_jacks(), Exercise::jumping_jacks()],
        rest_duration_secs: 20,
        auto_start_run: false,
    }
}
