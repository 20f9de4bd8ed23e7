//! # Warmup Core Library
//!
//! This library provides the core logic for Warmup for Runners, a guided
//! pre-run warmup companion. The CLI binary is a thin presentation layer over
//! the same library.
//!
//! ## Architecture
//!
//! - **Catalog**: the built-in warmup routines
//! - **Workout Engine**: a tick-driven state machine; the caller (usually
//!   [`TickRunner`]) invokes `tick()` once per second
//! - **Widget Mirror**: projects the session into a small JSON status file
//!   for an at-a-glance widget
//! - **Storage**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`WorkoutEngine`]: Core workout state machine
//! - [`Catalog`]: Routine lookup with default fallback
//! - [`WidgetStatus`]: Widget-facing snapshot of the session
//! - [`Config`]: Application configuration management

pub mod catalog;
pub mod deep_link;
pub mod error;
pub mod events;
pub mod storage;
pub mod widget;
pub mod workout;

pub use catalog::{Catalog, Exercise, Routine};
pub use deep_link::DeepLink;
pub use error::{ConfigError, CoreError, ValidationError};
pub use events::Event;
pub use storage::{Config, Settings};
pub use widget::{FileStatusMirror, StatusMirror, WidgetState, WidgetStatus};
pub use workout::{
    Feedback, FeedbackPolicy, Haptic, Phase, RunnerCommand, TickRunner, WorkoutEngine,
};
