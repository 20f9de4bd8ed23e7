mod config;

pub use config::{Config, Settings, WidgetConfig, WorkoutConfig};

use std::path::PathBuf;

use crate::error::CoreError;

/// Returns `~/.config/warmup[-dev]/` based on WARMUP_ENV.
///
/// Set WARMUP_ENV=dev to use the development data directory, or
/// WARMUP_DATA_DIR to point somewhere else entirely.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, CoreError> {
    let dir = data_dir_path();
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Same location as [`data_dir`], without touching the filesystem.
pub fn data_dir_path() -> PathBuf {
    match std::env::var_os("WARMUP_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("WARMUP_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("warmup-dev")
            } else {
                base_dir.join("warmup")
            }
        }
    }
}

/// Directory shared between the app and the widget, keyed by container id.
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn shared_container_dir(container_id: &str) -> Result<PathBuf, CoreError> {
    let dir = shared_container_path(container_id);
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Where [`shared_container_dir`] lives, for readers that must not create it.
pub fn shared_container_path(container_id: &str) -> PathBuf {
    data_dir_path().join(container_id)
}
