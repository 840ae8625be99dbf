mod config;

pub use config::{Config, TimerConfig};

use std::path::PathBuf;

use crate::error::Result;

/// Returns `~/.config/pomodoro[-dev]/` based on POMODORO_ENV.
///
/// Set POMODORO_ENV=dev to use the development data directory, or
/// POMODORO_CONFIG_DIR to use an explicit directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("POMODORO_CONFIG_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("POMODORO_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("pomodoro-dev")
            } else {
                base_dir.join("pomodoro")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
