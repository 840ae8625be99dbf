//! # Pomodoro Core Library
//!
//! This library provides the core logic for a single-session Pomodoro
//! study timer. Presentation layers (the bundled CLI, a GUI, a widget) drive
//! it on a fixed tick and render whatever state it exposes.
//!
//! ## Architecture
//!
//! - **Timer Controller**: A wall-clock-based state machine that requires the
//!   caller to periodically invoke `tick()` for display updates
//! - **Presets**: Short (25/5) and long (50/10) study/break pairs used when a
//!   countdown expires and the user picks the next block
//! - **Storage**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`TimerController`]: Core timer state machine
//! - [`SharedController`] / [`TickDriver`]: serialized access and a tokio tick loop
//! - [`Config`]: Application configuration management
//! - [`Event`]: Everything the controller reports to observers

pub mod error;
pub mod events;
pub mod storage;
pub mod timer;

pub use error::{ConfigError, CoreError, TimerError};
pub use events::Event;
pub use storage::Config;
pub use timer::{
    AlertDecision, Clock, ManualClock, Phase, PresetMode, Presets, SessionSnapshot,
    SharedController, SystemClock, TickDriver, TimerController,
};
