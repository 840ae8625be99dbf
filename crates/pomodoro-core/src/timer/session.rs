use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::preset::PresetMode;
use super::transition::Phase;

/// Minutes shown before anything has been configured.
pub const DEFAULT_MINUTES: u64 = 25;

/// The single timer instance owned by the controller.
///
/// Fields are only written by [`TimerController`](super::TimerController);
/// everything else reads through the getters or a [`SessionSnapshot`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub(crate) is_active: bool,
    pub(crate) is_studying: bool,
    pub(crate) preset_mode: PresetMode,
    /// Denominator for `remaining_fraction`, fixed per `start`.
    pub(crate) total_duration_secs: u64,
    /// Only meaningful while `is_active`.
    pub(crate) end_at: Option<DateTime<Utc>>,
    pub(crate) remaining_fraction: f64,
    pub(crate) display_minutes: u64,
    pub(crate) display_seconds: u64,
    pub(crate) alert_pending: bool,
    /// Whole-minute duration shown while idle (start or the slider).
    pub(crate) configured_minutes: u64,
    /// Duration of the most recent `start`; what `reset` returns to.
    pub(crate) last_started_minutes: u64,
}

impl Session {
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn is_studying(&self) -> bool {
        self.is_studying
    }

    pub fn phase(&self) -> Phase {
        Phase::from_studying(self.is_studying)
    }

    pub fn preset_mode(&self) -> PresetMode {
        self.preset_mode
    }

    pub fn total_duration_secs(&self) -> u64 {
        self.total_duration_secs
    }

    pub fn end_at(&self) -> Option<DateTime<Utc>> {
        self.end_at
    }

    pub fn remaining_fraction(&self) -> f64 {
        self.remaining_fraction
    }

    pub fn display_minutes(&self) -> u64 {
        self.display_minutes
    }

    pub fn display_seconds(&self) -> u64 {
        self.display_seconds
    }

    pub fn alert_pending(&self) -> bool {
        self.alert_pending
    }

    pub fn configured_minutes(&self) -> u64 {
        self.configured_minutes
    }

    pub fn last_started_minutes(&self) -> u64 {
        self.last_started_minutes
    }

    /// `"m:ss"`, e.g. `"4:07"` or `"25:00"`.
    pub fn display(&self) -> String {
        format_display(self.display_minutes, self.display_seconds)
    }

    pub(crate) fn show_whole_minutes(&mut self, minutes: u64) {
        self.display_minutes = minutes;
        self.display_seconds = 0;
    }
}

impl Default for Session {
    /// Study, short preset, inactive, full progress ring.
    fn default() -> Self {
        Self {
            is_active: false,
            is_studying: true,
            preset_mode: PresetMode::Short,
            total_duration_secs: DEFAULT_MINUTES * 60,
            end_at: None,
            remaining_fraction: 1.0,
            display_minutes: DEFAULT_MINUTES,
            display_seconds: 0,
            alert_pending: false,
            configured_minutes: DEFAULT_MINUTES,
            last_started_minutes: DEFAULT_MINUTES,
        }
    }
}

/// Only the seconds are zero-padded.
pub fn format_display(minutes: u64, seconds: u64) -> String {
    format!("{minutes}:{seconds:02}")
}

/// Point-in-time view of the session for presentation layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub is_active: bool,
    pub is_studying: bool,
    pub phase: Phase,
    pub preset_mode: PresetMode,
    pub total_duration_secs: u64,
    pub end_at: Option<DateTime<Utc>>,
    pub remaining_fraction: f64,
    pub display_minutes: u64,
    pub display_seconds: u64,
    pub display: String,
    pub alert_pending: bool,
    pub configured_minutes: u64,
    pub last_started_minutes: u64,
    pub at: DateTime<Utc>,
}

impl SessionSnapshot {
    pub(crate) fn capture(session: &Session, at: DateTime<Utc>) -> Self {
        Self {
            is_active: session.is_active,
            is_studying: session.is_studying,
            phase: session.phase(),
            preset_mode: session.preset_mode,
            total_duration_secs: session.total_duration_secs,
            end_at: session.end_at,
            remaining_fraction: session.remaining_fraction,
            display_minutes: session.display_minutes,
            display_seconds: session.display_seconds,
            display: session.display(),
            alert_pending: session.alert_pending,
            configured_minutes: session.configured_minutes,
            last_started_minutes: session.last_started_minutes,
            at,
        }
    }
}
