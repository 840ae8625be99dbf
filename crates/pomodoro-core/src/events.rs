use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{AlertDecision, Phase, PresetMode};

/// Every state change in the session produces an Event.
/// Presentation layers either poll snapshots or subscribe to these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        minutes: u64,
        phase: Phase,
        preset: PresetMode,
        ends_at: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    TimerReset {
        minutes: u64,
        at: DateTime<Utc>,
    },
    /// Countdown reached zero; the alert flag is now set.
    TimerExpired {
        phase: Phase,
        preset: PresetMode,
        at: DateTime<Utc>,
    },
    AlertCleared {
        at: DateTime<Utc>,
    },
    /// User answered an alert; a `TimerStarted` for the new block follows.
    TransitionApplied {
        from: Phase,
        to: Phase,
        decision: AlertDecision,
        minutes: u32,
        at: DateTime<Utc>,
    },
    PresetChanged {
        preset: PresetMode,
        at: DateTime<Utc>,
    },
    PhaseChanged {
        phase: Phase,
        at: DateTime<Utc>,
    },
    DurationSelected {
        minutes: u64,
        at: DateTime<Utc>,
    },
}
