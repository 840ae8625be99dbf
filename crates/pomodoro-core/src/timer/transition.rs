//! Study/break transitions offered when a countdown expires.
//!
//! ```text
//!              accept                     decline
//! Studying ---------> OnBreak   Studying ---------> Studying
//! OnBreak  ---------> Studying  OnBreak  ---------> OnBreak
//! ```

use serde::{Deserialize, Serialize};

use super::preset::{PresetMode, Presets};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Studying,
    OnBreak,
}

impl Phase {
    pub fn from_studying(is_studying: bool) -> Self {
        if is_studying {
            Phase::Studying
        } else {
            Phase::OnBreak
        }
    }

    pub fn is_studying(&self) -> bool {
        matches!(self, Phase::Studying)
    }

    /// The question put to the user when a block of this phase ends.
    pub fn prompt(&self) -> (&'static str, &'static str) {
        match self {
            Phase::Studying => ("Timer Done!", "Take a Break?"),
            Phase::OnBreak => ("Break Over!", "Back to Work?"),
        }
    }
}

/// The user's answer to an expiry alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertDecision {
    Accept,
    Decline,
}

impl std::str::FromStr for AlertDecision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" | "accept" => Ok(AlertDecision::Accept),
            "n" | "no" | "decline" => Ok(AlertDecision::Decline),
            other => Err(format!("expected yes/no, got '{other}'")),
        }
    }
}

/// Block chosen in response to an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextBlock {
    pub phase: Phase,
    pub minutes: u32,
}

/// Pick the next block given the phase that just ended.
pub fn next_block(
    ended: Phase,
    decision: AlertDecision,
    mode: PresetMode,
    presets: &Presets,
) -> NextBlock {
    let phase = match (ended, decision) {
        (Phase::Studying, AlertDecision::Accept) => Phase::OnBreak,
        (Phase::Studying, AlertDecision::Decline) => Phase::Studying,
        (Phase::OnBreak, AlertDecision::Accept) => Phase::Studying,
        (Phase::OnBreak, AlertDecision::Decline) => Phase::OnBreak,
    };
    let minutes = match phase {
        Phase::Studying => presets.study_minutes(mode),
        Phase::OnBreak => presets.break_minutes(mode),
    };
    NextBlock { phase, minutes }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_table() {
        let p = Presets::default();
        let cases = [
            (Phase::Studying, AlertDecision::Accept, PresetMode::Short, Phase::OnBreak, 5),
            (Phase::Studying, AlertDecision::Accept, PresetMode::Long, Phase::OnBreak, 10),
            (Phase::Studying, AlertDecision::Decline, PresetMode::Short, Phase::Studying, 25),
            (Phase::Studying, AlertDecision::Decline, PresetMode::Long, Phase::Studying, 50),
            (Phase::OnBreak, AlertDecision::Accept, PresetMode::Short, Phase::Studying, 25),
            (Phase::OnBreak, AlertDecision::Accept, PresetMode::Long, Phase::Studying, 50),
            (Phase::OnBreak, AlertDecision::Decline, PresetMode::Short, Phase::OnBreak, 5),
            (Phase::OnBreak, AlertDecision::Decline, PresetMode::Long, Phase::OnBreak, 10),
        ];
        for (ended, decision, mode, phase, minutes) in cases {
            assert_eq!(
                next_block(ended, decision, mode, &p),
                NextBlock { phase, minutes },
                "{ended:?} {decision:?} {mode:?}"
            );
        }
    }

    #[test]
    fn decision_parses_yes_no() {
        assert_eq!(" Y ".parse::<AlertDecision>(), Ok(AlertDecision::Accept));
        assert_eq!("no".parse::<AlertDecision>(), Ok(AlertDecision::Decline));
        assert!("maybe".parse::<AlertDecision>().is_err());
    }

    #[test]
    fn prompts_follow_phase() {
        assert_eq!(Phase::Studying.prompt().1, "Take a Break?");
        assert_eq!(Phase::OnBreak.prompt().1, "Back to Work?");
    }
}
