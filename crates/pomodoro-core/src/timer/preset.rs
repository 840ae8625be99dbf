use serde::{Deserialize, Serialize};

/// Which preset pair the session is following.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresetMode {
    /// 25 minutes of study, 5 minutes of break.
    #[default]
    Short,
    /// 50 minutes of study, 10 minutes of break.
    Long,
}

impl PresetMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PresetMode::Short => "short",
            PresetMode::Long => "long",
        }
    }
}

impl std::fmt::Display for PresetMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PresetMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "short" | "25" | "25/5" => Ok(PresetMode::Short),
            "long" | "50" | "50/10" => Ok(PresetMode::Long),
            other => Err(format!("unknown preset: {other} (expected short or long)")),
        }
    }
}

/// Study and break lengths for one preset, in whole minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetDurations {
    pub study_minutes: u32,
    pub break_minutes: u32,
}

/// The pair of presets the controller picks from on transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Presets {
    #[serde(default = "default_short")]
    pub short: PresetDurations,
    #[serde(default = "default_long")]
    pub long: PresetDurations,
}

fn default_short() -> PresetDurations {
    PresetDurations {
        study_minutes: 25,
        break_minutes: 5,
    }
}

fn default_long() -> PresetDurations {
    PresetDurations {
        study_minutes: 50,
        break_minutes: 10,
    }
}

impl Presets {
    pub fn get(&self, mode: PresetMode) -> PresetDurations {
        match mode {
            PresetMode::Short => self.short,
            PresetMode::Long => self.long,
        }
    }

    pub fn study_minutes(&self, mode: PresetMode) -> u32 {
        self.get(mode).study_minutes
    }

    pub fn break_minutes(&self, mode: PresetMode) -> u32 {
        self.get(mode).break_minutes
    }
}

impl Default for Presets {
    fn default() -> Self {
        Self {
            short: default_short(),
            long: default_long(),
        }
    }
}
