use clap::Subcommand;
use pomodoro_core::{Config, PresetMode};
use serde::Serialize;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g. "presets.short.break_minutes", "timer.default_preset")
        key: String,
    },
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// New value
        value: String,
    },
    /// List all config values
    List,
    /// Print the config file location
    Path,
    /// Reset config to defaults
    Reset,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            match config.get(&key) {
                Some(value) => println!("{value}"),
                None => return Err(format!("unknown key: {key}").into()),
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            println!("ok");
        }
        ConfigAction::List => {
            let config = Config::load()?;
            let json = serde_json::to_string_pretty(&config)?;
            println!("{json}");
        }
        ConfigAction::Path => {
            println!("{}", Config::path()?.display());
        }
        ConfigAction::Reset => {
            let config = Config::default();
            config.save()?;
            println!("config reset to defaults");
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct PresetRow {
    mode: PresetMode,
    study_minutes: u32,
    break_minutes: u32,
    default: bool,
}

pub fn presets() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let rows: Vec<PresetRow> = [PresetMode::Short, PresetMode::Long]
        .into_iter()
        .map(|mode| {
            let durations = config.presets.get(mode);
            PresetRow {
                mode,
                study_minutes: durations.study_minutes,
                break_minutes: durations.break_minutes,
                default: mode == config.timer.default_preset,
            }
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}
