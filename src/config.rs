//! Application-level configuration loading, including per-tournament defaults
//! and the palette used when teams are auto-created.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "DARE_GAMBIT_CONFIG_PATH";
/// Fallback color returned when the team palette is exhausted.
const DEFAULT_TEAM_COLOR: &str = "#888888";
/// Image assigned to auto-created teams.
const DEFAULT_TEAM_IMAGE: &str = "shield";

/// Immutable runtime configuration shared across the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Seconds on the clock when a question card is dealt (0 disables the timer).
    pub default_question_time: u32,
    /// Seconds on the clock when a dare action starts (0 disables the timer).
    pub default_dare_time: u32,
    /// Rounds per match when a tournament does not override them.
    pub default_rounds_per_game: u32,
    /// Minimum number of registered teams required to start a tournament.
    pub min_teams: usize,
    /// Minimum number of members every team must have before starting.
    pub min_members_per_team: usize,
    team_palette: Vec<String>,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to baked-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let config: Self = raw.into();
                    info!(path = %path.display(), "loaded configuration");
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Return the first palette color not already listed in `used`.
    ///
    /// When every palette entry is already taken we fall back to
    /// [`DEFAULT_TEAM_COLOR`] so callers always receive a value.
    pub fn first_unused_color(&self, used: &[String]) -> String {
        self.team_palette
            .iter()
            .find(|candidate| used.iter().all(|existing| existing != *candidate))
            .cloned()
            .unwrap_or_else(|| DEFAULT_TEAM_COLOR.to_string())
    }

    /// Image given to teams the server creates on its own.
    pub fn default_team_image(&self) -> &'static str {
        DEFAULT_TEAM_IMAGE
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_question_time: 30,
            default_dare_time: 60,
            default_rounds_per_game: 10,
            min_teams: 2,
            min_members_per_team: 1,
            team_palette: default_palette(),
        }
    }
}

/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default = "defaults::question_time")]
    default_question_time: u32,
    #[serde(default = "defaults::dare_time")]
    default_dare_time: u32,
    #[serde(default = "defaults::rounds_per_game")]
    default_rounds_per_game: u32,
    #[serde(default = "defaults::min_teams")]
    min_teams: usize,
    #[serde(default = "defaults::min_members_per_team")]
    min_members_per_team: usize,
    #[serde(default = "default_palette")]
    team_palette: Vec<String>,
}

mod defaults {
    pub fn question_time() -> u32 {
        30
    }
    pub fn dare_time() -> u32 {
        60
    }
    pub fn rounds_per_game() -> u32 {
        10
    }
    pub fn min_teams() -> usize {
        2
    }
    pub fn min_members_per_team() -> usize {
        1
    }
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        Self {
            default_question_time: value.default_question_time,
            default_dare_time: value.default_dare_time,
            default_rounds_per_game: value.default_rounds_per_game,
            min_teams: value.min_teams,
            min_members_per_team: value.min_members_per_team,
            team_palette: value.team_palette,
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Built-in team palette shipped with the binary.
fn default_palette() -> Vec<String> {
    [
        "#e6194b", "#3cb44b", "#ffe119", "#4363d8", "#f58231", "#911eb4", "#46f0f0", "#f032e6",
        "#bcf60c", "#fabebe", "#008080", "#e6beff", "#9a6324", "#fffac8", "#800000", "#aaffc3",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_unused_color_skips_taken_entries() {
        let config = AppConfig::default();
        let palette = default_palette();
        let used = vec![palette[0].clone(), palette[1].clone()];
        assert_eq!(config.first_unused_color(&used), palette[2]);
    }

    #[test]
    fn exhausted_palette_falls_back() {
        let config = AppConfig::default();
        let used = default_palette();
        assert_eq!(config.first_unused_color(&used), DEFAULT_TEAM_COLOR);
    }
}
